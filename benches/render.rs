// Benchmarks for HTML-to-text rendering.

use criterion::{criterion_group, criterion_main, Criterion};
use html2term::{render, render_with, Options};

fn bench_simple(c: &mut Criterion) {
    let html = "<h1>Hello</h1><p>This is a <strong>simple</strong> document.</p>";
    c.bench_function("simple_document", |b| {
        b.iter(|| render(html).unwrap());
    });
}

fn bench_article(c: &mut Criterion) {
    // A repetitive article-shaped page: headings, paragraphs, lists, links.
    let mut html = String::from("<html><head><title>Bench</title></head><body><main>");
    for section in 0..50 {
        html.push_str(&format!("<h2>Section {section}</h2>"));
        for para in 0..10 {
            html.push_str(&format!(
                "<p>Paragraph {para} with a <a href=\"/s/{section}/{para}\">link</a> \
                 and some <em>emphasis</em> to carry markup state.</p>"
            ));
        }
        html.push_str("<ul><li>one<li>two<li>three</ul>");
    }
    html.push_str("</main></body></html>");

    let options = Options::new()
        .with_width(80)
        .with_wrap(true)
        .with_references_section(true)
        .with_base("https://example.com/");

    c.bench_function("article_wrapped_with_references", |b| {
        b.iter(|| render_with(&html, &options).unwrap());
    });
}

criterion_group!(benches, bench_simple, bench_article);
criterion_main!(benches);
