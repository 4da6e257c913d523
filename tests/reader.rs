// Reader mode: show-selectors, hide-selectors, and selector addressing.

use pretty_assertions::assert_eq;

use html2term::{render_with, Options};

fn base() -> Options {
    Options::new().with_width(72)
}

#[test]
fn show_selector_keeps_only_matching_subtrees() {
    let options = base().with_show("main");
    let html = "<header>chrome</header><main><p>keep</p></main><footer>chrome</footer>";
    assert_eq!(render_with(html, &options).unwrap(), "keep\n");
}

#[test]
fn show_selector_matches_by_id_and_class() {
    let options = base().with_show("#content");
    let html = r#"<div id="nav">no</div><div id="content">yes</div>"#;
    assert_eq!(render_with(html, &options).unwrap(), "yes\n");

    let options = base().with_show(".article");
    let html = r#"<div class="side">no</div><div class="article body">yes</div>"#;
    assert_eq!(render_with(html, &options).unwrap(), "yes\n");
}

#[test]
fn class_selectors_require_whole_tokens() {
    let options = base().with_show(".art");
    let html = r#"<div class="article">no</div>"#;
    assert_eq!(render_with(html, &options).unwrap(), "");
}

#[test]
fn descendant_selectors_walk_the_open_path() {
    let options = base().with_show("article p");
    let html = "<p>outside</p><article><h2>t</h2><p>inside</p></article>";
    assert_eq!(render_with(html, &options).unwrap(), "inside\n");
}

#[test]
fn selector_lists_are_a_disjunction() {
    let options = base().with_show("nav, main");
    let html = "<nav>one</nav><aside>skip</aside><main>two</main>";
    let out = render_with(html, &options).unwrap();
    assert!(out.contains("one"));
    assert!(out.contains("two"));
    assert!(!out.contains("skip"));
}

#[test]
fn index_selector_addresses_the_nth_child() {
    let options = base().with_show("p@1");
    let html = "<div><p>one</p><p>two</p><p>three</p></div>";
    assert_eq!(render_with(html, &options).unwrap(), "two\n");
}

#[test]
fn hide_selector_drops_matching_subtrees() {
    let options = base().with_hide(".ads");
    let html = r#"<p>a</p><div class="ads"><p>buy</p></div><p>b</p>"#;
    assert_eq!(render_with(html, &options).unwrap(), "a\n\nb\n");
}

#[test]
fn hide_selector_hides_links_but_keeps_them_as_hidden_references() {
    let options = base()
        .with_hide(".promo")
        .with_references_section(true);
    let html = r#"<p class="promo"><a href="https://h/buy">x</a></p><p>real</p>"#;
    let out = render_with(html, &options).unwrap();
    assert!(!out.contains('x'), "got {out:?}");
    assert!(out.contains("Hidden references"), "got {out:?}");
    assert!(out.contains("https://h/buy"), "got {out:?}");
}

#[test]
fn show_and_hide_combine() {
    let options = base().with_show("main").with_hide("aside");
    let html = "<main><p>keep</p><aside>drop</aside><p>also</p></main><nav>never</nav>";
    let out = render_with(html, &options).unwrap();
    assert!(out.contains("keep"));
    assert!(out.contains("also"));
    assert!(!out.contains("drop"));
    assert!(!out.contains("never"));
}

#[test]
fn reader_mode_links_outside_matches_are_not_collected() {
    let options = base().with_show("main").with_references_section(true);
    let html = r#"<nav><a href="https://h/nav">n</a></nav><main><a href="https://h/in">k</a></main>"#;
    let out = render_with(html, &options).unwrap();
    assert!(out.contains("https://h/in"), "got {out:?}");
    assert!(!out.contains("https://h/nav"), "got {out:?}");
}
