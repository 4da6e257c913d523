// End-to-end rendering tests: layout, whitespace, margins, wrapping.

use pretty_assertions::assert_eq;

use html2term::{render, render_with, Options};

fn narrow() -> Options {
    Options::new().with_width(72)
}

fn text(html: &str) -> String {
    render_with(html, &narrow()).unwrap()
}

#[test]
fn empty_input_renders_nothing() {
    assert_eq!(render("").unwrap(), "");
}

#[test]
fn paragraph_with_inline_markup() {
    assert_eq!(text("<p>hello <b>world</b></p>"), "hello world\n");
}

#[test]
fn paragraphs_are_separated_by_one_blank_line() {
    assert_eq!(text("<p>a</p><p>b</p>"), "a\n\nb\n");
}

#[test]
fn unclosed_paragraphs_autoclose() {
    assert_eq!(text("<p>a<p>b"), "a\n\nb\n");
}

#[test]
fn repeated_block_margins_do_not_accumulate() {
    // Sibling lists both declare a margin; only one blank line appears.
    assert_eq!(
        text("<ul><li>a</ul><ul><li>b</ul>"),
        "\u{2022} a\n\n\u{2022} b\n"
    );
}

#[test]
fn list_items_autoclose() {
    assert_eq!(text("<ul><li>a<li>b</ul>"), "\u{2022} a\n\u{2022} b\n");
}

#[test]
fn ordered_lists_use_aligned_ordinals() {
    assert_eq!(
        text("<ol><li>one<li>two</ol>"),
        "   1. one\n   2. two\n"
    );
}

#[test]
fn nested_lists_indent_under_their_item() {
    assert_eq!(
        text("<ul><li>a<ul><li>b</ul><li>c</ul>"),
        "\u{2022} a\n  \u{2022} b\n\u{2022} c\n"
    );
}

#[test]
fn ascii_mode_uses_star_bullets() {
    let options = narrow().with_ascii(true);
    assert_eq!(
        render_with("<ul><li>a<li>b</ul>", &options).unwrap(),
        "* a\n* b\n"
    );
}

#[test]
fn preformatted_text_is_literal() {
    assert_eq!(text("<pre>  x\n  y</pre>"), "  x\n  y\n");
}

#[test]
fn pre_preserves_blank_lines_and_expands_tabs() {
    assert_eq!(text("<p>a</p><pre>x\n\n\ty</pre>"), "a\n\nx\n\n        y\n");
}

#[test]
fn script_contents_are_suppressed() {
    // The unescaped `<` inside must not open a tag.
    assert_eq!(text("<script>if(a<b)c;</script>after"), "after\n");
}

#[test]
fn style_contents_are_suppressed() {
    assert_eq!(text("<style>p { color: red }</style>after"), "after\n");
}

#[test]
fn h2_gets_one_section_sign() {
    assert_eq!(text("<h2>Title</h2>"), "\u{a7} Title\n");
}

#[test]
fn h1_is_plain_and_h6_gets_five_signs() {
    assert_eq!(text("<h1>Top</h1>"), "Top\n");
    assert_eq!(text("<h6>Deep</h6>"), "\u{a7}\u{a7}\u{a7}\u{a7}\u{a7} Deep\n");
}

#[test]
fn ascii_mode_headers_have_no_prefix() {
    let options = narrow().with_ascii(true);
    assert_eq!(render_with("<h2>Title</h2>", &options).unwrap(), "Title\n");
}

#[test]
fn blockquotes_indent_their_content() {
    assert_eq!(text("<blockquote>quoted</blockquote>"), "  quoted\n");
}

#[test]
fn definition_lists_indent_definitions() {
    assert_eq!(
        text("<dl><dt>Term</dt><dd>Definition</dd></dl>"),
        "Term\n    Definition\n"
    );
}

#[test]
fn dd_autocloses_dd_and_dt() {
    assert_eq!(
        text("<dl><dt>a<dd>b<dd>c</dl>"),
        "a\n    b\n    c\n"
    );
}

#[test]
fn table_cells_are_tab_separated() {
    assert_eq!(
        text("<table><tr><td>a</td><td>b</td></tr></table>"),
        "a\tb\n"
    );
}

#[test]
fn table_rows_autoclose() {
    assert_eq!(
        text("<table><tr><td>a<td>b<tr><td>c<td>d</table>"),
        "a\tb\nc\td\n"
    );
}

#[test]
fn options_autoclose_inside_a_select() {
    assert_eq!(text("<select><option>a<option>b</select>"), "ab\n");
    assert_eq!(
        text("<select><option>a</option> <option>b</option></select>"),
        "a b\n"
    );
}

#[test]
fn entities_are_decoded() {
    assert_eq!(text("<p>a &amp; b &#169;</p>"), "a & b \u{a9}\n");
}

#[test]
fn comments_do_not_split_words() {
    assert_eq!(text("<p>a<!-- hidden -->b</p>"), "ab\n");
}

#[test]
fn whitespace_collapses_between_words() {
    assert_eq!(text("<p>a\n\n   b\t c</p>"), "a b c\n");
}

#[test]
fn br_forces_line_breaks_and_repeats() {
    assert_eq!(text("<p>a<br>b</p>"), "a\nb\n");
    assert_eq!(text("<p>a<br><br>b</p>"), "a\n\nb\n");
}

#[test]
fn leading_br_is_dropped() {
    assert_eq!(text("<br>a"), "a\n");
}

#[test]
fn hr_spans_the_terminal_width() {
    let options = Options::new().with_width(20);
    assert_eq!(
        render_with("<hr>", &options).unwrap(),
        format!("{}\n", "\u{2500}".repeat(20))
    );
    let ascii = Options::new().with_width(20).with_ascii(true);
    assert_eq!(
        render_with("<hr>", &ascii).unwrap(),
        format!("{}\n", "-".repeat(20))
    );
}

#[test]
fn img_alt_text_is_rendered() {
    assert_eq!(text(r#"<img alt="a cat" src="cat.png">"#), "a cat\n");
}

#[test]
fn input_glyphs() {
    assert_eq!(text(r#"<input value="name">"#), "[name           ]\n");
    assert_eq!(text(r#"<input type="submit" value="Go">"#), "[Go]\n");
    assert_eq!(text(r#"<input type="checkbox" checked>"#), "[x]\n");
    assert_eq!(text(r#"<input type="checkbox">"#), "[ ]\n");
    assert_eq!(text(r#"<input type="radio" checked>"#), "[*]\n");
    assert_eq!(text(r#"<input type="hidden" value="secret">"#), "");
}

#[test]
fn hidden_attributes_suppress_subtrees() {
    assert_eq!(
        text(r#"<p>a</p><div hidden>gone</div><p>b</p>"#),
        "a\n\nb\n"
    );
    assert_eq!(
        text(r#"<p>a</p><div aria-hidden="true">gone</div><p>b</p>"#),
        "a\n\nb\n"
    );
}

#[test]
fn title_text_is_rendered_as_a_block() {
    assert_eq!(
        text("<html><head><title>T</title></head><body><p>x</p></body></html>"),
        "T\n\nx\n"
    );
}

#[test]
fn unmatched_close_of_a_known_block_breaks_the_line() {
    assert_eq!(text("a</p>b"), "a\n\nb\n");
}

#[test]
fn unknown_tags_render_inline() {
    assert_eq!(text("<p>a <custom-thing>b</custom-thing> c</p>"), "a b c\n");
}

#[test]
fn wrapping_breaks_at_spaces() {
    let options = Options::new().with_width(10).with_wrap(true);
    assert_eq!(
        render_with("<p>aaa bbb ccc</p>", &options).unwrap(),
        "aaa bbb \nccc\n"
    );
}

#[test]
fn wrapped_continuation_lines_keep_the_item_indent() {
    let options = Options::new().with_width(16).with_wrap(true);
    let out = render_with("<ul><li>aaaa bbbb cccc dddd</li></ul>", &options).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "\u{2022} aaaa bbbb ");
    assert!(lines[1].starts_with("  cccc"), "got {out:?}");
}

#[test]
fn wrapped_lines_never_exceed_the_width() {
    let options = Options::new().with_width(13).with_wrap(true);
    let html = "<p>the quick brown fox jumps over the lazy dog again and again</p>";
    let out = render_with(html, &options).unwrap();
    for line in out.lines() {
        assert!(line.len() <= 13, "line too long: {line:?}");
    }
}

#[test]
fn deep_nesting_is_a_hard_error() {
    let html = "<div>".repeat(5000);
    assert!(matches!(
        render_with(&html, &narrow()),
        Err(html2term::Error::DepthExceeded)
    ));
}

#[test]
fn sink_errors_surface_at_end_of_stream() {
    use std::io::{self, Write};

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("sink closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let result = html2term::render_to(
        "<p>x</p>",
        &Options::default(),
        FailingSink,
        None::<io::Sink>,
    );
    assert!(matches!(result, Err(html2term::Error::Io(_))));
}

#[test]
fn ansi_styles_are_diffed_and_reset() {
    let options = narrow().with_ansi(true);
    let out = render_with("<p><b>x</b></p>", &options).unwrap();
    assert_eq!(out, "\x1b[1m\x1b[0m\x1b[1mx\x1b[0m\n");
}

#[test]
fn ansi_is_reemitted_on_every_line() {
    let options = narrow().with_ansi(true);
    let out = render_with("<p><b>a<br>b</b></p>", &options).unwrap();
    // The second line restates bold after a full reset.
    assert_eq!(out, "\x1b[1m\x1b[0m\x1b[1ma\n\x1b[0m\x1b[1mb\x1b[0m\n");
}

#[test]
fn closing_nested_markup_restores_the_outer_style() {
    let options = narrow().with_ansi(true);
    let out = render_with("<p><b>a<i>b</i>c</b></p>", &options).unwrap();
    assert_eq!(
        out,
        "\x1b[1m\x1b[0m\x1b[1ma\x1b[3mb\x1b[23mc\x1b[0m\n"
    );
}

#[test]
fn no_ansi_without_the_flag() {
    let out = text("<p><b>x</b> <em>y</em></p>");
    assert!(!out.contains('\x1b'));
}
