// html2term — dump HTML to plain text for a fixed-width terminal.
//
// Architecture:
//   HTML string → html5ever tokenizer → layout driver → line formatter → text
//
// The pipeline is streaming: no DOM is built. The driver keeps a stack of
// open elements (with HTML optional-close recovery), a tiny CSS-subset
// selector engine drives reader mode, and link references are collected for
// inline markers, an end-of-document references section, and an optional
// `TYPE\tURL` resource manifest written to a caller-supplied sink.

mod error;
mod render;
mod selector;
mod tags;
mod uri;

use std::io::{self, Write};

pub use error::Error;

/// Rendering options.
#[derive(Debug, Clone)]
pub struct Options {
    /// Terminal width in cells. Default: 77.
    pub width: usize,
    /// Emit ANSI SGR styling.
    pub ansi: bool,
    /// Word-wrap at `width`.
    pub wrap: bool,
    /// Use the ASCII glyph set (`* ` bullets, `-` rulers, no `§` prefixes)
    /// instead of the UTF-8 default.
    pub ascii: bool,
    /// Collapse repeated URLs into a single reference.
    pub dedup_references: bool,
    /// Emit `[n]` markers after linked elements.
    pub inline_references: bool,
    /// Emit ` [type: url]` markers after linked elements.
    pub inline_urls: bool,
    /// Emit the references section at the end of the document.
    pub references_section: bool,
    /// Initial base URL for making relative links absolute; must carry a
    /// scheme. A `<base href>` in the document is ignored when this is set.
    pub base: Option<String>,
    /// Reader mode: suppress everything outside subtrees matching this
    /// selector list (e.g. `main, article#content`).
    pub show: Option<String>,
    /// Hide subtrees matching this selector list.
    pub hide: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            width: 77,
            ansi: false,
            wrap: false,
            ascii: false,
            dedup_references: false,
            inline_references: false,
            inline_urls: false,
            references_section: false,
            base: None,
            show: None,
            hide: None,
        }
    }
}

impl Options {
    /// Create a new Options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the terminal width in cells.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Set whether ANSI styling is emitted.
    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    /// Set whether output is word-wrapped.
    pub fn with_wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    /// Set whether the ASCII glyph set is used.
    pub fn with_ascii(mut self, ascii: bool) -> Self {
        self.ascii = ascii;
        self
    }

    /// Set whether repeated URLs share one reference.
    pub fn with_dedup_references(mut self, dedup: bool) -> Self {
        self.dedup_references = dedup;
        self
    }

    /// Set whether `[n]` markers follow linked elements.
    pub fn with_inline_references(mut self, inline: bool) -> Self {
        self.inline_references = inline;
        self
    }

    /// Set whether ` [type: url]` markers follow linked elements.
    pub fn with_inline_urls(mut self, inline: bool) -> Self {
        self.inline_urls = inline;
        self
    }

    /// Set whether the references section is printed.
    pub fn with_references_section(mut self, section: bool) -> Self {
        self.references_section = section;
        self
    }

    /// Set the initial base URL.
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Only render subtrees matching this selector list.
    pub fn with_show(mut self, selector: impl Into<String>) -> Self {
        self.show = Some(selector.into());
        self
    }

    /// Hide subtrees matching this selector list.
    pub fn with_hide(mut self, selector: impl Into<String>) -> Self {
        self.hide = Some(selector.into());
        self
    }
}

/// Render an HTML document to text using default options.
///
/// # Examples
///
/// ```
/// let text = html2term::render("<h1>Hello</h1><p>World</p>").unwrap();
/// assert!(text.contains("Hello"));
/// ```
pub fn render(html: &str) -> Result<String, Error> {
    render_with(html, &Options::default())
}

/// Render an HTML document to text with custom options.
///
/// # Examples
///
/// ```
/// use html2term::{render_with, Options};
///
/// let options = Options::new().with_width(40).with_wrap(true);
/// let text = render_with("<p>Hello, world!</p>", &options).unwrap();
/// assert!(text.contains("Hello, world!"));
/// ```
pub fn render_with(html: &str, options: &Options) -> Result<String, Error> {
    let mut out = Vec::new();
    render::render_document(html, options, &mut out, None::<io::Sink>)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Render an HTML document into caller-supplied sinks. `resources`, when
/// present, receives one `TYPE\tURL` line per discovered reference, written
/// while parsing.
pub fn render_to<W: Write, R: Write>(
    html: &str,
    options: &Options,
    out: W,
    resources: Option<R>,
) -> Result<(), Error> {
    render::render_document(html, options, out, resources)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_empty() {
        let result = render("").unwrap();
        assert_eq!(result, "");
    }

    #[test]
    fn test_render_simple_paragraph() {
        let result = render("<p>Hello, world!</p>").unwrap();
        assert_eq!(result, "Hello, world!\n");
    }

    #[test]
    fn test_options_builder() {
        let options = Options::new()
            .with_width(40)
            .with_wrap(true)
            .with_ascii(true)
            .with_base("https://example.com/");

        assert_eq!(options.width, 40);
        assert!(options.wrap);
        assert!(options.ascii);
        assert_eq!(options.base.as_deref(), Some("https://example.com/"));
    }

    #[test]
    fn test_default_options() {
        let options = Options::default();
        assert_eq!(options.width, 77);
        assert!(!options.ansi);
        assert!(!options.wrap);
        assert!(!options.ascii);
        assert!(!options.references_section);
    }

    #[test]
    fn test_bad_base_url_is_rejected() {
        let options = Options::new().with_base("/relative/only");
        assert!(matches!(
            render_with("<p>x</p>", &options),
            Err(Error::BaseUrl(_))
        ));
    }

    #[test]
    fn test_bad_selector_is_rejected() {
        let options = Options::new().with_show("main,");
        assert!(matches!(
            render_with("<p>x</p>", &options),
            Err(Error::Selector(_))
        ));
    }

    #[test]
    fn test_zero_width_is_rejected() {
        let options = Options::new().with_width(0);
        assert!(matches!(render_with("<p>x</p>", &options), Err(Error::Width)));
    }
}
