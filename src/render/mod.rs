// The rendering engine.
//
// Architecture:
//   HTML string → html5ever tokenizer → layout driver → line formatter → sink
//
// The engine is a html5ever `TokenSink`: tags and character data stream
// through the layout driver (driver.rs), which maintains the open-element
// stack, registers link references and feeds the line formatter. No DOM is
// built. Raw-text elements are handled at the tokenizer level: the sink
// answers their start tags with `TokenSinkResult::RawData`, so an unescaped
// `<` inside `script`/`style` can never open a tag.

pub(crate) mod formatter;
pub(crate) mod frame;
pub(crate) mod links;

mod driver;

use std::cell::RefCell;
use std::io::{self, Write};

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};

use crate::error::Error;
use crate::selector::SelectorList;
use crate::uri::Uri;
use crate::Options;

use formatter::LineFormatter;
use frame::FrameStack;
use links::LinkRegistry;

/// The glyphs that depend on the output character set.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Glyphs {
    pub bullet: &'static str,
    pub ruler: &'static str,
    pub checked_box: &'static str,
    pub checked_radio: &'static str,
    /// Header prefix character; empty disables header prefixes.
    pub section: &'static str,
    pub refs_header: &'static str,
    pub hidden_refs_header: &'static str,
    pub ref_bullet: &'static str,
}

const UTF8_GLYPHS: Glyphs = Glyphs {
    bullet: "\u{2022} ",
    ruler: "\u{2500}",
    checked_box: "x",
    checked_radio: "*",
    section: "\u{a7}",
    refs_header: "\u{a7} References",
    hidden_refs_header: "Hidden references",
    ref_bullet: "\u{2022} ",
};

const ASCII_GLYPHS: Glyphs = Glyphs {
    bullet: "* ",
    ruler: "-",
    checked_box: "x",
    checked_radio: "*",
    section: "",
    refs_header: "References",
    hidden_refs_header: "Hidden references",
    ref_bullet: "* ",
};

/// All mutable rendering state. The tokenizer callbacks are methods on this
/// value (driver.rs); nothing lives in globals.
pub(crate) struct Engine<W: Write, R: Write> {
    fmt: LineFormatter<W>,
    stack: FrameStack,
    links: LinkRegistry,
    resources: Option<R>,
    resource_error: Option<io::Error>,
    base: Option<Uri>,
    show: Option<SelectorList>,
    hide: Option<SelectorList>,
    /// Reader mode: output suppressed until the show selector matches.
    reader_ignore: bool,
    /// Buffered character data of the current run.
    char_data: String,
    glyphs: Glyphs,
    inline_refs: bool,
    inline_urls: bool,
    refs_section: bool,
    /// Whether references need collecting at all.
    collect_links: bool,
    fatal: Option<Error>,
}

impl<W: Write, R: Write> Engine<W, R> {
    pub(crate) fn new(options: &Options, out: W, resources: Option<R>) -> Result<Self, Error> {
        if options.width < 1 {
            return Err(Error::Width);
        }

        let base = match &options.base {
            Some(raw) => {
                let parsed = Uri::parse(raw).filter(|u| !u.scheme.is_empty());
                Some(parsed.ok_or_else(|| Error::BaseUrl(raw.clone()))?)
            }
            None => None,
        };

        let show = match &options.show {
            Some(text) => Some(
                SelectorList::compile(text).ok_or_else(|| Error::Selector(text.clone()))?,
            ),
            None => None,
        };
        let hide = match &options.hide {
            Some(text) => Some(
                SelectorList::compile(text).ok_or_else(|| Error::Selector(text.clone()))?,
            ),
            None => None,
        };

        let collect_links = options.references_section
            || options.inline_references
            || options.inline_urls
            || resources.is_some();

        Ok(Engine {
            fmt: LineFormatter::new(out, options.width, options.ansi, options.wrap),
            stack: FrameStack::new(),
            links: LinkRegistry::new(options.dedup_references),
            resources,
            resource_error: None,
            base,
            reader_ignore: show.is_some(),
            show,
            hide,
            char_data: String::new(),
            glyphs: if options.ascii { ASCII_GLYPHS } else { UTF8_GLYPHS },
            inline_refs: options.inline_references,
            inline_urls: options.inline_urls,
            refs_section: options.references_section,
            collect_links,
            fatal: None,
        })
    }
}

/// `TokenSink` adapter: html5ever drives sinks through a shared reference,
/// so the engine sits behind a `RefCell`.
struct EventSink<W: Write, R: Write> {
    engine: RefCell<Engine<W, R>>,
}

impl<W: Write, R: Write> TokenSink for EventSink<W, R> {
    type Handle = ();

    fn process_token(&self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        let mut engine = self.engine.borrow_mut();
        match token {
            Token::CharacterTokens(text) => engine.data(&text),
            Token::TagToken(tag) => {
                engine.flush_data();
                match tag.kind {
                    TagKind::StartTag => {
                        let name: &str = &tag.name;
                        engine.start_tag(name, &tag.attrs, tag.self_closing);
                        if !tag.self_closing {
                            // Raw-text elements: consume their bodies without
                            // tokenizing markup.
                            match name {
                                "script" => {
                                    return TokenSinkResult::RawData(RawKind::ScriptData)
                                }
                                "style" | "xmp" => {
                                    return TokenSinkResult::RawData(RawKind::Rawtext)
                                }
                                "title" | "textarea" => {
                                    return TokenSinkResult::RawData(RawKind::Rcdata)
                                }
                                _ => {}
                            }
                        }
                    }
                    TagKind::EndTag => engine.end_tag(&tag.name),
                }
            }
            Token::NullCharacterToken
            | Token::CommentToken(_)
            | Token::DoctypeToken(_)
            | Token::ParseError(_)
            | Token::EOFToken => engine.flush_data(),
        }
        TokenSinkResult::Continue
    }
}

/// Tokenize `html` and render it through a fresh engine.
pub(crate) fn render_document<W: Write, R: Write>(
    html: &str,
    options: &Options,
    out: W,
    resources: Option<R>,
) -> Result<(), Error> {
    let engine = Engine::new(options, out, resources)?;
    let sink = EventSink {
        engine: RefCell::new(engine),
    };

    let input = BufferQueue::default();
    input.push_back(StrTendril::from_slice(html));

    let tokenizer = Tokenizer::new(sink, TokenizerOpts::default());
    let _ = tokenizer.feed(&input);
    tokenizer.end();

    tokenizer.sink.engine.into_inner().finish()
}
