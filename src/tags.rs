// Static tag metadata.
//
// One sorted table maps every recognized HTML element to its layout policy:
// display class, ANSI markup, void/optional-close flags, vertical margins and
// per-frame indent. The table is the sole source of display policy; unknown
// tags fall back to an inline, unstyled entry.

use std::ops::BitOr;

/// Display classes, a bitset. An element may carry several (e.g. `dl` is
/// `BLOCK | DL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Display(u32);

impl Display {
    pub(crate) const EMPTY: Display = Display(0);
    pub(crate) const INLINE: Display = Display(1 << 0);
    #[allow(dead_code)] // reserved display class, no element maps to it yet
    pub(crate) const INLINE_BLOCK: Display = Display(1 << 1);
    pub(crate) const BLOCK: Display = Display(1 << 2);
    /// Subtree produces no output at all.
    pub(crate) const HIDDEN: Display = Display(1 << 3);
    pub(crate) const PRE: Display = Display(1 << 4);
    pub(crate) const LIST: Display = Display(1 << 5);
    pub(crate) const LIST_ORDERED: Display = Display(1 << 6);
    pub(crate) const LIST_ITEM: Display = Display(1 << 7);
    pub(crate) const TABLE: Display = Display(1 << 8);
    pub(crate) const TABLE_ROW: Display = Display(1 << 9);
    pub(crate) const TABLE_CELL: Display = Display(1 << 10);
    pub(crate) const HEADER: Display = Display(1 << 11);
    pub(crate) const DL: Display = Display(1 << 12);
    pub(crate) const INPUT: Display = Display(1 << 13);
    pub(crate) const BUTTON: Display = Display(1 << 14);
    pub(crate) const SELECT: Display = Display(1 << 15);
    #[allow(dead_code)] // reserved display class, no element maps to it yet
    pub(crate) const SELECT_MULTI: Display = Display(1 << 16);
    pub(crate) const OPTION: Display = Display(1 << 17);

    /// Display classes that start and end on their own line.
    pub(crate) const BLOCKISH: Display = Display(
        Display::BLOCK.0
            | Display::HEADER.0
            | Display::PRE.0
            | Display::TABLE.0
            | Display::TABLE_ROW.0
            | Display::LIST.0
            | Display::LIST_ITEM.0,
    );

    pub(crate) const fn or(self, other: Display) -> Display {
        Display(self.0 | other.0)
    }

    pub(crate) const fn intersects(self, other: Display) -> bool {
        self.0 & other.0 != 0
    }

    pub(crate) fn insert(&mut self, other: Display) {
        self.0 |= other.0;
    }
}

impl BitOr for Display {
    type Output = Display;
    fn bitor(self, rhs: Display) -> Display {
        self.or(rhs)
    }
}

/// ANSI markup attributes, a bitset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Markup(u32);

impl Markup {
    pub(crate) const NONE: Markup = Markup(0);
    pub(crate) const BOLD: Markup = Markup(1 << 0);
    pub(crate) const ITALIC: Markup = Markup(1 << 1);
    pub(crate) const UNDERLINE: Markup = Markup(1 << 2);
    pub(crate) const BLINK: Markup = Markup(1 << 3);
    pub(crate) const REVERSE: Markup = Markup(1 << 4);
    pub(crate) const STRIKE: Markup = Markup(1 << 5);

    /// Every attribute, paired with its SGR set and reset sequences.
    pub(crate) const SGR: [(Markup, &'static str, &'static str); 6] = [
        (Markup::BOLD, "\x1b[1m", "\x1b[22m"),
        (Markup::ITALIC, "\x1b[3m", "\x1b[23m"),
        (Markup::UNDERLINE, "\x1b[4m", "\x1b[24m"),
        (Markup::BLINK, "\x1b[5m", "\x1b[25m"),
        (Markup::REVERSE, "\x1b[7m", "\x1b[27m"),
        (Markup::STRIKE, "\x1b[9m", "\x1b[29m"),
    ];

    pub(crate) const fn contains(self, other: Markup) -> bool {
        self.0 & other.0 == other.0
    }

    pub(crate) const fn is_none(self) -> bool {
        self.0 == 0
    }

    pub(crate) fn union(self, other: Markup) -> Markup {
        Markup(self.0 | other.0)
    }

    pub(crate) fn difference(self, other: Markup) -> Markup {
        Markup(self.0 & !other.0)
    }
}

/// Layout policy for one element.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TagInfo {
    pub name: &'static str,
    pub display: Display,
    pub markup: Markup,
    /// Display class of the expected parent; bounds the ancestor scan during
    /// optional-close recovery.
    pub parent_display: Display,
    pub is_void: bool,
    pub optional_close: bool,
    /// Minimum blank lines before/after the element.
    pub margin_top: u8,
    pub margin_bottom: u8,
    /// Columns added to the indent of everything inside the element.
    pub indent: i8,
}

/// Metadata applied to tags absent from the table.
pub(crate) const DEFAULT_TAG: TagInfo = t("", INLINE, NO_MARKUP, EMPTY, 0, 0, 0, 0, 0);

const fn t(
    name: &'static str,
    display: Display,
    markup: Markup,
    parent_display: Display,
    is_void: u8,
    optional_close: u8,
    margin_top: u8,
    margin_bottom: u8,
    indent: i8,
) -> TagInfo {
    TagInfo {
        name,
        display,
        markup,
        parent_display,
        is_void: is_void != 0,
        optional_close: optional_close != 0,
        margin_top,
        margin_bottom,
        indent,
    }
}

// Table shorthands.
const EMPTY: Display = Display::EMPTY;
const INLINE: Display = Display::INLINE;
const BLOCK: Display = Display::BLOCK;
const HIDDEN: Display = Display::HIDDEN;
const PRE: Display = Display::PRE;
const LIST: Display = Display::LIST;
const HEADER: Display = Display::HEADER;
const NO_MARKUP: Markup = Markup::NONE;
const BOLD: Markup = Markup::BOLD;
const ITALIC: Markup = Markup::ITALIC;
const UNDERLINE: Markup = Markup::UNDERLINE;
const BLINK: Markup = Markup::BLINK;
const REVERSE: Markup = Markup::REVERSE;
const STRIKE: Markup = Markup::STRIKE;

/// The tag table, sorted by name for binary search.
///
///   name          display                                markup     parent               v  o  mt mb ind
#[rustfmt::skip]
static TAGS: [TagInfo; 89] = [
    t("a",          INLINE,                                UNDERLINE, EMPTY,               0, 0, 0, 0, 0),
    t("address",    BLOCK,                                 NO_MARKUP, EMPTY,               0, 0, 0, 0, 0),
    t("area",       INLINE,                                NO_MARKUP, EMPTY,               1, 0, 0, 0, 0),
    t("article",    BLOCK,                                 NO_MARKUP, EMPTY,               0, 0, 0, 0, 0),
    t("aside",      BLOCK,                                 NO_MARKUP, EMPTY,               0, 0, 0, 0, 0),
    t("audio",      INLINE,                                UNDERLINE, EMPTY,               0, 0, 0, 0, 0),
    t("b",          INLINE,                                BOLD,      EMPTY,               0, 0, 0, 0, 0),
    t("base",       INLINE,                                NO_MARKUP, EMPTY,               1, 0, 0, 0, 0),
    t("blink",      INLINE,                                BLINK,     EMPTY,               0, 0, 0, 0, 0),
    t("blockquote", BLOCK,                                 NO_MARKUP, EMPTY,               0, 0, 0, 0, 2),
    t("body",       BLOCK,                                 NO_MARKUP, EMPTY,               0, 0, 0, 0, 0),
    t("br",         EMPTY,                                 NO_MARKUP, EMPTY,               1, 0, 0, 0, 0),
    t("button",     INLINE.or(Display::BUTTON),            NO_MARKUP, EMPTY,               0, 0, 0, 0, 0),
    t("cite",       INLINE,                                ITALIC,    EMPTY,               0, 0, 0, 0, 0),
    t("col",        INLINE,                                NO_MARKUP, EMPTY,               1, 0, 0, 0, 0),
    t("colgroup",   INLINE,                                NO_MARKUP, EMPTY,               0, 1, 0, 0, 0),
    t("datalist",   HIDDEN,                                NO_MARKUP, EMPTY,               0, 0, 0, 0, 0),
    t("dd",         BLOCK,                                 NO_MARKUP, Display::DL,         0, 1, 0, 0, 4),
    t("del",        INLINE,                                STRIKE,    EMPTY,               0, 0, 0, 0, 0),
    t("details",    BLOCK,                                 NO_MARKUP, EMPTY,               0, 0, 0, 0, 0),
    t("dfn",        INLINE,                                ITALIC,    EMPTY,               0, 0, 0, 0, 0),
    t("dir",        LIST,                                  NO_MARKUP, EMPTY,               0, 0, 1, 1, 0),
    t("div",        BLOCK,                                 NO_MARKUP, EMPTY,               0, 0, 0, 0, 0),
    t("dl",         BLOCK.or(Display::DL),                 NO_MARKUP, EMPTY,               0, 0, 0, 0, 0),
    t("dt",         BLOCK,                                 BOLD,      Display::DL,         0, 1, 0, 0, 0),
    t("em",         INLINE,                                ITALIC,    EMPTY,               0, 0, 0, 0, 0),
    t("embed",      INLINE,                                NO_MARKUP, EMPTY,               1, 0, 0, 0, 0),
    t("fieldset",   BLOCK,                                 NO_MARKUP, EMPTY,               0, 0, 0, 0, 0),
    t("figcaption", BLOCK,                                 NO_MARKUP, EMPTY,               0, 0, 0, 0, 0),
    t("figure",     BLOCK,                                 NO_MARKUP, EMPTY,               0, 0, 1, 1, 4),
    t("footer",     BLOCK,                                 NO_MARKUP, EMPTY,               0, 0, 0, 0, 0),
    t("form",       BLOCK,                                 NO_MARKUP, EMPTY,               0, 0, 0, 1, 0),
    t("frame",      INLINE,                                NO_MARKUP, EMPTY,               1, 0, 0, 0, 0),
    t("h1",         HEADER,                                BOLD,      EMPTY,               0, 0, 1, 1, -2),
    t("h2",         HEADER,                                BOLD,      EMPTY,               0, 0, 1, 1, -2),
    t("h3",         HEADER,                                BOLD,      EMPTY,               0, 0, 1, 1, -2),
    t("h4",         HEADER,                                BOLD,      EMPTY,               0, 0, 1, 1, -2),
    t("h5",         HEADER,                                BOLD,      EMPTY,               0, 0, 1, 1, -2),
    t("h6",         HEADER,                                BOLD,      EMPTY,               0, 0, 1, 1, -2),
    t("head",       BLOCK,                                 NO_MARKUP, EMPTY,               0, 1, 0, 0, 0),
    t("header",     BLOCK,                                 NO_MARKUP, EMPTY,               0, 0, 0, 0, 0),
    t("hr",         BLOCK,                                 NO_MARKUP, EMPTY,               1, 0, 0, 0, 0),
    t("html",       BLOCK,                                 NO_MARKUP, EMPTY,               0, 1, 0, 0, 0),
    t("i",          INLINE,                                ITALIC,    EMPTY,               0, 0, 0, 0, 0),
    t("img",        INLINE,                                UNDERLINE, EMPTY,               1, 0, 0, 0, 0),
    t("input",      Display::INPUT,                        NO_MARKUP, EMPTY,               1, 0, 0, 0, 0),
    t("ins",        INLINE,                                UNDERLINE, EMPTY,               0, 0, 0, 0, 0),
    t("label",      INLINE,                                NO_MARKUP, EMPTY,               0, 0, 0, 0, 0),
    t("legend",     BLOCK,                                 NO_MARKUP, EMPTY,               0, 0, 0, 0, 0),
    t("li",         Display::LIST_ITEM,                    NO_MARKUP, LIST,                0, 1, 0, 0, 0),
    t("link",       INLINE,                                NO_MARKUP, EMPTY,               1, 0, 0, 0, 0),
    t("main",       BLOCK,                                 NO_MARKUP, EMPTY,               0, 0, 0, 0, 0),
    t("mark",       INLINE,                                REVERSE,   EMPTY,               0, 0, 0, 0, 0),
    t("menu",       LIST,                                  NO_MARKUP, EMPTY,               0, 0, 1, 1, 0),
    t("meta",       INLINE,                                NO_MARKUP, EMPTY,               1, 0, 0, 0, 0),
    t("nav",        BLOCK,                                 NO_MARKUP, EMPTY,               0, 0, 0, 0, 0),
    t("object",     INLINE,                                NO_MARKUP, EMPTY,               0, 0, 0, 0, 0),
    t("ol",         LIST.or(Display::LIST_ORDERED),        NO_MARKUP, EMPTY,               0, 0, 1, 1, 0),
    t("option",     INLINE.or(Display::OPTION),            NO_MARKUP, Display::SELECT,     0, 1, 0, 0, 0),
    t("p",          BLOCK,                                 NO_MARKUP, EMPTY,               0, 1, 1, 1, 0),
    t("param",      INLINE,                                NO_MARKUP, EMPTY,               1, 0, 0, 0, 0),
    t("pre",        PRE,                                   NO_MARKUP, EMPTY,               0, 0, 1, 1, 0),
    t("s",          INLINE,                                STRIKE,    EMPTY,               0, 0, 0, 0, 0),
    t("script",     HIDDEN,                                NO_MARKUP, EMPTY,               0, 0, 0, 0, 0),
    t("search",     BLOCK,                                 NO_MARKUP, EMPTY,               0, 0, 0, 0, 0),
    t("section",    BLOCK,                                 NO_MARKUP, EMPTY,               0, 0, 0, 0, 0),
    t("select",     INLINE.or(Display::SELECT),            NO_MARKUP, EMPTY,               0, 0, 0, 0, 0),
    t("source",     INLINE,                                NO_MARKUP, EMPTY,               1, 0, 0, 0, 0),
    t("strike",     INLINE,                                STRIKE,    EMPTY,               0, 0, 0, 0, 0),
    t("strong",     INLINE,                                BOLD,      EMPTY,               0, 0, 0, 0, 0),
    t("style",      HIDDEN,                                NO_MARKUP, EMPTY,               0, 0, 0, 0, 0),
    t("summary",    BLOCK,                                 NO_MARKUP, EMPTY,               0, 0, 0, 0, 0),
    t("table",      Display::TABLE,                        NO_MARKUP, EMPTY,               0, 0, 0, 0, 0),
    t("tbody",      INLINE,                                NO_MARKUP, Display::TABLE,      0, 1, 0, 0, 0),
    t("td",         Display::TABLE_CELL,                   NO_MARKUP, Display::TABLE_ROW,  0, 1, 0, 0, 0),
    t("template",   HIDDEN,                                NO_MARKUP, EMPTY,               0, 0, 0, 0, 0),
    t("textarea",   INLINE,                                NO_MARKUP, EMPTY,               0, 0, 0, 0, 0),
    t("tfoot",      INLINE,                                NO_MARKUP, Display::TABLE,      0, 1, 0, 0, 0),
    t("th",         Display::TABLE_CELL,                   BOLD,      Display::TABLE_ROW,  0, 1, 0, 0, 0),
    t("thead",      INLINE,                                NO_MARKUP, Display::TABLE,      0, 1, 0, 0, 0),
    t("title",      BLOCK,                                 NO_MARKUP, EMPTY,               0, 0, 0, 1, -2),
    t("tr",         Display::TABLE_ROW,                    NO_MARKUP, Display::TABLE,      0, 1, 0, 0, 0),
    t("track",      INLINE,                                NO_MARKUP, EMPTY,               1, 0, 0, 0, 0),
    t("u",          INLINE,                                UNDERLINE, EMPTY,               0, 0, 0, 0, 0),
    t("ul",         LIST,                                  NO_MARKUP, EMPTY,               0, 0, 1, 1, 0),
    t("var",        INLINE,                                ITALIC,    EMPTY,               0, 0, 0, 0, 0),
    t("video",      INLINE,                                UNDERLINE, EMPTY,               0, 0, 0, 0, 0),
    t("wbr",        INLINE,                                NO_MARKUP, EMPTY,               1, 0, 0, 0, 0),
    t("xmp",        PRE,                                   NO_MARKUP, EMPTY,               0, 0, 1, 1, 0),
];

/// Look up a tag by name, case-insensitively.
pub(crate) fn find(name: &str) -> Option<&'static TagInfo> {
    TAGS.binary_search_by(|entry| cmp_ignore_ascii_case(entry.name, name))
        .ok()
        .map(|i| &TAGS[i])
}

fn cmp_ignore_ascii_case(a: &str, b: &str) -> std::cmp::Ordering {
    let lower_a = a.bytes().map(|c| c.to_ascii_lowercase());
    let lower_b = b.bytes().map(|c| c.to_ascii_lowercase());
    lower_a.cmp(lower_b)
}
