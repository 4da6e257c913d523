// The layout driver: event handlers for the tokenizer stream.
//
// For each start tag: synthesize the closes HTML allows authors to omit,
// push a frame, ingest attributes, then commit the visible side effects
// (margins, bullets, input glyphs, header prefixes, link capture). For each
// end tag: recover symmetrically, close frames down to the match, restore
// markup, and re-check the reader-mode selector. Close recovery is a plain
// stack operation, never a reentrant callback.

use std::io::Write;

use markup5ever::Attribute;

use crate::error::Error;
use crate::render::frame::{Frame, MAX_DEPTH};
use crate::render::links;
use crate::tags::{self, Display, TagInfo};
use crate::uri::{self, Uri};

use super::Engine;

/// Attributes of the tag being opened that only matter at commit time.
#[derive(Default)]
struct TagAttrs {
    alt: String,
    input_type: String,
    input_value: String,
    checked: Option<String>,
    /// href/src/data, whichever the element carries.
    link: Option<String>,
}

impl<W: Write, R: Write> Engine<W, R> {
    // -----------------------------------------------------------------------
    // Character data
    // -----------------------------------------------------------------------

    /// Buffer a chunk of character data for the current run.
    pub(crate) fn data(&mut self, chunk: &str) {
        if self.fatal.is_some() || self.reader_ignore || self.stack.top().is_hidden() {
            return;
        }
        self.char_data.push_str(chunk);
    }

    /// End of a character-data run: emit it as preformatted text when a
    /// `pre`-class element is open, otherwise through whitespace coalescing.
    pub(crate) fn flush_data(&mut self) {
        if self.char_data.is_empty() {
            return;
        }
        let run = std::mem::take(&mut self.char_data);
        if self.fatal.is_some() || self.reader_ignore || self.stack.top().is_hidden() {
            return;
        }

        let in_pre = self
            .stack
            .frames()
            .iter()
            .any(|f| f.display().intersects(Display::PRE));
        if in_pre {
            if self.fmt.pre_text(&run) {
                self.stack.top_mut().has_data = true;
            }
        } else {
            let mut touched = false;
            for c in run.chars() {
                touched |= self.fmt.text_char(c);
            }
            if touched {
                self.stack.top_mut().has_data = true;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Start tags
    // -----------------------------------------------------------------------

    pub(crate) fn start_tag(&mut self, name: &str, attrs: &[Attribute], self_closing: bool) {
        if self.fatal.is_some() {
            return;
        }
        if self.stack.depth() >= MAX_DEPTH {
            tracing::warn!(depth = self.stack.depth(), "element nesting cap reached");
            self.fatal = Some(Error::DepthExceeded);
            return;
        }

        let info = tags::find(name);
        self.synthesize_closes_for_open(name, info);

        let mut frame = Frame::open(name, info);
        if self.stack.top().is_hidden() {
            // A hidden parent hides the whole subtree.
            frame.info.display.insert(Display::HIDDEN);
        }
        self.stack.push(frame);

        let extra = self.ingest_attributes(name, attrs);
        self.commit_tag(&extra, self_closing);
    }

    /// The optional-close rules applied before a tag opens: a new list
    /// closes an open paragraph, a new `li` the previous `li`, and so on.
    /// Each scan stops at the display class that would contain the target.
    fn synthesize_closes_for_open(&mut self, name: &str, info: Option<&'static TagInfo>) {
        let Some(info) = info else { return };

        let target = if info.display.intersects(Display::LIST) {
            self.stack.recovery_target(&["p"], Display::LIST)
        } else if info.optional_close {
            match info.name {
                "li" => self.stack.recovery_target(&["li"], Display::LIST),
                "td" => self.stack.recovery_target(&["td"], Display::TABLE_ROW),
                "tr" => self.stack.recovery_target(&["tr"], Display::TABLE),
                "p" => self.stack.recovery_target(&["p"], Display::EMPTY),
                "dt" => self.stack.recovery_target(&["dd"], Display::DL),
                "dd" => self.stack.recovery_target(&["dd", "dt"], Display::DL),
                "option" => self.stack.recovery_target(&["option"], Display::SELECT),
                _ => {
                    // Repeated optional-close element directly on top.
                    if self.stack.top().name.eq_ignore_ascii_case(name) {
                        Some(self.stack.depth() - 1)
                    } else {
                        None
                    }
                }
            }
        } else if info.display.intersects(Display::BLOCK) {
            self.stack.recovery_target(&["p", "dl"], Display::DL)
        } else {
            None
        };

        if let Some(index) = target {
            self.close_frames_from(index);
        }
    }

    fn ingest_attributes(&mut self, name: &str, attrs: &[Attribute]) -> TagAttrs {
        let mut extra = TagAttrs::default();
        for attr in attrs {
            let key: &str = &attr.name.local;
            let value: &str = &attr.value;
            match key {
                "id" => self.stack.top_mut().set_id(value),
                "class" => self.stack.top_mut().set_classes(value),
                "aria-hidden" | "hidden" => {
                    self.stack.top_mut().info.display.insert(Display::HIDDEN)
                }
                "href" => {
                    if name == "base" {
                        self.lock_base(value);
                    } else if name == "a" && !value.is_empty() {
                        extra.link = Some(value.to_string());
                    }
                }
                "src" => {
                    if matches!(name, "img" | "video" | "audio" | "source" | "track")
                        && !value.is_empty()
                    {
                        extra.link = Some(value.to_string());
                    }
                }
                "data" => {
                    if name == "object" && !value.is_empty() {
                        extra.link = Some(value.to_string());
                    }
                }
                "alt" => {
                    if name == "img" {
                        extra.alt = value.to_string();
                    }
                }
                "type" => extra.input_type = value.to_string(),
                "value" => extra.input_value = value.to_string(),
                // A bare `checked` attribute counts as checked.
                "checked" => {
                    extra.checked = Some(if value.is_empty() {
                        "checked".to_string()
                    } else {
                        value.to_string()
                    })
                }
                _ => {}
            }
        }
        extra
    }

    /// Lock the document base on the first `<base href>` that parses; later
    /// ones are ignored. A `-b` base always wins.
    fn lock_base(&mut self, value: &str) {
        if self.base.is_some() || value.is_empty() {
            return;
        }
        match Uri::parse(value) {
            Some(parsed) => {
                tracing::debug!(base = value, "document base locked");
                self.base = Some(parsed);
            }
            None => tracing::debug!(base = value, "ignoring unparsable document base"),
        }
    }

    /// The fully-attributed tag: update counts, apply reader-mode selectors,
    /// capture the link reference, then the visible block-open effects.
    fn commit_tag(&mut self, extra: &TagAttrs, self_closing: bool) {
        let top_hidden = self.stack.top().is_hidden();
        if let Some(parent) = self.stack.parent_of_top_mut() {
            parent.children += 1;
            if !top_hidden {
                parent.visible_children += 1;
            }
        }

        if let Some(show) = &self.show {
            if self.reader_ignore && show.matches(self.stack.frames()) {
                tracing::debug!(element = %self.stack.top().name, "reader mode: showing subtree");
                self.reader_ignore = false;
            }
        }
        if let Some(hide) = &self.hide {
            if hide.matches(self.stack.frames()) {
                tracing::debug!(element = %self.stack.top().name, "hide selector matched");
                self.stack.top_mut().info.display.insert(Display::HIDDEN);
            }
        }

        {
            let top = self.stack.top_mut();
            top.indent = top.info.indent as i32;
        }

        if !self.reader_ignore {
            if let Some(url) = &extra.link {
                self.capture_link(url);
            }
            self.emit_alt(&extra.alt);
        }

        if !self.stack.top().is_hidden() && !self.reader_ignore {
            self.apply_open_effects(extra);
        }

        // Void elements never see an end tag; close them here. A
        // self-closing tag behaves the same way.
        if self.stack.top().info.is_void || self_closing {
            let name = self.stack.top().name.clone();
            self.handle_end_tag(&name, true);
        }
    }

    /// Everything a visible tag prints or prepares when it opens.
    fn apply_open_effects(&mut self, extra: &TagAttrs) {
        self.sync_indent();
        let info = self.stack.top().info;
        let display = info.display;

        if display.intersects(Display::BLOCKISH) {
            self.block_start();
        }

        let mut margin = info.margin_top as usize;
        if display.intersects(Display::LIST) {
            // A nested list under an item that already produced data sits
            // tight against it.
            let below = self.stack.depth() - 1;
            for f in self.stack.frames()[..below].iter().rev() {
                if f.display().intersects(Display::LIST) {
                    break;
                }
                if !f.display().intersects(Display::LIST_ITEM) {
                    continue;
                }
                if f.has_data && margin > 0 {
                    margin -= 1;
                    break;
                }
            }
        } else if display.intersects(Display::BLOCK.or(Display::TABLE)) {
            // Top-of-container suppression.
            if !self.stack.container_has_data() && margin > 0 {
                margin -= 1;
            }
        }
        if margin > 0 {
            self.fmt.require_margin(margin);
        }

        if display.intersects(Display::PRE) {
            self.fmt.set_skip_ws(true);
        } else if display.intersects(Display::TABLE_CELL) {
            let visible_cells = self.stack.parent_of_top().map_or(0, |p| p.visible_children);
            if visible_cells > 1 {
                self.fmt.putc('\t');
            }
        } else if display.intersects(Display::LIST_ITEM) {
            self.list_item_marker();
        } else if display.intersects(Display::INPUT) {
            self.input_glyph(extra);
        }

        self.fmt.start_markup(info.markup);

        if display.intersects(Display::HEADER) {
            self.header_prefix();
        }

        // Markers emitted so far (bullets, glyphs) do not count as data.
        self.stack.top_mut().has_data = false;

        match self.stack.top().name.as_str() {
            "hr" => {
                let count = self.fmt.width() as i32 - self.fmt.indent().max(0);
                let ruler = self.glyphs.ruler;
                for _ in 0..count.max(0) {
                    self.fmt.put_str(ruler);
                }
                self.stack.top_mut().has_data = true;
            }
            "br" => {
                self.fmt.force_newline();
                self.stack.top_mut().has_data = true;
            }
            _ => {}
        }
    }

    /// Bullet or ordinal for a list item; the item's own indent is assigned
    /// afterwards so wrapped lines align under the text.
    fn list_item_marker(&mut self) {
        self.fmt.set_skip_ws(false);
        let Some(parent) = self.stack.parent_of_top() else {
            return;
        };
        let parent_display = parent.display();
        let ordinal = parent.children;

        if parent_display.intersects(Display::LIST_ORDERED) {
            let marker = format!("{ordinal:>4}. ");
            self.fmt.put_str(&marker);
            self.stack.top_mut().indent = 6;
        } else if parent_display.intersects(Display::LIST) {
            let bullet = self.glyphs.bullet;
            self.fmt.put_str(bullet);
            self.stack.top_mut().indent = 2;
        }
        self.fmt.set_skip_ws(false);
        self.sync_indent();
    }

    /// `[value]`-style glyphs for form controls.
    fn input_glyph(&mut self, extra: &TagAttrs) {
        let checked = extra
            .checked
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("checked"));

        match extra.input_type.to_ascii_lowercase().as_str() {
            "button" | "submit" | "reset" => {
                let glyph = format!("[{}]", extra.input_value);
                self.fmt.put_str(&glyph);
            }
            "checkbox" => {
                let mark = if checked { self.glyphs.checked_box } else { " " };
                let glyph = format!("[{mark}]");
                self.fmt.put_str(&glyph);
            }
            "radio" => {
                let mark = if checked {
                    self.glyphs.checked_radio
                } else {
                    " "
                };
                let glyph = format!("[{mark}]");
                self.fmt.put_str(&glyph);
            }
            "hidden" => {
                self.stack.top_mut().info.display.insert(Display::HIDDEN);
            }
            // Text fields and anything unrecognized render as a text field.
            _ => {
                let glyph = format!("[{:<15}]", extra.input_value);
                self.fmt.put_str(&glyph);
            }
        }
    }

    /// `h2`…`h6` carry one to five section signs; `h1` stays plain.
    fn header_prefix(&mut self) {
        if self.glyphs.section.is_empty() {
            return;
        }
        let level = self
            .stack
            .top()
            .name
            .strip_prefix('h')
            .and_then(|d| d.parse::<u32>().ok());
        let Some(level @ 2..=6) = level else { return };
        let section = self.glyphs.section;
        for _ in 1..level {
            self.fmt.put_str(section);
        }
        self.fmt.putc(' ');
    }

    /// Resolve and attribute a link URL to the opening frame. Hidden frames
    /// register immediately; visible ones register when they close.
    fn capture_link(&mut self, raw: &str) {
        if !self.collect_links {
            return;
        }
        let mut url = raw.to_string();
        if !uri::has_scheme(raw) {
            if let Some(base) = &self.base {
                if let Some(resolved) = Uri::parse(raw).and_then(|rel| rel.resolve(base)) {
                    if !resolved.scheme.is_empty() {
                        url = resolved.format();
                    }
                }
            }
        }
        if url.is_empty() {
            return;
        }

        if self.stack.top().is_hidden() {
            let kind = links::link_kind(&self.stack.top().name).to_string();
            self.register_link(&url, &kind, true);
        } else {
            self.stack.top_mut().link_url = url;
        }
    }

    fn register_link(&mut self, url: &str, kind: &str, hidden: bool) -> usize {
        let (seq, is_new) = self.links.register(url, kind, hidden);
        if is_new {
            tracing::debug!(url, kind, hidden, seq, "reference registered");
            if let Some(sink) = &mut self.resources {
                if self.resource_error.is_none() {
                    if let Err(err) = writeln!(sink, "{kind}\t{url}") {
                        self.resource_error = Some(err);
                    }
                }
            }
        }
        seq
    }

    /// `img` alt text, through the coalescing path.
    fn emit_alt(&mut self, alt: &str) {
        if alt.is_empty() || self.stack.top().is_hidden() {
            return;
        }
        for c in alt.chars() {
            self.fmt.text_char(c);
        }
        self.fmt.flush_word();
    }

    /// Break the line for an opening block, but only when the enclosing
    /// element has already produced something.
    fn block_start(&mut self) {
        self.fmt.flush_word();
        self.fmt.clear_inline_ws();
        if !self.fmt.line_has_content() {
            return;
        }
        if self.stack.parent_of_top().is_some_and(|p| p.has_data) {
            self.fmt.end_line();
        }
    }

    // -----------------------------------------------------------------------
    // End tags
    // -----------------------------------------------------------------------

    pub(crate) fn end_tag(&mut self, name: &str) {
        self.handle_end_tag(name, false);
    }

    fn handle_end_tag(&mut self, name: &str, synthetic: bool) {
        if self.fatal.is_some() {
            return;
        }
        let info = tags::find(name);

        // An explicit close of a void element (`</br>`) is not a close.
        if !synthetic && info.is_some_and(|i| i.is_void) {
            return;
        }

        if let Some(info) = info {
            let display = info.display;
            let target = if display.intersects(Display::PRE) {
                self.fmt.set_skip_ws(false);
                None
            } else if display.intersects(Display::LIST) {
                self.stack.recovery_target(&["li"], Display::LIST)
            } else if display.intersects(Display::TABLE_ROW) {
                self.stack.recovery_target(&["td"], Display::TABLE_ROW)
            } else if display.intersects(Display::TABLE) {
                self.stack.recovery_target(&["td"], Display::TABLE)
            } else if display.intersects(Display::DL) {
                self.stack.recovery_target(&["p", "dd", "dt"], Display::DL)
            } else {
                None
            };
            if let Some(index) = target {
                self.close_frames_from(index);
            }
        }

        if self.stack.depth() > 1 && self.stack.top().name.eq_ignore_ascii_case(name) {
            self.close_frames_from(self.stack.depth() - 1);
        } else if let Some(index) = self.stack.rfind_name(name) {
            self.close_frames_from(index);
        } else if let Some(info) = info {
            // No matching open tag: still flush the end-of-block effects.
            self.block_end_effects(info);
        }

        self.sync_indent();
        let markup = self.stack.top().info.markup;
        self.fmt.start_markup(markup);

        // Leaving the shown subtree re-enables reader-mode suppression.
        if let Some(show) = &self.show {
            if !self.reader_ignore && !show.matches(self.stack.frames()) {
                tracing::debug!("reader mode: suppressing again");
                self.reader_ignore = true;
                self.fmt.force_newline();
            }
        }
    }

    /// Close every frame from the top down to and including `index`.
    fn close_frames_from(&mut self, index: usize) {
        let index = index.max(1);
        while self.stack.depth() > index {
            self.close_top_frame();
        }
        self.sync_indent();
    }

    /// Close the top frame: propagate its data flag, drop its markup,
    /// register its link reference and apply the block-end policy.
    fn close_top_frame(&mut self) {
        if self.stack.top().has_data {
            self.stack.mark_all_data();
        }

        let markup = self.stack.top().info.markup;
        self.fmt.end_markup(markup);

        let hidden = self.reader_ignore || self.stack.top().is_hidden();
        if !hidden && !self.stack.top().link_url.is_empty() {
            let url = self.stack.top().link_url.clone();
            let kind = links::link_kind(&self.stack.top().name).to_string();
            let seq = self.register_link(&url, &kind, false);
            if self.inline_refs {
                let marker = format!("[{seq}]");
                self.fmt.put_str(&marker);
            }
            if self.inline_urls {
                let marker = format!(" [{kind}: {url}]");
                self.fmt.put_str(&marker);
            }
            if self.inline_refs || self.inline_urls {
                self.fmt.flush_word();
            }
        }

        let info = self.stack.top().info;
        self.block_end_effects(&info);
        self.stack.pop();
    }

    /// Line break and bottom margin when a block-class element ends.
    fn block_end_effects(&mut self, info: &TagInfo) {
        if info.display.intersects(Display::HIDDEN) || self.reader_ignore {
            return;
        }

        if info.display.intersects(Display::BLOCKISH) {
            self.fmt.flush_word();
            self.fmt.clear_inline_ws();
            if self.fmt.line_has_content() {
                self.fmt.end_line();
            }
        }

        let mut margin = info.margin_bottom as usize;
        if margin > 0 && info.display.intersects(Display::LIST) {
            // A list ending inside another list keeps the rows tight.
            let below = self.stack.depth() - 1;
            if self.stack.find_display_below(below, Display::LIST).is_some() {
                margin -= 1;
            }
        }
        if margin > 0 {
            self.fmt.require_margin(margin);
        }
    }

    fn sync_indent(&mut self) {
        let indent = self.stack.indent_sum();
        self.fmt.set_indent(indent);
    }

    // -----------------------------------------------------------------------
    // End of document
    // -----------------------------------------------------------------------

    /// Flush everything, emit the references section, and surface any error
    /// recorded along the way.
    pub(crate) fn finish(mut self) -> Result<(), Error> {
        self.flush_data();

        if let Some(err) = self.fatal.take() {
            self.fmt.flush();
            return Err(err);
        }

        self.fmt.finish_line();
        self.fmt.reset_markup();

        if self.refs_section && !self.links.is_empty() {
            self.print_references();
        }

        self.fmt.flush();
        if let Some(err) = self.fmt.take_error() {
            return Err(Error::Io(err));
        }
        if let Some(err) = self.resource_error.take() {
            return Err(Error::Io(err));
        }
        Ok(())
    }

    fn print_references(&mut self) {
        let bullet = self.glyphs.ref_bullet;
        let header = self.glyphs.refs_header;
        let hidden_header = self.glyphs.hidden_refs_header;

        let mut section = format!("\n{header}\n\n");
        for reference in self.links.visible() {
            section.push_str(&format!(
                "{bullet}({}) {} ({})\n",
                reference.seq, reference.url, reference.kind
            ));
        }
        if self.links.hidden().next().is_some() {
            section.push_str(&format!("\n{hidden_header}\n\n"));
            for reference in self.links.hidden() {
                section.push_str(&format!(
                    "{bullet}({}) {} ({})\n",
                    reference.seq, reference.url, reference.kind
                ));
            }
        }
        self.fmt.raw(&section);
    }
}
