// Terminal line formatter.
//
// Owns the output sink and the state of the single line being produced.
// Vertical whitespace is lazy: block margins and forced breaks accumulate as
// `pending` newlines that are only written immediately before the next
// visible character. Margins reconcile against what is already pending or
// written, so repeated block boundaries produce the declared number of blank
// lines, never a multiple; pending newlines left over at end of document are
// dropped, so output ends with exactly one `\n` after the last visible line.

use std::io::{self, Write};

use unicode_width::UnicodeWidthChar;

use crate::tags::Markup;

const TAB_STOP: usize = 8;

/// Whitespace per the HTML data rules (space, TAB, LF, VT, FF, CR).
fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r')
}

fn is_ctrl(c: char) -> bool {
    (c as u32) < 0x20 || c == '\x7f'
}

/// Cells one character occupies: TAB advances a full stop, otherwise the
/// codepoint's terminal width.
fn cell_width(c: char) -> usize {
    if c == '\t' {
        TAB_STOP
    } else {
        UnicodeWidthChar::width(c).unwrap_or(0)
    }
}

pub(crate) struct LineFormatter<W> {
    out: W,
    error: Option<io::Error>,
    width: usize,
    ansi: bool,
    wrap: bool,
    /// Bytes written on the current line (markup bytes included).
    line_len: usize,
    /// Cells consumed on the current line.
    cells: usize,
    /// Newlines owed before the next visible character.
    pending: usize,
    /// Newlines already written and still trailing the output.
    trailing: usize,
    /// Whether any visible output has been produced yet.
    has_output: bool,
    /// Drop whitespace until the next visible character.
    skip_ws: bool,
    /// Bit 1: whitespace seen; bit 2: non-whitespace emitted on this line.
    ws_state: u8,
    /// Word-wrap buffer: everything since the last break opportunity.
    word: String,
    /// Cells the buffered word will occupy (markup bytes excluded).
    word_cells: usize,
    indent: i32,
    markup: Markup,
}

impl<W: Write> LineFormatter<W> {
    pub(crate) fn new(out: W, width: usize, ansi: bool, wrap: bool) -> LineFormatter<W> {
        LineFormatter {
            out,
            error: None,
            width,
            ansi,
            wrap,
            line_len: 0,
            cells: 0,
            pending: 0,
            trailing: 0,
            has_output: false,
            skip_ws: true,
            ws_state: 0,
            word: String::new(),
            word_cells: 0,
            indent: 0,
            markup: Markup::NONE,
        }
    }

    pub(crate) fn width(&self) -> usize {
        self.width
    }

    pub(crate) fn indent(&self) -> i32 {
        self.indent
    }

    pub(crate) fn set_indent(&mut self, indent: i32) {
        self.indent = indent;
    }

    pub(crate) fn set_skip_ws(&mut self, skip: bool) {
        self.skip_ws = skip;
    }

    pub(crate) fn line_has_content(&self) -> bool {
        self.line_len > 0
    }

    /// Forget that whitespace coalescing saw content on this line.
    pub(crate) fn clear_inline_ws(&mut self) {
        self.ws_state &= !2;
    }

    // -----------------------------------------------------------------------
    // Raw sink access
    // -----------------------------------------------------------------------

    fn write_bytes(&mut self, bytes: &[u8]) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.out.write_all(bytes) {
            self.error = Some(err);
        }
    }

    fn write_char_raw(&mut self, c: char) {
        let mut buf = [0u8; 4];
        let encoded = c.encode_utf8(&mut buf);
        self.write_bytes(encoded.as_bytes());
    }

    /// Write a string bypassing all line state. For the epilogue only.
    pub(crate) fn raw(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    pub(crate) fn flush(&mut self) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.out.flush() {
            self.error = Some(err);
        }
    }

    pub(crate) fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    // -----------------------------------------------------------------------
    // Line structure
    // -----------------------------------------------------------------------

    /// Materialize pending newlines, then the indent prefix and the active
    /// markup. Called right before the first visible byte of a line.
    fn begin_line(&mut self) {
        if self.pending > 0 {
            if self.has_output {
                for _ in 0..self.pending {
                    self.write_bytes(b"\n");
                }
                self.trailing += self.pending;
            }
            self.pending = 0;
        }
        if self.ansi && !self.markup.is_none() {
            self.write_bytes(b"\x1b[0m");
        }
        let total = self.indent.max(0) as usize;
        let tabs = total / TAB_STOP;
        let spaces = total % TAB_STOP;
        for _ in 0..tabs {
            self.write_bytes(b"\t");
        }
        for _ in 0..spaces {
            self.write_bytes(b" ");
        }
        self.line_len += tabs + spaces;
        self.cells += total;
        // Re-emit per line so line-based pagers keep the style.
        if self.ansi && !self.markup.is_none() {
            for (attr, on, _) in Markup::SGR {
                if self.markup.contains(attr) {
                    self.write_bytes(on.as_bytes());
                }
            }
        }
    }

    fn write_visible(&mut self, c: char) {
        if self.line_len == 0 {
            self.begin_line();
        }
        self.write_char_raw(c);
        self.line_len += c.len_utf8();
        self.cells += cell_width(c);
        self.trailing = 0;
        self.has_output = true;
    }

    /// End the current line now, mid-wrap. The newline is real, not pending.
    fn hard_break(&mut self) {
        if self.has_output {
            self.write_bytes(b"\n");
            self.trailing += 1;
        }
        self.line_len = 0;
        self.cells = 0;
    }

    /// Request that the current line be terminated (once).
    pub(crate) fn end_line(&mut self) {
        if self.line_len > 0 && self.pending == 0 {
            self.pending = 1;
            self.line_len = 0;
            self.cells = 0;
        }
        self.ws_state &= !2;
    }

    /// Force one newline beyond whatever is already owed (`<br>`).
    pub(crate) fn force_newline(&mut self) {
        if self.skip_ws {
            return;
        }
        self.flush_word();
        self.pending += 1;
        self.line_len = 0;
        self.cells = 0;
        self.ws_state &= !2;
    }

    /// Ensure at least `margin` blank lines separate the surrounding content.
    /// From an unterminated line the margin newlines terminate it first.
    pub(crate) fn require_margin(&mut self, margin: usize) {
        self.flush_word();
        if self.line_len > 0 && self.pending == 0 {
            if margin > 0 {
                self.pending = margin;
                self.line_len = 0;
                self.cells = 0;
            }
            return;
        }
        let have = self.trailing + self.pending;
        let want = margin + 1;
        if want > have {
            self.pending += want - have;
        }
    }

    // -----------------------------------------------------------------------
    // Characters
    // -----------------------------------------------------------------------

    /// Emit one visible character (never `\n`), honoring leading-whitespace
    /// suppression, control stripping and word wrap.
    pub(crate) fn putc(&mut self, c: char) {
        if is_space(c) {
            if self.skip_ws {
                return;
            }
        } else {
            self.skip_ws = false;
        }
        if c != '\t' && is_ctrl(c) {
            return;
        }

        if !self.wrap {
            self.write_visible(c);
            return;
        }

        // The word no longer fits at all: break and flush it as-is.
        if self.cells + self.word_cells >= self.width {
            self.hard_break();
            self.flush_word();
        }

        if is_space(c) || c == '-' {
            if self.cells + self.word_cells >= self.width {
                self.hard_break();
            }
            self.word.push(c);
            self.word_cells += cell_width(c);
            self.flush_word();
            return;
        }

        self.word.push(c);
        self.word_cells += cell_width(c);
    }

    pub(crate) fn put_str(&mut self, s: &str) {
        for c in s.chars() {
            self.putc(c);
        }
    }

    /// Emit one character of element data, coalescing whitespace runs to a
    /// single space and dropping control characters. Returns whether the
    /// character reached the line (the caller tracks per-element data).
    pub(crate) fn text_char(&mut self, c: char) -> bool {
        if is_space(c) {
            let emit = self.ws_state == 2;
            if emit {
                self.putc(' ');
            }
            self.ws_state |= 1;
            emit
        } else {
            self.ws_state = 2;
            if !is_ctrl(c) {
                self.putc(c);
            }
            true
        }
    }

    /// Emit preformatted data literally: newlines are real, TAB expands to a
    /// full stop, control characters are stripped, no wrapping. One leading
    /// newline is skipped at the start of the block. Returns whether any
    /// content remained.
    pub(crate) fn pre_text(&mut self, s: &str) -> bool {
        let mut s = s;
        if self.skip_ws {
            if let Some(rest) = s.strip_prefix('\n') {
                s = rest;
            }
        }
        self.flush_word();
        self.skip_ws = false;

        for c in s.chars() {
            match c {
                '\n' => self.pre_newline(),
                '\t' => {
                    if self.line_len == 0 {
                        self.begin_line();
                    }
                    self.write_bytes(b"        ");
                    self.line_len += TAB_STOP;
                    self.cells += TAB_STOP;
                    self.trailing = 0;
                    self.has_output = true;
                }
                c if is_ctrl(c) => {}
                c => {
                    if self.line_len == 0 {
                        self.begin_line();
                    }
                    self.write_char_raw(c);
                    self.line_len += c.len_utf8();
                    self.cells += cell_width(c);
                    self.trailing = 0;
                    self.has_output = true;
                }
            }
        }
        !s.is_empty()
    }

    fn pre_newline(&mut self) {
        if self.pending > 0 && self.has_output {
            for _ in 0..self.pending {
                self.write_bytes(b"\n");
            }
            self.trailing += self.pending;
        }
        self.pending = 0;
        if self.has_output {
            self.write_bytes(b"\n");
            self.trailing += 1;
        }
        self.line_len = 0;
        self.cells = 0;
    }

    /// Flush the buffered word onto the line.
    pub(crate) fn flush_word(&mut self) {
        if self.word.is_empty() {
            return;
        }
        if self.line_len == 0 {
            self.begin_line();
        }
        let word = std::mem::take(&mut self.word);
        self.write_bytes(word.as_bytes());
        self.line_len += word.len();
        self.cells += self.word_cells;
        self.word_cells = 0;
        self.trailing = 0;
        self.has_output = true;
    }

    /// Terminate the last line. Pending blank lines are dropped.
    pub(crate) fn finish_line(&mut self) {
        self.flush_word();
        if self.has_output && self.trailing == 0 {
            self.write_bytes(b"\n");
            self.trailing = 1;
        }
        self.pending = 0;
        self.line_len = 0;
        self.cells = 0;
    }

    // -----------------------------------------------------------------------
    // ANSI markup
    // -----------------------------------------------------------------------

    /// In wrap mode markup bytes travel with the word buffer so they stay
    /// attached to the text they style; they never count as cells.
    fn write_ansi(&mut self, seq: &str) {
        if self.wrap {
            self.word.push_str(seq);
        } else {
            self.write_bytes(seq.as_bytes());
        }
    }

    /// Switch the active markup, emitting only the differences.
    pub(crate) fn set_markup(&mut self, target: Markup) {
        if !self.ansi || self.markup == target {
            return;
        }
        if target.is_none() {
            self.write_ansi("\x1b[0m");
            self.markup = target;
            return;
        }
        for (attr, on, _) in Markup::SGR {
            if target.contains(attr) && !self.markup.contains(attr) {
                self.write_ansi(on);
            }
        }
        for (attr, _, off) in Markup::SGR {
            if !target.contains(attr) && self.markup.contains(attr) {
                self.write_ansi(off);
            }
        }
        self.markup = target;
    }

    /// Clear all markup with a direct write, bypassing the word buffer.
    /// For the end-of-document epilogue.
    pub(crate) fn reset_markup(&mut self) {
        if self.ansi && !self.markup.is_none() {
            self.write_bytes(b"\x1b[0m");
            self.markup = Markup::NONE;
        }
    }

    pub(crate) fn start_markup(&mut self, markup: Markup) {
        let target = self.markup.union(markup);
        self.set_markup(target);
    }

    pub(crate) fn end_markup(&mut self, markup: Markup) {
        let target = self.markup.difference(markup);
        self.set_markup(target);
    }
}
