use std::ops::Range;

use crate::util::unicode;

/// Maximum title length (characters)
pub const TITLE_MAX_CHARS: usize = 100;
/// Maximum content length (characters)
pub const CONTENT_MAX_CHARS: usize = 500;
/// PIN length
pub const PIN_LEN: usize = 4;

/// Which write the form submits
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormMode {
    #[default]
    Creating,
    /// Editing the note with this id
    Editing(String),
}

impl FormMode {
    pub fn is_editing(&self) -> bool {
        matches!(self, FormMode::Editing(_))
    }

    pub fn editing_id(&self) -> Option<&str> {
        match self {
            FormMode::Editing(id) => Some(id),
            FormMode::Creating => None,
        }
    }
}

/// A single editable text value with a caret.
///
/// The caret is a byte offset that always sits on a grapheme boundary.
/// `max_chars` caps typed input; text set programmatically is kept whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextField {
    text: String,
    cursor: usize,
    max_chars: Option<usize>,
}

impl TextField {
    pub fn new(max_chars: Option<usize>) -> Self {
        TextField {
            text: String::new(),
            cursor: 0,
            max_chars,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replace the whole value and put the caret at the end
    pub fn set(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.text.len();
    }

    /// Move the caret, clamped to the text and snapped back to a grapheme boundary
    pub fn set_cursor(&mut self, pos: usize) {
        self.cursor = unicode::floor_grapheme_boundary(&self.text, pos);
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn remaining(&self) -> usize {
        match self.max_chars {
            Some(max) => max.saturating_sub(self.text.chars().count()),
            None => usize::MAX,
        }
    }

    /// Insert a character at the caret. Returns false when the field is full.
    pub fn insert_char(&mut self, c: char) -> bool {
        if self.remaining() == 0 {
            return false;
        }
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
        true
    }

    /// Insert as much of `s` as fits. Returns false if nothing was inserted.
    pub fn insert_str(&mut self, s: &str) -> bool {
        let fitting: String = s.chars().take(self.remaining()).collect();
        if fitting.is_empty() {
            return false;
        }
        self.text.insert_str(self.cursor, &fitting);
        self.cursor += fitting.len();
        true
    }

    /// Delete the grapheme before the caret
    pub fn backspace(&mut self) -> bool {
        match unicode::prev_grapheme_boundary(&self.text, self.cursor) {
            Some(prev) => {
                self.text.drain(prev..self.cursor);
                self.cursor = prev;
                true
            }
            None => false,
        }
    }

    /// Delete the grapheme after the caret
    pub fn delete_forward(&mut self) -> bool {
        match unicode::next_grapheme_boundary(&self.text, self.cursor) {
            Some(next) => {
                self.text.drain(self.cursor..next);
                true
            }
            None => false,
        }
    }

    /// Delete everything before the caret
    pub fn kill_to_start(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.text.drain(..self.cursor);
        self.cursor = 0;
        true
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = unicode::prev_grapheme_boundary(&self.text, self.cursor) {
            self.cursor = prev;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = unicode::next_grapheme_boundary(&self.text, self.cursor) {
            self.cursor = next;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.len();
    }

    pub fn move_word_left(&mut self) {
        self.cursor = unicode::word_boundary_left(&self.text, self.cursor);
    }

    pub fn move_word_right(&mut self) {
        self.cursor = unicode::word_boundary_right(&self.text, self.cursor);
    }

    /// Move to the same column on the previous line (multi-line values)
    pub fn move_line_up(&mut self) {
        let line_start = self.text[..self.cursor].rfind('\n').map_or(0, |i| i + 1);
        if line_start == 0 {
            self.cursor = 0;
            return;
        }
        let col = self.text[line_start..self.cursor].chars().count();
        let prev_start = self.text[..line_start - 1].rfind('\n').map_or(0, |i| i + 1);
        self.cursor = column_offset(&self.text, prev_start, line_start - 1, col);
    }

    /// Move to the same column on the next line (multi-line values)
    pub fn move_line_down(&mut self) {
        let Some(nl) = self.text[self.cursor..].find('\n').map(|i| self.cursor + i) else {
            self.cursor = self.text.len();
            return;
        };
        let line_start = self.text[..self.cursor].rfind('\n').map_or(0, |i| i + 1);
        let col = self.text[line_start..self.cursor].chars().count();
        let next_start = nl + 1;
        let next_end = self.text[next_start..]
            .find('\n')
            .map_or(self.text.len(), |i| next_start + i);
        self.cursor = column_offset(&self.text, next_start, next_end, col);
    }

    /// Replace a byte range and place the caret at `cursor` afterwards
    pub fn replace_range(&mut self, range: Range<usize>, with: &str, cursor: usize) {
        self.text.replace_range(range, with);
        self.set_cursor(cursor);
    }
}

/// Byte offset of char column `col` within `text[start..end]`, clamped to `end`
fn column_offset(text: &str, start: usize, end: usize, col: usize) -> usize {
    text[start..end]
        .char_indices()
        .nth(col)
        .map_or(end, |(i, _)| start + i)
}

/// The add/edit form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteForm {
    pub title: TextField,
    pub content: TextField,
    /// Selected creator; always a roster entry when set
    pub created_by: Option<String>,
    pub pin: TextField,
}

impl Default for NoteForm {
    fn default() -> Self {
        NoteForm {
            title: TextField::new(Some(TITLE_MAX_CHARS)),
            content: TextField::new(Some(CONTENT_MAX_CHARS)),
            created_by: None,
            pin: TextField::new(Some(PIN_LEN)),
        }
    }
}

impl NoteForm {
    pub fn clear(&mut self) {
        self.title.clear();
        self.content.clear();
        self.created_by = None;
        self.pin.clear();
    }
}
