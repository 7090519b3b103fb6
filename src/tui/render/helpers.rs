use ratatui::layout::Rect;

use crate::model::TextField;
use crate::util::sanitize::sanitize;
use crate::util::unicode;

/// A text field laid out for drawing
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct FieldView {
    /// Visible lines, already cleaned of control characters
    pub lines: Vec<String>,
    /// Caret position relative to the first visible line
    pub caret_row: usize,
    pub caret_col: usize,
}

/// Lay out a single-line field so the caret is always on screen
pub(super) fn single_line_view(field: &TextField, width: usize) -> FieldView {
    let before = sanitize(&field.text()[..field.cursor()], false);
    let after = sanitize(&field.text()[field.cursor()..], false);
    // Leave one cell for the caret itself
    let room = width.saturating_sub(1);
    let shown_before = unicode::tail_to_width(&before, room);
    let caret_col = unicode::display_width(shown_before);
    let rest = unicode::truncate_to_width(&after, width.saturating_sub(caret_col));
    FieldView {
        lines: vec![format!("{}{}", shown_before, rest)],
        caret_row: 0,
        caret_col,
    }
}

/// Lay out a multi-line field in a `height`-row window that follows the caret
pub(super) fn multi_line_view(field: &TextField, width: usize, height: usize) -> FieldView {
    let before = sanitize(&field.text()[..field.cursor()], true);
    let after = sanitize(&field.text()[field.cursor()..], true);
    let caret_line = before.matches('\n').count();
    let caret_prefix = before.rsplit('\n').next().unwrap_or("");

    let full = format!("{}{}", before, after);
    let all_lines: Vec<&str> = full.split('\n').collect();
    let height = height.max(1);
    let first = (caret_line + 1).saturating_sub(height);

    let room = width.saturating_sub(1);
    let shown_prefix = unicode::tail_to_width(caret_prefix, room);
    let skipped = caret_prefix.len() - shown_prefix.len();

    let lines = all_lines
        .iter()
        .enumerate()
        .skip(first)
        .take(height)
        .map(|(i, line)| {
            if i == caret_line {
                unicode::truncate_to_width(&line[skipped..], width)
            } else {
                unicode::truncate_to_width(line, width)
            }
        })
        .collect();

    FieldView {
        lines,
        caret_row: caret_line - first,
        caret_col: unicode::display_width(shown_prefix),
    }
}

/// A `width` x `height` rect centered in `area`, clamped to fit
pub(super) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}
