//! Cell widths and cursor motion for the note form.
//!
//! Field cursors are byte offsets into UTF-8 text and always sit on a
//! grapheme boundary, so a name like "Café" or an emoji in a title moves
//! and deletes as one unit.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Cells a tab occupies in the content field
const TAB_CELLS: usize = 4;

fn cells(grapheme: &str) -> usize {
    if grapheme == "\t" {
        TAB_CELLS
    } else {
        grapheme.width()
    }
}

fn is_blank(grapheme: &str) -> bool {
    grapheme.chars().all(char::is_whitespace)
}

/// Terminal cells needed to draw `s`
pub fn display_width(s: &str) -> usize {
    s.graphemes(true).map(cells).sum()
}

/// Cut `s` to at most `max_cells`, ending in `…` when anything was dropped.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    let Some(budget) = max_cells.checked_sub(1) else {
        return String::new();
    };
    let mut used = 0;
    let mut out: String = s
        .graphemes(true)
        .take_while(|g| {
            used += cells(g);
            used <= budget
        })
        .collect();
    out.push('\u{2026}');
    out
}

/// The longest suffix of `s` that fits in `max_cells`. Used to keep the
/// caret end of a long single-line field visible.
pub fn tail_to_width(s: &str, max_cells: usize) -> &str {
    let mut used = 0;
    let mut start = s.len();
    for (i, g) in s.grapheme_indices(true).rev() {
        used += cells(g);
        if used > max_cells {
            break;
        }
        start = i;
    }
    &s[start..]
}

/// Offset just past the grapheme at `at`, or None at the end.
pub fn next_grapheme_boundary(s: &str, at: usize) -> Option<usize> {
    let g = s.get(at..)?.graphemes(true).next()?;
    Some(at + g.len())
}

/// Offset where the grapheme ending at `at` starts, or None at the start.
pub fn prev_grapheme_boundary(s: &str, at: usize) -> Option<usize> {
    let g = s.get(..at)?.graphemes(true).next_back()?;
    Some(at - g.len())
}

/// Snap `at` back onto a grapheme boundary. Offsets past the end clamp to it.
pub fn floor_grapheme_boundary(s: &str, at: usize) -> usize {
    if at >= s.len() {
        return s.len();
    }
    s.grapheme_indices(true)
        .map(|(i, _)| i)
        .take_while(|&i| i <= at)
        .last()
        .unwrap_or(0)
}

/// Start of the word left of `at`, skipping blanks first.
pub fn word_boundary_left(s: &str, at: usize) -> usize {
    let mut start = at.min(s.len());
    let mut in_word = false;
    for (i, g) in s[..start].grapheme_indices(true).rev() {
        if is_blank(g) {
            if in_word {
                break;
            }
        } else {
            in_word = true;
        }
        start = i;
    }
    start
}

/// Start of the next word right of `at`, or the end of `s`.
pub fn word_boundary_right(s: &str, at: usize) -> usize {
    let at = at.min(s.len());
    let mut seen_blank = false;
    for (i, g) in s[at..].grapheme_indices(true) {
        if is_blank(g) {
            seen_blank = true;
        } else if seen_blank {
            return at + i;
        }
    }
    s.len()
}
