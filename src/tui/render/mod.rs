pub mod form_view;
mod helpers;
pub mod mention_popup;
pub mod notes_view;
pub mod toast;

#[cfg(test)]
pub mod test_helpers;

use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use regex::Regex;

use super::app::App;
use crate::util::sanitize::sanitize;

/// Preferred modal size; shrinks to fit small terminals
const MODAL_W: u16 = 84;
const MODAL_H: u16 = 36;

/// Main render function: the modal, its dropdown and toasts
pub fn render(frame: &mut Frame, app: &mut App) {
    render_at(frame, app, Instant::now());
}

/// Render with an explicit clock, for toast phases
pub fn render_at(frame: &mut Frame, app: &mut App, now: Instant) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    if app.modal.is_open() {
        let modal_area = helpers::centered_rect(MODAL_W, MODAL_H, area);
        let title_anchor = render_modal(frame, app, modal_area);

        // Dropdown floats over everything inside the modal
        if let Some(anchor) = title_anchor {
            mention_popup::render_mention_popup(frame, app, anchor);
        }
    }

    toast::render_toasts(frame, app, area, now);
}

/// Draw the dialog frame and its sections. Returns the title field's rect
/// with `x` at the caret, for anchoring the mention dropdown.
fn render_modal(frame: &mut Frame, app: &mut App, area: Rect) -> Option<Rect> {
    let bg = app.theme.background;
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.selection_border).bg(bg))
        .title(Span::styled(
            " Notes Management ",
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(bg));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // record context
            Constraint::Length(form_view::FORM_HEIGHT),
            Constraint::Length(1), // separator
            Constraint::Min(3),    // notes list
        ])
        .split(inner);

    let context = app
        .modal
        .context()
        .map(|c| {
            format!(
                "Record {} \u{00B7} {}",
                sanitize(&c.id_input, false),
                sanitize(&c.table_source, false)
            )
        })
        .unwrap_or_default();
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            context,
            Style::default().fg(app.theme.dim).bg(bg),
        ))),
        chunks[0],
    );

    let anchor = form_view::render_form(frame, app, chunks[1]);

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "\u{2500}".repeat(chunks[2].width as usize),
            Style::default().fg(app.theme.dim).bg(bg),
        ))),
        chunks[2],
    );

    notes_view::render_notes(frame, app, chunks[3]);
    anchor
}

/// Push spans for text with regex match highlighting. If no regex or no matches,
/// pushes a single span with `base_style`. Otherwise splits text at match boundaries.
pub(super) fn push_highlighted_spans<'a>(
    spans: &mut Vec<Span<'a>>,
    text: &str,
    base_style: Style,
    highlight_style: Style,
    re: Option<&Regex>,
) {
    let re = match re {
        Some(r) => r,
        None => {
            spans.push(Span::styled(text.to_string(), base_style));
            return;
        }
    };

    let mut last_end = 0;
    let mut has_match = false;
    for m in re.find_iter(text) {
        has_match = true;
        if m.start() > last_end {
            spans.push(Span::styled(
                text[last_end..m.start()].to_string(),
                base_style,
            ));
        }
        spans.push(Span::styled(
            text[m.start()..m.end()].to_string(),
            highlight_style,
        ));
        last_end = m.end();
    }
    if !has_match {
        spans.push(Span::styled(text.to_string(), base_style));
    } else if last_end < text.len() {
        spans.push(Span::styled(text[last_end..].to_string(), base_style));
    }
}
