use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;
use crate::util::unicode;

/// Maximum number of visible entries in the dropdown
const MAX_VISIBLE: usize = 8;

/// Render the mention dropdown floating below the title caret
pub fn render_mention_popup(frame: &mut Frame, app: &App, anchor: Rect) {
    let session = match app.modal.mention().session() {
        Some(session) if !session.candidates.is_empty() => session,
        _ => return,
    };

    let bg = app.theme.background;
    let text_color = app.theme.text;
    let bright = app.theme.text_bright;
    let dim = app.theme.dim;

    let count = session.candidates.len().min(MAX_VISIBLE);

    // Widest entry plus "@" and padding
    let max_width = session
        .candidates
        .iter()
        .take(MAX_VISIBLE)
        .map(|s| unicode::display_width(s))
        .max()
        .unwrap_or(10)
        + 5;

    let term_area = frame.area();
    let popup_w = (max_width as u16).min(term_area.width).max(12);
    let popup_h = (count as u16) + 2; // +2 for borders

    // Below the title row; above it if there is no room
    let y = if anchor.y + 1 + popup_h <= term_area.height {
        anchor.y + 1
    } else {
        anchor.y.saturating_sub(popup_h)
    };
    let x = anchor.x.min(term_area.width.saturating_sub(popup_w));
    let popup_area = Rect::new(x, y, popup_w, popup_h);

    // Scroll window around the highlighted item
    let highlighted = session.highlighted;
    let scroll_start = match highlighted {
        Some(i) if i >= MAX_VISIBLE => i - MAX_VISIBLE + 1,
        _ => 0,
    };

    let mut lines: Vec<Line> = Vec::new();
    for (i, name) in session
        .candidates
        .iter()
        .skip(scroll_start)
        .take(MAX_VISIBLE)
        .enumerate()
    {
        let is_selected = highlighted == Some(scroll_start + i);

        let style = if is_selected {
            Style::default()
                .fg(bright)
                .bg(app.theme.selection_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(text_color).bg(bg)
        };

        let prefix = if is_selected { " \u{25B8} " } else { "   " };
        let label = format!("@{:<width$}", name, width = (popup_w as usize).saturating_sub(6));

        lines.push(Line::from(vec![
            Span::styled(prefix, style),
            Span::styled(label, style),
        ]));
    }

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(dim).bg(bg))
        .style(Style::default().bg(bg));

    let paragraph = Paragraph::new(lines).block(block).style(Style::default().bg(bg));
    frame.render_widget(paragraph, popup_area);
}
