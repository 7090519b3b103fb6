use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::ops::notify::ToastPhase;
use crate::tui::app::App;
use crate::util::sanitize::sanitize;
use crate::util::unicode;

/// Widest a toast may get, as a share of the screen
const MAX_W_DIVISOR: u16 = 2;

/// Render toasts stacked in the top-right corner: the standard toast first,
/// then one per delivered mention
pub fn render_toasts(frame: &mut Frame, app: &App, area: Rect, now: Instant) {
    let mut y = area.y;

    if let Some(toast) = app.notifier.current() {
        let accent = app.theme.notice_color(toast.kind);
        y += draw_toast(frame, app, area, y, &toast.text, accent, false);
    }

    for mention in app.notifier.mentions() {
        let Some(phase) = mention.phase(now) else {
            continue;
        };
        let fading = phase != ToastPhase::Visible;
        y += draw_toast(frame, app, area, y, &mention.text(), app.theme.cyan, fading);
        if y >= area.bottom() {
            break;
        }
    }
}

/// Draw one toast at row `y`; returns the rows used
fn draw_toast(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    y: u16,
    text: &str,
    accent: ratatui::style::Color,
    fading: bool,
) -> u16 {
    let max_w = (area.width / MAX_W_DIVISOR).max(12);
    let text = sanitize(text, false);
    let text_w = unicode::display_width(&text) as u16;
    let w = (text_w + 4).min(max_w).min(area.width);
    let h = 3;
    if y + h > area.bottom() || w < 5 {
        return 0;
    }
    let rect = Rect::new(area.right() - w, y, w, h);

    let bg = app.theme.background;
    let mut style = Style::default().fg(app.theme.text_bright).bg(bg);
    let mut border = Style::default().fg(accent).bg(bg);
    if fading {
        style = style.fg(app.theme.dim).add_modifier(Modifier::DIM);
        border = border.add_modifier(Modifier::DIM);
    }

    let shown = unicode::truncate_to_width(&text, (w - 4) as usize);
    frame.render_widget(Clear, rect);
    let paragraph = Paragraph::new(Line::from(Span::styled(format!(" {}", shown), style))).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .style(Style::default().bg(bg)),
    );
    frame.render_widget(paragraph, rect);
    h
}
