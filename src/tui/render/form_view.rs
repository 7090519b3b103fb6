use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::{CONTENT_MAX_CHARS, PIN_LEN, TITLE_MAX_CHARS};
use crate::tui::app::{App, Focus};

use super::helpers::{FieldView, multi_line_view, single_line_view};

/// Rows used by the form: heading, title, content, creator, PIN, hints
pub const FORM_HEIGHT: u16 = 9;
const CONTENT_ROWS: u16 = 4;
const LABEL_W: u16 = 12;

/// Render the add/edit form. Returns the title row with `x` at the caret.
pub fn render_form(frame: &mut Frame, app: &App, area: Rect) -> Option<Rect> {
    if area.width <= LABEL_W || area.height < FORM_HEIGHT {
        return None;
    }
    let bg = app.theme.background;
    let editing = app.modal.mode().is_editing();
    let field_w = area.width - LABEL_W;
    let row = |i: u16, h: u16| Rect::new(area.x, area.y + i, area.width, h);

    // Heading
    let heading = if editing { "Edit Note" } else { "Add New Note" };
    let mut spans = vec![Span::styled(
        heading,
        Style::default()
            .fg(app.theme.text_bright)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    )];
    if app.modal.is_submitting() {
        spans.push(Span::styled(
            "  saving\u{2026}",
            Style::default().fg(app.theme.yellow).bg(bg),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), row(0, 1));

    // Title
    let title = &app.modal.form().title;
    let title_view = single_line_view(title, field_w as usize);
    draw_field(frame, app, row(1, 1), "Title", Focus::Title, &title_view);
    draw_counter(frame, app, row(1, 1), title.text().chars().count(), TITLE_MAX_CHARS);

    // Content
    let content = &app.modal.form().content;
    let content_view = multi_line_view(content, field_w as usize, CONTENT_ROWS as usize);
    draw_field(frame, app, row(2, CONTENT_ROWS), "Content", Focus::Content, &content_view);
    draw_counter(
        frame,
        app,
        row(2 + CONTENT_ROWS - 1, 1),
        content.text().chars().count(),
        CONTENT_MAX_CHARS,
    );

    // Creator
    let creator_row = row(2 + CONTENT_ROWS, 1);
    let creator_focused = app.focus == Focus::CreatedBy;
    let value = match &app.modal.form().created_by {
        Some(name) => Span::styled(
            format!("\u{2039} {} \u{203A}", name),
            Style::default().fg(app.theme.text_bright).bg(bg),
        ),
        None => Span::styled(
            "\u{2039} Select your name \u{203A}",
            Style::default().fg(app.theme.dim).bg(bg),
        ),
    };
    frame.render_widget(
        Paragraph::new(Line::from(vec![label_span(app, "Created By", creator_focused), value])),
        creator_row,
    );

    // PIN, masked
    let pin = &app.modal.form().pin;
    let masked = FieldView {
        lines: vec![format!(
            "{}{}",
            "\u{2022}".repeat(pin.text().chars().count()),
            "_".repeat(PIN_LEN.saturating_sub(pin.text().chars().count()))
        )],
        caret_row: 0,
        caret_col: pin.text()[..pin.cursor()].chars().count(),
    };
    draw_field(frame, app, row(3 + CONTENT_ROWS, 1), "PIN", Focus::Pin, &masked);

    // Hints
    let hint = if editing {
        "Ctrl+S update  Tab next  Esc cancel edit"
    } else {
        "Ctrl+S save  Tab next  \u{2190}/\u{2192} name  Esc close"
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            hint,
            Style::default().fg(app.theme.dim).bg(bg),
        ))),
        row(4 + CONTENT_ROWS, 1),
    );

    let caret_x = area.x + LABEL_W + title_view.caret_col as u16;
    Some(Rect::new(
        caret_x.min(area.right().saturating_sub(1)),
        area.y + 1,
        area.right().saturating_sub(caret_x),
        1,
    ))
}

fn label_span(app: &App, label: &str, focused: bool) -> Span<'static> {
    let style = if focused {
        Style::default()
            .fg(app.theme.highlight)
            .bg(app.theme.background)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.text).bg(app.theme.background)
    };
    Span::styled(format!("{:<width$}", label, width = LABEL_W as usize), style)
}

/// Draw a labelled text field and place the terminal cursor when focused
fn draw_field(frame: &mut Frame, app: &App, area: Rect, label: &str, focus: Focus, view: &FieldView) {
    let focused = app.focus == focus;
    let value_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(app.theme.background);

    let lines: Vec<Line> = (0..area.height as usize)
        .map(|i| {
            let label = if i == 0 { label } else { "" };
            let text = view.lines.get(i).cloned().unwrap_or_default();
            Line::from(vec![label_span(app, label, focused), Span::styled(text, value_style)])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);

    if focused {
        let x = (area.x + LABEL_W + view.caret_col as u16).min(area.right().saturating_sub(1));
        let y = area.y + (view.caret_row as u16).min(area.height.saturating_sub(1));
        frame.set_cursor_position((x, y));
    }
}

/// Right-aligned `n/max` counter, shown once the value is close to its cap
fn draw_counter(frame: &mut Frame, app: &App, area: Rect, count: usize, max: usize) {
    if count * 10 < max * 8 {
        return;
    }
    let text = format!("{}/{}", count, max);
    let w = text.len() as u16;
    if area.width <= w + LABEL_W {
        return;
    }
    let color = if count >= max { app.theme.red } else { app.theme.yellow };
    let counter_area = Rect::new(area.right() - w, area.y, w, 1);
    frame.render_widget(
        Paragraph::new(Span::styled(
            text,
            Style::default().fg(color).bg(app.theme.background),
        )),
        counter_area,
    );
}
