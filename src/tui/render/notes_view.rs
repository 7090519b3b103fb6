use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::Note;
use crate::tui::app::{App, Focus};
use crate::util::sanitize::sanitize;
use crate::util::unicode;

use super::push_highlighted_spans;

/// Content lines shown per note before eliding
const MAX_CONTENT_LINES: usize = 3;

/// Render the "Existing Notes" list, grouped by table source
pub fn render_notes(frame: &mut Frame, app: &mut App, area: Rect) {
    if area.height == 0 {
        return;
    }
    let bg = app.theme.background;
    let width = area.width as usize;

    let mut lines: Vec<Line> = vec![Line::from(Span::styled(
        "Existing Notes",
        Style::default()
            .fg(app.theme.text_bright)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    ))];

    let store = app.modal.store();
    if store.all().is_empty() {
        let text = if app.modal.is_loading() {
            "Loading notes\u{2026}"
        } else {
            "No notes available"
        };
        lines.push(Line::from(Span::styled(
            text,
            Style::default().fg(app.theme.dim).bg(bg),
        )));
        frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);
        return;
    }

    let editing_id = app.modal.mode().editing_id().map(str::to_string);
    let list_focused = app.focus == Focus::Notes;
    let mut selected_row = 0;
    let mut index = 0;

    for group in store.groups() {
        lines.push(Line::from(Span::styled(
            sanitize(&group.header(), false),
            Style::default()
                .fg(app.theme.purple)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        )));
        for note in group.notes {
            let selected = index == app.notes_cursor;
            if selected {
                selected_row = lines.len();
            }
            let editing = editing_id.as_deref() == Some(note.id.as_str());
            lines.extend(note_lines(app, note, width, selected && list_focused, editing));
            index += 1;
        }
    }

    // Keep the selected note's first row on screen
    let height = area.height as usize;
    if selected_row < app.notes_scroll {
        app.notes_scroll = selected_row.saturating_sub(1);
    } else if selected_row >= app.notes_scroll + height {
        app.notes_scroll = selected_row + 1 - height;
    }
    app.notes_scroll = app.notes_scroll.min(lines.len().saturating_sub(1));

    let paragraph = Paragraph::new(lines)
        .style(Style::default().bg(bg))
        .scroll((app.notes_scroll as u16, 0));
    frame.render_widget(paragraph, area);
}

fn note_lines(app: &App, note: &Note, width: usize, selected: bool, editing: bool) -> Vec<Line<'static>> {
    let bg = if selected {
        app.theme.selection_bg
    } else {
        app.theme.background
    };
    let title_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let mention_style = title_style.fg(app.theme.mention);
    let body_style = Style::default().fg(app.theme.text).bg(bg);
    let meta_style = Style::default().fg(app.theme.dim).bg(bg);

    let mut lines = Vec::new();

    // Title row
    let marker = if selected { " \u{25B8} " } else { "   " };
    let mut spans = vec![Span::styled(
        marker,
        Style::default().fg(app.theme.selection_border).bg(bg),
    )];
    let badge = if editing { "  (editing)" } else { "" };
    let room = width.saturating_sub(unicode::display_width(marker) + unicode::display_width(badge));
    let title = unicode::truncate_to_width(&sanitize(&note.title, false), room);
    push_highlighted_spans(
        &mut spans,
        &title,
        title_style,
        mention_style,
        app.mention_re.as_ref(),
    );
    if editing {
        spans.push(Span::styled(badge, Style::default().fg(app.theme.yellow).bg(bg)));
    }
    lines.push(Line::from(spans));

    // Content, newlines preserved
    let content = sanitize(&note.content, true);
    let content_lines: Vec<&str> = content.lines().collect();
    for (i, line) in content_lines.iter().enumerate() {
        if i == MAX_CONTENT_LINES {
            lines.push(Line::from(Span::styled("     \u{2026}", meta_style)));
            break;
        }
        let text = unicode::truncate_to_width(line, width.saturating_sub(5));
        lines.push(Line::from(Span::styled(format!("     {}", text), body_style)));
    }

    // Byline
    let mut meta = format!(
        "     {} \u{00B7} {}",
        sanitize(&note.created_by, false),
        sanitize(&note.created_at.display(), false)
    );
    if let Some(updated) = &note.updated_at {
        meta.push_str(&format!(
            " \u{00B7} edited {}",
            sanitize(&updated.display(), false)
        ));
    }
    lines.push(Line::from(Span::styled(
        unicode::truncate_to_width(&meta, width),
        meta_style,
    )));

    lines
}
