use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::io::api::ApiResponse;
use crate::model::{AppConfig, Note, NoteContext};
use crate::tui::app::App;

pub(crate) use crate::ops::store::tests::note as sample_note;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// Render the whole app at the default test size.
pub fn render_app(app: &mut App) -> String {
    render_to_string(TERM_W, TERM_H, |frame, _| super::render(frame, app))
}

/// An open modal whose initial fetch is still outstanding.
pub fn loading_app() -> App {
    let mut app = App::new(&AppConfig::default());
    app.modal.open(NoteContext::new("42", "table_sales"));
    app
}

/// An open modal with the initial fetch answered by `notes`.
pub fn app_with_notes(notes: Vec<Note>) -> App {
    let mut app = loading_app();
    let generation = app.modal.generation();
    app.modal.take_requests();
    app.modal.handle_response(ApiResponse::NotesFetched {
        generation,
        context: NoteContext::new("42", "table_sales"),
        result: Ok(notes),
    });
    app
}
