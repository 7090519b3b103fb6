use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use regex::Regex;

use crate::io::api::NotesApi;
use crate::io::worker::ApiWorker;
use crate::model::{AppConfig, Note, NoteContext};
use crate::ops::modal::NoteModal;
use crate::ops::notify::Notifier;

use super::input;
use super::render;
use super::theme::Theme;

/// How often the loop wakes without input, so toasts and responses are picked up
const TICK: Duration = Duration::from_millis(100);

/// Which part of the modal receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Title,
    Content,
    CreatedBy,
    Pin,
    Notes,
}

impl Focus {
    pub fn next(self) -> Focus {
        match self {
            Focus::Title => Focus::Content,
            Focus::Content => Focus::CreatedBy,
            Focus::CreatedBy => Focus::Pin,
            Focus::Pin => Focus::Notes,
            Focus::Notes => Focus::Title,
        }
    }

    pub fn prev(self) -> Focus {
        match self {
            Focus::Title => Focus::Notes,
            Focus::Content => Focus::Title,
            Focus::CreatedBy => Focus::Content,
            Focus::Pin => Focus::CreatedBy,
            Focus::Notes => Focus::Pin,
        }
    }
}

/// Main application state
pub struct App {
    pub modal: NoteModal,
    pub notifier: Notifier,
    pub theme: Theme,
    pub focus: Focus,
    /// Cursor into the notes list, in display (grouped) order
    pub notes_cursor: usize,
    /// First visible row of the notes list
    pub notes_scroll: usize,
    /// Matches `@handle` tokens for highlighting in note titles
    pub mention_re: Option<Regex>,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: &AppConfig) -> Self {
        App {
            modal: NoteModal::new(&config.people),
            notifier: Notifier::new(),
            theme: Theme::from_config(&config.ui),
            focus: Focus::Title,
            notes_cursor: 0,
            notes_scroll: 0,
            mention_re: mention_regex(&config.people.mention_handles),
            should_quit: false,
        }
    }

    /// Notes in the order they are listed: grouped by table source
    pub fn visible_notes(&self) -> Vec<&Note> {
        self.modal
            .store()
            .groups()
            .into_iter()
            .flat_map(|g| g.notes)
            .collect()
    }

    pub fn selected_note(&self) -> Option<&Note> {
        self.visible_notes().get(self.notes_cursor).copied()
    }

    /// Keep the notes cursor inside the list after it changes
    pub fn clamp_notes_cursor(&mut self) {
        let len = self.visible_notes().len();
        self.notes_cursor = self.notes_cursor.min(len.saturating_sub(1));
    }

    /// Move queued notices from the modal into the toast area
    pub fn flush_notices(&mut self, now: Instant) {
        for notice in self.modal.take_notices() {
            if notice.is_error() {
                log::info!("notice: {}", notice.text());
            }
            self.notifier.push(notice, now);
        }
        self.notifier.tick(now);
    }

    /// Exchange requests and responses with the worker, then refresh toasts
    pub fn pump(&mut self, worker: &ApiWorker, now: Instant) {
        worker.submit_all(self.modal.take_requests());
        let responses = worker.poll();
        let changed = !responses.is_empty();
        for response in responses {
            self.modal.handle_response(response);
        }
        // A reload may have shrunk the list
        if changed {
            self.clamp_notes_cursor();
            worker.submit_all(self.modal.take_requests());
        }
        self.flush_notices(now);
        if !self.modal.is_open() {
            self.should_quit = true;
        }
    }
}

/// Regex matching `@` followed by any configured handle
pub fn mention_regex(handles: &[String]) -> Option<Regex> {
    if handles.is_empty() {
        return None;
    }
    let alternatives: Vec<String> = handles.iter().map(|h| regex::escape(h)).collect();
    Regex::new(&format!("@(?:{})", alternatives.join("|"))).ok()
}

/// Run the notes modal for one record until it is closed
pub fn run(
    config: &AppConfig,
    context: NoteContext,
    api: Arc<dyn NotesApi + Send + Sync>,
) -> Result<(), Box<dyn std::error::Error>> {
    let worker = ApiWorker::spawn(api)?;
    let mut app = App::new(config);
    app.modal.open(context);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, event::EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), event::DisableBracketedPaste, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, &worker);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        event::DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    worker: &ApiWorker,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.pump(worker, Instant::now());
        if app.should_quit {
            break;
        }

        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(TICK)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => input::handle_key(app, key),
                Event::Paste(text) => input::handle_paste(app, &text),
                _ => {}
            }
        }
    }
    Ok(())
}
