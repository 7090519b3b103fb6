mod field;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::ops::mention::MentionKey;
use crate::util::sanitize::sanitize;

use super::app::{App, Focus};

pub use field::{FieldEdit, edit_field};

/// Handle a key event for the focused part of the modal
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }

    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
            app.modal.close();
            return;
        }
        (KeyModifiers::CONTROL, KeyCode::Char('s')) => {
            app.modal.submit();
            return;
        }
        _ => {}
    }

    // The mention dropdown owns navigation keys while it is showing
    if app.focus == Focus::Title && app.modal.mention().is_visible() {
        let mention_key = match key.code {
            KeyCode::Up => Some(MentionKey::Up),
            KeyCode::Down => Some(MentionKey::Down),
            KeyCode::Enter | KeyCode::Tab => Some(MentionKey::Commit),
            KeyCode::Esc => Some(MentionKey::Cancel),
            _ => None,
        };
        if let Some(mention_key) = mention_key {
            app.modal.mention_key(mention_key);
            return;
        }
    }

    match key.code {
        KeyCode::Tab => {
            set_focus(app, app.focus.next());
            return;
        }
        KeyCode::BackTab => {
            set_focus(app, app.focus.prev());
            return;
        }
        KeyCode::Esc => {
            if app.modal.mode().is_editing() {
                app.modal.cancel_edit();
                set_focus(app, Focus::Title);
            } else {
                app.modal.close();
            }
            return;
        }
        _ => {}
    }

    match app.focus {
        Focus::Title => handle_title(app, key),
        Focus::Content => {
            edit_field(app.modal.content_mut(), key, true);
        }
        Focus::CreatedBy => handle_creator(app, key),
        Focus::Pin => {
            if key.code == KeyCode::Enter {
                app.modal.submit();
            } else {
                edit_field(app.modal.pin_mut(), key, false);
            }
        }
        Focus::Notes => handle_notes(app, key),
    }
}

/// Move focus, closing the mention dropdown when the title loses it
fn set_focus(app: &mut App, focus: Focus) {
    if app.focus == Focus::Title && focus != Focus::Title {
        app.modal.dismiss_mentions();
    }
    app.focus = focus;
}

fn handle_title(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Enter {
        app.modal.submit();
        return;
    }
    app.modal.edit_title(|field| edit_field(field, key, false));
}

fn handle_creator(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Left | KeyCode::Up | KeyCode::Char('h') | KeyCode::Char('k') => {
            app.modal.cycle_creator(false)
        }
        KeyCode::Right | KeyCode::Down | KeyCode::Char('l') | KeyCode::Char('j') | KeyCode::Char(' ') => {
            app.modal.cycle_creator(true)
        }
        KeyCode::Backspace | KeyCode::Delete => {
            app.modal.select_creator(None);
        }
        KeyCode::Enter => set_focus(app, Focus::Pin),
        _ => {}
    }
}

fn handle_notes(app: &mut App, key: KeyEvent) {
    let len = app.visible_notes().len();
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            app.notes_cursor = app.notes_cursor.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if app.notes_cursor + 1 < len {
                app.notes_cursor += 1;
            }
        }
        KeyCode::Home | KeyCode::Char('g') => app.notes_cursor = 0,
        KeyCode::End | KeyCode::Char('G') => app.notes_cursor = len.saturating_sub(1),
        KeyCode::Enter | KeyCode::Char('e') => {
            let Some(id) = app.selected_note().map(|n| n.id.clone()) else {
                return;
            };
            if app.modal.begin_edit(&id) {
                set_focus(app, Focus::Title);
            }
        }
        _ => {}
    }
}

/// Handle a bracketed paste into the focused field
pub fn handle_paste(app: &mut App, text: &str) {
    if text.is_empty() {
        return;
    }
    match app.focus {
        Focus::Title => {
            let clean = sanitize(text, false);
            app.modal.edit_title(|field| field.insert_str(&clean));
        }
        Focus::Content => {
            let clean = sanitize(text, true);
            app.modal.content_mut().insert_str(&clean);
        }
        Focus::Pin => {
            let clean = sanitize(text.trim(), false);
            app.modal.pin_mut().insert_str(&clean);
        }
        Focus::CreatedBy | Focus::Notes => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::api::{ApiRequest, ApiResponse};
    use crate::model::{AppConfig, FormMode, NoteContext};
    use crate::ops::store::tests::note;
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            handle_key(app, key(KeyCode::Char(c)));
        }
    }

    fn open_app() -> App {
        let mut app = App::new(&AppConfig::default());
        app.modal.open(NoteContext::new("42", "table_sales"));
        app.modal.take_requests();
        app.modal.handle_response(ApiResponse::NotesFetched {
            generation: app.modal.generation(),
            context: NoteContext::new("42", "table_sales"),
            result: Ok(vec![
                note("1", "table_sales", "first"),
                note("2", "table_ops", "second"),
            ]),
        });
        app
    }

    #[test]
    fn mention_flow_through_keys() {
        let mut app = open_app();
        type_str(&mut app, "ping @da");
        assert!(app.modal.mention().is_visible());
        // Enter with nothing highlighted is swallowed
        handle_key(&mut app, key(KeyCode::Enter));
        assert!(app.modal.take_requests().is_empty());
        handle_key(&mut app, key(KeyCode::Down));
        handle_key(&mut app, key(KeyCode::Tab));
        assert_eq!(app.modal.form().title.text(), "ping @David");
        assert_eq!(app.focus, Focus::Title);
    }

    #[test]
    fn esc_closes_dropdown_then_modal() {
        let mut app = open_app();
        type_str(&mut app, "@vi");
        handle_key(&mut app, key(KeyCode::Esc));
        assert!(!app.modal.mention().is_visible());
        assert!(app.modal.is_open());
        handle_key(&mut app, key(KeyCode::Esc));
        assert!(!app.modal.is_open());
    }

    #[test]
    fn full_form_submit_from_pin() {
        let mut app = open_app();
        type_str(&mut app, "Call back");
        handle_key(&mut app, key(KeyCode::Tab));
        type_str(&mut app, "line one");
        handle_key(&mut app, key(KeyCode::Enter));
        type_str(&mut app, "line two");
        handle_key(&mut app, key(KeyCode::Tab));
        handle_key(&mut app, key(KeyCode::Right));
        handle_key(&mut app, key(KeyCode::Tab));
        type_str(&mut app, "12345");
        assert_eq!(app.modal.form().content.text(), "line one\nline two");
        assert_eq!(app.modal.form().created_by.as_deref(), Some("Mba Desi"));
        assert_eq!(app.modal.form().pin.text(), "1234");

        handle_key(&mut app, key(KeyCode::Enter));
        let reqs = app.modal.take_requests();
        assert!(matches!(
            reqs.as_slice(),
            [ApiRequest::VerifyPin { user_name, .. }] if user_name == "Mba Desi"
        ));
    }

    #[test]
    fn edit_from_notes_list() {
        let mut app = open_app();
        handle_key(&mut app, key(KeyCode::BackTab));
        assert_eq!(app.focus, Focus::Notes);
        handle_key(&mut app, key(KeyCode::Down));
        handle_key(&mut app, key(KeyCode::Char('e')));
        assert_eq!(app.modal.mode(), &FormMode::Editing("2".into()));
        assert_eq!(app.focus, Focus::Title);
        assert_eq!(app.modal.form().title.text(), "second");
        // Esc leaves edit mode but keeps the modal open
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.modal.mode(), &FormMode::Creating);
        assert!(app.modal.is_open());
    }

    #[test]
    fn ctrl_c_closes() {
        let mut app = open_app();
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!app.modal.is_open());
    }

    #[test]
    fn paste_strips_control_characters() {
        let mut app = open_app();
        handle_paste(&mut app, "hi\x1b[31m there\n");
        assert_eq!(app.modal.form().title.text(), "hi[31m there ");
        app.focus = Focus::Pin;
        handle_paste(&mut app, " 98765 ");
        assert_eq!(app.modal.form().pin.text(), "9876");
    }
}
