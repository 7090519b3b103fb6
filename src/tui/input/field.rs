use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::TextField;

/// What a key did to a text field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEdit {
    /// The value changed
    Changed,
    /// Only the caret moved
    Moved,
    /// Not a text-editing key
    Unhandled,
}

/// Line-editor keys shared by every text field.
///
/// `multiline` enables Enter for newlines and Up/Down between lines.
pub fn edit_field(field: &mut TextField, key: KeyEvent, multiline: bool) -> FieldEdit {
    let changed = |did: bool| if did { FieldEdit::Changed } else { FieldEdit::Moved };
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('a')) | (_, KeyCode::Home) => {
            field.move_home();
            FieldEdit::Moved
        }
        (KeyModifiers::CONTROL, KeyCode::Char('e')) | (_, KeyCode::End) => {
            field.move_end();
            FieldEdit::Moved
        }
        (KeyModifiers::CONTROL, KeyCode::Char('u')) => changed(field.kill_to_start()),
        (m, KeyCode::Left) if m.intersects(KeyModifiers::ALT | KeyModifiers::CONTROL) => {
            field.move_word_left();
            FieldEdit::Moved
        }
        (m, KeyCode::Right) if m.intersects(KeyModifiers::ALT | KeyModifiers::CONTROL) => {
            field.move_word_right();
            FieldEdit::Moved
        }
        (_, KeyCode::Left) => {
            field.move_left();
            FieldEdit::Moved
        }
        (_, KeyCode::Right) => {
            field.move_right();
            FieldEdit::Moved
        }
        (_, KeyCode::Up) if multiline => {
            field.move_line_up();
            FieldEdit::Moved
        }
        (_, KeyCode::Down) if multiline => {
            field.move_line_down();
            FieldEdit::Moved
        }
        (_, KeyCode::Backspace) => changed(field.backspace()),
        (_, KeyCode::Delete) => changed(field.delete_forward()),
        (KeyModifiers::NONE, KeyCode::Enter) if multiline => changed(field.insert_char('\n')),
        (m, KeyCode::Char(c)) if !m.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            changed(field.insert_char(c))
        }
        _ => FieldEdit::Unhandled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn typing_and_deleting() {
        let mut f = TextField::new(None);
        for c in "abc".chars() {
            assert_eq!(edit_field(&mut f, key(KeyCode::Char(c)), false), FieldEdit::Changed);
        }
        assert_eq!(edit_field(&mut f, key(KeyCode::Left), false), FieldEdit::Moved);
        assert_eq!(edit_field(&mut f, key(KeyCode::Backspace), false), FieldEdit::Changed);
        assert_eq!(f.text(), "ac");
        assert_eq!(edit_field(&mut f, ctrl('a'), false), FieldEdit::Moved);
        assert_eq!(edit_field(&mut f, key(KeyCode::Backspace), false), FieldEdit::Moved);
        assert_eq!(f.cursor(), 0);
    }

    #[test]
    fn enter_only_in_multiline() {
        let mut f = TextField::new(None);
        assert_eq!(edit_field(&mut f, key(KeyCode::Enter), false), FieldEdit::Unhandled);
        assert_eq!(edit_field(&mut f, key(KeyCode::Enter), true), FieldEdit::Changed);
        assert_eq!(f.text(), "\n");
    }

    #[test]
    fn shifted_chars_insert() {
        let mut f = TextField::new(None);
        edit_field(&mut f, KeyEvent::new(KeyCode::Char('@'), KeyModifiers::SHIFT), false);
        assert_eq!(f.text(), "@");
        assert_eq!(edit_field(&mut f, ctrl('x'), false), FieldEdit::Unhandled);
    }
}
