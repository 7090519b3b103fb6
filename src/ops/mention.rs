//! `@name` autocomplete for the single-line title field.
//!
//! The engine is driven by two kinds of events: input events (the field's
//! value or caret changed through typing) and navigation keys while the
//! dropdown is visible. It never owns the field; callers pass it in.

use crate::model::TextField;

/// An open mention session: an unterminated `@token` left of the caret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionSession {
    /// Byte offset of the `@`
    pub start: usize,
    /// Text between the `@` and the caret, as typed
    pub query: String,
    /// Matching handles, in configured order. Never empty.
    pub candidates: Vec<String>,
    /// Highlighted candidate; `None` until the user navigates
    pub highlighted: Option<usize>,
}

impl MentionSession {
    pub fn highlighted_name(&self) -> Option<&str> {
        self.highlighted
            .and_then(|i| self.candidates.get(i))
            .map(|s| s.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MentionState {
    #[default]
    Idle,
    Composing(MentionSession),
}

/// Keys the engine understands while its dropdown is visible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionKey {
    Up,
    Down,
    /// Enter or Tab
    Commit,
    /// Escape
    Cancel,
}

/// Result of offering a key to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Dropdown not visible; the caller should handle the key itself
    Ignored,
    /// Key handled without changing the field
    Consumed,
    /// The field was rewritten with this handle
    Committed(String),
}

/// Dropdown visibility transitions, for the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownEvent {
    Shown,
    Hidden,
}

#[derive(Debug, Clone, Default)]
pub struct MentionEngine {
    handles: Vec<String>,
    state: MentionState,
}

impl MentionEngine {
    pub fn new(handles: Vec<String>) -> Self {
        MentionEngine {
            handles,
            state: MentionState::Idle,
        }
    }

    pub fn handles(&self) -> &[String] {
        &self.handles
    }

    pub fn state(&self) -> &MentionState {
        &self.state
    }

    pub fn session(&self) -> Option<&MentionSession> {
        match &self.state {
            MentionState::Composing(session) => Some(session),
            MentionState::Idle => None,
        }
    }

    /// Whether the candidate dropdown is showing
    pub fn is_visible(&self) -> bool {
        self.session().is_some()
    }

    /// Re-scan after the field's value changed
    pub fn on_input(&mut self, field: &TextField) -> Option<DropdownEvent> {
        let was_visible = self.is_visible();
        self.state = match find_trigger(field.text(), field.cursor()) {
            Some(start) => {
                let query = &field.text()[start + 1..field.cursor()];
                let candidates = filter_candidates(&self.handles, query);
                if candidates.is_empty() {
                    MentionState::Idle
                } else {
                    MentionState::Composing(MentionSession {
                        start,
                        query: query.to_string(),
                        candidates,
                        highlighted: None,
                    })
                }
            }
            None => MentionState::Idle,
        };
        visibility_change(was_visible, self.is_visible())
    }

    /// Offer a navigation key. Keys are only consumed while the dropdown is visible.
    pub fn on_key(&mut self, key: MentionKey, field: &mut TextField) -> KeyOutcome {
        let session = match &mut self.state {
            MentionState::Composing(session) => session,
            MentionState::Idle => return KeyOutcome::Ignored,
        };
        let last = session.candidates.len() - 1;

        match key {
            MentionKey::Down => {
                session.highlighted = Some(session.highlighted.map_or(0, |i| (i + 1).min(last)));
                KeyOutcome::Consumed
            }
            MentionKey::Up => {
                session.highlighted = Some(session.highlighted.map_or(0, |i| i.saturating_sub(1)));
                KeyOutcome::Consumed
            }
            MentionKey::Commit => match session.highlighted_name().map(str::to_string) {
                Some(name) => {
                    self.commit(&name, field);
                    KeyOutcome::Committed(name)
                }
                None => KeyOutcome::Consumed,
            },
            MentionKey::Cancel => {
                self.state = MentionState::Idle;
                KeyOutcome::Consumed
            }
        }
    }

    /// Insert `name` for the open session (keyboard commit or a direct pick).
    ///
    /// Replaces from the `@` through the end of the non-space run at the caret
    /// with `@name` and puts the caret right after the name.
    pub fn commit(&mut self, name: &str, field: &mut TextField) {
        let start = match &self.state {
            MentionState::Composing(session) => session.start,
            MentionState::Idle => return,
        };
        self.state = MentionState::Idle;

        // The field may have been edited out from under the session
        if field.text().get(start..start + 1) != Some("@") || field.cursor() <= start {
            log::debug!("mention session at {} is stale, not committing", start);
            return;
        }
        let (text, caret) = apply_mention(field.text(), start, field.cursor(), name);
        field.replace_range(0..field.text().len(), &text, caret);
    }

    /// Drop any open session
    pub fn reset(&mut self) -> Option<DropdownEvent> {
        let was_visible = self.is_visible();
        self.state = MentionState::Idle;
        visibility_change(was_visible, false)
    }

    /// Handles mentioned in `title`, in configured order, each at most once
    pub fn scan(&self, title: &str) -> Vec<String> {
        scan_mentions(&self.handles, title)
    }
}

fn visibility_change(was: bool, now: bool) -> Option<DropdownEvent> {
    match (was, now) {
        (false, true) => Some(DropdownEvent::Shown),
        (true, false) => Some(DropdownEvent::Hidden),
        _ => None,
    }
}

/// Byte offset of the `@` opening a mention at the caret.
///
/// Scans backward from the caret; a space (or the start of the field)
/// before any `@` means there is no mention.
pub fn find_trigger(text: &str, caret: usize) -> Option<usize> {
    let caret = caret.min(text.len());
    for (i, c) in text.get(..caret)?.char_indices().rev() {
        match c {
            '@' => return Some(i),
            ' ' => return None,
            _ => {}
        }
    }
    None
}

/// Handles containing `query`, case-insensitively
pub fn filter_candidates(handles: &[String], query: &str) -> Vec<String> {
    let query = query.to_lowercase();
    handles
        .iter()
        .filter(|h| h.to_lowercase().contains(&query))
        .cloned()
        .collect()
}

/// Rewrite `text` with `@name` in place of the token starting at `start`.
/// Returns the new text and caret.
pub fn apply_mention(text: &str, start: usize, caret: usize, name: &str) -> (String, usize) {
    let end = text[caret..].find(' ').map_or(text.len(), |i| caret + i);
    let mut out = String::with_capacity(text.len() + name.len() + 1);
    out.push_str(&text[..start]);
    out.push('@');
    out.push_str(name);
    out.push_str(&text[end..]);
    (out, start + 1 + name.len())
}

/// Handles `h` such that `@h` occurs in `title` (case-sensitive)
pub fn scan_mentions(handles: &[String], title: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    if !title.contains('@') {
        return found;
    }
    for handle in handles {
        if title.contains(&format!("@{}", handle)) && !found.contains(handle) {
            found.push(handle.clone());
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn handles() -> Vec<String> {
        ["Vinka", "Desi", "David", "Ikbal", "Imam", "Untung"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn field(text: &str, caret: usize) -> TextField {
        let mut f = TextField::new(None);
        f.set(text);
        f.set_cursor(caret);
        f
    }

    #[test]
    fn trigger_found_before_caret() {
        assert_eq!(find_trigger("hello @Vi", 9), Some(6));
        assert_eq!(find_trigger("a@b c", 3), Some(1));
        assert_eq!(find_trigger("@", 1), Some(0));
    }

    #[test]
    fn trigger_blocked_by_space() {
        assert_eq!(find_trigger("a @ b", 5), None);
        assert_eq!(find_trigger("hello @Vi", 5), None);
        assert_eq!(find_trigger("plain", 5), None);
        assert_eq!(find_trigger("", 0), None);
    }

    #[test]
    fn candidates_are_case_insensitive_substrings() {
        assert_eq!(filter_candidates(&handles(), "vi"), vec!["Vinka", "David"]);
        assert_eq!(filter_candidates(&handles(), "IM"), vec!["Imam"]);
        assert_eq!(filter_candidates(&handles(), "").len(), 6);
        assert!(filter_candidates(&handles(), "zz").is_empty());
    }

    #[test]
    fn typing_opens_dropdown() {
        let mut engine = MentionEngine::new(handles());
        let f = field("hello @Vi", 9);
        assert_eq!(engine.on_input(&f), Some(DropdownEvent::Shown));
        let session = engine.session().unwrap();
        assert_eq!(session.start, 6);
        assert_eq!(session.query, "Vi");
        assert_eq!(session.candidates, vec!["Vinka", "David"]);
        assert_eq!(session.highlighted, None);
    }

    #[test]
    fn enter_commits_highlighted_candidate() {
        let mut engine = MentionEngine::new(handles());
        let mut f = field("hello @Vi", 9);
        engine.on_input(&f);
        assert_eq!(engine.on_key(MentionKey::Down, &mut f), KeyOutcome::Consumed);
        assert_eq!(
            engine.on_key(MentionKey::Commit, &mut f),
            KeyOutcome::Committed("Vinka".into())
        );
        assert_eq!(f.text(), "hello @Vinka");
        assert_eq!(f.cursor(), "hello @Vinka".len());
        assert_eq!(engine.state(), &MentionState::Idle);
    }

    #[test]
    fn commit_without_highlight_is_a_no_op() {
        let mut engine = MentionEngine::new(handles());
        let mut f = field("hello @Vi", 9);
        engine.on_input(&f);
        assert_eq!(engine.on_key(MentionKey::Commit, &mut f), KeyOutcome::Consumed);
        assert_eq!(f.text(), "hello @Vi");
        assert!(engine.is_visible());
    }

    #[test]
    fn mid_word_session_at_inner_at() {
        let mut engine = MentionEngine::new(handles());
        let f = field("a@b c", 3);
        engine.on_input(&f);
        let session = engine.session().unwrap();
        assert_eq!(session.start, 1);
        assert_eq!(session.candidates, vec!["Ikbal"]);
    }

    #[test]
    fn space_before_caret_run_stays_idle() {
        let mut engine = MentionEngine::new(handles());
        assert_eq!(engine.on_input(&field("a @ b", 5)), None);
        assert_eq!(engine.state(), &MentionState::Idle);
    }

    #[test]
    fn no_matches_collapses_to_idle() {
        let mut engine = MentionEngine::new(handles());
        engine.on_input(&field("@Vi", 3));
        assert!(engine.is_visible());
        assert_eq!(engine.on_input(&field("@Viz", 4)), Some(DropdownEvent::Hidden));
        assert!(!engine.is_visible());
    }

    #[test]
    fn highlight_is_clamped() {
        let mut engine = MentionEngine::new(handles());
        let mut f = field("@vi", 3);
        engine.on_input(&f);
        engine.on_key(MentionKey::Up, &mut f);
        assert_eq!(engine.session().unwrap().highlighted, Some(0));
        engine.on_key(MentionKey::Up, &mut f);
        assert_eq!(engine.session().unwrap().highlighted, Some(0));
        for _ in 0..5 {
            engine.on_key(MentionKey::Down, &mut f);
        }
        assert_eq!(engine.session().unwrap().highlighted, Some(1));
        assert_eq!(
            engine.on_key(MentionKey::Commit, &mut f),
            KeyOutcome::Committed("David".into())
        );
        assert_eq!(f.text(), "@David");
    }

    #[test]
    fn input_resets_highlight() {
        let mut engine = MentionEngine::new(handles());
        let mut f = field("@", 1);
        engine.on_input(&f);
        engine.on_key(MentionKey::Down, &mut f);
        assert_eq!(engine.session().unwrap().highlighted, Some(0));
        f.insert_char('i');
        assert_eq!(engine.on_input(&f), None);
        assert_eq!(engine.session().unwrap().highlighted, None);
    }

    #[test]
    fn escape_cancels_without_commit() {
        let mut engine = MentionEngine::new(handles());
        let mut f = field("hi @D", 5);
        engine.on_input(&f);
        engine.on_key(MentionKey::Down, &mut f);
        assert_eq!(engine.on_key(MentionKey::Cancel, &mut f), KeyOutcome::Consumed);
        assert_eq!(f.text(), "hi @D");
        assert_eq!(engine.on_key(MentionKey::Down, &mut f), KeyOutcome::Ignored);
    }

    #[test]
    fn commit_replaces_rest_of_run_after_caret() {
        let (text, caret) = apply_mention("ping @Viabc tomorrow", 5, 8, "Vinka");
        assert_eq!(text, "ping @Vinka tomorrow");
        assert_eq!(caret, 11);
        assert_eq!(&text[..caret], "ping @Vinka");
    }

    #[test]
    fn commit_at_field_start_and_end() {
        assert_eq!(apply_mention("@d", 0, 2, "Desi"), ("@Desi".to_string(), 5));
        assert_eq!(
            apply_mention("x @un", 2, 5, "Untung"),
            ("x @Untung".to_string(), 9)
        );
    }

    #[test]
    fn direct_pick_commits_named_candidate() {
        let mut engine = MentionEngine::new(handles());
        let mut f = field("cc @im please", 6);
        engine.on_input(&f);
        engine.commit("Imam", &mut f);
        assert_eq!(f.text(), "cc @Imam please");
        assert_eq!(f.cursor(), 8);
    }

    #[test]
    fn stale_session_does_not_commit() {
        let mut engine = MentionEngine::new(handles());
        let mut f = field("@vi", 3);
        engine.on_input(&f);
        f.set("vi");
        engine.commit("Vinka", &mut f);
        assert_eq!(f.text(), "vi");
        assert!(!engine.is_visible());
    }

    #[test]
    fn scan_finds_each_handle_once() {
        let found = scan_mentions(&handles(), "@Imam and @Vinka, also @Vinka again");
        assert_eq!(found, vec!["Vinka", "Imam"]);
        assert!(scan_mentions(&handles(), "@vinka lowercase").is_empty());
        assert!(scan_mentions(&handles(), "no mentions").is_empty());
    }

    #[test]
    fn multibyte_text_before_mention() {
        let mut engine = MentionEngine::new(handles());
        let text = "café @de";
        let mut f = field(text, text.len());
        engine.on_input(&f);
        engine.on_key(MentionKey::Down, &mut f);
        engine.on_key(MentionKey::Commit, &mut f);
        assert_eq!(f.text(), "café @Desi");
        assert_eq!(f.cursor(), f.text().len());
    }
}
