//! The note modal: form state, edit mode and the submit pipeline.
//!
//! `NoteModal` performs no I/O. Operations queue `ApiRequest`s for an
//! executor to run (`take_requests`), completions come back through
//! `handle_response`, and anything the user should see is queued as a
//! `Notice` (`take_notices`). Every request carries the generation it was
//! issued under; `open` and `close` bump the generation so late responses
//! from an earlier session are dropped.

use std::collections::VecDeque;

use crate::io::api::{ApiError, ApiRequest, ApiResponse, Generation, NoteDraft, Pin, PinVerdict};
use crate::model::{
    CONTENT_MAX_CHARS, FormMode, Note, NoteContext, NoteForm, PIN_LEN, PeopleConfig, TITLE_MAX_CHARS,
    TextField,
};
use crate::ops::mention::{DropdownEvent, KeyOutcome, MentionEngine, MentionKey};
use crate::ops::notify::Notice;
use crate::ops::store::NoteStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalState {
    #[default]
    Closed,
    Open,
}

/// First failed check on the form, in the order checks run
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a note title")]
    MissingTitle,
    #[error("Please enter note content")]
    MissingContent,
    #[error("Please select your name")]
    MissingCreator,
    #[error("Please enter your PIN")]
    MissingPin,
    #[error("PIN must be 4 digits")]
    BadPinLength,
    #[error("Title must be at most 100 characters")]
    TitleTooLong,
    #[error("Content must be at most 500 characters")]
    ContentTooLong,
}

/// Trimmed form values that passed validation
/// How the most recent submission ended. A failed reload after a
/// successful write does not change it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Saved,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub title: String,
    pub content: String,
    pub created_by: String,
    pub pin: Pin,
}

/// Check the form and extract trimmed values.
///
/// Presence checks come first and short-circuit; length caps last.
pub fn validate(form: &NoteForm) -> Result<Submission, ValidationError> {
    let title = form.title.text().trim();
    let content = form.content.text().trim();
    let pin = form.pin.text().trim();

    if title.is_empty() {
        return Err(ValidationError::MissingTitle);
    }
    if content.is_empty() {
        return Err(ValidationError::MissingContent);
    }
    let created_by = match form.created_by.as_deref() {
        Some(name) if !name.trim().is_empty() => name,
        _ => return Err(ValidationError::MissingCreator),
    };
    if pin.is_empty() {
        return Err(ValidationError::MissingPin);
    }
    if pin.chars().count() != PIN_LEN {
        return Err(ValidationError::BadPinLength);
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(ValidationError::TitleTooLong);
    }
    if content.chars().count() > CONTENT_MAX_CHARS {
        return Err(ValidationError::ContentTooLong);
    }

    Ok(Submission {
        title: title.to_string(),
        content: content.to_string(),
        created_by: created_by.to_string(),
        pin: Pin::new(pin),
    })
}

/// A submission between the PIN check and the write completing
#[derive(Debug, Clone)]
struct PendingWrite {
    submission: Submission,
    /// Mode at the moment of submit; decides create vs update
    mode: FormMode,
}

#[derive(Debug, Clone)]
enum Pending {
    Verifying(PendingWrite),
    Writing(PendingWrite),
}

#[derive(Debug)]
pub struct NoteModal {
    state: ModalState,
    store: NoteStore,
    form: NoteForm,
    mode: FormMode,
    mention: MentionEngine,
    creators: Vec<String>,
    generation: Generation,
    loading: bool,
    pending: Option<Pending>,
    outbox: VecDeque<ApiRequest>,
    notices: Vec<Notice>,
    outcome: Option<SubmitOutcome>,
}

impl NoteModal {
    pub fn new(people: &PeopleConfig) -> Self {
        NoteModal {
            state: ModalState::Closed,
            store: NoteStore::new(),
            form: NoteForm::default(),
            mode: FormMode::Creating,
            mention: MentionEngine::new(people.mention_handles.clone()),
            creators: people.creators.clone(),
            generation: 0,
            loading: false,
            pending: None,
            outbox: VecDeque::new(),
            notices: Vec::new(),
            outcome: None,
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Show the modal for a record and start loading its notes
    pub fn open(&mut self, context: NoteContext) {
        self.generation += 1;
        self.state = ModalState::Open;
        self.outbox.clear();
        self.pending = None;
        self.outcome = None;
        self.form.clear();
        self.mode = FormMode::Creating;
        self.mention.reset();
        self.store.set_context(context.clone());
        self.store.replace_all(Vec::new());
        log::debug!("opening notes for {} (generation {})", context, self.generation);
        self.request_notes(context);
    }

    /// Hide the modal. Requests still in flight are forgotten.
    pub fn close(&mut self) {
        if self.state == ModalState::Closed {
            return;
        }
        self.generation += 1;
        self.state = ModalState::Closed;
        self.outbox.clear();
        if self.pending.take().is_some() {
            log::debug!("closing with a submission in flight; its result will be dropped");
        }
        self.loading = false;
        self.outcome = None;
        self.form.clear();
        self.mode = FormMode::Creating;
        self.mention.reset();
    }

    pub fn state(&self) -> ModalState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ModalState::Open
    }

    /// Background scrolling is suppressed exactly while the modal is up
    pub fn is_scroll_locked(&self) -> bool {
        self.is_open()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    pub fn context(&self) -> Option<&NoteContext> {
        self.store.context()
    }

    pub fn form(&self) -> &NoteForm {
        &self.form
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn mention(&self) -> &MentionEngine {
        &self.mention
    }

    pub fn creators(&self) -> &[String] {
        &self.creators
    }

    /// A notes fetch is outstanding
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// A submission is between PIN check and write completion
    pub fn is_submitting(&self) -> bool {
        self.pending.is_some()
    }

    // -----------------------------------------------------------------------
    // Form editing
    // -----------------------------------------------------------------------

    /// Apply an edit to the title field and re-run mention detection
    pub fn edit_title<R>(&mut self, edit: impl FnOnce(&mut TextField) -> R) -> R {
        let result = edit(&mut self.form.title);
        log_dropdown(self.mention.on_input(&self.form.title));
        result
    }

    pub fn content_mut(&mut self) -> &mut TextField {
        &mut self.form.content
    }

    pub fn pin_mut(&mut self) -> &mut TextField {
        &mut self.form.pin
    }

    /// Offer a navigation key to the mention dropdown
    pub fn mention_key(&mut self, key: MentionKey) -> KeyOutcome {
        self.mention.on_key(key, &mut self.form.title)
    }

    /// Close the dropdown without touching the title
    pub fn dismiss_mentions(&mut self) {
        log_dropdown(self.mention.reset());
    }

    /// Select a creator. Names outside the roster are refused.
    pub fn select_creator(&mut self, name: Option<&str>) -> bool {
        match name {
            None => {
                self.form.created_by = None;
                true
            }
            Some(name) => match self.creators.iter().find(|c| c.as_str() == name) {
                Some(found) => {
                    self.form.created_by = Some(found.clone());
                    true
                }
                None => false,
            },
        }
    }

    /// Step through the roster; wraps, and starts from either end when unset
    pub fn cycle_creator(&mut self, forward: bool) {
        let n = self.creators.len();
        if n == 0 {
            return;
        }
        let current = self
            .form
            .created_by
            .as_ref()
            .and_then(|name| self.creators.iter().position(|c| c == name));
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => n - 1,
            (Some(i), true) => (i + 1) % n,
            (Some(i), false) => (i + n - 1) % n,
        };
        self.form.created_by = Some(self.creators[next].clone());
    }

    // -----------------------------------------------------------------------
    // Edit mode
    // -----------------------------------------------------------------------

    /// Load a note into the form and switch to Editing.
    ///
    /// The creator is pre-selected only when it matches a roster entry
    /// exactly. The PIN field keeps whatever was typed.
    pub fn begin_edit(&mut self, note_id: &str) -> bool {
        if !self.is_open() {
            return false;
        }
        if self.pending.is_some() {
            log::debug!("edit of {} refused while a submission is in flight", note_id);
            return false;
        }
        let Some(note) = self.store.find_by_id(note_id).cloned() else {
            log::debug!("edit requested for unknown note {}", note_id);
            return false;
        };
        self.fill_from(&note);
        self.mode = FormMode::Editing(note.id);
        true
    }

    fn fill_from(&mut self, note: &Note) {
        self.form.title.set(&note.title);
        self.form.content.set(&note.content);
        self.form.created_by = self
            .creators
            .iter()
            .find(|c| **c == note.created_by)
            .cloned();
        self.mention.reset();
    }

    /// Leave Editing and clear the form
    pub fn cancel_edit(&mut self) {
        if !self.mode.is_editing() {
            return;
        }
        self.form.clear();
        self.mode = FormMode::Creating;
        self.mention.reset();
    }

    // -----------------------------------------------------------------------
    // Submit pipeline
    // -----------------------------------------------------------------------

    /// Validate, then ask for a PIN check. The write follows the verdict.
    pub fn submit(&mut self) {
        if !self.is_open() {
            return;
        }
        if self.pending.is_some() {
            log::debug!("submission already in flight, ignoring submit");
            return;
        }
        let submission = match validate(&self.form) {
            Ok(submission) => submission,
            Err(e) => {
                self.fail(e.to_string());
                return;
            }
        };
        self.outbox.push_back(ApiRequest::VerifyPin {
            generation: self.generation,
            user_name: submission.created_by.clone(),
            pin: submission.pin.clone(),
        });
        self.pending = Some(Pending::Verifying(PendingWrite {
            submission,
            mode: self.mode.clone(),
        }));
    }

    /// Requests queued since the last call, oldest first
    pub fn take_requests(&mut self) -> Vec<ApiRequest> {
        self.outbox.drain(..).collect()
    }

    /// Notices queued since the last call, oldest first
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Outcome of the last submission, once it has settled
    pub fn take_outcome(&mut self) -> Option<SubmitOutcome> {
        self.outcome.take()
    }

    /// Report a submission failure to the user and record it
    fn fail(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.notices.push(Notice::error(text.clone()));
        self.outcome = Some(SubmitOutcome::Failed(text));
    }

    /// Feed a completed request back in
    pub fn handle_response(&mut self, response: ApiResponse) {
        if response.generation() != self.generation {
            log::debug!(
                "dropping stale response from generation {} (current {})",
                response.generation(),
                self.generation
            );
            return;
        }

        match response {
            ApiResponse::NotesFetched {
                context, result, ..
            } => self.finish_fetch(context, result),
            ApiResponse::PinChecked { result, .. } => self.finish_pin_check(result),
            ApiResponse::NoteCreated { result, .. } | ApiResponse::NoteUpdated { result, .. } => {
                self.finish_write(result)
            }
        }
    }

    fn request_notes(&mut self, context: NoteContext) {
        self.loading = true;
        self.outbox.push_back(ApiRequest::FetchNotes {
            generation: self.generation,
            context,
        });
    }

    fn finish_fetch(&mut self, context: NoteContext, result: Result<Vec<Note>, ApiError>) {
        if self.store.context() != Some(&context) {
            log::debug!("dropping notes for {}; context changed", context);
            return;
        }
        self.loading = false;
        match result {
            Ok(notes) => {
                log::debug!("loaded {} notes for {}", notes.len(), context);
                self.store.replace_all(notes);
            }
            Err(e) => {
                log::warn!("failed to load notes for {}: {}", context, e);
                self.store.replace_all(Vec::new());
                let text = match e {
                    ApiError::Service { .. } => "Failed to load notes",
                    _ => "Error loading notes",
                };
                self.notices.push(Notice::error(text));
            }
        }
    }

    fn finish_pin_check(&mut self, result: Result<PinVerdict, ApiError>) {
        let write = match self.pending.take() {
            Some(Pending::Verifying(write)) => write,
            other => {
                log::debug!("PIN verdict with no verification pending");
                self.pending = other;
                return;
            }
        };

        match result {
            Ok(PinVerdict::Verified) => {
                self.notices.push(Notice::success("PIN verified successfully"));
                let submission = &write.submission;
                let request = match &write.mode {
                    FormMode::Creating => match self.store.context() {
                        Some(context) => ApiRequest::CreateNote {
                            generation: self.generation,
                            context: context.clone(),
                            draft: NoteDraft {
                                title: submission.title.clone(),
                                content: submission.content.clone(),
                                created_by: submission.created_by.clone(),
                            },
                        },
                        None => {
                            log::warn!("no record context; cannot add note");
                            self.fail("Error adding note");
                            return;
                        }
                    },
                    FormMode::Editing(note_id) => ApiRequest::UpdateNote {
                        generation: self.generation,
                        note_id: note_id.clone(),
                        title: submission.title.clone(),
                        content: submission.content.clone(),
                    },
                };
                self.outbox.push_back(request);
                self.pending = Some(Pending::Writing(write));
            }
            Ok(PinVerdict::Rejected(reason)) => {
                self.fail(reason.unwrap_or_else(|| "Invalid PIN".to_string()));
            }
            Err(e) => {
                log::warn!("PIN verification failed: {}", e);
                self.fail("Error verifying PIN");
            }
        }
    }

    fn finish_write(&mut self, result: Result<Option<Note>, ApiError>) {
        let write = match self.pending.take() {
            Some(Pending::Writing(write)) => write,
            other => {
                log::debug!("write completion with no write pending");
                self.pending = other;
                return;
            }
        };
        let editing = write.mode.is_editing();

        match result {
            Ok(echo) => {
                if let Some(note) = echo {
                    log::debug!("server echoed note {}", note.id);
                }
                let text = if editing {
                    "Note updated successfully"
                } else {
                    "Note added successfully"
                };
                self.notices.push(Notice::success(text));
                self.outcome = Some(SubmitOutcome::Saved);
                for name in self.mention.scan(&write.submission.title) {
                    self.notices.push(Notice::MentionDelivered(name));
                }
                self.form.clear();
                self.mode = FormMode::Creating;
                self.mention.reset();
                if let Some(context) = self.store.context().cloned() {
                    self.request_notes(context);
                }
            }
            Err(ApiError::Service { message, .. }) => {
                let fallback = if editing {
                    "Failed to update note"
                } else {
                    "Failed to add note"
                };
                self.fail(message.unwrap_or_else(|| fallback.to_string()));
            }
            Err(e) => {
                log::warn!("note write failed: {}", e);
                self.fail(if editing {
                    "Error updating note"
                } else {
                    "Error adding note"
                });
            }
        }
    }
}

fn log_dropdown(event: Option<DropdownEvent>) {
    if let Some(event) = event {
        log::trace!("mention dropdown {:?}", event);
    }
}
