//! Transient toast notifications.
//!
//! Time is passed in by the caller so expiry is deterministic under test.

use std::time::{Duration, Instant};

/// How long a standard toast stays up
pub const STANDARD_TTL: Duration = Duration::from_secs(3);
/// How long a mention toast stays fully visible
pub const MENTION_TTL: Duration = Duration::from_secs(4);
/// Mention toast enter phase
pub const MENTION_ENTER: Duration = Duration::from_millis(10);
/// Mention toast exit phase, after `MENTION_TTL`
pub const MENTION_EXIT: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// Something the controller wants the user to see
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Message { kind: NoticeKind, text: String },
    /// A mentioned handle was relayed to the messaging integration
    MentionDelivered(String),
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Notice::Message {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Notice::Message {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Notice::Message {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Notice::Message {
                kind: NoticeKind::Error,
                ..
            }
        )
    }

    /// The text shown to the user
    pub fn text(&self) -> String {
        match self {
            Notice::Message { text, .. } => text.clone(),
            Notice::MentionDelivered(name) => mention_text(name),
        }
    }
}

pub fn mention_text(name: &str) -> String {
    format!("Message sent to WhatsApp ({})", name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: NoticeKind,
    pub text: String,
    pub shown_at: Instant,
}

/// Lifecycle of a mention toast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    Entering,
    Visible,
    Leaving,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionToast {
    pub name: String,
    pub shown_at: Instant,
}

impl MentionToast {
    pub fn text(&self) -> String {
        mention_text(&self.name)
    }

    /// Phase at `now`, or `None` once fully gone
    pub fn phase(&self, now: Instant) -> Option<ToastPhase> {
        let age = now.saturating_duration_since(self.shown_at);
        if age < MENTION_ENTER {
            Some(ToastPhase::Entering)
        } else if age < MENTION_TTL {
            Some(ToastPhase::Visible)
        } else if age < MENTION_TTL + MENTION_EXIT {
            Some(ToastPhase::Leaving)
        } else {
            None
        }
    }
}

/// Holds at most one standard toast plus one mention toast per name
#[derive(Debug, Default)]
pub struct Notifier {
    current: Option<Toast>,
    mentions: Vec<MentionToast>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a notice. A standard toast replaces whatever standard toast is up.
    pub fn push(&mut self, notice: Notice, now: Instant) {
        match notice {
            Notice::Message { kind, text } => {
                self.current = Some(Toast {
                    kind,
                    text,
                    shown_at: now,
                });
            }
            Notice::MentionDelivered(name) => {
                self.mentions.retain(|m| m.name != name);
                self.mentions.push(MentionToast {
                    name,
                    shown_at: now,
                });
            }
        }
    }

    /// Drop everything that has expired by `now`
    pub fn tick(&mut self, now: Instant) {
        if self
            .current
            .as_ref()
            .is_some_and(|t| now.saturating_duration_since(t.shown_at) >= STANDARD_TTL)
        {
            self.current = None;
        }
        self.mentions.retain(|m| m.phase(now).is_some());
    }

    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }

    pub fn mentions(&self) -> &[MentionToast] {
        &self.mentions
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none() && self.mentions.is_empty()
    }
}
