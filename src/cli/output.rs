use std::fmt;

use chrono::TimeZone;
use serde::Serialize;

use crate::model::Note;
use crate::ops::notify::Notice;
use crate::ops::store::NoteGroup;
use crate::util::sanitize::sanitize;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct NoteJson {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_by: String,
    pub table_source: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Serialize)]
pub struct NoteGroupJson {
    pub table_source: String,
    pub label: String,
    pub notes: Vec<NoteJson>,
}

#[derive(Serialize)]
pub struct SubmitJson {
    pub ok: bool,
    /// Every message shown during the submission, in order
    pub messages: Vec<String>,
    /// Handles relayed to the messaging integration
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mentions: Vec<String>,
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

pub fn note_to_json(note: &Note) -> NoteJson {
    NoteJson {
        id: note.id.clone(),
        title: note.title.clone(),
        content: note.content.clone(),
        created_by: note.created_by.clone(),
        table_source: note.table_source.clone(),
        created_at: note.created_at.as_str().to_string(),
        updated_at: note.updated_at.as_ref().map(|t| t.as_str().to_string()),
    }
}

pub fn groups_to_json(groups: &[NoteGroup<'_>]) -> Vec<NoteGroupJson> {
    groups
        .iter()
        .map(|g| NoteGroupJson {
            table_source: g.table_source.to_string(),
            label: g.label.clone(),
            notes: g.notes.iter().map(|n| note_to_json(n)).collect(),
        })
        .collect()
}

pub fn submit_to_json(ok: bool, notices: &[Notice]) -> SubmitJson {
    SubmitJson {
        ok,
        messages: notices.iter().map(Notice::text).collect(),
        mentions: notices
            .iter()
            .filter_map(|n| match n {
                Notice::MentionDelivered(name) => Some(name.clone()),
                _ => None,
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// One note: id and title, indented content, byline
pub fn format_note<Tz: TimeZone>(note: &Note, tz: &Tz) -> Vec<String>
where
    Tz::Offset: fmt::Display,
{
    let mut lines = vec![format!(
        "  #{}  {}",
        sanitize(&note.id, false),
        sanitize(&note.title, false)
    )];
    for line in sanitize(&note.content, true).lines() {
        lines.push(format!("      {}", line));
    }
    let mut byline = format!(
        "      by {} \u{00B7} {}",
        sanitize(&note.created_by, false),
        sanitize(&note.created_at.display_in(tz), false)
    );
    if let Some(updated) = &note.updated_at {
        byline.push_str(&format!(
            " \u{00B7} edited {}",
            sanitize(&updated.display_in(tz), false)
        ));
    }
    lines.push(byline);
    lines
}

/// Groups with headers like `SALES (2)`, separated by blank lines
pub fn format_group_listing<Tz: TimeZone>(groups: &[NoteGroup<'_>], tz: &Tz) -> Vec<String>
where
    Tz::Offset: fmt::Display,
{
    if groups.is_empty() {
        return vec!["No notes available".to_string()];
    }
    let mut lines = Vec::new();
    for (i, group) in groups.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.push(sanitize(&group.header(), false));
        for note in &group.notes {
            lines.extend(format_note(note, tz));
        }
    }
    lines
}
