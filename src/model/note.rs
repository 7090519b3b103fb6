use std::fmt;

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};

/// Display format for timestamps (`id-ID` locale: `19/10/2026, 14.05`)
const DISPLAY_FORMAT: &str = "%d/%m/%Y, %H.%M";

/// The record a modal session is attached to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NoteContext {
    pub id_input: String,
    pub table_source: String,
}

impl NoteContext {
    pub fn new(id_input: impl Into<String>, table_source: impl Into<String>) -> Self {
        NoteContext {
            id_input: id_input.into(),
            table_source: table_source.into(),
        }
    }
}

impl fmt::Display for NoteContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id_input, self.table_source)
    }
}

/// A note as returned by the notes service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    #[serde(rename = "id_note", deserialize_with = "deserialize_note_id")]
    pub id: String,
    #[serde(rename = "note_title")]
    pub title: String,
    #[serde(rename = "note_content")]
    pub content: String,
    pub created_by: String,
    pub table_source: String,
    pub created_at: Timestamp,
    #[serde(default)]
    pub updated_at: Option<Timestamp>,
}

/// Server timestamp, kept verbatim and parsed only for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub String);

impl Timestamp {
    pub fn new(raw: impl Into<String>) -> Self {
        Timestamp(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse RFC 3339, RFC 2822, or a naive `YYYY-MM-DD HH:MM:SS` (taken as UTC).
    pub fn parse(&self) -> Option<DateTime<FixedOffset>> {
        let raw = self.0.trim();
        if raw.is_empty() {
            return None;
        }
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt);
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
            return Some(dt);
        }
        let utc = FixedOffset::east_opt(0)?;
        ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .and_then(|naive| utc.from_local_datetime(&naive).single())
    }

    /// Format in the given timezone. Unparseable values are returned as-is.
    pub fn display_in<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: fmt::Display,
    {
        if self.0.trim().is_empty() {
            return "-".to_string();
        }
        match self.parse() {
            Some(dt) => dt.with_timezone(tz).format(DISPLAY_FORMAT).to_string(),
            None => self.0.clone(),
        }
    }

    /// Format in local time
    pub fn display(&self) -> String {
        self.display_in(&Local)
    }
}

/// Notes are keyed by `id_note`, which the service may send as a number or a string
fn deserialize_note_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Int(n) => n.to_string(),
        RawId::Float(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn note_from_wire_with_numeric_id() {
        let json = r#"{
            "id_note": 17,
            "note_title": "Check stock",
            "note_content": "line one\nline two",
            "created_by": "Vinka",
            "table_source": "table_sales",
            "created_at": "2025-03-01T08:30:00Z",
            "updated_at": null
        }"#;
        let note: Note = serde_json::from_str(json).unwrap();
        assert_eq!(note.id, "17");
        assert_eq!(note.title, "Check stock");
        assert_eq!(note.table_source, "table_sales");
        assert!(note.updated_at.is_none());
    }

    #[test]
    fn note_from_wire_with_string_id_and_missing_update() {
        let json = r#"{
            "id_note": "n-4",
            "note_title": "t",
            "note_content": "c",
            "created_by": "Imam",
            "table_source": "table_stock",
            "created_at": "2025-03-01 08:30:00"
        }"#;
        let note: Note = serde_json::from_str(json).unwrap();
        assert_eq!(note.id, "n-4");
        assert!(note.updated_at.is_none());
    }

    #[test]
    fn timestamp_formats() {
        let rfc3339 = Timestamp::new("2025-03-01T08:30:00Z");
        assert_eq!(rfc3339.display_in(&Utc), "01/03/2025, 08.30");

        let rfc2822 = Timestamp::new("Sat, 01 Mar 2025 08:30:00 GMT");
        assert_eq!(rfc2822.display_in(&Utc), "01/03/2025, 08.30");

        let naive = Timestamp::new("2025-03-01 08:30:00.123");
        assert_eq!(naive.display_in(&Utc), "01/03/2025, 08.30");

        let offset = Timestamp::new("2025-03-01T08:30:00+07:00");
        assert_eq!(offset.display_in(&Utc), "01/03/2025, 01.30");
    }

    #[test]
    fn timestamp_fallbacks() {
        assert_eq!(Timestamp::new("").display_in(&Utc), "-");
        assert_eq!(Timestamp::new("yesterday").display_in(&Utc), "yesterday");
        assert!(Timestamp::new("yesterday").parse().is_none());
    }

    #[test]
    fn context_display() {
        let ctx = NoteContext::new("42", "table_sales");
        assert_eq!(ctx.to_string(), "42@table_sales");
    }
}
