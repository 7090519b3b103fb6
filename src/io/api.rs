//! Client for the remote notes and PIN-verification service.

use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::Url;
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};

use crate::model::{ApiConfig, Note, NoteContext};

/// Tags requests with the modal session they were issued for
pub type Generation = u64;

/// Error type for calls to the notes service
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("no API base URL configured (set [api] base_url or pass --api-url)")]
    MissingBaseUrl,
    #[error("invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("{status}{}", .message.as_deref().map(|m| format!(": {}", m)).unwrap_or_default())]
    Service {
        /// Status line text, e.g. `500 Internal Server Error`
        status: String,
        /// `message` from the response body, when the server sent one
        message: Option<String>,
    },
}

impl ApiError {
    /// Server-provided message, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Service { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// Outcome of a PIN check that reached the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinVerdict {
    Verified,
    /// Rejected, with the server's reason when it gave one
    Rejected(Option<String>),
}

/// A PIN on its way to the server. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Pin(String);

impl Pin {
    pub fn new(pin: impl Into<String>) -> Self {
        Pin(pin.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pin(****)")
    }
}

/// Fields of a note about to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub created_by: String,
}

/// The four service calls
pub trait NotesApi {
    /// All notes for a record id, across table sources
    fn fetch_notes(&self, id_input: &str) -> Result<Vec<Note>, ApiError>;
    fn verify_pin(&self, user_name: &str, pin: &Pin) -> Result<PinVerdict, ApiError>;
    /// Returns the created note when the server echoes it back
    fn create_note(&self, context: &NoteContext, draft: &NoteDraft) -> Result<Option<Note>, ApiError>;
    /// Returns the updated note when the server echoes it back
    fn update_note(&self, note_id: &str, title: &str, content: &str) -> Result<Option<Note>, ApiError>;
}

// ---------------------------------------------------------------------------
// Requests as data
// ---------------------------------------------------------------------------

/// A service call queued by the modal controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest {
    FetchNotes {
        generation: Generation,
        context: NoteContext,
    },
    VerifyPin {
        generation: Generation,
        user_name: String,
        pin: Pin,
    },
    CreateNote {
        generation: Generation,
        context: NoteContext,
        draft: NoteDraft,
    },
    UpdateNote {
        generation: Generation,
        note_id: String,
        title: String,
        content: String,
    },
}

impl ApiRequest {
    pub fn generation(&self) -> Generation {
        match self {
            ApiRequest::FetchNotes { generation, .. }
            | ApiRequest::VerifyPin { generation, .. }
            | ApiRequest::CreateNote { generation, .. }
            | ApiRequest::UpdateNote { generation, .. } => *generation,
        }
    }
}

/// The completion of an `ApiRequest`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiResponse {
    NotesFetched {
        generation: Generation,
        context: NoteContext,
        result: Result<Vec<Note>, ApiError>,
    },
    PinChecked {
        generation: Generation,
        result: Result<PinVerdict, ApiError>,
    },
    NoteCreated {
        generation: Generation,
        result: Result<Option<Note>, ApiError>,
    },
    NoteUpdated {
        generation: Generation,
        result: Result<Option<Note>, ApiError>,
    },
}

impl ApiResponse {
    pub fn generation(&self) -> Generation {
        match self {
            ApiResponse::NotesFetched { generation, .. }
            | ApiResponse::PinChecked { generation, .. }
            | ApiResponse::NoteCreated { generation, .. }
            | ApiResponse::NoteUpdated { generation, .. } => *generation,
        }
    }
}

/// Run one request against an API, blocking until it completes
pub fn dispatch<A: NotesApi + ?Sized>(api: &A, request: ApiRequest) -> ApiResponse {
    match request {
        ApiRequest::FetchNotes {
            generation,
            context,
        } => {
            let result = api.fetch_notes(&context.id_input);
            ApiResponse::NotesFetched {
                generation,
                context,
                result,
            }
        }
        ApiRequest::VerifyPin {
            generation,
            user_name,
            pin,
        } => ApiResponse::PinChecked {
            generation,
            result: api.verify_pin(&user_name, &pin),
        },
        ApiRequest::CreateNote {
            generation,
            context,
            draft,
        } => ApiResponse::NoteCreated {
            generation,
            result: api.create_note(&context, &draft),
        },
        ApiRequest::UpdateNote {
            generation,
            note_id,
            title,
            content,
        } => ApiResponse::NoteUpdated {
            generation,
            result: api.update_note(&note_id, &title, &content),
        },
    }
}

// ---------------------------------------------------------------------------
// Wire bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CreateNoteBody<'a> {
    id_input: &'a str,
    table_source: &'a str,
    note_title: &'a str,
    note_content: &'a str,
    created_by: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdateNoteBody<'a> {
    note_title: &'a str,
    note_content: &'a str,
}

#[derive(Serialize)]
struct VerifyPinBody<'a> {
    user_name: &'a str,
    pin: &'a str,
}

#[derive(Debug, Deserialize)]
struct NotesEnvelope {
    #[serde(default)]
    data: Option<Vec<Note>>,
}

#[derive(Debug, Default, Deserialize)]
struct PinReply {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// `NotesApi` over HTTP+JSON
pub struct HttpNotesApi {
    base: Url,
    client: Client,
}

impl HttpNotesApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let invalid = |reason: String| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let base = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(invalid("expected an http(s) URL".into()));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(HttpNotesApi { base, client })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = config.base_url.as_deref().ok_or(ApiError::MissingBaseUrl)?;
        Self::new(base_url, Duration::from_secs(config.timeout_secs))
    }

    /// Base URL plus percent-encoded path segments
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl {
                url: self.base.to_string(),
                reason: "cannot be a base".into(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn network(err: reqwest::Error) -> ApiError {
    log::warn!("notes service unreachable: {}", err);
    ApiError::Network(err.to_string())
}

fn malformed(err: impl fmt::Display) -> ApiError {
    log::warn!("malformed response from notes service: {}", err);
    ApiError::Network(format!("malformed response: {}", err))
}

fn status_text(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

/// Turn a non-2xx response into `ApiError::Service`, reading `{ message }` if present
fn check_status(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message);
    log::warn!("notes service returned {}: {:?}", status, message);
    Err(ApiError::Service {
        status: status_text(status),
        message,
    })
}

/// The note echoed in a write response, bare or under `data`
fn parse_echo(body: &str) -> Option<Note> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let note = match value.get("data") {
        Some(data) => data.clone(),
        None => value,
    };
    serde_json::from_value(note).ok()
}

impl NotesApi for HttpNotesApi {
    fn fetch_notes(&self, id_input: &str) -> Result<Vec<Note>, ApiError> {
        let url = self.endpoint(&["api", "notes", id_input])?;
        log::debug!("GET {}", url);
        let resp = check_status(self.client.get(url).send().map_err(network)?)?;
        let envelope: NotesEnvelope = resp.json().map_err(malformed)?;
        Ok(envelope.data.unwrap_or_default())
    }

    fn verify_pin(&self, user_name: &str, pin: &Pin) -> Result<PinVerdict, ApiError> {
        let url = self.endpoint(&["api", "auth", "verify-pin"])?;
        log::debug!("POST {} for {}", url, user_name);
        let resp = self
            .client
            .post(url)
            .json(&VerifyPinBody {
                user_name,
                pin: pin.expose(),
            })
            .send()
            .map_err(network)?;
        let ok = resp.status().is_success();
        let body = resp.text().map_err(network)?;
        let reply = match serde_json::from_str::<PinReply>(&body) {
            Ok(reply) => reply,
            Err(_) if !ok => PinReply::default(),
            Err(e) => return Err(malformed(e)),
        };
        if ok && reply.status.as_deref() == Some("success") {
            Ok(PinVerdict::Verified)
        } else {
            log::info!("PIN rejected for {}", user_name);
            Ok(PinVerdict::Rejected(reply.message))
        }
    }

    fn create_note(&self, context: &NoteContext, draft: &NoteDraft) -> Result<Option<Note>, ApiError> {
        let url = self.endpoint(&["api", "notes"])?;
        log::debug!("POST {} for {}", url, context);
        let body = CreateNoteBody {
            id_input: &context.id_input,
            table_source: &context.table_source,
            note_title: &draft.title,
            note_content: &draft.content,
            created_by: &draft.created_by,
        };
        let resp = check_status(self.client.post(url).json(&body).send().map_err(network)?)?;
        Ok(parse_echo(&resp.text().map_err(network)?))
    }

    fn update_note(&self, note_id: &str, title: &str, content: &str) -> Result<Option<Note>, ApiError> {
        let url = self.endpoint(&["api", "notes", note_id])?;
        log::debug!("PUT {}", url);
        let body = UpdateNoteBody {
            note_title: title,
            note_content: content,
        };
        let resp = check_status(self.client.put(url).json(&body).send().map_err(network)?)?;
        Ok(parse_echo(&resp.text().map_err(network)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_encodes_segments() {
        let api = HttpNotesApi::new("http://notes.local:5000", Duration::from_secs(1)).unwrap();
        let url = api.endpoint(&["api", "notes", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://notes.local:5000/api/notes/a%2Fb%20c");
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let api = HttpNotesApi::new("http://gw.local/notes-svc/", Duration::from_secs(1)).unwrap();
        let url = api.endpoint(&["api", "notes"]).unwrap();
        assert_eq!(url.as_str(), "http://gw.local/notes-svc/api/notes");
    }

    #[test]
    fn rejects_bad_base_urls() {
        assert!(matches!(
            HttpNotesApi::new("not a url", Duration::from_secs(1)),
            Err(ApiError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            HttpNotesApi::new("mailto:notes@example.com", Duration::from_secs(1)),
            Err(ApiError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn missing_base_url() {
        assert!(matches!(
            HttpNotesApi::from_config(&ApiConfig::default()),
            Err(ApiError::MissingBaseUrl)
        ));
    }

    #[test]
    fn echo_parsing() {
        let bare = r#"{"id_note":3,"note_title":"t","note_content":"c","created_by":"Imam","table_source":"table_sales","created_at":"2025-01-01T00:00:00Z"}"#;
        assert_eq!(parse_echo(bare).map(|n| n.id), Some("3".to_string()));
        let wrapped = format!(r#"{{"message":"ok","data":{}}}"#, bare);
        assert_eq!(parse_echo(&wrapped).map(|n| n.id), Some("3".to_string()));
        assert!(parse_echo(r#"{"message":"Note created"}"#).is_none());
        assert!(parse_echo("").is_none());
    }

    #[test]
    fn service_error_display() {
        let err = ApiError::Service {
            status: "400 Bad Request".into(),
            message: Some("title too long".into()),
        };
        assert_eq!(err.to_string(), "400 Bad Request: title too long");
        assert_eq!(err.server_message(), Some("title too long"));
        let bare = ApiError::Service {
            status: "502 Bad Gateway".into(),
            message: None,
        };
        assert_eq!(bare.to_string(), "502 Bad Gateway");
    }

    #[test]
    fn pin_is_redacted_in_debug() {
        let req = ApiRequest::VerifyPin {
            generation: 1,
            user_name: "Vinka".into(),
            pin: Pin::new("1234"),
        };
        let printed = format!("{:?}", req);
        assert!(!printed.contains("1234"));
        assert!(printed.contains("Pin(****)"));
    }
}
