//! HttpNotesApi against a local canned server.

mod common;

use std::net::TcpListener;
use std::time::Duration;

use common::{CannedServer, Reply, note_json};
use pinnote::io::api::{ApiError, HttpNotesApi, NoteDraft, NotesApi, Pin, PinVerdict};
use pinnote::model::NoteContext;
use pretty_assertions::assert_eq;
use serde_json::Value;

fn client(server: &CannedServer) -> HttpNotesApi {
    HttpNotesApi::new(&server.base_url, Duration::from_secs(5)).unwrap()
}

fn body_json(server: &CannedServer, index: usize) -> Value {
    serde_json::from_str(&server.requests()[index].body).unwrap()
}

#[test]
fn fetch_reads_data_envelope() {
    let server = CannedServer::start(|_| {
        Reply::json(
            200,
            &format!(
                r#"{{"success":true,"data":[{},{}]}}"#,
                note_json(7, "table_sales", "Call back"),
                note_json(8, "table_ops", "Restock")
            ),
        )
    });
    let notes = client(&server).fetch_notes("42").unwrap();

    assert_eq!(server.calls(), vec!["GET /api/notes/42"]);
    let ids: Vec<&str> = notes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["7", "8"]);
    assert_eq!(notes[1].table_source, "table_ops");
    assert_eq!(notes[0].content, "body of Call back");
}

#[test]
fn fetch_without_data_is_empty() {
    let server = CannedServer::start(|_| Reply::json(200, r#"{"success":true}"#));
    assert!(client(&server).fetch_notes("42").unwrap().is_empty());
}

#[test]
fn fetch_escapes_record_id() {
    let server = CannedServer::start(|_| Reply::json(200, r#"{"data":[]}"#));
    client(&server).fetch_notes("INV/2025 01").unwrap();
    assert_eq!(server.calls(), vec!["GET /api/notes/INV%2F2025%2001"]);
}

#[test]
fn fetch_non_2xx_is_service_error() {
    let server = CannedServer::start(|_| Reply::json(404, r#"{"message":"no such record"}"#));
    let err = client(&server).fetch_notes("42").unwrap_err();
    match err {
        ApiError::Service { status, message } => {
            assert!(status.starts_with("404"));
            assert_eq!(message.as_deref(), Some("no such record"));
        }
        other => panic!("expected service error, got {:?}", other),
    }
}

#[test]
fn fetch_garbage_is_network_error() {
    let server = CannedServer::start(|_| Reply::json(200, "<html>oops</html>"));
    let err = client(&server).fetch_notes("42").unwrap_err();
    assert!(matches!(err, ApiError::Network(ref m) if m.contains("malformed")));
}

#[test]
fn verify_pin_success() {
    let server = CannedServer::start(|_| Reply::json(200, r#"{"status":"success"}"#));
    let verdict = client(&server)
        .verify_pin("Mba Desi", &Pin::new("1234"))
        .unwrap();

    assert_eq!(verdict, PinVerdict::Verified);
    assert_eq!(server.calls(), vec!["POST /api/auth/verify-pin"]);
    let body = body_json(&server, 0);
    assert_eq!(body["user_name"], "Mba Desi");
    assert_eq!(body["pin"], "1234");
}

#[test]
fn verify_pin_rejection_carries_message() {
    let server = CannedServer::start(|_| {
        Reply::json(401, r#"{"status":"error","message":"Wrong PIN for Vinka"}"#)
    });
    let verdict = client(&server).verify_pin("Vinka", &Pin::new("0000")).unwrap();
    assert_eq!(
        verdict,
        PinVerdict::Rejected(Some("Wrong PIN for Vinka".into()))
    );
}

#[test]
fn verify_pin_ok_status_without_success_is_rejected() {
    let server = CannedServer::start(|_| Reply::json(200, r#"{"status":"error"}"#));
    let verdict = client(&server).verify_pin("Vinka", &Pin::new("0000")).unwrap();
    assert_eq!(verdict, PinVerdict::Rejected(None));
}

#[test]
fn verify_pin_error_without_body_is_rejected() {
    let server = CannedServer::start(|_| Reply::json(403, ""));
    let verdict = client(&server).verify_pin("Vinka", &Pin::new("0000")).unwrap();
    assert_eq!(verdict, PinVerdict::Rejected(None));
}

#[test]
fn create_posts_context_and_draft() {
    let server = CannedServer::start(|_| {
        Reply::json(201, &format!(r#"{{"data":{}}}"#, note_json(9, "table_sales", "New")))
    });
    let echo = client(&server)
        .create_note(
            &NoteContext::new("42", "table_sales"),
            &NoteDraft {
                title: "New".into(),
                content: "body".into(),
                created_by: "Vinka".into(),
            },
        )
        .unwrap();

    assert_eq!(server.calls(), vec!["POST /api/notes"]);
    let body = body_json(&server, 0);
    assert_eq!(body["id_input"], "42");
    assert_eq!(body["table_source"], "table_sales");
    assert_eq!(body["note_title"], "New");
    assert_eq!(body["note_content"], "body");
    assert_eq!(body["created_by"], "Vinka");
    assert_eq!(echo.map(|n| n.id), Some("9".to_string()));
}

#[test]
fn create_failure_keeps_server_message() {
    let server = CannedServer::start(|_| Reply::json(500, r#"{"message":"Database is down"}"#));
    let err = client(&server)
        .create_note(
            &NoteContext::new("42", "table_sales"),
            &NoteDraft {
                title: "t".into(),
                content: "c".into(),
                created_by: "Vinka".into(),
            },
        )
        .unwrap_err();
    assert_eq!(err.server_message(), Some("Database is down"));
}

#[test]
fn update_puts_title_and_content_only() {
    let server = CannedServer::start(|_| Reply::json(200, r#"{"success":true}"#));
    let echo = client(&server).update_note("17", "Fixed", "Done").unwrap();

    assert_eq!(echo, None);
    assert_eq!(server.calls(), vec!["PUT /api/notes/17"]);
    let body = body_json(&server, 0);
    assert_eq!(body["note_title"], "Fixed");
    assert_eq!(body["note_content"], "Done");
    assert!(body.get("created_by").is_none());
}

#[test]
fn unreachable_service_is_network_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let api = HttpNotesApi::new(&format!("http://127.0.0.1:{}", port), Duration::from_secs(2)).unwrap();
    assert!(matches!(api.fetch_notes("42"), Err(ApiError::Network(_))));
}
