use std::sync::Arc;
use std::sync::mpsc;
use std::thread;

use crate::io::api::{ApiRequest, ApiResponse, NotesApi, dispatch};
use crate::ops::modal::NoteModal;

/// Runs service calls on a background thread, one at a time, in the order
/// they were submitted.
///
/// Dropping the worker closes the request channel; the thread exits once
/// the call in progress (if any) returns. It is never joined, so a slow
/// request cannot stall the caller.
pub struct ApiWorker {
    tx: mpsc::Sender<ApiRequest>,
    rx: mpsc::Receiver<ApiResponse>,
}

impl ApiWorker {
    pub fn spawn(api: Arc<dyn NotesApi + Send + Sync>) -> std::io::Result<Self> {
        let (req_tx, req_rx) = mpsc::channel::<ApiRequest>();
        let (resp_tx, resp_rx) = mpsc::channel();

        thread::Builder::new()
            .name("pinnote-api".into())
            .spawn(move || {
                for request in req_rx {
                    let response = dispatch(&*api, request);
                    if resp_tx.send(response).is_err() {
                        break;
                    }
                }
                log::debug!("api worker stopped");
            })?;

        Ok(ApiWorker {
            tx: req_tx,
            rx: resp_rx,
        })
    }

    pub fn submit(&self, request: ApiRequest) {
        if self.tx.send(request).is_err() {
            log::warn!("api worker is gone; request dropped");
        }
    }

    pub fn submit_all(&self, requests: impl IntoIterator<Item = ApiRequest>) {
        for request in requests {
            self.submit(request);
        }
    }

    /// Non-blocking poll for completed requests.
    /// Returns all queued responses (may be empty).
    pub fn poll(&self) -> Vec<ApiResponse> {
        let mut responses = Vec::new();
        while let Ok(resp) = self.rx.try_recv() {
            responses.push(resp);
        }
        responses
    }
}

/// Run the modal's queued requests synchronously until it has nothing left
/// to ask for. Used by the CLI and tests.
pub fn drive<A: NotesApi + ?Sized>(modal: &mut NoteModal, api: &A) {
    loop {
        let requests = modal.take_requests();
        if requests.is_empty() {
            break;
        }
        for request in requests {
            let response = dispatch(api, request);
            modal.handle_response(response);
        }
    }
}
