//! Transport double that replays scripted responses and records requests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{HttpTransport, TransportError, TransportRequest, TransportResponse};

/// Replays queued outcomes in order and keeps every request it was sent.
///
/// When the script runs dry the transport answers with a connection error
/// so an unexpected call fails loudly instead of hanging.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    sent: Mutex<Vec<TransportRequest>>,
    credential_clears: AtomicUsize,
}

impl ScriptedTransport {
    /// Queue a response.
    pub fn push(&self, response: TransportResponse) {
        lock(&self.script).push_back(Ok(response));
    }

    /// Queue a transport failure.
    pub fn push_error(&self, error: TransportError) {
        lock(&self.script).push_back(Err(error));
    }

    /// Requests sent so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<TransportRequest> {
        lock(&self.sent).clone()
    }

    /// Most recent request.
    #[must_use]
    pub fn last_sent(&self) -> Option<TransportRequest> {
        lock(&self.sent).last().cloned()
    }

    /// How often the credentials were cleared.
    #[must_use]
    pub fn credential_clears(&self) -> usize {
        self.credential_clears.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        let url = request.url.clone();
        lock(&self.sent).push(request);
        lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::connect(format!("no scripted response for {url}"))))
    }

    fn clear_credentials(&self) {
        self.credential_clears.fetch_add(1, Ordering::SeqCst);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
