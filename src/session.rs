use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::error::DeliveryError;
use crate::types::SessionId;

/// A registered client: its name and the write side of its outbound queue.
///
/// Other sessions never touch this client's socket. They push rendered lines
/// onto the queue and the session's own writer task drains it, so a slow
/// reader can only stall itself.
#[derive(Debug)]
pub struct Session {
    pub id: SessionId,
    pub name: String,
    tx: mpsc::Sender<String>,
    closed: AtomicBool,
    shutdown: Notify,
}

impl Session {
    /// Create a session and the receiving end its writer task will drain.
    pub fn new(
        id: SessionId,
        name: impl Into<String>,
        capacity: usize,
    ) -> (Arc<Self>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let session = Arc::new(Self {
            id,
            name: name.into(),
            tx,
            closed: AtomicBool::new(false),
            shutdown: Notify::new(),
        });
        (session, rx)
    }

    /// Queue one line (which may itself span several lines) for this client.
    ///
    /// Never waits. A full or closed queue means the client is not keeping
    /// up, so the session is flagged for teardown by its own connection task.
    pub fn deliver(&self, line: impl Into<String>) -> Result<(), DeliveryError> {
        if self.is_closed() {
            return Err(DeliveryError::Closed);
        }
        match self.tx.try_send(line.into()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                tracing::warn!(session = %self.id, name = %self.name, "outbound queue full, dropping client");
                self.kill();
                Err(DeliveryError::Full)
            }
            Err(TrySendError::Closed(_)) => {
                self.kill();
                Err(DeliveryError::Closed)
            }
        }
    }

    /// Ask the owning connection task to tear this session down.
    pub fn kill(&self) {
        self.shutdown.notify_one();
    }

    /// Resolves once `kill` has been called.
    pub async fn killed(&self) {
        self.shutdown.notified().await;
    }

    /// Flip the closed flag. Returns `true` only for the first caller, who
    /// then owns the rest of the teardown.
    pub fn begin_teardown(&self) -> bool {
        !self.closed.swap(true, Ordering::AcqRel)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        tracing::debug!(session = %self.id, name = %self.name, "session dropped");
    }
}
