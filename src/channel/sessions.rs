use std::sync::Arc;
use std::time::Duration;

use dashmap::{mapref::entry::Entry, DashMap};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::ClickEvent;
use crate::models::UserId;

const SESSION_QUEUE_CAPACITY: usize = 32;

/// Identifier of one dialog session, used in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct SessionHandle {
    id: SessionId,
    tx: mpsc::Sender<ClickEvent>,
}

/// Outcome of routing a click
#[derive(Debug)]
pub enum Dispatch {
    Delivered,
    /// No open session accepted the click; it is handed back to the caller
    NoSession(ClickEvent),
}

/// Open dialog sessions, at most one per user
///
/// Clicks from a user are queued to that user's session in arrival order.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<UserId, SessionHandle>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a session for `user_id`, or `None` if one is already open
    pub fn open(self: &Arc<Self>, user_id: UserId) -> Option<SessionLease> {
        match self.sessions.entry(user_id) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                let (tx, rx) = mpsc::channel(SESSION_QUEUE_CAPACITY);
                let id = SessionId(Uuid::new_v4());
                slot.insert(SessionHandle { id, tx });

                tracing::debug!(user_id, session_id = %id, "Dialog session opened");

                Some(SessionLease {
                    registry: Arc::clone(self),
                    user_id,
                    id,
                    rx,
                })
            }
        }
    }

    /// Queues a click for the user's open session
    pub fn dispatch(&self, click: ClickEvent) -> Dispatch {
        let tx = match self.sessions.get(&click.user_id) {
            Some(handle) => handle.tx.clone(),
            None => return Dispatch::NoSession(click),
        };

        match tx.try_send(click) {
            Ok(()) => Dispatch::Delivered,
            Err(mpsc::error::TrySendError::Full(click))
            | Err(mpsc::error::TrySendError::Closed(click)) => {
                tracing::warn!(user_id = click.user_id, "Dialog session not accepting clicks");
                Dispatch::NoSession(click)
            }
        }
    }

    pub fn is_open(&self, user_id: UserId) -> bool {
        self.sessions.contains_key(&user_id)
    }

    fn release(&self, user_id: UserId, id: SessionId) {
        if self
            .sessions
            .remove_if(&user_id, |_, handle| handle.id == id)
            .is_some()
        {
            tracing::debug!(user_id, session_id = %id, "Dialog session closed");
        }
    }
}

/// Exclusive claim on a user's session; closes the session when dropped
pub struct SessionLease {
    registry: Arc<SessionRegistry>,
    user_id: UserId,
    id: SessionId,
    rx: mpsc::Receiver<ClickEvent>,
}

impl SessionLease {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Waits for the next click, or `None` once `timeout` passes without one
    pub async fn next_click(&mut self, timeout: Duration) -> Option<ClickEvent> {
        tokio::time::timeout(timeout, self.rx.recv())
            .await
            .ok()
            .flatten()
    }
}

impl Drop for SessionLease {
    fn drop(&mut self) {
        self.registry.release(self.user_id, self.id);
    }
}
