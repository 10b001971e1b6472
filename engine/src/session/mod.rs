//! Session Store
//!
//! Process-wide map from a WhatsApp sender id to that sender's conversation.
//! Each session sits behind its own mutex: the webhook holds it for a whole
//! conversation step, so messages from one user are applied one at a time
//! while different users proceed in parallel. The outer map lock is only held
//! long enough to find or insert a handle.

use sdk::{cart_total, CartLine, MenuItem, OrderDraft};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::conversation::ConversationState;

/// Shared, per-user locked session
pub type SessionHandle = Arc<Mutex<Session>>;

/// Conversation state for one user
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub state: ConversationState,
    pub cart: Vec<CartLine>,
    pub draft: OrderDraft,
    /// Category chosen in the last category prompt
    pub category: Option<String>,
    pub last_selected_item: Option<MenuItem>,
    /// Cart line targeted by quantity edits
    pub active_line: Option<usize>,
    last_seen: Instant,
}

impl Session {
    /// Fresh session in `Welcome` with an empty cart
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            state: ConversationState::Welcome,
            cart: Vec::new(),
            draft: OrderDraft::default(),
            category: None,
            last_selected_item: None,
            active_line: None,
            last_seen: Instant::now(),
        }
    }

    /// Discard cart and draft, back to `Welcome`
    pub fn reset(&mut self) {
        let user_id = std::mem::take(&mut self.user_id);
        *self = Self::new(user_id);
    }

    /// Record activity
    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_seen.elapsed()
    }

    /// Cart total, recomputed from current lines
    pub fn total(&self) -> u64 {
        cart_total(&self.cart)
    }

    /// The line quantity edits apply to
    pub fn active_line_mut(&mut self) -> Option<&mut CartLine> {
        self.active_line.and_then(|idx| self.cart.get_mut(idx))
    }
}

/// Concurrent get-or-create store of sessions
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
    idle_timeout: Option<Duration>,
}

impl SessionStore {
    /// Create a store whose sessions never expire
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that resets sessions idle longer than `timeout`
    pub fn with_idle_timeout(timeout: Option<Duration>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout: timeout,
        }
    }

    /// Return the user's session, creating a `Welcome` session on first contact.
    ///
    /// A session idle past the configured timeout is reset in place. A session
    /// currently locked by another request is in use and never expires.
    pub async fn get(&self, user_id: &str) -> SessionHandle {
        let existing = {
            let sessions = self.sessions.read().await;
            sessions.get(user_id).cloned()
        };

        let handle = match existing {
            Some(handle) => handle,
            None => {
                let mut sessions = self.sessions.write().await;
                if let Some(timeout) = self.idle_timeout {
                    Self::evict_idle(&mut sessions, timeout);
                }
                // First observer wins if two requests raced past the read lock
                Arc::clone(sessions.entry(user_id.to_string()).or_insert_with(|| {
                    debug!("Creating session for {}", user_id);
                    Arc::new(Mutex::new(Session::new(user_id)))
                }))
            }
        };

        if let Some(timeout) = self.idle_timeout {
            if let Ok(mut session) = handle.try_lock() {
                if session.idle_for() >= timeout {
                    debug!("Session for {} expired after {:?}", user_id, timeout);
                    session.reset();
                }
            }
        }

        handle
    }

    /// Drop every idle session nobody holds. Returns how many were removed.
    pub async fn evict_expired(&self) -> usize {
        match self.idle_timeout {
            Some(timeout) => Self::evict_idle(&mut *self.sessions.write().await, timeout),
            None => 0,
        }
    }

    // Caller holds the write lock, so no new handle can be cloned meanwhile.
    fn evict_idle(sessions: &mut HashMap<String, SessionHandle>, timeout: Duration) -> usize {
        let before = sessions.len();
        sessions.retain(|_, handle| {
            let idle = Arc::strong_count(handle) == 1
                && handle
                    .try_lock()
                    .map(|session| session.idle_for() >= timeout)
                    .unwrap_or(false);
            !idle
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!("Evicted {} idle sessions", evicted);
        }
        evicted
    }

    /// Replace the user's session with a fresh `Welcome` one
    pub async fn reset(&self, user_id: &str) {
        let handle = self.get(user_id).await;
        handle.lock().await.reset();
    }

    pub async fn contains(&self, user_id: &str) -> bool {
        self.sessions.read().await.contains_key(user_id)
    }

    /// Number of known sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
