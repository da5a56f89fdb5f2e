//! # Session State
//!
//! Server-side sessions keyed by a cookie token.
//!
//! ## Thread Safety
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SessionStore                                                           │
//! │  Arc<RwLock<HashMap<Uuid, Arc<Mutex<SessionData>>>>>                    │
//! │        │                           │                                    │
//! │        │ read lock: find session   │ per-session lock held for the      │
//! │        │ write lock: create one    │ whole request                      │
//! │        ▼                           ▼                                    │
//! │  Two browsers never block each other; two requests from the SAME       │
//! │  browser run one after the other.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle
//! ```text
//! Cookie: vend_session=<uuid>
//!      │
//!      ▼
//! session_layer ── unknown / missing token? ──► fresh id (not stored yet)
//!      │
//!      ▼
//! read-only handler:  store.existing(id) ──► None for fresh ids
//! writing handler:    store.lock(id)     ──► creates the session
//!      │
//!      ▼
//! session_layer ── created during this request? ──► Set-Cookie
//! ```
//!
//! Creating a session sweeps out every unlocked session idle for longer
//! than the store's timeout.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::debug;
use uuid::Uuid;
use vend_core::SessionState;

use crate::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "vend_session";

/// Sessions untouched for this long are dropped.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

// =============================================================================
// Session Data
// =============================================================================

/// Severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

impl FlashLevel {
    /// CSS class used by the admin page.
    pub fn css_class(self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Error => "error",
        }
    }
}

/// One-shot status message shown on the next admin page render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

/// Everything kept for one browser.
#[derive(Debug, Clone)]
pub struct SessionData {
    /// Customer ledger.
    pub ledger: SessionState,

    /// Pending flash messages, oldest first.
    flashes: Vec<Flash>,

    /// When a request last locked this session.
    last_seen: Instant,
}

impl Default for SessionData {
    fn default() -> Self {
        SessionData {
            ledger: SessionState::default(),
            flashes: Vec::new(),
            last_seen: Instant::now(),
        }
    }
}

impl SessionData {
    pub fn flash_success(&mut self, message: impl Into<String>) {
        self.flashes.push(Flash {
            level: FlashLevel::Success,
            message: message.into(),
        });
    }

    pub fn flash_error(&mut self, message: impl Into<String>) {
        self.flashes.push(Flash {
            level: FlashLevel::Error,
            message: message.into(),
        });
    }

    /// Removes and returns all pending flash messages.
    pub fn take_flashes(&mut self) -> Vec<Flash> {
        std::mem::take(&mut self.flashes)
    }
}

// =============================================================================
// Session Store
// =============================================================================

/// Session id resolved by [`session_layer`], read by handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

type SessionSlot = Arc<Mutex<SessionData>>;

/// In-memory session store. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionSlot>>>,
    idle_timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        SessionStore::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        SessionStore::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        SessionStore {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
        }
    }

    /// Maps a cookie token onto a session id.
    ///
    /// ## Returns
    /// `(id, known)`. For a missing or unknown token `id` is fresh and
    /// nothing is stored until a handler calls [`SessionStore::lock`].
    pub async fn resolve(&self, token: Option<Uuid>) -> (SessionId, bool) {
        if let Some(id) = token {
            if self.contains(SessionId(id)).await {
                return (SessionId(id), true);
            }
            debug!(%id, "Unknown session token");
        }
        (SessionId(Uuid::new_v4()), false)
    }

    /// Locks one session for the rest of a request, creating it if needed.
    pub async fn lock(&self, id: SessionId) -> OwnedMutexGuard<SessionData> {
        let existing = self.sessions.read().await.get(&id.0).cloned();
        let slot = match existing {
            Some(slot) => slot,
            None => self.create(id).await,
        };
        let mut guard = slot.lock_owned().await;
        guard.last_seen = Instant::now();
        guard
    }

    /// Locks a session only if it already exists.
    pub async fn existing(&self, id: SessionId) -> Option<OwnedMutexGuard<SessionData>> {
        let slot = self.sessions.read().await.get(&id.0).cloned()?;
        let mut guard = slot.lock_owned().await;
        guard.last_seen = Instant::now();
        Some(guard)
    }

    pub async fn contains(&self, id: SessionId) -> bool {
        self.sessions.read().await.contains_key(&id.0)
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn create(&self, id: SessionId) -> SessionSlot {
        let mut sessions = self.sessions.write().await;

        // A locked session is in use, whatever its timestamp says.
        let before = sessions.len();
        let timeout = self.idle_timeout;
        sessions.retain(|_, slot| match slot.try_lock() {
            Ok(data) => data.last_seen.elapsed() < timeout,
            Err(_) => true,
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, "Evicted idle sessions");
        }

        debug!(id = %id.0, "Session created");
        sessions
            .entry(id.0)
            .or_insert_with(|| Arc::new(Mutex::new(SessionData::default())))
            .clone()
    }
}

// =============================================================================
// Cookie Handling
// =============================================================================

/// The `vend_session` cookie for a session.
pub fn session_cookie(id: SessionId) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id.0.to_string()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

/// Middleware: attaches a [`SessionId`] to every request and sets the
/// cookie when the handler created a new session.
pub async fn session_layer(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let token = jar
        .get(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok());
    let (id, known) = state.sessions.resolve(token).await;
    request.extensions_mut().insert(id);

    let response = next.run(request).await;

    if !known && state.sessions.contains(id).await {
        return (jar.add(session_cookie(id)), response).into_response();
    }
    response
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use vend_core::Denomination;

    #[test]
    fn test_session_cookie_attributes() {
        let id = SessionId(Uuid::nil());
        assert_eq!(
            session_cookie(id).to_string(),
            "vend_session=00000000-0000-0000-0000-000000000000; HttpOnly; SameSite=Lax; Path=/"
        );
    }

    #[test]
    fn test_flashes_are_drained() {
        let mut data = SessionData::default();
        data.flash_success("Product updated successfully!");
        data.flash_error("Product not found!");

        let flashes = data.take_flashes();
        assert_eq!(flashes.len(), 2);
        assert_eq!(flashes[0].level, FlashLevel::Success);
        assert_eq!(flashes[1].level, FlashLevel::Error);
        assert!(data.take_flashes().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_does_not_store() {
        let store = SessionStore::new();

        let (id, known) = store.resolve(None).await;
        assert!(!known);
        assert!(store.is_empty().await);
        assert!(store.existing(id).await.is_none());

        drop(store.lock(id).await);
        let (again, known) = store.resolve(Some(id.0)).await;
        assert_eq!(again, id);
        assert!(known);
    }

    #[tokio::test]
    async fn test_lock_keeps_ledger() {
        let store = SessionStore::new();
        let (id, _) = store.resolve(None).await;

        {
            let mut data = store.lock(id).await;
            data.ledger = data.ledger.insert(Denomination::Rs20);
        }

        let data = store.existing(id).await.unwrap();
        assert_eq!(data.ledger.inserted_money.rupees(), 20);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_token_gets_fresh_id() {
        let store = SessionStore::new();

        let stale = Uuid::new_v4();
        let (id, known) = store.resolve(Some(stale)).await;

        assert!(!known);
        assert_ne!(id.0, stale);
    }

    #[tokio::test]
    async fn test_idle_sessions_are_evicted() {
        let store = SessionStore::with_idle_timeout(Duration::ZERO);

        let first = SessionId(Uuid::new_v4());
        drop(store.lock(first).await);

        let second = SessionId(Uuid::new_v4());
        drop(store.lock(second).await);

        assert_eq!(store.len().await, 1);
        assert!(!store.contains(first).await);
        assert!(store.contains(second).await);
    }

    #[tokio::test]
    async fn test_locked_session_survives_sweep() {
        let store = SessionStore::with_idle_timeout(Duration::ZERO);

        let busy = SessionId(Uuid::new_v4());
        let guard = store.lock(busy).await;

        drop(store.lock(SessionId(Uuid::new_v4())).await);

        assert!(store.contains(busy).await);
        assert_eq!(store.len().await, 2);
        drop(guard);
    }
}
