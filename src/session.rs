//! Session collaborator.
//!
//! The language interceptor only needs a per-request string map it can read
//! and write. `SessionStore` is that narrow interface; `MemorySessionStore`
//! backs the demo server and tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::SameSite;
use crate::cookie::{get_cookie, SetCookie};

/// Backing storage for session data, keyed by session id.
pub trait SessionStore: Send + Sync {
    fn load(&self, id: &str) -> Option<HashMap<String, String>>;
    fn save(&self, id: &str, values: HashMap<String, String>);
}

/// Idle sessions older than this are dropped: two weeks.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(14 * 24 * 60 * 60);

/// Upper bound on stored sessions before the least recently used is evicted.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

#[derive(Debug)]
struct StoredSession {
    values: HashMap<String, String>,
    last_seen: Instant,
    /// Monotonic use counter, for least-recently-used eviction
    touched: u64,
}

#[derive(Debug, Default)]
struct SessionTable {
    entries: HashMap<String, StoredSession>,
    clock: u64,
}

impl SessionTable {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

/// In-process session storage.
///
/// Sessions idle for longer than the TTL are purged on `save` and ignored on
/// `load`. When the table is full, the least recently used session is evicted
/// to make room. A `max_entries` of 0 disables the cap.
#[derive(Debug)]
pub struct MemorySessionStore {
    table: RwLock<SessionTable>,
    ttl: Duration,
    max_entries: usize,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::with_limits(DEFAULT_SESSION_TTL, DEFAULT_MAX_SESSIONS)
    }
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(ttl: Duration, max_entries: usize) -> Self {
        Self {
            table: RwLock::new(SessionTable::default()),
            ttl,
            max_entries,
        }
    }

    pub fn len(&self) -> usize {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_expired(&self, entry: &StoredSession, now: Instant) -> bool {
        now.duration_since(entry.last_seen) >= self.ttl
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, id: &str) -> Option<HashMap<String, String>> {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        let expired = self.is_expired(table.entries.get(id)?, now);
        if expired {
            table.entries.remove(id);
            debug!("Dropped expired session {}", id);
            return None;
        }

        let touched = table.tick();
        let entry = table.entries.get_mut(id)?;
        entry.last_seen = now;
        entry.touched = touched;
        Some(entry.values.clone())
    }

    fn save(&self, id: &str, values: HashMap<String, String>) {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        let before = table.entries.len();
        table
            .entries
            .retain(|_, entry| now.duration_since(entry.last_seen) < self.ttl);
        let purged = before - table.entries.len();
        if purged > 0 {
            debug!("Purged {} expired sessions", purged);
        }

        if self.max_entries > 0
            && !table.entries.contains_key(id)
            && table.entries.len() >= self.max_entries
        {
            let oldest = table
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.touched)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                table.entries.remove(&oldest);
                debug!("Evicted least recently used session {}", oldest);
            }
        }

        let touched = table.tick();
        table.entries.insert(
            id.to_string(),
            StoredSession {
                values,
                last_seen: now,
                touched,
            },
        );
    }
}

#[derive(Debug, Default)]
struct SessionData {
    values: HashMap<String, String>,
    modified: bool,
}

/// Handle to the current request's session, stored in request extensions.
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<Mutex<SessionData>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: HashMap<String, String>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionData {
                values,
                modified: false,
            })),
        }
    }

    fn data(&self) -> std::sync::MutexGuard<'_, SessionData> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.data().values.get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data().values.contains_key(key)
    }

    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        let mut data = self.data();
        data.values.insert(key.into(), value.into());
        data.modified = true;
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        let mut data = self.data();
        let removed = data.values.remove(key);
        if removed.is_some() {
            data.modified = true;
        }
        removed
    }

    pub fn is_modified(&self) -> bool {
        self.data().modified
    }

    pub fn values(&self) -> HashMap<String, String> {
        self.data().values.clone()
    }
}

/// State for [`session_middleware`].
#[derive(Clone)]
pub struct SessionLayerState {
    pub store: Arc<dyn SessionStore>,
    pub cookie_name: String,
}

impl SessionLayerState {
    pub fn new(store: Arc<dyn SessionStore>, cookie_name: impl Into<String>) -> Self {
        Self {
            store,
            cookie_name: cookie_name.into(),
        }
    }
}

/// Attach a [`Session`] to each request and save it afterwards if modified.
///
/// A session id is issued only once something has been written.
pub async fn session_middleware(
    State(state): State<SessionLayerState>,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = get_cookie(request.headers(), &state.cookie_name)
        .filter(|id| !id.is_empty())
        .and_then(|id| state.store.load(id).map(|values| (id.to_string(), values)));

    let (session_id, session) = match existing {
        Some((id, values)) => (Some(id), Session::from_values(values)),
        None => (None, Session::new()),
    };
    request.extensions_mut().insert(session.clone());

    let mut response = next.run(request).await;

    if !session.is_modified() {
        return response;
    }

    match session_id {
        Some(id) => state.store.save(&id, session.values()),
        None => {
            let id = Uuid::new_v4().to_string();
            state.store.save(&id, session.values());
            debug!("Issued new session {}", id);

            let cookie = SetCookie {
                name: &state.cookie_name,
                value: &id,
                max_age: None,
                path: Some("/"),
                domain: None,
                secure: false,
                http_only: true,
                same_site: Some(SameSite::Lax),
            };
            match HeaderValue::from_str(&cookie.to_string()) {
                Ok(value) => {
                    response.headers_mut().append(header::SET_COOKIE, value);
                }
                Err(e) => warn!("Could not encode session cookie: {}", e),
            }
        }
    }

    response
}
