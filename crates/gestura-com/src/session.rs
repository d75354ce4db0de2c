use gestura_camera::CameraSelection;
use http::{HeaderMap, header};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const SESSION_COOKIE: &str = "gestura_session";

/// Sessions remembered before the least recently used one is forgotten.
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

const SESSION_ID_LEN: usize = 32;

struct Entry {
    selection: CameraSelection,
    touched: u64,
}

#[derive(Default)]
struct Sessions {
    entries: HashMap<String, Entry>,
    clock: u64,
}

/// Camera selection per client session, keyed by the session cookie.
///
/// Holds at most `capacity` sessions. Reads and writes both count as use;
/// storing a new session into a full store forgets the least recently used
/// one, which then falls back to camera 0.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<Sessions>>,
    capacity: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(Sessions::default())),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The stored selection, camera 0 for sessions that never chose one.
    pub async fn selection(&self, session: &str) -> CameraSelection {
        let mut sessions = self.sessions.lock().await;
        sessions.clock += 1;
        let now = sessions.clock;
        match sessions.entries.get_mut(session) {
            Some(entry) => {
                entry.touched = now;
                entry.selection
            }
            None => CameraSelection::default(),
        }
    }

    pub async fn set_selection(&self, session: &str, selection: CameraSelection) {
        let mut sessions = self.sessions.lock().await;
        sessions.clock += 1;
        let touched = sessions.clock;

        if !sessions.entries.contains_key(session) && sessions.entries.len() >= self.capacity {
            let oldest = sessions
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.touched)
                .map(|(id, _)| id.clone());
            if let Some(id) = oldest {
                sessions.entries.remove(&id);
                log::debug!("session store full, forgot least recently used session");
            }
        }
        sessions
            .entries
            .insert(session.to_string(), Entry { selection, touched });
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.entries.is_empty()
    }
}

pub fn new_session_id() -> String {
    std::iter::repeat_with(fastrand::alphanumeric)
        .take(SESSION_ID_LEN)
        .collect()
}

fn valid_session_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= 64 && id.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Session id carried in the request's cookies, if well formed.
pub fn session_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, id)| id.trim().to_string())
        .filter(|id| valid_session_id(id))
}

pub fn session_cookie(id: &str) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}
