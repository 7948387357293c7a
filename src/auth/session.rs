use std::collections::HashMap;
use std::time::{Duration, Instant};

use axum::http::header;
use axum::http::request::Parts;
use rand::Rng;

use crate::backend::AuthSession;

/// Sessions live in memory, keyed by the random token in the browser
/// cookie. The backend tokens never leave the server.
pub struct SessionStore {
    sessions: HashMap<String, (Instant, AuthSession)>,
    max_age: Duration,
}

impl SessionStore {
    pub fn new(session_hours: u64) -> Self {
        Self {
            sessions: HashMap::new(),
            max_age: Duration::from_secs(session_hours * 3600),
        }
    }

    /// Store a backend session. Returns the cookie token.
    pub fn create(&mut self, session: AuthSession) -> String {
        self.clear_stale();
        let token = generate_token();
        self.sessions.insert(token.clone(), (Instant::now(), session));
        token
    }

    pub fn get(&self, token: &str) -> Option<AuthSession> {
        self.sessions
            .get(token)
            .filter(|(created, _)| created.elapsed() < self.max_age)
            .map(|(_, session)| session.clone())
    }

    /// Swap in refreshed backend tokens, keeping the original creation time.
    pub fn replace(&mut self, token: &str, session: AuthSession) {
        if let Some(entry) = self.sessions.get_mut(token) {
            entry.1 = session;
        }
    }

    pub fn remove(&mut self, token: &str) -> Option<AuthSession> {
        self.sessions.remove(token).map(|(_, session)| session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn clear_stale(&mut self) {
        let max_age = self.max_age;
        self.sessions
            .retain(|_, (created, _)| created.elapsed() < max_age);
    }
}

/// Generate a cryptographically random 32-byte hex token.
pub fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

// -- Cookie helpers --

pub fn session_cookie(name: &str, token: &str, max_age_hours: u64, secure: bool) -> String {
    let max_age_secs = max_age_hours * 3600;
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        name, token, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_session_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", name)
}

pub fn get_cookie_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let mut split = cookie.splitn(2, '=');
            let key = split.next()?.trim();
            let val = split.next()?.trim();
            if key == name && !val.is_empty() {
                Some(val)
            } else {
                None
            }
        })
}
