use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use anyhow::Context;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "ink_session";

struct SessionEntry {
    editor_id: String,
    last_seen: Instant,
}

/// Owns every session mutation. Handlers never touch session internals;
/// they go through `login`/`logout`/`authenticated`.
pub struct SessionGate {
    sessions: RwLock<HashMap<String, SessionEntry>>,
    ttl: Duration,
    /// Editor ids permitted to log in, loaded once at startup. `None` means
    /// every verified account is permitted.
    allowlist: Option<HashSet<String>>,
}

impl SessionGate {
    pub fn new(ttl: Duration, allowlist: Option<HashSet<String>>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
            allowlist,
        }
    }

    /// Whether an editor id passes the startup allowlist. Checked after
    /// credential verification, before a session is minted.
    pub fn permits(&self, editor_id: &str) -> bool {
        match &self.allowlist {
            Some(ids) => ids.contains(editor_id),
            None => true,
        }
    }

    /// Associate a verified editor identity with a fresh session token.
    pub async fn login(&self, editor_id: &str) -> String {
        let token = new_session_token();
        self.sessions.write().await.insert(
            token.clone(),
            SessionEntry {
                editor_id: editor_id.to_string(),
                last_seen: Instant::now(),
            },
        );
        token
    }

    /// Return the editor id behind `token` if the session is live, sliding
    /// its expiry. A single write lock covers the validity check and the
    /// slide so a concurrent logout cannot race between them.
    pub async fn authenticated(&self, token: &str) -> Option<String> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(token) {
            Some(entry) if entry.last_seen.elapsed() < self.ttl => {
                entry.last_seen = Instant::now();
                Some(entry.editor_id.clone())
            }
            Some(_) => {
                sessions.remove(token);
                None
            }
            None => None,
        }
    }

    /// Destroy the session behind `token`. Idempotent.
    pub async fn logout(&self, token: &str) {
        self.sessions.write().await.remove(token);
    }

    /// `Set-Cookie` value establishing a session. Deliberately carries no
    /// `Max-Age`: the server-side TTL slides on activity, so a fixed browser
    /// expiry would cut live sessions short. The browser keeps the cookie
    /// for the session; the gate decides whether the token is still good.
    pub fn cookie(&self, token: &str) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Strict",
            SESSION_COOKIE, token
        )
    }

    /// `Set-Cookie` value clearing the session cookie.
    pub fn clear_cookie(&self) -> String {
        format!("{}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0", SESSION_COOKIE)
    }
}

/// Pull the session token out of a request's `Cookie` header.
pub fn extract_session_cookie(headers: &axum::http::HeaderMap) -> Option<String> {
    let cookie_str = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    for part in cookie_str.split(';') {
        let part = part.trim();
        if let Some(val) = part.strip_prefix(&format!("{}=", SESSION_COOKIE)) {
            return Some(val.to_string());
        }
    }
    None
}

/// Load the editor-id allowlist from a file: one id per line, blank lines
/// and `#` comments ignored. Read once at startup; reload means restart.
pub fn load_allowlist(path: &Path) -> anyhow::Result<HashSet<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read allowlist {}", path.display()))?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect())
}

fn new_session_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
