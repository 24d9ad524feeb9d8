//! Server-held session registry.
//!
//! The browser cookie carries only an opaque token; everything the server
//! trusts about a session lives here. Records expire after a fixed TTL with
//! no sliding renewal, and expiry is enforced lazily on lookup plus a sweep
//! on every issue so abandoned tokens do not accumulate.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use rand::rngs::OsRng;

use crate::domain::user::UserId;

/// Default session lifetime in seconds (24 hours).
pub const DEFAULT_SESSION_TTL_SECS: i64 = 60 * 60 * 24;

/// Number of random bytes backing a session token.
const TOKEN_BYTES: usize = 32;

/// One authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub token: String,
    pub user_id: UserId,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Whether the record has outlived its TTL at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// In-process session registry keyed by opaque token.
#[derive(Debug)]
pub struct SessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<String, SessionRecord>>,
}

impl SessionStore {
    /// Create a store with the given session lifetime.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Create a store with a TTL given in whole seconds.
    pub fn with_ttl_secs(secs: i64) -> Self {
        Self::new(Duration::seconds(secs))
    }

    /// Mint a fresh token and record a session for `user_id`.
    ///
    /// Expired records are swept out while the map is locked, so the store's
    /// size is bounded by the number of live sessions.
    pub fn issue(&self, user_id: UserId) -> SessionRecord {
        let now = Utc::now();
        let record = SessionRecord {
            token: mint_token(),
            user_id,
            issued_at: now,
            expires_at: now + self.ttl,
        };
        let mut sessions = self.lock();
        sessions.retain(|_, existing| !existing.is_expired_at(now));
        sessions.insert(record.token.clone(), record.clone());
        record
    }

    /// Look up a live session; expired records are removed and treated as
    /// absent.
    pub fn resolve(&self, token: &str) -> Option<SessionRecord> {
        let now = Utc::now();
        let mut sessions = self.lock();
        match sessions.get(token) {
            Some(record) if record.is_expired_at(now) => {
                sessions.remove(token);
                None
            }
            Some(record) => Some(record.clone()),
            None => None,
        }
    }

    /// Drop a session. Returns `false` if the token was unknown, which
    /// callers treat as an already-complete logout.
    pub fn revoke(&self, token: &str) -> bool {
        self.lock().remove(token).is_some()
    }

    /// Number of recorded sessions, expired or not.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the store holds no sessions at all.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, SessionRecord>> {
        // Session state stays usable even if a holder panicked mid-update.
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl_secs(DEFAULT_SESSION_TTL_SECS)
    }
}

/// Generate an unguessable token: 32 bytes from the OS RNG, hex encoded.
fn mint_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
