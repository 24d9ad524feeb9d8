//! Session cookie helpers.
//!
//! The cookie stores only an opaque session token; the authoritative record
//! lives in the server-side [`crate::domain::SessionStore`]. This wrapper
//! keeps handlers free of framework-specific session calls.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::DomainError;

pub(crate) const SESSION_TOKEN_KEY: &str = "session_token";

/// Newtype wrapper exposing token-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store the opaque session token in the cookie.
    pub fn persist_token(&self, token: &str) -> Result<(), DomainError> {
        self.0
            .insert(SESSION_TOKEN_KEY, token)
            .map_err(|error| DomainError::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the session token from the cookie, if present.
    pub fn token(&self) -> Result<Option<String>, DomainError> {
        self.0
            .get::<String>(SESSION_TOKEN_KEY)
            .map_err(|error| DomainError::internal(format!("failed to read session: {error}")))
    }

    /// Remove the cookie state entirely.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
