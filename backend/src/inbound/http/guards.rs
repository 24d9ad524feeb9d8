//! Authorization guards as request extractors.
//!
//! Handlers declare their access level in the signature; a failed guard
//! rejects the request before the handler body runs. Each guard re-fetches
//! the member through the storage port, so a ban or role change applies on
//! the very next request even for sessions minted earlier.

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::member::{MemberRole, MemberStatus};
use crate::domain::{AuthenticatedIdentity, DomainError};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Any caller with a live session, whatever their member status.
pub struct Authenticated(pub AuthenticatedIdentity);

/// A caller whose membership status is active.
pub struct ActiveMember(pub AuthenticatedIdentity);

/// An active member holding the secretary role.
pub struct Secretary(pub AuthenticatedIdentity);

async fn resolve_identity(
    state: Option<web::Data<HttpState>>,
    session: Result<SessionContext, actix_web::Error>,
) -> Result<AuthenticatedIdentity, DomainError> {
    let state =
        state.ok_or_else(|| DomainError::internal("HTTP state missing from app data"))?;
    let session = session.map_err(DomainError::from)?;
    let token = session
        .token()?
        .ok_or_else(|| DomainError::unauthorized("login required"))?;
    state.identity.resolve_session(&token).await
}

impl FromRequest for Authenticated {
    type Error = DomainError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let session = SessionContext::from_request(req, payload);
        Box::pin(async move {
            let identity = resolve_identity(state, session.await).await?;
            Ok(Self(identity))
        })
    }
}

impl FromRequest for ActiveMember {
    type Error = DomainError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let session = SessionContext::from_request(req, payload);
        Box::pin(async move {
            let identity = resolve_identity(state, session.await).await?;
            if identity.member.status != MemberStatus::Active {
                return Err(DomainError::forbidden("membership is not active"));
            }
            Ok(Self(identity))
        })
    }
}

impl FromRequest for Secretary {
    type Error = DomainError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let session = SessionContext::from_request(req, payload);
        Box::pin(async move {
            let identity = resolve_identity(state, session.await).await?;
            if identity.member.status != MemberStatus::Active {
                return Err(DomainError::forbidden("membership is not active"));
            }
            if identity.member.role != MemberRole::Secretary {
                return Err(DomainError::forbidden("secretary role required"));
            }
            Ok(Self(identity))
        })
    }
}
