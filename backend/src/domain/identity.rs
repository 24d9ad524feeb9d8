//! Identity and session management.
//!
//! Owns registration, login, logout, and session resolution. Session records
//! carry only the user id; member status and role are re-fetched from storage
//! on every resolution so a ban or role change takes effect on the next
//! request, not at the next login.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::auth::{
    LoginCredentials, RegistrationRequest, burn_verification, hash_password, verify_password,
};
use crate::domain::error::DomainError;
use crate::domain::member::{Member, MemberDraft};
use crate::domain::ports::{MemberStore, Storage, UserStore};
use crate::domain::session::{SessionRecord, SessionStore};
use crate::domain::user::{NewUser, PublicUser, User};

/// Message shared by both login failure modes so responses do not reveal
/// whether the email or the password was wrong.
const INVALID_CREDENTIALS: &str = "invalid email or password";

/// A resolved session: the live record plus freshly fetched identity state.
#[derive(Debug, Clone)]
pub struct AuthenticatedIdentity {
    pub session: SessionRecord,
    pub user: User,
    pub member: Member,
}

/// Outcome of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub session: SessionRecord,
    pub user: PublicUser,
    pub member: Member,
}

/// Application service for registration, login, and session resolution.
pub struct IdentityService {
    storage: Arc<dyn Storage>,
    sessions: Arc<SessionStore>,
}

impl IdentityService {
    pub fn new(storage: Arc<dyn Storage>, sessions: Arc<SessionStore>) -> Self {
        Self { storage, sessions }
    }

    /// Session registry shared with the HTTP layer.
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Create a credential user and its pending member profile.
    ///
    /// Duplicate emails surface as a conflict; the new member always starts
    /// pending with the plain member role.
    pub async fn register(
        &self,
        request: RegistrationRequest,
    ) -> Result<(PublicUser, Member), DomainError> {
        let password_hash = hash_password(request.password())?;
        let user = self
            .storage
            .create_user(NewUser {
                email: request.email.clone(),
                password_hash,
            })
            .await?;
        let member = self
            .storage
            .create_member(MemberDraft {
                user_id: user.id,
                full_name: request.full_name,
                nickname: request.nickname,
                stateship_year: request.stateship_year,
                last_mowcub_position: request.last_mowcub_position,
                current_council_office: request.current_council_office,
                latitude: request.latitude,
                longitude: request.longitude,
                photo_url: request.photo_url,
                dues_proof_url: request.dues_proof_url,
            })
            .await?;
        info!(user_id = %user.id, member_id = %member.id, "registered new member");
        Ok((PublicUser::from(&user), member))
    }

    /// Verify credentials and mint a session.
    ///
    /// Unknown emails burn a verification against a decoy hash so both
    /// failure modes cost the same and return the same error.
    pub async fn login(&self, credentials: LoginCredentials) -> Result<LoginOutcome, DomainError> {
        let Some(user) = self
            .storage
            .find_user_by_email(credentials.email())
            .await?
        else {
            burn_verification(credentials.password());
            return Err(DomainError::unauthorized(INVALID_CREDENTIALS));
        };
        if !verify_password(&user.password_hash, credentials.password()) {
            return Err(DomainError::unauthorized(INVALID_CREDENTIALS));
        }
        let member = self.member_for(&user).await?;
        let session = self.sessions.issue(user.id);
        info!(user_id = %user.id, "login succeeded");
        Ok(LoginOutcome {
            session,
            user: PublicUser::from(&user),
            member,
        })
    }

    /// Drop a session. Unknown tokens are treated as already logged out.
    pub fn logout(&self, token: &str) {
        if !self.sessions.revoke(token) {
            warn!("logout for unknown or expired session token");
        }
    }

    /// Resolve a session token into fresh identity state.
    ///
    /// A missing or expired session is unauthorized. A storage outage is
    /// reported as unavailable, never as "no session", so callers cannot
    /// mistake an outage for a logged-out user.
    pub async fn resolve_session(
        &self,
        token: &str,
    ) -> Result<AuthenticatedIdentity, DomainError> {
        let Some(session) = self.sessions.resolve(token) else {
            return Err(DomainError::unauthorized("no active session"));
        };
        let Some(user) = self.storage.find_user(session.user_id).await? else {
            // The account vanished underneath the session; drop it.
            self.sessions.revoke(token);
            return Err(DomainError::unauthorized("no active session"));
        };
        let member = self.member_for(&user).await?;
        Ok(AuthenticatedIdentity {
            session,
            user,
            member,
        })
    }

    async fn member_for(&self, user: &User) -> Result<Member, DomainError> {
        self.storage
            .find_member_by_user(user.id)
            .await?
            .ok_or_else(|| {
                DomainError::internal(format!("user {} has no member profile", user.id))
            })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::auth::RegistrationParts;
    use crate::domain::error::ErrorCode;
    use crate::domain::member::{CouncilOffice, MemberRole, MemberStatus, MowcubPosition};
    use crate::outbound::memory::MemoryStorage;
    use rstest::rstest;

    fn service() -> IdentityService {
        IdentityService::new(
            Arc::new(MemoryStorage::default()),
            Arc::new(SessionStore::default()),
        )
    }

    fn registration(email: &str) -> RegistrationRequest {
        RegistrationRequest::try_from_parts(RegistrationParts {
            email,
            password: "long-enough-password",
            full_name: "Ada Lovelace",
            nickname: None,
            stateship_year: "2019/2020",
            last_mowcub_position: MowcubPosition::Colonel,
            current_council_office: CouncilOffice::None,
            latitude: None,
            longitude: None,
            photo_url: None,
            dues_proof_url: None,
        })
        .expect("valid registration")
    }

    #[rstest]
    #[tokio::test]
    async fn registration_creates_a_pending_plain_member() {
        let service = service();
        let (user, member) = service
            .register(registration("ada@example.org"))
            .await
            .expect("registration succeeds");
        assert_eq!(user.email.as_ref(), "ada@example.org");
        assert_eq!(member.status, MemberStatus::Pending);
        assert_eq!(member.role, MemberRole::Member);
        assert_eq!(member.user_id, user.id);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_email_registration_conflicts() {
        let service = service();
        service
            .register(registration("ada@example.org"))
            .await
            .expect("first registration succeeds");
        let err = service
            .register(registration("ada@example.org"))
            .await
            .expect_err("second registration must conflict");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn login_failure_modes_share_one_error_shape() {
        let service = service();
        service
            .register(registration("ada@example.org"))
            .await
            .expect("registration succeeds");

        let unknown = service
            .login(LoginCredentials::try_from_parts("nobody@example.org", "whatever").unwrap())
            .await
            .expect_err("unknown email must fail");
        let wrong = service
            .login(LoginCredentials::try_from_parts("ada@example.org", "wrong-password").unwrap())
            .await
            .expect_err("wrong password must fail");
        assert_eq!(unknown, wrong, "failure modes must be indistinguishable");
        assert_eq!(unknown.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn login_then_resolve_round_trips_the_session() {
        let service = service();
        service
            .register(registration("ada@example.org"))
            .await
            .expect("registration succeeds");
        let outcome = service
            .login(
                LoginCredentials::try_from_parts("ada@example.org", "long-enough-password")
                    .unwrap(),
            )
            .await
            .expect("login succeeds");

        let identity = service
            .resolve_session(&outcome.session.token)
            .await
            .expect("session resolves");
        assert_eq!(identity.user.id, outcome.user.id);
        assert_eq!(identity.member.status, MemberStatus::Pending);
    }

    #[rstest]
    #[tokio::test]
    async fn logout_is_idempotent() {
        let service = service();
        service
            .register(registration("ada@example.org"))
            .await
            .expect("registration succeeds");
        let outcome = service
            .login(
                LoginCredentials::try_from_parts("ada@example.org", "long-enough-password")
                    .unwrap(),
            )
            .await
            .expect("login succeeds");

        service.logout(&outcome.session.token);
        service.logout(&outcome.session.token);
        let err = service
            .resolve_session(&outcome.session.token)
            .await
            .expect_err("revoked session must not resolve");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }
}
