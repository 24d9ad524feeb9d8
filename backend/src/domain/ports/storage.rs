//! Storage port: the seam between the domain and its persistence backends.
//!
//! Three narrow traits cover the aggregate roots; [`Storage`] bundles them so
//! services hold a single `Arc<dyn Storage>`. Every method is async and
//! returns [`StorageError`], which the services fold into domain errors.

use async_trait::async_trait;

use crate::domain::content::{ContentDraft, ContentId, ContentKind, ContentRecord};
use crate::domain::error::DomainError;
use crate::domain::member::{Member, MemberDraft, MemberFilter, MemberId, MemberUpdate};
use crate::domain::user::{Email, NewUser, User, UserId};

/// Failure modes shared by every storage adapter.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backend is unreachable or refused the connection.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// The backend answered but the operation failed.
    #[error("storage query failed: {0}")]
    Query(String),
    /// A user with the given email already exists.
    #[error("email {0} is already registered")]
    DuplicateEmail(String),
    /// The addressed record does not exist.
    #[error("{0} not found")]
    NotFound(String),
}

impl StorageError {
    /// Backend unreachable.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    /// Backend reached but the operation failed.
    pub fn query(reason: impl Into<String>) -> Self {
        Self::Query(reason.into())
    }

    /// Unique-email violation.
    pub fn duplicate_email(email: impl Into<String>) -> Self {
        Self::DuplicateEmail(email.into())
    }

    /// Addressed record missing.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

impl From<StorageError> for DomainError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable(reason) => {
                DomainError::service_unavailable(format!("storage unavailable: {reason}"))
            }
            StorageError::Query(reason) => {
                DomainError::internal(format!("storage query failed: {reason}"))
            }
            StorageError::DuplicateEmail(_) => {
                DomainError::conflict("an account with this email already exists")
            }
            StorageError::NotFound(what) => DomainError::not_found(format!("{what} not found")),
        }
    }
}

/// Persistence operations on credential identities.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; fails with [`StorageError::DuplicateEmail`] when the
    /// email is taken.
    async fn create_user(&self, draft: NewUser) -> Result<User, StorageError>;

    /// Fetch a user by id.
    async fn find_user(&self, id: UserId) -> Result<Option<User>, StorageError>;

    /// Fetch a user by normalised email.
    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, StorageError>;
}

/// Persistence operations on member profiles.
#[async_trait]
pub trait MemberStore: Send + Sync {
    /// Insert a pending member profile for a user.
    async fn create_member(&self, draft: MemberDraft) -> Result<Member, StorageError>;

    /// Fetch a member by id.
    async fn find_member(&self, id: MemberId) -> Result<Option<Member>, StorageError>;

    /// Fetch the member profile belonging to a user.
    async fn find_member_by_user(&self, user_id: UserId)
        -> Result<Option<Member>, StorageError>;

    /// List members matching the filter, newest first.
    async fn list_members(&self, filter: MemberFilter) -> Result<Vec<Member>, StorageError>;

    /// Apply a partial update; fails with [`StorageError::NotFound`] when the
    /// member does not exist.
    async fn update_member(
        &self,
        id: MemberId,
        update: MemberUpdate,
    ) -> Result<Member, StorageError>;

    /// Move the secretary role from one member to another.
    ///
    /// Relational adapters apply both role changes in one transaction; the
    /// managed adapter documents its weaker guarantee.
    async fn transfer_secretary(
        &self,
        from: MemberId,
        to: MemberId,
    ) -> Result<(), StorageError>;
}

/// Persistence operations on satellite content records.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Insert a content record.
    async fn create_content(&self, draft: ContentDraft) -> Result<ContentRecord, StorageError>;

    /// Fetch a content record by id.
    async fn find_content(&self, id: ContentId) -> Result<Option<ContentRecord>, StorageError>;

    /// List records of one kind, newest first.
    async fn list_content(&self, kind: ContentKind) -> Result<Vec<ContentRecord>, StorageError>;

    /// Delete a content record; fails with [`StorageError::NotFound`] when it
    /// does not exist.
    async fn delete_content(&self, id: ContentId) -> Result<(), StorageError>;
}

/// The full storage surface an adapter must provide.
pub trait Storage: UserStore + MemberStore + ContentStore {}

impl<T> Storage for T where T: UserStore + MemberStore + ContentStore {}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::error::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(StorageError::unavailable("refused"), ErrorCode::ServiceUnavailable)]
    #[case(StorageError::query("syntax"), ErrorCode::InternalError)]
    #[case(StorageError::duplicate_email("a@b.test"), ErrorCode::Conflict)]
    #[case(StorageError::not_found("member"), ErrorCode::NotFound)]
    fn storage_errors_map_to_domain_codes(
        #[case] err: StorageError,
        #[case] expected: ErrorCode,
    ) {
        let domain: DomainError = err.into();
        assert_eq!(domain.code(), expected);
    }

    #[rstest]
    fn duplicate_email_mapping_does_not_echo_the_address() {
        let domain: DomainError = StorageError::duplicate_email("ada@example.org").into();
        assert!(
            !domain.message().contains("ada@example.org"),
            "conflict responses must not leak the submitted email"
        );
    }
}
