//! PostgreSQL-backed storage adapter using Diesel.
//!
//! Implements the full storage port over the async connection pool. Unique
//! violations on the users email index surface as duplicate-email errors;
//! the secretary handover applies both role writes in one transaction.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::content::{ContentDraft, ContentId, ContentKind, ContentRecord};
use crate::domain::member::{
    Member, MemberDraft, MemberFilter, MemberId, MemberRole, MemberStatus, MemberUpdate,
};
use crate::domain::ports::{ContentStore, MemberStore, StorageError, UserStore};
use crate::domain::user::{Email, NewUser, User, UserId};

use super::models::{
    ContentRow, MemberChangeset, MemberRow, NewContentRow, NewMemberRow, NewUserRow, UserRow,
};
use super::pool::DbPool;
use super::schema::{content_items, members, users};

/// Diesel-backed implementation of the storage port.
#[derive(Clone)]
pub struct DieselStorage {
    pool: DbPool,
}

impl DieselStorage {
    /// Create an adapter over an existing pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map Diesel errors to storage errors.
fn map_diesel_error(error: diesel::result::Error) -> StorageError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => StorageError::query("record not found"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            StorageError::unavailable("database connection closed")
        }
        DieselError::DatabaseError(_, _) => StorageError::query("database error"),
        _ => StorageError::query("database error"),
    }
}

/// Detect a unique violation on the users email index.
fn is_unique_violation(error: &diesel::result::Error) -> bool {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

#[async_trait]
impl UserStore for DieselStorage {
    async fn create_user(&self, draft: NewUser) -> Result<User, StorageError> {
        let mut conn = self.pool.get().await?;
        let row = NewUserRow {
            id: Uuid::new_v4(),
            email: draft.email.as_ref().to_owned(),
            password_hash: draft.password_hash,
        };
        let inserted: UserRow = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    StorageError::duplicate_email(draft.email.as_ref())
                } else {
                    map_diesel_error(err)
                }
            })?;
        User::try_from(inserted)
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        let mut conn = self.pool.get().await?;
        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(User::try_from).transpose()
    }

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, StorageError> {
        let mut conn = self.pool.get().await?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl MemberStore for DieselStorage {
    async fn create_member(&self, draft: MemberDraft) -> Result<Member, StorageError> {
        let mut conn = self.pool.get().await?;
        let row = NewMemberRow {
            id: Uuid::new_v4(),
            user_id: *draft.user_id.as_uuid(),
            full_name: String::from(draft.full_name),
            nickname: draft.nickname,
            stateship_year: String::from(draft.stateship_year),
            last_mowcub_position: draft.last_mowcub_position.label().to_owned(),
            current_council_office: draft.current_council_office.label().to_owned(),
            status: MemberStatus::Pending.label().to_owned(),
            role: MemberRole::Member.label().to_owned(),
            latitude: draft.latitude,
            longitude: draft.longitude,
            photo_url: draft.photo_url,
            dues_proof_url: draft.dues_proof_url,
        };
        let inserted: MemberRow = diesel::insert_into(members::table)
            .values(&row)
            .returning(MemberRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Member::try_from(inserted)
    }

    async fn find_member(&self, id: MemberId) -> Result<Option<Member>, StorageError> {
        let mut conn = self.pool.get().await?;
        let row: Option<MemberRow> = members::table
            .filter(members::id.eq(id.as_uuid()))
            .select(MemberRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Member::try_from).transpose()
    }

    async fn find_member_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<Member>, StorageError> {
        let mut conn = self.pool.get().await?;
        let row: Option<MemberRow> = members::table
            .filter(members::user_id.eq(user_id.as_uuid()))
            .select(MemberRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Member::try_from).transpose()
    }

    async fn list_members(&self, filter: MemberFilter) -> Result<Vec<Member>, StorageError> {
        let mut conn = self.pool.get().await?;
        let mut query = members::table
            .select(MemberRow::as_select())
            .order(members::created_at.desc())
            .into_boxed();
        if let Some(status) = filter.status {
            query = query.filter(members::status.eq(status.label()));
        }
        let rows: Vec<MemberRow> = query.load(&mut conn).await.map_err(map_diesel_error)?;
        rows.into_iter().map(Member::try_from).collect()
    }

    async fn update_member(
        &self,
        id: MemberId,
        update: MemberUpdate,
    ) -> Result<Member, StorageError> {
        let mut conn = self.pool.get().await?;
        let changeset = MemberChangeset::from(update);
        let row: Option<MemberRow> = diesel::update(members::table.find(id.as_uuid()))
            .set(&changeset)
            .returning(MemberRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Member::try_from)
            .transpose()?
            .ok_or_else(|| StorageError::not_found(format!("member {id}")))
    }

    async fn transfer_secretary(
        &self,
        from: MemberId,
        to: MemberId,
    ) -> Result<(), StorageError> {
        let mut conn = self.pool.get().await?;
        let from_id = *from.as_uuid();
        let to_id = *to.as_uuid();
        let now = Utc::now();
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                let demoted = diesel::update(members::table.find(from_id))
                    .set((
                        members::role.eq(MemberRole::Member.label()),
                        members::updated_at.eq(now),
                    ))
                    .execute(conn)
                    .await?;
                if demoted == 0 {
                    return Err(diesel::result::Error::NotFound);
                }
                let promoted = diesel::update(members::table.find(to_id))
                    .set((
                        members::role.eq(MemberRole::Secretary.label()),
                        members::updated_at.eq(now),
                    ))
                    .execute(conn)
                    .await?;
                if promoted == 0 {
                    return Err(diesel::result::Error::NotFound);
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| match err {
            diesel::result::Error::NotFound => {
                StorageError::not_found("member in secretary handover")
            }
            other => map_diesel_error(other),
        })
    }
}

#[async_trait]
impl ContentStore for DieselStorage {
    async fn create_content(&self, draft: ContentDraft) -> Result<ContentRecord, StorageError> {
        let mut conn = self.pool.get().await?;
        let row = NewContentRow {
            id: Uuid::new_v4(),
            kind: draft.kind.label().to_owned(),
            author: *draft.author.as_uuid(),
            payload: draft.payload,
        };
        let inserted: ContentRow = diesel::insert_into(content_items::table)
            .values(&row)
            .returning(ContentRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        ContentRecord::try_from(inserted)
    }

    async fn find_content(
        &self,
        id: ContentId,
    ) -> Result<Option<ContentRecord>, StorageError> {
        let mut conn = self.pool.get().await?;
        let row: Option<ContentRow> = content_items::table
            .filter(content_items::id.eq(id.as_uuid()))
            .select(ContentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(ContentRecord::try_from).transpose()
    }

    async fn list_content(
        &self,
        kind: ContentKind,
    ) -> Result<Vec<ContentRecord>, StorageError> {
        let mut conn = self.pool.get().await?;
        let rows: Vec<ContentRow> = content_items::table
            .filter(content_items::kind.eq(kind.label()))
            .order(content_items::created_at.desc())
            .select(ContentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(ContentRecord::try_from).collect()
    }

    async fn delete_content(&self, id: ContentId) -> Result<(), StorageError> {
        let mut conn = self.pool.get().await?;
        let deleted = diesel::delete(content_items::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if deleted == 0 {
            return Err(StorageError::not_found(format!("content {id}")));
        }
        Ok(())
    }
}
