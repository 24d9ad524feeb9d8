//! In-memory storage adapter.
//!
//! Default backend when no database is configured: deterministic, insertion
//! ordered, and gone on restart. Also the reference implementation the
//! storage conformance suite runs against. State lives in plain `Vec`s
//! behind a mutex; scans are linear, which is fine at this backend's scale.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::content::{ContentDraft, ContentId, ContentKind, ContentRecord};
use crate::domain::member::{
    Member, MemberDraft, MemberFilter, MemberId, MemberRole, MemberStatus, MemberUpdate,
};
use crate::domain::ports::{ContentStore, MemberStore, StorageError, UserStore};
use crate::domain::user::{Email, NewUser, User, UserId};

#[derive(Debug, Default)]
struct State {
    users: Vec<User>,
    members: Vec<Member>,
    content: Vec<ContentRecord>,
}

/// Volatile storage backend holding all records in process memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: Mutex<State>,
}

impl MemoryStorage {
    fn lock(&self) -> MutexGuard<'_, State> {
        // Recover the guard if a holder panicked; the data is still coherent
        // because every write below completes in one critical section.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn apply_update(member: &mut Member, update: MemberUpdate) {
    let MemberUpdate {
        full_name,
        nickname,
        stateship_year,
        last_mowcub_position,
        current_council_office,
        status,
        role,
        latitude,
        longitude,
        photo_url,
        dues_proof_url,
        approved_at,
    } = update;
    if let Some(value) = full_name {
        member.full_name = value;
    }
    if let Some(value) = nickname {
        member.nickname = Some(value);
    }
    if let Some(value) = stateship_year {
        member.stateship_year = value;
    }
    if let Some(value) = last_mowcub_position {
        member.last_mowcub_position = value;
    }
    if let Some(value) = current_council_office {
        member.current_council_office = value;
    }
    if let Some(value) = status {
        member.status = value;
    }
    if let Some(value) = role {
        member.role = value;
    }
    if let Some(value) = latitude {
        member.latitude = Some(value);
    }
    if let Some(value) = longitude {
        member.longitude = Some(value);
    }
    if let Some(value) = photo_url {
        member.photo_url = Some(value);
    }
    if let Some(value) = dues_proof_url {
        member.dues_proof_url = Some(value);
    }
    if let Some(value) = approved_at {
        member.approved_at = Some(value);
    }
    member.updated_at = Utc::now();
}

#[async_trait]
impl UserStore for MemoryStorage {
    async fn create_user(&self, draft: NewUser) -> Result<User, StorageError> {
        let mut state = self.lock();
        if state.users.iter().any(|user| user.email == draft.email) {
            return Err(StorageError::duplicate_email(draft.email.as_ref()));
        }
        let now = Utc::now();
        let user = User {
            id: UserId::random(),
            email: draft.email,
            password_hash: draft.password_hash,
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        Ok(self.lock().users.iter().find(|user| user.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, StorageError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|user| &user.email == email)
            .cloned())
    }
}

#[async_trait]
impl MemberStore for MemoryStorage {
    async fn create_member(&self, draft: MemberDraft) -> Result<Member, StorageError> {
        let now = Utc::now();
        let member = Member {
            id: MemberId::random(),
            user_id: draft.user_id,
            full_name: draft.full_name,
            nickname: draft.nickname,
            stateship_year: draft.stateship_year,
            last_mowcub_position: draft.last_mowcub_position,
            current_council_office: draft.current_council_office,
            status: MemberStatus::Pending,
            role: MemberRole::Member,
            latitude: draft.latitude,
            longitude: draft.longitude,
            photo_url: draft.photo_url,
            dues_proof_url: draft.dues_proof_url,
            approved_at: None,
            created_at: now,
            updated_at: now,
        };
        self.lock().members.push(member.clone());
        Ok(member)
    }

    async fn find_member(&self, id: MemberId) -> Result<Option<Member>, StorageError> {
        Ok(self
            .lock()
            .members
            .iter()
            .find(|member| member.id == id)
            .cloned())
    }

    async fn find_member_by_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<Member>, StorageError> {
        Ok(self
            .lock()
            .members
            .iter()
            .find(|member| member.user_id == user_id)
            .cloned())
    }

    async fn list_members(&self, filter: MemberFilter) -> Result<Vec<Member>, StorageError> {
        let mut matched: Vec<Member> = self
            .lock()
            .members
            .iter()
            .filter(|member| filter.matches(member))
            .cloned()
            .collect();
        // Rows are appended in creation order; listings report newest first.
        matched.reverse();
        Ok(matched)
    }

    async fn update_member(
        &self,
        id: MemberId,
        update: MemberUpdate,
    ) -> Result<Member, StorageError> {
        let mut state = self.lock();
        let member = state
            .members
            .iter_mut()
            .find(|member| member.id == id)
            .ok_or_else(|| StorageError::not_found(format!("member {id}")))?;
        apply_update(member, update);
        Ok(member.clone())
    }

    async fn transfer_secretary(
        &self,
        from: MemberId,
        to: MemberId,
    ) -> Result<(), StorageError> {
        let mut state = self.lock();
        let from_index = state
            .members
            .iter()
            .position(|member| member.id == from)
            .ok_or_else(|| StorageError::not_found(format!("member {from}")))?;
        let to_index = state
            .members
            .iter()
            .position(|member| member.id == to)
            .ok_or_else(|| StorageError::not_found(format!("member {to}")))?;
        let now = Utc::now();
        state.members[from_index].role = MemberRole::Member;
        state.members[from_index].updated_at = now;
        state.members[to_index].role = MemberRole::Secretary;
        state.members[to_index].updated_at = now;
        Ok(())
    }
}

#[async_trait]
impl ContentStore for MemoryStorage {
    async fn create_content(&self, draft: ContentDraft) -> Result<ContentRecord, StorageError> {
        let now = Utc::now();
        let record = ContentRecord {
            id: ContentId::random(),
            kind: draft.kind,
            author: draft.author,
            payload: draft.payload,
            created_at: now,
            updated_at: now,
        };
        self.lock().content.push(record.clone());
        Ok(record)
    }

    async fn find_content(
        &self,
        id: ContentId,
    ) -> Result<Option<ContentRecord>, StorageError> {
        Ok(self
            .lock()
            .content
            .iter()
            .find(|record| record.id == id)
            .cloned())
    }

    async fn list_content(
        &self,
        kind: ContentKind,
    ) -> Result<Vec<ContentRecord>, StorageError> {
        let mut records: Vec<ContentRecord> = self
            .lock()
            .content
            .iter()
            .filter(|record| record.kind == kind)
            .cloned()
            .collect();
        records.reverse();
        Ok(records)
    }

    async fn delete_content(&self, id: ContentId) -> Result<(), StorageError> {
        let mut state = self.lock();
        let index = state
            .content
            .iter()
            .position(|record| record.id == id)
            .ok_or_else(|| StorageError::not_found(format!("content {id}")))?;
        state.content.remove(index);
        Ok(())
    }
}
