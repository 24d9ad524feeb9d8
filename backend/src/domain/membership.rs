//! Membership administration service.
//!
//! Applies the lifecycle state machine to stored members and handles the
//! secretary handover. All writes go through the storage port; the service
//! itself never assumes a particular backend.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::domain::error::DomainError;
use crate::domain::lifecycle::{LifecycleError, MembershipAction, transition};
use crate::domain::member::{Member, MemberId, MemberRole, MemberStatus, MemberUpdate};
use crate::domain::ports::{MemberStore, Storage};

impl From<LifecycleError> for DomainError {
    fn from(err: LifecycleError) -> Self {
        DomainError::conflict(err.to_string())
    }
}

/// Application service for secretary-driven membership administration.
pub struct MembershipService {
    storage: Arc<dyn Storage>,
}

impl MembershipService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Approve a pending member, recording the approval instant.
    pub async fn approve(&self, id: MemberId) -> Result<Member, DomainError> {
        let member = self.apply(id, MembershipAction::Approve).await?;
        info!(member_id = %id, "member approved");
        Ok(member)
    }

    /// Reject a pending member.
    pub async fn reject(&self, id: MemberId) -> Result<Member, DomainError> {
        let member = self.apply(id, MembershipAction::Reject).await?;
        info!(member_id = %id, "member rejected");
        Ok(member)
    }

    /// Ban an active member. Their next request fails at the guard even if a
    /// session is still live.
    pub async fn ban(&self, id: MemberId) -> Result<Member, DomainError> {
        let member = self.apply(id, MembershipAction::Ban).await?;
        info!(member_id = %id, "member banned");
        Ok(member)
    }

    /// Move the secretary role from the current holder to another member.
    ///
    /// The incoming member must exist, be active, and differ from the
    /// outgoing one. Both role writes happen inside the storage port so a
    /// relational backend can keep them in one transaction.
    pub async fn handover(&self, from: MemberId, to: MemberId) -> Result<(), DomainError> {
        if from == to {
            return Err(DomainError::invalid_request(
                "cannot hand the secretary role to its current holder",
            ));
        }
        let outgoing = self.fetch(from).await?;
        if outgoing.role != MemberRole::Secretary {
            return Err(DomainError::conflict(
                "outgoing member no longer holds the secretary role",
            ));
        }
        let incoming = self.fetch(to).await?;
        if incoming.status != MemberStatus::Active {
            return Err(DomainError::conflict(
                "the incoming secretary must be an active member",
            ));
        }
        self.storage.transfer_secretary(from, to).await?;
        info!(from = %from, to = %to, "secretary role handed over");
        Ok(())
    }

    async fn apply(
        &self,
        id: MemberId,
        action: MembershipAction,
    ) -> Result<Member, DomainError> {
        let member = self.fetch(id).await?;
        let next = transition(member.status, action)?;
        let update = MemberUpdate {
            status: Some(next),
            approved_at: (next == MemberStatus::Active).then(Utc::now),
            ..MemberUpdate::default()
        };
        Ok(self.storage.update_member(id, update).await?)
    }

    async fn fetch(&self, id: MemberId) -> Result<Member, DomainError> {
        self.storage
            .find_member(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("member {id} not found")))
    }
}
