//! Membership lifecycle state machine.
//!
//! The legal transition set is deliberately small: pending members are
//! approved or rejected, active members can be banned. Everything else,
//! including re-applying a transition that already happened, is an illegal
//! transition surfaced as a conflict rather than silently accepted.
//! `rejected` and `banned` are terminal for self-service; no recovery path
//! is modelled here (see DESIGN.md).

use crate::domain::member::MemberStatus;

/// Secretary-initiated lifecycle actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MembershipAction {
    Approve,
    Reject,
    Ban,
}

impl MembershipAction {
    /// Human-readable verb for error messages.
    pub fn verb(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Ban => "ban",
        }
    }
}

/// Error raised when an action is applied to a status it does not govern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    /// The action is not legal from the member's current status.
    #[error("cannot {action} a {status} member")]
    IllegalTransition {
        status: &'static str,
        action: &'static str,
    },
}

impl LifecycleError {
    fn illegal(status: MemberStatus, action: MembershipAction) -> Self {
        Self::IllegalTransition {
            status: status.label(),
            action: action.verb(),
        }
    }
}

/// Apply a lifecycle action to a status, returning the next status.
///
/// Total over every `(status, action)` pair; the three legal transitions are
/// `pending -> active`, `pending -> rejected`, and `active -> banned`.
///
/// # Examples
/// ```
/// use statesmen_backend::domain::lifecycle::{transition, MembershipAction};
/// use statesmen_backend::domain::member::MemberStatus;
///
/// let next = transition(MemberStatus::Pending, MembershipAction::Approve).unwrap();
/// assert_eq!(next, MemberStatus::Active);
/// assert!(transition(MemberStatus::Active, MembershipAction::Approve).is_err());
/// ```
pub fn transition(
    status: MemberStatus,
    action: MembershipAction,
) -> Result<MemberStatus, LifecycleError> {
    match (status, action) {
        (MemberStatus::Pending, MembershipAction::Approve) => Ok(MemberStatus::Active),
        (MemberStatus::Pending, MembershipAction::Reject) => Ok(MemberStatus::Rejected),
        (MemberStatus::Active, MembershipAction::Ban) => Ok(MemberStatus::Banned),
        (status, action) => Err(LifecycleError::illegal(status, action)),
    }
}
