//! Domain model and application services for the membership portal.
//!
//! Everything here is transport and storage agnostic: inbound adapters live
//! under [`crate::inbound`], persistence backends under [`crate::outbound`].

pub mod auth;
pub mod content;
pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod member;
pub mod membership;
pub mod ports;
pub mod ranking;
pub mod session;
pub mod user;

pub use error::{DomainError, ErrorCode};
pub use identity::{AuthenticatedIdentity, IdentityService, LoginOutcome};
pub use membership::MembershipService;
pub use session::SessionStore;
