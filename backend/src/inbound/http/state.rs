//! Shared HTTP adapter state.
//!
//! Handlers accept this via `actix_web::web::Data` so they depend only on
//! the domain services and the storage port, never a concrete backend.

use std::sync::Arc;

use crate::domain::ports::Storage;
use crate::domain::{IdentityService, MembershipService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub identity: Arc<IdentityService>,
    pub membership: Arc<MembershipService>,
    pub storage: Arc<dyn Storage>,
}

impl HttpState {
    pub fn new(
        identity: Arc<IdentityService>,
        membership: Arc<MembershipService>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self {
            identity,
            membership,
            storage,
        }
    }
}
