//! Ports owned by the domain.
//!
//! Outbound adapters implement these traits; services receive them as trait
//! objects so the domain never names a concrete backend.

mod storage;

pub use storage::{ContentStore, MemberStore, Storage, StorageError, UserStore};
