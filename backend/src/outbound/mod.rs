//! Outbound adapters implementing the domain's storage port.

pub mod managed;
pub mod memory;
pub mod persistence;
