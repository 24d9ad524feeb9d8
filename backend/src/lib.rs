//! Membership portal backend.
//!
//! Hexagonal layout: the domain owns the model, services, and ports;
//! [`inbound`] adapts HTTP onto the services; [`outbound`] provides the
//! storage backends; [`server`] wires a running process together.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
