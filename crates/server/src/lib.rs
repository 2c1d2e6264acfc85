//! HTTP surface for dropslot.
//!
//! This crate provides the service's control and transfer planes:
//! - Slot negotiation (request an upload ticket, get transfer URLs)
//! - One-shot PUT upload redeeming a pending slot
//! - Unauthenticated GET fetch with conditional request support
//! - Capability discovery and health endpoints

pub mod error;
pub mod handlers;
pub mod negotiate;
pub mod routes;
pub mod slots;
pub mod state;

pub use error::ApiError;
pub use negotiate::{SlotGrant, SlotNegotiator};
pub use routes::create_router;
pub use slots::{spawn_cleanup_task, SlotTable};
pub use state::AppState;
