//! HTTP request handlers.

pub mod capabilities;
pub mod health;
pub mod slots;
pub mod transfer;

pub use capabilities::*;
pub use health::*;
pub use slots::*;
pub use transfer::*;
