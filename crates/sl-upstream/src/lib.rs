//! Clients for the system status endpoints and the fan-out that queries them.
//!
//! [`HttpStatusSource`] issues one bounded GET per endpoint. [`fan_out`]
//! runs every endpoint in its own task and waits for all of them, turning
//! each settled call into a [`Fetched`](sl_core::types::Fetched) value so a
//! failing endpoint never affects the others.

pub mod client;
pub mod error;
pub mod fanout;

pub use client::{HttpStatusSource, StatusSource};
pub use error::UpstreamError;
pub use fanout::fan_out;
