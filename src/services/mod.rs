//! Front-end plumbing for the main loop.
//!
//! - `queue` (std): hands requests from server threads to the polling loop
//!   and carries responses back
//! - `web` feature: axum server that feeds the queue (desktop simulator)
//!
//! The esp-idf-svc server in [`crate::hal::esp32`] feeds the same queue, so
//! both front-ends share one request path into
//! [`Portal`](crate::portal::Portal).

pub mod queue;

#[cfg(feature = "web")]
pub mod web;

pub use queue::*;

#[cfg(feature = "web")]
pub use web::*;
