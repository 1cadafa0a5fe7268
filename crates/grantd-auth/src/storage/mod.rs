//! Capability traits for external collaborators.
//!
//! The core never touches persistence directly. It talks to three narrow
//! interfaces:
//!
//! - [`ClientStore`] - resolves and authenticates client registrations
//! - [`UserStore`] - authenticates resource-owner credentials
//! - [`KeyedExpiringStore`] - atomic put/get/delete-with-TTL primitive
//!   (Redis-equivalent) backing codes and refresh tokens
//!
//! Backends live in separate crates (`grantd-memory` provides in-memory
//! implementations).

pub mod client;
pub mod expiring;
pub mod user;

pub use client::ClientStore;
pub use expiring::KeyedExpiringStore;
pub use user::{User, UserStore};
