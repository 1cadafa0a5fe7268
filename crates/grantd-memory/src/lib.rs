//! # grantd-memory
//!
//! In-memory implementations of the grantd-auth storage traits, for
//! development, testing, and single-process deployments:
//!
//! - [`MemoryExpiringStore`] - keyed expiring store over a concurrent map
//! - [`MemoryClientStore`] - client registry with argon2-hashed secrets
//! - [`MemoryUserStore`] - user registry with argon2-hashed passwords
//!
//! Production deployments back the same traits with a shared store
//! (Redis-equivalent); the semantics implemented here, notably the atomic
//! `take`, are the contract such a backend must honor.

mod clients;
mod expiring;
mod secret;
mod users;

pub use clients::MemoryClientStore;
pub use expiring::MemoryExpiringStore;
pub use secret::{hash_secret, verify_secret};
pub use users::MemoryUserStore;
