//! core::ops
//!
//! Operation locking.
//!
//! # Modules
//!
//! - [`lock`] - Exclusive modules-root lock
//!
//! # Architecture
//!
//! Every mutating lifecycle operation (install, update, remove, enable,
//! disable) holds the exclusive lock for its whole duration. Read-only
//! operations (list, metadata inspection) do not take it.

pub mod lock;
