//! core
//!
//! Core domain types, schemas, and operations for module management.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Identifier, MetadataUrl, VersionReference, etc.
//! - [`error`] - The engine-wide error taxonomy
//! - [`version`] - Version segment disambiguation
//! - [`metadata`] - Module manifest schema and retrieval
//! - [`archive`] - Selective archive extraction
//! - [`vault`] - Persisted record of installed modules
//! - [`ops`] - Cross-process locking
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Layout of the modules root
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing
//! - Failures propagate to the caller without retry

pub mod archive;
pub mod config;
pub mod error;
pub mod metadata;
pub mod ops;
pub mod paths;
pub mod types;
pub mod vault;
pub mod version;
