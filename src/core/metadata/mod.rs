//! core::metadata
//!
//! Module manifest schema and retrieval.
//!
//! # Modules
//!
//! - [`schema`] - The `metadata.json` manifest type and parser
//! - [`store`] - Fetching manifests from the forge or from disk
//!
//! # Example
//!
//! ```
//! use bespoke::core::metadata::{parse_metadata, Metadata};
//!
//! let meta: Metadata =
//!     parse_metadata(br#"{"name":"n","version":"1","authors":["a"]}"#).unwrap();
//! assert_eq!(meta.identifier().unwrap().as_str(), "a/n");
//! ```

pub mod schema;
pub mod store;

// Re-export commonly used types
pub use schema::{parse_metadata, Entries, Metadata, MetadataError};
pub use store::MetadataStore;
