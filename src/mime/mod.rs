//! MIME type discovery subsystem.
//!
//! # Data Flow
//! ```text
//! mime_guess database + registry.rs (supplement for linked-data types)
//!     → index.rs (extension → types, supplement first)
//!     → MimeIndex::global() shared read-only by every request
//!         → negotiation scanner (which types does `test.ttl` satisfy?)
//!         → asset server (Content-Type of the served file)
//! ```
//!
//! # Design Decisions
//! - Built once at first use, never mutated afterwards
//! - An extension may map to several types and a type to several extensions
//! - Unknown extensions resolve to no types, never an error

pub mod index;
pub mod registry;

pub use index::MimeIndex;
