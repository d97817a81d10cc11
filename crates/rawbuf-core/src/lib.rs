//! Core building blocks for the rawbuf container family.
//!
//! The containers in `rawbuf-array` and `rawbuf-grid` share three things: an
//! initialization policy ([`InitMode`]), an error taxonomy ([`MemError`]),
//! and a small allocation kernel ([`raw`]) that wraps the global allocator
//! in element-typed operations. This crate holds all three and nothing else.
//!
//! # Safety
//!
//! Every `unsafe` block in this crate lives in [`raw`] and carries a
//! `// SAFETY:` comment; every unsafe function documents its contract under
//! a `# Safety` heading. The rest of the crate is lint-denied from using
//! `unsafe` at all.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod error;
pub mod mode;
pub mod raw;

// Public re-exports for the primary API surface.
pub use error::MemError;
pub use mode::InitMode;
