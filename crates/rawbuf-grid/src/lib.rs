//! Flat and jagged raw matrix containers.
//!
//! Two 2D containers over the same lifecycle discipline as `rawbuf-array`:
//!
//! - [`FlatGrid`] keeps every cell in one row-major buffer. Rows are
//!   contiguous, and a resize repacks row data in place so that every
//!   surviving cell keeps its `(x, y)` coordinate.
//! - [`JaggedGrid`] keeps each row in its own buffer behind a row table.
//!   A resize adjusts the height first (adding or dropping whole rows) and
//!   then reallocates each row to the new width.
//!
//! Both use the same addressing convention: `x` is the column, `y` is the
//! row, and cell `(x, y)` of a flat grid lives at linear index
//! `y * width + x`.
//!
//! # Safety
//!
//! Checked accessors verify allocation state and bounds; the
//! `*_unchecked` tier skips both and is `unsafe`, documenting its
//! contract under a `# Safety` heading.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod flat;
pub mod jagged;

// Public re-exports for the primary API surface.
pub use flat::FlatGrid;
pub use jagged::JaggedGrid;
