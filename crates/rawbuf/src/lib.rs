//! Rawbuf: manually-managed raw-memory containers.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the rawbuf sub-crates. For most users, adding `rawbuf` as a single
//! dependency is sufficient.
//!
//! The containers hold `Pod` elements in allocator memory with an explicit
//! allocate / resize / deallocate lifecycle: no spare capacity, no implicit
//! growth, no allocation before `alloc`. Checked accessors return errors
//! for state and bounds violations; an `unsafe` unchecked tier skips the
//! checks where the caller can prove them.
//!
//! # Quick start
//!
//! ```rust
//! use rawbuf::prelude::*;
//!
//! // A 1D buffer: allocate, write, grow, release.
//! let mut buf = RawArray::<u32>::new();
//! buf.alloc(4, InitMode::Zeroed)?;
//! buf.set(3, 42)?;
//! buf.resize(8, InitMode::Zeroed)?;
//! assert_eq!(buf.get(3)?, 42);
//! assert_eq!(buf.get(7)?, 0);
//! buf.dealloc();
//!
//! // A 2D grid: cells keep their coordinates across a resize.
//! let mut grid = FlatGrid::<f32>::new();
//! grid.alloc(3, 2, InitMode::Zeroed)?;
//! grid.set(2, 1, 1.5)?;
//! grid.resize(5, 4, InitMode::Zeroed)?;
//! assert_eq!(grid.get(2, 1)?, 1.5);
//! # Ok::<(), rawbuf::types::MemError>(())
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for items not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `rawbuf-core` | [`types::InitMode`], [`types::MemError`], the allocation kernel |
//! | [`array`] | `rawbuf-array` | [`array::RawArray`], [`array::RawSpan`] |
//! | [`grid`] | `rawbuf-grid` | [`grid::FlatGrid`], [`grid::JaggedGrid`] |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Initialization policy, error taxonomy, and the allocation kernel
/// (`rawbuf-core`).
///
/// Most users only need [`types::InitMode`] and [`types::MemError`] from
/// this module — both are also available in the [`prelude`].
pub use rawbuf_core as types;

/// One-dimensional raw buffer and snapshot span (`rawbuf-array`).
///
/// [`array::RawArray`] is the resizable buffer; [`array::RawSpan`] is the
/// `Copy`, non-owning snapshot view over it.
pub use rawbuf_array as array;

/// Two-dimensional raw matrix containers (`rawbuf-grid`).
///
/// [`grid::FlatGrid`] keeps all cells in one row-major buffer;
/// [`grid::JaggedGrid`] keeps one buffer per row behind a row table.
pub use rawbuf_grid as grid;

/// Common imports for typical rawbuf usage.
///
/// ```rust
/// use rawbuf::prelude::*;
/// ```
///
/// This imports the containers, the initialization policy, and the shared
/// error type.
pub mod prelude {
    // Policy and errors
    pub use rawbuf_core::{InitMode, MemError};

    // Containers
    pub use rawbuf_array::{RawArray, RawSpan};
    pub use rawbuf_grid::{FlatGrid, JaggedGrid};
}
