//! Manually-managed raw array and snapshot span.
//!
//! [`RawArray`] is a resizable buffer of `Pod` elements with an explicit
//! allocate / resize / deallocate lifecycle: nothing is allocated until
//! [`RawArray::alloc`] is called, and the buffer can be released early with
//! [`RawArray::dealloc`] or left to the drop glue. [`RawSpan`] is a `Copy`
//! snapshot view over an array's buffer for the places a borrow cannot go.
//!
//! # Safety
//!
//! The checked accessors (`get`, `set`, `as_slice`, ...) verify allocation
//! state and bounds and return [`MemError`](rawbuf_core::MemError) on
//! violation. The `*_unchecked` accessors skip those checks entirely, and
//! [`RawSpan`]'s dereferencing accessors are `unsafe` because a snapshot
//! cannot prove its source buffer is still live; each documents its
//! contract under a `# Safety` heading.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod array;
pub mod span;

// Public re-exports for the primary API surface.
pub use array::RawArray;
pub use span::RawSpan;
