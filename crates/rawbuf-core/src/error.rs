//! The error taxonomy shared by every rawbuf container.

use std::error::Error;
use std::fmt;

/// Errors that can occur during container operations.
///
/// Every fallible operation across the container family returns this one
/// enum, so callers match on a single type regardless of which container
/// produced the error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemError {
    /// An allocating call on a container that already owns a buffer.
    AlreadyAllocated,
    /// An operation that needs a live buffer was called before allocation
    /// (or after deallocation).
    NotAllocated,
    /// A dimension argument was zero where a positive extent is required.
    ZeroDim {
        /// Which dimension was zero: `"length"`, `"width"`, or `"height"`.
        dim: &'static str,
    },
    /// The element type has size zero. The containers manage allocator
    /// memory, and zero-sized elements have none to manage.
    ZeroSizedElement,
    /// A linear index was outside the container's extent.
    OutOfBounds {
        /// The rejected index.
        index: usize,
        /// The extent it was checked against.
        len: usize,
    },
    /// An `(x, y)` coordinate was outside the container's extent.
    CoordOutOfBounds {
        /// The rejected column.
        x: usize,
        /// The rejected row.
        y: usize,
        /// Columns in the container.
        width: usize,
        /// Rows in the container.
        height: usize,
    },
    /// A row of imported data did not match the width established by the
    /// first row.
    RaggedInput {
        /// Index of the offending row.
        row: usize,
        /// Width established by the first row.
        expected: usize,
        /// Width actually found.
        got: usize,
    },
    /// The requested element count times the element size overflows the
    /// maximum allocation size.
    CapacityOverflow,
    /// The global allocator refused the request.
    AllocFailed {
        /// Size of the refused request in bytes.
        bytes: usize,
    },
}

impl fmt::Display for MemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyAllocated => {
                write!(f, "container already owns an allocated buffer")
            }
            Self::NotAllocated => {
                write!(f, "container has no allocated buffer")
            }
            Self::ZeroDim { dim } => {
                write!(f, "{dim} must be non-zero")
            }
            Self::ZeroSizedElement => {
                write!(f, "zero-sized element types are not supported")
            }
            Self::OutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for length {len}")
            }
            Self::CoordOutOfBounds {
                x,
                y,
                width,
                height,
            } => {
                write!(
                    f,
                    "coordinate ({x}, {y}) out of bounds for {width}x{height}"
                )
            }
            Self::RaggedInput { row, expected, got } => {
                write!(
                    f,
                    "row {row} has length {got}, expected {expected} to match the first row"
                )
            }
            Self::CapacityOverflow => {
                write!(f, "requested capacity overflows the maximum allocation size")
            }
            Self::AllocFailed { bytes } => {
                write!(f, "allocator refused a request for {bytes} bytes")
            }
        }
    }
}

impl Error for MemError {}
