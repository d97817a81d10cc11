//! Cell initialization policy.
//!
//! Every operation that brings new cells into a container's logical extent
//! (allocation, the grown region of a resize, an explicit clear) takes an
//! [`InitMode`] saying what to do with the fresh memory.

/// What to write into cells that have just entered a container's extent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitMode {
    /// Leave the memory exactly as the allocator handed it over.
    ///
    /// The fastest option, and the sharpest: the contents of an `Uninit`
    /// cell are unspecified until something is stored in it, and reading a
    /// cell that was never written is undefined behavior. Use this only
    /// when every cell is about to be overwritten anyway.
    Uninit,
    /// Fill the region with zero bytes.
    ///
    /// Cell types accepted by the containers are `Pod`, so the all-zero
    /// bit pattern is always a valid value.
    Zeroed,
    /// Store `T::default()` into every cell of the region.
    ///
    /// For most `Pod` types this produces the same bytes as
    /// [`Zeroed`](Self::Zeroed); it differs for types whose `Default` is
    /// not the zero pattern.
    Defaulted,
}
