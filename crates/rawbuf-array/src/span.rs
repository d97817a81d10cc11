//! Non-owning snapshot views over a [`RawArray`] buffer.
//!
//! A [`RawSpan`] captures an array's pointer and length at a moment in
//! time. It is `Copy`, carries no lifetime, and does not borrow the array:
//! nothing stops the array from being resized or deallocated while spans
//! to it exist. That freedom is the point — a span can be stashed where a
//! borrow cannot go — and also the hazard, which is why every element
//! accessor is `unsafe` and the view must be re-established with
//! [`RawSpan::resync`] after any operation that may move the buffer.
//!
//! For access patterns that fit a borrow, prefer [`RawArray::as_slice`];
//! the borrow checker then enforces what is a manual obligation here.
//!
//! A span is deliberately neither `Send` nor `Sync`: it has no way to
//! coordinate with the owning array across threads.

use std::fmt;
use std::ptr::NonNull;

use bytemuck::Pod;

use rawbuf_core::MemError;

use crate::array::RawArray;

/// A non-owning snapshot of a [`RawArray`]'s buffer.
///
/// The snapshot records the pointer and length the array had when the
/// span was created. A later `resize` may move the buffer and `dealloc`
/// frees it; the span notices neither. Bounds checks run against the
/// snapshot length, so they are only meaningful while the snapshot is
/// current.
#[must_use]
pub struct RawSpan<T> {
    ptr: NonNull<T>,
    len: usize,
}

impl<T> Clone for RawSpan<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RawSpan<T> {}

impl<T> RawSpan<T> {
    pub(crate) fn from_raw_parts(ptr: NonNull<T>, len: usize) -> Self {
        Self { ptr, len }
    }

    /// Number of elements in the snapshot.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` if the snapshot covers no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T: Pod> RawSpan<T> {
    /// Read the element at `index`.
    ///
    /// The index is checked against the snapshot length and rejected with
    /// [`MemError::OutOfBounds`] when outside it.
    ///
    /// # Safety
    ///
    /// The snapshot must be current: the source array must still be
    /// allocated and must not have been resized since this span was
    /// created or last [`resync`](Self::resync)ed.
    pub unsafe fn get(&self, index: usize) -> Result<T, MemError> {
        if index >= self.len {
            return Err(MemError::OutOfBounds {
                index,
                len: self.len,
            });
        }
        // SAFETY: index < len, and the caller guarantees the snapshot
        // still describes a live buffer.
        Ok(unsafe { self.ptr.as_ptr().add(index).read() })
    }

    /// Store `value` at `index`.
    ///
    /// The index is checked against the snapshot length and rejected with
    /// [`MemError::OutOfBounds`] when outside it.
    ///
    /// # Safety
    ///
    /// Same contract as [`get`](Self::get), plus: no other live reference
    /// (slice borrow or `get_mut` borrow) may overlap the written cell.
    pub unsafe fn set(&self, index: usize, value: T) -> Result<(), MemError> {
        if index >= self.len {
            return Err(MemError::OutOfBounds {
                index,
                len: self.len,
            });
        }
        // SAFETY: index < len, and the caller guarantees the snapshot
        // still describes a live buffer with no overlapping borrows.
        unsafe { self.ptr.as_ptr().add(index).write(value) };
        Ok(())
    }

    /// Re-establish the snapshot from the array's current buffer.
    ///
    /// Call this after any `resize` of the source array; afterwards the
    /// span is current again and its accessors operate on the new buffer.
    /// Fails with [`MemError::NotAllocated`] if the array holds no buffer.
    pub fn resync(&mut self, source: &RawArray<T>) -> Result<(), MemError> {
        if !source.is_allocated() {
            return Err(MemError::NotAllocated);
        }
        let (ptr, len) = source.raw_parts();
        self.ptr = ptr;
        self.len = len;
        Ok(())
    }
}

impl<T> fmt::Debug for RawSpan<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawSpan").field("len", &self.len).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rawbuf_core::InitMode;

    #[test]
    fn span_reads_what_the_array_holds() {
        let mut buf = RawArray::<u32>::new();
        buf.from_slice(&[10, 20, 30]).unwrap();
        let span = buf.span().unwrap();
        assert_eq!(span.len(), 3);
        unsafe {
            assert_eq!(span.get(0).unwrap(), 10);
            assert_eq!(span.get(2).unwrap(), 30);
        }
    }

    #[test]
    fn span_writes_through_to_the_array() {
        let mut buf = RawArray::<u32>::new();
        buf.alloc(2, InitMode::Zeroed).unwrap();
        let span = buf.span().unwrap();
        unsafe { span.set(1, 77).unwrap() };
        assert_eq!(buf.get(1).unwrap(), 77);
    }

    #[test]
    fn span_bounds_check_uses_snapshot_extent() {
        let mut buf = RawArray::<u32>::new();
        buf.alloc(4, InitMode::Zeroed).unwrap();
        let span = buf.span().unwrap();
        unsafe {
            assert_eq!(
                span.get(9),
                Err(MemError::OutOfBounds { index: 9, len: 4 })
            );
        }
    }

    #[test]
    fn resync_tracks_a_resize() {
        let mut buf = RawArray::<u32>::new();
        buf.from_slice(&[1, 2]).unwrap();
        let mut span = buf.span().unwrap();
        assert_eq!(span.len(), 2);

        buf.resize(5, InitMode::Zeroed).unwrap();
        span.resync(&buf).unwrap();
        assert_eq!(span.len(), 5);
        unsafe {
            assert_eq!(span.get(0).unwrap(), 1);
            assert_eq!(span.get(4).unwrap(), 0);
        }
    }

    #[test]
    fn resync_after_dealloc_fails() {
        let mut buf = RawArray::<u32>::new();
        buf.alloc(2, InitMode::Zeroed).unwrap();
        let mut span = buf.span().unwrap();
        buf.dealloc();
        assert!(matches!(span.resync(&buf), Err(MemError::NotAllocated)));
    }

    #[test]
    fn span_of_unallocated_array_fails() {
        let buf = RawArray::<u32>::new();
        assert!(matches!(buf.span(), Err(MemError::NotAllocated)));
    }

    #[test]
    fn spans_are_copy() {
        let mut buf = RawArray::<u32>::new();
        buf.from_slice(&[5]).unwrap();
        let a = buf.span().unwrap();
        let b = a;
        unsafe {
            assert_eq!(a.get(0).unwrap(), 5);
            assert_eq!(b.get(0).unwrap(), 5);
        }
    }
}
