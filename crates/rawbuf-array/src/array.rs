//! Resizable raw buffer with an explicit lifecycle.
//!
//! The lifecycle of a [`RawArray`] is:
//! 1. `RawArray::new()` — an empty shell, no allocation
//! 2. `alloc()` (or `from_slice()`) — claim a buffer from the allocator
//! 3. `get()` / `set()` / `resize()` / `as_slice()` — use it
//! 4. `dealloc()` — release the buffer, returning to the empty state
//!
//! Dropping the array releases the buffer if step 4 never ran; calling
//! `dealloc` first makes the release explicit and disarms the drop glue,
//! so the buffer is freed exactly once either way.

use std::fmt;
use std::mem;
use std::ptr::{self, NonNull};
use std::slice;

use bytemuck::Pod;

use rawbuf_core::raw;
use rawbuf_core::{InitMode, MemError};

use crate::span::RawSpan;

/// A resizable buffer of `Pod` elements managed by hand.
///
/// Unlike `Vec<T>`, a `RawArray` has no spare capacity and no implicit
/// growth: the buffer is exactly `len()` elements, every size change is an
/// explicit `resize`, and allocation failures surface as errors instead of
/// aborts. The empty state (before `alloc`, after `dealloc`) holds no
/// memory at all.
///
/// # Example
///
/// ```
/// use rawbuf_array::RawArray;
/// use rawbuf_core::InitMode;
///
/// let mut buf = RawArray::<u32>::new();
/// buf.alloc(4, InitMode::Zeroed)?;
/// buf.set(0, 7)?;
/// assert_eq!(buf.get(0)?, 7);
///
/// buf.resize(8, InitMode::Zeroed)?;
/// assert_eq!(buf.get(7)?, 0);
///
/// buf.dealloc();
/// assert!(!buf.is_allocated());
/// # Ok::<(), rawbuf_core::MemError>(())
/// ```
pub struct RawArray<T> {
    /// Dangling while unallocated; `len == 0` is the discriminant.
    ptr: NonNull<T>,
    len: usize,
}

// SAFETY: RawArray owns its buffer exclusively. Moving the array to
// another thread moves the buffer with it, so Send holds whenever the
// element type is Send. These are the bounds Vec<T> carries.
unsafe impl<T: Send> Send for RawArray<T> {}
// SAFETY: the &self surface only reads; all mutation goes through &mut.
unsafe impl<T: Sync> Sync for RawArray<T> {}

impl<T> RawArray<T> {
    /// Create an empty array. Allocates nothing.
    pub const fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
        }
    }

    /// Number of elements in the buffer; `0` while unallocated.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` while the array holds no buffer.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `true` between a successful `alloc` and the matching `dealloc`.
    pub fn is_allocated(&self) -> bool {
        self.len != 0
    }

    /// Size of the buffer in bytes; `0` while unallocated.
    pub fn byte_len(&self) -> usize {
        self.len * mem::size_of::<T>()
    }

    /// Release the buffer and return to the empty state.
    ///
    /// A no-op on an unallocated array, so calling it twice (or letting
    /// drop run afterwards) is fine: the buffer is freed at most once.
    pub fn dealloc(&mut self) {
        if !self.is_allocated() {
            return;
        }
        // SAFETY: ptr and len describe the live allocation made by
        // alloc/resize/from_slice.
        unsafe { raw::dealloc_array(self.ptr, self.len) };
        self.ptr = NonNull::dangling();
        self.len = 0;
    }

    /// Snapshot of the pointer and length, for span construction.
    pub(crate) fn raw_parts(&self) -> (NonNull<T>, usize) {
        (self.ptr, self.len)
    }
}

impl<T: Pod + Default> RawArray<T> {
    /// Allocate a buffer of `len` elements, initialized per `mode`.
    ///
    /// Fails with [`MemError::AlreadyAllocated`] if a buffer is already
    /// held, [`MemError::ZeroDim`] for `len == 0`, and
    /// [`MemError::AllocFailed`] if the allocator refuses.
    pub fn alloc(&mut self, len: usize, mode: InitMode) -> Result<(), MemError> {
        if self.is_allocated() {
            return Err(MemError::AlreadyAllocated);
        }
        if len == 0 {
            return Err(MemError::ZeroDim { dim: "length" });
        }
        let ptr = raw::alloc_array::<T>(len)?;
        // SAFETY: the fresh buffer spans exactly len cells.
        unsafe { raw::init_region(ptr, 0, len, mode) };
        self.ptr = ptr;
        self.len = len;
        Ok(())
    }

    /// Resize the buffer to `new_len` elements in place.
    ///
    /// The leading `min(len, new_len)` elements survive. On growth the new
    /// tail is initialized per `mode`; on shrink the trailing elements are
    /// discarded. `new_len == len` is a no-op. If reallocation fails the
    /// array is left exactly as it was.
    ///
    /// Fails with [`MemError::NotAllocated`] before `alloc` and
    /// [`MemError::ZeroDim`] for `new_len == 0` (release the buffer with
    /// [`dealloc`](Self::dealloc) instead).
    pub fn resize(&mut self, new_len: usize, mode: InitMode) -> Result<(), MemError> {
        if !self.is_allocated() {
            return Err(MemError::NotAllocated);
        }
        if new_len == self.len {
            return Ok(());
        }
        if new_len == 0 {
            return Err(MemError::ZeroDim { dim: "length" });
        }
        let old_len = self.len;
        // SAFETY: ptr and old_len describe the live allocation.
        let ptr = unsafe { raw::realloc_array(self.ptr, old_len, new_len)? };
        self.ptr = ptr;
        self.len = new_len;
        if new_len > old_len {
            // SAFETY: the buffer now spans new_len cells, so the region
            // [old_len, new_len) is in bounds.
            unsafe { raw::init_region(self.ptr, old_len, new_len - old_len, mode) };
        }
        Ok(())
    }

    /// Re-initialize every element per `mode`.
    ///
    /// [`InitMode::Uninit`] leaves the contents untouched.
    pub fn clear(&mut self, mode: InitMode) -> Result<(), MemError> {
        if !self.is_allocated() {
            return Err(MemError::NotAllocated);
        }
        // SAFETY: the live buffer spans exactly len cells.
        unsafe { raw::init_region(self.ptr, 0, self.len, mode) };
        Ok(())
    }
}

impl<T: Pod> RawArray<T> {
    /// Allocate a buffer sized to `source` and copy its contents in.
    ///
    /// Fails with [`MemError::AlreadyAllocated`] if a buffer is already
    /// held and [`MemError::ZeroDim`] for an empty source.
    pub fn from_slice(&mut self, source: &[T]) -> Result<(), MemError> {
        if self.is_allocated() {
            return Err(MemError::AlreadyAllocated);
        }
        if source.is_empty() {
            return Err(MemError::ZeroDim { dim: "length" });
        }
        let ptr = raw::alloc_array::<T>(source.len())?;
        // SAFETY: the fresh buffer holds exactly source.len() cells and
        // cannot overlap a caller-visible slice.
        unsafe {
            ptr::copy_nonoverlapping(source.as_ptr(), ptr.as_ptr(), source.len());
        }
        self.ptr = ptr;
        self.len = source.len();
        Ok(())
    }

    /// Copy the buffer out into an owned `Vec`.
    pub fn to_vec(&self) -> Result<Vec<T>, MemError> {
        Ok(self.as_slice()?.to_vec())
    }

    /// Read the element at `index`.
    pub fn get(&self, index: usize) -> Result<T, MemError> {
        self.check_index(index)?;
        // SAFETY: check_index verified the buffer is live and index < len.
        Ok(unsafe { self.ptr.as_ptr().add(index).read() })
    }

    /// Mutable reference to the element at `index`.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T, MemError> {
        self.check_index(index)?;
        // SAFETY: check_index verified the buffer is live and index < len;
        // &mut self guarantees exclusive access for the borrow's lifetime.
        Ok(unsafe { &mut *self.ptr.as_ptr().add(index) })
    }

    /// Store `value` at `index`.
    pub fn set(&mut self, index: usize, value: T) -> Result<(), MemError> {
        self.check_index(index)?;
        // SAFETY: check_index verified the buffer is live and index < len.
        unsafe { self.ptr.as_ptr().add(index).write(value) };
        Ok(())
    }

    /// Read the element at `index` with no state or bounds check.
    ///
    /// # Safety
    ///
    /// The array must be allocated and `index < len()`; violating either
    /// is undefined behavior.
    pub unsafe fn get_unchecked(&self, index: usize) -> T {
        debug_assert!(index < self.len);
        // SAFETY: the caller guarantees the buffer is live and index < len.
        unsafe { self.ptr.as_ptr().add(index).read() }
    }

    /// Mutable reference to the element at `index` with no state or bounds
    /// check.
    ///
    /// # Safety
    ///
    /// The array must be allocated and `index < len()`; violating either
    /// is undefined behavior.
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len);
        // SAFETY: the caller guarantees the buffer is live and index < len;
        // &mut self guarantees exclusive access for the borrow's lifetime.
        unsafe { &mut *self.ptr.as_ptr().add(index) }
    }

    /// Store `value` at `index` with no state or bounds check.
    ///
    /// # Safety
    ///
    /// The array must be allocated and `index < len()`; violating either
    /// is undefined behavior.
    pub unsafe fn set_unchecked(&mut self, index: usize, value: T) {
        debug_assert!(index < self.len);
        // SAFETY: the caller guarantees the buffer is live and index < len.
        unsafe { self.ptr.as_ptr().add(index).write(value) };
    }

    /// Borrow the whole buffer as a slice.
    pub fn as_slice(&self) -> Result<&[T], MemError> {
        if !self.is_allocated() {
            return Err(MemError::NotAllocated);
        }
        // SAFETY: ptr is valid for len cells for the lifetime of &self.
        Ok(unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) })
    }

    /// Borrow the whole buffer as a mutable slice.
    pub fn as_mut_slice(&mut self) -> Result<&mut [T], MemError> {
        if !self.is_allocated() {
            return Err(MemError::NotAllocated);
        }
        // SAFETY: ptr is valid for len cells, and &mut self guarantees
        // exclusive access for the lifetime of the borrow.
        Ok(unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) })
    }

    /// Overwrite every element with `value`.
    pub fn fill(&mut self, value: T) -> Result<(), MemError> {
        self.as_mut_slice()?.fill(value);
        Ok(())
    }

    /// Capture a [`RawSpan`] snapshot of the current buffer.
    pub fn span(&self) -> Result<RawSpan<T>, MemError> {
        if !self.is_allocated() {
            return Err(MemError::NotAllocated);
        }
        Ok(RawSpan::from_raw_parts(self.ptr, self.len))
    }

    fn check_index(&self, index: usize) -> Result<(), MemError> {
        if !self.is_allocated() {
            return Err(MemError::NotAllocated);
        }
        if index >= self.len {
            return Err(MemError::OutOfBounds {
                index,
                len: self.len,
            });
        }
        Ok(())
    }
}

impl<T> Default for RawArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for RawArray<T> {
    fn drop(&mut self) {
        self.dealloc();
    }
}

impl<T> fmt::Debug for RawArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawArray")
            .field("len", &self.len)
            .field("bytes", &self.byte_len())
            .field("allocated", &self.is_allocated())
            .finish()
    }
}

impl<T: Pod + PartialEq> PartialEq for RawArray<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.len != other.len {
            return false;
        }
        if self.len == 0 {
            return true;
        }
        // SAFETY: equal non-zero lengths mean both arrays are allocated
        // and both buffers span exactly len cells.
        let (a, b) = unsafe {
            (
                slice::from_raw_parts(self.ptr.as_ptr(), self.len),
                slice::from_raw_parts(other.ptr.as_ptr(), other.len),
            )
        };
        a == b
    }
}

impl<T: Pod + Eq> Eq for RawArray<T> {}
