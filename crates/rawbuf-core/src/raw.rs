//! The allocation kernel: element-typed wrappers over the global allocator.
//!
//! Everything `unsafe` in the container family bottoms out in the five
//! operations here — allocate, reallocate, deallocate, initialize a region,
//! and move cells within a buffer — all expressed in element counts rather
//! than bytes. Layout computation, with its overflow and zero-size hazards,
//! happens in one place so the containers above never touch [`Layout`]
//! directly.
//!
//! The kernel deals in buffers, not containers: callers own the pairing of
//! pointer and length, and must pass back exactly the length a buffer was
//! created with.

#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]

use std::alloc::{self, Layout};
use std::mem;
use std::ptr::NonNull;

use bytemuck::Pod;

use crate::error::MemError;
use crate::mode::InitMode;

/// Compute the layout for `len` elements of `T`.
fn array_layout<T>(len: usize) -> Result<Layout, MemError> {
    if mem::size_of::<T>() == 0 {
        return Err(MemError::ZeroSizedElement);
    }
    Layout::array::<T>(len).map_err(|_| MemError::CapacityOverflow)
}

/// Allocate an uninitialized buffer of `len` elements.
///
/// The returned memory is uninitialized regardless of the caller's init
/// policy; applying an [`InitMode`] via [`init_region`] is a separate step.
///
/// Fails with [`MemError::ZeroDim`] for `len == 0` (the global allocator
/// does not accept zero-size requests), [`MemError::ZeroSizedElement`] or
/// [`MemError::CapacityOverflow`] for unrepresentable layouts, and
/// [`MemError::AllocFailed`] when the allocator returns null.
pub fn alloc_array<T: Pod>(len: usize) -> Result<NonNull<T>, MemError> {
    if len == 0 {
        return Err(MemError::ZeroDim { dim: "length" });
    }
    let layout = array_layout::<T>(len)?;
    // SAFETY: layout has non-zero size; len and size_of::<T>() were both
    // checked non-zero above.
    let ptr = unsafe { alloc::alloc(layout) };
    NonNull::new(ptr.cast::<T>()).ok_or(MemError::AllocFailed {
        bytes: layout.size(),
    })
}

/// Grow or shrink a buffer to `new_len` elements, preserving the leading
/// `min(old_len, new_len)` elements.
///
/// On failure the original buffer is untouched and remains owned by the
/// caller, per the global allocator's `realloc` contract.
///
/// # Safety
///
/// `ptr` must have come from [`alloc_array::<T>`] or a previous
/// [`realloc_array::<T>`] call, and `old_len` must be exactly the length
/// that allocation was made with.
pub unsafe fn realloc_array<T: Pod>(
    ptr: NonNull<T>,
    old_len: usize,
    new_len: usize,
) -> Result<NonNull<T>, MemError> {
    if new_len == 0 {
        return Err(MemError::ZeroDim { dim: "length" });
    }
    let old_layout = array_layout::<T>(old_len)?;
    let new_layout = array_layout::<T>(new_len)?;
    // SAFETY: ptr was allocated with old_layout per this function's
    // contract; new_layout's size is non-zero and does not overflow
    // (array_layout checked both).
    let raw = unsafe {
        alloc::realloc(ptr.as_ptr().cast::<u8>(), old_layout, new_layout.size())
    };
    NonNull::new(raw.cast::<T>()).ok_or(MemError::AllocFailed {
        bytes: new_layout.size(),
    })
}

/// Release a buffer previously created by this kernel.
///
/// # Safety
///
/// `ptr` must have come from [`alloc_array::<T>`] or [`realloc_array::<T>`],
/// `len` must be exactly the length of that allocation, and the buffer must
/// not be used afterwards.
pub unsafe fn dealloc_array<T>(ptr: NonNull<T>, len: usize) {
    let layout =
        Layout::array::<T>(len).expect("layout was valid when the buffer was allocated");
    // SAFETY: ptr was allocated with this layout per this function's
    // contract.
    unsafe { alloc::dealloc(ptr.as_ptr().cast::<u8>(), layout) };
}

/// Apply an [`InitMode`] to the `count` cells starting at offset `start`.
///
/// [`InitMode::Uninit`] is a no-op: the cells keep whatever bytes they
/// hold, and reading one before it is written is undefined behavior.
///
/// # Safety
///
/// `ptr` must point at a live buffer of at least `start + count` cells of
/// `T`, valid for writes.
pub unsafe fn init_region<T: Pod + Default>(
    ptr: NonNull<T>,
    start: usize,
    count: usize,
    mode: InitMode,
) {
    match mode {
        InitMode::Uninit => {}
        InitMode::Zeroed => {
            // SAFETY: the region lies within the buffer per this function's
            // contract; all-zero bytes are a valid T because T: Pod.
            unsafe { ptr.as_ptr().add(start).write_bytes(0, count) };
        }
        InitMode::Defaulted => {
            for i in start..start + count {
                // SAFETY: i < start + count, so the cell lies within the
                // buffer per this function's contract.
                unsafe { ptr.as_ptr().add(i).write(T::default()) };
            }
        }
    }
}

/// Move `count` cells from offset `src` to offset `dst` within one buffer.
///
/// The two ranges may overlap; the copy has `memmove` semantics.
///
/// # Safety
///
/// Both `src + count` and `dst + count` must lie within the buffer `ptr`
/// points at, and the buffer must be valid for reads and writes.
pub unsafe fn copy_cells<T>(ptr: NonNull<T>, src: usize, dst: usize, count: usize) {
    // SAFETY: both ranges are in bounds per this function's contract, and
    // ptr::copy permits overlap.
    unsafe {
        std::ptr::copy(ptr.as_ptr().add(src), ptr.as_ptr().add(dst), count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytemuck::Zeroable;

    #[test]
    fn alloc_write_read_dealloc_round_trip() {
        let ptr = alloc_array::<u64>(8).unwrap();
        unsafe {
            for i in 0..8 {
                ptr.as_ptr().add(i).write(i as u64 * 3);
            }
            for i in 0..8 {
                assert_eq!(ptr.as_ptr().add(i).read(), i as u64 * 3);
            }
            dealloc_array(ptr, 8);
        }
    }

    #[test]
    fn allocations_are_element_aligned() {
        let ptr = alloc_array::<u64>(3).unwrap();
        assert_eq!(ptr.as_ptr() as usize % mem::align_of::<u64>(), 0);
        unsafe { dealloc_array(ptr, 3) };
    }

    #[test]
    fn alloc_rejects_zero_len() {
        assert!(matches!(
            alloc_array::<u32>(0),
            Err(MemError::ZeroDim { dim: "length" })
        ));
    }

    #[test]
    fn alloc_rejects_zero_sized_elements() {
        assert!(matches!(
            alloc_array::<()>(4),
            Err(MemError::ZeroSizedElement)
        ));
    }

    #[test]
    fn alloc_rejects_overflowing_len() {
        assert!(matches!(
            alloc_array::<u64>(usize::MAX / 4),
            Err(MemError::CapacityOverflow)
        ));
    }

    #[test]
    fn realloc_preserves_surviving_prefix() {
        let ptr = alloc_array::<u32>(4).unwrap();
        unsafe {
            for i in 0..4 {
                ptr.as_ptr().add(i).write(10 + i as u32);
            }
            let grown = realloc_array(ptr, 4, 16).unwrap();
            for i in 0..4 {
                assert_eq!(grown.as_ptr().add(i).read(), 10 + i as u32);
            }
            let shrunk = realloc_array(grown, 16, 2).unwrap();
            for i in 0..2 {
                assert_eq!(shrunk.as_ptr().add(i).read(), 10 + i as u32);
            }
            dealloc_array(shrunk, 2);
        }
    }

    #[test]
    fn realloc_rejects_zero_len() {
        let ptr = alloc_array::<u32>(4).unwrap();
        unsafe {
            assert!(matches!(
                realloc_array(ptr, 4, 0),
                Err(MemError::ZeroDim { dim: "length" })
            ));
            // The original buffer survives a rejected realloc.
            dealloc_array(ptr, 4);
        }
    }

    #[test]
    fn init_region_zeroed_touches_exactly_the_region() {
        let ptr = alloc_array::<u8>(16).unwrap();
        unsafe {
            ptr.as_ptr().write_bytes(0xAA, 16);
            init_region(ptr, 4, 8, InitMode::Zeroed);
            for i in 0..16 {
                let expected = if (4..12).contains(&i) { 0 } else { 0xAA };
                assert_eq!(ptr.as_ptr().add(i).read(), expected);
            }
            dealloc_array(ptr, 16);
        }
    }

    #[test]
    fn init_region_defaulted_writes_default_values() {
        #[derive(Clone, Copy, Pod, Zeroable)]
        #[repr(C)]
        struct Cell {
            v: u32,
        }
        impl Default for Cell {
            fn default() -> Self {
                Cell { v: 7 }
            }
        }

        let ptr = alloc_array::<Cell>(5).unwrap();
        unsafe {
            init_region(ptr, 0, 5, InitMode::Defaulted);
            for i in 0..5 {
                assert_eq!(ptr.as_ptr().add(i).read().v, 7);
            }
            dealloc_array(ptr, 5);
        }
    }

    #[test]
    fn copy_cells_handles_overlapping_ranges() {
        let ptr = alloc_array::<u32>(6).unwrap();
        unsafe {
            for i in 0..6 {
                ptr.as_ptr().add(i).write(i as u32);
            }
            copy_cells(ptr, 0, 2, 4);
            let mut out = [0u32; 6];
            for (i, slot) in out.iter_mut().enumerate() {
                *slot = ptr.as_ptr().add(i).read();
            }
            assert_eq!(out, [0, 1, 0, 1, 2, 3]);
            dealloc_array(ptr, 6);
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn realloc_chain_preserves_surviving_prefix(
                values in proptest::collection::vec(any::<u32>(), 1..64),
                new_len in 1usize..64,
            ) {
                let len = values.len();
                let keep = len.min(new_len);
                let ptr = alloc_array::<u32>(len).unwrap();
                let mut survived = Vec::with_capacity(keep);
                unsafe {
                    for (i, v) in values.iter().enumerate() {
                        ptr.as_ptr().add(i).write(*v);
                    }
                    let moved = realloc_array(ptr, len, new_len).unwrap();
                    for i in 0..keep {
                        survived.push(moved.as_ptr().add(i).read());
                    }
                    dealloc_array(moved, new_len);
                }
                prop_assert_eq!(&survived[..], &values[..keep]);
            }

            #[test]
            fn zeroed_regions_read_back_zero(
                len in 1usize..128,
                start_frac in 0usize..128,
            ) {
                let start = start_frac % len;
                let count = len - start;
                let ptr = alloc_array::<u16>(len).unwrap();
                let mut ok = true;
                unsafe {
                    init_region(ptr, start, count, InitMode::Zeroed);
                    for i in start..len {
                        ok &= ptr.as_ptr().add(i).read() == 0;
                    }
                    dealloc_array(ptr, len);
                }
                prop_assert!(ok);
            }
        }
    }
}
