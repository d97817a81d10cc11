//! Row-major matrix in a single contiguous buffer.
//!
//! A [`FlatGrid`] stores `width * height` cells in one allocation, row
//! after row. The interesting operation is [`FlatGrid::resize`]: because
//! the row stride changes with the width, surviving cells must be repacked
//! inside the buffer so that `(x, y)` keeps addressing the same logical
//! cell afterwards:
//!
//! ```text
//! resize 4x3 -> 6x2          buffer before     buffer after
//! a b c d                    abcdefghijkl      abcd..efgh..
//! e f g h            =>                        ^ rows repacked to the
//! i j k l   (row dropped)                        new stride, tails
//!                                                initialized per mode
//! ```
//!
//! Repacking runs last-row-first when the stride grows and first-row-first
//! when it shrinks, so a destination never overwrites a row that has not
//! been moved yet; individual row copies may still overlap their own
//! source, which the kernel's `memmove` semantics absorb.

use std::fmt;
use std::mem;
use std::ptr::{self, NonNull};
use std::slice;

use bytemuck::Pod;

use rawbuf_core::raw;
use rawbuf_core::{InitMode, MemError};

/// A row-major 2D buffer of `Pod` cells in a single allocation.
///
/// Follows the explicit lifecycle of `RawArray` from `rawbuf-array`:
/// nothing is held before `alloc`, every size change is explicit, and
/// `dealloc` (or drop) releases the buffer exactly once.
///
/// # Example
///
/// ```
/// use rawbuf_grid::FlatGrid;
/// use rawbuf_core::InitMode;
///
/// let mut grid = FlatGrid::<f32>::new();
/// grid.alloc(4, 3, InitMode::Zeroed)?;
/// grid.set(2, 1, 8.5)?;
///
/// // Growing the width moves rows apart; the cell keeps its coordinate.
/// grid.resize(6, 3, InitMode::Zeroed)?;
/// assert_eq!(grid.get(2, 1)?, 8.5);
/// # Ok::<(), rawbuf_core::MemError>(())
/// ```
pub struct FlatGrid<T> {
    /// Dangling while unallocated; `width == 0` is the discriminant.
    ptr: NonNull<T>,
    width: usize,
    height: usize,
}

// SAFETY: FlatGrid owns its buffer exclusively; the &self surface only
// reads. Same reasoning and bounds as Vec<T>.
unsafe impl<T: Send> Send for FlatGrid<T> {}
// SAFETY: all mutation goes through &mut.
unsafe impl<T: Sync> Sync for FlatGrid<T> {}

impl<T> FlatGrid<T> {
    /// Create an empty grid. Allocates nothing.
    pub const fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            width: 0,
            height: 0,
        }
    }

    /// Columns per row; `0` while unallocated.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows; `0` while unallocated.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells (`width * height`).
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// `true` while unallocated.
    pub fn is_empty(&self) -> bool {
        self.cell_count() == 0
    }

    /// Size of the buffer in bytes; `0` while unallocated.
    pub fn byte_len(&self) -> usize {
        self.cell_count() * mem::size_of::<T>()
    }

    /// `true` between a successful `alloc` and the matching `dealloc`.
    pub fn is_allocated(&self) -> bool {
        self.width != 0
    }

    /// Release the buffer and return to the empty state.
    ///
    /// A no-op on an unallocated grid; the buffer is freed at most once
    /// between this and the drop glue.
    pub fn dealloc(&mut self) {
        if !self.is_allocated() {
            return;
        }
        // SAFETY: ptr and cell_count() describe the live allocation.
        unsafe { raw::dealloc_array(self.ptr, self.cell_count()) };
        self.ptr = NonNull::dangling();
        self.width = 0;
        self.height = 0;
    }
}

impl<T: Pod + Default> FlatGrid<T> {
    /// Allocate a `width x height` buffer, initialized per `mode`.
    ///
    /// Fails with [`MemError::AlreadyAllocated`] if a buffer is already
    /// held, [`MemError::ZeroDim`] if either dimension is zero, and
    /// [`MemError::CapacityOverflow`] if `width * height` overflows.
    pub fn alloc(&mut self, width: usize, height: usize, mode: InitMode) -> Result<(), MemError> {
        if self.is_allocated() {
            return Err(MemError::AlreadyAllocated);
        }
        check_dims(width, height)?;
        let cells = width.checked_mul(height).ok_or(MemError::CapacityOverflow)?;
        let ptr = raw::alloc_array::<T>(cells)?;
        // SAFETY: the fresh buffer spans exactly cells elements.
        unsafe { raw::init_region(ptr, 0, cells, mode) };
        self.ptr = ptr;
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Resize to `new_width x new_height`, keeping every surviving cell at
    /// its `(x, y)` coordinate.
    ///
    /// Cells in the overlap of the old and new extents are preserved.
    /// Widened row tails and new bottom rows are initialized per `mode`;
    /// cells outside the new extent are discarded. Equal dimensions are a
    /// no-op.
    ///
    /// Growth reallocates before repacking, so a failed grow leaves the
    /// grid untouched. A shrink repacks first and reallocates last; in the
    /// unlikely event the allocator fails that final step, the error is
    /// returned with dimensions unchanged and cell contents unspecified.
    pub fn resize(
        &mut self,
        new_width: usize,
        new_height: usize,
        mode: InitMode,
    ) -> Result<(), MemError> {
        if !self.is_allocated() {
            return Err(MemError::NotAllocated);
        }
        if new_width == self.width && new_height == self.height {
            return Ok(());
        }
        check_dims(new_width, new_height)?;

        let old_width = self.width;
        let old_height = self.height;
        let old_cells = old_width * old_height;
        let new_cells = new_width
            .checked_mul(new_height)
            .ok_or(MemError::CapacityOverflow)?;
        let keep_width = old_width.min(new_width);
        let keep_height = old_height.min(new_height);

        // Grow the buffer first so every repack destination is in bounds.
        if new_cells > old_cells {
            // SAFETY: ptr and old_cells describe the live allocation.
            self.ptr = unsafe { raw::realloc_array(self.ptr, old_cells, new_cells)? };
        }

        // Repack surviving rows to the new stride. Last-row-first while
        // the stride grows (destinations sit above their sources),
        // first-row-first while it shrinks; either order only overwrites
        // rows that have already been moved.
        if new_width > old_width {
            for y in (0..keep_height).rev() {
                // SAFETY: source row [y*old_width, +keep_width) and
                // destination [y*new_width, +keep_width) both lie within
                // the current buffer extent.
                unsafe { raw::copy_cells(self.ptr, y * old_width, y * new_width, keep_width) };
            }
        } else if new_width < old_width {
            for y in 0..keep_height {
                // SAFETY: as above, with the roles of the extents swapped.
                unsafe { raw::copy_cells(self.ptr, y * old_width, y * new_width, keep_width) };
            }
        }

        // With all survivors packed into the leading new_cells cells, the
        // buffer can give back the excess.
        if new_cells < old_cells {
            // SAFETY: ptr and old_cells still describe the allocation.
            self.ptr = unsafe { raw::realloc_array(self.ptr, old_cells, new_cells)? };
        }

        self.width = new_width;
        self.height = new_height;

        // Initialize exactly the cells that entered the extent: widened
        // row tails, then new bottom rows.
        if new_width > old_width {
            for y in 0..keep_height {
                // SAFETY: [y*new_width + old_width, +(new_width-old_width))
                // lies within the row, inside the new extent.
                unsafe {
                    raw::init_region(
                        self.ptr,
                        y * new_width + old_width,
                        new_width - old_width,
                        mode,
                    )
                };
            }
        }
        if new_height > old_height {
            // SAFETY: the block [old_height*new_width, new_height*new_width)
            // is the trailing part of the new extent.
            unsafe {
                raw::init_region(
                    self.ptr,
                    old_height * new_width,
                    (new_height - old_height) * new_width,
                    mode,
                )
            };
        }
        Ok(())
    }

    /// Re-initialize every cell per `mode`.
    ///
    /// [`InitMode::Uninit`] leaves the contents untouched.
    pub fn clear(&mut self, mode: InitMode) -> Result<(), MemError> {
        if !self.is_allocated() {
            return Err(MemError::NotAllocated);
        }
        // SAFETY: the live buffer spans exactly cell_count() elements.
        unsafe { raw::init_region(self.ptr, 0, self.cell_count(), mode) };
        Ok(())
    }
}

impl<T: Pod> FlatGrid<T> {
    /// Allocate from a rectangular set of rows, copying the contents.
    ///
    /// Every row must have the length of the first; a mismatch fails with
    /// [`MemError::RaggedInput`]. Fails with [`MemError::AlreadyAllocated`]
    /// if a buffer is already held and [`MemError::ZeroDim`] for an empty
    /// outer or first inner extent.
    pub fn from_rows<R: AsRef<[T]>>(&mut self, rows: &[R]) -> Result<(), MemError> {
        if self.is_allocated() {
            return Err(MemError::AlreadyAllocated);
        }
        let (width, height) = validate_rows(rows)?;
        let cells = width.checked_mul(height).ok_or(MemError::CapacityOverflow)?;
        let ptr = raw::alloc_array::<T>(cells)?;
        for (y, row) in rows.iter().enumerate() {
            // SAFETY: the fresh buffer holds cells = width*height elements,
            // so row y's destination [y*width, +width) is in bounds; a
            // fresh allocation cannot overlap the source slice.
            unsafe {
                ptr::copy_nonoverlapping(row.as_ref().as_ptr(), ptr.as_ptr().add(y * width), width);
            }
        }
        self.ptr = ptr;
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Copy the grid out as one `Vec` per row.
    pub fn to_rows(&self) -> Result<Vec<Vec<T>>, MemError> {
        if !self.is_allocated() {
            return Err(MemError::NotAllocated);
        }
        (0..self.height)
            .map(|y| Ok(self.row(y)?.to_vec()))
            .collect()
    }

    /// Read the cell at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Result<T, MemError> {
        let i = self.check_coord(x, y)?;
        // SAFETY: check_coord verified liveness and bounds.
        Ok(unsafe { self.ptr.as_ptr().add(i).read() })
    }

    /// Mutable reference to the cell at `(x, y)`.
    pub fn get_mut(&mut self, x: usize, y: usize) -> Result<&mut T, MemError> {
        let i = self.check_coord(x, y)?;
        // SAFETY: check_coord verified liveness and bounds; &mut self
        // guarantees exclusive access for the borrow's lifetime.
        Ok(unsafe { &mut *self.ptr.as_ptr().add(i) })
    }

    /// Store `value` at `(x, y)`.
    pub fn set(&mut self, x: usize, y: usize, value: T) -> Result<(), MemError> {
        let i = self.check_coord(x, y)?;
        // SAFETY: check_coord verified liveness and bounds.
        unsafe { self.ptr.as_ptr().add(i).write(value) };
        Ok(())
    }

    /// Read the cell at linear index `index` (row-major order).
    pub fn get_at(&self, index: usize) -> Result<T, MemError> {
        self.check_linear(index)?;
        // SAFETY: check_linear verified liveness and bounds.
        Ok(unsafe { self.ptr.as_ptr().add(index).read() })
    }

    /// Mutable reference to the cell at linear index `index`.
    pub fn get_at_mut(&mut self, index: usize) -> Result<&mut T, MemError> {
        self.check_linear(index)?;
        // SAFETY: check_linear verified liveness and bounds; &mut self
        // guarantees exclusive access for the borrow's lifetime.
        Ok(unsafe { &mut *self.ptr.as_ptr().add(index) })
    }

    /// Store `value` at linear index `index` (row-major order).
    pub fn set_at(&mut self, index: usize, value: T) -> Result<(), MemError> {
        self.check_linear(index)?;
        // SAFETY: check_linear verified liveness and bounds.
        unsafe { self.ptr.as_ptr().add(index).write(value) };
        Ok(())
    }

    /// Read the cell at `(x, y)` with no state or bounds check.
    ///
    /// # Safety
    ///
    /// The grid must be allocated, `x < width()`, and `y < height()`;
    /// violating any of these is undefined behavior.
    pub unsafe fn get_unchecked(&self, x: usize, y: usize) -> T {
        debug_assert!(x < self.width && y < self.height);
        // SAFETY: the caller guarantees liveness and bounds.
        unsafe { self.ptr.as_ptr().add(y * self.width + x).read() }
    }

    /// Mutable reference to the cell at `(x, y)` with no state or bounds
    /// check.
    ///
    /// # Safety
    ///
    /// The grid must be allocated, `x < width()`, and `y < height()`;
    /// violating any of these is undefined behavior.
    pub unsafe fn get_unchecked_mut(&mut self, x: usize, y: usize) -> &mut T {
        debug_assert!(x < self.width && y < self.height);
        // SAFETY: the caller guarantees liveness and bounds; &mut self
        // guarantees exclusive access for the borrow's lifetime.
        unsafe { &mut *self.ptr.as_ptr().add(y * self.width + x) }
    }

    /// Store `value` at `(x, y)` with no state or bounds check.
    ///
    /// # Safety
    ///
    /// The grid must be allocated, `x < width()`, and `y < height()`;
    /// violating any of these is undefined behavior.
    pub unsafe fn set_unchecked(&mut self, x: usize, y: usize, value: T) {
        debug_assert!(x < self.width && y < self.height);
        // SAFETY: the caller guarantees liveness and bounds.
        unsafe { self.ptr.as_ptr().add(y * self.width + x).write(value) };
    }

    /// Read the cell at linear index `index` with no state or bounds check.
    ///
    /// # Safety
    ///
    /// The grid must be allocated and `index < cell_count()`; violating either
    /// is undefined behavior.
    pub unsafe fn get_at_unchecked(&self, index: usize) -> T {
        debug_assert!(index < self.cell_count());
        // SAFETY: the caller guarantees liveness and bounds.
        unsafe { self.ptr.as_ptr().add(index).read() }
    }

    /// Store `value` at linear index `index` with no state or bounds check.
    ///
    /// # Safety
    ///
    /// The grid must be allocated and `index < cell_count()`; violating either
    /// is undefined behavior.
    pub unsafe fn set_at_unchecked(&mut self, index: usize, value: T) {
        debug_assert!(index < self.cell_count());
        // SAFETY: the caller guarantees liveness and bounds.
        unsafe { self.ptr.as_ptr().add(index).write(value) };
    }

    /// Borrow row `y` as a slice.
    pub fn row(&self, y: usize) -> Result<&[T], MemError> {
        self.check_row(y)?;
        // SAFETY: the row [y*width, +width) lies within the live buffer
        // for the lifetime of &self.
        Ok(unsafe { slice::from_raw_parts(self.ptr.as_ptr().add(y * self.width), self.width) })
    }

    /// Borrow row `y` as a mutable slice.
    pub fn row_mut(&mut self, y: usize) -> Result<&mut [T], MemError> {
        self.check_row(y)?;
        // SAFETY: the row lies within the live buffer; &mut self
        // guarantees exclusive access for the borrow's lifetime.
        Ok(unsafe {
            slice::from_raw_parts_mut(self.ptr.as_ptr().add(y * self.width), self.width)
        })
    }

    /// Borrow the whole buffer as one row-major slice.
    pub fn as_slice(&self) -> Result<&[T], MemError> {
        if !self.is_allocated() {
            return Err(MemError::NotAllocated);
        }
        // SAFETY: ptr is valid for cell_count() elements for the lifetime of
        // &self.
        Ok(unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.cell_count()) })
    }

    /// Borrow the whole buffer as one mutable row-major slice.
    pub fn as_mut_slice(&mut self) -> Result<&mut [T], MemError> {
        if !self.is_allocated() {
            return Err(MemError::NotAllocated);
        }
        // SAFETY: ptr is valid for cell_count() elements; &mut self guarantees
        // exclusive access for the lifetime of the borrow.
        Ok(unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.cell_count()) })
    }

    /// Overwrite every cell with `value`.
    pub fn fill(&mut self, value: T) -> Result<(), MemError> {
        self.as_mut_slice()?.fill(value);
        Ok(())
    }

    fn check_coord(&self, x: usize, y: usize) -> Result<usize, MemError> {
        if !self.is_allocated() {
            return Err(MemError::NotAllocated);
        }
        if x >= self.width || y >= self.height {
            return Err(MemError::CoordOutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y * self.width + x)
    }

    fn check_linear(&self, index: usize) -> Result<(), MemError> {
        if !self.is_allocated() {
            return Err(MemError::NotAllocated);
        }
        if index >= self.cell_count() {
            return Err(MemError::OutOfBounds {
                index,
                len: self.cell_count(),
            });
        }
        Ok(())
    }

    fn check_row(&self, y: usize) -> Result<(), MemError> {
        if !self.is_allocated() {
            return Err(MemError::NotAllocated);
        }
        if y >= self.height {
            return Err(MemError::OutOfBounds {
                index: y,
                len: self.height,
            });
        }
        Ok(())
    }
}

/// Shared dimension validation for grid allocations.
pub(crate) fn check_dims(width: usize, height: usize) -> Result<(), MemError> {
    if width == 0 {
        return Err(MemError::ZeroDim { dim: "width" });
    }
    if height == 0 {
        return Err(MemError::ZeroDim { dim: "height" });
    }
    Ok(())
}

/// Shared rectangularity validation for row imports. Returns
/// `(width, height)`.
pub(crate) fn validate_rows<T, R: AsRef<[T]>>(rows: &[R]) -> Result<(usize, usize), MemError> {
    if rows.is_empty() {
        return Err(MemError::ZeroDim { dim: "height" });
    }
    let width = rows[0].as_ref().len();
    if width == 0 {
        return Err(MemError::ZeroDim { dim: "width" });
    }
    for (y, row) in rows.iter().enumerate().skip(1) {
        let got = row.as_ref().len();
        if got != width {
            return Err(MemError::RaggedInput {
                row: y,
                expected: width,
                got,
            });
        }
    }
    Ok((width, rows.len()))
}

impl<T> Default for FlatGrid<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for FlatGrid<T> {
    fn drop(&mut self) {
        self.dealloc();
    }
}

impl<T> fmt::Debug for FlatGrid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlatGrid")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.byte_len())
            .finish()
    }
}

impl<T: Pod + PartialEq> PartialEq for FlatGrid<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.width != other.width || self.height != other.height {
            return false;
        }
        if !self.is_allocated() {
            return true;
        }
        // SAFETY: equal non-zero dims mean both grids are allocated and
        // both buffers span exactly cell_count() elements.
        let (a, b) = unsafe {
            (
                slice::from_raw_parts(self.ptr.as_ptr(), self.cell_count()),
                slice::from_raw_parts(other.ptr.as_ptr(), other.cell_count()),
            )
        };
        a == b
    }
}

impl<T: Pod + Eq> Eq for FlatGrid<T> {}
