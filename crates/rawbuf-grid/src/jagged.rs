//! Matrix as a table of independently allocated rows.
//!
//! A [`JaggedGrid`] holds one buffer per row plus a table locating them:
//!
//! ```text
//! rows: ┌───┐      ┌─────────────┐
//!       │ 0 ├────► │ row 0 cells │
//!       │ 1 ├────► │ row 1 cells │
//!       │ 2 ├────► │ row 2 cells │
//!       └───┘      └─────────────┘
//! ```
//!
//! All rows have the same width (the grid is jagged in layout, not in
//! shape). A resize works in two phases: the height phase drops or adds
//! whole rows — new rows are created at the *current* width — and the
//! width phase then reallocates every row to the new width. Unlike
//! [`FlatGrid`](crate::FlatGrid), a height-only change never touches the
//! buffers of surviving rows.

use std::fmt;
use std::mem;
use std::ptr::{self, NonNull};
use std::slice;

use bytemuck::Pod;

use rawbuf_core::raw;
use rawbuf_core::{InitMode, MemError};

use crate::flat::{check_dims, validate_rows, FlatGrid};

/// A 2D buffer of `Pod` cells with one allocation per row.
///
/// Same explicit lifecycle as the other containers: `alloc`, use,
/// `dealloc` (or drop). Row buffers are freed before the row table on
/// every release path.
///
/// # Example
///
/// ```
/// use rawbuf_grid::JaggedGrid;
/// use rawbuf_core::InitMode;
///
/// let mut grid = JaggedGrid::<u16>::new();
/// grid.alloc(3, 2, InitMode::Zeroed)?;
/// grid.set(2, 1, 40)?;
/// assert_eq!(grid.row(1)?, &[0, 0, 40]);
/// # Ok::<(), rawbuf_core::MemError>(())
/// ```
pub struct JaggedGrid<T> {
    /// One entry per row; empty is the unallocated state.
    rows: Vec<NonNull<T>>,
    /// Cells per row. Zero exactly while `rows` is empty.
    width: usize,
}

// SAFETY: JaggedGrid owns every row buffer and the table exclusively;
// the &self surface only reads. Same reasoning and bounds as Vec<T>.
unsafe impl<T: Send> Send for JaggedGrid<T> {}
// SAFETY: all mutation goes through &mut.
unsafe impl<T: Sync> Sync for JaggedGrid<T> {}

impl<T> JaggedGrid<T> {
    /// Create an empty grid. Allocates nothing.
    pub const fn new() -> Self {
        Self {
            rows: Vec::new(),
            width: 0,
        }
    }

    /// Cells per row; `0` while unallocated.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows; `0` while unallocated.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Total number of cells across all rows.
    pub fn cell_count(&self) -> usize {
        self.width * self.rows.len()
    }

    /// `true` while unallocated.
    pub fn is_empty(&self) -> bool {
        self.cell_count() == 0
    }

    /// Combined size of the row buffers in bytes; `0` while unallocated.
    pub fn byte_len(&self) -> usize {
        self.cell_count() * mem::size_of::<T>()
    }

    /// `true` between a successful `alloc` and the matching `dealloc`.
    pub fn is_allocated(&self) -> bool {
        !self.rows.is_empty()
    }

    /// Release every row buffer and the row table, returning to the empty
    /// state.
    ///
    /// A no-op on an unallocated grid; each buffer is freed at most once
    /// between this and the drop glue.
    pub fn dealloc(&mut self) {
        if !self.is_allocated() {
            return;
        }
        let width = self.width;
        self.width = 0;
        // Rows first; the table is what locates them. The table's own
        // storage goes when `rows` drops at the end of scope.
        let rows = mem::take(&mut self.rows);
        for row in rows {
            // SAFETY: every row buffer holds exactly `width` cells.
            unsafe { raw::dealloc_array(row, width) };
        }
    }
}

impl<T: Pod + Default> JaggedGrid<T> {
    /// Allocate `height` rows of `width` cells, initialized per `mode`.
    ///
    /// All-or-nothing: if any row allocation fails, the rows already
    /// claimed are released and the grid stays unallocated.
    pub fn alloc(&mut self, width: usize, height: usize, mode: InitMode) -> Result<(), MemError> {
        if self.is_allocated() {
            return Err(MemError::AlreadyAllocated);
        }
        check_dims(width, height)?;
        let rows = alloc_rows::<T>(width, height, mode)?;
        self.rows = rows;
        self.width = width;
        Ok(())
    }

    /// Resize to `new_width x new_height`, keeping every surviving cell
    /// at its `(x, y)` coordinate.
    ///
    /// The height changes first: rows beyond the new height are freed,
    /// and new rows are allocated (at the current width, initialized per
    /// `mode`). The width phase then reallocates every row to the new
    /// width, initializing widened tails per `mode`. Equal dimensions are
    /// a no-op. A height-only change leaves surviving row buffers where
    /// they are.
    ///
    /// On allocation failure the grid keeps a consistent shape — every
    /// row at one uniform width — though a failure between the two phases
    /// leaves the height already changed. A failure while rolling back a
    /// partial width change panics.
    pub fn resize(
        &mut self,
        new_width: usize,
        new_height: usize,
        mode: InitMode,
    ) -> Result<(), MemError> {
        if !self.is_allocated() {
            return Err(MemError::NotAllocated);
        }
        if new_width == self.width && new_height == self.rows.len() {
            return Ok(());
        }
        check_dims(new_width, new_height)?;

        let old_width = self.width;
        let old_height = self.rows.len();

        // Height phase. Dropped rows are freed before the table shrinks;
        // added rows are claimed in full before the table grows.
        if new_height < old_height {
            for row in self.rows.drain(new_height..) {
                // SAFETY: each drained row was allocated with old_width
                // cells.
                unsafe { raw::dealloc_array(row, old_width) };
            }
        } else if new_height > old_height {
            let mut fresh = alloc_rows::<T>(old_width, new_height - old_height, mode)?;
            self.rows.append(&mut fresh);
        }

        // Width phase: every row present after the height phase holds
        // old_width cells and moves to new_width.
        if new_width != old_width {
            for i in 0..self.rows.len() {
                // SAFETY: row i holds old_width cells.
                let moved = match unsafe { raw::realloc_array(self.rows[i], old_width, new_width) }
                {
                    Ok(row) => row,
                    Err(e) => {
                        self.roll_back_widths(i, new_width, old_width);
                        return Err(e);
                    }
                };
                self.rows[i] = moved;
                if new_width > old_width {
                    // SAFETY: the row now holds new_width cells, so the
                    // tail [old_width, new_width) is in bounds.
                    unsafe { raw::init_region(moved, old_width, new_width - old_width, mode) };
                }
            }
            self.width = new_width;
        }
        Ok(())
    }

    /// Return rows `0..count` from `to_width` back to `from_width` after a
    /// failed width phase, restoring the uniform-width invariant.
    ///
    /// # Panics
    ///
    /// Panics if the allocator also fails the rollback; there is no
    /// consistent shape left to restore at that point.
    fn roll_back_widths(&mut self, count: usize, to_width: usize, from_width: usize) {
        for row in &mut self.rows[..count] {
            // SAFETY: rows below the failure point were already moved to
            // to_width cells.
            match unsafe { raw::realloc_array::<T>(*row, to_width, from_width) } {
                Ok(restored) => *row = restored,
                Err(e) => panic!("allocator failed while rolling back a row resize: {e}"),
            }
        }
    }

    /// Re-initialize every cell per `mode`.
    ///
    /// [`InitMode::Uninit`] leaves the contents untouched.
    pub fn clear(&mut self, mode: InitMode) -> Result<(), MemError> {
        if !self.is_allocated() {
            return Err(MemError::NotAllocated);
        }
        for &row in &self.rows {
            // SAFETY: every row buffer holds exactly width cells.
            unsafe { raw::init_region(row, 0, self.width, mode) };
        }
        Ok(())
    }
}

impl<T: Pod> JaggedGrid<T> {
    /// Allocate from a rectangular set of rows, copying the contents.
    ///
    /// Same validation as [`FlatGrid::from_rows`]: every row must match
    /// the first row's length.
    pub fn from_rows<R: AsRef<[T]>>(&mut self, rows: &[R]) -> Result<(), MemError> {
        if self.is_allocated() {
            return Err(MemError::AlreadyAllocated);
        }
        let (width, height) = validate_rows(rows)?;
        let mut table = Vec::with_capacity(height);
        for row in rows {
            let buf = match raw::alloc_array::<T>(width) {
                Ok(buf) => buf,
                Err(e) => {
                    for claimed in table {
                        // SAFETY: each claimed row holds width cells.
                        unsafe { raw::dealloc_array::<T>(claimed, width) };
                    }
                    return Err(e);
                }
            };
            // SAFETY: the fresh row holds exactly width cells and cannot
            // overlap the source slice.
            unsafe {
                ptr::copy_nonoverlapping(row.as_ref().as_ptr(), buf.as_ptr(), width);
            }
            table.push(buf);
        }
        self.rows = table;
        self.width = width;
        Ok(())
    }

    /// Copy the grid out as one `Vec` per row.
    pub fn to_rows(&self) -> Result<Vec<Vec<T>>, MemError> {
        if !self.is_allocated() {
            return Err(MemError::NotAllocated);
        }
        (0..self.rows.len())
            .map(|y| Ok(self.row(y)?.to_vec()))
            .collect()
    }

    /// Read the cell at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Result<T, MemError> {
        let row = self.check_coord(x, y)?;
        // SAFETY: check_coord verified liveness and bounds.
        Ok(unsafe { row.as_ptr().add(x).read() })
    }

    /// Mutable reference to the cell at `(x, y)`.
    pub fn get_mut(&mut self, x: usize, y: usize) -> Result<&mut T, MemError> {
        let row = self.check_coord(x, y)?;
        // SAFETY: check_coord verified liveness and bounds; &mut self
        // guarantees exclusive access for the borrow's lifetime.
        Ok(unsafe { &mut *row.as_ptr().add(x) })
    }

    /// Store `value` at `(x, y)`.
    pub fn set(&mut self, x: usize, y: usize, value: T) -> Result<(), MemError> {
        let row = self.check_coord(x, y)?;
        // SAFETY: check_coord verified liveness and bounds.
        unsafe { row.as_ptr().add(x).write(value) };
        Ok(())
    }

    /// Read the cell at `(x, y)` with no state or bounds check.
    ///
    /// # Safety
    ///
    /// The grid must be allocated, `x < width()`, and `y < height()`;
    /// violating any of these is undefined behavior.
    pub unsafe fn get_unchecked(&self, x: usize, y: usize) -> T {
        debug_assert!(x < self.width && y < self.rows.len());
        // SAFETY: the caller guarantees liveness and bounds.
        unsafe { self.rows.get_unchecked(y).as_ptr().add(x).read() }
    }

    /// Mutable reference to the cell at `(x, y)` with no state or bounds
    /// check.
    ///
    /// # Safety
    ///
    /// The grid must be allocated, `x < width()`, and `y < height()`;
    /// violating any of these is undefined behavior.
    pub unsafe fn get_unchecked_mut(&mut self, x: usize, y: usize) -> &mut T {
        debug_assert!(x < self.width && y < self.rows.len());
        // SAFETY: the caller guarantees liveness and bounds; &mut self
        // guarantees exclusive access for the borrow's lifetime.
        unsafe { &mut *self.rows.get_unchecked(y).as_ptr().add(x) }
    }

    /// Store `value` at `(x, y)` with no state or bounds check.
    ///
    /// # Safety
    ///
    /// The grid must be allocated, `x < width()`, and `y < height()`;
    /// violating any of these is undefined behavior.
    pub unsafe fn set_unchecked(&mut self, x: usize, y: usize, value: T) {
        debug_assert!(x < self.width && y < self.rows.len());
        // SAFETY: the caller guarantees liveness and bounds.
        unsafe { self.rows.get_unchecked(y).as_ptr().add(x).write(value) };
    }

    /// Borrow row `y` as a slice.
    pub fn row(&self, y: usize) -> Result<&[T], MemError> {
        let row = self.check_row(y)?;
        // SAFETY: the row buffer holds exactly width cells, live for the
        // lifetime of &self.
        Ok(unsafe { slice::from_raw_parts(row.as_ptr(), self.width) })
    }

    /// Borrow row `y` as a mutable slice.
    pub fn row_mut(&mut self, y: usize) -> Result<&mut [T], MemError> {
        let row = self.check_row(y)?;
        // SAFETY: the row buffer holds exactly width cells; &mut self
        // guarantees exclusive access for the borrow's lifetime.
        Ok(unsafe { slice::from_raw_parts_mut(row.as_ptr(), self.width) })
    }

    /// Borrow row `y` as a slice with no state or bounds check.
    ///
    /// # Safety
    ///
    /// The grid must be allocated and `y < height()`; violating either is
    /// undefined behavior.
    pub unsafe fn row_unchecked(&self, y: usize) -> &[T] {
        debug_assert!(y < self.rows.len());
        // SAFETY: the caller guarantees liveness and bounds; the row buffer
        // holds exactly width cells, live for the lifetime of &self.
        unsafe { slice::from_raw_parts(self.rows.get_unchecked(y).as_ptr(), self.width) }
    }

    /// Overwrite every cell with `value`.
    pub fn fill(&mut self, value: T) -> Result<(), MemError> {
        if !self.is_allocated() {
            return Err(MemError::NotAllocated);
        }
        for y in 0..self.rows.len() {
            self.row_mut(y)?.fill(value);
        }
        Ok(())
    }

    fn check_coord(&self, x: usize, y: usize) -> Result<NonNull<T>, MemError> {
        if !self.is_allocated() {
            return Err(MemError::NotAllocated);
        }
        if x >= self.width || y >= self.rows.len() {
            return Err(MemError::CoordOutOfBounds {
                x,
                y,
                width: self.width,
                height: self.rows.len(),
            });
        }
        Ok(self.rows[y])
    }

    fn check_row(&self, y: usize) -> Result<NonNull<T>, MemError> {
        if !self.is_allocated() {
            return Err(MemError::NotAllocated);
        }
        if y >= self.rows.len() {
            return Err(MemError::OutOfBounds {
                index: y,
                len: self.rows.len(),
            });
        }
        Ok(self.rows[y])
    }
}

/// Claim `height` fresh rows of `width` cells each, initialized per
/// `mode`. All-or-nothing: on failure every claimed row is released.
fn alloc_rows<T: Pod + Default>(
    width: usize,
    height: usize,
    mode: InitMode,
) -> Result<Vec<NonNull<T>>, MemError> {
    let mut rows = Vec::with_capacity(height);
    for _ in 0..height {
        let row = match raw::alloc_array::<T>(width) {
            Ok(row) => row,
            Err(e) => {
                for claimed in rows {
                    // SAFETY: each claimed row holds width cells.
                    unsafe { raw::dealloc_array::<T>(claimed, width) };
                }
                return Err(e);
            }
        };
        // SAFETY: the fresh row spans exactly width cells.
        unsafe { raw::init_region(row, 0, width, mode) };
        rows.push(row);
    }
    Ok(rows)
}

impl<T> Default for JaggedGrid<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for JaggedGrid<T> {
    fn drop(&mut self) {
        self.dealloc();
    }
}

impl<T> fmt::Debug for JaggedGrid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JaggedGrid")
            .field("width", &self.width)
            .field("height", &self.rows.len())
            .field("bytes", &self.byte_len())
            .finish()
    }
}

impl<T: Pod + PartialEq> PartialEq for JaggedGrid<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.width != other.width || self.rows.len() != other.rows.len() {
            return false;
        }
        // Unallocated grids have no rows and compare equal vacuously.
        (0..self.rows.len()).all(|y| match (self.row(y), other.row(y)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        })
    }
}

impl<T: Pod + Eq> Eq for JaggedGrid<T> {}

/// Layout-independent comparison: a jagged grid equals a flat grid when
/// their dimensions and every cell agree.
impl<T: Pod + PartialEq> PartialEq<FlatGrid<T>> for JaggedGrid<T> {
    fn eq(&self, other: &FlatGrid<T>) -> bool {
        if self.width != other.width() || self.rows.len() != other.height() {
            return false;
        }
        (0..self.rows.len()).all(|y| match (self.row(y), other.row(y)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        })
    }
}

impl<T: Pod + PartialEq> PartialEq<JaggedGrid<T>> for FlatGrid<T> {
    fn eq(&self, other: &JaggedGrid<T>) -> bool {
        other == self
    }
}
