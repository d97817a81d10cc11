//! Integration test: resize semantics under a long shape-change chain.
//!
//! Drives a `FlatGrid` and a `JaggedGrid` through the same deterministic
//! sequence of shape changes, mirrored against a plain `Vec<Vec<_>>`
//! model, and verifies after every step that all three agree cell for
//! cell. The flat grid repacks one buffer while the jagged grid
//! reallocates rows, so agreement here pins down the shared coordinate
//! semantics rather than any one layout.

use rawbuf_core::InitMode;
use rawbuf_grid::{FlatGrid, JaggedGrid};

// ── the reference model ──────────────────────────────────────────────

/// Resize a row-model the way the grids specify: keep the overlap, zero
/// everything that enters the extent.
fn resize_model(model: &mut Vec<Vec<i64>>, new_w: usize, new_h: usize) {
    for row in model.iter_mut() {
        row.resize(new_w, 0);
    }
    model.resize(new_h, vec![0; new_w]);
}

fn assert_all_agree(flat: &FlatGrid<i64>, jagged: &JaggedGrid<i64>, model: &[Vec<i64>]) {
    assert_eq!(flat.height(), model.len());
    assert_eq!(jagged.height(), model.len());
    for (y, row) in model.iter().enumerate() {
        assert_eq!(flat.row(y).unwrap(), &row[..], "flat row {y}");
        assert_eq!(jagged.row(y).unwrap(), &row[..], "jagged row {y}");
    }
    assert!(jagged == flat);
}

// ── deterministic shape walk ─────────────────────────────────────────

#[test]
fn both_layouts_agree_through_a_shape_walk() {
    // Pseudo-random but reproducible walk over dimensions 1..=13.
    let shapes: Vec<(usize, usize)> = (0u64..40)
        .map(|i| {
            let a = (i.wrapping_mul(2654435761) >> 16) as usize;
            let b = (i.wrapping_mul(40503) >> 8) as usize;
            (1 + a % 13, 1 + b % 13)
        })
        .collect();

    let (w0, h0) = shapes[0];
    let mut flat = FlatGrid::<i64>::new();
    let mut jagged = JaggedGrid::<i64>::new();
    flat.alloc(w0, h0, InitMode::Zeroed).unwrap();
    jagged.alloc(w0, h0, InitMode::Zeroed).unwrap();
    let mut model = vec![vec![0i64; w0]; h0];

    for (step, &(w, h)) in shapes.iter().enumerate().skip(1) {
        // Write a distinctive value into every cell so that the next
        // resize has real data to preserve.
        for y in 0..model.len() {
            for x in 0..model[0].len() {
                let v = (step * 100_000 + y * 100 + x) as i64;
                model[y][x] = v;
                flat.set(x, y, v).unwrap();
                jagged.set(x, y, v).unwrap();
            }
        }

        flat.resize(w, h, InitMode::Zeroed).unwrap();
        jagged.resize(w, h, InitMode::Zeroed).unwrap();
        resize_model(&mut model, w, h);

        assert_all_agree(&flat, &jagged, &model);
    }
}

// ── import/export across layouts ─────────────────────────────────────

#[test]
fn rows_imported_into_either_layout_export_identically() {
    let rows: Vec<Vec<i64>> = (0..7).map(|y| (0..5).map(|x| x * y).collect()).collect();

    let mut flat = FlatGrid::<i64>::new();
    flat.from_rows(&rows).unwrap();
    let mut jagged = JaggedGrid::<i64>::new();
    jagged.from_rows(&rows).unwrap();

    assert_eq!(flat.to_rows().unwrap(), rows);
    assert_eq!(jagged.to_rows().unwrap(), rows);
    assert!(flat == jagged);
}

// ── dealloc frees, not clears ────────────────────────────────────────

#[test]
fn dealloc_then_realloc_starts_from_the_init_mode() {
    let mut flat = FlatGrid::<i64>::new();
    flat.alloc(8, 8, InitMode::Zeroed).unwrap();
    flat.fill(-1).unwrap();
    flat.dealloc();
    assert_eq!(flat.byte_len(), 0);

    flat.alloc(4, 4, InitMode::Zeroed).unwrap();
    assert!(flat.as_slice().unwrap().iter().all(|&v| v == 0));

    let mut jagged = JaggedGrid::<i64>::new();
    jagged.alloc(8, 8, InitMode::Zeroed).unwrap();
    jagged.fill(-1).unwrap();
    jagged.dealloc();
    assert_eq!(jagged.byte_len(), 0);

    jagged.alloc(4, 4, InitMode::Zeroed).unwrap();
    assert!(jagged.to_rows().unwrap().iter().flatten().all(|&v| v == 0));
}
