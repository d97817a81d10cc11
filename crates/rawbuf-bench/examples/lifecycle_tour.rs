//! End-to-end tour of the container lifecycle.
//!
//! Demonstrates: allocate → write → resize → snapshot → deallocate for
//! the array, then coordinate-preserving resizes for both grid layouts.

use rawbuf_array::RawArray;
use rawbuf_bench::seeded_values;
use rawbuf_core::InitMode;
use rawbuf_grid::{FlatGrid, JaggedGrid};

fn main() {
    println!("=== Rawbuf Lifecycle Tour ===\n");

    // --- Part 1: the 1D array ---
    println!("Part 1: RawArray");
    let values = seeded_values(42, 8);
    let mut buf = RawArray::<u64>::new();
    buf.from_slice(&values).unwrap();
    println!("  imported {} elements ({} bytes)", buf.len(), buf.byte_len());

    let mut span = buf.span().unwrap();
    buf.resize(12, InitMode::Zeroed).unwrap();
    span.resync(&buf).unwrap();
    // SAFETY: the span was just resynced and the array is untouched since.
    let tail = unsafe { span.get(11).unwrap() };
    println!("  grew to {} elements; new tail reads {}", buf.len(), tail);

    buf.dealloc();
    println!("  released; allocated = {}\n", buf.is_allocated());

    // --- Part 2: the flat grid ---
    println!("Part 2: FlatGrid (one buffer, repacked on resize)");
    let mut flat = FlatGrid::<i32>::new();
    flat.alloc(4, 3, InitMode::Zeroed).unwrap();
    for y in 0..3 {
        for x in 0..4 {
            flat.set(x, y, (10 * y + x) as i32).unwrap();
        }
    }
    print_grid("before", &flat);

    flat.resize(6, 2, InitMode::Zeroed).unwrap();
    print_grid("after resize to 6x2", &flat);

    // --- Part 3: the jagged grid tracks the same semantics ---
    println!("Part 3: JaggedGrid (one buffer per row)");
    let mut jagged = JaggedGrid::<i32>::new();
    jagged.from_rows(&flat.to_rows().unwrap()).unwrap();
    jagged.resize(3, 4, InitMode::Zeroed).unwrap();
    let mut flat2 = FlatGrid::<i32>::new();
    flat2.from_rows(&flat.to_rows().unwrap()).unwrap();
    flat2.resize(3, 4, InitMode::Zeroed).unwrap();
    println!(
        "  after identical resizes, layouts agree: {}",
        jagged == flat2
    );

    println!("\n=== done ===");
}

fn print_grid(label: &str, grid: &FlatGrid<i32>) {
    println!("  {label} ({}x{}):", grid.width(), grid.height());
    for y in 0..grid.height() {
        print!("   ");
        for &v in grid.row(y).unwrap() {
            print!(" {v:3}");
        }
        println!();
    }
}
