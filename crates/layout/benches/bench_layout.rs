use std::hint::black_box;
use std::time::Instant;

use glowgrid_layout::layout;

fn bench_layout(count: usize, iterations: usize) {
    let start = Instant::now();
    for _ in 0..iterations {
        let _ = black_box(layout(black_box(count), black_box(3.0)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  layout ({count} cells, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn main() {
    println!("=== Grid Layout Benchmarks ===\n");

    bench_layout(9, 100_000);
    bench_layout(1_000, 10_000);
    bench_layout(10_000, 1_000);

    println!("\n=== Done ===");
}
