//! Screen benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use netterm::core::Screen;
use netterm::Terminal;

fn bench_screen_print(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    group.bench_function("print_chars", |b| {
        b.iter(|| {
            let mut screen = Screen::new(24, 80);
            for ch in "Hello, World! ".chars() {
                screen.print_char(ch);
            }
            black_box(screen)
        })
    });

    group.finish();
}

fn bench_screen_scroll(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    // Fill well past the bottom so every line scrolls
    group.bench_function("scroll", |b| {
        b.iter(|| {
            let mut screen = Screen::new(24, 80);
            for i in 0..100 {
                for ch in format!("Line {}: Some text content here", i).chars() {
                    screen.print_char(ch);
                }
                screen.linefeed();
            }
            black_box(screen)
        })
    });

    group.finish();
}

fn bench_terminal_csi(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    // Parse and apply through the full executor pipeline
    let input = "\x1b[H\x1b[2J\x1b[1;31mHello\x1b[0m".repeat(100);
    group.throughput(Throughput::Bytes(input.len() as u64));

    group.bench_function("csi_apply", |b| {
        b.iter(|| {
            let mut terminal = Terminal::new(24, 80);
            terminal.process(black_box(input.as_bytes()));
            black_box(terminal.snapshot())
        })
    });

    group.finish();
}

fn bench_terminal_full_redraw(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    // Simulate a full screen redraw (like vim opening)
    let mut setup_input = String::new();
    for row in 1..=24 {
        setup_input.push_str(&format!("\x1b[{};1H", row));
        setup_input.push_str(&"X".repeat(80));
    }

    group.throughput(Throughput::Bytes(setup_input.len() as u64));

    group.bench_function("full_redraw", |b| {
        b.iter(|| {
            let mut terminal = Terminal::new(24, 80);
            terminal.process(black_box(setup_input.as_bytes()));
            black_box(terminal.snapshot())
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_screen_print,
    bench_screen_scroll,
    bench_terminal_csi,
    bench_terminal_full_redraw
);

criterion_main!(benches);
