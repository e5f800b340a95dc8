//! Benchmarks for book reconstruction and snapshot rendering.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use mbp_reconstructor::{mbp, Action, MboEvent, OrderBook, Side};

fn create_test_events(count: usize) -> Vec<MboEvent> {
    let mut events = Vec::with_capacity(count);
    let base_price: i64 = 100_000_000_000; // $100.00

    for i in 0..count {
        let order_id = (i + 1) as u64;
        let is_bid = i % 2 == 0;
        let price_offset = ((i % 10) as i64) * 10_000_000; // 0.01 increments

        let price = if is_bid {
            base_price - price_offset
        } else {
            base_price + 10_000_000 + price_offset
        };

        events.push(MboEvent::new(
            order_id,
            Action::Add,
            if is_bid { Side::Bid } else { Side::Ask },
            price,
            ((i % 100) + 1) as u32,
        ));
    }

    events
}

/// Adds followed by the feed's Trade/Fill/Cancel execution triples, so the
/// sequence-matching path is exercised too.
fn create_execution_events(count: usize) -> Vec<MboEvent> {
    let mut events = Vec::with_capacity(count * 4);
    let base_price: i64 = 100_000_000_000;

    for i in 0..count {
        let order_id = (i + 1) as u64;
        events.push(MboEvent::new(
            order_id,
            Action::Add,
            Side::Bid,
            base_price - ((i % 10) as i64) * 10_000_000,
            100,
        ));
        events.push(MboEvent::new(0, Action::Trade, Side::Ask, base_price, 100));
        events.push(MboEvent::new(
            order_id,
            Action::Fill,
            Side::Bid,
            base_price,
            100,
        ));
        events.push(MboEvent::new(
            order_id,
            Action::Cancel,
            Side::Bid,
            base_price,
            100,
        ));
    }

    events
}

fn bench_reconstruction(c: &mut Criterion) {
    let events = create_test_events(10_000);

    let mut group = c.benchmark_group("reconstruction");
    group.throughput(Throughput::Elements(events.len() as u64));

    group.bench_function("apply_adds", |b| {
        b.iter(|| {
            let mut book = OrderBook::new();
            for event in &events {
                book.apply(black_box(event));
            }
            black_box(book.order_count())
        })
    });

    let executions = create_execution_events(2_500);
    group.throughput(Throughput::Elements(executions.len() as u64));

    group.bench_function("apply_execution_sequences", |b| {
        b.iter(|| {
            let mut book = OrderBook::new();
            for event in &executions {
                book.apply(black_box(event));
            }
            black_box(book.stats().sequences_resolved)
        })
    });

    group.finish();
}

fn bench_rendering(c: &mut Criterion) {
    // Build a populated book first
    let events = create_test_events(100);
    let mut book = OrderBook::new();
    for event in &events {
        book.apply(event);
    }
    let trigger = &events[events.len() - 1];

    let mut group = c.benchmark_group("rendering");

    group.bench_function("top_levels", |b| {
        b.iter(|| black_box(book.top_levels(Side::Bid, 10)))
    });

    group.bench_function("render_row", |b| {
        b.iter(|| black_box(mbp::render(&book, trigger, 0)))
    });

    group.finish();
}

criterion_group!(benches, bench_reconstruction, bench_rendering);
criterion_main!(benches);
