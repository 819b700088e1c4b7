use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use orderdesk_core::{ClientId, GoodId, OrderId};
use orderdesk_infra::{ConsistencyMode, InMemoryOrderGateway, OrderGateway, Reconciler};
use orderdesk_inventory::Good;
use orderdesk_sales::{AddGood, LinePlan, Order, OrderedGood};
use rust_decimal::Decimal;
use std::sync::Arc;

const STOCK: i64 = 1_000_000_000_000;

fn seeded_gateway(lines_per_order: i64) -> Arc<InMemoryOrderGateway> {
    let order_id = OrderId::new(1).unwrap();
    let mut gateway = InMemoryOrderGateway::new()
        .with_order(Order::new(order_id, ClientId::new(1).unwrap()))
        .with_good(Good::new(GoodId::new(1).unwrap(), "Bench good", STOCK, Decimal::ONE, None).unwrap());

    // Other goods already on the order, so the line lookup has something to scan.
    for i in 0..lines_per_order {
        let good_id = GoodId::new(i + 100).unwrap();
        gateway = gateway
            .with_good(Good::new(good_id, format!("Filler {i}"), 10, Decimal::ONE, None).unwrap())
            .with_line(OrderedGood::new(order_id, good_id, 1).unwrap());
    }

    Arc::new(gateway)
}

fn bench_add_good_by_mode(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let mut group = c.benchmark_group("add_good_by_mode");
    group.throughput(Throughput::Elements(1));

    for mode in [ConsistencyMode::Atomic, ConsistencyMode::BestEffort] {
        group.bench_with_input(BenchmarkId::new("merge_one_unit", mode), &mode, |b, &mode| {
            let reconciler = Reconciler::new(seeded_gateway(0), mode);
            let cmd = AddGood::new(OrderId::new(1).unwrap(), GoodId::new(1).unwrap(), 1).unwrap();

            b.iter(|| {
                let outcome = runtime
                    .block_on(reconciler.add_good_to_order(black_box(cmd)))
                    .unwrap();
                black_box(outcome);
            });
        });
    }

    group.finish();
}

fn bench_line_plan_by_order_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_plan_by_order_size");
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();

    for lines in [1i64, 10, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("for_command", lines), &lines, |b, &lines| {
            let gateway = seeded_gateway(lines);
            let existing = runtime
                .block_on(gateway.list_order_lines(OrderId::new(1).unwrap()))
                .unwrap();
            let cmd = AddGood::new(OrderId::new(1).unwrap(), GoodId::new(1).unwrap(), 1).unwrap();

            b.iter(|| black_box(LinePlan::for_command(black_box(&existing), &cmd).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_add_good_by_mode, bench_line_plan_by_order_size);
criterion_main!(benches);
