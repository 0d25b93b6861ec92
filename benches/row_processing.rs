use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use sheet_mapper::{Execution, Fields, Processor, ProcessorOptions, Record};

#[derive(Debug, Clone, Default)]
struct Order {
    id: String,
    placed: String,
    status: i32,
    quantity: u32,
    amount: f64,
}

impl Record for Order {
    fn describe(fields: &mut Fields<Self>) {
        fields
            .field("id", "name(Order);unique(true)", |o| &mut o.id)
            .field("placed", "name(Placed);date(01-02-06,2006-01-02)", |o| &mut o.placed)
            .field("status", "name(Status);mapping(new:1,paid:2,shipped:3)", |o| &mut o.status)
            .field("quantity", "name(Qty)", |o| &mut o.quantity)
            .field("amount", "name(Amount)", |o| &mut o.amount);
    }
}

fn sheet(rows: usize) -> Vec<Vec<String>> {
    let statuses = ["new", "paid", "shipped"];
    let mut out = vec![
        ["Order", "Placed", "Status", "Qty", "Amount"]
            .map(String::from)
            .to_vec(),
    ];
    out.extend((0..rows).map(|i| {
        vec![
            format!("ORD-{i:06}"),
            format!("{:02}-{:02}-24", i % 12 + 1, i % 28 + 1),
            statuses[i % statuses.len()].to_string(),
            (i % 40).to_string(),
            format!("{}.{:02}", i % 900, i % 100),
        ]
    }));
    out
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for rows in [100_usize, 500, 5_000] {
        let data = sheet(rows);
        for (label, execution) in [
            ("sequential", Execution::Sequential),
            ("parallel", Execution::Parallel { num_threads: None }),
        ] {
            let processor = Processor::with_options(
                Order::default(),
                ProcessorOptions {
                    max_data_rows: None,
                    execution,
                    ..Default::default()
                },
            )
            .unwrap();
            group.bench_with_input(BenchmarkId::new(label, rows), &data, |b, data| {
                b.iter(|| black_box(processor.parse(data.clone(), 1, 2).unwrap()))
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
