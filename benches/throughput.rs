use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use criterion::{criterion_group, criterion_main, Criterion};
use formrules::{
    evaluate_rules, field, require, show, FieldKind, FormSchema, Functions, RuleContext,
    RuleOrder, RuleSet, RuleSetBuilder,
};

struct Shared {
    rules: RuleSet,
    schema: FormSchema,
    functions: Functions,
}

fn build_shared() -> (Arc<Shared>, RuleContext) {
    let n = 20;
    let mut builder = RuleSetBuilder::new();
    let mut schema = FormSchema::new();
    let mut ctx = RuleContext::new();

    for i in 0..n {
        let field_name = format!("f{i}");
        let target = format!("t{i}");
        let (f, t) = (field_name.clone(), target.clone());
        builder = builder.rule(&format!("r{i}"), move |r| {
            r.when(field(&f).greater_than_or_equal(1_i64))
                .then(show(&t))
                .then(require(&t))
        });
        schema = schema
            .field(&field_name, FieldKind::Integer)
            .field(&target, FieldKind::Text);
        ctx = ctx.with_field(&field_name, 10_i64);
    }

    let shared = Arc::new(Shared {
        rules: builder.build().unwrap(),
        schema,
        functions: Functions::with_builtin_transforms(),
    });
    (shared, ctx)
}

fn bench_throughput(c: &mut Criterion) {
    let thread_counts = [1, 2, 4, 8];

    let mut group = c.benchmark_group("throughput");
    group.measurement_time(Duration::from_secs(5));

    for &threads in &thread_counts {
        let (shared, ctx) = build_shared();

        group.bench_function(format!("{threads}_threads"), |b| {
            b.iter_custom(|iters| {
                let per_thread = iters / threads as u64;
                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let shared = Arc::clone(&shared);
                        let ctx = ctx.clone();
                        thread::spawn(move || {
                            let start = Instant::now();
                            for _ in 0..per_thread {
                                let _ = evaluate_rules(
                                    shared.rules.rules(),
                                    &ctx,
                                    &shared.functions,
                                    &shared.schema,
                                    RuleOrder::Declaration,
                                );
                            }
                            start.elapsed()
                        })
                    })
                    .collect();

                let mut max_elapsed = Duration::ZERO;
                for h in handles {
                    let elapsed = h.join().unwrap();
                    if elapsed > max_elapsed {
                        max_elapsed = elapsed;
                    }
                }
                max_elapsed
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_throughput);
criterion_main!(benches);
