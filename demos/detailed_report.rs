use formrules::{
    call, field, field_ref, set_value, show_warning, FieldKind, FormEngine, FormSchema,
    FunctionError, MemoryBinding, RuleSetBuilder, Value,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let rules = RuleSetBuilder::new()
        .rule("total", |r| {
            r.when(field("quantity").greater_than(0_i64))
                .then(set_value("total", call("times", vec![field_ref("quantity"), 12_i64.into()])))
        })
        .rule("bulk", |r| {
            r.when(field("quantity").greater_than_or_equal(100_i64))
                .then(show_warning("quantity", "Bulk orders ship separately"))
        })
        .rule("broken", |r| {
            r.when(field("quantity").equals(call("missing", vec![])))
                .then(show_warning("quantity", "unreachable"))
        })
        .rule("paused", |r| {
            r.when(field("quantity").is_empty())
                .then(show_warning("quantity", "Enter a quantity"))
                .disabled()
        })
        .build()
        .expect("failed to build rules");

    let schema = FormSchema::new()
        .field("quantity", FieldKind::Integer)
        .field("total", FieldKind::Integer);
    let binding = MemoryBinding::new().with_value("quantity", 150_i64);

    let engine = FormEngine::builder(binding, schema)
        .rules(rules)
        .function("times", |args| match args {
            [Value::Int(a), Value::Int(b)] => Ok(Value::Int(a * b)),
            _ => Err(FunctionError::new("times expects two integers")),
        })
        .build();

    let report = engine.last_evaluation();
    println!("{report}");
    println!();
    println!("Fired: {:?}", report.fired());
    println!("Skipped: {:?}", report.skipped());
    for failure in report.failures() {
        println!("Failed: {} ({})", failure.rule, failure.error);
    }
    for effect in report.effects() {
        println!("Effect: {effect:?}");
    }
    println!("Duration: {:?}", report.duration());
    println!();
    println!("quantity: {}", engine.field_config("quantity"));
}
