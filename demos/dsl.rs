use formrules::{FieldKind, FormEngine, FormSchema, MemoryBinding, RuleSet};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let rules = RuleSet::from_file("demos/rules.form").expect("failed to load rules");
    for rule in &rules {
        println!("{}: when {}", rule.label(), rule.condition);
    }
    println!();

    let schema = FormSchema::new()
        .field("maritalStatus", FieldKind::Text)
        .field("spouseName", FieldKind::Text)
        .field("age", FieldKind::Integer)
        .field("guardian", FieldKind::Text)
        .field("country", FieldKind::Text)
        .field("state", FieldKind::Choice(vec!["CA".into(), "NY".into(), "TX".into()]))
        .field("email", FieldKind::Text);
    let binding = MemoryBinding::new()
        .with_value("maritalStatus", "married")
        .with_value("age", 16_i64)
        .with_value("country", "us")
        .with_value("email", "not-an-email");

    let engine = FormEngine::builder(binding, schema).rules(rules).build();
    for (name, config) in engine.field_configs() {
        println!("{name:>14}: {config}");
    }
}
