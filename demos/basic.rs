use formrules::{
    field, hide, require, show, FieldKind, FormEngine, FormSchema, MemoryBinding, RuleSetBuilder,
};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let rules = RuleSetBuilder::new()
        .rule("show_spouse", |r| {
            r.when(field("maritalStatus").equals("married"))
                .then(show("spouseName"))
                .then(require("spouseName"))
        })
        .rule("hide_spouse", |r| {
            r.when(field("maritalStatus").not_equals("married"))
                .then(hide("spouseName"))
        })
        .build()
        .expect("failed to build rules");

    let schema = FormSchema::new()
        .field("maritalStatus", FieldKind::Text)
        .field("spouseName", FieldKind::Text);
    let binding = MemoryBinding::new().with_value("maritalStatus", "single");

    let mut engine = FormEngine::builder(binding, schema).rules(rules).build();
    println!("single:  spouseName {}", engine.field_config("spouseName"));

    let change = engine.binding_mut().update("maritalStatus", "married");
    engine.notify(change);
    println!("married: spouseName {}", engine.field_config("spouseName"));
}
