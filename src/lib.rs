//! A declarative rule engine for schema-driven forms.
//!
//! Rules pair a [`Condition`] over the current form values with a list of
//! [`RuleAction`]s. A [`FormEngine`] re-evaluates every rule after each field
//! change and folds the resulting effects into per-field [`FieldConfig`]s
//! (visibility, enabled, required, messages, classes, options).
//!
//! ```
//! use formrules::{field, hide, FieldKind, FormEngine, FormSchema, MemoryBinding, RuleBuilder};
//!
//! let schema = FormSchema::new()
//!     .field("maritalStatus", FieldKind::Text)
//!     .field("spouseName", FieldKind::Text);
//! let rule = RuleBuilder::new()
//!     .when(field("maritalStatus").not_equals("married"))
//!     .then(hide("spouseName"))
//!     .build()
//!     .unwrap();
//!
//! let binding = MemoryBinding::new().with_value("maritalStatus", "single");
//! let mut engine = FormEngine::builder(binding, schema).rule(rule).build();
//! assert!(!engine.field_config("spouseName").visible);
//!
//! let change = engine.binding_mut().update("maritalStatus", "married");
//! engine.notify(change);
//! // State is sticky: nothing shows the field again.
//! assert!(!engine.field_config("spouseName").visible);
//! ```

mod binding;
mod engine;
mod error;
mod evaluate;
mod operators;
mod orchestrate;
pub mod parse;
mod resolve;
mod schema;
mod state;
mod types;
mod validate;

pub use binding::{FieldChange, FormBinding, MemoryBinding};
pub use engine::{CustomActionFn, EngineBuilder, FormEngine};
pub use error::FormRulesError;
pub use evaluate::{evaluate, evaluate_base, evaluate_complex};
pub use operators::compare;
pub use orchestrate::{evaluate_rules, Effect, Evaluation, RuleFailure, RuleOrder};
pub use parse::{parse, parse_condition, ParseError};
pub use resolve::resolve;
pub use schema::{FieldKind, FieldSchema, FormSchema};
pub use state::{reduce, RuleState, StateAction};
pub use types::{
    add_class, all, any, call, clear_value, context_ref, custom, disable, enable, field,
    field_prop, field_ref, hide, not, optional, remove_class, require, set_options, set_value,
    show, show_error, show_warning, trigger_validation, ActionError, ActionKind, BaseCondition,
    ComplexCondition, Condition, CustomFn, DynamicValue, EngineError, EvalError, FieldCondition,
    FieldConfig, FormData, FunctionError, Functions, Logic, MalformedRule, Operator, Rule,
    RuleAction, RuleBuilder, RuleContext, RuleSet, RuleSetBuilder, TransformFn, Value,
};
pub use validate::{validate_rule, validate_rules};
