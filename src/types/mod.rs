mod action;
mod condition;
mod context;
mod dynamic;
mod error;
mod field_config;
mod functions;
mod operator;
mod rule;
mod ruleset;
mod value;

pub use action::{
    add_class, clear_value, custom, disable, enable, hide, optional, remove_class, require,
    set_options, set_value, show, show_error, show_warning, trigger_validation, ActionKind,
    RuleAction,
};
pub use condition::{
    all, any, field, not, BaseCondition, ComplexCondition, Condition, FieldCondition, Logic,
};
pub use context::{FormData, RuleContext};
pub use dynamic::{call, context_ref, field_prop, field_ref, DynamicValue};
pub use error::{ActionError, EngineError, EvalError, FunctionError, MalformedRule};
pub use field_config::FieldConfig;
pub use functions::{CustomFn, Functions, TransformFn};
pub use operator::Operator;
pub use rule::Rule;
pub use ruleset::{RuleBuilder, RuleSet, RuleSetBuilder};
pub use value::Value;
