use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::evaluate::evaluate;
use crate::resolve::resolve;
use crate::state::StateAction;
use crate::{
    ActionError, ActionKind, DynamicValue, EvalError, FieldSchema, Functions, Rule, RuleAction, RuleContext,
    Value,
};

/// Order in which rules are evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RuleOrder {
    /// List order. Priorities are metadata only.
    #[default]
    Declaration,
    /// Ascending priority, stable for equal priorities. Rules without a
    /// priority run last, in list order.
    Priority,
}

/// A side effect produced by a fired rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// A field-state transition for the reducer.
    State(StateAction),
    /// Write a validated value to the live form. Appliers skip the write
    /// when the field already holds the value at the time the effect is
    /// applied, since earlier effects of the same pass may have changed it.
    SetValue { field: String, value: Value },
    /// Reset a field's live value and clear its validation error.
    ClearValue { field: String },
    /// A `custom` action for the host callback, unmodified.
    Custom(RuleAction),
}

/// A rule whose condition could not be evaluated. The rule counted as false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFailure {
    pub rule: String,
    pub error: EvalError,
}

/// Result of one pass over a rule list.
///
/// Carries the ordered effects together with diagnostics: which rules fired,
/// which were skipped as disabled, which failed, which actions were dropped,
/// and how long the pass took.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct Evaluation {
    effects: Vec<Effect>,
    fired: Vec<String>,
    skipped: Vec<String>,
    failures: Vec<RuleFailure>,
    action_errors: Vec<ActionError>,
    duration: Duration,
}

impl Evaluation {
    /// Effects of every fired rule, in rule then action order.
    #[must_use]
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    #[must_use]
    pub fn into_effects(self) -> Vec<Effect> {
        self.effects
    }

    /// Labels of rules whose condition held, in evaluation order.
    #[must_use]
    pub fn fired(&self) -> &[String] {
        &self.fired
    }

    /// Labels of disabled rules.
    #[must_use]
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    #[must_use]
    pub fn failures(&self) -> &[RuleFailure] {
        &self.failures
    }

    #[must_use]
    pub fn action_errors(&self) -> &[ActionError] {
        &self.action_errors
    }

    /// Wall-clock duration of the pass.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    #[must_use]
    pub fn has_fired(&self, rule: &str) -> bool {
        self.fired.iter().any(|r| r == rule)
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fired: [{}]", self.fired.join(", "))?;
        if !self.skipped.is_empty() {
            write!(f, ", skipped: [{}]", self.skipped.join(", "))?;
        }
        write!(f, ", effects: {}", self.effects.len())?;
        if !self.failures.is_empty() {
            write!(f, ", failures: {}", self.failures.len())?;
        }
        if !self.action_errors.is_empty() {
            write!(f, ", action errors: {}", self.action_errors.len())?;
        }
        write!(f, ", duration: {:?}", self.duration)
    }
}

/// Evaluate every enabled rule against one form-data snapshot.
///
/// A rule that fails to evaluate is logged, recorded in
/// [`Evaluation::failures`] and treated as false; the remaining rules still
/// run. Actions of a fired rule become [`Effect`]s in declaration order.
pub fn evaluate_rules<S: FieldSchema + ?Sized>(
    rules: &[Rule],
    ctx: &RuleContext,
    functions: &Functions,
    schema: &S,
    order: RuleOrder,
) -> Evaluation {
    let start = Instant::now();
    let mut out = Evaluation::default();

    for rule in ordered(rules, order) {
        let label = rule.label();
        if !rule.enabled {
            trace!(rule = %label, "skipping disabled rule");
            out.skipped.push(label);
            continue;
        }
        match evaluate(&rule.condition, ctx, functions) {
            Ok(true) => {
                debug!(rule = %label, actions = rule.actions.len(), "rule fired");
                for action in &rule.actions {
                    apply_action(rule, &label, action, ctx, functions, schema, &mut out);
                }
                out.fired.push(label);
            }
            Ok(false) => trace!(rule = %label, "rule did not fire"),
            Err(error) => {
                warn!(rule = %label, %error, "rule failed to evaluate, treating as false");
                out.failures.push(RuleFailure { rule: label, error });
            }
        }
    }

    out.duration = start.elapsed();
    out
}

fn ordered(rules: &[Rule], order: RuleOrder) -> Vec<&Rule> {
    let mut ordered: Vec<&Rule> = rules.iter().collect();
    if order == RuleOrder::Priority {
        ordered.sort_by_key(|r| (r.priority.is_none(), r.priority));
    }
    ordered
}

fn apply_action<S: FieldSchema + ?Sized>(
    rule: &Rule,
    label: &str,
    action: &RuleAction,
    ctx: &RuleContext,
    functions: &Functions,
    schema: &S,
    out: &mut Evaluation,
) {
    if let ActionKind::Custom { .. } = action.kind {
        out.effects.push(Effect::Custom(action.clone()));
        return;
    }
    let Some(target) = rule.target_of(action) else {
        out.action_errors.push(ActionError::MissingTarget {
            rule: label.to_owned(),
            action: action.kind.name().to_owned(),
        });
        return;
    };
    let field = target.to_owned();

    let state = Effect::State;
    match &action.kind {
        ActionKind::Show | ActionKind::Hide => out.effects.push(state(StateAction::SetVisible {
            field,
            visible: matches!(action.kind, ActionKind::Show),
        })),
        ActionKind::Enable | ActionKind::Disable => {
            out.effects.push(state(StateAction::SetDisabled {
                field,
                disabled: matches!(action.kind, ActionKind::Disable),
            }));
        }
        ActionKind::SetValue { value, required } => {
            if let Some(required) = required {
                out.effects.push(state(StateAction::SetRequired {
                    field: field.clone(),
                    required: *required,
                }));
            }
            if let Some(value) = value {
                set_value(field, value, action, ctx, functions, schema, out);
            }
        }
        ActionKind::ClearValue => out.effects.push(Effect::ClearValue { field }),
        ActionKind::ShowWarning { message } => out.effects.push(state(StateAction::AddWarning {
            field,
            message: message.clone(),
        })),
        ActionKind::ShowError { message } => out.effects.push(state(StateAction::AddError {
            field,
            message: message.clone(),
        })),
        ActionKind::AddClass { class } => out.effects.push(state(StateAction::AddClass {
            field,
            class: class.clone(),
        })),
        ActionKind::RemoveClass { class } => out.effects.push(state(StateAction::RemoveClass {
            field,
            class: class.clone(),
        })),
        ActionKind::SetOptions { options } => match resolve(options, ctx, functions) {
            Ok(resolved) => {
                let options = match resolved {
                    Some(Value::Array(items)) => items,
                    Some(other) => vec![other],
                    None => Vec::new(),
                };
                out.effects
                    .push(state(StateAction::SetOptions { field, options }));
            }
            Err(source) => {
                warn!(%field, error = %source, "set_options payload failed to resolve");
                out.action_errors.push(ActionError::Resolve {
                    field,
                    action: action.kind.name().to_owned(),
                    source,
                });
            }
        },
        ActionKind::TriggerValidation => {
            trace!(%field, "trigger_validation is left to the caller");
        }
        ActionKind::Custom { .. } => {}
    }
}

fn set_value<S: FieldSchema + ?Sized>(
    field: String,
    value: &DynamicValue,
    action: &RuleAction,
    ctx: &RuleContext,
    functions: &Functions,
    schema: &S,
    out: &mut Evaluation,
) {
    let resolved = match resolve(value, ctx, functions) {
        Ok(Some(v)) => v,
        Ok(None) => {
            trace!(%field, "set_value payload resolved to nothing");
            return;
        }
        Err(source) => {
            warn!(%field, error = %source, "set_value payload failed to resolve");
            out.action_errors.push(ActionError::Resolve {
                field,
                action: action.kind.name().to_owned(),
                source,
            });
            return;
        }
    };
    if let Err(messages) = schema.validate(&field, &resolved) {
        warn!(%field, value = %resolved, ?messages, "set_value rejected by schema");
        out.action_errors
            .push(ActionError::ValidationRejected { field, messages });
        return;
    }
    out.effects.push(Effect::SetValue {
        field,
        value: resolved,
    });
}
