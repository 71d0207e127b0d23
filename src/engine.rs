//! The evaluation cycle controller.
//!
//! A [`FormEngine`] owns everything one form needs: the live binding, the
//! schema, the rule list, the function registry, a context template and the
//! [`RuleState`]. Every change runs exactly one cycle:
//!
//! 1. `InitializeFields` over the schema's declared names,
//! 2. [`evaluate_rules`] against a fresh form-data snapshot,
//! 3. each [`Effect`] applied in order (reducer, binding or custom callback).
//!
//! Cycles take `&mut self` and run to completion, so two cycles can never
//! overlap.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, trace};

use crate::orchestrate::{evaluate_rules, Effect, Evaluation, RuleOrder};
use crate::state::{reduce, RuleState, StateAction};
use crate::{
    EngineError, FieldChange, FieldConfig, FieldSchema, FormBinding, FunctionError, Functions,
    Rule, RuleAction, RuleContext, Value,
};

/// Host callback for `custom` actions.
pub type CustomActionFn = Box<dyn FnMut(&RuleAction, &RuleContext) + Send>;

pub struct FormEngine<B, S> {
    binding: B,
    schema: S,
    rules: Vec<Rule>,
    functions: Functions,
    context: RuleContext,
    on_custom: Option<CustomActionFn>,
    order: RuleOrder,
    state: RuleState,
    last: Evaluation,
}

/// Builder for a [`FormEngine`]. Created by [`FormEngine::builder`].
///
/// ```
/// use formrules::{field, show, FieldKind, FormEngine, FormSchema, MemoryBinding, Rule};
///
/// let schema = FormSchema::new()
///     .field("maritalStatus", FieldKind::Text)
///     .field("spouseName", FieldKind::Text);
/// let binding = MemoryBinding::new().with_value("maritalStatus", "married");
///
/// let engine = FormEngine::builder(binding, schema)
///     .rule(Rule::new(
///         field("maritalStatus").equals("married"),
///         vec![show("spouseName")],
///     ))
///     .build();
///
/// assert!(engine.field_config("spouseName").visible);
/// ```
pub struct EngineBuilder<B, S> {
    binding: B,
    schema: S,
    rules: Vec<Rule>,
    functions: Functions,
    context: RuleContext,
    on_custom: Option<CustomActionFn>,
    order: RuleOrder,
}

impl<B: FormBinding, S: FieldSchema> EngineBuilder<B, S> {
    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    #[must_use]
    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Replace the function and transform registry.
    #[must_use]
    pub fn functions(mut self, functions: Functions) -> Self {
        self.functions = functions;
        self
    }

    #[must_use]
    pub fn function(
        mut self,
        name: &str,
        f: impl Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync + 'static,
    ) -> Self {
        self.functions.insert_function(name, f);
        self
    }

    #[must_use]
    pub fn transform(mut self, name: &str, f: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        self.functions.insert_transform(name, f);
        self
    }

    /// Context template. Its form data is replaced by the binding's values on
    /// every cycle.
    #[must_use]
    pub fn context(mut self, context: RuleContext) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn on_custom(mut self, f: impl FnMut(&RuleAction, &RuleContext) + Send + 'static) -> Self {
        self.on_custom = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn order(mut self, order: RuleOrder) -> Self {
        self.order = order;
        self
    }

    /// Build the engine and run the first cycle.
    pub fn build(self) -> FormEngine<B, S> {
        let mut engine = FormEngine {
            binding: self.binding,
            schema: self.schema,
            rules: self.rules,
            functions: self.functions,
            context: self.context,
            on_custom: self.on_custom,
            order: self.order,
            state: RuleState::new(),
            last: Evaluation::default(),
        };
        engine.run_cycle();
        engine
    }
}

impl<B: FormBinding, S: FieldSchema> FormEngine<B, S> {
    /// Start configuring an engine over a binding and schema.
    ///
    /// The builder starts with no rules, the built-in transforms,
    /// [`RuleOrder::Declaration`] and an empty context.
    pub fn builder(binding: B, schema: S) -> EngineBuilder<B, S> {
        EngineBuilder {
            binding,
            schema,
            rules: Vec::new(),
            functions: Functions::with_builtin_transforms(),
            context: RuleContext::new(),
            on_custom: None,
            order: RuleOrder::Declaration,
        }
    }

    /// React to a change in the live form.
    ///
    /// The cycle reads the binding's current values; the change itself is
    /// only traced.
    pub fn notify(&mut self, change: FieldChange) -> &Evaluation {
        match &change {
            FieldChange::Field { name, value } => {
                trace!(field = %name, value = ?value, "field changed");
            }
            FieldChange::Any => trace!("form changed"),
        }
        self.run_cycle()
    }

    /// Replace the rule list and re-evaluate.
    pub fn set_rules(&mut self, rules: Vec<Rule>) -> &Evaluation {
        self.rules = rules;
        self.run_cycle()
    }

    /// Replace the schema and re-evaluate. State of fields that are no longer
    /// declared is kept.
    pub fn set_schema(&mut self, schema: S) -> &Evaluation {
        self.schema = schema;
        self.run_cycle()
    }

    /// Replace the context template and re-evaluate.
    pub fn set_context(&mut self, context: RuleContext) -> &Evaluation {
        self.context = context;
        self.run_cycle()
    }

    /// Re-run the rules against the current form values.
    pub fn evaluate_rules(&mut self) -> &Evaluation {
        self.run_cycle()
    }

    fn run_cycle(&mut self) -> &Evaluation {
        let ctx = self.snapshot_context();
        reduce(
            &mut self.state,
            StateAction::InitializeFields(self.schema.field_names()),
        );
        let evaluation = evaluate_rules(&self.rules, &ctx, &self.functions, &self.schema, self.order);
        for effect in evaluation.effects() {
            self.apply(effect, &ctx);
        }
        debug!(
            rules = self.rules.len(),
            fired = evaluation.fired().len(),
            failures = evaluation.failures().len(),
            duration = ?evaluation.duration(),
            "evaluation cycle complete"
        );
        self.last = evaluation;
        &self.last
    }

    fn snapshot_context(&self) -> RuleContext {
        let mut ctx = self.context.clone();
        ctx.form_data = self.binding.values();
        ctx
    }

    fn apply(&mut self, effect: &Effect, ctx: &RuleContext) {
        match effect {
            Effect::State(action) => reduce(&mut self.state, action.clone()),
            Effect::SetValue { field, value } => {
                if self.binding.value(field).as_ref() == Some(value) {
                    trace!(%field, "set_value leaves an unchanged field alone");
                } else {
                    self.binding.set_value(field, Some(value.clone()));
                }
            }
            Effect::ClearValue { field } => {
                self.binding.set_value(field, None);
                self.binding.clear_error(field);
            }
            Effect::Custom(action) => match self.on_custom.as_mut() {
                Some(callback) => callback(action, ctx),
                None => trace!(action = %action, "no custom action handler installed"),
            },
        }
    }

    /// Current configuration of a field. Unknown fields report defaults.
    pub fn field_config(&self, field: &str) -> FieldConfig {
        self.state.field_config(field)
    }

    /// Configuration of every field with state.
    #[must_use]
    pub fn field_configs(&self) -> BTreeMap<String, FieldConfig> {
        self.state.snapshot()
    }

    /// Validate the named fields, or every declared field, publishing the
    /// messages through the binding. Returns whether all were valid.
    pub fn trigger_validation(&mut self, fields: Option<&[&str]>) -> bool {
        let names: Vec<String> = match fields {
            Some(fields) => fields.iter().map(|f| (*f).to_owned()).collect(),
            None => self.schema.field_names(),
        };
        let mut valid = true;
        for name in &names {
            let value = self.binding.value(name).unwrap_or_default();
            match self.schema.validate(name, &value) {
                Ok(()) => self.binding.clear_error(name),
                Err(messages) => {
                    debug!(field = %name, ?messages, "field failed validation");
                    self.binding.set_errors(name, messages);
                    valid = false;
                }
            }
        }
        valid
    }

    /// Reset a field's live value and clear its validation error.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownField`] when the schema does not declare `field`.
    pub fn clear_field_value(&mut self, field: &str) -> Result<(), EngineError> {
        self.check_declared(field)?;
        self.binding.set_value(field, None);
        self.binding.clear_error(field);
        Ok(())
    }

    /// Show a declared field.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownField`] when the schema does not declare `field`.
    pub fn show(&mut self, field: &str) -> Result<(), EngineError> {
        self.dispatch(field, |field| StateAction::SetVisible { field, visible: true })
    }

    /// Hide a declared field.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownField`] when the schema does not declare `field`.
    pub fn hide(&mut self, field: &str) -> Result<(), EngineError> {
        self.dispatch(field, |field| StateAction::SetVisible { field, visible: false })
    }

    /// # Errors
    ///
    /// [`EngineError::UnknownField`] when the schema does not declare `field`.
    pub fn enable(&mut self, field: &str) -> Result<(), EngineError> {
        self.dispatch(field, |field| StateAction::SetDisabled { field, disabled: false })
    }

    /// # Errors
    ///
    /// [`EngineError::UnknownField`] when the schema does not declare `field`.
    pub fn disable(&mut self, field: &str) -> Result<(), EngineError> {
        self.dispatch(field, |field| StateAction::SetDisabled { field, disabled: true })
    }

    /// Set a declared field's required flag.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownField`] when the schema does not declare `field`.
    pub fn require(&mut self, field: &str, required: bool) -> Result<(), EngineError> {
        self.dispatch(field, |field| StateAction::SetRequired { field, required })
    }

    /// Write a value after checking it against the schema.
    ///
    /// # Errors
    ///
    /// [`EngineError::UnknownField`] for undeclared fields,
    /// [`EngineError::ValidationRejected`] when the schema rejects the value.
    pub fn set_value_safe(&mut self, field: &str, value: impl Into<Value>) -> Result<(), EngineError> {
        self.check_declared(field)?;
        let value = value.into();
        self.schema
            .validate(field, &value)
            .map_err(|messages| EngineError::ValidationRejected {
                field: field.to_owned(),
                messages,
            })?;
        self.binding.set_value(field, Some(value));
        Ok(())
    }

    /// Write a value without any schema check.
    pub fn set_value_unsafe(&mut self, field: &str, value: impl Into<Value>) {
        self.binding.set_value(field, Some(value.into()));
    }

    fn dispatch(
        &mut self,
        field: &str,
        action: impl FnOnce(String) -> StateAction,
    ) -> Result<(), EngineError> {
        self.check_declared(field)?;
        reduce(&mut self.state, action(field.to_owned()));
        Ok(())
    }

    fn check_declared(&self, field: &str) -> Result<(), EngineError> {
        if self.schema.declares(field) {
            Ok(())
        } else {
            Err(EngineError::UnknownField {
                field: field.to_owned(),
            })
        }
    }

    /// Diagnostics of the most recent cycle.
    pub fn last_evaluation(&self) -> &Evaluation {
        &self.last
    }

    #[must_use]
    pub fn state(&self) -> &RuleState {
        &self.state
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    #[must_use]
    pub fn binding(&self) -> &B {
        &self.binding
    }

    /// Mutable access to the binding. Call [`notify`](Self::notify) after
    /// changing values through it.
    pub fn binding_mut(&mut self) -> &mut B {
        &mut self.binding
    }

    #[must_use]
    pub fn schema(&self) -> &S {
        &self.schema
    }

    #[must_use]
    pub fn context(&self) -> &RuleContext {
        &self.context
    }
}

impl<B: fmt::Debug, S: fmt::Debug> fmt::Debug for FormEngine<B, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormEngine")
            .field("binding", &self.binding)
            .field("schema", &self.schema)
            .field("rules", &self.rules.len())
            .field("functions", &self.functions)
            .field("order", &self.order)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
