//! The field-state reducer.
//!
//! [`RuleState`] is the only mutable state of the engine. It is owned by the
//! caller (normally [`FormEngine`](crate::FormEngine)) and changed exclusively
//! through [`reduce`].

use std::collections::BTreeMap;

use crate::{FieldConfig, Value};

/// Per-field UI state, one map per [`FieldConfig`] dimension.
///
/// Maps are keyed by field name. A field that was initialized has an entry
/// in every map; a field only ever touched by an action may appear in a
/// subset of them, and reads fill the gaps with defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleState {
    visible: BTreeMap<String, bool>,
    required: BTreeMap<String, bool>,
    disabled: BTreeMap<String, bool>,
    warnings: BTreeMap<String, Vec<String>>,
    errors: BTreeMap<String, Vec<String>>,
    classes: BTreeMap<String, Vec<String>>,
    options: BTreeMap<String, Vec<Value>>,
}

/// The closed set of state transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum StateAction {
    /// Seed default state for fields that have none. Existing state is kept.
    InitializeFields(Vec<String>),
    SetVisible { field: String, visible: bool },
    SetDisabled { field: String, disabled: bool },
    SetRequired { field: String, required: bool },
    AddWarning { field: String, message: String },
    AddError { field: String, message: String },
    AddClass { field: String, class: String },
    RemoveClass { field: String, class: String },
    SetOptions { field: String, options: Vec<Value> },
}

impl StateAction {
    /// The field this action changes; `None` for `InitializeFields`.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            StateAction::InitializeFields(_) => None,
            StateAction::SetVisible { field, .. }
            | StateAction::SetDisabled { field, .. }
            | StateAction::SetRequired { field, .. }
            | StateAction::AddWarning { field, .. }
            | StateAction::AddError { field, .. }
            | StateAction::AddClass { field, .. }
            | StateAction::RemoveClass { field, .. }
            | StateAction::SetOptions { field, .. } => Some(field),
        }
    }
}

/// Apply one action to the state.
///
/// State is sticky: nothing here resets a field back to its defaults, so a
/// field hidden by a rule in an earlier cycle stays hidden until some rule
/// shows it again. Message and class additions are set-like, which keeps
/// repeated cycles over unchanged data from growing the lists.
pub fn reduce(state: &mut RuleState, action: StateAction) {
    match action {
        StateAction::InitializeFields(fields) => {
            let defaults = FieldConfig::default();
            for field in fields {
                state.visible.entry(field.clone()).or_insert(defaults.visible);
                state.required.entry(field.clone()).or_insert(defaults.required);
                state.disabled.entry(field.clone()).or_insert(defaults.disabled);
                state.warnings.entry(field.clone()).or_default();
                state.errors.entry(field.clone()).or_default();
                state.classes.entry(field.clone()).or_default();
                state.options.entry(field).or_default();
            }
        }
        StateAction::SetVisible { field, visible } => {
            state.visible.insert(field, visible);
        }
        StateAction::SetDisabled { field, disabled } => {
            state.disabled.insert(field, disabled);
        }
        StateAction::SetRequired { field, required } => {
            state.required.insert(field, required);
        }
        StateAction::AddWarning { field, message } => {
            push_unique(state.warnings.entry(field).or_default(), message);
        }
        StateAction::AddError { field, message } => {
            push_unique(state.errors.entry(field).or_default(), message);
        }
        StateAction::AddClass { field, class } => {
            push_unique(state.classes.entry(field).or_default(), class);
        }
        StateAction::RemoveClass { field, class } => {
            if let Some(classes) = state.classes.get_mut(&field) {
                classes.retain(|c| *c != class);
            }
        }
        StateAction::SetOptions { field, options } => {
            state.options.insert(field, options);
        }
    }
}

fn push_unique(list: &mut Vec<String>, item: String) {
    if !list.contains(&item) {
        list.push(item);
    }
}

impl RuleState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The configuration of one field, with defaults for unset dimensions.
    pub fn field_config(&self, field: &str) -> FieldConfig {
        let defaults = FieldConfig::default();
        FieldConfig {
            visible: self.visible.get(field).copied().unwrap_or(defaults.visible),
            required: self.required.get(field).copied().unwrap_or(defaults.required),
            disabled: self.disabled.get(field).copied().unwrap_or(defaults.disabled),
            warnings: self.warnings.get(field).cloned().unwrap_or_default(),
            errors: self.errors.get(field).cloned().unwrap_or_default(),
            classes: self.classes.get(field).cloned().unwrap_or_default(),
            options: self.options.get(field).cloned().unwrap_or_default(),
        }
    }

    /// Snapshot of every field that has any state.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, FieldConfig> {
        self.fields()
            .into_iter()
            .map(|field| {
                let config = self.field_config(field);
                (field.to_owned(), config)
            })
            .collect()
    }

    /// Names of all fields with state, sorted.
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .visible
            .keys()
            .chain(self.required.keys())
            .chain(self.disabled.keys())
            .chain(self.warnings.keys())
            .chain(self.errors.keys())
            .chain(self.classes.keys())
            .chain(self.options.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Whether `InitializeFields` (or an action) has created state for `field`.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.visible.contains_key(field)
            || self.required.contains_key(field)
            || self.disabled.contains_key(field)
            || self.warnings.contains_key(field)
            || self.errors.contains_key(field)
            || self.classes.contains_key(field)
            || self.options.contains_key(field)
    }
}
