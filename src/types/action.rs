use std::collections::BTreeMap;
use std::fmt;

use super::{DynamicValue, Value};

/// What an action does, with the payload each action type needs.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    Show,
    Hide,
    Enable,
    Disable,
    /// Set the field's required flag and/or its live value. The value is
    /// validated against the field schema before it is applied.
    SetValue {
        value: Option<DynamicValue>,
        required: Option<bool>,
    },
    ClearValue,
    ShowWarning {
        message: String,
    },
    ShowError {
        message: String,
    },
    AddClass {
        class: String,
    },
    RemoveClass {
        class: String,
    },
    /// Replace the field's option list. A non-array payload becomes a single
    /// option.
    SetOptions {
        options: DynamicValue,
    },
    /// Accepted for completeness; validation is triggered by the caller.
    TriggerValidation,
    /// Forwarded verbatim to the host's custom-action callback.
    Custom {
        name: String,
        value: Option<DynamicValue>,
        params: BTreeMap<String, Value>,
    },
}

impl ActionKind {
    /// The action type name used in rule definitions.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Show => "show",
            ActionKind::Hide => "hide",
            ActionKind::Enable => "enable",
            ActionKind::Disable => "disable",
            ActionKind::SetValue { .. } => "set_value",
            ActionKind::ClearValue => "clear_value",
            ActionKind::ShowWarning { .. } => "show_warning",
            ActionKind::ShowError { .. } => "show_error",
            ActionKind::AddClass { .. } => "add_class",
            ActionKind::RemoveClass { .. } => "remove_class",
            ActionKind::SetOptions { .. } => "set_options",
            ActionKind::TriggerValidation => "trigger_validation",
            ActionKind::Custom { .. } => "custom",
        }
    }
}

/// An action applied when its rule's condition holds.
///
/// Without a `target` the action applies to the owning rule's subject field
/// (see [`Rule::target_of`](super::Rule::target_of)).
#[derive(Debug, Clone, PartialEq)]
pub struct RuleAction {
    pub kind: ActionKind,
    pub target: Option<String>,
}

impl RuleAction {
    /// An action that applies to the owning rule's subject field.
    #[must_use]
    pub fn new(kind: ActionKind) -> Self {
        Self { kind, target: None }
    }

    /// Redirect the action to another field.
    #[must_use]
    pub fn on(mut self, target: &str) -> Self {
        self.target = Some(target.to_owned());
        self
    }

    /// Add a parameter to a custom action. No effect on other actions.
    #[must_use]
    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        if let ActionKind::Custom { params, .. } = &mut self.kind {
            params.insert(key.to_owned(), value.into());
        }
        self
    }

    /// Attach a value to a custom action. No effect on other actions.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<DynamicValue>) -> Self {
        if let ActionKind::Custom { value: slot, .. } = &mut self.kind {
            *slot = Some(value.into());
        }
        self
    }
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.name())?;
        if let Some(target) = &self.target {
            write!(f, " {target}")?;
        }
        Ok(())
    }
}

fn targeted(kind: ActionKind, target: &str) -> RuleAction {
    RuleAction::new(kind).on(target)
}

#[must_use]
pub fn show(target: &str) -> RuleAction {
    targeted(ActionKind::Show, target)
}

#[must_use]
pub fn hide(target: &str) -> RuleAction {
    targeted(ActionKind::Hide, target)
}

#[must_use]
pub fn enable(target: &str) -> RuleAction {
    targeted(ActionKind::Enable, target)
}

#[must_use]
pub fn disable(target: &str) -> RuleAction {
    targeted(ActionKind::Disable, target)
}

/// Mark a field required.
#[must_use]
pub fn require(target: &str) -> RuleAction {
    targeted(
        ActionKind::SetValue {
            value: None,
            required: Some(true),
        },
        target,
    )
}

/// Mark a field optional.
#[must_use]
pub fn optional(target: &str) -> RuleAction {
    targeted(
        ActionKind::SetValue {
            value: None,
            required: Some(false),
        },
        target,
    )
}

#[must_use]
pub fn set_value(target: &str, value: impl Into<DynamicValue>) -> RuleAction {
    targeted(
        ActionKind::SetValue {
            value: Some(value.into()),
            required: None,
        },
        target,
    )
}

#[must_use]
pub fn clear_value(target: &str) -> RuleAction {
    targeted(ActionKind::ClearValue, target)
}

#[must_use]
pub fn show_warning(target: &str, message: &str) -> RuleAction {
    targeted(
        ActionKind::ShowWarning {
            message: message.to_owned(),
        },
        target,
    )
}

#[must_use]
pub fn show_error(target: &str, message: &str) -> RuleAction {
    targeted(
        ActionKind::ShowError {
            message: message.to_owned(),
        },
        target,
    )
}

#[must_use]
pub fn add_class(target: &str, class: &str) -> RuleAction {
    targeted(
        ActionKind::AddClass {
            class: class.to_owned(),
        },
        target,
    )
}

#[must_use]
pub fn remove_class(target: &str, class: &str) -> RuleAction {
    targeted(
        ActionKind::RemoveClass {
            class: class.to_owned(),
        },
        target,
    )
}

#[must_use]
pub fn set_options(target: &str, options: impl Into<DynamicValue>) -> RuleAction {
    targeted(
        ActionKind::SetOptions {
            options: options.into(),
        },
        target,
    )
}

#[must_use]
pub fn trigger_validation(target: &str) -> RuleAction {
    targeted(ActionKind::TriggerValidation, target)
}

/// A collaborator-defined action, handed to the custom-action callback.
#[must_use]
pub fn custom(name: &str) -> RuleAction {
    RuleAction::new(ActionKind::Custom {
        name: name.to_owned(),
        value: None,
        params: BTreeMap::new(),
    })
}
