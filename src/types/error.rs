use thiserror::Error;

/// Errors raised while evaluating a condition or resolving a dynamic value.
///
/// `UnknownOperator` and `UnknownFunction` are the only errors that reach
/// callers of the top-level entry points; every other failure folds to a
/// `false` condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("unknown operator '{name}'")]
    UnknownOperator { name: String },

    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },

    #[error("function '{name}' failed: {message}")]
    FunctionFailed { name: String, message: String },
}

impl EvalError {
    /// Whether this error indicates a malformed rule definition rather than a
    /// runtime failure of a well-formed one.
    #[must_use]
    pub fn is_definition_error(&self) -> bool {
        matches!(
            self,
            EvalError::UnknownOperator { .. } | EvalError::UnknownFunction { .. }
        )
    }
}

/// Failure reported by a host-registered custom function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FunctionError {
    message: String,
}

impl FunctionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Non-fatal failure of a single action. Recorded in the evaluation report;
/// the action is dropped and the remaining actions still run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("value for field '{field}' rejected by schema: {}", messages.join("; "))]
    ValidationRejected { field: String, messages: Vec<String> },

    #[error("action '{action}' in rule '{rule}' has no target field")]
    MissingTarget { rule: String, action: String },

    #[error("action '{action}' on field '{field}' failed: {source}")]
    Resolve {
        field: String,
        action: String,
        source: EvalError,
    },
}

/// A structurally invalid rule, detected at authoring time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedRule {
    #[error("rule '{rule}' has no condition")]
    MissingCondition { rule: String },

    #[error("rule '{rule}' has no actions")]
    NoActions { rule: String },

    #[error("rule '{rule}' compares an empty field name")]
    EmptyField { rule: String },

    #[error("rule '{rule}' has a 'not' condition without children")]
    EmptyNot { rule: String },

    #[error("action '{action}' in rule '{rule}' has no target field")]
    MissingTarget { rule: String, action: String },

    #[error("action '{action}' in rule '{rule}' is missing its payload")]
    MissingPayload { rule: String, action: String },

    #[error("duplicate rule id '{id}'")]
    DuplicateId { id: String },
}

/// Errors from the imperative helpers of [`FormEngine`](crate::FormEngine).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("field '{field}' is not declared in the form schema")]
    UnknownField { field: String },

    #[error("value for field '{field}' rejected by schema: {}", messages.join("; "))]
    ValidationRejected { field: String, messages: Vec<String> },
}
