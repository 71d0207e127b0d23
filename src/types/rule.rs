use std::time::Duration;

use super::{Condition, RuleAction};

/// A condition plus the ordered actions applied while it holds.
///
/// Rules are built once, by [`RuleBuilder`](super::RuleBuilder), the text DSL
/// or a struct literal, and are not mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Subject field. Untargeted actions apply here.
    pub field: Option<String>,
    pub condition: Condition,
    pub actions: Vec<RuleAction>,
    /// Ordering metadata; only honoured with
    /// [`RuleOrder::Priority`](crate::RuleOrder::Priority).
    pub priority: Option<i32>,
    pub enabled: bool,
    /// Accepted as configuration. The engine does not debounce.
    pub debounce: Option<Duration>,
}

impl Rule {
    /// An enabled rule with no metadata.
    #[must_use]
    pub fn new(condition: Condition, actions: Vec<RuleAction>) -> Self {
        Self {
            id: None,
            name: None,
            description: None,
            field: None,
            condition,
            actions,
            priority: None,
            enabled: true,
            debounce: None,
        }
    }

    /// The field untargeted actions apply to: the explicit subject, else the
    /// field of a base condition.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.field.as_deref().or_else(|| self.condition.field())
    }

    /// The field an action of this rule applies to.
    #[must_use]
    pub fn target_of<'a>(&'a self, action: &'a RuleAction) -> Option<&'a str> {
        action.target.as_deref().or_else(|| self.subject())
    }

    /// A human-readable identifier for logs and reports.
    #[must_use]
    pub fn label(&self) -> String {
        self.id
            .clone()
            .or_else(|| self.name.clone())
            .unwrap_or_else(|| self.condition.to_string())
    }

    #[must_use]
    pub fn debounce(&self) -> Option<Duration> {
        self.debounce
    }
}
