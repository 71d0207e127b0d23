use std::time::Duration;

use super::error::MalformedRule;
use super::{Condition, Rule, RuleAction};

/// Fluent builder for a single [`Rule`].
///
/// # Example
///
/// ```
/// use formrules::{field, require, show, RuleBuilder};
///
/// let rule = RuleBuilder::new()
///     .id("show_spouse")
///     .when(field("maritalStatus").equals("married"))
///     .then(show("spouseName"))
///     .then(require("spouseName"))
///     .build()
///     .unwrap();
///
/// assert_eq!(rule.actions.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    field: Option<String>,
    condition: Option<Condition>,
    actions: Vec<RuleAction>,
    priority: Option<i32>,
    enabled: bool,
    debounce: Option<Duration>,
}

impl Default for RuleBuilder {
    fn default() -> Self {
        Self {
            id: None,
            name: None,
            description: None,
            field: None,
            condition: None,
            actions: Vec::new(),
            priority: None,
            enabled: true,
            debounce: None,
        }
    }
}

impl RuleBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn id(mut self, id: &str) -> Self {
        self.id = Some(id.to_owned());
        self
    }

    #[must_use]
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_owned());
        self
    }

    #[must_use]
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }

    /// Subject field for actions without an explicit target.
    #[must_use]
    pub fn field(mut self, field: &str) -> Self {
        self.field = Some(field.to_owned());
        self
    }

    /// Set the condition. Calling it again replaces the previous one.
    #[must_use]
    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Append an action.
    #[must_use]
    pub fn then(mut self, action: RuleAction) -> Self {
        self.actions.push(action);
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Recorded on the rule; the engine itself does not debounce.
    #[must_use]
    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = Some(debounce);
        self
    }

    /// Finish the rule.
    ///
    /// # Errors
    ///
    /// [`MalformedRule::MissingCondition`] when `.when()` was never called,
    /// otherwise whatever [`validate_rule`](crate::validate_rule) reports.
    pub fn build(self) -> Result<Rule, MalformedRule> {
        let Some(condition) = self.condition else {
            return Err(MalformedRule::MissingCondition {
                rule: self
                    .id
                    .or(self.name)
                    .unwrap_or_else(|| "<unnamed>".to_owned()),
            });
        };
        let rule = Rule {
            id: self.id,
            name: self.name,
            description: self.description,
            field: self.field,
            condition,
            actions: self.actions,
            priority: self.priority,
            enabled: self.enabled,
            debounce: self.debounce,
        };
        crate::validate::validate_rule(&rule)?;
        Ok(rule)
    }
}

/// Builder for a validated [`RuleSet`].
///
/// Rules are defined via closures that receive a [`RuleBuilder`] with the id
/// already set.
///
/// # Example
///
/// ```
/// use formrules::{field, hide, show, RuleSetBuilder};
///
/// let rules = RuleSetBuilder::new()
///     .rule("married", |r| {
///         r.when(field("maritalStatus").equals("married")).then(show("spouseName"))
///     })
///     .rule("single", |r| {
///         r.when(field("maritalStatus").equals("single")).then(hide("spouseName"))
///     })
///     .build()
///     .unwrap();
///
/// assert_eq!(rules.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct RuleSetBuilder {
    rules: Vec<RuleBuilder>,
}

impl RuleSetBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a rule. The closure must call `.when(..)` and at least one
    /// `.then(..)`.
    #[must_use]
    pub fn rule(mut self, id: &str, f: impl FnOnce(RuleBuilder) -> RuleBuilder) -> Self {
        self.rules.push(f(RuleBuilder::new().id(id)));
        self
    }

    /// Validate and collect the rules, keeping definition order.
    ///
    /// # Errors
    ///
    /// Returns the first [`MalformedRule`], including duplicate ids.
    pub fn build(self) -> Result<RuleSet, MalformedRule> {
        let rules = self
            .rules
            .into_iter()
            .map(RuleBuilder::build)
            .collect::<Result<Vec<_>, _>>()?;
        RuleSet::new(rules)
    }
}

/// An ordered, validated list of rules. Immutable and cheap to share behind
/// `Arc`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Validate a list of rules.
    ///
    /// # Errors
    ///
    /// Returns the first [`MalformedRule`].
    pub fn new(rules: Vec<Rule>) -> Result<Self, MalformedRule> {
        crate::validate::validate_rules(&rules)?;
        Ok(Self { rules })
    }

    /// Parse and validate rule definitions in the text language.
    ///
    /// # Errors
    ///
    /// Returns [`FormRulesError`](crate::FormRulesError) on parse or
    /// validation failure.
    pub fn from_dsl(input: &str) -> Result<Self, crate::FormRulesError> {
        let rules = crate::parse::parse(input)?;
        Ok(Self::new(rules)?)
    }

    /// Read a rule file and parse it with [`from_dsl`](Self::from_dsl).
    ///
    /// # Errors
    ///
    /// Returns [`FormRulesError`](crate::FormRulesError) on I/O, parse, or
    /// validation failure.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, crate::FormRulesError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_dsl(&input)
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    #[must_use]
    pub fn into_rules(self) -> Vec<Rule> {
        self.rules
    }

    /// Look up a rule by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id.as_deref() == Some(id))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }
}

impl IntoIterator for RuleSet {
    type Item = Rule;
    type IntoIter = std::vec::IntoIter<Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.into_iter()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
