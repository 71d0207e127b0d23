use std::collections::HashSet;

use crate::{ActionKind, Condition, Logic, MalformedRule, Rule};

/// Check that a rule is structurally usable.
///
/// # Errors
///
/// The first problem found: no actions, an empty compared field name, a
/// `not` without children, an action with neither a target nor a rule
/// subject to fall back on, or an action missing its payload.
pub fn validate_rule(rule: &Rule) -> Result<(), MalformedRule> {
    let label = rule.label();
    if rule.actions.is_empty() {
        return Err(MalformedRule::NoActions { rule: label });
    }
    check_condition(&rule.condition, &label)?;

    for action in &rule.actions {
        let malformed = |payload: bool| {
            if payload {
                Ok(())
            } else {
                Err(MalformedRule::MissingPayload {
                    rule: label.clone(),
                    action: action.kind.name().to_owned(),
                })
            }
        };
        match &action.kind {
            ActionKind::Custom { name, .. } => {
                malformed(!name.trim().is_empty())?;
                continue;
            }
            ActionKind::SetValue { value, required } => {
                malformed(value.is_some() || required.is_some())?;
            }
            ActionKind::ShowWarning { message } | ActionKind::ShowError { message } => {
                malformed(!message.is_empty())?;
            }
            ActionKind::AddClass { class } | ActionKind::RemoveClass { class } => {
                malformed(!class.trim().is_empty())?;
            }
            _ => {}
        }
        if rule.target_of(action).is_none() {
            return Err(MalformedRule::MissingTarget {
                rule: label,
                action: action.kind.name().to_owned(),
            });
        }
    }
    Ok(())
}

fn check_condition(condition: &Condition, label: &str) -> Result<(), MalformedRule> {
    match condition {
        Condition::Base(base) if base.field.trim().is_empty() => Err(MalformedRule::EmptyField {
            rule: label.to_owned(),
        }),
        Condition::Base(_) => Ok(()),
        Condition::Complex(complex) => {
            if complex.logic == Logic::Not && complex.conditions.is_empty() {
                return Err(MalformedRule::EmptyNot {
                    rule: label.to_owned(),
                });
            }
            complex
                .conditions
                .iter()
                .try_for_each(|child| check_condition(child, label))
        }
    }
}

/// Validate every rule and reject duplicate ids.
///
/// # Errors
///
/// The first [`MalformedRule`] found, in rule order.
pub fn validate_rules(rules: &[Rule]) -> Result<(), MalformedRule> {
    let mut ids = HashSet::new();
    for rule in rules {
        if let Some(id) = &rule.id {
            if !ids.insert(id.as_str()) {
                return Err(MalformedRule::DuplicateId { id: id.clone() });
            }
        }
        validate_rule(rule)?;
    }
    Ok(())
}
