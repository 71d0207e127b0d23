use std::fmt;

use super::{DynamicValue, Operator};

/// A single comparison of a form field against a dynamic value.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseCondition {
    pub field: String,
    pub operator: Operator,
    pub value: DynamicValue,
    /// Name of a registered transform applied to the field value before
    /// comparing.
    pub transform: Option<String>,
}

/// Boolean combinator of a [`ComplexCondition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logic {
    And,
    Or,
    /// Negates the first child only.
    Not,
}

/// A boolean combination of nested conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexCondition {
    pub logic: Logic,
    pub conditions: Vec<Condition>,
}

/// A rule condition: one comparison or a combination of conditions.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Base(BaseCondition),
    Complex(ComplexCondition),
}

impl Condition {
    /// The compared field when this is a base condition.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Condition::Base(base) => Some(&base.field),
            Condition::Complex(_) => None,
        }
    }

    /// Every field compared anywhere in this condition tree, in order.
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_fields(self, &mut out);
        out
    }

    /// Combine with another condition under `and`, flattening nested `and`s.
    #[must_use]
    pub fn and(self, other: Condition) -> Condition {
        self.join(Logic::And, other)
    }

    /// Combine with another condition under `or`, flattening nested `or`s.
    #[must_use]
    pub fn or(self, other: Condition) -> Condition {
        self.join(Logic::Or, other)
    }

    fn join(self, logic: Logic, other: Condition) -> Condition {
        match self {
            Condition::Complex(mut complex) if complex.logic == logic => {
                complex.conditions.push(other);
                Condition::Complex(complex)
            }
            lhs => Condition::Complex(ComplexCondition {
                logic,
                conditions: vec![lhs, other],
            }),
        }
    }
}

fn collect_fields<'a>(condition: &'a Condition, out: &mut Vec<&'a str>) {
    match condition {
        Condition::Base(base) => out.push(&base.field),
        Condition::Complex(complex) => {
            for child in &complex.conditions {
                collect_fields(child, out);
            }
        }
    }
}

impl std::ops::Not for Condition {
    type Output = Condition;

    fn not(self) -> Condition {
        not(self)
    }
}

impl From<BaseCondition> for Condition {
    fn from(base: BaseCondition) -> Self {
        Condition::Base(base)
    }
}

impl From<ComplexCondition> for Condition {
    fn from(complex: ComplexCondition) -> Self {
        Condition::Complex(complex)
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Logic::And => write!(f, "AND"),
            Logic::Or => write!(f, "OR"),
            Logic::Not => write!(f, "NOT"),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Base(base) => {
                write!(f, "{}", base.field)?;
                if let Some(transform) = &base.transform {
                    write!(f, " | {transform}")?;
                }
                write!(f, " {}", base.operator)?;
                if !base.operator.is_unary() {
                    write!(f, " {}", base.value)?;
                }
                Ok(())
            }
            Condition::Complex(ComplexCondition {
                logic: Logic::Not,
                conditions,
            }) => match conditions.first() {
                Some(first) => write!(f, "(NOT {first})"),
                None => write!(f, "(NOT ())"),
            },
            Condition::Complex(ComplexCondition { logic, conditions }) => {
                write!(f, "(")?;
                for (i, child) in conditions.iter().enumerate() {
                    if i > 0 {
                        write!(f, " {logic} ")?;
                    }
                    write!(f, "{child}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Builder for field comparisons. Created by [`field()`].
#[derive(Debug, Clone)]
pub struct FieldCondition {
    field: String,
    transform: Option<String>,
}

macro_rules! binary_ops {
    ($($method:ident => $op:ident,)+) => {
        $(
            #[must_use]
            pub fn $method(self, value: impl Into<DynamicValue>) -> Condition {
                self.compare(Operator::$op, value)
            }
        )+
    };
}

macro_rules! unary_ops {
    ($($method:ident => $op:ident,)+) => {
        $(
            #[must_use]
            pub fn $method(self) -> Condition {
                self.compare(Operator::$op, DynamicValue::Literal(super::Value::Null))
            }
        )+
    };
}

impl FieldCondition {
    /// Apply a registered transform to the field value before comparing.
    #[must_use]
    pub fn transformed(mut self, transform: &str) -> Self {
        self.transform = Some(transform.to_owned());
        self
    }

    /// Compare with an arbitrary operator.
    #[must_use]
    pub fn compare(self, operator: Operator, value: impl Into<DynamicValue>) -> Condition {
        Condition::Base(BaseCondition {
            field: self.field,
            operator,
            value: value.into(),
            transform: self.transform,
        })
    }

    binary_ops! {
        equals => Equals,
        not_equals => NotEquals,
        greater_than => GreaterThan,
        greater_than_or_equal => GreaterThanOrEqual,
        less_than => LessThan,
        less_than_or_equal => LessThanOrEqual,
        contains => Contains,
        not_contains => NotContains,
        starts_with => StartsWith,
        ends_with => EndsWith,
        matches_regex => MatchesRegex,
        not_matches_regex => NotMatchesRegex,
        is_in => In,
        not_in => NotIn,
        before_date => BeforeDate,
        after_date => AfterDate,
        between => Between,
        not_between => NotBetween,
        multiple_of => MultipleOf,
        length_equals => LengthEquals,
        length_greater_than => LengthGreaterThan,
        length_less_than => LengthLessThan,
    }

    unary_ops! {
        is_empty => IsEmpty,
        is_not_empty => IsNotEmpty,
        email_format => EmailFormat,
        url_format => UrlFormat,
        phone_format => PhoneFormat,
        credit_card_format => CreditCardFormat,
        uuid_format => UuidFormat,
        is_weekend => IsWeekend,
        is_business_day => IsBusinessDay,
        is_integer => IsInteger,
    }
}

/// Start a comparison on a form field.
#[must_use]
pub fn field(name: &str) -> FieldCondition {
    FieldCondition {
        field: name.to_owned(),
        transform: None,
    }
}

/// All conditions must hold. Empty is `true`.
#[must_use]
pub fn all(conditions: Vec<Condition>) -> Condition {
    Condition::Complex(ComplexCondition {
        logic: Logic::And,
        conditions,
    })
}

/// Any condition must hold. Empty is `false`.
#[must_use]
pub fn any(conditions: Vec<Condition>) -> Condition {
    Condition::Complex(ComplexCondition {
        logic: Logic::Or,
        conditions,
    })
}

/// Negate a condition.
#[must_use]
pub fn not(condition: Condition) -> Condition {
    Condition::Complex(ComplexCondition {
        logic: Logic::Not,
        conditions: vec![condition],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Value, field_ref};

    #[test]
    fn field_equals_literal() {
        let cond = field("maritalStatus").equals("married");
        assert_eq!(
            cond,
            Condition::Base(BaseCondition {
                field: "maritalStatus".into(),
                operator: Operator::Equals,
                value: DynamicValue::Literal(Value::from("married")),
                transform: None,
            })
        );
    }

    #[test]
    fn field_with_transform() {
        let cond = field("email").transformed("lowercase").ends_with("@acme.io");
        match cond {
            Condition::Base(base) => {
                assert_eq!(base.transform.as_deref(), Some("lowercase"));
                assert_eq!(base.operator, Operator::EndsWith);
            }
            other => panic!("expected Base, got {other:?}"),
        }
    }

    #[test]
    fn and_flattens() {
        let cond = field("a")
            .equals(1_i64)
            .and(field("b").equals(2_i64))
            .and(field("c").equals(3_i64));
        match cond {
            Condition::Complex(c) => {
                assert_eq!(c.logic, Logic::And);
                assert_eq!(c.conditions.len(), 3);
            }
            other => panic!("expected Complex, got {other:?}"),
        }
    }

    #[test]
    fn or_after_and_nests() {
        let cond = field("a")
            .equals(1_i64)
            .and(field("b").equals(2_i64))
            .or(field("c").equals(3_i64));
        match cond {
            Condition::Complex(c) => {
                assert_eq!(c.logic, Logic::Or);
                assert!(matches!(&c.conditions[0], Condition::Complex(inner) if inner.logic == Logic::And));
            }
            other => panic!("expected Complex, got {other:?}"),
        }
    }

    #[test]
    fn not_operator_wraps_single_child() {
        let cond = !field("banned").equals(true);
        match cond {
            Condition::Complex(c) => {
                assert_eq!(c.logic, Logic::Not);
                assert_eq!(c.conditions.len(), 1);
            }
            other => panic!("expected Complex, got {other:?}"),
        }
    }

    #[test]
    fn fields_collects_in_order() {
        let cond = all(vec![
            field("salary").greater_than(100_000_i64),
            any(vec![field("isAdmin").equals(true), field("role").is_not_empty()]),
        ]);
        assert_eq!(cond.fields(), vec!["salary", "isAdmin", "role"]);
        assert_eq!(cond.field(), None);
    }

    #[test]
    fn display_dsl_form() {
        let cond = field("salary")
            .greater_than(100_000_i64)
            .and(field("confirm").equals(field_ref("email")));
        assert_eq!(
            cond.to_string(),
            "(salary greater_than 100000 AND confirm equals $email)"
        );
        assert_eq!(
            (!field("notes").is_empty()).to_string(),
            "(NOT notes is_empty)"
        );
    }
}
