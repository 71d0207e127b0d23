use std::fmt;
use std::str::FromStr;

use super::error::EvalError;

macro_rules! operators {
    ($($variant:ident => $name:literal,)+) => {
        /// Comparison operators available to base conditions.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Operator {
            $($variant,)+
        }

        impl Operator {
            /// Every operator, in vocabulary order.
            pub const ALL: &'static [Operator] = &[$(Operator::$variant,)+];

            /// The snake_case name used in rule definitions.
            #[must_use]
            pub fn name(self) -> &'static str {
                match self {
                    $(Operator::$variant => $name,)+
                }
            }
        }

        impl FromStr for Operator {
            type Err = EvalError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Operator::$variant),)+
                    other => Err(EvalError::UnknownOperator {
                        name: other.to_owned(),
                    }),
                }
            }
        }
    };
}

operators! {
    Equals => "equals",
    NotEquals => "not_equals",
    GreaterThan => "greater_than",
    GreaterThanOrEqual => "greater_than_or_equal",
    LessThan => "less_than",
    LessThanOrEqual => "less_than_or_equal",
    Contains => "contains",
    NotContains => "not_contains",
    StartsWith => "starts_with",
    EndsWith => "ends_with",
    MatchesRegex => "matches_regex",
    NotMatchesRegex => "not_matches_regex",
    In => "in",
    NotIn => "not_in",
    IsEmpty => "is_empty",
    IsNotEmpty => "is_not_empty",
    EmailFormat => "email_format",
    UrlFormat => "url_format",
    PhoneFormat => "phone_format",
    CreditCardFormat => "credit_card_format",
    UuidFormat => "uuid_format",
    BeforeDate => "before_date",
    AfterDate => "after_date",
    IsWeekend => "is_weekend",
    IsBusinessDay => "is_business_day",
    Between => "between",
    NotBetween => "not_between",
    MultipleOf => "multiple_of",
    IsInteger => "is_integer",
    LengthEquals => "length_equals",
    LengthGreaterThan => "length_greater_than",
    LengthLessThan => "length_less_than",
}

impl Operator {
    /// Whether the operator ignores its right-hand value.
    #[must_use]
    pub fn is_unary(self) -> bool {
        matches!(
            self,
            Operator::IsEmpty
                | Operator::IsNotEmpty
                | Operator::EmailFormat
                | Operator::UrlFormat
                | Operator::PhoneFormat
                | Operator::CreditCardFormat
                | Operator::UuidFormat
                | Operator::IsWeekend
                | Operator::IsBusinessDay
                | Operator::IsInteger
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_round_trips_through_from_str() {
        for op in Operator::ALL {
            assert_eq!(op.name().parse::<Operator>(), Ok(*op));
        }
    }

    #[test]
    fn vocabulary_size() {
        assert_eq!(Operator::ALL.len(), 32);
    }

    #[test]
    fn unknown_operator_is_error() {
        let err = "roughly_equals".parse::<Operator>().unwrap_err();
        assert_eq!(
            err,
            EvalError::UnknownOperator {
                name: "roughly_equals".into()
            }
        );
    }

    #[test]
    fn display_uses_snake_case() {
        assert_eq!(Operator::GreaterThanOrEqual.to_string(), "greater_than_or_equal");
        assert_eq!(Operator::In.to_string(), "in");
    }

    #[test]
    fn unary_operators() {
        assert!(Operator::IsEmpty.is_unary());
        assert!(Operator::UuidFormat.is_unary());
        assert!(!Operator::Between.is_unary());
    }
}
