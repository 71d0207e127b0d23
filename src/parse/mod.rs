//! The text rule language.
//!
//! ```text
//! # comment
//! rule show_spouse "Spouse details" (priority 10):
//!     when maritalStatus equals "married"
//!     then show spouseName, require spouseName
//! ```
//!
//! A rule is `rule <id> ["title"] [on <field>] [(priority N)] [(debounce MS)]
//! [(disabled)]:` followed by `when <condition>` and `then <actions>`.
//! Conditions combine `<field> [| transform] <operator> [value]` comparisons
//! with `AND`, `OR`, `NOT` and parentheses. Values are literals, `$field.path`
//! references, `@context.path` references or `name(args)` calls.

mod error;
mod grammar;

pub use error::ParseError;

use winnow::Parser;

use crate::{Condition, Rule};

/// Parse rule definitions. Rules are not validated; see
/// [`validate_rules`](crate::validate_rules).
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not valid syntax, including
/// comparisons with an unknown operator name.
pub fn parse(input: &str) -> Result<Vec<Rule>, ParseError> {
    grammar::parse_rules
        .parse(input)
        .map_err(|e| ParseError::at(input, e.offset(), e.inner().to_string()))
}

/// Parse a single condition expression.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not a valid condition.
pub fn parse_condition(input: &str) -> Result<Condition, ParseError> {
    winnow::combinator::terminated(grammar::condition, grammar::ws)
        .parse(input)
        .map_err(|e| ParseError::at(input, e.offset(), e.inner().to_string()))
}
