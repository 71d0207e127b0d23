//! Semantics of every [`Operator`].
//!
//! All checks are total: malformed operands produce `false`, never a panic
//! or an error.

use std::cmp::Ordering;
use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Weekday};
use regex::Regex;

use crate::{Operator, Value};

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
    )
    .expect("email pattern is valid")
});

static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)https?://[^\s/$.?#][^\s]*$").expect("url pattern is valid")
});

static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9\s\-().]+$").expect("phone pattern is valid"));

static UUID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("uuid pattern is valid")
});

const PHONE_DIGITS: std::ops::RangeInclusive<usize> = 7..=15;
const CARD_DIGITS: std::ops::RangeInclusive<usize> = 13..=19;

/// Compare a field value (`left`) against a resolved operand (`right`).
///
/// `None` stands for a missing value and is distinct from [`Value::Null`].
#[must_use]
pub fn compare(op: Operator, left: Option<&Value>, right: Option<&Value>) -> bool {
    match op {
        Operator::Equals => left == right,
        Operator::NotEquals => left != right,
        Operator::GreaterThan => ordering(left, right) == Some(Ordering::Greater),
        Operator::GreaterThanOrEqual => matches!(
            ordering(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Operator::LessThan => ordering(left, right) == Some(Ordering::Less),
        Operator::LessThanOrEqual => matches!(
            ordering(left, right),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Operator::Contains => contains(left, right),
        Operator::NotContains => !contains(left, right),
        Operator::StartsWith => {
            str_pair(left, right).is_some_and(|(l, r)| l.starts_with(r))
        }
        Operator::EndsWith => str_pair(left, right).is_some_and(|(l, r)| l.ends_with(r)),
        Operator::MatchesRegex => regex_match(left, right) == Some(true),
        Operator::NotMatchesRegex => regex_match(left, right) == Some(false),
        Operator::In => membership(left, right) == Some(true),
        Operator::NotIn => membership(left, right) == Some(false),
        Operator::IsEmpty => is_empty(left),
        Operator::IsNotEmpty => !is_empty(left),
        Operator::EmailFormat => as_str(left).is_some_and(|s| EMAIL_REGEX.is_match(s)),
        Operator::UrlFormat => as_str(left).is_some_and(|s| URL_REGEX.is_match(s)),
        Operator::PhoneFormat => as_str(left).is_some_and(is_phone),
        Operator::CreditCardFormat => as_str(left).is_some_and(is_credit_card),
        Operator::UuidFormat => as_str(left).is_some_and(|s| UUID_REGEX.is_match(s)),
        Operator::BeforeDate => date_pair(left, right).is_some_and(|(l, r)| l < r),
        Operator::AfterDate => date_pair(left, right).is_some_and(|(l, r)| l > r),
        Operator::IsWeekend => {
            calendar_day(left).is_some_and(|d| matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        }
        Operator::IsBusinessDay => {
            calendar_day(left).is_some_and(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        }
        Operator::Between => in_range(left, right) == Some(true),
        Operator::NotBetween => in_range(left, right) == Some(false),
        Operator::MultipleOf => multiple_of(left, right),
        Operator::IsInteger => is_integer(left),
        Operator::LengthEquals => length_cmp(left, right) == Some(Ordering::Equal),
        Operator::LengthGreaterThan => length_cmp(left, right) == Some(Ordering::Greater),
        Operator::LengthLessThan => length_cmp(left, right) == Some(Ordering::Less),
    }
}

fn as_str(v: Option<&Value>) -> Option<&str> {
    v.and_then(Value::as_str)
}

fn str_pair<'a>(left: Option<&'a Value>, right: Option<&'a Value>) -> Option<(&'a str, &'a str)> {
    Some((as_str(left)?, as_str(right)?))
}

/// Numeric order when both sides are numbers, else date order when both
/// sides parse as dates.
fn ordering(left: Option<&Value>, right: Option<&Value>) -> Option<Ordering> {
    let (l, r) = (left?, right?);
    if let Some(ord) = l.partial_cmp_number(r) {
        return Some(ord);
    }
    let (l, r) = date_pair(Some(l), Some(r))?;
    Some(l.cmp(&r))
}

fn contains(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (Some(Value::String(l)), Some(Value::String(r))) => l.contains(r.as_str()),
        (Some(Value::Array(items)), Some(r)) => items.contains(r),
        _ => false,
    }
}

/// `None` when the pattern is missing, invalid, or the input is not a string.
fn regex_match(left: Option<&Value>, right: Option<&Value>) -> Option<bool> {
    let (input, pattern) = str_pair(left, right)?;
    let re = Regex::new(pattern).ok()?;
    Some(re.is_match(input))
}

/// `None` when the right-hand side is not an array.
fn membership(left: Option<&Value>, right: Option<&Value>) -> Option<bool> {
    let items = right?.as_array()?;
    Some(left.is_some_and(|l| items.contains(l)))
}

fn is_empty(v: Option<&Value>) -> bool {
    v.is_none_or(Value::is_blank)
}

fn is_phone(s: &str) -> bool {
    if !PHONE_REGEX.is_match(s) {
        return false;
    }
    let digits = s.chars().filter(char::is_ascii_digit).count();
    PHONE_DIGITS.contains(&digits)
}

/// Digits with optional space or dash separators, of card length, passing
/// the Luhn checksum.
fn is_credit_card(s: &str) -> bool {
    let mut digits = Vec::with_capacity(s.len());
    for c in s.chars() {
        match c {
            ' ' | '-' => {}
            c => match c.to_digit(10) {
                Some(d) => digits.push(d),
                None => return false,
            },
        }
    }
    CARD_DIGITS.contains(&digits.len()) && luhn(&digits)
}

fn luhn(digits: &[u32]) -> bool {
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

/// Parse a date from an RFC 3339 timestamp, a naive date-time, a plain
/// `YYYY-MM-DD` date, or epoch milliseconds.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn parse_date(v: &Value) -> Option<NaiveDateTime> {
    match v {
        Value::Int(ms) => DateTime::from_timestamp_millis(*ms).map(|d| d.naive_utc()),
        Value::Float(ms) if ms.is_finite() => {
            DateTime::from_timestamp_millis(*ms as i64).map(|d| d.naive_utc())
        }
        Value::String(s) => {
            let s = s.trim();
            DateTime::parse_from_rfc3339(s)
                .map(|d| d.naive_utc())
                .ok()
                .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok())
                .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok())
                .or_else(|| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                })
        }
        _ => None,
    }
}

fn date(v: Option<&Value>) -> Option<NaiveDateTime> {
    parse_date(v?)
}

/// The calendar day a value falls on. Offset timestamps keep their own local
/// date; everything else is read as UTC.
fn calendar_day(v: Option<&Value>) -> Option<NaiveDate> {
    let v = v?;
    if let Some(d) = v.as_str().and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok()) {
        return Some(d.date_naive());
    }
    parse_date(v).map(|d| d.date())
}

fn date_pair(left: Option<&Value>, right: Option<&Value>) -> Option<(NaiveDateTime, NaiveDateTime)> {
    Some((date(left)?, date(right)?))
}

/// `None` when the operands do not form a number and a `[min, max]` range.
fn in_range(left: Option<&Value>, right: Option<&Value>) -> Option<bool> {
    let n = left?.as_f64()?;
    let [min, max] = right?.as_array()? else {
        return None;
    };
    let (min, max) = (min.as_f64()?, max.as_f64()?);
    if n.is_nan() || min.is_nan() || max.is_nan() {
        return None;
    }
    Some(min <= n && n <= max)
}

fn multiple_of(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (Some(Value::Int(l)), Some(Value::Int(r))) => {
            *r != 0 && l.checked_rem(*r).is_none_or(|rem| rem == 0)
        }
        (Some(l), Some(r)) => match (l.as_f64(), r.as_f64()) {
            (Some(l), Some(r)) if r != 0.0 && l.is_finite() && r.is_finite() => l % r == 0.0,
            _ => false,
        },
        _ => false,
    }
}

fn is_integer(v: Option<&Value>) -> bool {
    match v {
        Some(Value::Int(_)) => true,
        Some(Value::Float(f)) => f.is_finite() && f.fract() == 0.0,
        _ => false,
    }
}

#[allow(clippy::cast_precision_loss)]
fn length_cmp(left: Option<&Value>, right: Option<&Value>) -> Option<Ordering> {
    let len = left?.length()? as f64;
    len.partial_cmp(&right?.as_f64()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(left: impl Into<Value>, op: Operator, right: impl Into<Value>) -> bool {
        compare(op, Some(&left.into()), Some(&right.into()))
    }

    fn check_unary(left: impl Into<Value>, op: Operator) -> bool {
        compare(op, Some(&left.into()), None)
    }

    #[test]
    fn equality_is_structural() {
        assert!(check(vec![1_i64, 2], Operator::Equals, vec![1_i64, 2]));
        assert!(check(10_i64, Operator::Equals, 10.0_f64));
        assert!(check("a", Operator::NotEquals, "b"));
        assert!(compare(Operator::Equals, None, None));
        assert!(!compare(Operator::Equals, None, Some(&Value::Null)));
    }

    #[test]
    fn numeric_ordering() {
        assert!(check(5_i64, Operator::GreaterThan, 3_i64));
        assert!(check(3_i64, Operator::GreaterThanOrEqual, 3.0_f64));
        assert!(check(2.5_f64, Operator::LessThan, 3_i64));
        assert!(check(3_i64, Operator::LessThanOrEqual, 3_i64));
        assert!(!check("5", Operator::GreaterThan, 3_i64));
        assert!(!compare(Operator::GreaterThan, None, Some(&Value::Int(1))));
    }

    #[test]
    fn date_ordering() {
        assert!(check("2024-05-01", Operator::GreaterThan, "2024-04-30"));
        assert!(check("2024-05-01", Operator::LessThanOrEqual, "2024-05-01T00:00:00Z"));
        assert!(!check("soon", Operator::GreaterThan, "2024-04-30"));
    }

    #[test]
    fn contains_substring_and_membership() {
        assert!(check("hello world", Operator::Contains, "lo w"));
        assert!(check(vec!["a", "b"], Operator::Contains, "b"));
        assert!(!check(vec!["a", "b"], Operator::Contains, "c"));
        assert!(check("hello", Operator::NotContains, "xyz"));
        assert!(!check(42_i64, Operator::Contains, "4"));
    }

    #[test]
    fn starts_and_ends_with() {
        assert!(check("foobar", Operator::StartsWith, "foo"));
        assert!(check("foobar", Operator::EndsWith, "bar"));
        assert!(!check(12_i64, Operator::StartsWith, "1"));
    }

    #[test]
    fn regex_operators() {
        assert!(check("abc123", Operator::MatchesRegex, r"^[a-z]+\d+$"));
        assert!(check("abc", Operator::NotMatchesRegex, r"^\d+$"));
        assert!(!check("abc", Operator::MatchesRegex, "("));
        assert!(!check("abc", Operator::NotMatchesRegex, "("));
        assert!(!check(1_i64, Operator::MatchesRegex, ".*"));
    }

    #[test]
    fn in_and_not_in() {
        assert!(check("red", Operator::In, vec!["red", "blue"]));
        assert!(check("green", Operator::NotIn, vec!["red", "blue"]));
        assert!(!check("red", Operator::In, "red"));
        assert!(!check("red", Operator::NotIn, "red"));
        assert!(compare(Operator::NotIn, None, Some(&Value::from(vec!["a"]))));
    }

    #[test]
    fn emptiness() {
        assert!(compare(Operator::IsEmpty, None, None));
        assert!(check_unary(Value::Null, Operator::IsEmpty));
        assert!(check_unary("", Operator::IsEmpty));
        assert!(check_unary(Value::Array(vec![]), Operator::IsEmpty));
        assert!(check_unary(Value::Map(Default::default()), Operator::IsEmpty));
        assert!(check_unary(0_i64, Operator::IsNotEmpty));
        assert!(check_unary(" ", Operator::IsNotEmpty));
    }

    #[test]
    fn email_format() {
        assert!(check_unary("jane.doe@example.com", Operator::EmailFormat));
        assert!(!check_unary("jane@localhost", Operator::EmailFormat));
        assert!(!check_unary("not an email", Operator::EmailFormat));
        assert!(!check_unary(5_i64, Operator::EmailFormat));
    }

    #[test]
    fn url_format() {
        assert!(check_unary("https://example.com/path?q=1", Operator::UrlFormat));
        assert!(check_unary("HTTP://example.com", Operator::UrlFormat));
        assert!(!check_unary("ftp://example.com", Operator::UrlFormat));
        assert!(!check_unary("https://", Operator::UrlFormat));
        assert!(!check_unary(true, Operator::UrlFormat));
    }

    #[test]
    fn phone_format() {
        assert!(check_unary("+1 (415) 555-1234", Operator::PhoneFormat));
        assert!(check_unary("4155551234", Operator::PhoneFormat));
        assert!(!check_unary("12345", Operator::PhoneFormat));
        assert!(!check_unary("call me", Operator::PhoneFormat));
        assert!(!check_unary(4_155_551_234_i64, Operator::PhoneFormat));
    }

    #[test]
    fn credit_card_format() {
        assert!(check_unary("4111 1111 1111 1111", Operator::CreditCardFormat));
        assert!(check_unary("5500-0000-0000-0004", Operator::CreditCardFormat));
        assert!(!check_unary("4111 1111 1111 1112", Operator::CreditCardFormat));
        assert!(!check_unary("4111", Operator::CreditCardFormat));
        assert!(!check_unary(Value::Null, Operator::CreditCardFormat));
    }

    #[test]
    fn uuid_format() {
        assert!(check_unary(
            "123e4567-e89b-12d3-a456-426614174000",
            Operator::UuidFormat
        ));
        assert!(!check_unary("123e4567e89b12d3a456426614174000", Operator::UuidFormat));
        assert!(!check_unary(vec!["x"], Operator::UuidFormat));
    }

    #[test]
    fn before_and_after_date() {
        assert!(check("2024-01-01", Operator::BeforeDate, "2024-06-01"));
        assert!(check("2024-06-01T10:00:00Z", Operator::AfterDate, "2024-06-01"));
        assert!(!check("2024-01-01", Operator::BeforeDate, "2024-01-01"));
        assert!(!check("garbage", Operator::BeforeDate, "2024-01-01"));
        assert!(check(0_i64, Operator::BeforeDate, "1970-01-02"));
    }

    #[test]
    fn weekend_and_business_day() {
        // 2024-03-09 is a Saturday, 2024-03-11 a Monday.
        assert!(check_unary("2024-03-09", Operator::IsWeekend));
        assert!(!check_unary("2024-03-09", Operator::IsBusinessDay));
        assert!(check_unary("2024-03-11", Operator::IsBusinessDay));
        assert!(!check_unary("2024-03-11", Operator::IsWeekend));
        assert!(!check_unary("not a date", Operator::IsWeekend));
        assert!(!check_unary("not a date", Operator::IsBusinessDay));
    }

    #[test]
    fn weekday_uses_the_timestamps_own_date() {
        // Friday evening in New York is already Saturday in UTC.
        assert!(!check_unary("2024-03-08T22:00:00-05:00", Operator::IsWeekend));
        assert!(check_unary("2024-03-08T22:00:00-05:00", Operator::IsBusinessDay));
        assert!(check_unary("2024-03-09T01:00:00+09:00", Operator::IsWeekend));
        assert!(check_unary("2024-03-08T23:30:00Z", Operator::IsBusinessDay));
    }

    #[test]
    fn between_is_inclusive() {
        assert!(check(20_i64, Operator::Between, vec![20_i64, 30]));
        assert!(check(30_i64, Operator::Between, vec![20_i64, 30]));
        assert!(check(25.5_f64, Operator::Between, vec![20_i64, 30]));
        assert!(!check(31_i64, Operator::Between, vec![20_i64, 30]));
        assert!(check(31_i64, Operator::NotBetween, vec![20_i64, 30]));
        assert!(!check(20_i64, Operator::NotBetween, vec![20_i64, 30]));
    }

    #[test]
    fn malformed_range_is_false_both_ways() {
        assert!(!check(5_i64, Operator::Between, vec![1_i64]));
        assert!(!check(5_i64, Operator::NotBetween, vec![1_i64]));
        assert!(!check("5", Operator::Between, vec![1_i64, 10]));
        assert!(!check(5_i64, Operator::NotBetween, "1..10"));
    }

    #[test]
    fn multiple_of() {
        assert!(check(15_i64, Operator::MultipleOf, 5_i64));
        assert!(!check(16_i64, Operator::MultipleOf, 5_i64));
        assert!(!check(15_i64, Operator::MultipleOf, 0_i64));
        assert!(check(7.5_f64, Operator::MultipleOf, 2.5_f64));
        assert!(!check(1_i64, Operator::MultipleOf, 0.0_f64));
        assert!(check(i64::MIN, Operator::MultipleOf, -1_i64));
    }

    #[test]
    fn is_integer() {
        assert!(check_unary(3_i64, Operator::IsInteger));
        assert!(check_unary(3.0_f64, Operator::IsInteger));
        assert!(!check_unary(3.1_f64, Operator::IsInteger));
        assert!(!check_unary(f64::INFINITY, Operator::IsInteger));
        assert!(!check_unary("3", Operator::IsInteger));
    }

    #[test]
    fn length_operators() {
        assert!(check("abc", Operator::LengthEquals, 3_i64));
        assert!(check(vec![1_i64, 2, 3, 4], Operator::LengthGreaterThan, 3_i64));
        assert!(check("", Operator::LengthLessThan, 1_i64));
        assert!(!check(123_i64, Operator::LengthEquals, 3_i64));
    }

    #[test]
    fn every_operator_tolerates_missing_operands() {
        for op in Operator::ALL {
            let _ = compare(*op, None, None);
            let _ = compare(*op, Some(&Value::Null), Some(&Value::Null));
            let _ = compare(*op, Some(&Value::Map(Default::default())), Some(&Value::Bool(true)));
        }
    }
}
