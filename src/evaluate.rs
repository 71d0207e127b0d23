use tracing::trace;

use crate::operators::compare;
use crate::resolve::resolve;
use crate::{BaseCondition, ComplexCondition, Condition, EvalError, Functions, Logic, RuleContext, Value};

/// Evaluate any condition.
///
/// # Errors
///
/// [`EvalError::UnknownFunction`] when a base condition at the top level
/// references an unregistered function. Errors inside complex conditions
/// fold to `false` and never reach the caller.
pub fn evaluate(
    condition: &Condition,
    ctx: &RuleContext,
    functions: &Functions,
) -> Result<bool, EvalError> {
    match condition {
        Condition::Base(base) => evaluate_base(base, ctx, functions),
        Condition::Complex(complex) => Ok(evaluate_complex(complex, ctx, functions)),
    }
}

/// Evaluate a single comparison.
///
/// The field value is read from the form data (exact key first, then a
/// dotted path), passed through the named transform when one is registered,
/// and compared against the resolved right-hand value. Unary operators do
/// not resolve their right-hand value at all.
///
/// # Errors
///
/// Only definition errors (`UnknownFunction`, `UnknownOperator`) propagate.
/// A failing custom function makes the condition `false`.
pub fn evaluate_base(
    condition: &BaseCondition,
    ctx: &RuleContext,
    functions: &Functions,
) -> Result<bool, EvalError> {
    let left = field_value(condition, ctx, functions);
    let right = if condition.operator.is_unary() {
        None
    } else {
        match resolve(&condition.value, ctx, functions) {
            Ok(v) => v,
            Err(e) if e.is_definition_error() => return Err(e),
            Err(e) => {
                trace!(field = %condition.field, error = %e, "condition value failed to resolve");
                return Ok(false);
            }
        }
    };
    Ok(compare(condition.operator, left.as_ref(), right.as_ref()))
}

/// Evaluate a boolean combination. Every child error counts as `false`.
///
/// `And` over no children is `true`, `Or` over no children is `false`, and
/// `Not` negates its first child only.
#[must_use]
pub fn evaluate_complex(
    condition: &ComplexCondition,
    ctx: &RuleContext,
    functions: &Functions,
) -> bool {
    let child = |c: &Condition| match evaluate(c, ctx, functions) {
        Ok(b) => b,
        Err(e) => {
            trace!(condition = %c, error = %e, "nested condition failed, treating as false");
            false
        }
    };
    match condition.logic {
        Logic::And => condition.conditions.iter().all(child),
        Logic::Or => condition.conditions.iter().any(child),
        Logic::Not => !condition.conditions.first().is_some_and(child),
    }
}

fn field_value(condition: &BaseCondition, ctx: &RuleContext, functions: &Functions) -> Option<Value> {
    let value = ctx.field(&condition.field)?;
    match condition
        .transform
        .as_deref()
        .and_then(|name| functions.get_transform(name))
    {
        Some(transform) => Some(transform(value)),
        None => Some(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{all, any, call, context_ref, field, field_ref, not, FunctionError};

    fn eval(condition: &Condition, ctx: &RuleContext) -> Result<bool, EvalError> {
        evaluate(condition, ctx, &Functions::with_builtin_transforms())
    }

    #[test]
    fn eval_simple_equals() {
        let ctx = RuleContext::new().with_field("maritalStatus", "married");
        assert_eq!(eval(&field("maritalStatus").equals("married"), &ctx), Ok(true));
        assert_eq!(eval(&field("maritalStatus").equals("single"), &ctx), Ok(false));
    }

    #[test]
    fn eval_missing_field() {
        let ctx = RuleContext::new();
        assert_eq!(eval(&field("nope").equals(1_i64), &ctx), Ok(false));
        assert_eq!(eval(&field("nope").is_empty(), &ctx), Ok(true));
        assert_eq!(eval(&field("nope").not_equals(1_i64), &ctx), Ok(true));
    }

    #[test]
    fn eval_nested_and() {
        let cond = all(vec![
            field("salary").greater_than(100_000_i64),
            field("isAdmin").equals(true),
        ]);
        let admin = RuleContext::new()
            .with_field("salary", 120_000_i64)
            .with_field("isAdmin", true);
        let staff = RuleContext::new()
            .with_field("salary", 120_000_i64)
            .with_field("isAdmin", false);
        assert_eq!(eval(&cond, &admin), Ok(true));
        assert_eq!(eval(&cond, &staff), Ok(false));
    }

    #[test]
    fn eval_empty_combinators() {
        let ctx = RuleContext::new();
        assert_eq!(eval(&all(vec![]), &ctx), Ok(true));
        assert_eq!(eval(&any(vec![]), &ctx), Ok(false));
    }

    #[test]
    fn eval_or_logic() {
        let ctx = RuleContext::new().with_field("country", "NO");
        let cond = field("country").equals("SE").or(field("country").equals("NO"));
        assert_eq!(eval(&cond, &ctx), Ok(true));
    }

    #[test]
    fn eval_not_negates_first_child_only() {
        let ctx = RuleContext::new().with_field("a", 1_i64);
        let cond = Condition::Complex(ComplexCondition {
            logic: Logic::Not,
            conditions: vec![field("a").equals(2_i64), field("a").equals(2_i64).and(field("x").is_empty())],
        });
        assert_eq!(eval(&cond, &ctx), Ok(true));
        assert_eq!(eval(&not(field("a").equals(1_i64)), &ctx), Ok(false));
        assert_eq!(eval(&!field("a").equals(2_i64), &ctx), Ok(true));
    }

    #[test]
    fn eval_empty_not_is_true() {
        let cond = Condition::Complex(ComplexCondition {
            logic: Logic::Not,
            conditions: vec![],
        });
        assert_eq!(eval(&cond, &RuleContext::new()), Ok(true));
    }

    #[test]
    fn eval_transform_applies_before_compare() {
        let ctx = RuleContext::new().with_field("email", "  Jane@Example.COM ");
        let cond = field("email").transformed("trim").ends_with(".COM");
        assert_eq!(eval(&cond, &ctx), Ok(true));
        let cond = field("email").transformed("lowercase").contains("example");
        assert_eq!(eval(&cond, &ctx), Ok(true));
    }

    #[test]
    fn eval_unknown_transform_is_ignored() {
        let ctx = RuleContext::new().with_field("n", 3_i64);
        let cond = field("n").transformed("square").equals(3_i64);
        assert_eq!(eval(&cond, &ctx), Ok(true));
    }

    #[test]
    fn eval_field_reference_on_right() {
        let ctx = RuleContext::new()
            .with_field("password", "hunter2")
            .with_field("confirm", "hunter2");
        assert_eq!(eval(&field("confirm").equals(field_ref("password")), &ctx), Ok(true));
    }

    #[test]
    fn eval_context_reference_on_right() {
        let ctx = RuleContext::new()
            .with_field("amount", 500_i64)
            .with_metadata("limit", 1000_i64);
        assert_eq!(
            eval(&field("amount").less_than(context_ref("metadata.limit")), &ctx),
            Ok(true)
        );
    }

    #[test]
    fn eval_dotted_field_name() {
        let address: Value = [("zip", "0150")].into_iter().collect();
        let ctx = RuleContext::new().with_field("address", address);
        assert_eq!(eval(&field("address.zip").length_equals(4_i64), &ctx), Ok(true));
    }

    #[test]
    fn unknown_function_propagates_at_top_level() {
        let ctx = RuleContext::new().with_field("x", 1_i64);
        let cond = field("x").equals(call("missing", vec![]));
        assert_eq!(
            eval(&cond, &ctx),
            Err(EvalError::UnknownFunction {
                name: "missing".into()
            })
        );
    }

    #[test]
    fn unknown_function_folds_to_false_when_nested() {
        let ctx = RuleContext::new().with_field("x", 1_i64);
        let bad = field("x").equals(call("missing", vec![]));
        assert_eq!(eval(&all(vec![bad.clone()]), &ctx), Ok(false));
        assert_eq!(eval(&not(bad), &ctx), Ok(true));
    }

    #[test]
    fn failing_function_is_false() {
        let fns = Functions::new().function("boom", |_| Err(FunctionError::new("kaboom")));
        let ctx = RuleContext::new().with_field("x", 1_i64);
        let cond = field("x").equals(call("boom", vec![]));
        assert_eq!(evaluate(&cond, &ctx, &fns), Ok(false));
    }

    #[test]
    fn unary_operator_ignores_unresolvable_value() {
        let ctx = RuleContext::new().with_field("x", "");
        let cond = Condition::Base(BaseCondition {
            field: "x".into(),
            operator: crate::Operator::IsEmpty,
            value: call("missing", vec![]),
            transform: None,
        });
        assert_eq!(eval(&cond, &ctx), Ok(true));
    }

    #[test]
    fn custom_function_on_right() {
        let fns = Functions::new().function("double", |args| match args {
            [Value::Int(n)] => Ok(Value::Int(n * 2)),
            _ => Err(FunctionError::new("expected one integer")),
        });
        let ctx = RuleContext::new().with_field("total", 42_i64).with_field("half", 21_i64);
        let cond = field("total").equals(call("double", vec![field_ref("half")]));
        assert_eq!(evaluate(&cond, &ctx, &fns), Ok(true));
    }
}
