use formrules::{compare, evaluate, field, not, Functions, Operator, RuleContext, Value};
use proptest::prelude::*;

/// Generate a random `Value`.
fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<i64>().prop_map(Value::Int),
        any::<f64>()
            .prop_filter("must be finite", |f| f.is_finite())
            .prop_map(Value::Float),
        any::<bool>().prop_map(Value::Bool),
        "[a-z@.:/ -]{0,12}".prop_map(Value::String),
        Just(Value::from("2024-06-15")),
        Just(Value::from("4111 1111 1111 1111")),
    ];
    leaf.prop_recursive(2, 8, 3, |inner| {
        prop::collection::vec(inner, 0..3).prop_map(Value::Array)
    })
}

/// Generate a field name from a small alphabet to increase collisions.
fn arb_field_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("x".to_owned()),
        Just("y".to_owned()),
        Just("a.b".to_owned()),
    ]
}

fn arb_operator() -> impl Strategy<Value = Operator> {
    prop::sample::select(Operator::ALL)
}

proptest! {
    /// Known operators never fail, whatever the operands.
    #[test]
    fn eval_never_fails(
        name in arb_field_name(),
        op in arb_operator(),
        operand in arb_value(),
        field_value in arb_value(),
    ) {
        let ctx = RuleContext::new().with_field(&name, field_value);
        let cond = field(&name).compare(op, operand);
        prop_assert!(evaluate(&cond, &ctx, &Functions::new()).is_ok());
    }

    /// NOT(NOT(x)) == x for any evaluation.
    #[test]
    fn double_negation(
        op in arb_operator(),
        operand in arb_value(),
        field_value in prop::option::of(arb_value()),
    ) {
        let mut ctx = RuleContext::new();
        if let Some(value) = field_value {
            ctx = ctx.with_field("x", value);
        }
        let functions = Functions::new();
        let cond = field("x").compare(op, operand);
        let plain = evaluate(&cond, &ctx, &functions).unwrap();
        let doubled = evaluate(&not(not(cond)), &ctx, &functions).unwrap();
        prop_assert_eq!(plain, doubled);
    }

    /// Equality is symmetric.
    #[test]
    fn equals_is_symmetric(a in prop::option::of(arb_value()), b in prop::option::of(arb_value())) {
        prop_assert_eq!(
            compare(Operator::Equals, a.as_ref(), b.as_ref()),
            compare(Operator::Equals, b.as_ref(), a.as_ref())
        );
    }

    /// Every integer is a multiple of one.
    #[test]
    fn integers_are_multiples_of_one(n in any::<i64>()) {
        let v = Value::Int(n);
        prop_assert!(compare(Operator::IsInteger, Some(&v), None));
        prop_assert!(compare(Operator::MultipleOf, Some(&v), Some(&Value::Int(1))));
    }

    /// Strict and non-strict orderings agree on numbers.
    #[test]
    fn ordering_is_consistent(a in any::<i64>(), b in any::<i64>()) {
        let (a, b) = (Value::Int(a), Value::Int(b));
        let gt = compare(Operator::GreaterThan, Some(&a), Some(&b));
        let lte = compare(Operator::LessThanOrEqual, Some(&a), Some(&b));
        prop_assert_eq!(gt, !lte);
    }
}
