use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

use winnow::ascii::{dec_int, dec_uint, till_line_ending};
use winnow::combinator::{
    alt, cut_err, delimited, eof, not, opt, preceded, repeat, separated, terminated,
};
use winnow::error::{ContextError, ErrMode, ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::{any, one_of, take_while};

use crate::{
    not as negate, ActionKind, BaseCondition, Condition, DynamicValue, Operator, Rule, RuleAction,
    Value,
};

const RESERVED: &[&str] = &[
    "rule", "when", "then", "AND", "and", "OR", "or", "NOT", "not",
];

// -- Whitespace & comments --------------------------------------------------

pub(crate) fn ws(input: &mut &str) -> ModalResult<()> {
    let _: () = repeat(
        0..,
        alt((
            take_while(1.., |c: char| c.is_ascii_whitespace()).void(),
            ('#', till_line_ending).void(),
        )),
    )
    .parse_next(input)?;
    Ok(())
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// A word that is not immediately followed by more identifier characters.
fn keyword<'i>(word: &'static str) -> impl Parser<&'i str, &'i str, ErrMode<ContextError>> {
    move |input: &mut &'i str| -> ModalResult<&'i str> {
        terminated(word, not(one_of(is_ident_char))).parse_next(input)
    }
}

// -- Identifiers ------------------------------------------------------------

fn ident<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        take_while(1.., |c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., is_ident_char),
    )
        .take()
        .parse_next(input)
}

/// An identifier that is not a keyword of the language.
fn name<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    ident
        .verify(|s: &str| !RESERVED.contains(&s))
        .parse_next(input)
}

// -- Literals ---------------------------------------------------------------

fn string_literal(input: &mut &str) -> ModalResult<String> {
    '"'.parse_next(input)?;
    let mut s = String::new();
    loop {
        let ch = any.parse_next(input)?;
        match ch {
            '"' => return Ok(s),
            '\\' => {
                let esc = any.parse_next(input)?;
                match esc {
                    '"' => s.push('"'),
                    '\\' => s.push('\\'),
                    'n' => s.push('\n'),
                    't' => s.push('\t'),
                    other => {
                        s.push('\\');
                        s.push(other);
                    }
                }
            }
            c => s.push(c),
        }
    }
}

fn number(input: &mut &str) -> ModalResult<Value> {
    let text = (
        opt('-'),
        take_while(1.., |c: char| c.is_ascii_digit()),
        opt(('.', take_while(1.., |c: char| c.is_ascii_digit()))),
    )
        .take()
        .parse_next(input)?;
    if text.contains('.') {
        text.parse::<f64>()
            .map(Value::Float)
            .map_err(|_| ErrMode::from_input(input).cut())
    } else {
        text.parse::<i64>()
            .map(Value::Int)
            .map_err(|_| ErrMode::from_input(input).cut())
    }
}

fn array_literal(input: &mut &str) -> ModalResult<Value> {
    delimited(
        ('[', ws),
        separated(0.., literal, (ws, ',', ws)),
        (ws, opt((',', ws)), cut_err(']')),
    )
    .map(Value::Array)
    .parse_next(input)
}

fn map_literal(input: &mut &str) -> ModalResult<Value> {
    let entries: Vec<(String, Value)> = delimited(
        ('{', ws),
        separated(0.., map_entry, (ws, ',', ws)),
        (ws, opt((',', ws)), cut_err('}')),
    )
    .parse_next(input)?;
    Ok(Value::Map(entries.into_iter().collect()))
}

fn map_entry(input: &mut &str) -> ModalResult<(String, Value)> {
    let key = alt((string_literal, ident.map(str::to_owned))).parse_next(input)?;
    (ws, cut_err(':'), ws).parse_next(input)?;
    let value = cut_err(literal).parse_next(input)?;
    Ok((key, value))
}

fn literal(input: &mut &str) -> ModalResult<Value> {
    alt((
        string_literal.map(Value::String),
        keyword("true").value(Value::Bool(true)),
        keyword("false").value(Value::Bool(false)),
        keyword("null").value(Value::Null),
        number,
        array_literal,
        map_literal,
    ))
    .context(StrContext::Expected(StrContextValue::Description("literal")))
    .parse_next(input)
}

// -- Dynamic values ---------------------------------------------------------

fn field_reference(input: &mut &str) -> ModalResult<DynamicValue> {
    let path = preceded('$', cut_err(ident)).parse_next(input)?;
    Ok(match path.split_once('.') {
        Some((field, property)) => DynamicValue::Field {
            field: field.to_owned(),
            property: Some(property.to_owned()),
        },
        None => DynamicValue::Field {
            field: path.to_owned(),
            property: None,
        },
    })
}

fn context_reference(input: &mut &str) -> ModalResult<DynamicValue> {
    let key = preceded('@', cut_err(ident)).parse_next(input)?;
    Ok(DynamicValue::Context {
        key: key.to_owned(),
    })
}

fn function_call(input: &mut &str) -> ModalResult<DynamicValue> {
    let name = ident.parse_next(input)?;
    let args = delimited(
        ('(', ws),
        separated(0.., dynamic_value, (ws, ',', ws)),
        (ws, cut_err(')')),
    )
    .parse_next(input)?;
    Ok(DynamicValue::Function {
        name: name.to_owned(),
        args,
    })
}

fn dynamic_value(input: &mut &str) -> ModalResult<DynamicValue> {
    ws.parse_next(input)?;
    alt((
        field_reference,
        context_reference,
        literal.map(DynamicValue::Literal),
        function_call,
    ))
    .context(StrContext::Expected(StrContextValue::Description("value")))
    .parse_next(input)
}

// -- Conditions (precedence: OR < AND < NOT < primary) ----------------------

fn operator(input: &mut &str) -> ModalResult<Operator> {
    take_while(1.., |c: char| c.is_ascii_lowercase() || c == '_')
        .try_map(Operator::from_str)
        .context(StrContext::Expected(StrContextValue::Description("operator")))
        .parse_next(input)
}

fn comparison(input: &mut &str) -> ModalResult<Condition> {
    let field = name.parse_next(input)?;
    let transform = opt(preceded((ws, '|', ws), cut_err(ident))).parse_next(input)?;
    ws.parse_next(input)?;
    let operator = cut_err(operator).parse_next(input)?;
    let value = if operator.is_unary() {
        DynamicValue::Literal(Value::Null)
    } else {
        cut_err(dynamic_value).parse_next(input)?
    };
    Ok(Condition::Base(BaseCondition {
        field: field.to_owned(),
        operator,
        value,
        transform: transform.map(str::to_owned),
    }))
}

fn primary(input: &mut &str) -> ModalResult<Condition> {
    ws.parse_next(input)?;
    alt((delimited('(', condition, (ws, cut_err(')'))), comparison))
        .context(StrContext::Expected(StrContextValue::Description(
            "condition",
        )))
        .parse_next(input)
}

fn unary(input: &mut &str) -> ModalResult<Condition> {
    ws.parse_next(input)?;
    if opt(alt((keyword("NOT"), keyword("not"))))
        .parse_next(input)?
        .is_some()
    {
        let inner = cut_err(unary).parse_next(input)?;
        Ok(negate(inner))
    } else {
        primary(input)
    }
}

fn and_expr(input: &mut &str) -> ModalResult<Condition> {
    let first = unary(input)?;
    let rest: Vec<Condition> = repeat(
        0..,
        preceded((ws, alt((keyword("AND"), keyword("and")))), cut_err(unary)),
    )
    .parse_next(input)?;
    Ok(rest.into_iter().fold(first, Condition::and))
}

fn or_expr(input: &mut &str) -> ModalResult<Condition> {
    let first = and_expr(input)?;
    let rest: Vec<Condition> = repeat(
        0..,
        preceded((ws, alt((keyword("OR"), keyword("or")))), cut_err(and_expr)),
    )
    .parse_next(input)?;
    Ok(rest.into_iter().fold(first, Condition::or))
}

pub(crate) fn condition(input: &mut &str) -> ModalResult<Condition> {
    ws.parse_next(input)?;
    or_expr(input)
}

// -- Actions ----------------------------------------------------------------

fn target<'i>(input: &mut &'i str) -> ModalResult<Option<&'i str>> {
    opt(preceded(ws, name)).parse_next(input)
}

fn assigned(input: &mut &str) -> ModalResult<DynamicValue> {
    preceded((ws, '=', ws), cut_err(dynamic_value)).parse_next(input)
}

fn quoted(input: &mut &str) -> ModalResult<String> {
    preceded(ws, cut_err(string_literal))
        .context(StrContext::Expected(StrContextValue::Description(
            "quoted string",
        )))
        .parse_next(input)
}

fn params(input: &mut &str) -> ModalResult<BTreeMap<String, Value>> {
    let entries: Vec<(String, Value)> = delimited(
        (ws, '(', ws),
        separated(0.., map_entry, (ws, ',', ws)),
        (ws, cut_err(')')),
    )
    .parse_next(input)?;
    Ok(entries.into_iter().collect())
}

fn action(input: &mut &str) -> ModalResult<RuleAction> {
    ws.parse_next(input)?;
    let kind = ident
        .context(StrContext::Expected(StrContextValue::Description("action")))
        .parse_next(input)?;

    let (kind, target) = match kind {
        "show" => (ActionKind::Show, target(input)?),
        "hide" => (ActionKind::Hide, target(input)?),
        "enable" => (ActionKind::Enable, target(input)?),
        "disable" => (ActionKind::Disable, target(input)?),
        "require" | "optional" => {
            let required = Some(kind == "require");
            let target = target(input)?;
            (ActionKind::SetValue { value: None, required }, target)
        }
        "set_value" => {
            let target = target(input)?;
            let value = assigned(input)?;
            (
                ActionKind::SetValue {
                    value: Some(value),
                    required: None,
                },
                target,
            )
        }
        "clear_value" => (ActionKind::ClearValue, target(input)?),
        "show_warning" | "show_error" => {
            let target = target(input)?;
            let message = quoted(input)?;
            let kind = if kind == "show_warning" {
                ActionKind::ShowWarning { message }
            } else {
                ActionKind::ShowError { message }
            };
            (kind, target)
        }
        "add_class" | "remove_class" => {
            let target = target(input)?;
            let class = quoted(input)?;
            let kind = if kind == "add_class" {
                ActionKind::AddClass { class }
            } else {
                ActionKind::RemoveClass { class }
            };
            (kind, target)
        }
        "set_options" => {
            let target = target(input)?;
            let options = assigned(input)?;
            (ActionKind::SetOptions { options }, target)
        }
        "trigger_validation" => (ActionKind::TriggerValidation, target(input)?),
        "custom" => {
            let name = preceded(ws, cut_err(ident)).parse_next(input)?;
            let params = opt(params).parse_next(input)?.unwrap_or_default();
            let value = opt(assigned).parse_next(input)?;
            (
                ActionKind::Custom {
                    name: name.to_owned(),
                    value,
                    params,
                },
                None,
            )
        }
        _ => return Err(ErrMode::from_input(input).cut()),
    };

    Ok(RuleAction {
        kind,
        target: target.map(str::to_owned),
    })
}

// -- Rule definitions -------------------------------------------------------

#[derive(Clone)]
enum Annotation {
    Priority(i32),
    Debounce(Duration),
    Disabled,
}

fn annotation(input: &mut &str) -> ModalResult<Annotation> {
    delimited(
        (ws, '(', ws),
        cut_err(alt((
            preceded((keyword("priority"), ws), dec_int::<_, i32, _>).map(Annotation::Priority),
            preceded((keyword("debounce"), ws), dec_uint::<_, u64, _>)
                .map(|ms: u64| Annotation::Debounce(Duration::from_millis(ms))),
            keyword("disabled").value(Annotation::Disabled),
        )))
        .context(StrContext::Expected(StrContextValue::Description(
            "annotation",
        ))),
        (ws, cut_err(')')),
    )
    .parse_next(input)
}

fn rule_def(input: &mut &str) -> ModalResult<Rule> {
    ws.parse_next(input)?;
    keyword("rule").parse_next(input)?;
    ws.parse_next(input)?;

    let id = cut_err(name)
        .context(StrContext::Expected(StrContextValue::Description(
            "rule id",
        )))
        .parse_next(input)?;
    let title = opt(preceded(ws, string_literal)).parse_next(input)?;
    let subject = opt(preceded((ws, keyword("on"), ws), cut_err(name))).parse_next(input)?;
    let annotations: Vec<Annotation> = repeat(0.., annotation).parse_next(input)?;

    (ws, cut_err(':'), ws).parse_next(input)?;
    cut_err(keyword("when"))
        .context(StrContext::Expected(StrContextValue::StringLiteral("when")))
        .parse_next(input)?;
    let condition = cut_err(condition).parse_next(input)?;

    (ws, cut_err(keyword("then")))
        .context(StrContext::Expected(StrContextValue::StringLiteral("then")))
        .parse_next(input)?;
    let actions: Vec<RuleAction> =
        cut_err(separated(1.., action, (ws, ','))).parse_next(input)?;

    let mut rule = Rule::new(condition, actions);
    rule.id = Some(id.to_owned());
    rule.name = title;
    rule.field = subject.map(str::to_owned);
    for annotation in annotations {
        match annotation {
            Annotation::Priority(p) => rule.priority = Some(p),
            Annotation::Debounce(d) => rule.debounce = Some(d),
            Annotation::Disabled => rule.enabled = false,
        }
    }
    Ok(rule)
}

// -- Top-level parser -------------------------------------------------------

pub(crate) fn parse_rules(input: &mut &str) -> ModalResult<Vec<Rule>> {
    let rules: Vec<Rule> = repeat(0.., rule_def).parse_next(input)?;
    ws.parse_next(input)?;
    eof.parse_next(input)?;
    Ok(rules)
}
