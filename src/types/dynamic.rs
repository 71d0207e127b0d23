use std::fmt;

use super::Value;

/// An expression resolved to a [`Value`] at evaluation time.
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue {
    /// A literal, returned unchanged.
    Literal(Value),
    /// The current value of a form field, optionally a dotted property path
    /// inside it.
    Field {
        field: String,
        property: Option<String>,
    },
    /// A dotted path into the evaluation context.
    Context { key: String },
    /// A call to a host-registered function. Arguments are resolved first.
    Function {
        name: String,
        args: Vec<DynamicValue>,
    },
}

macro_rules! literal_from {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for DynamicValue {
                fn from(v: $ty) -> Self {
                    DynamicValue::Literal(v.into())
                }
            }
        )+
    };
}

literal_from!(Value, i64, i32, f64, bool, &str, String, Vec<Value>, Vec<i64>, Vec<&str>);

impl fmt::Display for DynamicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DynamicValue::Literal(v) => write!(f, "{v}"),
            DynamicValue::Field {
                field,
                property: None,
            } => write!(f, "${field}"),
            DynamicValue::Field {
                field,
                property: Some(property),
            } => write!(f, "${field}.{property}"),
            DynamicValue::Context { key } => write!(f, "@{key}"),
            DynamicValue::Function { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Reference to another field's current value.
#[must_use]
pub fn field_ref(field: &str) -> DynamicValue {
    DynamicValue::Field {
        field: field.to_owned(),
        property: None,
    }
}

/// Reference to a property path inside another field's current value.
#[must_use]
pub fn field_prop(field: &str, property: &str) -> DynamicValue {
    DynamicValue::Field {
        field: field.to_owned(),
        property: Some(property.to_owned()),
    }
}

/// Reference to a dotted path in the evaluation context, e.g. `"user.role"`.
#[must_use]
pub fn context_ref(key: &str) -> DynamicValue {
    DynamicValue::Context {
        key: key.to_owned(),
    }
}

/// Call to a registered custom function.
#[must_use]
pub fn call(name: &str, args: Vec<DynamicValue>) -> DynamicValue {
    DynamicValue::Function {
        name: name.to_owned(),
        args,
    }
}
