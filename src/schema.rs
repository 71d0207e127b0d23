use std::fmt;

use crate::operators::parse_date;
use crate::Value;

/// Declared type of a form field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Number,
    Integer,
    Boolean,
    /// A date string or epoch milliseconds.
    Date,
    /// One of a fixed set of values.
    Choice(Vec<Value>),
    List,
    Object,
    Any,
}

impl FieldKind {
    /// Whether a non-null value has this kind.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldKind::Text => matches!(value, Value::String(_)),
            FieldKind::Number => matches!(value, Value::Int(_) | Value::Float(_)),
            FieldKind::Integer => match value {
                Value::Int(_) => true,
                Value::Float(f) => f.is_finite() && f.fract() == 0.0,
                _ => false,
            },
            FieldKind::Boolean => matches!(value, Value::Bool(_)),
            FieldKind::Date => parse_date(value).is_some(),
            FieldKind::Choice(options) => options.contains(value),
            FieldKind::List => matches!(value, Value::Array(_)),
            FieldKind::Object => matches!(value, Value::Map(_)),
            FieldKind::Any => true,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Text => write!(f, "text"),
            FieldKind::Number => write!(f, "number"),
            FieldKind::Integer => write!(f, "integer"),
            FieldKind::Boolean => write!(f, "boolean"),
            FieldKind::Date => write!(f, "date"),
            FieldKind::Choice(options) => {
                write!(f, "one of [")?;
                for (i, option) in options.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{option}")?;
                }
                write!(f, "]")
            }
            FieldKind::List => write!(f, "list"),
            FieldKind::Object => write!(f, "object"),
            FieldKind::Any => write!(f, "any"),
        }
    }
}

/// The form schema the engine is bound to.
pub trait FieldSchema {
    /// Declared field names, in declaration order.
    fn field_names(&self) -> Vec<String>;

    /// Type of a declared field; `None` for undeclared names.
    fn field_kind(&self, field: &str) -> Option<FieldKind>;

    /// Check a candidate value for a field.
    ///
    /// # Errors
    ///
    /// Every violated constraint, as a human-readable message.
    fn validate(&self, field: &str, value: &Value) -> Result<(), Vec<String>>;

    fn declares(&self, field: &str) -> bool {
        self.field_kind(field).is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
struct FieldSpec {
    name: String,
    kind: FieldKind,
    required: bool,
}

/// An in-memory [`FieldSchema`] built field by field.
///
/// ```
/// use formrules::{FieldKind, FieldSchema, FormSchema, Value};
///
/// let schema = FormSchema::new()
///     .field("name", FieldKind::Text)
///     .required("age", FieldKind::Integer);
///
/// assert!(schema.validate("age", &Value::Int(30)).is_ok());
/// assert!(schema.validate("age", &Value::Null).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormSchema {
    fields: Vec<FieldSpec>,
}

impl FormSchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an optional field. Redeclaring a name replaces it in place.
    #[must_use]
    pub fn field(self, name: &str, kind: FieldKind) -> Self {
        self.declare(name, kind, false)
    }

    /// Declare a field that must hold a non-empty value.
    #[must_use]
    pub fn required(self, name: &str, kind: FieldKind) -> Self {
        self.declare(name, kind, true)
    }

    fn declare(mut self, name: &str, kind: FieldKind, required: bool) -> Self {
        let spec = FieldSpec {
            name: name.to_owned(),
            kind,
            required,
        };
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => *existing = spec,
            None => self.fields.push(spec),
        }
        self
    }

    fn spec(&self, field: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == field)
    }
}

impl FieldSchema for FormSchema {
    fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    fn field_kind(&self, field: &str) -> Option<FieldKind> {
        self.spec(field).map(|f| f.kind.clone())
    }

    fn validate(&self, field: &str, value: &Value) -> Result<(), Vec<String>> {
        let Some(spec) = self.spec(field) else {
            return Err(vec![format!("field '{field}' is not declared")]);
        };
        if value.is_blank() {
            return if spec.required {
                Err(vec![format!("{field} is required")])
            } else {
                Ok(())
            };
        }
        if spec.kind.accepts(value) {
            Ok(())
        } else {
            Err(vec![format!(
                "{field} must be {}, got {}",
                spec.kind,
                value.type_name()
            )])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FormSchema {
        FormSchema::new()
            .field("name", FieldKind::Text)
            .required("age", FieldKind::Integer)
            .field("start", FieldKind::Date)
            .field(
                "color",
                FieldKind::Choice(vec![Value::from("red"), Value::from("blue")]),
            )
    }

    #[test]
    fn names_in_declaration_order() {
        assert_eq!(schema().field_names(), vec!["name", "age", "start", "color"]);
    }

    #[test]
    fn redeclare_replaces() {
        let schema = schema().field("name", FieldKind::Any);
        assert_eq!(schema.field_names().len(), 4);
        assert_eq!(schema.field_kind("name"), Some(FieldKind::Any));
    }

    #[test]
    fn declares() {
        let schema = schema();
        assert!(schema.declares("age"));
        assert!(!schema.declares("ghost"));
    }

    #[test]
    fn validate_kinds() {
        let schema = schema();
        assert!(schema.validate("name", &Value::from("Ada")).is_ok());
        assert!(schema.validate("age", &Value::Float(30.0)).is_ok());
        assert!(schema.validate("start", &Value::from("2024-02-29")).is_ok());
        assert!(schema.validate("color", &Value::from("red")).is_ok());

        assert_eq!(
            schema.validate("age", &Value::from("thirty")),
            Err(vec!["age must be integer, got string".to_owned()])
        );
        assert!(schema.validate("start", &Value::from("someday")).is_err());
        assert_eq!(
            schema.validate("color", &Value::from("green")),
            Err(vec![r#"color must be one of ["red", "blue"], got string"#.to_owned()])
        );
    }

    #[test]
    fn validate_blank_values() {
        let schema = schema();
        assert!(schema.validate("name", &Value::Null).is_ok());
        assert!(schema.validate("name", &Value::from("")).is_ok());
        assert_eq!(
            schema.validate("age", &Value::Null),
            Err(vec!["age is required".to_owned()])
        );
    }

    #[test]
    fn validate_undeclared_field() {
        assert!(schema().validate("ghost", &Value::Int(1)).is_err());
    }
}
