use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::error::FunctionError;
use super::Value;

/// A host function callable from [`DynamicValue::Function`](crate::DynamicValue::Function).
pub type CustomFn = Arc<dyn Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync>;

/// A pure function applied to a field value before comparison.
pub type TransformFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Name-keyed registries of custom functions and value transforms.
///
/// Cloning is cheap; the functions themselves are shared.
#[derive(Clone, Default)]
pub struct Functions {
    functions: HashMap<String, CustomFn>,
    transforms: HashMap<String, TransformFn>,
}

impl Functions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-loaded with the `trim`, `lowercase`, `uppercase` and
    /// `to_number` transforms.
    #[must_use]
    pub fn with_builtin_transforms() -> Self {
        Self::new()
            .transform("trim", |v| map_str(v, |s| s.trim().to_owned()))
            .transform("lowercase", |v| map_str(v, str::to_lowercase))
            .transform("uppercase", |v| map_str(v, str::to_uppercase))
            .transform("to_number", to_number)
    }

    /// Register a custom function.
    #[must_use]
    pub fn function(
        mut self,
        name: &str,
        f: impl Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync + 'static,
    ) -> Self {
        self.insert_function(name, f);
        self
    }

    /// Register a transform.
    #[must_use]
    pub fn transform(
        mut self,
        name: &str,
        f: impl Fn(&Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.insert_transform(name, f);
        self
    }

    /// Register a custom function (mutable reference version).
    pub fn insert_function(
        &mut self,
        name: &str,
        f: impl Fn(&[Value]) -> Result<Value, FunctionError> + Send + Sync + 'static,
    ) {
        self.functions.insert(name.to_owned(), Arc::new(f));
    }

    /// Register a transform (mutable reference version).
    pub fn insert_transform(&mut self, name: &str, f: impl Fn(&Value) -> Value + Send + Sync + 'static) {
        self.transforms.insert(name.to_owned(), Arc::new(f));
    }

    #[must_use]
    pub fn get_function(&self, name: &str) -> Option<&CustomFn> {
        self.functions.get(name)
    }

    #[must_use]
    pub fn get_transform(&self, name: &str) -> Option<&TransformFn> {
        self.transforms.get(name)
    }

    #[must_use]
    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }
}

fn map_str(value: &Value, f: impl Fn(&str) -> String) -> Value {
    match value {
        Value::String(s) => Value::String(f(s)),
        other => other.clone(),
    }
}

fn to_number(value: &Value) -> Value {
    match value {
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .map(Value::Int)
                .or_else(|_| s.parse::<f64>().map(Value::Float))
                .unwrap_or(Value::Null)
        }
        Value::Bool(b) => Value::Int(i64::from(*b)),
        other => other.clone(),
    }
}

impl fmt::Debug for Functions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut functions: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        let mut transforms: Vec<&str> = self.transforms.keys().map(String::as_str).collect();
        functions.sort_unstable();
        transforms.sort_unstable();
        f.debug_struct("Functions")
            .field("functions", &functions)
            .field("transforms", &transforms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_call_function() {
        let fns = Functions::new().function("double", |args| {
            let n = args.first().and_then(Value::as_f64).unwrap_or_default();
            Ok(Value::Float(n * 2.0))
        });
        let f = fns.get_function("double").unwrap();
        assert_eq!(f(&[Value::Int(21)]), Ok(Value::Float(42.0)));
        assert!(fns.has_function("double"));
        assert!(fns.get_function("triple").is_none());
    }

    #[test]
    fn builtin_transforms() {
        let fns = Functions::with_builtin_transforms();
        let trim = fns.get_transform("trim").unwrap();
        let lower = fns.get_transform("lowercase").unwrap();
        let number = fns.get_transform("to_number").unwrap();
        assert_eq!(trim(&Value::from("  a ")), Value::from("a"));
        assert_eq!(lower(&Value::from("ABC")), Value::from("abc"));
        assert_eq!(lower(&Value::Int(1)), Value::Int(1));
        assert_eq!(number(&Value::from(" 42 ")), Value::Int(42));
        assert_eq!(number(&Value::from("2.5")), Value::Float(2.5));
        assert_eq!(number(&Value::from("abc")), Value::Null);
    }

    #[test]
    fn debug_lists_sorted_names() {
        let fns = Functions::new()
            .function("b", |_| Ok(Value::Null))
            .function("a", |_| Ok(Value::Null));
        assert_eq!(
            format!("{fns:?}"),
            r#"Functions { functions: ["a", "b"], transforms: [] }"#
        );
    }
}
