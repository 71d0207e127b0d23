use std::collections::BTreeMap;

use crate::{FormData, Value};

/// Handle onto the live form the engine drives.
pub trait FormBinding {
    /// Snapshot of the current field values.
    fn values(&self) -> FormData;

    fn value(&self, field: &str) -> Option<Value> {
        self.values().get(field).cloned()
    }

    /// Set a field's live value. `None` resets the field to empty.
    fn set_value(&mut self, field: &str, value: Option<Value>);

    fn clear_error(&mut self, field: &str);

    /// Publish validation messages for a field. Bindings without an error
    /// display can ignore this.
    fn set_errors(&mut self, _field: &str, _errors: Vec<String>) {}
}

/// A change notification from the host form.
///
/// The engine always re-reads values from the binding. The reported value is
/// only logged, so a stale or missing payload is harmless.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldChange {
    Field { name: String, value: Option<Value> },
    Any,
}

impl FieldChange {
    #[must_use]
    pub fn field(name: &str, value: impl Into<Value>) -> Self {
        FieldChange::Field {
            name: name.to_owned(),
            value: Some(value.into()),
        }
    }
}

/// A [`FormBinding`] over plain maps. Used by tests, demos and hosts that keep
/// form state themselves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryBinding {
    values: FormData,
    errors: BTreeMap<String, Vec<String>>,
}

impl MemoryBinding {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_value(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.values.insert(field.to_owned(), value.into());
        self
    }

    /// Set a value and return the change to pass to
    /// [`FormEngine::notify`](crate::FormEngine::notify).
    pub fn update(&mut self, field: &str, value: impl Into<Value>) -> FieldChange {
        let value = value.into();
        self.values.insert(field.to_owned(), value.clone());
        FieldChange::Field {
            name: field.to_owned(),
            value: Some(value),
        }
    }

    #[must_use]
    pub fn errors(&self, field: &str) -> &[String] {
        self.errors.get(field).map_or(&[], Vec::as_slice)
    }
}

impl FormBinding for MemoryBinding {
    fn values(&self) -> FormData {
        self.values.clone()
    }

    fn value(&self, field: &str) -> Option<Value> {
        self.values.get(field).cloned()
    }

    fn set_value(&mut self, field: &str, value: Option<Value>) {
        match value {
            Some(value) => {
                self.values.insert(field.to_owned(), value);
            }
            None => {
                self.values.remove(field);
            }
        }
    }

    fn clear_error(&mut self, field: &str) {
        self.errors.remove(field);
    }

    fn set_errors(&mut self, field: &str, errors: Vec<String>) {
        if errors.is_empty() {
            self.errors.remove(field);
        } else {
            self.errors.insert(field.to_owned(), errors);
        }
    }
}
