use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};

use super::Value;

/// Current field values of a form, keyed by field name.
pub type FormData = BTreeMap<String, Value>;

/// The data a single evaluation pass runs against.
///
/// `form_data` is rebuilt from the form binding every cycle; the remaining
/// members are host-supplied auxiliary data reachable through
/// [`DynamicValue::Context`](crate::DynamicValue::Context) references.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleContext {
    pub form_data: FormData,
    pub user: Option<Value>,
    pub permissions: Vec<String>,
    pub metadata: BTreeMap<String, Value>,
    pub timestamp: Option<DateTime<Utc>>,
    pub custom: BTreeMap<String, Value>,
}

impl RuleContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a form field value.
    #[must_use]
    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.form_data.insert(name.to_owned(), value.into());
        self
    }

    #[must_use]
    pub fn with_form_data(mut self, form_data: FormData) -> Self {
        self.form_data = form_data;
        self
    }

    #[must_use]
    pub fn with_user(mut self, user: impl Into<Value>) -> Self {
        self.user = Some(user.into());
        self
    }

    #[must_use]
    pub fn with_permission(mut self, permission: &str) -> Self {
        self.permissions.push(permission.to_owned());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_owned(), value.into());
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    #[must_use]
    pub fn with_custom(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.custom.insert(key.to_owned(), value.into());
        self
    }

    /// Current value of a form field.
    ///
    /// An exact key match wins; otherwise a dotted name is resolved as a path
    /// into the first segment's value.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        if let Some(value) = self.form_data.get(name) {
            return Some(value);
        }
        let (head, rest) = name.split_once('.')?;
        self.form_data.get(head)?.get_path(rest)
    }

    /// Look up a dot-separated path across the whole context.
    ///
    /// The first segment selects the section (`formData`, `user`,
    /// `permissions`, `metadata`, `timestamp` or `custom`). Missing segments
    /// yield `None`.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<Value> {
        let (section, rest) = match path.split_once('.') {
            Some((section, rest)) => (section, Some(rest)),
            None => (path, None),
        };
        let map = match section {
            "formData" | "form_data" => &self.form_data,
            "metadata" => &self.metadata,
            "custom" => &self.custom,
            "user" => {
                let user = self.user.as_ref()?;
                return match rest {
                    Some(rest) => user.get_path(rest).cloned(),
                    None => Some(user.clone()),
                };
            }
            "permissions" => {
                return match rest {
                    Some(rest) => rest
                        .parse::<usize>()
                        .ok()
                        .and_then(|i| self.permissions.get(i))
                        .map(|p| Value::String(p.clone())),
                    None => Some(Value::Array(
                        self.permissions
                            .iter()
                            .map(|p| Value::String(p.clone()))
                            .collect(),
                    )),
                };
            }
            "timestamp" if rest.is_none() => {
                return self
                    .timestamp
                    .map(|t| Value::String(t.to_rfc3339_opts(SecondsFormat::Millis, true)));
            }
            _ => return None,
        };
        match rest {
            Some(rest) => map_path(map, rest).cloned(),
            None => Some(Value::Map(map.clone())),
        }
    }
}

fn map_path<'a>(map: &'a BTreeMap<String, Value>, path: &str) -> Option<&'a Value> {
    match path.split_once('.') {
        Some((head, tail)) => map.get(head)?.get_path(tail),
        None => map.get(path),
    }
}
