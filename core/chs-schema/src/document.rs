use serde_json::{Map, Value};

/// The field values of one object level in a document snapshot.
///
/// Visibility predicates and cross-field rules only ever see the context of
/// the object that directly contains the field being evaluated. `null` is
/// reported as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct SiblingContext<'a> {
    fields: Option<&'a Map<String, Value>>,
}

impl<'a> SiblingContext<'a> {
    pub fn new(fields: &'a Map<String, Value>) -> Self {
        Self {
            fields: Some(fields),
        }
    }

    /// A context for an object level that is missing from the snapshot.
    pub fn empty() -> Self {
        Self { fields: None }
    }

    /// Builds a context from any value; non-objects give an empty context.
    pub fn from_value(value: Option<&'a Value>) -> Self {
        match value.and_then(Value::as_object) {
            Some(fields) => Self::new(fields),
            None => Self::empty(),
        }
    }

    /// Raw sibling value, with `null` treated as absent.
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.fields
            .and_then(|fields| fields.get(name))
            .filter(|v| !v.is_null())
    }

    pub fn get_str(&self, name: &str) -> Option<&'a str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn get_number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    /// JSON truthiness of a sibling; absent is falsy.
    pub fn is_truthy(&self, name: &str) -> bool {
        self.get(name).is_some_and(is_truthy)
    }

    /// True only when the sibling is the boolean `true`.
    pub fn is_true(&self, name: &str) -> bool {
        self.get_bool(name) == Some(true)
    }
}

/// Host truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy,
/// everything else (including empty arrays and objects) is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Resolves a dotted selection path (`"communication.timezone"`) against a
/// document, returning `None` for missing or `null` values.
pub(crate) fn lookup<'a>(document: &'a Value, dotted: &str) -> Option<&'a Value> {
    dotted
        .split('.')
        .try_fold(document, |current, key| current.get(key))
        .filter(|v| !v.is_null())
}
