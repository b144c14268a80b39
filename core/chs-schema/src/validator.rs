use std::fmt;
use std::sync::Arc;

use regex_lite::Regex;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::Result;
use crate::document::SiblingContext;

/// A named cross-field check over a field value and its siblings.
///
/// Return `Err(message)` to reject the value. `value` is `None` when the
/// field is absent, `null` or empty for its type. Rules must be pure; a rule
/// that panics is recorded as a failure of that field and evaluation
/// continues with the next one.
pub trait Rule: Send + Sync {
    /// Short identifier shown when the schema is described to the host.
    fn name(&self) -> &str;

    fn check(
        &self,
        value: Option<&Value>,
        siblings: &SiblingContext<'_>,
    ) -> std::result::Result<(), String>;
}

type CheckFn =
    dyn Fn(Option<&Value>, &SiblingContext<'_>) -> std::result::Result<(), String> + Send + Sync;

struct FnRule {
    name: String,
    check: Box<CheckFn>,
}

impl Rule for FnRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(
        &self,
        value: Option<&Value>,
        siblings: &SiblingContext<'_>,
    ) -> std::result::Result<(), String> {
        (self.check)(value, siblings)
    }
}

/// One check attached to a field. Every failing validator contributes its
/// own message.
#[derive(Clone)]
pub enum Validator {
    /// Value must be `>= n`.
    Min(f64),
    /// Value must be `<= n`.
    Max(f64),
    /// Value must be `< n`.
    LessThan(f64),
    /// String value must match a named pattern.
    Pattern { name: String, regex: Regex },
    Custom(Arc<dyn Rule>),
}

impl Validator {
    /// Compiles a named pattern. Fails at declaration time on a bad regex.
    pub fn regex(pattern: &str, name: &str) -> Result<Self> {
        Ok(Self::Pattern {
            name: name.into(),
            regex: Regex::new(pattern)?,
        })
    }

    pub fn custom(rule: impl Rule + 'static) -> Self {
        Self::Custom(Arc::new(rule))
    }

    /// Wraps a closure as a named custom rule.
    pub fn custom_fn<F>(name: &str, check: F) -> Self
    where
        F: Fn(Option<&Value>, &SiblingContext<'_>) -> std::result::Result<(), String>
            + Send
            + Sync
            + 'static,
    {
        Self::custom(FnRule {
            name: name.into(),
            check: Box::new(check),
        })
    }

    /// Runs the check. Numeric and pattern validators pass on empty values
    /// and on values of another JSON type; conformance reports those.
    pub fn check(
        &self,
        value: Option<&Value>,
        siblings: &SiblingContext<'_>,
    ) -> std::result::Result<(), String> {
        match self {
            Self::Min(min) => match value.and_then(Value::as_f64) {
                Some(n) if n < *min => Err(format!("Must be greater than or equal to {min}")),
                _ => Ok(()),
            },
            Self::Max(max) => match value.and_then(Value::as_f64) {
                Some(n) if n > *max => Err(format!("Must be less than or equal to {max}")),
                _ => Ok(()),
            },
            Self::LessThan(limit) => match value.and_then(Value::as_f64) {
                Some(n) if n >= *limit => Err(format!("Must be less than {limit}")),
                _ => Ok(()),
            },
            Self::Pattern { name, regex } => match value.and_then(Value::as_str) {
                Some(s) if !regex.is_match(s) => Err(format!("Does not match \"{name}\" pattern")),
                _ => Ok(()),
            },
            Self::Custom(rule) => rule.check(value, siblings),
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Min(n) => f.debug_tuple("Min").field(n).finish(),
            Self::Max(n) => f.debug_tuple("Max").field(n).finish(),
            Self::LessThan(n) => f.debug_tuple("LessThan").field(n).finish(),
            Self::Pattern { name, regex } => f
                .debug_struct("Pattern")
                .field("name", name)
                .field("regex", &regex.as_str())
                .finish(),
            Self::Custom(rule) => f.debug_tuple("Custom").field(&rule.name()).finish(),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum ValidatorDescription<'a> {
    Min { value: f64 },
    Max { value: f64 },
    LessThan { value: f64 },
    Regex { name: &'a str, pattern: &'a str },
    Custom { name: &'a str },
}

impl Serialize for Validator {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let description = match self {
            Self::Min(value) => ValidatorDescription::Min { value: *value },
            Self::Max(value) => ValidatorDescription::Max { value: *value },
            Self::LessThan(value) => ValidatorDescription::LessThan { value: *value },
            Self::Pattern { name, regex } => ValidatorDescription::Regex {
                name,
                pattern: regex.as_str(),
            },
            Self::Custom(rule) => ValidatorDescription::Custom { name: rule.name() },
        };
        description.serialize(serializer)
    }
}
