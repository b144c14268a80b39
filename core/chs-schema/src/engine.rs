use std::panic::{AssertUnwindSafe, catch_unwind};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::document::SiblingContext;
use crate::path::FieldPath;
use crate::schema::{DocumentType, FieldDefinition, ValueType};
use crate::validator::Validator;

pub(crate) const REQUIRED_MESSAGE: &str = "Required";
pub(crate) const RULE_PANICKED_MESSAGE: &str = "Validation rule failed unexpectedly";

/// Category of a per-field validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    /// The stored value does not have the declared type's shape.
    TypeMismatch,
    RequiredMissing,
    /// A min/max/lessThan/pattern/custom validator rejected the value.
    ConstraintViolation,
}

/// One validation failure at a document path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub path: FieldPath,
    pub kind: FieldErrorKind,
    pub message: String,
}

impl FieldError {
    fn new(path: &FieldPath, kind: FieldErrorKind, message: impl Into<String>) -> Self {
        Self {
            path: path.clone(),
            kind,
            message: message.into(),
        }
    }
}

/// Validates a document snapshot against its type.
///
/// Errors come back in field declaration order, then nested field order,
/// then element index order. Hidden fields and their subtrees produce no
/// errors. Every failing validator of a field is reported, not just the
/// first.
pub fn validate(doc_type: &DocumentType, document: &Value) -> Vec<FieldError> {
    let mut errors = Vec::new();
    match document.as_object() {
        Some(object) => validate_object(&doc_type.fields, object, &FieldPath::root(), &mut errors),
        None => errors.push(FieldError::new(
            &FieldPath::root(),
            FieldErrorKind::TypeMismatch,
            "Document must be an object",
        )),
    }
    errors
}

fn validate_object(
    fields: &[FieldDefinition],
    object: &Map<String, Value>,
    path: &FieldPath,
    errors: &mut Vec<FieldError>,
) {
    let siblings = SiblingContext::new(object);
    for field in fields {
        if !field.is_visible(&siblings) {
            continue;
        }
        let field_path = path.field(&field.name);
        validate_field(field, siblings.get(&field.name), &siblings, &field_path, errors);
    }
}

fn validate_field(
    field: &FieldDefinition,
    value: Option<&Value>,
    siblings: &SiblingContext<'_>,
    path: &FieldPath,
    errors: &mut Vec<FieldError>,
) {
    let value = value.filter(|v| !field.value_type.is_empty(v));

    match value {
        None if field.required => {
            errors.push(FieldError::new(
                path,
                FieldErrorKind::RequiredMissing,
                REQUIRED_MESSAGE,
            ));
            return;
        }
        Some(v) => {
            if let Err(message) = field.value_type.conform(v) {
                errors.push(FieldError::new(path, FieldErrorKind::TypeMismatch, message));
                return;
            }
        }
        None => {}
    }

    for validator in &field.validators {
        if let Err(message) = run_validator(validator, value, siblings, path) {
            errors.push(FieldError::new(
                path,
                FieldErrorKind::ConstraintViolation,
                message,
            ));
        }
    }

    if let Some(v) = value {
        descend(&field.value_type, v, path, errors);
    }
}

fn run_validator(
    validator: &Validator,
    value: Option<&Value>,
    siblings: &SiblingContext<'_>,
    path: &FieldPath,
) -> Result<(), String> {
    catch_unwind(AssertUnwindSafe(|| validator.check(value, siblings))).unwrap_or_else(|_| {
        warn!(path = %path, validator = ?validator, "Validation rule panicked");
        Err(RULE_PANICKED_MESSAGE.to_string())
    })
}

/// Walks into object fields and sequence elements of a conforming value.
fn descend(value_type: &ValueType, value: &Value, path: &FieldPath, errors: &mut Vec<FieldError>) {
    match (value_type, value) {
        (ValueType::Object { fields, .. }, Value::Object(object)) => {
            validate_object(fields, object, path, errors);
        }
        (ValueType::Sequence { of }, Value::Array(items)) => {
            for (index, item) in items.iter().enumerate() {
                let item_path = path.index(index);
                match of.conform(item) {
                    Ok(()) => descend(of, item, &item_path, errors),
                    Err(message) => errors.push(FieldError::new(
                        &item_path,
                        FieldErrorKind::TypeMismatch,
                        message,
                    )),
                }
            }
        }
        _ => {}
    }
}
