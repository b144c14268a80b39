use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

use crate::document::SiblingContext;
use crate::path::{FieldPath, PathSegment};
use crate::schema::{DocumentType, FieldDefinition, ValueType};
use crate::{Error, Result};

type PredicateFn = dyn Fn(&SiblingContext<'_>) -> bool + Send + Sync;

/// Condition under which a field is hidden. Hidden fields are inactive:
/// they are skipped by validation together with everything below them.
#[derive(Clone)]
pub enum Visibility {
    /// Hidden while the sibling is exactly `true`.
    HiddenWhenTrue { field: String },
    /// Hidden while the sibling is falsy or absent.
    HiddenWhenFalsy { field: String },
    /// Hidden while the predicate returns `true`.
    Custom { name: String, hidden: Arc<PredicateFn> },
}

impl Visibility {
    pub fn custom<F>(name: &str, hidden: F) -> Self
    where
        F: Fn(&SiblingContext<'_>) -> bool + Send + Sync + 'static,
    {
        Self::Custom {
            name: name.into(),
            hidden: Arc::new(hidden),
        }
    }

    pub fn is_hidden(&self, siblings: &SiblingContext<'_>) -> bool {
        match self {
            Self::HiddenWhenTrue { field } => siblings.is_true(field),
            Self::HiddenWhenFalsy { field } => !siblings.is_truthy(field),
            Self::Custom { hidden, .. } => hidden(siblings),
        }
    }
}

/// Whether `field` is active given the values of its siblings.
/// Fields without a predicate are always visible. A predicate that panics
/// leaves the field visible so its validators still run.
pub fn is_visible(field: &FieldDefinition, siblings: &SiblingContext<'_>) -> bool {
    let Some(visibility) = &field.visibility else {
        return true;
    };
    catch_unwind(AssertUnwindSafe(|| !visibility.is_hidden(siblings))).unwrap_or_else(|_| {
        warn!(field = %field.name, visibility = ?visibility, "Visibility predicate panicked");
        true
    })
}

/// Resolves the visibility of the field at `path` inside `document`.
///
/// A field is visible only when every field along the path is visible in
/// its own object. Object-typed sequence elements are addressed by index
/// (`features[0].title`).
pub fn is_field_visible(
    doc_type: &DocumentType,
    document: &Value,
    path: &FieldPath,
) -> Result<bool> {
    let invalid = || Error::InvalidPath(path.to_string());
    let mut fields: &[FieldDefinition] = &doc_type.fields;
    let mut current = Some(document);
    let mut scope = doc_type.name.clone();
    let mut segments = path.segments().iter().peekable();

    while let Some(segment) = segments.next() {
        let PathSegment::Field(name) = segment else {
            return Err(invalid());
        };
        let field = fields
            .iter()
            .find(|f| &f.name == name)
            .ok_or_else(|| Error::UnknownField {
                scope: scope.clone(),
                field: name.clone(),
            })?;

        let siblings = SiblingContext::from_value(current);
        if !field.is_visible(&siblings) {
            return Ok(false);
        }
        let mut value = siblings.get(name);
        scope = format!("{scope}.{name}");

        let element = match &field.value_type {
            ValueType::Sequence { of } => match segments.peek() {
                Some(PathSegment::Index(index)) => {
                    value = value.and_then(|v| v.get(*index));
                    segments.next();
                    of.as_ref()
                }
                _ => &field.value_type,
            },
            other => other,
        };

        match element {
            ValueType::Object { fields: children, .. } => {
                fields = children;
                current = value;
            }
            _ if segments.peek().is_some() => return Err(invalid()),
            _ => {}
        }
    }
    Ok(true)
}

/// Effective visibility of one field in a document snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldVisibility {
    pub path: FieldPath,
    pub visible: bool,
}

/// Visibility of every declared field in declaration order, descending into
/// object fields and into the object elements present in the snapshot.
pub fn visibility_map(doc_type: &DocumentType, document: &Value) -> Vec<FieldVisibility> {
    let mut out = Vec::new();
    walk(&doc_type.fields, Some(document), &FieldPath::root(), true, &mut out);
    out
}

fn walk(
    fields: &[FieldDefinition],
    object: Option<&Value>,
    path: &FieldPath,
    parent_visible: bool,
    out: &mut Vec<FieldVisibility>,
) {
    let siblings = SiblingContext::from_value(object);
    for field in fields {
        let field_path = path.field(&field.name);
        let visible = parent_visible && field.is_visible(&siblings);
        out.push(FieldVisibility {
            path: field_path.clone(),
            visible,
        });

        let value = siblings.get(&field.name);
        match &field.value_type {
            ValueType::Object { fields: children, .. } => {
                walk(children, value, &field_path, visible, out);
            }
            ValueType::Sequence { of } => {
                let (ValueType::Object { fields: children, .. }, Some(items)) =
                    (of.as_ref(), value.and_then(Value::as_array))
                else {
                    continue;
                };
                for (index, item) in items.iter().enumerate() {
                    walk(children, Some(item), &field_path.index(index), visible, out);
                }
            }
            _ => {}
        }
    }
}

impl fmt::Debug for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HiddenWhenTrue { field } => {
                f.debug_struct("HiddenWhenTrue").field("field", field).finish()
            }
            Self::HiddenWhenFalsy { field } => {
                f.debug_struct("HiddenWhenFalsy").field("field", field).finish()
            }
            Self::Custom { name, .. } => f.debug_struct("Custom").field("name", name).finish(),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "hidden", rename_all = "camelCase")]
enum VisibilityDescription<'a> {
    WhenTrue { field: &'a str },
    WhenFalsy { field: &'a str },
    Custom { name: &'a str },
}

impl Serialize for Visibility {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let description = match self {
            Self::HiddenWhenTrue { field } => VisibilityDescription::WhenTrue { field },
            Self::HiddenWhenFalsy { field } => VisibilityDescription::WhenFalsy { field },
            Self::Custom { name, .. } => VisibilityDescription::Custom { name },
        };
        description.serialize(serializer)
    }
}
