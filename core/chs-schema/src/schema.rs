use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::document::SiblingContext;
use crate::preview::{Preview, PreviewRule};
use crate::validator::{Rule, Validator};
use crate::visibility::{self, Visibility};
use crate::{Error, Result};

/// A named document type: ordered fields plus a preview rule.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentType {
    pub name: String,
    pub title: String,
    pub fields: Vec<FieldDefinition>,
    pub preview: PreviewRule,
}

impl DocumentType {
    pub fn new(name: &str, title: &str) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            fields: Vec::new(),
            preview: PreviewRule::default(),
        }
    }

    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    pub fn preview(mut self, preview: PreviewRule) -> Self {
        self.preview = preview;
        self
    }

    /// Looks up a top-level field by name.
    pub fn field_named(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// A fresh document carrying `_type` and every declared default.
    ///
    /// Nested objects appear only when at least one of their fields has a
    /// default.
    pub fn initial_value(&self) -> Value {
        let mut root = Map::new();
        root.insert("_type".into(), Value::String(self.name.clone()));
        root.extend(defaults_for(&self.fields));
        Value::Object(root)
    }

    /// Declaration-time consistency checks run on registration.
    pub(crate) fn check(&self) -> Result<()> {
        check_fields(&self.name, &self.fields)
    }
}

fn defaults_for(fields: &[FieldDefinition]) -> Map<String, Value> {
    let mut out = Map::new();
    for field in fields {
        if let Some(default) = &field.default {
            out.insert(field.name.clone(), default.clone());
        } else if let ValueType::Object { fields, .. } = &field.value_type {
            let nested = defaults_for(fields);
            if !nested.is_empty() {
                out.insert(field.name.clone(), Value::Object(nested));
            }
        }
    }
    out
}

fn check_fields(scope: &str, fields: &[FieldDefinition]) -> Result<()> {
    let mut seen = HashSet::new();
    for field in fields {
        if !seen.insert(field.name.as_str()) {
            return Err(Error::DuplicateFieldName {
                scope: scope.into(),
                field: field.name.clone(),
            });
        }
        if let Some(default) = &field.default {
            field
                .value_type
                .conform(default)
                .map_err(|reason| Error::InvalidDefault {
                    field: format!("{scope}.{}", field.name),
                    reason,
                })?;
        }
        check_value_type(&format!("{scope}.{}", field.name), &field.value_type)?;
    }
    Ok(())
}

fn check_value_type(scope: &str, value_type: &ValueType) -> Result<()> {
    match value_type {
        ValueType::Enumeration { options } => match options.first_duplicate() {
            Some(value) => Err(Error::DuplicateOptionValue {
                field: scope.into(),
                value: value.into(),
            }),
            None => Ok(()),
        },
        ValueType::Object { fields, .. } => check_fields(scope, fields),
        ValueType::Sequence { of } => check_value_type(scope, of),
        _ => Ok(()),
    }
}

/// The declared shape and behavior of one field.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

impl FieldDefinition {
    pub fn new(name: &str, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            title: name.into(),
            description: None,
            value_type,
            required: false,
            default: None,
            validators: Vec::new(),
            visibility: None,
        }
    }

    pub fn text(name: &str) -> Self {
        Self::new(name, ValueType::Text)
    }

    pub fn long_text(name: &str, rows: u8) -> Self {
        Self::new(name, ValueType::LongText { rows: Some(rows) })
    }

    pub fn number(name: &str) -> Self {
        Self::new(name, ValueType::Number)
    }

    pub fn boolean(name: &str) -> Self {
        Self::new(name, ValueType::Boolean)
    }

    pub fn date(name: &str) -> Self {
        Self::new(name, ValueType::Date)
    }

    pub fn enumeration(name: &str, options: OptionList) -> Self {
        Self::new(name, ValueType::Enumeration { options })
    }

    pub fn image(name: &str, hotspot: bool) -> Self {
        Self::new(name, ValueType::Image { hotspot })
    }

    /// A slug generated from the sibling field `source`.
    pub fn slug(name: &str, source: &str, max_length: usize) -> Self {
        Self::new(
            name,
            ValueType::Slug {
                source: Some(source.into()),
                max_length: Some(max_length),
            },
        )
    }

    pub fn object(name: &str, fields: Vec<FieldDefinition>) -> Self {
        Self::new(name, ValueType::object(fields))
    }

    pub fn sequence(name: &str, of: ValueType) -> Self {
        Self::new(name, ValueType::Sequence { of: Box::new(of) })
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.into();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn min(self, min: f64) -> Self {
        self.validator(Validator::Min(min))
    }

    pub fn max(self, max: f64) -> Self {
        self.validator(Validator::Max(max))
    }

    pub fn less_than(self, limit: f64) -> Self {
        self.validator(Validator::LessThan(limit))
    }

    pub fn custom(self, rule: impl Rule + 'static) -> Self {
        self.validator(Validator::custom(rule))
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Hidden while the sibling `field` is exactly `true`.
    pub fn hidden_when(self, field: &str) -> Self {
        self.visibility(Visibility::HiddenWhenTrue {
            field: field.into(),
        })
    }

    /// Hidden while the sibling `field` is falsy or absent.
    pub fn hidden_unless(self, field: &str) -> Self {
        self.visibility(Visibility::HiddenWhenFalsy {
            field: field.into(),
        })
    }

    pub fn is_visible(&self, siblings: &SiblingContext<'_>) -> bool {
        visibility::is_visible(self, siblings)
    }
}

/// The closed set of value types a field can declare.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ValueType {
    Text,
    LongText {
        #[serde(skip_serializing_if = "Option::is_none")]
        rows: Option<u8>,
    },
    Number,
    Boolean,
    /// ISO calendar date, `YYYY-MM-DD`.
    Date,
    Enumeration {
        options: OptionList,
    },
    /// Opaque `{ "_ref": id }` pointer to documents of the listed types.
    Reference {
        to: Vec<String>,
    },
    Image {
        hotspot: bool,
    },
    Slug {
        #[serde(skip_serializing_if = "Option::is_none")]
        source: Option<String>,
        #[serde(rename = "maxLength", skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
    },
    /// Nested fields. Sequence members may carry a name, a title and their
    /// own preview.
    Object {
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        fields: Vec<FieldDefinition>,
        #[serde(skip_serializing_if = "Option::is_none")]
        preview: Option<PreviewRule>,
    },
    Sequence {
        of: Box<ValueType>,
    },
    /// Rich-text block with a restricted style and decorator palette.
    Block {
        styles: Vec<SelectOption>,
        decorators: Vec<SelectOption>,
    },
}

impl ValueType {
    pub fn reference(to: &str) -> Self {
        Self::Reference {
            to: vec![to.into()],
        }
    }

    pub fn object(fields: Vec<FieldDefinition>) -> Self {
        Self::Object {
            name: None,
            title: None,
            fields,
            preview: None,
        }
    }

    /// A named object type used as a sequence member.
    pub fn member(name: &str, title: &str, fields: Vec<FieldDefinition>) -> Self {
        Self::Object {
            name: Some(name.into()),
            title: Some(title.into()),
            fields,
            preview: None,
        }
    }

    /// Attaches a preview rule to an object type. Other types are returned
    /// unchanged.
    pub fn with_preview(mut self, rule: PreviewRule) -> Self {
        if let Self::Object { preview, .. } = &mut self {
            *preview = Some(rule);
        }
        self
    }

    /// Preview of one object value, when this object type declares one.
    pub fn preview(&self, value: &Value) -> Option<Preview> {
        match self {
            Self::Object {
                preview: Some(rule),
                ..
            } => Some(rule.project(value)),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::LongText { .. } => "longText",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Enumeration { .. } => "enumeration",
            Self::Reference { .. } => "reference",
            Self::Image { .. } => "image",
            Self::Slug { .. } => "slug",
            Self::Object { .. } => "object",
            Self::Sequence { .. } => "sequence",
            Self::Block { .. } => "block",
        }
    }

    /// Whether a stored value counts as "not filled in" for this type.
    ///
    /// Values of the wrong JSON shape are never empty, so they reach
    /// [`conform`](Self::conform) and surface as type mismatches.
    pub fn is_empty(&self, value: &Value) -> bool {
        if value.is_null() {
            return true;
        }
        match (self, value) {
            (
                Self::Text | Self::LongText { .. } | Self::Date | Self::Enumeration { .. },
                Value::String(s),
            ) => s.is_empty(),
            (Self::Slug { .. }, Value::Object(map)) => map
                .get("current")
                .and_then(Value::as_str)
                .is_none_or(str::is_empty),
            (Self::Reference { .. }, Value::Object(map)) => {
                map.get("_ref").is_none_or(Value::is_null)
            }
            (Self::Image { .. }, Value::Object(map)) => map.get("asset").is_none_or(Value::is_null),
            (Self::Object { .. }, Value::Object(map)) => map.keys().all(|k| k.starts_with('_')),
            (Self::Sequence { .. }, Value::Array(items)) => items.is_empty(),
            _ => false,
        }
    }

    /// Checks that a non-empty value has this type's shape.
    ///
    /// Object fields and sequence elements are not inspected here; the
    /// engine walks into them separately.
    pub fn conform(&self, value: &Value) -> std::result::Result<(), String> {
        let ok = match (self, value) {
            (Self::Text | Self::LongText { .. }, Value::String(_)) => true,
            (Self::Number, Value::Number(_)) => true,
            (Self::Boolean, Value::Bool(_)) => true,
            (Self::Date, Value::String(s)) => {
                if !is_iso_date(s) {
                    return Err(format!("Expected a date in YYYY-MM-DD format, got \"{s}\""));
                }
                true
            }
            (Self::Enumeration { options }, Value::String(s)) => {
                if !options.contains(s) {
                    return Err(format!("Value \"{s}\" is not one of the allowed options"));
                }
                true
            }
            (Self::Reference { .. }, Value::Object(map)) => {
                map.get("_ref").is_some_and(Value::is_string)
            }
            (Self::Image { .. }, Value::Object(map)) => match map.get("asset") {
                None | Some(Value::Null) => true,
                Some(asset) => asset.get("_ref").is_some_and(Value::is_string),
            },
            (Self::Slug { .. }, Value::Object(map)) => map.get("current").is_some_and(Value::is_string),
            (Self::Object { .. }, Value::Object(_)) => true,
            (Self::Sequence { .. }, Value::Array(_)) => true,
            (Self::Block { styles, decorators }, Value::Object(map)) => {
                return conform_block(map, styles, decorators);
            }
            _ => false,
        };

        if ok {
            Ok(())
        } else {
            Err(format!(
                "Expected {}, got {}",
                self.kind_name(),
                json_kind(value)
            ))
        }
    }
}

/// True for a well-formed `YYYY-MM-DD` calendar date.
pub fn is_iso_date(s: &str) -> bool {
    s.len() == 10 && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

fn conform_block(
    block: &Map<String, Value>,
    styles: &[SelectOption],
    decorators: &[SelectOption],
) -> std::result::Result<(), String> {
    if let Some(kind) = block.get("_type").and_then(Value::as_str) {
        if kind != "block" {
            return Err(format!("Expected block, got \"{kind}\""));
        }
    }
    if let Some(style) = block.get("style").and_then(Value::as_str) {
        if !styles.is_empty() && !styles.iter().any(|s| s.value == style) {
            return Err(format!("Style \"{style}\" is not allowed"));
        }
    }

    let children = match block.get("children") {
        None | Some(Value::Null) => return Ok(()),
        Some(Value::Array(children)) => children,
        Some(other) => return Err(format!("Expected block children array, got {}", json_kind(other))),
    };
    let mark_defs: HashSet<&str> = block
        .get("markDefs")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|def| def.get("_key").and_then(Value::as_str))
        .collect();

    for child in children {
        let marks = child.get("marks").and_then(Value::as_array).into_iter().flatten();
        for mark in marks.filter_map(Value::as_str) {
            let declared = decorators.iter().any(|d| d.value == mark) || mark_defs.contains(mark);
            if !declared {
                return Err(format!("Mark \"{mark}\" is not allowed"));
            }
        }
    }
    Ok(())
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One `{label, value}` entry of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    pub fn new(label: &str, value: &str) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// How an enumeration is offered to editors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionLayout {
    #[default]
    Dropdown,
    Radio,
}

/// Ordered enumeration options. Values must be unique; registration
/// rejects duplicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OptionList {
    pub options: Vec<SelectOption>,
    pub layout: OptionLayout,
}

impl OptionList {
    /// Builds a dropdown list from `(label, value)` pairs.
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            options: pairs
                .iter()
                .map(|(label, value)| SelectOption::new(label, value))
                .collect(),
            layout: OptionLayout::Dropdown,
        }
    }

    pub fn radio(mut self) -> Self {
        self.layout = OptionLayout::Radio;
        self
    }

    pub fn contains(&self, value: &str) -> bool {
        self.options.iter().any(|o| o.value == value)
    }

    /// Display label for a declared value.
    pub fn label_for(&self, value: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|o| o.value.as_str())
    }

    fn first_duplicate(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.values().find(|v| !seen.insert(*v))
    }
}

/// URL-friendly identifier: lowercase ASCII alphanumerics joined by single
/// dashes, cut to `max_length` characters.
pub fn slugify(input: &str, max_length: Option<usize>) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    if let Some(max) = max_length {
        slug.truncate(max);
        while slug.ends_with('-') {
            slug.pop();
        }
    }
    slug
}
