use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::engine::{self, FieldError};
use crate::path::FieldPath;
use crate::preview::Preview;
use crate::schema::{DocumentType, ValueType, slugify};
use crate::visibility::{self, FieldVisibility};
use crate::{Error, Result};

/// The document types exposed to the host, in registration order.
///
/// Types are registered once at start-up through `&mut self`; afterwards the
/// registry is read-only and can be shared across threads. Cloning is cheap.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    types: Vec<Arc<DocumentType>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document type after checking it for duplicate names, duplicate
    /// option values and mistyped defaults.
    pub fn register(&mut self, doc_type: DocumentType) -> Result<()> {
        if self.types.iter().any(|t| t.name == doc_type.name) {
            return Err(Error::DuplicateTypeName(doc_type.name));
        }
        doc_type.check()?;

        debug!(
            type_name = %doc_type.name,
            fields = doc_type.fields.len(),
            "Registered document type"
        );
        self.types.push(Arc::new(doc_type));
        Ok(())
    }

    pub fn list_types(&self) -> &[Arc<DocumentType>] {
        &self.types
    }

    pub fn get(&self, type_name: &str) -> Result<&DocumentType> {
        self.types
            .iter()
            .find(|t| t.name == type_name)
            .map(Arc::as_ref)
            .ok_or_else(|| Error::UnknownTypeName(type_name.into()))
    }

    pub fn validate(&self, type_name: &str, document: &Value) -> Result<Vec<FieldError>> {
        let doc_type = self.get(type_name)?;
        let errors = engine::validate(doc_type, document);
        debug!(type_name, errors = errors.len(), "Validated document");
        Ok(errors)
    }

    /// Visibility of the field at a dotted path such as
    /// `"communication.workingHours"` or `"features[0].icon"`.
    pub fn is_field_visible(&self, type_name: &str, path: &str, document: &Value) -> Result<bool> {
        let doc_type = self.get(type_name)?;
        let path: FieldPath = path.parse()?;
        visibility::is_field_visible(doc_type, document, &path)
    }

    pub fn visibility_map(&self, type_name: &str, document: &Value) -> Result<Vec<FieldVisibility>> {
        Ok(visibility::visibility_map(self.get(type_name)?, document))
    }

    pub fn preview(&self, type_name: &str, document: &Value) -> Result<Preview> {
        Ok(self.get(type_name)?.preview.project(document))
    }

    pub fn initial_value(&self, type_name: &str) -> Result<Value> {
        Ok(self.get(type_name)?.initial_value())
    }

    /// Slug for a top-level slug field, derived from its `source` sibling.
    /// `None` when the source value is empty or yields no slug characters.
    pub fn generate_slug(
        &self,
        type_name: &str,
        field_name: &str,
        document: &Value,
    ) -> Result<Option<String>> {
        let doc_type = self.get(type_name)?;
        let field = doc_type
            .field_named(field_name)
            .ok_or_else(|| Error::UnknownField {
                scope: type_name.into(),
                field: field_name.into(),
            })?;
        let ValueType::Slug { source, max_length } = &field.value_type else {
            return Err(Error::NotASlugField(field_name.into()));
        };

        let text = source
            .as_deref()
            .and_then(|source| document.get(source))
            .and_then(Value::as_str)
            .unwrap_or_default();
        let slug = slugify(text, *max_length);
        Ok((!slug.is_empty()).then_some(slug))
    }
}
