//! Content schema engine for CHS Studio.
//!
//! Declares document types and evaluates document snapshots against them:
//! - [`DocumentType`] / [`FieldDefinition`] / [`ValueType`]: the field model
//! - [`Validator`] and [`Rule`]: per-field checks, including cross-field rules
//! - [`Visibility`]: conditional field visibility over a [`SiblingContext`]
//! - [`validate`]: the validator engine producing ordered [`FieldError`]s
//! - [`PreviewRule`]: title/subtitle/media projection for list views
//! - [`Registry`]: the set of document types exposed to the host
//!
//! Everything here is a pure function of the declared schema and a caller-owned
//! `serde_json::Value` snapshot. Nothing is stored between calls.

mod document;
mod engine;
mod path;
mod preview;
mod registry;
mod schema;
mod validator;
mod visibility;

pub use document::{SiblingContext, is_truthy};
pub use engine::{FieldError, FieldErrorKind, validate};
pub use path::{FieldPath, PathSegment};
pub use preview::{Preview, PreviewRule, Selection};
pub use registry::Registry;
pub use schema::{
    DocumentType, FieldDefinition, OptionLayout, OptionList, SelectOption, ValueType, is_iso_date,
    slugify,
};
pub use validator::{Rule, Validator};
pub use visibility::{FieldVisibility, Visibility, is_field_visible, is_visible, visibility_map};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while declaring, registering or looking up schema.
///
/// Per-field validation problems are not errors; they come back from
/// [`validate`] as [`FieldError`] values.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("document type already registered: {0}")]
    DuplicateTypeName(String),

    #[error("unknown document type: {0}")]
    UnknownTypeName(String),

    #[error("duplicate field name '{field}' in {scope}")]
    DuplicateFieldName { scope: String, field: String },

    #[error("duplicate option value '{value}' on field '{field}'")]
    DuplicateOptionValue { field: String, value: String },

    #[error("default for field '{field}' does not match its type: {reason}")]
    InvalidDefault { field: String, reason: String },

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex_lite::Error),

    #[error("invalid field path: {0}")]
    InvalidPath(String),

    #[error("unknown field '{field}' in {scope}")]
    UnknownField { scope: String, field: String },

    #[error("field '{0}' is not a slug field")]
    NotASlugField(String),
}
