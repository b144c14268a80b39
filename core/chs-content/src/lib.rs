//! Document types published by CHS Studio.
//!
//! - [`chapter`]: a society chapter with stats, strategists and focus areas
//! - [`strategist`]: a person attached to chapters
//! - [`role`]: an open job role with conditional communication, duration and
//!   compensation details
//!
//! [`schema_types`] lists them in the order the host shows them, and
//! [`registry`] registers all of them.

mod chapter;
mod role;
mod strategist;

use chs_schema::{DocumentType, Registry, Result};

pub use chapter::chapter;
pub use role::{
    AMOUNT_NEGATIVE, AMOUNT_REQUIRED, END_BEFORE_START, EndAfterStart, SalaryAmount, role,
};
pub use strategist::strategist;

/// All content document types, in registration order.
pub fn schema_types() -> Result<Vec<DocumentType>> {
    Ok(vec![chapter(), strategist(), role()?])
}

/// A registry holding every content document type.
pub fn registry() -> Result<Registry> {
    let mut registry = Registry::new();
    for doc_type in schema_types()? {
        registry.register(doc_type)?;
    }
    Ok(registry)
}
