//! UpStore storefront catalog
//!
//! Public catalog and back-office API for a small storefront.
//!
//! ## Features
//! - Categories, banners, links, popular searches, settings
//! - Products with option/value trees and priced variants
//! - Variant resolution for the product page
//! - Session-gated admin CRUD with boundary validation
//! - PostgreSQL or in-memory catalog storage

pub mod api;
pub mod domain;
pub mod services;
pub mod store;
pub mod storefront;

use std::fmt;
use thiserror::Error;
use validator::ValidationErrors;

use crate::store::StoreError;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed")]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    Conflict(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Storage error: {0}")]
    Store(StoreError),
}

impl CatalogError {
    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound { entity, id: id.to_string() }
    }

    /// Single-field validation failure.
    pub fn invalid_field(field: &'static str, code: &'static str, message: impl Into<String>) -> Self {
        let mut err = validator::ValidationError::new(code);
        err.message = Some(std::borrow::Cow::Owned(message.into()));
        let mut errors = ValidationErrors::new();
        errors.add(field, err);
        Self::Validation(errors)
    }
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation { constraint } => Self::Conflict(conflict_message(&constraint).to_string()),
            other => Self::Store(other),
        }
    }
}

fn conflict_message(constraint: &str) -> &'static str {
    match constraint {
        "uq_categories_slug" => "Category with this slug already exists",
        "uq_products_code" => "Product code already taken",
        "uq_admin_users_email" => "Account with this email already exists",
        _ => "Record with this identifier already exists",
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_becomes_conflict() {
        let err: CatalogError = StoreError::UniqueViolation { constraint: "uq_categories_slug".into() }.into();
        assert!(matches!(err, CatalogError::Conflict(ref m) if m == "Category with this slug already exists"));
    }

    #[test]
    fn test_invalid_field() {
        match CatalogError::invalid_field("slug", "slug", "Slug cannot be empty") {
            CatalogError::Validation(errors) => assert!(errors.errors().contains_key("slug")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
