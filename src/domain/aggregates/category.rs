//! Category Aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::value_objects::{Slug, SlugError};

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: Slug,
    pub icon: Option<String>,
    pub sort_order: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool { true }

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    #[validate(length(min = 1, max = 100, message = "Category name is required (max 100 characters)"))]
    pub name: String,
    /// Generated from `name` when absent or blank.
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl CategoryInput {
    /// The slug this input resolves to: the supplied one, else one derived from the name.
    pub fn resolve_slug(&self) -> Result<Slug, SlugError> {
        match self.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(explicit) => Slug::parse(explicit),
            None => Slug::from_name(&self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, slug: Option<&str>) -> CategoryInput {
        CategoryInput { name: name.into(), slug: slug.map(Into::into), icon: None, sort_order: 0, active: true }
    }

    #[test]
    fn test_slug_generated_from_name() {
        assert_eq!(input("Смартфоны", None).resolve_slug().unwrap().as_str(), "smartfony");
        assert_eq!(input("Смартфоны", Some("  ")).resolve_slug().unwrap().as_str(), "smartfony");
    }

    #[test]
    fn test_explicit_slug_wins() {
        assert_eq!(input("Смартфоны", Some("smartphones")).resolve_slug().unwrap().as_str(), "smartphones");
        assert_eq!(input("Смартфоны", Some("Smart Phones")).resolve_slug(), Err(SlugError::Malformed));
    }

    #[test]
    fn test_defaults_and_limits() {
        let parsed: CategoryInput = serde_json::from_value(serde_json::json!({ "name": "Аудио" })).unwrap();
        assert!(parsed.active);
        assert_eq!(parsed.sort_order, 0);
        assert!(parsed.validate().is_ok());
        assert!(input(&"x".repeat(101), None).validate().is_err());
        assert!(input("", None).validate().is_err());
    }
}
