//! Flat storefront content: banners, links, popular searches, settings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

fn default_true() -> bool { true }

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub id: Uuid,
    pub image: String,
    pub image_desktop: Option<String>,
    pub link: Option<String>,
    pub sort_order: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BannerInput {
    #[validate(length(min = 1, message = "Banner image is required"))]
    pub image: String,
    #[serde(default)]
    pub image_desktop: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub icon: Option<String>,
    pub sort_order: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LinkInput {
    #[validate(length(min = 1, message = "Link name is required"))]
    pub name: String,
    #[validate(url(message = "Invalid URL"))]
    pub url: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PopularSearch {
    pub id: Uuid,
    pub query: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PopularSearchInput {
    #[validate(length(min = 1, message = "Search query is required"))]
    pub query: String,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

/// Key that must never be blanked out.
pub const STORE_NAME_KEY: &str = "store_name";

/// A scalar setting value as submitted by the admin panel.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl SettingValue {
    pub fn into_stored(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
            Self::Flag(b) => b.to_string(),
        }
    }
}

/// Bulk settings upsert: key -> scalar value.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct SettingsUpdate(pub BTreeMap<String, SettingValue>);

impl SettingsUpdate {
    pub fn into_settings(self) -> Vec<Setting> {
        self.0.into_iter().map(|(key, value)| Setting { key, value: value.into_stored() }).collect()
    }
}

impl Validate for SettingsUpdate {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.0.keys().any(|k| k.trim().is_empty()) {
            let mut err = ValidationError::new("empty_key");
            err.message = Some("Setting keys cannot be empty".into());
            errors.add("settings", err);
        }
        if let Some(SettingValue::Text(name)) = self.0.get(STORE_NAME_KEY) {
            if name.trim().is_empty() {
                let mut err = ValidationError::new("length");
                err.message = Some("Store name is required".into());
                errors.add("store_name", err);
            }
        }
        if errors.errors().is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Settings as the key -> value map the storefront reads.
pub fn settings_map(settings: &[Setting]) -> BTreeMap<String, String> {
    settings.iter().map(|s| (s.key.clone(), s.value.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_url_validation() {
        let ok: LinkInput = serde_json::from_value(serde_json::json!({ "name": "Telegram", "url": "https://t.me/upstore" })).unwrap();
        assert!(ok.validate().is_ok());
        assert!(ok.active);
        let bad = LinkInput { url: "not a url".into(), ..ok };
        assert!(bad.validate().unwrap_err().errors().contains_key("url"));
    }

    #[test]
    fn test_banner_requires_image() {
        let b: BannerInput = serde_json::from_value(serde_json::json!({ "image": "" })).unwrap();
        assert!(b.validate().unwrap_err().errors().contains_key("image"));
    }

    #[test]
    fn test_settings_update_stringifies_scalars() {
        let update: SettingsUpdate = serde_json::from_value(serde_json::json!({
            "store_name": "UpStore", "items_per_row": 4, "show_banners": true
        })).unwrap();
        assert!(update.validate().is_ok());
        let stored = update.into_settings();
        assert_eq!(settings_map(&stored)["items_per_row"], "4");
        assert_eq!(settings_map(&stored)["show_banners"], "true");
        assert_eq!(settings_map(&stored)["store_name"], "UpStore");
    }

    #[test]
    fn test_settings_update_rejects_nested_and_blank_store_name() {
        assert!(serde_json::from_value::<SettingsUpdate>(serde_json::json!({ "a": { "b": 1 } })).is_err());
        let blank: SettingsUpdate = serde_json::from_value(serde_json::json!({ "store_name": " " })).unwrap();
        assert!(blank.validate().unwrap_err().errors().contains_key("store_name"));
    }
}
