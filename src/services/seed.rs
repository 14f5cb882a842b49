//! Default storefront data. Seeding only ever adds rows.

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::aggregates::{AdminRole, Category, Link, PopularSearch, Setting};
use crate::domain::value_objects::Slug;
use crate::services::AccountService;
use crate::store::{CatalogStore, Visibility};
use crate::Result;

const DEFAULT_SETTINGS: [(&str, &str); 3] = [("store_name", "UpStore"), ("telegram_link", ""), ("whatsapp_link", "")];

const DEFAULT_CATEGORIES: [(&str, &str); 5] = [
    ("Электроника", "electronics"),
    ("Смартфоны", "smartphones"),
    ("Ноутбуки", "laptops"),
    ("Аксессуары", "accessories"),
    ("Аудио", "audio"),
];

const DEFAULT_POPULAR_SEARCHES: [&str; 5] = ["iPhone", "Samsung", "AirPods", "MacBook", "PlayStation"];

const DEFAULT_LINKS: [(&str, &str, &str); 2] = [
    ("Telegram", "https://t.me/upstore", "telegram"),
    ("WhatsApp", "https://wa.me/79001234567", "whatsapp"),
];

/// Credentials for the account created on first start.
#[derive(Clone, Debug)]
pub struct SeedAdmin {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub settings: usize,
    pub categories: usize,
    pub popular_searches: usize,
    pub links: usize,
    pub admin_created: bool,
}

pub async fn seed_defaults(store: Arc<dyn CatalogStore>, admin: Option<&SeedAdmin>) -> Result<SeedReport> {
    let mut report = SeedReport::default();
    let now = Utc::now();

    for (key, value) in DEFAULT_SETTINGS {
        if store.insert_setting_if_missing(&Setting { key: key.into(), value: value.into() }).await? {
            report.settings += 1;
        }
    }

    for (position, (name, slug)) in DEFAULT_CATEGORIES.into_iter().enumerate() {
        let Ok(slug) = Slug::parse(slug) else { continue };
        if store.find_category_by_slug(&slug, None).await?.is_some() {
            continue;
        }
        let category = Category {
            id: Uuid::now_v7(), name: name.into(), slug, icon: None, sort_order: position as i32 + 1,
            active: true, created_at: now, updated_at: now,
        };
        store.insert_category(&category).await?;
        report.categories += 1;
    }

    if store.list_popular_searches().await?.is_empty() {
        for (position, query) in DEFAULT_POPULAR_SEARCHES.into_iter().enumerate() {
            let search = PopularSearch { id: Uuid::now_v7(), query: query.into(), sort_order: position as i32 + 1, created_at: now };
            store.insert_popular_search(&search).await?;
            report.popular_searches += 1;
        }
    }

    if store.list_links(Visibility::Admin).await?.is_empty() {
        for (position, (name, url, icon)) in DEFAULT_LINKS.into_iter().enumerate() {
            let link = Link {
                id: Uuid::now_v7(), name: name.into(), url: url.into(), icon: Some(icon.into()),
                sort_order: position as i32 + 1, active: true, created_at: now,
            };
            store.insert_link(&link).await?;
            report.links += 1;
        }
    }

    if let Some(admin) = admin {
        report.admin_created = AccountService::new(store.clone())
            .ensure_admin(&admin.email, &admin.password, AdminRole::Superadmin)
            .await?;
    }

    tracing::info!(
        settings = report.settings,
        categories = report.categories,
        popular_searches = report.popular_searches,
        links = report.links,
        admin_created = report.admin_created,
        "Default data seeded"
    );
    Ok(report)
}
