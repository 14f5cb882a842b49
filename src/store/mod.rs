//! Catalog storage.
//!
//! [`CatalogStore`] is the persistence seam: list/get/create/update/delete per
//! entity, plus product subtree replacement. [`PgCatalogStore`] backs it with
//! PostgreSQL; [`MemoryCatalogStore`] keeps the same semantics in process.

mod memory;
mod postgres;

pub use memory::MemoryCatalogStore;
pub use postgres::PgCatalogStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::aggregates::{
    AdminUser, Banner, Category, Link, PopularSearch, Product, ProductDetails, Setting,
};
use crate::domain::value_objects::{ProductCode, SelectionKeyError, Slug};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("unique constraint {constraint} violated")]
    UniqueViolation { constraint: String },

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// PostgreSQL unique violations (23505) become [`StoreError::UniqueViolation`].
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return Self::UniqueViolation { constraint };
            }
        }
        Self::Database(err)
    }
}

impl From<SelectionKeyError> for StoreError {
    fn from(err: SelectionKeyError) -> Self { Self::Corrupt(err.to_string()) }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Which records a read path may see.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    /// Only `active` records.
    #[default]
    Public,
    /// Everything, active or not.
    Admin,
}

impl Visibility {
    pub fn admits(&self, active: bool) -> bool {
        matches!(self, Self::Admin) || active
    }

    pub fn active_only(&self) -> bool { matches!(self, Self::Public) }
}

/// Product list filter: visibility, free-text search, category slug.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub visibility: Visibility,
    search: Option<String>,
    category_slug: Option<String>,
}

impl ProductFilter {
    pub fn new(visibility: Visibility) -> Self {
        Self { visibility, ..Default::default() }
    }

    /// Blank search text means no search filter.
    pub fn with_search(mut self, search: Option<&str>) -> Self {
        self.search = search.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        self
    }

    pub fn with_category(mut self, slug: Option<&str>) -> Self {
        self.category_slug = slug.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        self
    }

    pub fn category_slug(&self) -> Option<&str> { self.category_slug.as_deref() }

    /// The search term as a `LIKE` pattern: `%term%` with `\`, `%` and `_` escaped.
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_deref().map(|term| {
            let mut pattern = String::with_capacity(term.len() + 2);
            pattern.push('%');
            for ch in term.chars() {
                if matches!(ch, '\\' | '%' | '_') { pattern.push('\\'); }
                pattern.push(ch);
            }
            pattern.push('%');
            pattern
        })
    }

    /// Case-insensitive substring match on name, code or description (any of
    /// them), restricted to the category slug when one is set.
    pub fn matches(&self, product: &Product, category: Option<&Category>) -> bool {
        if !self.visibility.admits(product.active) {
            return false;
        }
        if let Some(slug) = &self.category_slug {
            if category.map(|c| c.slug.as_str()) != Some(slug.as_str()) {
                return false;
            }
        }
        match &self.search {
            None => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                let hit = |text: &str| text.to_lowercase().contains(&needle);
                hit(&product.name) || hit(product.code.as_str()) || product.description.as_deref().is_some_and(hit)
            }
        }
    }
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    // --- categories ---
    async fn list_categories(&self, visibility: Visibility) -> StoreResult<Vec<Category>>;
    async fn find_category(&self, id: Uuid) -> StoreResult<Option<Category>>;
    /// Category holding `slug`, ignoring the one with id `excluding`.
    async fn find_category_by_slug(&self, slug: &Slug, excluding: Option<Uuid>) -> StoreResult<Option<Category>>;
    async fn insert_category(&self, category: &Category) -> StoreResult<()>;
    async fn update_category(&self, category: &Category) -> StoreResult<bool>;
    /// Products in the category are detached, not deleted.
    async fn delete_category(&self, id: Uuid) -> StoreResult<bool>;

    // --- products ---
    async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<ProductDetails>>;
    async fn find_product(&self, id: Uuid) -> StoreResult<Option<ProductDetails>>;
    /// Draws the next code from a sequence that never hands out the same number twice.
    async fn next_product_code(&self) -> StoreResult<ProductCode>;
    async fn insert_product(&self, product: &ProductDetails) -> StoreResult<()>;
    /// Overwrites the product row and replaces its whole option/value/variant subtree.
    async fn replace_product(&self, product: &ProductDetails) -> StoreResult<bool>;
    /// Cascades to options, values and variants.
    async fn delete_product(&self, id: Uuid) -> StoreResult<bool>;

    // --- banners ---
    async fn list_banners(&self, visibility: Visibility) -> StoreResult<Vec<Banner>>;
    async fn find_banner(&self, id: Uuid) -> StoreResult<Option<Banner>>;
    async fn insert_banner(&self, banner: &Banner) -> StoreResult<()>;
    async fn update_banner(&self, banner: &Banner) -> StoreResult<bool>;
    async fn delete_banner(&self, id: Uuid) -> StoreResult<bool>;

    // --- links ---
    async fn list_links(&self, visibility: Visibility) -> StoreResult<Vec<Link>>;
    async fn find_link(&self, id: Uuid) -> StoreResult<Option<Link>>;
    async fn insert_link(&self, link: &Link) -> StoreResult<()>;
    async fn update_link(&self, link: &Link) -> StoreResult<bool>;
    async fn delete_link(&self, id: Uuid) -> StoreResult<bool>;

    // --- popular searches ---
    async fn list_popular_searches(&self) -> StoreResult<Vec<PopularSearch>>;
    async fn find_popular_search(&self, id: Uuid) -> StoreResult<Option<PopularSearch>>;
    async fn insert_popular_search(&self, search: &PopularSearch) -> StoreResult<()>;
    async fn update_popular_search(&self, search: &PopularSearch) -> StoreResult<bool>;
    async fn delete_popular_search(&self, id: Uuid) -> StoreResult<bool>;

    // --- settings ---
    async fn list_settings(&self) -> StoreResult<Vec<Setting>>;
    async fn upsert_settings(&self, settings: &[Setting]) -> StoreResult<()>;
    /// Returns whether the setting was inserted.
    async fn insert_setting_if_missing(&self, setting: &Setting) -> StoreResult<bool>;

    // --- admin accounts ---
    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<AdminUser>>;
    async fn insert_admin(&self, user: &AdminUser) -> StoreResult<()>;
}
