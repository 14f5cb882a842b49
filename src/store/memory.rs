//! In-process catalog store.
//!
//! Mirrors the PostgreSQL store's observable behaviour: unique slugs, codes
//! and ids, product cascade, category detach on delete, and
//! `sort_order`-then-insertion ordering.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CatalogStore, ProductFilter, StoreError, StoreResult, Visibility};
use crate::domain::aggregates::{
    AdminUser, Banner, Category, Link, PopularSearch, Product, ProductDetails, ProductOption, ProductVariant, Setting,
};
use crate::domain::value_objects::{ProductCode, Slug};

#[derive(Default)]
struct Tables {
    categories: Vec<Category>,
    products: Vec<Product>,
    options: Vec<ProductOption>,
    variants: Vec<ProductVariant>,
    banners: Vec<Banner>,
    links: Vec<Link>,
    popular_searches: Vec<PopularSearch>,
    settings: Vec<Setting>,
    admins: Vec<AdminUser>,
    product_code_seq: i64,
}

impl Tables {
    fn details(&self, product: &Product) -> ProductDetails {
        let category = product.category_id.and_then(|id| self.categories.iter().find(|c| c.id == id).cloned());
        let mut details = ProductDetails {
            product: product.clone(),
            category,
            options: self.options.iter().filter(|o| o.product_id == product.id).cloned().collect(),
            variants: self.variants.iter().filter(|v| v.product_id == product.id).cloned().collect(),
        };
        details.sort_children();
        details
    }

    /// Ids of options, values and variants must be unique across all products.
    fn check_child_ids(&self, product: &ProductDetails) -> StoreResult<()> {
        let owner = product.id();
        let foreign_option = |id: &Uuid| self.options.iter().any(|o| &o.id == id && o.product_id != owner);
        let foreign_value = |id: &Uuid| {
            self.options.iter().filter(|o| o.product_id != owner).any(|o| o.values.iter().any(|v| &v.id == id))
        };
        let foreign_variant = |id: &Uuid| self.variants.iter().any(|v| &v.id == id && v.product_id != owner);

        let mut seen = std::collections::HashSet::new();
        for option in &product.options {
            if foreign_option(&option.id) || !seen.insert(option.id) {
                return Err(unique("product_options_pkey"));
            }
            for value in &option.values {
                if foreign_value(&value.id) || !seen.insert(value.id) {
                    return Err(unique("product_option_values_pkey"));
                }
            }
        }
        for variant in &product.variants {
            if foreign_variant(&variant.id) || !seen.insert(variant.id) {
                return Err(unique("product_variants_pkey"));
            }
        }
        Ok(())
    }

    fn write_children(&mut self, product: &ProductDetails) {
        let id = product.id();
        self.options.retain(|o| o.product_id != id);
        self.variants.retain(|v| v.product_id != id);
        self.options.extend(product.options.iter().cloned().map(|mut o| { o.product_id = id; o }));
        self.variants.extend(product.variants.iter().cloned().map(|mut v| { v.product_id = id; v }));
    }
}

fn unique(constraint: &str) -> StoreError {
    StoreError::UniqueViolation { constraint: constraint.to_string() }
}

/// Sorted by `sort_order`; the stable sort keeps insertion order for ties.
fn ordered<T: Clone>(rows: impl Iterator<Item = T>, sort_order: impl Fn(&T) -> i32) -> Vec<T> {
    let mut rows: Vec<T> = rows.collect();
    rows.sort_by_key(|r| sort_order(r));
    rows
}

fn replace_where<T>(rows: &mut [T], matches: impl Fn(&T) -> bool, with: T) -> bool {
    match rows.iter_mut().find(|r| matches(r)) {
        Some(slot) => { *slot = with; true }
        None => false,
    }
}

fn remove_where<T>(rows: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> bool {
    let before = rows.len();
    rows.retain(|r| !matches(r));
    rows.len() != before
}

#[derive(Default)]
pub struct MemoryCatalogStore { tables: RwLock<Tables> }

impl MemoryCatalogStore {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn list_categories(&self, visibility: Visibility) -> StoreResult<Vec<Category>> {
        let t = self.tables.read().await;
        Ok(ordered(t.categories.iter().filter(|c| visibility.admits(c.active)).cloned(), |c| c.sort_order))
    }

    async fn find_category(&self, id: Uuid) -> StoreResult<Option<Category>> {
        Ok(self.tables.read().await.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn find_category_by_slug(&self, slug: &Slug, excluding: Option<Uuid>) -> StoreResult<Option<Category>> {
        let t = self.tables.read().await;
        Ok(t.categories.iter().find(|c| &c.slug == slug && Some(c.id) != excluding).cloned())
    }

    async fn insert_category(&self, category: &Category) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        if t.categories.iter().any(|c| c.slug == category.slug) {
            return Err(unique("uq_categories_slug"));
        }
        t.categories.push(category.clone());
        Ok(())
    }

    async fn update_category(&self, category: &Category) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        if t.categories.iter().any(|c| c.slug == category.slug && c.id != category.id) {
            return Err(unique("uq_categories_slug"));
        }
        Ok(replace_where(&mut t.categories, |c| c.id == category.id, category.clone()))
    }

    async fn delete_category(&self, id: Uuid) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        if !remove_where(&mut t.categories, |c| c.id == id) {
            return Ok(false);
        }
        for product in t.products.iter_mut().filter(|p| p.category_id == Some(id)) {
            product.category_id = None;
        }
        Ok(true)
    }

    async fn list_products(&self, filter: &ProductFilter) -> StoreResult<Vec<ProductDetails>> {
        let t = self.tables.read().await;
        let matching = t.products.iter().filter(|p| {
            let category = p.category_id.and_then(|id| t.categories.iter().find(|c| c.id == id));
            filter.matches(p, category)
        });
        Ok(ordered(matching, |p| p.sort_order).into_iter().map(|p| t.details(p)).collect())
    }

    async fn find_product(&self, id: Uuid) -> StoreResult<Option<ProductDetails>> {
        let t = self.tables.read().await;
        Ok(t.products.iter().find(|p| p.id == id).map(|p| t.details(p)))
    }

    async fn next_product_code(&self) -> StoreResult<ProductCode> {
        let mut t = self.tables.write().await;
        t.product_code_seq += 1;
        Ok(ProductCode::from_sequence(t.product_code_seq))
    }

    async fn insert_product(&self, product: &ProductDetails) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        if t.products.iter().any(|p| p.id == product.id()) {
            return Err(unique("products_pkey"));
        }
        if t.products.iter().any(|p| p.code == product.product.code) {
            return Err(unique("uq_products_code"));
        }
        t.check_child_ids(product)?;
        t.products.push(product.product.clone());
        t.write_children(product);
        Ok(())
    }

    async fn replace_product(&self, product: &ProductDetails) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        let Some(existing) = t.products.iter().position(|p| p.id == product.id()) else {
            return Ok(false);
        };
        t.check_child_ids(product)?;
        let row = &mut t.products[existing];
        let p = &product.product;
        row.name = p.name.clone();
        row.description = p.description.clone();
        row.main_image = p.main_image.clone();
        row.category_id = p.category_id;
        row.sort_order = p.sort_order;
        row.active = p.active;
        row.updated_at = p.updated_at;
        t.write_children(product);
        Ok(true)
    }

    async fn delete_product(&self, id: Uuid) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        if !remove_where(&mut t.products, |p| p.id == id) {
            return Ok(false);
        }
        t.options.retain(|o| o.product_id != id);
        t.variants.retain(|v| v.product_id != id);
        Ok(true)
    }

    async fn list_banners(&self, visibility: Visibility) -> StoreResult<Vec<Banner>> {
        let t = self.tables.read().await;
        Ok(ordered(t.banners.iter().filter(|b| visibility.admits(b.active)).cloned(), |b| b.sort_order))
    }

    async fn find_banner(&self, id: Uuid) -> StoreResult<Option<Banner>> {
        Ok(self.tables.read().await.banners.iter().find(|b| b.id == id).cloned())
    }

    async fn insert_banner(&self, banner: &Banner) -> StoreResult<()> {
        self.tables.write().await.banners.push(banner.clone());
        Ok(())
    }

    async fn update_banner(&self, banner: &Banner) -> StoreResult<bool> {
        Ok(replace_where(&mut self.tables.write().await.banners, |b| b.id == banner.id, banner.clone()))
    }

    async fn delete_banner(&self, id: Uuid) -> StoreResult<bool> {
        Ok(remove_where(&mut self.tables.write().await.banners, |b| b.id == id))
    }

    async fn list_links(&self, visibility: Visibility) -> StoreResult<Vec<Link>> {
        let t = self.tables.read().await;
        Ok(ordered(t.links.iter().filter(|l| visibility.admits(l.active)).cloned(), |l| l.sort_order))
    }

    async fn find_link(&self, id: Uuid) -> StoreResult<Option<Link>> {
        Ok(self.tables.read().await.links.iter().find(|l| l.id == id).cloned())
    }

    async fn insert_link(&self, link: &Link) -> StoreResult<()> {
        self.tables.write().await.links.push(link.clone());
        Ok(())
    }

    async fn update_link(&self, link: &Link) -> StoreResult<bool> {
        Ok(replace_where(&mut self.tables.write().await.links, |l| l.id == link.id, link.clone()))
    }

    async fn delete_link(&self, id: Uuid) -> StoreResult<bool> {
        Ok(remove_where(&mut self.tables.write().await.links, |l| l.id == id))
    }

    async fn list_popular_searches(&self) -> StoreResult<Vec<PopularSearch>> {
        let t = self.tables.read().await;
        Ok(ordered(t.popular_searches.iter().cloned(), |s| s.sort_order))
    }

    async fn find_popular_search(&self, id: Uuid) -> StoreResult<Option<PopularSearch>> {
        Ok(self.tables.read().await.popular_searches.iter().find(|s| s.id == id).cloned())
    }

    async fn insert_popular_search(&self, search: &PopularSearch) -> StoreResult<()> {
        self.tables.write().await.popular_searches.push(search.clone());
        Ok(())
    }

    async fn update_popular_search(&self, search: &PopularSearch) -> StoreResult<bool> {
        Ok(replace_where(&mut self.tables.write().await.popular_searches, |s| s.id == search.id, search.clone()))
    }

    async fn delete_popular_search(&self, id: Uuid) -> StoreResult<bool> {
        Ok(remove_where(&mut self.tables.write().await.popular_searches, |s| s.id == id))
    }

    async fn list_settings(&self) -> StoreResult<Vec<Setting>> {
        let mut settings = self.tables.read().await.settings.clone();
        settings.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(settings)
    }

    async fn upsert_settings(&self, settings: &[Setting]) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        for setting in settings {
            if !replace_where(&mut t.settings, |s| s.key == setting.key, setting.clone()) {
                t.settings.push(setting.clone());
            }
        }
        Ok(())
    }

    async fn insert_setting_if_missing(&self, setting: &Setting) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        if t.settings.iter().any(|s| s.key == setting.key) {
            return Ok(false);
        }
        t.settings.push(setting.clone());
        Ok(true)
    }

    async fn find_admin_by_email(&self, email: &str) -> StoreResult<Option<AdminUser>> {
        let t = self.tables.read().await;
        Ok(t.admins.iter().find(|a| a.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn insert_admin(&self, user: &AdminUser) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        if t.admins.iter().any(|a| a.email.eq_ignore_ascii_case(&user.email)) {
            return Err(unique("uq_admin_users_email"));
        }
        t.admins.push(user.clone());
        Ok(())
    }
}
