//! Back-office mutations.
//!
//! Every operation validates its input before touching the store, derives the
//! generated fields (category slug, product code) and emits a catalog event
//! once the write has landed.

use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::domain::aggregates::{
    settings_map, Banner, BannerInput, Category, CategoryInput, Link, LinkInput, PopularSearch, PopularSearchInput,
    Product, ProductDetails, ProductInput, ProductOption, ProductOptionInput, ProductOptionValue, ProductVariant,
    ProductVariantInput, SettingsUpdate,
};
use crate::domain::events::{CatalogEvent, EntityEvent, ProductEvent};
use crate::domain::value_objects::{Price, SelectionKey, Slug};
use crate::services::EventSink;
use crate::store::{CatalogStore, ProductFilter, Visibility};
use crate::{CatalogError, Result};

const SLUG_TAKEN: &str = "Category with this slug already exists";

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[derive(Clone)]
pub struct CatalogAdmin {
    store: Arc<dyn CatalogStore>,
    events: EventSink,
}

impl CatalogAdmin {
    pub fn new(store: Arc<dyn CatalogStore>, events: EventSink) -> Self { Self { store, events } }

    // =========================================================================
    // Categories
    // =========================================================================

    pub async fn categories(&self) -> Result<Vec<Category>> {
        Ok(self.store.list_categories(Visibility::Admin).await?)
    }

    pub async fn create_category(&self, input: CategoryInput) -> Result<Category> {
        input.validate()?;
        let slug = category_slug(&input)?;
        if self.store.find_category_by_slug(&slug, None).await?.is_some() {
            return Err(CatalogError::Conflict(SLUG_TAKEN.into()));
        }
        let now = Utc::now();
        let category = Category {
            id: Uuid::now_v7(), name: input.name, slug, icon: non_blank(input.icon),
            sort_order: input.sort_order, active: input.active, created_at: now, updated_at: now,
        };
        self.store.insert_category(&category).await?;
        tracing::info!(category_id = %category.id, slug = %category.slug, "Category created");
        self.events.publish(CatalogEvent::Category(EntityEvent::Created { id: category.id })).await;
        Ok(category)
    }

    /// Re-derives the slug from the name when none is supplied. Keeping the
    /// category's own slug is never a conflict.
    pub async fn update_category(&self, id: Uuid, input: CategoryInput) -> Result<Category> {
        input.validate()?;
        let existing = self.store.find_category(id).await?.ok_or_else(|| CatalogError::not_found("Category", id))?;
        let slug = category_slug(&input)?;
        if self.store.find_category_by_slug(&slug, Some(id)).await?.is_some() {
            return Err(CatalogError::Conflict(SLUG_TAKEN.into()));
        }
        let category = Category {
            id, name: input.name, slug, icon: non_blank(input.icon), sort_order: input.sort_order,
            active: input.active, created_at: existing.created_at, updated_at: Utc::now(),
        };
        if !self.store.update_category(&category).await? {
            return Err(CatalogError::not_found("Category", id));
        }
        tracing::info!(category_id = %id, slug = %category.slug, "Category updated");
        self.events.publish(CatalogEvent::Category(EntityEvent::Updated { id })).await;
        Ok(category)
    }

    pub async fn delete_category(&self, id: Uuid) -> Result<()> {
        if !self.store.delete_category(id).await? {
            return Err(CatalogError::not_found("Category", id));
        }
        tracing::info!(category_id = %id, "Category deleted");
        self.events.publish(CatalogEvent::Category(EntityEvent::Deleted { id })).await;
        Ok(())
    }

    // =========================================================================
    // Products
    // =========================================================================

    pub async fn products(&self) -> Result<Vec<ProductDetails>> {
        Ok(self.store.list_products(&ProductFilter::new(Visibility::Admin)).await?)
    }

    pub async fn product(&self, id: Uuid) -> Result<ProductDetails> {
        self.store.find_product(id).await?.ok_or_else(|| CatalogError::not_found("Product", id))
    }

    pub async fn create_product(&self, input: ProductInput) -> Result<ProductDetails> {
        input.validate()?;
        self.ensure_category(input.category_id).await?;
        let id = Uuid::now_v7();
        let (options, variants) = build_tree(id, input.options, input.variants)?;
        let code = self.store.next_product_code().await?;
        let now = Utc::now();
        let details = ProductDetails {
            product: Product {
                id, code, name: input.name, description: non_blank(input.description),
                main_image: non_blank(input.main_image), category_id: input.category_id,
                sort_order: input.sort_order, active: input.active, created_at: now, updated_at: now,
            },
            category: None,
            options,
            variants,
        };
        self.store.insert_product(&details).await?;
        tracing::info!(product_id = %id, code = %details.product.code, variants = details.variants.len(), "Product created");
        self.events.publish(CatalogEvent::Product(ProductEvent::Created { product_id: id, code: details.product.code.clone() })).await;
        self.product(id).await
    }

    /// Replaces the product row and its whole option/value/variant subtree.
    /// The product code never changes.
    pub async fn update_product(&self, id: Uuid, input: ProductInput) -> Result<ProductDetails> {
        input.validate()?;
        let existing = self.product(id).await?;
        self.ensure_category(input.category_id).await?;
        let (options, variants) = build_tree(id, input.options, input.variants)?;
        let details = ProductDetails {
            product: Product {
                id, code: existing.product.code, name: input.name, description: non_blank(input.description),
                main_image: non_blank(input.main_image), category_id: input.category_id,
                sort_order: input.sort_order, active: input.active,
                created_at: existing.product.created_at, updated_at: Utc::now(),
            },
            category: None,
            options,
            variants,
        };
        if !self.store.replace_product(&details).await? {
            return Err(CatalogError::not_found("Product", id));
        }
        tracing::info!(product_id = %id, variants = details.variants.len(), "Product replaced");
        self.events.publish(CatalogEvent::Product(ProductEvent::Replaced { product_id: id })).await;
        self.product(id).await
    }

    pub async fn delete_product(&self, id: Uuid) -> Result<()> {
        if !self.store.delete_product(id).await? {
            return Err(CatalogError::not_found("Product", id));
        }
        tracing::info!(product_id = %id, "Product deleted");
        self.events.publish(CatalogEvent::Product(ProductEvent::Deleted { product_id: id })).await;
        Ok(())
    }

    async fn ensure_category(&self, category_id: Option<Uuid>) -> Result<()> {
        let Some(id) = category_id else { return Ok(()) };
        if self.store.find_category(id).await?.is_none() {
            return Err(CatalogError::invalid_field("category_id", "not_found", "Category not found"));
        }
        Ok(())
    }

    // =========================================================================
    // Banners
    // =========================================================================

    pub async fn banners(&self) -> Result<Vec<Banner>> {
        Ok(self.store.list_banners(Visibility::Admin).await?)
    }

    pub async fn create_banner(&self, input: BannerInput) -> Result<Banner> {
        input.validate()?;
        let now = Utc::now();
        let banner = Banner {
            id: Uuid::now_v7(), image: input.image, image_desktop: non_blank(input.image_desktop),
            link: non_blank(input.link), sort_order: input.sort_order, active: input.active,
            created_at: now, updated_at: now,
        };
        self.store.insert_banner(&banner).await?;
        tracing::info!(banner_id = %banner.id, "Banner created");
        self.events.publish(CatalogEvent::Banner(EntityEvent::Created { id: banner.id })).await;
        Ok(banner)
    }

    pub async fn update_banner(&self, id: Uuid, input: BannerInput) -> Result<Banner> {
        input.validate()?;
        let existing = self.store.find_banner(id).await?.ok_or_else(|| CatalogError::not_found("Banner", id))?;
        let banner = Banner {
            id, image: input.image, image_desktop: non_blank(input.image_desktop), link: non_blank(input.link),
            sort_order: input.sort_order, active: input.active, created_at: existing.created_at, updated_at: Utc::now(),
        };
        if !self.store.update_banner(&banner).await? {
            return Err(CatalogError::not_found("Banner", id));
        }
        tracing::info!(banner_id = %id, "Banner updated");
        self.events.publish(CatalogEvent::Banner(EntityEvent::Updated { id })).await;
        Ok(banner)
    }

    pub async fn delete_banner(&self, id: Uuid) -> Result<()> {
        if !self.store.delete_banner(id).await? {
            return Err(CatalogError::not_found("Banner", id));
        }
        tracing::info!(banner_id = %id, "Banner deleted");
        self.events.publish(CatalogEvent::Banner(EntityEvent::Deleted { id })).await;
        Ok(())
    }

    // =========================================================================
    // Links
    // =========================================================================

    pub async fn links(&self) -> Result<Vec<Link>> {
        Ok(self.store.list_links(Visibility::Admin).await?)
    }

    pub async fn create_link(&self, input: LinkInput) -> Result<Link> {
        input.validate()?;
        let link = Link {
            id: Uuid::now_v7(), name: input.name, url: input.url, icon: non_blank(input.icon),
            sort_order: input.sort_order, active: input.active, created_at: Utc::now(),
        };
        self.store.insert_link(&link).await?;
        tracing::info!(link_id = %link.id, "Link created");
        self.events.publish(CatalogEvent::Link(EntityEvent::Created { id: link.id })).await;
        Ok(link)
    }

    pub async fn update_link(&self, id: Uuid, input: LinkInput) -> Result<Link> {
        input.validate()?;
        let existing = self.store.find_link(id).await?.ok_or_else(|| CatalogError::not_found("Link", id))?;
        let link = Link {
            id, name: input.name, url: input.url, icon: non_blank(input.icon), sort_order: input.sort_order,
            active: input.active, created_at: existing.created_at,
        };
        if !self.store.update_link(&link).await? {
            return Err(CatalogError::not_found("Link", id));
        }
        tracing::info!(link_id = %id, "Link updated");
        self.events.publish(CatalogEvent::Link(EntityEvent::Updated { id })).await;
        Ok(link)
    }

    pub async fn delete_link(&self, id: Uuid) -> Result<()> {
        if !self.store.delete_link(id).await? {
            return Err(CatalogError::not_found("Link", id));
        }
        tracing::info!(link_id = %id, "Link deleted");
        self.events.publish(CatalogEvent::Link(EntityEvent::Deleted { id })).await;
        Ok(())
    }

    // =========================================================================
    // Popular searches
    // =========================================================================

    pub async fn popular_searches(&self) -> Result<Vec<PopularSearch>> {
        Ok(self.store.list_popular_searches().await?)
    }

    pub async fn create_popular_search(&self, input: PopularSearchInput) -> Result<PopularSearch> {
        input.validate()?;
        let search = PopularSearch { id: Uuid::now_v7(), query: input.query, sort_order: input.sort_order, created_at: Utc::now() };
        self.store.insert_popular_search(&search).await?;
        tracing::info!(popular_search_id = %search.id, "Popular search created");
        self.events.publish(CatalogEvent::PopularSearch(EntityEvent::Created { id: search.id })).await;
        Ok(search)
    }

    pub async fn update_popular_search(&self, id: Uuid, input: PopularSearchInput) -> Result<PopularSearch> {
        input.validate()?;
        let existing = self.store.find_popular_search(id).await?.ok_or_else(|| CatalogError::not_found("Popular search", id))?;
        let search = PopularSearch { id, query: input.query, sort_order: input.sort_order, created_at: existing.created_at };
        if !self.store.update_popular_search(&search).await? {
            return Err(CatalogError::not_found("Popular search", id));
        }
        tracing::info!(popular_search_id = %id, "Popular search updated");
        self.events.publish(CatalogEvent::PopularSearch(EntityEvent::Updated { id })).await;
        Ok(search)
    }

    pub async fn delete_popular_search(&self, id: Uuid) -> Result<()> {
        if !self.store.delete_popular_search(id).await? {
            return Err(CatalogError::not_found("Popular search", id));
        }
        tracing::info!(popular_search_id = %id, "Popular search deleted");
        self.events.publish(CatalogEvent::PopularSearch(EntityEvent::Deleted { id })).await;
        Ok(())
    }

    // =========================================================================
    // Settings
    // =========================================================================

    pub async fn settings(&self) -> Result<BTreeMap<String, String>> {
        Ok(settings_map(&self.store.list_settings().await?))
    }

    /// Upserts every submitted key and returns the full settings map.
    pub async fn update_settings(&self, update: SettingsUpdate) -> Result<BTreeMap<String, String>> {
        update.validate()?;
        let settings = update.into_settings();
        let keys: Vec<String> = settings.iter().map(|s| s.key.clone()).collect();
        self.store.upsert_settings(&settings).await?;
        tracing::info!(keys = ?keys, "Settings updated");
        self.events.publish(CatalogEvent::Settings { keys }).await;
        self.settings().await
    }
}

fn category_slug(input: &CategoryInput) -> Result<Slug> {
    input.resolve_slug().map_err(|e| CatalogError::invalid_field("slug", "slug", e.to_string()))
}

/// Builds the option/value/variant subtree of product `product_id` from an
/// admin payload. Missing sort orders default to payload position; missing
/// ids are generated.
fn build_tree(
    product_id: Uuid,
    options: Vec<ProductOptionInput>,
    variants: Vec<ProductVariantInput>,
) -> Result<(Vec<ProductOption>, Vec<ProductVariant>)> {
    let options: Vec<ProductOption> = options.into_iter().enumerate().map(|(i, o)| {
        let option_id = o.id.unwrap_or_else(Uuid::now_v7);
        ProductOption {
            id: option_id,
            product_id,
            name: o.name,
            sort_order: o.sort_order.unwrap_or(i as i32),
            values: o.values.into_iter().enumerate().map(|(j, v)| ProductOptionValue {
                id: v.id.unwrap_or_else(Uuid::now_v7),
                option_id,
                value: v.value,
                color_code: non_blank(v.color_code),
                image: non_blank(v.image),
                sort_order: v.sort_order.unwrap_or(j as i32),
            }).collect(),
        }
    }).collect();

    let variants = variants.into_iter().map(|v| {
        let key = v.option_values.iter()
            .map(|reference| resolve_value_ref(&options, reference))
            .collect::<Option<Vec<Uuid>>>()
            .ok_or_else(|| CatalogError::invalid_field(
                "variants", "option_values", "Variant option values must reference option values of this product"))?;
        Ok(ProductVariant {
            id: Uuid::now_v7(),
            product_id,
            option_values: SelectionKey::new(key),
            price: Price::new(v.price),
            old_price: v.old_price.map(Price::new),
            in_stock: v.in_stock,
        })
    }).collect::<Result<Vec<_>>>()?;

    Ok((options, variants))
}

/// A variant key entry is a value id from the payload, or a value label
/// that occurs exactly once across the product's options.
fn resolve_value_ref(options: &[ProductOption], reference: &str) -> Option<Uuid> {
    let reference = reference.trim();
    let values = || options.iter().flat_map(|o| o.values.iter());
    if let Ok(id) = Uuid::parse_str(reference) {
        if values().any(|v| v.id == id) {
            return Some(id);
        }
    }
    let mut labelled = values().filter(|v| v.value == reference);
    match (labelled.next(), labelled.next()) {
        (Some(v), None) => Some(v.id),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCatalogStore;
    use crate::storefront::{Selection, VariantResolver};
    use serde_json::json;

    fn admin() -> CatalogAdmin {
        CatalogAdmin::new(Arc::new(MemoryCatalogStore::new()), EventSink::disabled())
    }

    fn category_input(name: &str, slug: Option<&str>) -> CategoryInput {
        serde_json::from_value(json!({ "name": name, "slug": slug })).unwrap()
    }

    fn iphone() -> ProductInput {
        serde_json::from_value(json!({
            "name": "iPhone 15",
            "options": [{ "name": "Color", "values": [{ "value": "Black" }, { "value": "White" }] }],
            "variants": [
                { "optionValues": ["Black"], "price": 90000 },
                { "optionValues": ["White"], "price": 95000, "oldPrice": 99000 }
            ]
        })).unwrap()
    }

    #[tokio::test]
    async fn test_category_slug_generated_and_unique() {
        let admin = admin();
        let phones = admin.create_category(category_input("Смартфоны", None)).await.unwrap();
        assert_eq!(phones.slug.as_str(), "smartfony");

        let dup = admin.create_category(category_input("Phones", Some("smartfony"))).await;
        assert!(matches!(dup, Err(CatalogError::Conflict(ref m)) if m == SLUG_TAKEN));

        let renamed = admin.update_category(phones.id, category_input("Смартфоны", Some("smartfony"))).await.unwrap();
        assert_eq!(renamed.slug.as_str(), "smartfony");
    }

    #[tokio::test]
    async fn test_update_category_into_foreign_slug_conflicts() {
        let admin = admin();
        admin.create_category(category_input("Audio", None)).await.unwrap();
        let laptops = admin.create_category(category_input("Laptops", None)).await.unwrap();
        let result = admin.update_category(laptops.id, category_input("Laptops", Some("audio"))).await;
        assert!(matches!(result, Err(CatalogError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_untransliterable_name_is_a_slug_error() {
        let result = admin().create_category(category_input("!!!", None)).await;
        match result {
            Err(CatalogError::Validation(errors)) => assert!(errors.errors().contains_key("slug")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_product_wires_variants_by_label() {
        let admin = admin();
        let product = admin.create_product(iphone()).await.unwrap();
        assert_eq!(product.product.code.as_str(), "PRD00001");
        let black = product.options[0].values[0].id;
        let white = product.options[0].values[1].id;
        assert_eq!(product.variants[0].option_values.ids(), [black]);
        assert_eq!(product.variants[1].option_values.ids(), [white]);

        let resolver = VariantResolver::for_product(&product);
        let selection: Selection = [(product.options[0].id, white)].into_iter().collect();
        assert_eq!(resolver.resolve(&selection).map(|v| v.price), Some(Price::new(95000)));
    }

    #[tokio::test]
    async fn test_unknown_variant_reference_is_rejected() {
        let mut input = iphone();
        input.variants[0].option_values = vec!["Blue".into()];
        match admin().create_product(input).await {
            Err(CatalogError::Validation(errors)) => assert!(errors.errors().contains_key("variants")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_ambiguous_label_is_rejected() {
        let input: ProductInput = serde_json::from_value(json!({
            "name": "Case",
            "options": [
                { "name": "Outer", "values": [{ "value": "Black" }] },
                { "name": "Inner", "values": [{ "value": "Black" }] }
            ],
            "variants": [{ "optionValues": ["Black"], "price": 100 }]
        })).unwrap();
        assert!(matches!(admin().create_product(input).await, Err(CatalogError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_keeps_code_and_client_value_ids() {
        let admin = admin();
        let created = admin.create_product(iphone()).await.unwrap();
        let black = created.options[0].values[0].id;

        let input: ProductInput = serde_json::from_value(json!({
            "name": "iPhone 15 Pro",
            "options": [{ "name": "Color", "values": [{ "id": black, "value": "Black Titanium" }] }],
            "variants": [{ "optionValues": [black.to_string()], "price": 120000 }]
        })).unwrap();
        let updated = admin.update_product(created.id(), input).await.unwrap();

        assert_eq!(updated.product.code, created.product.code);
        assert_eq!(updated.product.created_at, created.product.created_at);
        assert_eq!(updated.options[0].values[0].id, black);
        assert_eq!(updated.variants.len(), 1);
        assert_eq!(updated.variants[0].option_values.ids(), [black]);
    }

    #[tokio::test]
    async fn test_missing_category_is_rejected() {
        let mut input = iphone();
        input.category_id = Some(Uuid::now_v7());
        match admin().create_product(input).await {
            Err(CatalogError::Validation(errors)) => assert!(errors.errors().contains_key("category_id")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_ids_are_not_found() {
        let admin = admin();
        let id = Uuid::now_v7();
        assert!(matches!(admin.delete_product(id).await, Err(CatalogError::NotFound { .. })));
        assert!(matches!(admin.update_product(id, iphone()).await, Err(CatalogError::NotFound { .. })));
        assert!(matches!(admin.delete_banner(id).await, Err(CatalogError::NotFound { .. })));
        assert!(matches!(admin.update_category(id, category_input("X", None)).await, Err(CatalogError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_settings_upsert() {
        let admin = admin();
        let update: SettingsUpdate = serde_json::from_value(json!({ "store_name": "UpStore", "items_per_row": 4 })).unwrap();
        let map = admin.update_settings(update).await.unwrap();
        assert_eq!(map["store_name"], "UpStore");

        let update: SettingsUpdate = serde_json::from_value(json!({ "store_name": "UpStore Moscow" })).unwrap();
        let map = admin.update_settings(update).await.unwrap();
        assert_eq!(map["store_name"], "UpStore Moscow");
        assert_eq!(map["items_per_row"], "4");
    }
}
