//! Public read paths over the catalog store.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::aggregates::{Banner, Category, Link, PopularSearch, ProductDetails, Setting};
use crate::store::{CatalogStore, ProductFilter, Visibility};
use crate::{CatalogError, Result};

#[derive(Clone)]
pub struct CatalogQuery { store: Arc<dyn CatalogStore> }

impl CatalogQuery {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self { Self { store } }

    pub async fn categories(&self) -> Result<Vec<Category>> {
        Ok(self.store.list_categories(Visibility::Public).await?)
    }

    pub async fn banners(&self) -> Result<Vec<Banner>> {
        Ok(self.store.list_banners(Visibility::Public).await?)
    }

    pub async fn links(&self) -> Result<Vec<Link>> {
        Ok(self.store.list_links(Visibility::Public).await?)
    }

    pub async fn popular_searches(&self) -> Result<Vec<PopularSearch>> {
        Ok(self.store.list_popular_searches().await?)
    }

    pub async fn settings(&self) -> Result<Vec<Setting>> {
        Ok(self.store.list_settings().await?)
    }

    /// Active products, optionally narrowed by free text and category slug.
    pub async fn products(&self, search: Option<&str>, category_slug: Option<&str>) -> Result<Vec<ProductDetails>> {
        let filter = ProductFilter::new(Visibility::Public).with_search(search).with_category(category_slug);
        Ok(self.store.list_products(&filter).await?)
    }

    /// Inactive products are reported as missing.
    pub async fn product(&self, id: Uuid) -> Result<ProductDetails> {
        match self.store.find_product(id).await? {
            Some(product) if product.is_active() => Ok(product),
            _ => Err(CatalogError::not_found("Product", id)),
        }
    }
}
