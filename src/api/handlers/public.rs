//! Unauthenticated storefront reads.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::{IdPath, OptionalJson};
use crate::api::state::AppState;
use crate::domain::aggregates::{Banner, Category, Link, PopularSearch, ProductDetails, Setting};
use crate::domain::value_objects::Price;
use crate::storefront::{MatchRule, Selection, VariantResolver};

/// Product as the storefront renders it: the full tree plus card pricing.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub details: ProductDetails,
    pub min_price: Option<Price>,
    pub min_price_label: Option<String>,
}

impl From<ProductDetails> for ProductView {
    fn from(details: ProductDetails) -> Self {
        let min_price = details.min_price();
        Self { min_price_label: min_price.map(|p| p.format_rub()), min_price, details }
    }
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy", "service": "upstore" }))
}

pub async fn list_categories(State(s): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(s.query.categories().await?))
}

pub async fn list_banners(State(s): State<AppState>) -> ApiResult<Json<Vec<Banner>>> {
    Ok(Json(s.query.banners().await?))
}

pub async fn list_links(State(s): State<AppState>) -> ApiResult<Json<Vec<Link>>> {
    Ok(Json(s.query.links().await?))
}

pub async fn list_popular_searches(State(s): State<AppState>) -> ApiResult<Json<Vec<PopularSearch>>> {
    Ok(Json(s.query.popular_searches().await?))
}

pub async fn list_settings(State(s): State<AppState>) -> ApiResult<Json<Vec<Setting>>> {
    Ok(Json(s.query.settings().await?))
}

pub async fn list_logos(State(s): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    let logos = s.logos.list().await.map_err(|e| ApiError::Internal(format!("logo directory scan failed: {e}")))?;
    Ok(Json(logos))
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductParams {
    pub search: Option<String>,
    pub category: Option<String>,
    /// Alias of `category`.
    pub slug: Option<String>,
}

pub async fn list_products(State(s): State<AppState>, Query(p): Query<ProductParams>) -> ApiResult<Json<Vec<ProductView>>> {
    let category = p.category.as_deref().or(p.slug.as_deref());
    let products = s.query.products(p.search.as_deref(), category).await?;
    Ok(Json(products.into_iter().map(ProductView::from).collect()))
}

pub async fn get_product(State(s): State<AppState>, IdPath(id, _): IdPath<ProductDetails>) -> ApiResult<Json<ProductView>> {
    Ok(Json(s.query.product(id).await?.into()))
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    /// Option id -> value id. Absent means the default selection.
    #[serde(default)]
    pub selection: Option<Selection>,
    #[serde(default)]
    pub match_rule: MatchRule,
}

/// Runs the variant resolver for a selection on an active product.
/// A blank body behaves like `{}`.
pub async fn resolve_product(
    State(s): State<AppState>,
    IdPath(id, _): IdPath<ProductDetails>,
    OptionalJson(req): OptionalJson<ResolveRequest>,
) -> ApiResult<Response> {
    let req = req.unwrap_or_default();
    let product = s.query.product(id).await?;
    let resolver = VariantResolver::for_product(&product).with_rule(req.match_rule);
    let selection = req.selection.unwrap_or_else(|| resolver.default_selection());
    Ok(Json(resolver.view(selection)).into_response())
}
