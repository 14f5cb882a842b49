//! Back-office CRUD. Every handler takes an [`AdminSession`].

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::api::auth::AdminSession;
use crate::api::error::ApiResult;
use crate::api::extract::{IdPath, ValidJson};
use crate::api::state::AppState;
use crate::domain::aggregates::{
    Banner, BannerInput, Category, CategoryInput, Link, LinkInput, PopularSearch, PopularSearchInput, ProductDetails,
    ProductInput, SettingsUpdate,
};

type Created<T> = (StatusCode, Json<T>);

fn created<T>(value: T) -> Created<T> { (StatusCode::CREATED, Json(value)) }

fn deleted() -> Json<Value> { Json(json!({ "success": true })) }

// --- categories ---

pub async fn list_categories(_: AdminSession, State(s): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(s.admin.categories().await?))
}

pub async fn create_category(_: AdminSession, State(s): State<AppState>, ValidJson(input): ValidJson<CategoryInput>) -> ApiResult<Created<Category>> {
    Ok(created(s.admin.create_category(input).await?))
}

pub async fn update_category(
    _: AdminSession,
    State(s): State<AppState>,
    IdPath(id, _): IdPath<Category>,
    ValidJson(input): ValidJson<CategoryInput>,
) -> ApiResult<Json<Category>> {
    Ok(Json(s.admin.update_category(id, input).await?))
}

pub async fn delete_category(_: AdminSession, State(s): State<AppState>, IdPath(id, _): IdPath<Category>) -> ApiResult<Json<Value>> {
    s.admin.delete_category(id).await?;
    Ok(deleted())
}

// --- products ---

pub async fn list_products(_: AdminSession, State(s): State<AppState>) -> ApiResult<Json<Vec<ProductDetails>>> {
    Ok(Json(s.admin.products().await?))
}

pub async fn get_product(_: AdminSession, State(s): State<AppState>, IdPath(id, _): IdPath<ProductDetails>) -> ApiResult<Json<ProductDetails>> {
    Ok(Json(s.admin.product(id).await?))
}

pub async fn create_product(_: AdminSession, State(s): State<AppState>, ValidJson(input): ValidJson<ProductInput>) -> ApiResult<Created<ProductDetails>> {
    Ok(created(s.admin.create_product(input).await?))
}

pub async fn update_product(
    _: AdminSession,
    State(s): State<AppState>,
    IdPath(id, _): IdPath<ProductDetails>,
    ValidJson(input): ValidJson<ProductInput>,
) -> ApiResult<Json<ProductDetails>> {
    Ok(Json(s.admin.update_product(id, input).await?))
}

pub async fn delete_product(_: AdminSession, State(s): State<AppState>, IdPath(id, _): IdPath<ProductDetails>) -> ApiResult<Json<Value>> {
    s.admin.delete_product(id).await?;
    Ok(deleted())
}

// --- banners ---

pub async fn list_banners(_: AdminSession, State(s): State<AppState>) -> ApiResult<Json<Vec<Banner>>> {
    Ok(Json(s.admin.banners().await?))
}

pub async fn create_banner(_: AdminSession, State(s): State<AppState>, ValidJson(input): ValidJson<BannerInput>) -> ApiResult<Created<Banner>> {
    Ok(created(s.admin.create_banner(input).await?))
}

pub async fn update_banner(
    _: AdminSession,
    State(s): State<AppState>,
    IdPath(id, _): IdPath<Banner>,
    ValidJson(input): ValidJson<BannerInput>,
) -> ApiResult<Json<Banner>> {
    Ok(Json(s.admin.update_banner(id, input).await?))
}

pub async fn delete_banner(_: AdminSession, State(s): State<AppState>, IdPath(id, _): IdPath<Banner>) -> ApiResult<Json<Value>> {
    s.admin.delete_banner(id).await?;
    Ok(deleted())
}

// --- links ---

pub async fn list_links(_: AdminSession, State(s): State<AppState>) -> ApiResult<Json<Vec<Link>>> {
    Ok(Json(s.admin.links().await?))
}

pub async fn create_link(_: AdminSession, State(s): State<AppState>, ValidJson(input): ValidJson<LinkInput>) -> ApiResult<Created<Link>> {
    Ok(created(s.admin.create_link(input).await?))
}

pub async fn update_link(
    _: AdminSession,
    State(s): State<AppState>,
    IdPath(id, _): IdPath<Link>,
    ValidJson(input): ValidJson<LinkInput>,
) -> ApiResult<Json<Link>> {
    Ok(Json(s.admin.update_link(id, input).await?))
}

pub async fn delete_link(_: AdminSession, State(s): State<AppState>, IdPath(id, _): IdPath<Link>) -> ApiResult<Json<Value>> {
    s.admin.delete_link(id).await?;
    Ok(deleted())
}

// --- popular searches ---

pub async fn list_popular_searches(_: AdminSession, State(s): State<AppState>) -> ApiResult<Json<Vec<PopularSearch>>> {
    Ok(Json(s.admin.popular_searches().await?))
}

pub async fn create_popular_search(
    _: AdminSession,
    State(s): State<AppState>,
    ValidJson(input): ValidJson<PopularSearchInput>,
) -> ApiResult<Created<PopularSearch>> {
    Ok(created(s.admin.create_popular_search(input).await?))
}

pub async fn update_popular_search(
    _: AdminSession,
    State(s): State<AppState>,
    IdPath(id, _): IdPath<PopularSearch>,
    ValidJson(input): ValidJson<PopularSearchInput>,
) -> ApiResult<Json<PopularSearch>> {
    Ok(Json(s.admin.update_popular_search(id, input).await?))
}

pub async fn delete_popular_search(_: AdminSession, State(s): State<AppState>, IdPath(id, _): IdPath<PopularSearch>) -> ApiResult<Json<Value>> {
    s.admin.delete_popular_search(id).await?;
    Ok(deleted())
}

// --- settings ---

pub async fn get_settings(_: AdminSession, State(s): State<AppState>) -> ApiResult<Json<BTreeMap<String, String>>> {
    Ok(Json(s.admin.settings().await?))
}

pub async fn update_settings(
    _: AdminSession,
    State(s): State<AppState>,
    ValidJson(update): ValidJson<SettingsUpdate>,
) -> ApiResult<Json<BTreeMap<String, String>>> {
    Ok(Json(s.admin.update_settings(update).await?))
}
