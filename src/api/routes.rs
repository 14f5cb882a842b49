use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::handlers::{admin, auth, public};
use crate::api::state::AppState;

/// Full application router: public reads, login, session-gated admin CRUD.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(public::health))
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(public::list_categories))
        .route("/banners", get(public::list_banners))
        .route("/links", get(public::list_links))
        .route("/popular-searches", get(public::list_popular_searches))
        .route("/settings", get(public::list_settings))
        .route("/logos", get(public::list_logos))
        .route("/products", get(public::list_products))
        .route("/products/:id", get(public::get_product))
        .route("/products/:id/resolve", post(public::resolve_product))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .nest("/admin", admin_routes())
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(admin::list_categories).post(admin::create_category))
        .route("/categories/:id", put(admin::update_category).delete(admin::delete_category))
        .route("/products", get(admin::list_products).post(admin::create_product))
        .route("/products/:id", get(admin::get_product).put(admin::update_product).delete(admin::delete_product))
        .route("/banners", get(admin::list_banners).post(admin::create_banner))
        .route("/banners/:id", put(admin::update_banner).delete(admin::delete_banner))
        .route("/links", get(admin::list_links).post(admin::create_link))
        .route("/links/:id", put(admin::update_link).delete(admin::delete_link))
        .route("/popular-searches", get(admin::list_popular_searches).post(admin::create_popular_search))
        .route("/popular-searches/:id", put(admin::update_popular_search).delete(admin::delete_popular_search))
        .route("/settings", get(admin::get_settings).post(admin::update_settings))
}
