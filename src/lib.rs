// Library exports for the Pimang community server.
// Integration tests build the router through `app`.

pub mod auth;
pub mod backend;
pub mod board;
pub mod config;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Every page and asset route, traced and bound to `state`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::home::index))
        .route("/assets/{*path}", get(routes::assets::serve))
        .merge(routes::auth::router())
        .merge(routes::posts::router())
        .merge(routes::write::router())
        .merge(routes::admin::router())
        .merge(routes::me::router())
        .merge(routes::guides::router())
        .fallback(error::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
