use axum::{Router, routing::post};

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod products;
pub mod reviews;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/orders", orders::router())
        .route("/place-order", post(orders::place_order))
        .nest("/products", products::router())
        .nest("/reviews", reviews::router())
        .nest("/admin", admin::router())
}
