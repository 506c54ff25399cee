use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod cart;
pub mod categories;
pub mod companies;
pub mod doc;
pub mod health;
pub mod home;
pub mod orders;
pub mod params;
pub mod products;
pub mod users;

fn customer_router() -> Router<AppState> {
    Router::new()
        .nest("/home", home::router())
        .nest("/cart", cart::router())
}

fn admin_router() -> Router<AppState> {
    Router::new()
        .nest("/orders", orders::router())
        .nest("/products", products::router())
        .nest("/categories", categories::router())
        .nest("/companies", companies::router())
        .nest("/users", users::router())
}

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/customer", customer_router())
        .nest("/admin", admin_router())
}
