use axum::{
    routing::{get, post, put},
    Router,
};

use crate::backend::{handlers, AppState};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/categories/:id",
            put(handlers::update_category).delete(handlers::delete_category),
        )
        .route("/rules", get(handlers::list_rules))
        .route("/rules/active", get(handlers::active_rule))
        .route("/rules/:id/activate", post(handlers::activate_rule))
        .route("/rules/:id/customize", put(handlers::customize_rule))
        .route(
            "/users/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
}
