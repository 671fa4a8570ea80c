pub mod auth;
pub mod error;
mod handlers;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use crate::store::{CategoryStore, RuleStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub categories: CategoryStore,
    pub rules: RuleStore,
    pub users: UserStore,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            categories: CategoryStore::new(),
            rules: RuleStore::default(),
            users: UserStore::new(),
            config: Arc::new(config),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    Router::new()
        .route("/health", get(|| async { "Backend is running" }))
        .nest("/api", routes::api_routes())
        .layer(cors)
        .with_state(state)
}

pub async fn run_server() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = Config::load();
    let port = config.port;
    let state = AppState::new(config);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
