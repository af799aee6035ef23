use std::env;
use std::sync::Arc;

use axum::extract::Request;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use log::{info, warn};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::handlers::confirmation_handlers::{
    create_confirmation, delete_confirmation, get_confirmations, replace_confirmation,
};
use crate::handlers::login_handlers::login;
use crate::handlers::present_handlers::{
    buy_present, create_present, delete_present, get_presents, update_present,
};
use crate::resource::AppState;
use wedding_shared::auth::AuthConfig;
use wedding_shared::models::{Confirmation, Present};
use wedding_shared::store::dynamo::DynamoCollectionStore;
use wedding_shared::store::CollectionStore;

/// Origins the wedding front end is served from. Fixed allow-list; this is
/// a boundary policy, not per-deployment configuration.
const ALLOWED_ORIGINS: [&str; 3] = [
    "https://elena-und-markus.de",
    "https://beta.elena-und-markus.de",
    "http://localhost:8000",
];

/// Creates a router with the default DynamoDB stores.
pub async fn create_router() -> Result<Router, lambda_http::Error> {
    info!("Creating router with DynamoDB stores");

    let config = AuthConfig::from_env()?;
    let confirmation_table = env::var("CONFIRMATION_TABLE")
        .map_err(|_| lambda_http::Error::from("CONFIRMATION_TABLE environment variable not set"))?;
    let presents_table = env::var("PRESENTS_TABLE")
        .map_err(|_| lambda_http::Error::from("PRESENTS_TABLE environment variable not set"))?;

    let confirmations = Arc::new(DynamoCollectionStore::<Confirmation>::new(confirmation_table).await);
    let presents = Arc::new(DynamoCollectionStore::<Present>::new(presents_table).await);
    let state = Arc::new(AppState::new(config, confirmations, presents));

    // Check if we should remove the base path prefix
    let remove_base_path = env::var("REMOVE_BASE_PATH")
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false);

    // If REMOVE_BASE_PATH is set to true, don't add the /Prod prefix
    let prefix = if remove_base_path { "" } else { "/Prod" };
    info!("Using API route prefix: {}", prefix);

    Ok(create_router_with_state(state, prefix))
}

/// Creates a router with the given state, so tests can swap in mock stores.
pub fn create_router_with_state<C, P>(state: Arc<AppState<C, P>>, prefix: &str) -> Router
where
    C: CollectionStore<Record = Confirmation> + 'static,
    P: CollectionStore<Record = Present> + 'static,
{
    info!("Setting up API routes with prefix: '{}'", prefix);

    let origins: Vec<HeaderValue> = ALLOWED_ORIGINS
        .iter()
        .map(|origin| HeaderValue::from_static(origin))
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    info!("CORS configured for {} allowed origins", ALLOWED_ORIGINS.len());

    // Logging middleware to trace all requests
    async fn logging_middleware(
        req: Request,
        next: axum::middleware::Next,
    ) -> impl axum::response::IntoResponse {
        info!(
            "Router received request: method={}, uri={}",
            req.method(),
            req.uri()
        );
        next.run(req).await
    }

    let api_routes = Router::new()
        .route(
            "/confirmations",
            get(get_confirmations)
                .post(create_confirmation)
                .put(replace_confirmation)
                .delete(delete_confirmation),
        )
        .route(
            "/presents",
            get(get_presents)
                .post(create_present)
                .put(update_present)
                .delete(delete_present),
        )
        .route("/presents/buy", post(buy_present).put(buy_present))
        .route("/login", post(login))
        .with_state(state);

    // Create the main router
    let router = if prefix.is_empty() {
        // For tests or when no prefix is needed, don't nest the routes
        api_routes
            .layer(cors)
            .layer(middleware::from_fn(logging_middleware))
    } else {
        // For production, nest the routes under the prefix
        Router::new()
            .nest(prefix, api_routes)
            .layer(cors)
            .layer(middleware::from_fn(logging_middleware))
    };

    // Add a fallback handler for 404s
    router.fallback(|req: Request| async move {
        warn!("No route matched for: {} {}", req.method(), req.uri());
        (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "Not Found" })),
        )
    })
}
