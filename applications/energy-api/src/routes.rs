use axum::{
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::require_api_key;
use crate::config::Config;
use crate::handlers::consumption;
use crate::services::ConsumptionService;

#[derive(Clone)]
pub struct AppState {
    pub service: ConsumptionService,
    pub config: Arc<Config>,
}

pub fn create_router(service: ConsumptionService, config: Arc<Config>) -> Router {
    let state = AppState { service, config };

    let api_routes = Router::new()
        .route("/api/hourly", get(consumption::get_hourly))
        .route("/api/daily", get(consumption::get_daily))
        .route("/api/daily/:date", get(consumption::get_daily_by_date))
        .route("/api/monthly", get(consumption::get_monthly))
        .route(
            "/api/monthly/:year/:month",
            get(consumption::get_monthly_by_month),
        )
        .route("/api/latest", get(consumption::get_latest))
        .route("/api/stats", get(consumption::get_stats))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    let public_routes = Router::new()
        .route("/", get(consumption::root))
        .route("/health", get(consumption::health));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
