use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Uri},
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::warn;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::{auth_rate_limit_middleware, jwt_auth_middleware};
use crate::state::AppState;

/// Full application: public and protected API routes, the upload mount and
/// the global middleware stack.
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let mut router = Router::new()
        .merge(public_routes(&state))
        .merge(protected_routes(&state))
        .nest_service(
            &config.uploads.mount_path,
            ServeDir::new(&config.uploads.directory),
        )
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(cors_layer(&config))
                .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes)),
        );

    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn public_routes(state: &AppState) -> Router<AppState> {
    use public::auth;

    // login and register share one limiter
    let credentials = Router::new()
        .route("/api/auth/login", post(auth::login_post))
        .route("/api/auth/register", post(auth::register_post))
        .route_layer(from_fn_with_state(state.clone(), auth_rate_limit_middleware));

    Router::new()
        .route("/api/health", get(public::health_get))
        .route("/api/auth/check-username/:username", get(auth::check_username_get))
        .merge(credentials)
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(trip_routes())
        .merge(spot_routes())
        .merge(expense_routes())
        .merge(memory_routes())
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}

fn auth_routes() -> Router<AppState> {
    use protected::auth;

    Router::new().route("/api/auth/profile", get(auth::profile_get))
}

fn trip_routes() -> Router<AppState> {
    use protected::{trip_days, trips};

    Router::new()
        .route("/api/trips", get(trips::trips_get).post(trips::trips_post))
        .route(
            "/api/trips/:id",
            get(trips::trip_get)
                .put(trips::trip_put)
                .delete(trips::trip_delete),
        )
        .route("/api/trips/:id/status", patch(trips::trip_status_patch))
        .route(
            "/api/trips/:id/days",
            get(trip_days::trip_days_get).post(trip_days::trip_days_post),
        )
        .route(
            "/api/trip-days/:id",
            get(trip_days::trip_day_get)
                .put(trip_days::trip_day_put)
                .delete(trip_days::trip_day_delete),
        )
}

fn spot_routes() -> Router<AppState> {
    use protected::spots;

    Router::new()
        .route("/api/trip-spots", get(spots::spots_get).post(spots::spots_post))
        .route("/api/trip-spots/trip/:trip_id", get(spots::spots_by_trip_get))
        .route("/api/trip-spots/day/:day_id", get(spots::spots_by_day_get))
        .route(
            "/api/trip-spots/:id",
            get(spots::spot_get)
                .put(spots::spot_put)
                .delete(spots::spot_delete),
        )
        .route("/api/trip-spots/:id/visited", patch(spots::spot_visited_patch))
        .route("/api/trip-spots/:id/order", patch(spots::spot_order_patch))
}

fn expense_routes() -> Router<AppState> {
    use protected::expenses;

    Router::new()
        .route(
            "/api/expenses",
            get(expenses::expenses_get).post(expenses::expenses_post),
        )
        .route("/api/expenses/trip/:trip_id", get(expenses::expenses_by_trip_get))
        .route(
            "/api/expenses/trip/:trip_id/summary",
            get(expenses::expenses_summary_get),
        )
        .route(
            "/api/expenses/trip/:trip_id/daily",
            get(expenses::expenses_daily_get),
        )
        .route(
            "/api/expenses/trip/:trip_id/budget-comparison",
            get(expenses::expenses_budget_get),
        )
        .route(
            "/api/expenses/:id",
            get(expenses::expense_get)
                .put(expenses::expense_put)
                .delete(expenses::expense_delete),
        )
}

fn memory_routes() -> Router<AppState> {
    use protected::memories;

    Router::new()
        .route(
            "/api/memories",
            get(memories::memories_get).post(memories::memories_post),
        )
        .route("/api/memories/trip/:trip_id", get(memories::memories_by_trip_get))
        .route(
            "/api/memories/trip/:trip_id/daily",
            get(memories::memories_daily_get),
        )
        .route(
            "/api/memories/trip/:trip_id/emotions",
            get(memories::memories_emotions_get),
        )
        .route(
            "/api/memories/trip/:trip_id/weather",
            get(memories::memories_weather_get),
        )
        .route(
            "/api/memories/trip/:trip_id/stats",
            get(memories::memories_stats_get),
        )
        .route("/api/memories/spot/:spot_id", get(memories::memories_by_spot_get))
        .route(
            "/api/memories/:id",
            get(memories::memory_get)
                .put(memories::memory_put)
                .delete(memories::memory_delete),
        )
}

/// No configured origins means any origin may call the API.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = &config.security.cors_origins;
    if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::permissive().allow_origin(allowed)
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("Route {} not found", uri.path()))
}
