use crate::handlers::{
    activities::{create_activity, get_activities},
    addresses::{create_address, delete_address, get_addresses, update_address},
    auth::verify_credentials,
    health::health_check,
    notifications::{
        create_notification, delete_notification, get_notifications, mark_notification_read,
    },
    profiles::{get_profile, update_profile},
    users::{create_user, delete_user, get_user, get_users, set_password, update_user},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // User CRUD routes
        .route("/api/v1/users", post(create_user).get(get_users))
        .route(
            "/api/v1/users/:user_id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/api/v1/users/:user_id/password", put(set_password))
        .route("/api/v1/auth/verify", post(verify_credentials))
        // Owned records
        .route(
            "/api/v1/users/:user_id/profile",
            get(get_profile).put(update_profile),
        )
        .route(
            "/api/v1/users/:user_id/addresses",
            get(get_addresses).post(create_address),
        )
        .route("/api/v1/addresses/:address_id", put(update_address))
        .route("/api/v1/addresses/:address_id", delete(delete_address))
        .route(
            "/api/v1/users/:user_id/notifications",
            get(get_notifications).post(create_notification),
        )
        .route(
            "/api/v1/notifications/:notification_id/read",
            put(mark_notification_read),
        )
        .route(
            "/api/v1/notifications/:notification_id",
            delete(delete_notification),
        )
        .route(
            "/api/v1/users/:user_id/activities",
            get(get_activities).post(create_activity),
        )
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
