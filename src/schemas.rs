use axum::{http::StatusCode, response::Json};
use identity::{IdentityError, UserStore};
use sea_orm::{DatabaseConnection, DbErr};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::{OpenApi, ToSchema};

use crate::handlers::{
    activities::{ActivityResponse, CreateActivityRequest},
    addresses::{AddressResponse, CreateAddressRequest, UpdateAddressRequest},
    auth::VerifyCredentialsRequest,
    notifications::{CreateNotificationRequest, NotificationResponse},
    profiles::{ProfileResponse, UpdateProfileRequest},
    users::{CreateUserRequest, SetPasswordRequest, UpdateUserRequest, UserResponse},
};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// User store with the on-create hooks registered
    pub store: UserStore,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

/// Error response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Error half of every handler result.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
            success: false,
        }
    }

    pub fn with_status(self, status: StatusCode) -> ApiError {
        (status, Json(self))
    }

    pub fn not_found(what: &str, id: i32) -> ApiError {
        Self::new(
            format!("{} with ID {} not found", what, id),
            &format!("{}_NOT_FOUND", what.to_uppercase()),
        )
        .with_status(StatusCode::NOT_FOUND)
    }

    pub fn database(context: &str, db_error: &DbErr) -> ApiError {
        error!("{}: {}", context, db_error);
        Self::new(
            format!("Internal server error while {}", context.to_lowercase()),
            "DATABASE_ERROR",
        )
        .with_status(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn identity(context: &str, identity_error: IdentityError) -> ApiError {
        match identity_error {
            IdentityError::Validation { field, message } => {
                Self::new(format!("Invalid {}: {}", field, message), "VALIDATION_ERROR")
                    .with_status(StatusCode::BAD_REQUEST)
            }
            IdentityError::Conflict(_) => {
                Self::new("Username or email already exists", "USERNAME_OR_EMAIL_EXISTS")
                    .with_status(StatusCode::CONFLICT)
            }
            IdentityError::NotFound(id) => Self::not_found("User", id),
            IdentityError::Database(db_error) => Self::database(context, &db_error),
            IdentityError::PasswordHash(message) => {
                error!("{}: {}", context, message);
                Self::new("Failed to process password", "PASSWORD_HASH_ERROR")
                    .with_status(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::users::create_user,
        crate::handlers::users::get_users,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::users::set_password,
        crate::handlers::auth::verify_credentials,
        crate::handlers::profiles::get_profile,
        crate::handlers::profiles::update_profile,
        crate::handlers::addresses::get_addresses,
        crate::handlers::addresses::create_address,
        crate::handlers::addresses::update_address,
        crate::handlers::addresses::delete_address,
        crate::handlers::notifications::get_notifications,
        crate::handlers::notifications::create_notification,
        crate::handlers::notifications::mark_notification_read,
        crate::handlers::notifications::delete_notification,
        crate::handlers::activities::get_activities,
        crate::handlers::activities::create_activity,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            CreateUserRequest,
            UpdateUserRequest,
            SetPasswordRequest,
            UserResponse,
            VerifyCredentialsRequest,
            ProfileResponse,
            UpdateProfileRequest,
            CreateAddressRequest,
            UpdateAddressRequest,
            AddressResponse,
            CreateNotificationRequest,
            NotificationResponse,
            CreateActivityRequest,
            ActivityResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "User administration endpoints"),
        (name = "auth", description = "Credential check endpoints"),
        (name = "profiles", description = "User profile endpoints"),
        (name = "addresses", description = "Postal address endpoints"),
        (name = "notifications", description = "User notification endpoints"),
        (name = "activities", description = "Append-only activity log endpoints"),
    ),
    info(
        title = "Accounts API",
        description = "User account administration API",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
