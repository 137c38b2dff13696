use crate::handlers::users::UserResponse;
use crate::schemas::{ApiError, ApiResponse, AppState, ErrorResponse};
use axum::{extract::State, http::StatusCode, response::Json};
use axum_valid::Valid;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Username and raw password to check
#[derive(Deserialize, Serialize, ToSchema, Validate)]
pub struct VerifyCredentialsRequest {
    #[validate(length(min = 1, max = 255))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Check a username/password pair and record the login time
#[utoipa::path(
    post,
    path = "/api/v1/auth/verify",
    tag = "auth",
    request_body = VerifyCredentialsRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn verify_credentials(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<VerifyCredentialsRequest>>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    trace!("Entering verify_credentials function");

    let authenticated = state
        .store
        .authenticate(&request.username, &request.password)
        .await
        .map_err(|e| ErrorResponse::identity("Verifying credentials", e))?;

    match authenticated {
        Some(found) => {
            info!("User '{}' authenticated", found.username);
            Ok(Json(ApiResponse::new(
                UserResponse::from(found),
                "Credentials accepted",
            )))
        }
        None => {
            warn!("Rejected credentials for '{}'", request.username);
            Err(ErrorResponse::new("Invalid username or password", "INVALID_CREDENTIALS")
                .with_status(StatusCode::UNAUTHORIZED))
        }
    }
}
