use crate::schemas::{ApiError, ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, NaiveDate, Utc};
use identity::{UserChanges, UserFields};
use model::entities::user;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for creating a new user
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateUserRequest {
    /// Email address (must be unique)
    #[validate(length(min = 1, max = 255))]
    pub email: String,
    /// Username (must be unique)
    #[validate(length(min = 1, max = 255))]
    pub username: String,
    /// Full name
    #[validate(length(max = 255))]
    pub full_name: String,
    /// Phone number valid for the configured region
    #[validate(length(min = 1, max = 32))]
    pub phone_number: String,
    /// Date of birth (YYYY-MM-DD)
    pub date_of_birth: NaiveDate,
    /// Raw password; omitted leaves the user without a usable password
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub password: Option<String>,
    /// Create the user as a superuser
    #[serde(default)]
    pub is_superuser: bool,
}

/// Request body for updating a user. Omitted fields stay unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 255))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub username: Option<String>,
    #[validate(length(max = 255))]
    pub full_name: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
}

impl From<UpdateUserRequest> for UserChanges {
    fn from(request: UpdateUserRequest) -> Self {
        Self {
            email: request.email,
            username: request.username,
            full_name: request.full_name,
            phone_number: request.phone_number,
            date_of_birth: request.date_of_birth,
            is_active: request.is_active,
            is_staff: request.is_staff,
            is_superuser: request.is_superuser,
        }
    }
}

/// Request body for replacing a user's password
#[derive(Deserialize, Serialize, ToSchema, Validate)]
pub struct SetPasswordRequest {
    #[validate(length(min = 1))]
    pub password: String,
}

/// User response model. The password hash is never exposed.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub phone_number: String,
    pub date_of_birth: NaiveDate,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            username: model.username,
            full_name: model.full_name,
            phone_number: model.phone_number,
            date_of_birth: model.date_of_birth,
            is_active: model.is_active,
            is_staff: model.is_staff,
            is_superuser: model.is_superuser,
            last_login: model.last_login,
            joined_at: model.joined_at,
            updated_at: model.updated_at,
        }
    }
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Username or email already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn create_user(
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateUserRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    trace!("Entering create_user function");
    debug!(
        "Creating user with username: {}, superuser: {}",
        request.username, request.is_superuser
    );

    let fields = UserFields {
        email: request.email,
        username: request.username,
        full_name: request.full_name,
        phone_number: request.phone_number,
        date_of_birth: request.date_of_birth,
        password: request.password,
    };

    let created = if request.is_superuser {
        state.store.create_superuser(fields).await
    } else {
        state.store.create_user(fields).await
    }
    .map_err(|e| ErrorResponse::identity("Creating user", e))?;

    info!(
        "User created successfully with ID: {}, username: {}",
        created.id, created.username
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            UserResponse::from(created),
            "User created successfully",
        )),
    ))
}

/// Get all users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    responses(
        (status = 200, description = "Users retrieved successfully", body = ApiResponse<Vec<UserResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_users(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, ApiError> {
    trace!("Entering get_users function");

    let users = state
        .store
        .list()
        .await
        .map_err(|e| ErrorResponse::identity("Retrieving users", e))?;

    info!("Successfully retrieved {} users", users.len());
    let users = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(ApiResponse::new(users, "Users retrieved successfully")))
}

/// Get a specific user by ID
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = ApiResponse<UserResponse>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    trace!("Entering get_user function for user_id: {}", user_id);

    match state.store.get(user_id).await {
        Ok(Some(found)) => {
            info!("Successfully retrieved user with ID: {}", found.id);
            Ok(Json(ApiResponse::new(
                UserResponse::from(found),
                "User retrieved successfully",
            )))
        }
        Ok(None) => {
            warn!("User with ID {} not found", user_id);
            Err(ErrorResponse::not_found("User", user_id))
        }
        Err(e) => Err(ErrorResponse::identity("Retrieving user", e)),
    }
}

/// Update a user
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Username or email already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<UpdateUserRequest>>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    trace!("Entering update_user function for user_id: {}", user_id);

    let updated = state
        .store
        .update(user_id, request.into())
        .await
        .map_err(|e| ErrorResponse::identity("Updating user", e))?;

    info!("User {} updated successfully", updated.id);
    Ok(Json(ApiResponse::new(
        UserResponse::from(updated),
        "User updated successfully",
    )))
}

/// Delete a user together with everything it owns
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    trace!("Entering delete_user function for user_id: {}", user_id);

    let deleted = state
        .store
        .delete(user_id)
        .await
        .map_err(|e| ErrorResponse::identity("Deleting user", e))?;

    if !deleted {
        return Err(ErrorResponse::not_found("User", user_id));
    }

    info!("User {} deleted successfully", user_id);
    Ok(Json(ApiResponse::new(
        format!("User {} deleted", user_id),
        "User deleted successfully",
    )))
}

/// Replace a user's password
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}/password",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = SetPasswordRequest,
    responses(
        (status = 200, description = "Password changed successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn set_password(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<SetPasswordRequest>>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    trace!("Entering set_password function for user_id: {}", user_id);

    let updated = state
        .store
        .set_password(user_id, &request.password)
        .await
        .map_err(|e| ErrorResponse::identity("Changing password", e))?;

    info!("Password of user {} changed", user_id);
    Ok(Json(ApiResponse::new(
        UserResponse::from(updated),
        "Password changed successfully",
    )))
}

/// 404 unless user `user_id` exists. Used by the nested user routes.
pub(crate) async fn ensure_user_exists(state: &AppState, user_id: i32) -> Result<(), ApiError> {
    match state.store.get(user_id).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => {
            warn!("User with ID {} not found", user_id);
            Err(ErrorResponse::not_found("User", user_id))
        }
        Err(e) => Err(ErrorResponse::identity("Retrieving user", e)),
    }
}
