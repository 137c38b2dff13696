use crate::schemas::{ApiError, ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, Utc};
use model::entities::profile;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for updating a profile. Omitted fields stay unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateProfileRequest {
    pub bio: Option<String>,
    /// Reference to the avatar image
    #[validate(length(max = 255))]
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub id: i32,
    pub user_id: i32,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<profile::Model> for ProfileResponse {
    fn from(model: profile::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            bio: model.bio,
            avatar: model.avatar,
            updated_at: model.updated_at,
        }
    }
}

async fn find_profile(db: &DatabaseConnection, user_id: i32) -> Result<profile::Model, ApiError> {
    match profile::Entity::find()
        .filter(profile::Column::UserId.eq(user_id))
        .one(db)
        .await
    {
        Ok(Some(found)) => Ok(found),
        Ok(None) => {
            warn!("Profile for user {} not found", user_id);
            Err(ErrorResponse::not_found("Profile", user_id))
        }
        Err(db_error) => Err(ErrorResponse::database("Retrieving profile", &db_error)),
    }
}

/// Get the profile of a user
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/profile",
    tag = "profiles",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ApiResponse<ProfileResponse>),
        (status = 404, description = "Profile not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_profile(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ProfileResponse>>, ApiError> {
    trace!("Entering get_profile function for user_id: {}", user_id);

    let found = find_profile(&state.db, user_id).await?;
    Ok(Json(ApiResponse::new(
        ProfileResponse::from(found),
        "Profile retrieved successfully",
    )))
}

/// Update the bio or avatar of a user's profile
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}/profile",
    tag = "profiles",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated successfully", body = ApiResponse<ProfileResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_profile(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<UpdateProfileRequest>>,
) -> Result<Json<ApiResponse<ProfileResponse>>, ApiError> {
    trace!("Entering update_profile function for user_id: {}", user_id);

    let mut active: profile::ActiveModel = find_profile(&state.db, user_id).await?.into();
    if let Some(bio) = request.bio {
        debug!("Updating bio");
        active.bio = Set(Some(bio));
    }
    if let Some(avatar) = request.avatar {
        debug!("Updating avatar to '{}'", avatar);
        active.avatar = Set(Some(avatar));
    }

    let updated = active
        .update(&state.db)
        .await
        .map_err(|e| ErrorResponse::database("Updating profile", &e))?;

    info!("Profile of user {} updated successfully", user_id);
    Ok(Json(ApiResponse::new(
        ProfileResponse::from(updated),
        "Profile updated successfully",
    )))
}
