use crate::handlers::users::ensure_user_exists;
use crate::schemas::{ApiError, ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, Utc};
use model::entities::activity;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for appending to a user's activity log
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateActivityRequest {
    /// Free-form label, e.g. "login"
    #[validate(length(min = 1, max = 255))]
    pub activity_type: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActivityResponse {
    pub id: i32,
    pub user_id: i32,
    pub activity_type: String,
    pub timestamp: DateTime<Utc>,
}

impl From<activity::Model> for ActivityResponse {
    fn from(model: activity::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            activity_type: model.activity_type,
            timestamp: model.timestamp,
        }
    }
}

/// List the activity log of a user in the order it was written
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/activities",
    tag = "activities",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "Activities retrieved successfully", body = ApiResponse<Vec<ActivityResponse>>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_activities(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ActivityResponse>>>, ApiError> {
    trace!("Entering get_activities function for user_id: {}", user_id);
    ensure_user_exists(&state, user_id).await?;

    let activities = activity::Entity::find()
        .filter(activity::Column::UserId.eq(user_id))
        .order_by_asc(activity::Column::Id)
        .all(&state.db)
        .await
        .map_err(|e| ErrorResponse::database("Retrieving activities", &e))?;

    info!("Retrieved {} activities for user {}", activities.len(), user_id);
    let activities = activities.into_iter().map(ActivityResponse::from).collect();
    Ok(Json(ApiResponse::new(activities, "Activities retrieved successfully")))
}

/// Append an entry to a user's activity log
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/activities",
    tag = "activities",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = CreateActivityRequest,
    responses(
        (status = 201, description = "Activity recorded successfully", body = ApiResponse<ActivityResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_activity(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateActivityRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<ActivityResponse>>), ApiError> {
    trace!("Entering create_activity function for user_id: {}", user_id);
    ensure_user_exists(&state, user_id).await?;

    let created = activity::ActiveModel {
        user_id: Set(user_id),
        activity_type: Set(request.activity_type),
        timestamp: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| ErrorResponse::database("Recording activity", &e))?;

    info!(
        "Activity '{}' recorded for user {}",
        created.activity_type, user_id
    );
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            ActivityResponse::from(created),
            "Activity recorded successfully",
        )),
    ))
}
