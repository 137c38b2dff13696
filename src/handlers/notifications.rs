use crate::handlers::users::ensure_user_exists;
use crate::schemas::{ApiError, ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, Utc};
use model::entities::notification;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Request body for sending a notification to a user
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateNotificationRequest {
    #[validate(length(min = 1, max = 1000))]
    pub message_body: String,
}

/// Query parameters for listing notifications
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NotificationQuery {
    /// Only return notifications that have not been read
    pub unread: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NotificationResponse {
    pub id: i32,
    pub user_id: i32,
    pub message_body: String,
    pub is_read: bool,
    pub timestamp: DateTime<Utc>,
}

impl From<notification::Model> for NotificationResponse {
    fn from(model: notification::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            message_body: model.message_body,
            is_read: model.is_read,
            timestamp: model.timestamp,
        }
    }
}

/// List the notifications of a user, newest first
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/notifications",
    tag = "notifications",
    params(
        ("user_id" = i32, Path, description = "User ID"),
        NotificationQuery,
    ),
    responses(
        (status = 200, description = "Notifications retrieved successfully", body = ApiResponse<Vec<NotificationResponse>>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_notifications(
    Path(user_id): Path<i32>,
    Query(query): Query<NotificationQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<NotificationResponse>>>, ApiError> {
    trace!("Entering get_notifications function for user_id: {}", user_id);
    ensure_user_exists(&state, user_id).await?;

    let mut select = notification::Entity::find().filter(notification::Column::UserId.eq(user_id));
    if query.unread.unwrap_or(false) {
        debug!("Filtering to unread notifications");
        select = select.filter(notification::Column::IsRead.eq(false));
    }

    let notifications = select
        .order_by_desc(notification::Column::Timestamp)
        .order_by_desc(notification::Column::Id)
        .all(&state.db)
        .await
        .map_err(|e| ErrorResponse::database("Retrieving notifications", &e))?;

    info!("Retrieved {} notifications for user {}", notifications.len(), user_id);
    let notifications = notifications
        .into_iter()
        .map(NotificationResponse::from)
        .collect();
    Ok(Json(ApiResponse::new(
        notifications,
        "Notifications retrieved successfully",
    )))
}

/// Send a notification to a user
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/notifications",
    tag = "notifications",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = CreateNotificationRequest,
    responses(
        (status = 201, description = "Notification created successfully", body = ApiResponse<NotificationResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_notification(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateNotificationRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<NotificationResponse>>), ApiError> {
    trace!("Entering create_notification function for user_id: {}", user_id);
    ensure_user_exists(&state, user_id).await?;

    let created = notification::ActiveModel {
        user_id: Set(user_id),
        message_body: Set(request.message_body),
        is_read: Set(false),
        timestamp: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| ErrorResponse::database("Creating notification", &e))?;

    info!("Notification {} created for user {}", created.id, user_id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            NotificationResponse::from(created),
            "Notification created successfully",
        )),
    ))
}

/// Mark a notification as read
#[utoipa::path(
    put,
    path = "/api/v1/notifications/{notification_id}/read",
    tag = "notifications",
    params(
        ("notification_id" = i32, Path, description = "Notification ID"),
    ),
    responses(
        (status = 200, description = "Notification marked as read", body = ApiResponse<NotificationResponse>),
        (status = 404, description = "Notification not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn mark_notification_read(
    Path(notification_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<NotificationResponse>>, ApiError> {
    trace!("Entering mark_notification_read function for notification_id: {}", notification_id);

    let existing = match notification::Entity::find_by_id(notification_id)
        .one(&state.db)
        .await
    {
        Ok(Some(found)) => found,
        Ok(None) => {
            warn!("Notification with ID {} not found", notification_id);
            return Err(ErrorResponse::not_found("Notification", notification_id));
        }
        Err(e) => return Err(ErrorResponse::database("Retrieving notification", &e)),
    };

    if existing.is_read {
        debug!("Notification {} already read", notification_id);
        return Ok(Json(ApiResponse::new(
            NotificationResponse::from(existing),
            "Notification marked as read",
        )));
    }

    let mut active: notification::ActiveModel = existing.into();
    active.is_read = Set(true);
    let updated = active
        .update(&state.db)
        .await
        .map_err(|e| ErrorResponse::database("Updating notification", &e))?;

    info!("Notification {} marked as read", notification_id);
    Ok(Json(ApiResponse::new(
        NotificationResponse::from(updated),
        "Notification marked as read",
    )))
}

/// Delete a notification
#[utoipa::path(
    delete,
    path = "/api/v1/notifications/{notification_id}",
    tag = "notifications",
    params(
        ("notification_id" = i32, Path, description = "Notification ID"),
    ),
    responses(
        (status = 200, description = "Notification deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Notification not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_notification(
    Path(notification_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    trace!("Entering delete_notification function for notification_id: {}", notification_id);

    let result = notification::Entity::delete_by_id(notification_id)
        .exec(&state.db)
        .await
        .map_err(|e| ErrorResponse::database("Deleting notification", &e))?;

    if result.rows_affected == 0 {
        warn!("Notification with ID {} not found for deletion", notification_id);
        return Err(ErrorResponse::not_found("Notification", notification_id));
    }

    info!("Notification {} deleted successfully", notification_id);
    Ok(Json(ApiResponse::new(
        format!("Notification {} deleted", notification_id),
        "Notification deleted successfully",
    )))
}
