use crate::handlers::users::ensure_user_exists;
use crate::schemas::{ApiError, ApiResponse, AppState, ErrorResponse};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use model::entities::address;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Request body for adding an address to a user
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateAddressRequest {
    #[validate(length(min = 1, max = 100))]
    pub street_address: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(min = 1, max = 100))]
    pub state: String,
    #[validate(range(min = 0))]
    pub postal_code: i32,
    #[validate(length(min = 1, max = 100))]
    pub country: String,
}

/// Request body for updating an address. Omitted fields stay unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateAddressRequest {
    #[validate(length(min = 1, max = 100))]
    pub street_address: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub state: Option<String>,
    #[validate(range(min = 0))]
    pub postal_code: Option<i32>,
    #[validate(length(min = 1, max = 100))]
    pub country: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddressResponse {
    pub id: i32,
    pub user_id: i32,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: i32,
    pub country: String,
}

impl From<address::Model> for AddressResponse {
    fn from(model: address::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            street_address: model.street_address,
            city: model.city,
            state: model.state,
            postal_code: model.postal_code,
            country: model.country,
        }
    }
}

/// List the addresses of a user
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/addresses",
    tag = "addresses",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "Addresses retrieved successfully", body = ApiResponse<Vec<AddressResponse>>),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_addresses(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<AddressResponse>>>, ApiError> {
    trace!("Entering get_addresses function for user_id: {}", user_id);
    ensure_user_exists(&state, user_id).await?;

    let addresses = address::Entity::find()
        .filter(address::Column::UserId.eq(user_id))
        .order_by_asc(address::Column::Id)
        .all(&state.db)
        .await
        .map_err(|e| ErrorResponse::database("Retrieving addresses", &e))?;

    info!("Retrieved {} addresses for user {}", addresses.len(), user_id);
    let addresses = addresses.into_iter().map(AddressResponse::from).collect();
    Ok(Json(ApiResponse::new(addresses, "Addresses retrieved successfully")))
}

/// Add an address to a user
#[utoipa::path(
    post,
    path = "/api/v1/users/{user_id}/addresses",
    tag = "addresses",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    request_body = CreateAddressRequest,
    responses(
        (status = 201, description = "Address created successfully", body = ApiResponse<AddressResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn create_address(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<CreateAddressRequest>>,
) -> Result<(StatusCode, Json<ApiResponse<AddressResponse>>), ApiError> {
    trace!("Entering create_address function for user_id: {}", user_id);
    ensure_user_exists(&state, user_id).await?;

    let new_address = address::ActiveModel {
        user_id: Set(user_id),
        street_address: Set(request.street_address),
        city: Set(request.city),
        state: Set(request.state),
        postal_code: Set(request.postal_code),
        country: Set(request.country),
        ..Default::default()
    };

    let created = new_address
        .insert(&state.db)
        .await
        .map_err(|e| ErrorResponse::database("Creating address", &e))?;

    info!("Address {} created for user {}", created.id, user_id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            AddressResponse::from(created),
            "Address created successfully",
        )),
    ))
}

/// Update an address
#[utoipa::path(
    put,
    path = "/api/v1/addresses/{address_id}",
    tag = "addresses",
    params(
        ("address_id" = i32, Path, description = "Address ID"),
    ),
    request_body = UpdateAddressRequest,
    responses(
        (status = 200, description = "Address updated successfully", body = ApiResponse<AddressResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Address not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn update_address(
    Path(address_id): Path<i32>,
    State(state): State<AppState>,
    Valid(Json(request)): Valid<Json<UpdateAddressRequest>>,
) -> Result<Json<ApiResponse<AddressResponse>>, ApiError> {
    trace!("Entering update_address function for address_id: {}", address_id);

    let existing = match address::Entity::find_by_id(address_id).one(&state.db).await {
        Ok(Some(found)) => found,
        Ok(None) => {
            warn!("Address with ID {} not found", address_id);
            return Err(ErrorResponse::not_found("Address", address_id));
        }
        Err(e) => return Err(ErrorResponse::database("Retrieving address", &e)),
    };

    let mut active: address::ActiveModel = existing.clone().into();
    if let Some(street_address) = request.street_address {
        active.street_address = Set(street_address);
    }
    if let Some(city) = request.city {
        active.city = Set(city);
    }
    if let Some(state_name) = request.state {
        active.state = Set(state_name);
    }
    if let Some(postal_code) = request.postal_code {
        active.postal_code = Set(postal_code);
    }
    if let Some(country) = request.country {
        active.country = Set(country);
    }

    if !active.is_changed() {
        debug!("No changes for address {}", address_id);
        return Ok(Json(ApiResponse::new(
            AddressResponse::from(existing),
            "Address updated successfully",
        )));
    }

    let updated = active
        .update(&state.db)
        .await
        .map_err(|e| ErrorResponse::database("Updating address", &e))?;

    info!("Address {} updated successfully", address_id);
    Ok(Json(ApiResponse::new(
        AddressResponse::from(updated),
        "Address updated successfully",
    )))
}

/// Delete an address
#[utoipa::path(
    delete,
    path = "/api/v1/addresses/{address_id}",
    tag = "addresses",
    params(
        ("address_id" = i32, Path, description = "Address ID"),
    ),
    responses(
        (status = 200, description = "Address deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Address not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn delete_address(
    Path(address_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    trace!("Entering delete_address function for address_id: {}", address_id);

    let result = address::Entity::delete_by_id(address_id)
        .exec(&state.db)
        .await
        .map_err(|e| ErrorResponse::database("Deleting address", &e))?;

    if result.rows_affected == 0 {
        warn!("Address with ID {} not found for deletion", address_id);
        return Err(ErrorResponse::not_found("Address", address_id));
    }

    info!("Address {} deleted successfully", address_id);
    Ok(Json(ApiResponse::new(
        format!("Address {} deleted", address_id),
        "Address deleted successfully",
    )))
}
