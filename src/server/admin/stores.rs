use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireAdmin;
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::StoreRequest;
use crate::server::response::{
    ApiError, ApiJson, ApiPath, CreatedResponse, MessageResponse, StoreOptionExt, StoreResultExt,
    internal_error,
};
use crate::server::validation::{non_blank, validate_address, validate_email, validate_name};
use crate::types::{NewStore, Role};

pub async fn list_stores(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let stores = state.store.list_stores().api_err("Error fetching stores")?;

    Ok::<_, ApiError>(Json(stores))
}

pub async fn get_store(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> impl IntoResponse {
    let store = state
        .store
        .get_store(id)
        .api_err("Error fetching store")?
        .or_not_found("Store not found")?;

    Ok::<_, ApiError>(Json(store))
}

pub async fn create_store(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<StoreRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let store = validate_store_request(&state, req)?;

    let id = state
        .store
        .create_store(&store)
        .map_err(|e| store_write_error("Error adding store", e))?;

    tracing::info!(admin_id = admin.id, store_id = id, "Admin created store");

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse::new("Store added", id)),
    ))
}

/// Full replace: fields left out of the body are cleared.
pub async fn update_store(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<StoreRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let store = validate_store_request(&state, req)?;

    match state.store.update_store(id, &store) {
        Ok(()) => {}
        Err(Error::NotFound) => return Err(ApiError::not_found("Store not found")),
        Err(e) => return Err(store_write_error("Error updating store", e)),
    }

    tracing::info!(admin_id = admin.id, store_id = id, owner_id = ?store.owner_id, "Admin updated store");

    Ok(Json(MessageResponse::new("Store updated")))
}

pub async fn delete_store(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state
        .store
        .delete_store(id)
        .api_err("Error deleting store")?;

    if !deleted {
        return Err(ApiError::not_found("Store not found"));
    }

    tracing::info!(admin_id = admin.id, store_id = id, "Admin deleted store");

    Ok(Json(MessageResponse::new("Store deleted")))
}

fn validate_store_request(state: &AppState, req: StoreRequest) -> Result<NewStore, ApiError> {
    let (Some(name), Some(email)) = (non_blank(req.name), non_blank(req.email)) else {
        return Err(ApiError::bad_request("Missing fields"));
    };
    let address = non_blank(req.address);

    validate_name(&name)?;
    validate_email(&email)?;
    validate_address(address.as_deref())?;

    if let Some(owner_id) = req.owner_id {
        check_owner(state, owner_id)?;
    }

    Ok(NewStore {
        name,
        email,
        address,
        owner_id: req.owner_id,
    })
}

/// A store may only be assigned to an existing account with the owner role.
fn check_owner(state: &AppState, owner_id: i64) -> Result<(), ApiError> {
    let user = state
        .store
        .get_user(owner_id)
        .api_err("Error checking owner")?
        .ok_or_else(|| ApiError::bad_request("Owner not found"))?;

    if user.role != Role::Owner {
        return Err(ApiError::bad_request("Assigned user is not an owner"));
    }
    Ok(())
}

fn store_write_error(message: &'static str, err: Error) -> ApiError {
    match err {
        // The owner was deleted between the check and the write.
        Error::InvalidReference => ApiError::bad_request("Owner not found"),
        e => internal_error(message, &e),
    }
}
