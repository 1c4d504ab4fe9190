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
use crate::server::auth::register_user;
use crate::server::dto::{CreateUserRequest, UpdateUserRequest};
use crate::server::response::{
    ApiError, ApiJson, ApiPath, CreatedResponse, MessageResponse, StoreResultExt, internal_error,
};
use crate::server::validation::{non_blank, parse_role, validate_address};

pub async fn create_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(name), Some(email), Some(password)) =
        (non_blank(req.name), non_blank(req.email), req.password)
    else {
        return Err(ApiError::bad_request("Missing fields"));
    };
    if password.is_blank() {
        return Err(ApiError::bad_request("Missing fields"));
    }
    let role = parse_role(req.role.as_deref())?;

    let id = register_user(&state, name, email, non_blank(req.address), password, role).await?;

    tracing::info!(admin_id = admin.id, user_id = id, %role, "Admin created user");

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse::new("User added", id)),
    ))
}

pub async fn update_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let role = parse_role(req.role.as_deref())?;
    let address = non_blank(req.address);
    validate_address(address.as_deref())?;

    match state.store.update_user(id, address.as_deref(), role) {
        Ok(()) => {}
        Err(Error::NotFound) => return Err(ApiError::not_found("User not found")),
        Err(e) => return Err(internal_error("Error updating user", &e)),
    }

    tracing::info!(admin_id = admin.id, user_id = id, %role, "Admin updated user");

    Ok(Json(MessageResponse::new("User updated")))
}

pub async fn delete_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state
        .store
        .delete_user(id)
        .api_err("Error deleting user")?;

    if !deleted {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!(admin_id = admin.id, user_id = id, "Admin deleted user");

    Ok(Json(MessageResponse::new("User deleted")))
}

pub async fn list_owners(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let owners = state.store.list_owners().api_err("Error fetching owners")?;

    Ok::<_, ApiError>(Json(owners))
}
