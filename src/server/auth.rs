use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};

use crate::auth::RawPassword;
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::{LoginRequest, LoginResponse, SignupRequest, UserSummary};
use crate::server::response::{ApiError, ApiJson, CreatedResponse, StoreResultExt, internal_error};
use crate::server::validation::{non_blank, validate_address, validate_email, validate_name};
use crate::types::{NewUser, Role};

pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

pub async fn signup(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(name), Some(email), Some(password)) =
        (non_blank(req.name), non_blank(req.email), req.password)
    else {
        return Err(ApiError::bad_request("Missing fields"));
    };
    if password.is_blank() {
        return Err(ApiError::bad_request("Missing fields"));
    }

    let id = register_user(&state, name, email, non_blank(req.address), password, Role::User)
        .await?;

    tracing::info!(user_id = id, "User signed up");

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse::new("User created", id)),
    ))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(email), Some(password)) = (non_blank(req.email), req.password) else {
        return Err(ApiError::bad_request("Missing fields"));
    };

    let user = state
        .store
        .get_user_by_email(&email)
        .api_err("Error logging in")?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;

    if !verify_password(&state, password, user.password_hash.clone()).await? {
        return Err(ApiError::unauthorized("Wrong password"));
    }

    let token = state
        .tokens
        .issue(user.id, user.role)
        .map_err(|e| internal_error("Error logging in", &e))?;

    Ok(Json(LoginResponse {
        token,
        user: UserSummary {
            id: user.id,
            name: user.name,
            role: user.role,
        },
    }))
}

/// Validates, hashes and inserts a new account. Shared by signup and the
/// admin user endpoint.
pub(crate) async fn register_user(
    state: &Arc<AppState>,
    name: String,
    email: String,
    address: Option<String>,
    password: RawPassword,
    role: Role,
) -> Result<i64, ApiError> {
    validate_name(&name)?;
    validate_email(&email)?;
    validate_address(address.as_deref())?;

    let password_hash = hash_password(state, password).await?;

    let user = NewUser {
        name,
        email,
        address,
        password_hash,
        role,
    };

    match state.store.create_user(&user) {
        Ok(id) => Ok(id),
        Err(Error::AlreadyExists) => Err(ApiError::conflict("Email already registered")),
        Err(e) => Err(internal_error("Error creating user", &e)),
    }
}

async fn hash_password(state: &Arc<AppState>, password: RawPassword) -> Result<String, ApiError> {
    let passwords = state.passwords.clone();
    tokio::task::spawn_blocking(move || passwords.hash(&password))
        .await
        .map_err(|e| {
            tracing::error!("Password hashing task failed: {e}");
            ApiError::internal("Error creating user")
        })?
        .map_err(|e| internal_error("Error creating user", &e))
}

async fn verify_password(
    state: &Arc<AppState>,
    password: RawPassword,
    hash: String,
) -> Result<bool, ApiError> {
    let passwords = state.passwords.clone();
    tokio::task::spawn_blocking(move || passwords.verify(&password, &hash))
        .await
        .map_err(|e| {
            tracing::error!("Password verification task failed: {e}");
            ApiError::internal("Error logging in")
        })?
        .map_err(|e| internal_error("Error logging in", &e))
}
