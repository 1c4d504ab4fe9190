use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::RawPassword;
use crate::types::{Role, StoreRating, StoreWithRating};

// Request fields are optional at the serde level so a missing field yields
// the API's own 400 message instead of a deserializer error.

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub password: Option<RawPassword>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<RawPassword>,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummary,
}

/// Body of the legacy rating endpoint, which never touches the comment
#[derive(Debug, Deserialize)]
pub struct LegacyRatingRequest {
    #[serde(default)]
    pub rating: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    #[serde(default)]
    pub rating: Option<Value>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StoreDetailResponse {
    #[serde(flatten)]
    pub store: StoreWithRating,
    pub ratings: Vec<StoreRating>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub password: Option<RawPassword>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Create and full-replace body for stores
#[derive(Debug, Deserialize)]
pub struct StoreRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub owner_id: Option<i64>,
}
