use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use super::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// A user row that has not been inserted yet.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub owner_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewStore {
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub owner_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Rating {
    pub id: i64,
    pub user_id: i64,
    pub store_id: i64,
    pub rating: Stars,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A store together with its derived rating aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct StoreWithRating {
    #[serde(flatten)]
    pub store: Store,
    pub average_rating: f64,
    pub rating_count: i64,
}

/// A single rating as shown on a store page.
#[derive(Debug, Clone, Serialize)]
pub struct StoreRating {
    pub id: i64,
    pub rating: Stars,
    pub comment: Option<String>,
    pub user_name: String,
}

/// A rating on one of an owner's stores, with the rater's identity.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerRating {
    pub store_id: i64,
    pub store_name: String,
    pub rating_id: i64,
    pub rating: Stars,
    pub comment: Option<String>,
    pub rated_by: String,
    pub rated_by_email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OwnerSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlatformStats {
    pub total_users: i64,
    pub total_stores: i64,
    pub total_ratings: i64,
}

/// A star rating, always within `Stars::MIN..=Stars::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Stars(u8);

impl Stars {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Returns `None` when `value` is outside the accepted range.
    #[must_use]
    pub fn new(value: i64) -> Option<Stars> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Stars)
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl ToSql for Stars {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(i64::from(self.0)))
    }
}

impl FromSql for Stars {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_i64()?;
        Stars::new(raw).ok_or(FromSqlError::OutOfRange(raw))
    }
}

/// What an upsert should do with the comment of an existing rating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentUpdate {
    /// Leave the stored comment untouched.
    Keep,
    /// Overwrite the stored comment; `None` clears it.
    Replace(Option<String>),
}
