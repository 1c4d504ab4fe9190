use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::error::{Error, Result as StoreResult};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Confirmation body for writes that return nothing else
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body for 201 responses
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub message: String,
    pub id: i64,
}

impl CreatedResponse {
    #[must_use]
    pub fn new(message: impl Into<String>, id: i64) -> Self {
        Self {
            message: message.into(),
            id,
        }
    }
}

/// Offset-paginated list with the total so clients can compute page counts
#[derive(Debug, Serialize)]
pub struct PageResponse<T: Serialize> {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub data: Vec<T>,
}

/// Sanitized page/limit pair. Anything that is not a positive integer falls
/// back to the default instead of failing the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    #[must_use]
    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = parse_positive(page).unwrap_or(DEFAULT_PAGE);
        let limit = parse_positive(limit)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);
        Self { page, limit }
    }

    /// Reads `page` and `limit` from raw query pairs. The first occurrence of
    /// a key wins and unknown keys are ignored.
    #[must_use]
    pub fn from_query(pairs: &[(String, String)]) -> Self {
        let first = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        Self::from_params(first("page"), first("limit"))
    }

    #[must_use]
    pub fn offset(self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    #[must_use]
    pub fn wrap<T: Serialize>(self, total: i64, data: Vec<T>) -> PageResponse<T> {
        PageResponse {
            total,
            page: self.page,
            limit: self.limit,
            data,
        }
    }
}

fn parse_positive(raw: Option<&str>) -> Option<i64> {
    raw?.trim().parse::<i64>().ok().filter(|v| *v > 0)
}

/// API error that converts to a `{"message": ...}` response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "message": self.message });
        (self.status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        Self::bad_request("Invalid id")
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

/// `Json` whose rejections use the API error shape
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `Path` whose rejections use the API error shape
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// `Query` whose rejections use the API error shape
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Extension trait for converting store results to API errors with a custom message.
pub trait StoreResultExt<T> {
    fn api_err(self, message: &'static str) -> Result<T, ApiError>;
}

impl<T> StoreResultExt<T> for StoreResult<T> {
    fn api_err(self, message: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| internal_error(message, &e))
    }
}

/// Extension for Option types from store operations.
pub trait StoreOptionExt<T> {
    fn or_not_found(self, message: &'static str) -> Result<T, ApiError>;
}

impl<T> StoreOptionExt<T> for Option<T> {
    fn or_not_found(self, message: &'static str) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::not_found(message))
    }
}

/// Logs the underlying failure and hides it behind a generic 500.
pub fn internal_error(message: &'static str, err: &Error) -> ApiError {
    tracing::error!("{message}: {err}");
    ApiError::internal(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        assert_eq!(
            Pagination::from_params(None, None),
            Pagination { page: 1, limit: 10 }
        );
    }

    #[test]
    fn test_pagination_invalid_values_fall_back() {
        let cases = [
            (Some("0"), Some("-3")),
            (Some("abc"), Some("")),
            (Some("1.5"), Some("ten")),
        ];
        for (page, limit) in cases {
            assert_eq!(
                Pagination::from_params(page, limit),
                Pagination { page: 1, limit: 10 }
            );
        }
    }

    #[test]
    fn test_pagination_from_query_uses_first_occurrence() {
        let pairs = vec![
            ("page".to_string(), "2".to_string()),
            ("sort".to_string(), "name".to_string()),
            ("page".to_string(), "7".to_string()),
            ("limit".to_string(), "oops".to_string()),
        ];
        assert_eq!(
            Pagination::from_query(&pairs),
            Pagination { page: 2, limit: 10 }
        );
        assert_eq!(
            Pagination::from_query(&[]),
            Pagination { page: 1, limit: 10 }
        );
    }

    #[test]
    fn test_pagination_offset_and_cap() {
        let pagination = Pagination::from_params(Some("3"), Some("5"));
        assert_eq!(pagination.offset(), 10);

        let capped = Pagination::from_params(Some("1"), Some("5000"));
        assert_eq!(capped.limit, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let pagination = Pagination::from_params(Some(&i64::MAX.to_string()), Some("100"));
        assert_eq!(pagination.offset(), i64::MAX);
    }

    #[test]
    fn test_api_error_status() {
        let response = ApiError::conflict("taken").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
