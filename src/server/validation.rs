use serde_json::Value;

use crate::server::response::ApiError;
use crate::types::{Role, Stars};

const MAX_NAME_LEN: usize = 100;
const MAX_EMAIL_LEN: usize = 254;
const MAX_ADDRESS_LEN: usize = 400;
const MAX_COMMENT_LEN: usize = 1000;

/// Returns the trimmed value, or None when it is absent or blank.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ApiError::bad_request(format!(
            "Name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ApiError> {
    let valid = email.len() <= MAX_EMAIL_LEN
        && !email.contains(char::is_whitespace)
        && email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());

    if valid {
        Ok(())
    } else {
        Err(ApiError::bad_request("Invalid email"))
    }
}

pub fn validate_address(address: Option<&str>) -> Result<(), ApiError> {
    match address {
        Some(a) if a.chars().count() > MAX_ADDRESS_LEN => Err(ApiError::bad_request(format!(
            "Address cannot exceed {MAX_ADDRESS_LEN} characters"
        ))),
        _ => Ok(()),
    }
}

pub fn validate_comment(comment: Option<&str>) -> Result<(), ApiError> {
    match comment {
        Some(c) if c.chars().count() > MAX_COMMENT_LEN => Err(ApiError::bad_request(format!(
            "Comment cannot exceed {MAX_COMMENT_LEN} characters"
        ))),
        _ => Ok(()),
    }
}

pub fn parse_role(role: Option<&str>) -> Result<Role, ApiError> {
    let role = role.ok_or_else(|| ApiError::bad_request("Missing fields"))?;
    Role::parse(role.trim()).ok_or_else(|| ApiError::bad_request("Invalid role"))
}

/// Accepts an integer, or a string holding one, within 1..=5.
pub fn parse_stars(rating: Option<&Value>) -> Result<Stars, ApiError> {
    let raw = match rating {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    raw.and_then(Stars::new)
        .ok_or_else(|| ApiError::bad_request("Invalid rating"))
}
