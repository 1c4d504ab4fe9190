/// Extracts the token from an `Authorization: Bearer <token>` header value.
/// Returns None when the header is absent, uses another scheme, or carries
/// an empty token.
pub fn extract_bearer_token(auth_header: Option<&str>) -> Option<&str> {
    let header = auth_header?;
    let (scheme, token) = header.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
