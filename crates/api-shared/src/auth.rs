//! Authorization header parsing.
//!
//! Tokens are issued elsewhere; this only extracts the opaque credential from a header value of
//! the form `Token <credential>` or `Bearer <credential>`.

/// Reasons a request carries no usable credential.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authentication credentials were not provided.")]
    MissingCredentials,
    #[error("Invalid token header.")]
    MalformedHeader,
    #[error("Invalid token.")]
    InvalidToken,
}

/// Extracts the token from an `Authorization` header value.
///
/// The scheme is matched case-insensitively; surrounding whitespace is ignored.
///
/// # Errors
///
/// - `MissingCredentials` if the header is absent or blank
/// - `MalformedHeader` if the scheme is unknown or the credential is missing or contains spaces
pub fn token_from_header(header: Option<&str>) -> Result<&str, AuthError> {
    let value = header
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::MissingCredentials)?;

    let (scheme, credential) = value
        .split_once(char::is_whitespace)
        .ok_or(AuthError::MalformedHeader)?;

    if !scheme.eq_ignore_ascii_case("token") && !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedHeader);
    }

    let credential = credential.trim();
    if credential.is_empty() || credential.contains(char::is_whitespace) {
        return Err(AuthError::MalformedHeader);
    }

    Ok(credential)
}
