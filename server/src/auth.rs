use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

use crate::error::ServerError;

/// Mutating endpoints need `Authorization: Bearer <token>`. Without a
/// configured token every such request is refused.
pub fn authorize(expected: Option<&str>, headers: &HeaderMap) -> Result<(), ServerError> {
    let Some(expected) = expected else {
        return Err(ServerError::Unauthorized);
    };

    let provided = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match provided {
        Some(token) if token == expected => Ok(()),
        _ => Err(ServerError::Unauthorized),
    }
}
