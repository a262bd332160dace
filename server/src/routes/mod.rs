pub mod games;
pub mod health;
pub mod reviews;

use types::{is_valid_id, string_to_id, Identifier};

use crate::error::{ServerError, ServerResult};

pub use health::health_check;

/// Identifiers from the path are checked before they reach a controller.
pub(crate) fn parse_id(raw: &str) -> ServerResult<Identifier> {
    if !is_valid_id(raw) {
        return Err(ServerError::InvalidId(raw.to_string()));
    }
    Ok(string_to_id(raw)?)
}

/// Bodies for PATCH must carry the id of the document they replace.
pub(crate) fn require_id(id: Identifier) -> ServerResult<Identifier> {
    if id.is_nil() {
        return Err(ServerError::InvalidId(id.to_string()));
    }
    Ok(id)
}
