use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Query execution error: {0}")]
    Query(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid database or collection name: {0:?}")]
    InvalidName(String),

    #[error("Connection pool is closed")]
    PoolClosed,
}

/// Names end up as quoted SQL identifiers and as file names in the data
/// directory, so only `[A-Za-z_][A-Za-z0-9_]*` is accepted.
pub(crate) fn validate_name(name: &str) -> Result<(), DatabaseError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(DatabaseError::InvalidName(name.to_string()))
    }
}
