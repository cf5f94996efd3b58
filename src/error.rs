//! Error kinds surfaced by the stint engine and its storage collaborator

#[derive(Debug)]
pub enum StintError {
    /// Malformed caller input: clock values, cursors, page sizes, scope ids
    Validation(String),
    /// Raw rows that violate an invariant the engine will not guess around
    DataIntegrity(String),
    /// Failure reported by the SQLite store
    Database(rusqlite::Error),
    /// Response body could not be encoded
    Serialization(serde_json::Error),
}

pub type StintResult<T> = Result<T, StintError>;

impl StintError {
    pub fn validation(msg: impl Into<String>) -> Self {
        StintError::Validation(msg.into())
    }

    pub fn data_integrity(msg: impl Into<String>) -> Self {
        StintError::DataIntegrity(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, StintError::Validation(_))
    }

    pub fn is_data_integrity(&self) -> bool {
        matches!(self, StintError::DataIntegrity(_))
    }
}

impl From<rusqlite::Error> for StintError {
    fn from(err: rusqlite::Error) -> Self {
        StintError::Database(err)
    }
}

impl From<serde_json::Error> for StintError {
    fn from(err: serde_json::Error) -> Self {
        StintError::Serialization(err)
    }
}

impl std::fmt::Display for StintError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StintError::Validation(msg) => write!(f, "Validation error: {}", msg),
            StintError::DataIntegrity(msg) => write!(f, "Data integrity error: {}", msg),
            StintError::Database(e) => write!(f, "Database error: {}", e),
            StintError::Serialization(e) => write!(f, "Serialization error: {}", e),
        }
    }
}

impl std::error::Error for StintError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StintError::Database(e) => Some(e),
            StintError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        let err = StintError::validation("page_size must be numeric");
        assert_eq!(err.to_string(), "Validation error: page_size must be numeric");
        assert!(err.is_validation());

        let err = StintError::data_integrity("6 players share one lineup key");
        assert!(err.to_string().starts_with("Data integrity error"));
        assert!(err.is_data_integrity());
    }

    #[test]
    fn test_from_rusqlite() {
        let err: StintError = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(err, StintError::Database(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
