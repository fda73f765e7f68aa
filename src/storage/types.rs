use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Storage errors with user-friendly messages
#[derive(Debug, Error)]
pub enum StorageError {
    /// Another instance of the application has locked the database
    #[error("Another instance of reelswipe appears to be running. Please close it and try again.")]
    InstanceLocked,

    /// Migration failed
    #[error("Database migration failed: {0}")]
    Migration(String),

    /// Generic database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A value could not be encoded before writing
    #[error("Failed to encode value for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    /// Check if a sqlx error indicates database locking
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        let error_string = err.to_string().to_lowercase();

        // SQLITE_BUSY (5), SQLITE_LOCKED (6), SQLITE_CANTOPEN (14)
        if is_lock_message(&error_string) || error_string.contains("unable to open database file")
        {
            return StorageError::InstanceLocked;
        }

        StorageError::Database(err)
    }
}

pub(crate) fn is_lock_message(lowercase: &str) -> bool {
    lowercase.contains("database is locked")
        || lowercase.contains("database table is locked")
        || lowercase.contains("sqlite_busy")
        || lowercase.contains("sqlite_locked")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_messages_detected() {
        assert!(is_lock_message("error returned from database: database is locked"));
        assert!(is_lock_message("sqlite_busy"));
        assert!(!is_lock_message("no such table: kv_store"));
    }

    #[test]
    fn test_pool_timeout_is_generic() {
        let err = StorageError::from_sqlx(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StorageError::Database(_)));
    }
}
