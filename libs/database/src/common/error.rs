use thiserror::Error;

/// Result type for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Errors shared by all database backends
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Health check failed: {0}")]
    HealthCheckFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}
