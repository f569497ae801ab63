use crate::database::DatabaseError;
use sqlx::Error as SqlxError;
use thiserror::Error;

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Pool creation and migration errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Non-retryable SQL errors
    #[error("SQL error: {0}")]
    Sqlx(SqlxError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed caller input (dates, times, batch sizes)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing, deleted, or outside the caller's scope
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Visible to the caller but not actionable by them
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The entity's lifecycle state rejects the transition
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The caller already holds an equivalent active record
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Lock timeout, deadlock, serialization failure or lost connection
    #[error("Temporarily unavailable, try again: {0}")]
    Transient(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Check if error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    /// Whether the whole operation may be attempted again.
    ///
    /// Create operations are not idempotent: a commit can succeed even though
    /// the caller saw a transient failure, so callers re-check state first.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::Transient(_) | AppError::Database(DatabaseError::ConnectionTimeout)
        )
    }

    /// Get HTTP status code for the error
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::NotFound(_) => 404,
            AppError::Forbidden(_) => 403,
            AppError::Validation(_) => 400,
            AppError::InvalidState(_) | AppError::Conflict(_) => 409,
            AppError::Transient(_) => 503,
            AppError::Database(DatabaseError::ConnectionTimeout) => 503,
            AppError::Config(_) | AppError::Database(_) | AppError::Sqlx(_) => 500,
        }
    }
}

impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        if is_transient(&err) {
            AppError::Transient(err.to_string())
        } else {
            AppError::Sqlx(err)
        }
    }
}

/// Repository-specific error types
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database query error
    #[error("Query error: {0}")]
    Query(SqlxError),

    /// Lock, deadlock or connectivity failure
    #[error("Transient database error: {0}")]
    Transient(SqlxError),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Caller is not the party entitled to act on the record
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Lifecycle state rejects the requested change
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Duplicate record
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// Constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => AppError::NotFound(msg),
            RepositoryError::Forbidden(msg) => AppError::Forbidden(msg),
            RepositoryError::InvalidState(msg) => AppError::InvalidState(msg),
            RepositoryError::Duplicate(msg) => AppError::Conflict(msg),
            RepositoryError::ConstraintViolation(msg) => AppError::Validation(msg),
            RepositoryError::InvalidInput(msg) => AppError::Validation(msg),
            RepositoryError::Transient(e) => AppError::Transient(e.to_string()),
            RepositoryError::Query(e) => AppError::Sqlx(e),
        }
    }
}

impl From<SqlxError> for RepositoryError {
    fn from(err: SqlxError) -> Self {
        if is_transient(&err) {
            return RepositoryError::Transient(err);
        }

        match &err {
            SqlxError::RowNotFound => RepositoryError::NotFound("Record not found".to_string()),
            SqlxError::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                match code.as_deref() {
                    // Unique violation
                    Some("23505") => RepositoryError::Duplicate(db_err.message().to_string()),
                    // Foreign key / check violation
                    Some("23503") | Some("23514") => {
                        RepositoryError::ConstraintViolation(db_err.message().to_string())
                    }
                    _ => RepositoryError::Query(err),
                }
            }
            _ => RepositoryError::Query(err),
        }
    }
}

/// Rejections raised by the pure lifecycle transitions on the models
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("booking request is already {0}")]
    AlreadyResolved(&'static str),

    #[error("slot is already reserved")]
    SlotAlreadyReserved,

    #[error("slot has been retracted")]
    SlotRetracted,

    #[error("cannot retract a reserved slot")]
    RetractReserved,

    #[error("payment is already settled")]
    AlreadyPaid,

    #[error("{0}")]
    NotParty(&'static str),
}

impl From<DomainError> for RepositoryError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotParty(_) => RepositoryError::Forbidden(err.to_string()),
            other => RepositoryError::InvalidState(other.to_string()),
        }
    }
}

/// SQLSTATEs and driver failures after which retrying the whole operation is sound
pub fn is_transient(err: &SqlxError) -> bool {
    match err {
        SqlxError::PoolTimedOut | SqlxError::PoolClosed | SqlxError::Io(_) => true,
        SqlxError::Database(db_err) => match db_err.code() {
            Some(code) => {
                matches!(
                    code.as_ref(),
                    // serialization_failure, deadlock_detected
                    "40001" | "40P01"
                    // lock_not_available (lock_timeout), query_canceled (statement_timeout)
                    | "55P03" | "57014"
                    // admin/crash shutdown, cannot_connect_now
                    | "57P01" | "57P02" | "57P03"
                ) || code.starts_with("08")
            }
            None => false,
        },
        _ => false,
    }
}
