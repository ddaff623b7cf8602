//! Error types for database operations.

use std::borrow::Cow;

pub use deadpool::managed::TimeoutType;
pub use diesel::result::{ConnectionError as DieselConnectionError, Error as DieselError};
pub use diesel_async::pooled_connection::PoolError as DieselPoolError;
pub use diesel_async::pooled_connection::deadpool::PoolError as DeadpoolError;

use crate::types::ConstraintViolation;

/// Type-erased error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Provides contextual hints for error types to aid in debugging.
pub trait ErrorHint {
    /// Returns an additional hint for an error type.
    fn hint(&self) -> Cow<'static, str>;
}

impl ErrorHint for TimeoutType {
    fn hint(&self) -> Cow<'static, str> {
        match self {
            TimeoutType::Wait => Cow::Borrowed(
                "Connection pool is exhausted, consider increasing pool size or optimizing query performance",
            ),
            TimeoutType::Create => Cow::Borrowed(
                "Unable to establish new database connection, check connection string and database availability",
            ),
            TimeoutType::Recycle => Cow::Borrowed(
                "Failed to recycle database connection, connection may be in invalid state",
            ),
        }
    }
}

/// Error type for all PostgreSQL database operations.
#[derive(Debug, thiserror::Error)]
#[must_use = "database errors should be handled appropriately"]
pub enum PgError {
    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Waiting for, creating or recycling a pooled connection timed out.
    #[error("Database operation timed out")]
    Timeout(TimeoutType),

    /// Failed to establish or maintain a database connection.
    #[error("Database connection error: {0}")]
    Connection(#[from] DieselConnectionError),

    /// Applying schema migrations failed.
    #[error("Database migration error: {0}")]
    Migration(BoxError),

    /// Query execution failed, including constraint violations.
    #[error("Database query error: {0}")]
    Query(#[from] DieselError),

    #[error("Unexpected error: {0}")]
    Unexpected(Cow<'static, str>),
}

impl PgError {
    /// Extracts the constraint name from a constraint violation error.
    pub fn constraint(&self) -> Option<&str> {
        let PgError::Query(err) = self else {
            return None;
        };

        let DieselError::DatabaseError(_, err) = err else {
            return None;
        };

        err.constraint_name()
    }

    /// Returns a structured constraint violation if this error represents one.
    pub fn constraint_violation(&self) -> Option<ConstraintViolation> {
        self.constraint().and_then(ConstraintViolation::new)
    }

    /// Returns whether a retry of the same operation might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PgError::Timeout(_) | PgError::Connection(DieselConnectionError::BadConnection(_))
        )
    }
}

impl From<DeadpoolError> for PgError {
    fn from(value: DeadpoolError) -> Self {
        match value {
            DeadpoolError::Timeout(timeout) => Self::Timeout(timeout),
            DeadpoolError::Backend(DieselPoolError::QueryError(error)) => Self::Query(error),
            DeadpoolError::Backend(DieselPoolError::ConnectionError(error)) => {
                Self::Connection(error)
            }
            DeadpoolError::PostCreateHook(err) => {
                tracing::warn!("Unexpected post-create hook error: {}", err);
                Self::Unexpected(err.to_string().into())
            }
            DeadpoolError::NoRuntimeSpecified => {
                tracing::error!("No tokio runtime specified for connection pool");
                Self::Unexpected("No runtime specified".into())
            }
            DeadpoolError::Closed => Self::Connection(DieselConnectionError::InvalidConnectionUrl(
                "Connection pool is closed".into(),
            )),
        }
    }
}

/// Specialized [`Result`] type for database operations.
pub type PgResult<T, E = PgError> = Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_are_transient() {
        assert!(PgError::Timeout(TimeoutType::Wait).is_transient());
        assert!(!PgError::Config("missing url".into()).is_transient());
    }

    #[test]
    fn non_query_errors_have_no_constraint() {
        assert_eq!(PgError::Unexpected("boom".into()).constraint(), None);
        assert!(PgError::Query(DieselError::NotFound).constraint().is_none());
    }
}
