//! Database error to HTTP error conversion.

use converse_postgres::PgError;
use converse_postgres::types::{ConstraintCategory, ConstraintViolation, DialogConstraints};

use super::{Error, ErrorKind};

const TRACING_TARGET: &str = "converse_server::handler::pg_error";

impl From<ConstraintViolation> for Error<'static> {
    fn from(constraint: ConstraintViolation) -> Self {
        let resource = constraint.table_name();
        let error = match constraint {
            ConstraintViolation::Dialog(DialogConstraints::TenantNameUnique) => {
                ErrorKind::Conflict.with_message("Duplicated chat name in creating chat.")
            }
            ref other => match other.constraint_category() {
                ConstraintCategory::Uniqueness => ErrorKind::Conflict.into_error(),
                ConstraintCategory::Validation | ConstraintCategory::BusinessLogic => {
                    ErrorKind::BadRequest.into_error()
                }
                ConstraintCategory::Chronological => ErrorKind::InternalServerError.into_error(),
            }
            .with_context(other.to_string()),
        };

        error.with_resource(resource)
    }
}

impl From<PgError> for Error<'static> {
    fn from(error: PgError) -> Self {
        if let Some(constraint) = error.constraint_violation() {
            tracing::error!(
                target: TRACING_TARGET,
                constraint = %constraint,
                error = %error,
                "query error (constraint violation)"
            );
            return constraint.into();
        }

        match error {
            PgError::Config(ref config_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %config_error,
                    "database configuration error"
                );
            }
            PgError::Timeout(ref timeout) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    timeout = ?timeout,
                    "database timeout"
                );
            }
            PgError::Connection(ref connection_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %connection_error,
                    "database connection error"
                );
            }
            PgError::Migration(ref migration_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %migration_error,
                    "database migration error"
                );
            }
            PgError::Query(ref query_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %query_error,
                    "query error"
                );
            }
            PgError::Unexpected(ref unexpected_error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %unexpected_error,
                    "unexpected database error"
                );
            }
        }

        ErrorKind::InternalServerError.with_context(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_dialog_name_is_a_conflict() {
        let error: Error =
            ConstraintViolation::Dialog(DialogConstraints::TenantNameUnique).into();
        assert_eq!(error.kind(), ErrorKind::Conflict);
        assert_eq!(
            error.response().message,
            "Duplicated chat name in creating chat."
        );
        assert_eq!(error.resource(), Some("dialogs"));
    }

    #[test]
    fn validation_constraints_are_bad_requests() {
        let error: Error = ConstraintViolation::Dialog(DialogConstraints::TopNMin).into();
        assert_eq!(error.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn plain_query_errors_are_internal() {
        let error: Error = PgError::Query(converse_postgres::error::DieselError::NotFound).into();
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(error.kind().code(), 500);
    }
}
