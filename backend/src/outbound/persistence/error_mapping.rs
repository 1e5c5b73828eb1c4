//! Shared classification of pool and Diesel failures.
//!
//! Repositories turn a [`DieselFailure`] into their own port error; the
//! classification and its debug logging live here once.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Coarse category of a failed Diesel call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// The connection dropped; the caller may retry later.
    Connection,
    /// A unique index rejected the write.
    UniqueViolation,
    /// Any other query failure.
    Query(&'static str),
}

/// Message carried by a pool failure.
pub(crate) fn pool_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Classify `error`, logging the driver detail at debug level.
pub(crate) fn classify_diesel_error(error: &DieselError) -> DieselFailure {
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => DieselFailure::Query("record not found"),
        DieselError::QueryBuilderError(_) => DieselFailure::Query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DieselFailure::Connection
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            DieselFailure::UniqueViolation
        }
        DieselError::DeserializationError(_) => DieselFailure::Query("row decoding failed"),
        _ => DieselFailure::Query("database error"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct Info(&'static str);

    impl diesel::result::DatabaseErrorInformation for Info {
        fn message(&self) -> &str {
            self.0
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            None
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database_error(kind: DatabaseErrorKind) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(Info("boom")))
    }

    #[rstest]
    #[case(database_error(DatabaseErrorKind::ClosedConnection), DieselFailure::Connection)]
    #[case(
        database_error(DatabaseErrorKind::UniqueViolation),
        DieselFailure::UniqueViolation
    )]
    #[case(
        database_error(DatabaseErrorKind::ForeignKeyViolation),
        DieselFailure::Query("database error")
    )]
    #[case(DieselError::NotFound, DieselFailure::Query("record not found"))]
    fn classifies_driver_errors(#[case] error: DieselError, #[case] expected: DieselFailure) {
        assert_eq!(classify_diesel_error(&error), expected);
    }

    #[test]
    fn pool_errors_keep_their_message() {
        assert_eq!(pool_message(PoolError::checkout("timed out")), "timed out");
    }
}
