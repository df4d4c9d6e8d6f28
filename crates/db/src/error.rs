//! Translation of sqlx errors into domain errors.

use stockrecon_core::error::CoreError;

/// PostgreSQL SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Name of the unique constraint a database error violated, if any.
///
/// Only constraints following the `uq_` naming convention are reported;
/// anything else is treated as an unexpected failure.
pub fn unique_violation(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            db_err.constraint().filter(|c| c.starts_with("uq_"))
        }
        _ => None,
    }
}

/// Classify a sqlx error into a [`CoreError`].
///
/// - Unique constraint violations (`uq_*`) map to `Conflict`.
/// - `RowNotFound` and everything else map to `Internal`; the detail is
///   logged here and never reaches the caller.
pub fn into_core_error(err: sqlx::Error) -> CoreError {
    if let Some(constraint) = unique_violation(&err) {
        return CoreError::Conflict(format!(
            "Duplicate value violates unique constraint: {constraint}"
        ));
    }
    tracing::error!(error = %err, "Database error");
    CoreError::Internal("Database error".to_string())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_non_database_errors_are_internal() {
        assert_matches!(
            into_core_error(sqlx::Error::RowNotFound),
            CoreError::Internal(_)
        );
        assert_matches!(into_core_error(sqlx::Error::PoolTimedOut), CoreError::Internal(_));
    }

    #[test]
    fn test_unique_violation_ignores_other_errors() {
        assert_eq!(unique_violation(&sqlx::Error::RowNotFound), None);
    }
}
