use atletica_core::ShopError;
use tracing::error;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";
const NUMERIC_OUT_OF_RANGE: &str = "22003";

/// Lost connection, exhausted pool and the like
pub(crate) fn is_connectivity(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
}

pub(crate) fn storage_error(err: sqlx::Error) -> ShopError {
    error!(error = %err, "Database operation failed");
    ShopError::StorageUnavailable(err.to_string())
}

/// Maps constraint violations to domain errors, everything else to `StorageUnavailable`.
pub(crate) fn constraint_error(err: sqlx::Error, entity: &'static str, key: &str) -> ShopError {
    if let Some(db) = err.as_database_error() {
        match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) => return ShopError::duplicate(entity, key),
            Some(FOREIGN_KEY_VIOLATION) => return ShopError::in_use(entity, key),
            Some(CHECK_VIOLATION) | Some(NUMERIC_OUT_OF_RANGE) => {
                return ShopError::invalid(db.message().to_string())
            }
            _ => {}
        }
    }
    storage_error(err)
}

/// Failures inside the checkout transaction
pub(crate) fn abort_error(err: sqlx::Error) -> ShopError {
    if is_connectivity(&err) {
        return storage_error(err);
    }
    error!(error = %err, "Sale transaction aborted");
    ShopError::TransactionAborted(err.to_string())
}

/// Name of the violated constraint, when the error carries one
pub(crate) fn violated_constraint(err: &sqlx::Error) -> Option<String> {
    err.as_database_error()
        .and_then(|db| db.constraint())
        .map(str::to_string)
}
