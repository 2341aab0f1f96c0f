//! Uniform failure logging for DAO operations.

use std::future::Future;
use tessera_core::{TesseraError, TesseraResult};
use tracing::error;

/// Awaits `future` and logs its failure once.
///
/// The result is returned untouched: errors are neither translated nor
/// swallowed.
pub async fn guarded<T, F>(operation: &'static str, entity: &'static str, future: F) -> TesseraResult<T>
where
    F: Future<Output = TesseraResult<T>>,
{
    match future.await {
        Ok(value) => Ok(value),
        Err(err) => {
            log_failure(operation, entity, &err);
            Err(err)
        }
    }
}

fn log_failure(operation: &'static str, entity: &'static str, err: &TesseraError) {
    match err {
        TesseraError::Connection(_) => error!(
            operation,
            entity,
            "Database unreachable during {}::{}: {}",
            entity,
            operation,
            err
        ),
        TesseraError::NotFound { id, .. } => error!(
            operation,
            entity,
            "No {} record with key {} in {}",
            entity,
            id,
            operation
        ),
        _ => error!(
            operation,
            entity,
            code = err.error_code(),
            "{}::{} failed: {}",
            entity,
            operation,
            err
        ),
    }
}
