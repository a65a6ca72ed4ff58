//! Check driver: attempt an operation, log its outcome, never abort
//!
//! Every probe in this tool follows the same contract: announce the check,
//! run one bounded operation, log either the formatted result or the error,
//! and hand control back so the next check still runs. The helpers here are
//! that contract; no error escapes them.

use crate::error::{AppError, Result};
use crate::logging::Logger;
use std::future::Future;
use std::time::Duration;

/// Bound an operation with a timeout. Expiry maps to a regular error so the
/// caller logs it like any other failure; there are no retries.
pub async fn bounded<T, F>(limit: Duration, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(outcome) => outcome,
        Err(_) => Err(AppError::timeout(format!(
            "operation did not complete within {}s",
            limit.as_secs()
        ))),
    }
}

/// Run one independent check: log `announce`, await the operation, then log
/// either the formatted success value or `{failure_prefix}: {error}`.
/// Returns the value so callers can chain follow-up work on success.
pub async fn attempt<T, F, S>(
    logger: &Logger,
    announce: &str,
    failure_prefix: &str,
    operation: F,
    format_success: S,
) -> Option<T>
where
    F: Future<Output = Result<T>>,
    S: FnOnce(&T) -> String,
{
    logger.log(announce);
    match operation.await {
        Ok(value) => {
            logger.log(&format_success(&value));
            Some(value)
        }
        Err(err) => {
            logger.failure(&format!("{}: {}", failure_prefix, err));
            None
        }
    }
}
