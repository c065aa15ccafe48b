//! Shared validation utilities
//!
//! Bounds checks for the numeric job fields. The state machine itself is
//! permissive; every externally supplied value is validated here, at the
//! boundary, before a diff is ever computed.

use thiserror::Error;

/// Progress must stay within this inclusive range.
pub const PROGRESS_RANGE: (f64, f64) = (0.0, 100.0);

/// Advisory scheduling priority range.
pub const PRIORITY_RANGE: (i32, i32) = (0, 10);

/// Allowed retry budget range for a job.
pub const MAX_RETRIES_RANGE: (i32, i32) = (1, 10);

/// Errors produced by the numeric bounds checks
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BoundsValidationError {
    #[error("progress must be between 0 and 100, got {0}")]
    Progress(f64),

    #[error("priority must be between 0 and 10, got {0}")]
    Priority(i32),

    #[error("maxRetries must be between 1 and 10, got {0}")]
    MaxRetries(i32),
}

/// Validate a progress percentage
pub fn validate_progress(progress: f64) -> Result<(), BoundsValidationError> {
    let (lo, hi) = PROGRESS_RANGE;
    if !progress.is_finite() || progress < lo || progress > hi {
        return Err(BoundsValidationError::Progress(progress));
    }
    Ok(())
}

/// Validate an advisory priority
pub fn validate_priority(priority: i32) -> Result<(), BoundsValidationError> {
    let (lo, hi) = PRIORITY_RANGE;
    if priority < lo || priority > hi {
        return Err(BoundsValidationError::Priority(priority));
    }
    Ok(())
}

/// Validate a retry budget
pub fn validate_max_retries(max_retries: i32) -> Result<(), BoundsValidationError> {
    let (lo, hi) = MAX_RETRIES_RANGE;
    if max_retries < lo || max_retries > hi {
        return Err(BoundsValidationError::MaxRetries(max_retries));
    }
    Ok(())
}
