//! Ingestion commands (write operations)
//!
//! The only writers of job state. Each command composes the access checks,
//! the state machine, and the job store, and commits through a single store
//! call.

pub mod cancel;
pub mod delete;
pub mod force_fail;
pub mod retry;
pub mod trigger;
pub mod update_status;

pub use cancel::{CancelJobCommand, CancelJobError};
pub use delete::{DeleteAllJobsCommand, DeleteAllJobsResponse, DeleteJobCommand, DeleteJobError};
pub use force_fail::{ForceFailJobCommand, ForceFailJobError};
pub use retry::{RetryJobCommand, RetryJobError};
pub use trigger::{TriggerIngestionCommand, TriggerIngestionError};
pub use update_status::{UpdateJobStatusCommand, UpdateJobStatusError};
