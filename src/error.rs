//! Typed errors for the crate.
//!
//! Configuration misuse reached directly through the programmatic API
//! (`set_periodic_task` with a bad id, `run()` before every slot is bound)
//! stays an `assert!`/`expect!` abort: those are programmer bugs that must
//! never reach a running thread. The error types here cover paths where
//! failure is expected and recoverable: loading a schedule from on-disk
//! configuration, and the platform layer refusing a priority change.

use thiserror::Error;

/// Failure loading or validating an [`crate::config::ExecutiveConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("frame {frame_index} references task id {task_id}, but only {num_tasks} tasks are configured")]
    UnknownTaskId {
        frame_index: usize,
        task_id: usize,
        num_tasks: usize,
    },

    #[error("frame {frame_index} has negative slack: wcet sum {wcet_sum} exceeds frame_length {frame_length}")]
    NegativeSlack {
        frame_index: usize,
        wcet_sum: u64,
        frame_length: u64,
    },
}

/// Failure from the platform RT layer (priority/affinity syscalls).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The OS refused the priority/affinity change for lack of privilege.
    /// Policy on this variant specifically: detach the affected worker and
    /// continue running in a timing-degraded mode.
    #[error("permission denied setting {0} on worker thread")]
    PermissionDenied(&'static str),

    #[error("platform call failed: {0}")]
    Other(String),
}

/// Errors that can surface before the dispatcher starts. The dispatcher
/// itself never returns `Err` for timing errors once running -- those are
/// diagnostics, not exceptions -- this type exists for the narrow set of
/// preconditions that would otherwise abort via `run()`'s `expect`.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("periodic task {0} was never bound with set_periodic_task")]
    UnboundPeriodicTask(usize),

    #[error("the aperiodic task was never bound with set_aperiodic_task")]
    UnboundAperiodicTask,
}
