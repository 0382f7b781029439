//! config.rs -- the ambient declarative config layer: a serde+toml
//! description of a schedule's shape (frame length, unit duration, per-task
//! wcets, the frame table itself) that can be loaded once, before any task
//! closures are bound. Task bodies are never describable in TOML, so this
//! layer only ever produces the numeric half of an `Executive`'s
//! configuration; `set_periodic_task`/`set_aperiodic_task` still have to be
//! called afterward.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::schedule::{self, Schedule};

/// One periodic task's static description: just the number the dispatcher
/// needs up front. The id is implicit in the task's position in `tasks`.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    pub wcet: u32,
}

/// One frame's worth of task ids, in execution order.
#[derive(Debug, Clone, Deserialize)]
pub struct FrameConfig {
    pub tasks: Vec<usize>,
}

/// The declarative half of an `Executive`'s configuration. Mirrors the
/// shape of the programmatic API one-for-one: a frame length, a unit
/// duration, a periodic task table and the aperiodic task's wcet, and the
/// frame schedule itself.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutiveConfig {
    pub frame_length: u32,
    #[serde(default = "default_unit_duration_ms")]
    pub unit_duration_ms: u64,
    pub tasks: Vec<TaskConfig>,
    pub aperiodic_wcet: u32,
    pub frames: Vec<FrameConfig>,
}

fn default_unit_duration_ms() -> u64 {
    10
}

impl ExecutiveConfig {
    /// Parses a config from an in-memory TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: ExecutiveConfig = toml::from_str(s)?;
        Ok(cfg)
    }

    /// Reads and parses a config file from disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn num_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Validates every frame against this config's task table and builds the
    /// `Schedule` the frames describe, without touching task closures.
    /// Surfaces a [`ConfigError`] rather than panicking: configuration
    /// loaded from a file is untrusted input, unlike direct misuse of the
    /// programmatic API.
    pub fn into_schedule_bindings(&self) -> Result<Schedule, ConfigError> {
        let wcets: Vec<u32> = self.tasks.iter().map(|t| t.wcet).collect();
        let mut built = Schedule::new(self.frame_length);
        for (index, frame) in self.frames.iter().enumerate() {
            schedule::validate_frame(index, &frame.tasks, &wcets, self.frame_length)?;
            built.add_frame(frame.tasks.clone(), &wcets);
        }
        Ok(built)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const GOOD: &str = r#"
        frame_length = 10
        unit_duration_ms = 5
        aperiodic_wcet = 1

        [[tasks]]
        wcet = 2

        [[tasks]]
        wcet = 3

        [[frames]]
        tasks = [0, 1]

        [[frames]]
        tasks = [0]
    "#;

    #[test]
    fn parses_and_builds_schedule() {
        let cfg = ExecutiveConfig::from_toml_str(GOOD).unwrap();
        assert_eq!(cfg.num_tasks(), 2);
        let schedule = cfg.into_schedule_bindings().unwrap();
        assert_eq!(schedule.num_frames(), 2);
        assert_eq!(schedule.slack(0), 5);
        assert_eq!(schedule.slack(1), 8);
    }

    #[test]
    fn default_unit_duration_is_ten_ms() {
        let cfg = ExecutiveConfig::from_toml_str(
            r#"
                frame_length = 1
                aperiodic_wcet = 0
                tasks = []
                frames = []
            "#,
        )
        .unwrap();
        assert_eq!(cfg.unit_duration_ms, 10);
    }

    #[test]
    fn unknown_task_id_is_a_config_error_not_a_panic() {
        let mut cfg = ExecutiveConfig::from_toml_str(GOOD).unwrap();
        cfg.frames.push(FrameConfig { tasks: vec![5] });
        let err = cfg.into_schedule_bindings().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTaskId { task_id: 5, .. }));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = ExecutiveConfig::from_toml_str("not valid toml [[[").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_io_error() {
        let err = ExecutiveConfig::from_toml_file("/nonexistent/path/rtexec.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn loads_from_a_real_file_on_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(GOOD.as_bytes()).unwrap();
        let cfg = ExecutiveConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(cfg.frame_length, 10);
    }
}
