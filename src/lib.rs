//! rtexec -- a cyclic-executive real-time scheduler with slack stealing for
//! aperiodic work.
//!
//! A fixed set of periodic tasks runs according to a statically-defined
//! frame schedule (the major cycle); a single aperiodic task is
//! opportunistically released during whatever slack time a frame has left
//! over. Built for a uniprocessor target: the dispatcher runs at the highest
//! real-time priority and pins every worker thread to one CPU.
//!
//! ```no_run
//! use rtexec::Executive;
//!
//! let mut exec = Executive::new(2, /* frame_length */ 10, /* unit_duration_ms */ 10);
//! exec.set_periodic_task(0, || println!("task 0"), 2);
//! exec.set_periodic_task(1, || println!("task 1"), 3);
//! exec.set_aperiodic_task(|| println!("aperiodic"), 2);
//! exec.add_frame(vec![0, 1]);
//! exec.add_frame(vec![0]);
//!
//! let stop = exec.stop_handle();
//! std::thread::spawn(move || {
//!     std::thread::sleep(std::time::Duration::from_millis(200));
//!     stop.stop();
//! });
//! exec.run();
//! ```

mod config;
mod error;
mod executive;
mod platform;
mod schedule;
mod task;

pub use config::{ExecutiveConfig, FrameConfig, TaskConfig};
pub use error::{ConfigError, PlatformError, RunError};
pub use executive::{ApRequestHandle, Executive, StopHandle};
#[cfg(unix)]
pub use platform::PosixPlatform;
pub use platform::{CpuMask, Platform, RtPriority, SimPlatform};
pub use task::TaskState;
