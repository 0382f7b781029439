//! The task record and worker lifecycle.
//!
//! A worker is a pure executor: it waits for PENDING, runs the bound
//! function, goes back to IDLE, and never looks at the schedule, its own
//! priority, or `miss`. All of that is the dispatcher's business
//! ([`crate::executive`]). The state machine lives behind one
//! `Mutex`+`Condvar` pair per task, not a single shared one, so that
//! notifying one task's release never wakes an unrelated task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};

/// A task's position in the lattice IDLE -> PENDING -> RUNNING -> IDLE.
/// The dispatcher is the only writer of IDLE->PENDING; a worker is the only
/// writer of PENDING->RUNNING and RUNNING->IDLE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Idle,
    Pending,
    Running,
}

/// Diagnostic-only distinction between the periodic table and the
/// aperiodic singleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Periodic,
    Aperiodic,
}

/// Everything the dispatcher needs to mutate under `state_mutex`.
pub(crate) struct StateInner {
    pub state: TaskState,
    /// True iff this task was still non-IDLE at the end of a frame it was
    /// scheduled in; cleared once it reaches IDLE again.
    pub miss: bool,
}

/// The shared half of a task record: what the dispatcher reads and writes.
/// The task's function itself is not stored here -- only the worker thread
/// that owns it ever calls it, so it's captured directly into that thread's
/// closure instead of living behind this shared lock.
pub struct TaskShared {
    pub kind: TaskKind,
    /// Stable index in the periodic table; unused (0) for the aperiodic
    /// singleton, which is identified by `kind` instead.
    pub id: usize,
    pub wcet: u32,
    pub(crate) inner: Mutex<StateInner>,
    pub(crate) wake: Condvar,
}

impl TaskShared {
    pub fn new(kind: TaskKind, id: usize, wcet: u32) -> Arc<Self> {
        Arc::new(TaskShared {
            kind,
            id,
            wcet,
            inner: Mutex::new(StateInner {
                state: TaskState::Idle,
                miss: false,
            }),
            wake: Condvar::new(),
        })
    }

    pub fn state(&self) -> TaskState {
        self.inner.lock().unwrap().state
    }

    pub fn miss(&self) -> bool {
        self.inner.lock().unwrap().miss
    }
}

/// The unbounded worker loop: a worker that observes `stop` while blocked
/// waiting for release, or immediately after returning to IDLE, exits
/// instead of waiting for another release. `Executive::stop` notifies every
/// task's condvar so a blocked worker doesn't wait for the next frame to
/// notice.
pub(crate) fn worker_loop(
    shared: Arc<TaskShared>,
    mut function: Box<dyn FnMut() + Send + 'static>,
    stop: Arc<AtomicBool>,
) {
    loop {
        {
            let mut inner = shared.inner.lock().unwrap();
            while inner.state != TaskState::Pending && !stop.load(Ordering::Relaxed) {
                inner = shared.wake.wait(inner).unwrap();
            }
            if inner.state != TaskState::Pending {
                // woken only because of `stop`, never released this round
                return;
            }
            inner.state = TaskState::Running;
        }

        function();

        {
            let mut inner = shared.inner.lock().unwrap();
            inner.state = TaskState::Idle;
        }

        if stop.load(Ordering::Relaxed) {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn worker_runs_once_per_release() {
        let shared = TaskShared::new(TaskKind::Periodic, 0, 1);
        let stop = Arc::new(AtomicBool::new(false));
        let ran = Arc::new(Mutex::new(0u32));
        let ran2 = Arc::clone(&ran);

        let shared_thread = Arc::clone(&shared);
        let stop_thread = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            worker_loop(
                shared_thread,
                Box::new(move || {
                    *ran2.lock().unwrap() += 1;
                }),
                stop_thread,
            );
        });

        for _ in 0..3 {
            {
                let mut inner = shared.inner.lock().unwrap();
                assert_eq!(inner.state, TaskState::Idle);
                inner.state = TaskState::Pending;
                shared.wake.notify_one();
            }
            // poll for completion rather than sleeping a fixed amount
            for _ in 0..200 {
                if shared.state() == TaskState::Idle {
                    break;
                }
                thread::sleep(Duration::from_millis(5));
            }
            assert_eq!(shared.state(), TaskState::Idle);
        }

        stop.store(true, Ordering::Relaxed);
        shared.wake.notify_all();
        handle.join().unwrap();
        assert_eq!(*ran.lock().unwrap(), 3);
    }

    #[test]
    fn stop_unblocks_a_waiting_worker() {
        let shared = TaskShared::new(TaskKind::Periodic, 0, 1);
        let stop = Arc::new(AtomicBool::new(false));

        let shared_thread = Arc::clone(&shared);
        let stop_thread = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            worker_loop(shared_thread, Box::new(|| {}), stop_thread);
        });

        thread::sleep(Duration::from_millis(20));
        stop.store(true, Ordering::Relaxed);
        shared.wake.notify_all();
        handle.join().unwrap();
    }
}
