//! The thin OS-scheduling abstraction consumed by the worker and dispatcher.
//!
//! The contract -- assign a thread's real-time priority, pin it to a CPU --
//! is what the rest of this crate depends on; a concrete backend is an
//! implementation detail behind it. This module ships a working POSIX
//! backend ([`PosixPlatform`]) so the crate runs end to end, plus a
//! [`SimPlatform`] test double that records calls without touching real OS
//! state -- the dispatcher and worker logic are written against the
//! [`Platform`] trait only and never see a raw OS priority number.

use std::fmt;

/// An opaque real-time priority band. `rt_max()`/`rt_min()` bracket the
/// usable range; `+`/`-` step by whole bands and saturate at the bracket
/// rather than wrapping or panicking, since the dispatcher's arithmetic
/// (`rt_max - 3`, `rt_min + 1`, ...) must never produce an out-of-band
/// value even for pathological schedules with many simultaneous tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RtPriority(i32);

impl RtPriority {
    pub(crate) fn from_raw(raw: i32) -> Self {
        RtPriority(raw)
    }

    /// The raw OS priority value. Only [`Platform`] implementations should
    /// need this; dispatcher logic stays in terms of `RtPriority`.
    pub fn raw(self) -> i32 {
        self.0
    }

    /// Step down by `k` bands, saturating at `i32::MIN`; real backends
    /// clamp further to the platform's actual minimum in `set_priority`.
    pub fn saturating_sub(self, k: i32) -> Self {
        RtPriority(self.0.saturating_sub(k))
    }

    /// Step up by `k` bands, saturating at `i32::MAX`.
    pub fn saturating_add(self, k: i32) -> Self {
        RtPriority(self.0.saturating_add(k))
    }
}

impl fmt::Display for RtPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rt({})", self.0)
    }
}

/// A CPU affinity mask. The crate only ever pins to a single CPU -- this is
/// a uniprocessor design -- but the type models a mask rather than a bare
/// index so a [`Platform`] impl can validate it against the host's actual
/// CPU count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuMask(pub usize);

/// A handle to a worker thread, opaque to dispatcher logic: it carries
/// whatever a concrete [`Platform`] needs to retarget *another* thread's
/// scheduling parameters from the dispatcher thread, without exposing that
/// representation to `executive.rs`. `PosixPlatform` needs the raw
/// `pthread_t`, recovered once at spawn time via `JoinHandleExt`, because
/// `pthread_setschedparam` does not operate on `std::thread::ThreadId`.
#[derive(Clone, Copy)]
pub struct WorkerHandle {
    thread_id: std::thread::ThreadId,
    #[cfg(unix)]
    native: libc::pthread_t,
}

impl WorkerHandle {
    #[cfg(unix)]
    pub(crate) fn from_join(handle: &std::thread::JoinHandle<()>) -> Self {
        #[allow(deprecated)]
        use std::os::unix::thread::JoinHandleExt;
        WorkerHandle {
            thread_id: handle.thread().id(),
            #[allow(deprecated)]
            native: handle.as_pthread_t(),
        }
    }

    #[cfg(not(unix))]
    pub(crate) fn from_join(handle: &std::thread::JoinHandle<()>) -> Self {
        WorkerHandle {
            thread_id: handle.thread().id(),
        }
    }

    /// A handle to the calling thread itself, used by the dispatcher to
    /// raise its own priority before entering the control loop.
    #[cfg(unix)]
    pub(crate) fn current() -> Self {
        WorkerHandle {
            thread_id: std::thread::current().id(),
            native: unsafe { libc::pthread_self() },
        }
    }

    #[cfg(not(unix))]
    pub(crate) fn current() -> Self {
        WorkerHandle {
            thread_id: std::thread::current().id(),
        }
    }

    pub fn id(&self) -> std::thread::ThreadId {
        self.thread_id
    }
}

impl fmt::Debug for WorkerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorkerHandle({:?})", self.thread_id)
    }
}

impl PartialEq for WorkerHandle {
    fn eq(&self, other: &Self) -> bool {
        self.thread_id == other.thread_id
    }
}
impl Eq for WorkerHandle {}

impl std::hash::Hash for WorkerHandle {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.thread_id.hash(state);
    }
}

/// The platform RT layer's contract.
///
/// `set_priority` may fail with [`crate::error::PlatformError::PermissionDenied`]
/// when the OS refuses the change for lack of privilege; the dispatcher's
/// policy on that specific failure is to detach the affected worker and keep
/// running in a timing-degraded mode rather than treat it as fatal.
pub trait Platform: Send + Sync {
    /// The highest usable RT priority band.
    fn rt_max(&self) -> RtPriority;

    /// The lowest usable RT priority band.
    fn rt_min(&self) -> RtPriority;

    /// Assign `priority` to the named thread. Implementations are expected
    /// to be quick and non-blocking.
    fn set_priority(&self, thread: WorkerHandle, priority: RtPriority) -> Result<(), crate::error::PlatformError>;

    /// Pin the named thread to `mask`. Quick and non-blocking.
    fn set_affinity(&self, thread: WorkerHandle, mask: CpuMask) -> Result<(), crate::error::PlatformError>;
}

/// POSIX backend: `pthread_setschedparam` under `SCHED_FIFO` for priority,
/// `sched_setaffinity` for affinity. Per-thread (`pthread_setschedparam`)
/// rather than process-wide (`sched_setscheduler(0, ...)`) since this crate
/// manages several worker threads with independent priorities rather than
/// one process.
#[cfg(unix)]
pub struct PosixPlatform {
    rt_max: RtPriority,
    rt_min: RtPriority,
}

#[cfg(unix)]
impl PosixPlatform {
    /// Builds a `PosixPlatform` from the host's `SCHED_FIFO` priority range
    /// (`sched_get_priority_min/max`).
    pub fn new() -> Self {
        let max = unsafe { libc::sched_get_priority_max(libc::SCHED_FIFO) };
        let min = unsafe { libc::sched_get_priority_min(libc::SCHED_FIFO) };
        PosixPlatform {
            rt_max: RtPriority::from_raw(max),
            rt_min: RtPriority::from_raw(min),
        }
    }
}

#[cfg(unix)]
impl Default for PosixPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
impl Platform for PosixPlatform {
    fn rt_max(&self) -> RtPriority {
        self.rt_max
    }

    fn rt_min(&self) -> RtPriority {
        self.rt_min
    }

    fn set_priority(&self, thread: WorkerHandle, priority: RtPriority) -> Result<(), crate::error::PlatformError> {
        let clamped = priority.raw().clamp(self.rt_min.raw(), self.rt_max.raw());
        let param = libc::sched_param {
            sched_priority: clamped,
        };
        let ret = unsafe { libc::pthread_setschedparam(thread.native, libc::SCHED_FIFO, &param) };
        if ret != 0 {
            let err = std::io::Error::from_raw_os_error(ret);
            if err.kind() == std::io::ErrorKind::PermissionDenied {
                return Err(crate::error::PlatformError::PermissionDenied("priority"));
            }
            return Err(crate::error::PlatformError::Other(format!(
                "pthread_setschedparam failed: {err}"
            )));
        }
        Ok(())
    }

    fn set_affinity(&self, thread: WorkerHandle, mask: CpuMask) -> Result<(), crate::error::PlatformError> {
        unsafe {
            let mut set: libc::cpu_set_t = std::mem::zeroed();
            libc::CPU_ZERO(&mut set);
            libc::CPU_SET(mask.0, &mut set);
            let ret = libc::pthread_setaffinity_np(
                thread.native,
                std::mem::size_of::<libc::cpu_set_t>(),
                &set,
            );
            if ret != 0 {
                let err = std::io::Error::from_raw_os_error(ret);
                if err.kind() == std::io::ErrorKind::PermissionDenied {
                    return Err(crate::error::PlatformError::PermissionDenied("affinity"));
                }
                return Err(crate::error::PlatformError::Other(format!(
                    "pthread_setaffinity_np failed: {err}"
                )));
            }
        }
        Ok(())
    }
}

/// Records every call without touching OS scheduling state, a
/// simulated-vs-real toggle for hosts that can't grant real RT privilege.
/// Used by the crate's own test suite and by hosts that can't grant
/// `SCHED_FIFO` (most CI runners).
pub struct SimPlatform {
    rt_max: RtPriority,
    rt_min: RtPriority,
    pub calls: std::sync::Mutex<Vec<SimCall>>,
    pub deny_priority_for: std::sync::Mutex<std::collections::HashSet<std::thread::ThreadId>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimCall {
    SetPriority(std::thread::ThreadId, RtPriority),
    SetAffinity(std::thread::ThreadId, CpuMask),
}

impl SimPlatform {
    pub fn new() -> Self {
        SimPlatform {
            rt_max: RtPriority::from_raw(99),
            rt_min: RtPriority::from_raw(1),
            calls: std::sync::Mutex::new(Vec::new()),
            deny_priority_for: std::sync::Mutex::new(std::collections::HashSet::new()),
        }
    }

    /// Make the next `set_priority` call for `thread` fail with
    /// `PermissionDenied`, to exercise the detach-and-continue policy.
    pub fn deny_priority(&self, thread: std::thread::ThreadId) {
        self.deny_priority_for.lock().unwrap().insert(thread);
    }
}

impl Default for SimPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for SimPlatform {
    fn rt_max(&self) -> RtPriority {
        self.rt_max
    }

    fn rt_min(&self) -> RtPriority {
        self.rt_min
    }

    fn set_priority(&self, thread: WorkerHandle, priority: RtPriority) -> Result<(), crate::error::PlatformError> {
        if self.deny_priority_for.lock().unwrap().remove(&thread.id()) {
            return Err(crate::error::PlatformError::PermissionDenied("priority"));
        }
        self.calls.lock().unwrap().push(SimCall::SetPriority(thread.id(), priority));
        Ok(())
    }

    fn set_affinity(&self, thread: WorkerHandle, mask: CpuMask) -> Result<(), crate::error::PlatformError> {
        self.calls.lock().unwrap().push(SimCall::SetAffinity(thread.id(), mask));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_handle() -> WorkerHandle {
        // SimPlatform only ever looks at `.id()`, so any live thread will do.
        let join = std::thread::spawn(|| {
            std::thread::sleep(std::time::Duration::from_millis(1));
        });
        WorkerHandle::from_join(&join)
    }

    #[test]
    fn priority_arithmetic_never_panics() {
        let p = RtPriority::from_raw(5);
        assert_eq!(p.saturating_sub(100).raw(), i32::MIN);
        assert_eq!(p.saturating_add(100).raw(), 105);
    }

    #[test]
    fn sim_platform_records_calls() {
        let sim = SimPlatform::new();
        let handle = fake_handle();
        sim.set_priority(handle, sim.rt_max()).unwrap();
        sim.set_affinity(handle, CpuMask(0)).unwrap();
        assert_eq!(sim.calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn sim_platform_can_deny_priority() {
        let sim = SimPlatform::new();
        let handle = fake_handle();
        sim.deny_priority(handle.id());
        let err = sim.set_priority(handle, sim.rt_max()).unwrap_err();
        assert_eq!(err, crate::error::PlatformError::PermissionDenied("priority"));
        // only denies once
        assert!(sim.set_priority(handle, sim.rt_max()).is_ok());
    }
}
