//! The Configuration API and the dispatcher's core control loop. This is
//! the component that ties the schedule model, the task workers and the
//! platform layer together.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{PlatformError, RunError};
#[cfg(unix)]
use crate::platform::PosixPlatform;
use crate::platform::{CpuMask, Platform, RtPriority, WorkerHandle};
use crate::schedule::Schedule;
use crate::task::{worker_loop, TaskKind, TaskShared, TaskState};

/// A clonable handle that lets a task body request the aperiodic release,
/// without holding a reference to the whole `Executive` -- a request
/// endpoint captured by value into the task closure, not a back-pointer.
#[derive(Clone)]
pub struct ApRequestHandle {
    ap_request: Arc<Mutex<bool>>,
}

impl ApRequestHandle {
    /// Raises the aperiodic request flag. Reentrant: calling this `K` times
    /// between two frame ticks collapses to a single release.
    pub fn request(&self) {
        *self.ap_request.lock().unwrap() = true;
    }
}

/// A clonable handle to stop a running `Executive` from any thread,
/// including from within a task body, without altering the timing of any
/// frame already in progress.
#[derive(Clone)]
pub struct StopHandle {
    stop: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}

struct Slot {
    function: Option<Box<dyn FnMut() + Send + 'static>>,
    wcet: u32,
}

struct TaskRecord {
    shared: Arc<TaskShared>,
    worker: Option<thread::JoinHandle<()>>,
    handle: WorkerHandle,
    /// Set once the platform layer has refused a priority/affinity change
    /// for this task; a detached task is never admitted again.
    detached: AtomicBool,
}

/// The cyclic-executive scheduler itself: a Configuration API before
/// `run()`, and the frame dispatcher once `run()` is called -- `run()`
/// blocks the calling thread, which *becomes* the dispatcher thread, pinned
/// and raised to `rt_max`.
pub struct Executive {
    num_tasks: usize,
    periodic_slots: Vec<Slot>,
    aperiodic_slot: Option<Slot>,
    schedule: Schedule,
    unit_time: Duration,
    platform: Arc<dyn Platform>,
    cpu: CpuMask,
    ap_request: Arc<Mutex<bool>>,
    stop: Arc<AtomicBool>,
}

impl Executive {
    /// `new(num_tasks, frame_length, unit_duration = 10ms)`.
    /// Uses [`PosixPlatform`] pinned to CPU 0, the common case; use
    /// [`Executive::with_platform`] to supply a different backend (for
    /// example [`crate::platform::SimPlatform`] in tests) or a different
    /// target CPU.
    #[cfg(unix)]
    pub fn new(num_tasks: usize, frame_length: u32, unit_duration_ms: u64) -> Self {
        Self::with_platform(
            num_tasks,
            frame_length,
            unit_duration_ms,
            Arc::new(PosixPlatform::new()),
            CpuMask(0),
        )
    }

    /// Builds an `Executive` against an explicit [`Platform`] backend and
    /// target CPU, bypassing the `SCHED_FIFO`-range auto-detection `new`
    /// performs.
    pub fn with_platform(
        num_tasks: usize,
        frame_length: u32,
        unit_duration_ms: u64,
        platform: Arc<dyn Platform>,
        cpu: CpuMask,
    ) -> Self {
        Executive {
            num_tasks,
            periodic_slots: (0..num_tasks).map(|_| Slot { function: None, wcet: 0 }).collect(),
            aperiodic_slot: None,
            schedule: Schedule::new(frame_length),
            unit_time: Duration::from_millis(unit_duration_ms),
            platform,
            cpu,
            ap_request: Arc::new(Mutex::new(false)),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Sets the periodic task of index `task_id`. Calling this twice for
    /// the same id overwrites the prior binding (last-wins).
    ///
    /// # Panics
    ///
    /// Panics if `task_id >= num_tasks` -- a configuration error caught
    /// before any thread starts.
    pub fn set_periodic_task(&mut self, task_id: usize, function: impl FnMut() + Send + 'static, wcet: u32) {
        assert!(
            task_id < self.num_tasks,
            "set_periodic_task: id {task_id} out of range (num_tasks = {})",
            self.num_tasks
        );
        self.periodic_slots[task_id] = Slot {
            function: Some(Box::new(function)),
            wcet,
        };
    }

    /// Sets the singleton aperiodic task. Last-wins, as with periodic
    /// tasks.
    pub fn set_aperiodic_task(&mut self, function: impl FnMut() + Send + 'static, wcet: u32) {
        self.aperiodic_slot = Some(Slot {
            function: Some(Box::new(function)),
            wcet,
        });
    }

    /// Appends a frame and caches its slack. See [`Schedule::add_frame`] for
    /// the configuration-error preconditions.
    pub fn add_frame(&mut self, ids: Vec<usize>) {
        let wcets: Vec<u32> = self.periodic_slots.iter().map(|s| s.wcet).collect();
        self.schedule.add_frame(ids, &wcets);
    }

    /// Builds an `Executive` with its frame length, unit duration, per-task
    /// wcets and frame table pre-loaded from an ambient
    /// [`crate::ExecutiveConfig`]. Task bodies still have to be bound
    /// afterward with [`Executive::set_periodic_task`] and
    /// [`Executive::set_aperiodic_task`] -- closures aren't describable in
    /// TOML.
    #[cfg(unix)]
    pub fn from_config(cfg: &crate::config::ExecutiveConfig) -> Result<Self, crate::error::ConfigError> {
        Self::from_config_with_platform(cfg, Arc::new(PosixPlatform::new()), CpuMask(0))
    }

    /// Same as [`Executive::from_config`] but against an explicit
    /// [`Platform`] backend and target CPU, for tests and non-POSIX hosts.
    pub fn from_config_with_platform(
        cfg: &crate::config::ExecutiveConfig,
        platform: Arc<dyn Platform>,
        cpu: CpuMask,
    ) -> Result<Self, crate::error::ConfigError> {
        let schedule = cfg.into_schedule_bindings()?;
        let exec = Executive {
            num_tasks: cfg.num_tasks(),
            periodic_slots: cfg
                .tasks
                .iter()
                .map(|t| Slot { function: None, wcet: t.wcet })
                .collect(),
            aperiodic_slot: Some(Slot {
                function: None,
                wcet: cfg.aperiodic_wcet,
            }),
            schedule,
            unit_time: Duration::from_millis(cfg.unit_duration_ms),
            platform,
            cpu,
            ap_request: Arc::new(Mutex::new(false)),
            stop: Arc::new(AtomicBool::new(false)),
        };
        Ok(exec)
    }

    /// Thread-safe, reentrant flag raise. Equivalent to
    /// `self.ap_handle().request()`.
    pub fn ap_task_request(&self) {
        *self.ap_request.lock().unwrap() = true;
    }

    /// A clonable handle equivalent to `ap_task_request()`, meant to be
    /// captured by value into task closures instead of a reference to the
    /// whole `Executive`.
    pub fn ap_handle(&self) -> ApRequestHandle {
        ApRequestHandle {
            ap_request: Arc::clone(&self.ap_request),
        }
    }

    /// A clonable handle to request cooperative shutdown.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            stop: Arc::clone(&self.stop),
        }
    }

    /// Requests cooperative shutdown; equivalent to
    /// `self.stop_handle().stop()`.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    fn validate_ready(&self) -> Result<(), RunError> {
        for (id, slot) in self.periodic_slots.iter().enumerate() {
            if slot.function.is_none() {
                return Err(RunError::UnboundPeriodicTask(id));
            }
        }
        if self.aperiodic_slot.is_none() {
            return Err(RunError::UnboundAperiodicTask);
        }
        Ok(())
    }

    /// Spawns the periodic and aperiodic workers, then runs the dispatcher
    /// loop on the calling thread until `stop()` is observed.
    ///
    /// # Panics
    ///
    /// Panics (via `expect`) if any periodic slot or the aperiodic slot was
    /// never bound -- this is a precondition violation to be caught before
    /// any thread starts, not a recoverable error.
    pub fn run(&mut self) {
        self.validate_ready().expect("Executive::run: configuration precondition violated");

        let stop = Arc::clone(&self.stop);
        let mut periodic: Vec<TaskRecord> = Vec::with_capacity(self.num_tasks);
        for (id, slot) in self.periodic_slots.iter_mut().enumerate() {
            let shared = TaskShared::new(TaskKind::Periodic, id, slot.wcet);
            let function = slot.function.take().expect("validated above");
            periodic.push(Self::spawn_worker(&stop, shared, function));
        }

        let ap_slot = self.aperiodic_slot.as_mut().expect("validated above");
        let ap_function = ap_slot.function.take().expect("validated above");
        let ap_shared = TaskShared::new(TaskKind::Aperiodic, 0, ap_slot.wcet);
        let aperiodic = Self::spawn_worker(&stop, ap_shared, ap_function);
        self.pin_aperiodic_worker(&aperiodic);

        // The dispatcher itself: raise this, the calling, thread to rt_max
        // and pin it to the target CPU before entering the loop.
        self.raise_dispatcher_priority();

        self.dispatch_loop(&periodic, &aperiodic);
    }

    /// Pins the aperiodic worker to the target CPU and gives it its
    /// resting `rt_min` priority, the same way `admit` does for a periodic
    /// task's worker. Done once at spawn time rather than on first release,
    /// since the aperiodic worker otherwise never gets an affinity or
    /// priority assignment until the first slack-stealing window.
    fn pin_aperiodic_worker(&self, aperiodic: &TaskRecord) {
        if let Err(e) = self.platform.set_priority(aperiodic.handle, self.platform.rt_min()) {
            log::error!("dispatcher: failed to set initial priority for aperiodic worker: {e}");
        }
        if let Err(e) = self.platform.set_affinity(aperiodic.handle, self.cpu) {
            log::error!("dispatcher: failed to pin aperiodic worker: {e}");
        }
    }

    #[cfg(unix)]
    fn raise_dispatcher_priority(&self) {
        // SAFETY: pthread_self() always returns a valid handle to the
        // calling thread; WorkerHandle::from_raw wraps it the same way
        // WorkerHandle::from_join does for spawned threads.
        let handle = WorkerHandle::current();
        if let Err(e) = self.platform.set_priority(handle, self.platform.rt_max()) {
            log::error!("dispatcher: failed to raise own priority to rt_max: {e}");
        }
        if let Err(e) = self.platform.set_affinity(handle, self.cpu) {
            log::error!("dispatcher: failed to pin dispatcher thread: {e}");
        }
    }

    #[cfg(not(unix))]
    fn raise_dispatcher_priority(&self) {}

    fn spawn_worker(
        stop: &Arc<AtomicBool>,
        shared: Arc<TaskShared>,
        function: Box<dyn FnMut() + Send + 'static>,
    ) -> TaskRecord {
        let stop = Arc::clone(stop);
        let shared_thread = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name(match shared.kind {
                TaskKind::Periodic => format!("rtexec-p{}", shared.id),
                TaskKind::Aperiodic => "rtexec-ap".to_string(),
            })
            .spawn(move || worker_loop(shared_thread, function, stop))
            .expect("failed to spawn worker thread");
        let handle = WorkerHandle::from_join(&worker);
        TaskRecord {
            shared,
            worker: Some(worker),
            handle,
            detached: AtomicBool::new(false),
        }
    }

    /// The per-frame control loop: absorb a pending aperiodic request,
    /// admit this frame's periodic tasks, steal slack for the aperiodic
    /// worker if one is running, sleep to the frame boundary, detect
    /// misses, advance. Cooperative shutdown is checked at the top of every
    /// iteration and immediately after every sleep, so a stopped `Executive`
    /// never starts a new frame tick and never oversleeps past the request.
    fn dispatch_loop(&self, periodic: &[TaskRecord], aperiodic: &TaskRecord) {
        let mut frame_id: usize = 0;
        let mut ap_running = false;
        let mut next_frame = Instant::now();

        loop {
            if self.stop.load(Ordering::Relaxed) {
                log::info!("dispatcher: stop observed, returning from run()");
                Self::wake_all_for_shutdown(periodic, aperiodic);
                return;
            }

            // (1) absorb pending aperiodic request
            {
                let mut req = self.ap_request.lock().unwrap();
                if *req {
                    *req = false;
                    if ap_running {
                        log::warn!("aperiodic deadline miss: new request arrived while previous job still running");
                    } else {
                        ap_running = true;
                    }
                }
            }

            let frame_ids: &[usize] = self.schedule.frame(frame_id);
            let slack = self.schedule.slack(frame_id);
            let frame_length = self.schedule.frame_length;

            // (2) admit this frame's periodic tasks
            let mut offset: i32 = 3;
            for &id in frame_ids {
                let rec = &periodic[id];
                if rec.detached.load(Ordering::Relaxed) {
                    continue;
                }
                if rec.shared.state() != TaskState::Idle {
                    // still non-IDLE from a prior frame; quarantined, skip
                    continue;
                }
                let priority = self.platform.rt_max().saturating_sub(offset);
                offset += 1;
                match self.admit(rec, priority) {
                    Ok(()) => {}
                    Err(PlatformError::PermissionDenied(what)) => {
                        log::error!(
                            "dispatcher: permission denied setting {what} for periodic task {id}; detaching worker"
                        );
                        rec.detached.store(true, Ordering::Relaxed);
                    }
                    Err(e) => {
                        log::error!("dispatcher: platform error admitting periodic task {id}: {e}");
                    }
                }
            }

            // (3) aperiodic activation during slack, or (4) plain sleep to frame end
            if ap_running {
                for rec in periodic.iter() {
                    if rec.detached.load(Ordering::Relaxed) {
                        continue;
                    }
                    if rec.shared.miss() {
                        let prio = self.platform.rt_max().saturating_sub(1);
                        if let Err(e) = self.platform.set_priority(rec.handle, prio) {
                            log::warn!("dispatcher: failed to raise miss-recovery priority for task {}: {e}", rec.shared.id);
                        }
                    }
                }
                if let Err(e) = self.platform.set_priority(aperiodic.handle, self.platform.rt_max().saturating_sub(2)) {
                    log::warn!("dispatcher: failed to raise aperiodic priority during slack: {e}");
                }
                {
                    let mut inner = aperiodic.shared.inner.lock().unwrap();
                    if inner.state == TaskState::Idle {
                        inner.state = TaskState::Pending;
                        aperiodic.shared.wake.notify_one();
                    }
                }

                // slack-sleep: a zero-slack frame makes this a no-op, not a
                // separate branch.
                next_frame += self.unit_time * slack;
                sleep_until(next_frame);
                if self.stop_requested_after_sleep(periodic, aperiodic) {
                    return;
                }

                if let Err(e) = self.platform.set_priority(aperiodic.handle, self.platform.rt_min()) {
                    log::warn!("dispatcher: failed to demote aperiodic priority after slack: {e}");
                }
                for rec in periodic.iter() {
                    if rec.detached.load(Ordering::Relaxed) {
                        continue;
                    }
                    if rec.shared.miss() {
                        let prio = self.platform.rt_min().saturating_add(1);
                        if let Err(e) = self.platform.set_priority(rec.handle, prio) {
                            log::warn!("dispatcher: failed to demote miss-recovery priority for task {}: {e}", rec.shared.id);
                        }
                    }
                }

                next_frame += self.unit_time * (frame_length - slack);
                sleep_until(next_frame);
            } else {
                next_frame += self.unit_time * frame_length;
                sleep_until(next_frame);
            }
            if self.stop_requested_after_sleep(periodic, aperiodic) {
                return;
            }

            // (5) end-of-frame miss detection
            for rec in periodic.iter() {
                if rec.detached.load(Ordering::Relaxed) {
                    continue;
                }
                let mut inner = rec.shared.inner.lock().unwrap();
                if inner.miss && inner.state == TaskState::Idle {
                    inner.miss = false;
                }
            }
            if ap_running && aperiodic.shared.state() == TaskState::Idle {
                ap_running = false;
            }
            for &id in frame_ids {
                let rec = &periodic[id];
                if rec.detached.load(Ordering::Relaxed) {
                    continue;
                }
                let mut inner = rec.shared.inner.lock().unwrap();
                if inner.state != TaskState::Idle {
                    if !inner.miss {
                        log::warn!("dispatcher: periodic task {id} missed its deadline in frame {frame_id}");
                    }
                    inner.miss = true;
                    drop(inner);
                    let prio = self.platform.rt_min().saturating_add(1);
                    if let Err(e) = self.platform.set_priority(rec.handle, prio) {
                        log::warn!("dispatcher: failed to set miss priority for task {id}: {e}");
                    }
                }
            }

            // (6) advance
            frame_id = (frame_id + 1) % self.schedule.num_frames();
        }
    }

    /// Checked immediately after every `sleep_until` so shutdown is noticed
    /// within one sleep instead of waiting for the next loop head. Logs and
    /// wakes every worker the same way the top-of-loop check does.
    fn stop_requested_after_sleep(&self, periodic: &[TaskRecord], aperiodic: &TaskRecord) -> bool {
        if self.stop.load(Ordering::Relaxed) {
            log::info!("dispatcher: stop observed, returning from run()");
            Self::wake_all_for_shutdown(periodic, aperiodic);
            true
        } else {
            false
        }
    }

    /// Notifies every worker's condvar so one parked in `Condvar::wait`
    /// waiting for its next release notices `stop` immediately instead of
    /// waiting for a release that will never come (task.rs's `worker_loop`
    /// rechecks `stop` each time it wakes).
    fn wake_all_for_shutdown(periodic: &[TaskRecord], aperiodic: &TaskRecord) {
        for rec in periodic.iter().chain(std::iter::once(aperiodic)) {
            rec.shared.wake.notify_all();
        }
    }

    fn admit(&self, rec: &TaskRecord, priority: RtPriority) -> Result<(), PlatformError> {
        self.platform.set_priority(rec.handle, priority)?;
        self.platform.set_affinity(rec.handle, self.cpu)?;
        {
            let mut inner = rec.shared.inner.lock().unwrap();
            inner.state = TaskState::Pending;
        }
        rec.shared.wake.notify_one();
        Ok(())
    }
}

impl Drop for Executive {
    fn drop(&mut self) {
        // Best-effort: make sure any worker still blocked on release wakes
        // up and exits rather than leak an infinite loop if `run()` is
        // dropped without ever being called, or after `stop()`.
        self.stop.store(true, Ordering::Relaxed);
    }
}

fn sleep_until(target: Instant) {
    let now = Instant::now();
    if target > now {
        thread::sleep(target - now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::SimPlatform;
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;

    fn join_with_timeout(handle: thread::JoinHandle<()>, timeout: Duration) {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            handle.join().ok();
            let _ = tx.send(());
        });
        rx.recv_timeout(timeout)
            .expect("run() did not return within the expected number of frames");
    }

    fn sim_executive(num_tasks: usize, frame_length: u32) -> (Executive, Arc<SimPlatform>) {
        let sim = Arc::new(SimPlatform::new());
        let exec = Executive::with_platform(num_tasks, frame_length, 1, sim.clone(), CpuMask(0));
        (exec, sim)
    }

    #[test]
    fn nominal_schedule_runs_every_periodic_task_each_cycle() {
        let (mut exec, _sim) = sim_executive(2, 4);
        let runs0 = Arc::new(AtomicUsize::new(0));
        let runs1 = Arc::new(AtomicUsize::new(0));
        let (r0, r1) = (runs0.clone(), runs1.clone());
        exec.set_periodic_task(0, move || { r0.fetch_add(1, Ordering::Relaxed); }, 1);
        exec.set_periodic_task(1, move || { r1.fetch_add(1, Ordering::Relaxed); }, 1);
        exec.set_aperiodic_task(|| {}, 1);
        exec.add_frame(vec![0, 1]);

        let stop = exec.stop_handle();
        let handle = thread::spawn(move || exec.run());
        thread::sleep(Duration::from_millis(60));
        stop.stop();
        join_with_timeout(handle, Duration::from_secs(2));

        assert!(runs0.load(Ordering::Relaxed) >= 2);
        assert!(runs1.load(Ordering::Relaxed) >= 2);
    }

    #[test]
    fn stop_unblocks_run_within_a_bounded_number_of_frames() {
        let (mut exec, _sim) = sim_executive(1, 3);
        exec.set_periodic_task(0, || {}, 1);
        exec.set_aperiodic_task(|| {}, 1);
        exec.add_frame(vec![0]);

        let stop = exec.stop_handle();
        let handle = thread::spawn(move || exec.run());
        thread::sleep(Duration::from_millis(15));
        stop.stop();
        join_with_timeout(handle, Duration::from_secs(2));
    }

    #[test]
    fn aperiodic_request_runs_the_aperiodic_task_during_slack() {
        let (mut exec, _sim) = sim_executive(1, 10);
        let ap_ran = Arc::new(AtomicUsize::new(0));
        let ap_ran2 = ap_ran.clone();
        exec.set_periodic_task(0, || {}, 2);
        exec.set_aperiodic_task(move || { ap_ran2.fetch_add(1, Ordering::Relaxed); }, 2);
        exec.add_frame(vec![0]);

        let ap_handle = exec.ap_handle();
        let stop = exec.stop_handle();
        let handle = thread::spawn(move || exec.run());
        thread::sleep(Duration::from_millis(15));
        ap_handle.request();
        thread::sleep(Duration::from_millis(60));
        stop.stop();
        join_with_timeout(handle, Duration::from_secs(2));

        assert!(ap_ran.load(Ordering::Relaxed) >= 1);
    }

    #[test]
    fn coalesced_aperiodic_requests_collapse_to_one_release() {
        let (mut exec, _sim) = sim_executive(1, 20);
        let ap_ran = Arc::new(AtomicUsize::new(0));
        let ap_ran2 = ap_ran.clone();
        exec.set_periodic_task(0, || {}, 1);
        exec.set_aperiodic_task(move || {
            ap_ran2.fetch_add(1, Ordering::Relaxed);
            thread::sleep(Duration::from_millis(30));
        }, 1);
        exec.add_frame(vec![0]);

        let ap_handle = exec.ap_handle();
        let stop = exec.stop_handle();
        let handle = thread::spawn(move || exec.run());
        thread::sleep(Duration::from_millis(5));
        for _ in 0..5 {
            ap_handle.request();
        }
        thread::sleep(Duration::from_millis(80));
        stop.stop();
        join_with_timeout(handle, Duration::from_secs(2));

        // five coalesced requests inside one job's lifetime must not yield
        // five separate releases
        assert_eq!(ap_ran.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn admit_detaches_the_worker_on_permission_denied() {
        let sim = Arc::new(SimPlatform::new());
        let stop = Arc::new(AtomicBool::new(false));
        let shared = TaskShared::new(TaskKind::Periodic, 0, 1);
        let rec = Executive::spawn_worker(&stop, shared, Box::new(|| {}));
        sim.deny_priority(rec.handle.id());

        let exec = Executive::with_platform(1, 10, 1, sim, CpuMask(0));
        let err = exec.admit(&rec, exec.platform.rt_max()).unwrap_err();
        assert_eq!(err, PlatformError::PermissionDenied("priority"));
        assert_eq!(rec.shared.state(), TaskState::Idle);

        stop.store(true, Ordering::Relaxed);
        rec.shared.wake.notify_all();
        if let Some(worker) = rec.worker {
            worker.join().ok();
        }
    }

    #[test]
    fn frame_wrap_revisits_the_first_frame() {
        let (mut exec, _sim) = sim_executive(1, 2);
        let runs = Arc::new(AtomicUsize::new(0));
        let runs2 = runs.clone();
        exec.set_periodic_task(0, move || { runs2.fetch_add(1, Ordering::Relaxed); }, 1);
        exec.set_aperiodic_task(|| {}, 1);
        exec.add_frame(vec![0]);
        exec.add_frame(vec![]);
        exec.add_frame(vec![0]);

        let stop = exec.stop_handle();
        let handle = thread::spawn(move || exec.run());
        thread::sleep(Duration::from_millis(40));
        stop.stop();
        join_with_timeout(handle, Duration::from_secs(2));

        // three frames in the cycle, only two release task 0; after wrapping
        // past the end of the frame table at least one more release of task
        // 0 must have happened.
        assert!(runs.load(Ordering::Relaxed) >= 2);
    }
}
