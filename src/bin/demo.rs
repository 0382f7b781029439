// rtexec-demo -- a small fixed harness wiring a two-task schedule with one
// aperiodic job, to exercise the crate end to end on a real POSIX host.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rtexec::Executive;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

fn main() {
    TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .expect("failed to install logger");

    let mut exec = Executive::new(2, /* frame_length */ 10, /* unit_duration_ms */ 10);

    let sensor_runs = Arc::new(AtomicU32::new(0));
    let runs = sensor_runs.clone();
    exec.set_periodic_task(
        0,
        move || {
            let n = runs.fetch_add(1, Ordering::Relaxed);
            log::info!("sensor_poll: release {n}");
        },
        2,
    );

    let control_runs = Arc::new(AtomicU32::new(0));
    let runs = control_runs.clone();
    exec.set_periodic_task(
        1,
        move || {
            let n = runs.fetch_add(1, Ordering::Relaxed);
            log::info!("control_loop: release {n}");
        },
        3,
    );

    exec.set_aperiodic_task(
        || {
            log::info!("aperiodic: servicing a logged event");
            thread::sleep(Duration::from_millis(5));
        },
        4,
    );

    exec.add_frame(vec![0, 1]);
    exec.add_frame(vec![0]);
    exec.add_frame(vec![0, 1]);
    exec.add_frame(vec![0]);

    let ap_handle = exec.ap_handle();
    thread::spawn(move || loop {
        thread::sleep(Duration::from_millis(250));
        ap_handle.request();
    });

    let stop = exec.stop_handle();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(3));
        log::info!("demo: requesting shutdown");
        stop.stop();
    });

    log::info!("demo: starting dispatcher");
    exec.run();
    log::info!("demo: run() returned, exiting");
}
