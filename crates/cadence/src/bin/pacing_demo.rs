//! Paced frame-loop demo.
//!
//! Runs the pipeline for a few seconds under a TOML-configured pacing mode
//! with artificial stage work, printing measured FPS once per second. Handy
//! for eyeballing pacing behavior on a real scheduler:
//!
//! ```text
//! cargo run --bin pacing_demo --features demo -- pacing.toml
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cadence::{FrameController, FrameControllerDesc, StageCallbacks};
use cadence_platform::{StdClock, StdThreadFactory, StdWaiter};

const RUN_SECONDS: f64 = 5.0;

const DEFAULT_CONFIG: &str = r#"
buffer_count = 2
max_fps = 60
mode = "fixed"
"#;

fn load_desc() -> FrameControllerDesc {
    let text = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("cannot read {path}: {e}");
                std::process::exit(1);
            }
        },
        None => DEFAULT_CONFIG.to_string(),
    };
    match FrameControllerDesc::from_toml_str(&text) {
        Ok(desc) => desc,
        Err(e) => {
            eprintln!("bad pacing config: {e}");
            std::process::exit(1);
        }
    }
}

fn main() {
    let desc = load_desc();
    println!("pacing demo: {desc:?}");

    let clock = StdClock::new();
    let waiter = StdWaiter::new(&clock);
    let factory = StdThreadFactory::new();

    let updates = Arc::new(AtomicU64::new(0));
    let renders = Arc::new(AtomicU64::new(0));
    let presents = Arc::new(AtomicU64::new(0));

    let updates_cb = Arc::clone(&updates);
    let renders_cb = Arc::clone(&renders);
    let presents_cb = Arc::clone(&presents);

    let callbacks = StageCallbacks {
        update: Box::new(move |_, _| {
            // simulated simulation work
            std::thread::sleep(Duration::from_millis(2));
            updates_cb.fetch_add(1, Ordering::Relaxed);
        }),
        render: Box::new(move |_, _| {
            std::thread::sleep(Duration::from_millis(3));
            renders_cb.fetch_add(1, Ordering::Relaxed);
        }),
        present: Box::new(move |_, _| {
            presents_cb.fetch_add(1, Ordering::Relaxed);
        }),
    };

    let mut controller =
        match FrameController::new(desc, &factory, &clock, &waiter, callbacks) {
            Ok(controller) => controller,
            Err(e) => {
                eprintln!("pipeline failed to start: {e}");
                std::process::exit(1);
            }
        };

    let mut next_report = 1.0_f64;
    let mut elapsed = 0.0_f64;
    while elapsed < RUN_SECONDS {
        controller.step();
        elapsed += controller.frame_counter().delta_time();

        if elapsed >= next_report {
            println!(
                "t={:4.1}s  fps={:6.1}  frames={:4}  updated={:4}  rendered={:4}  presented={:4}",
                elapsed,
                controller.frame_counter().fps(),
                controller.total_frame(),
                updates.load(Ordering::Relaxed),
                renders.load(Ordering::Relaxed),
                presents.load(Ordering::Relaxed),
            );
            next_report += 1.0;
        }
    }

    println!(
        "done: {} frames stepped, {} presented",
        controller.total_frame(),
        presents.load(Ordering::Relaxed)
    );
}
