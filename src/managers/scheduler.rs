//! Periodic execution of backup cycles

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

const SLEEP_STEP: Duration = Duration::from_millis(200);

/// Runs a cycle, sleeps, and repeats until stopped
pub struct Scheduler {
    interval: Duration,
    max_cycles: Option<usize>,
    stop: Arc<AtomicBool>,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_cycles: None,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Stop after `cycles` cycles
    pub fn with_max_cycles(mut self, cycles: usize) -> Self {
        self.max_cycles = Some(cycles);
        self
    }

    /// Flag that ends the loop once set; checked between cycles and while sleeping
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Run `cycle` repeatedly; returns the number of cycles run
    pub fn run<F>(&self, mut cycle: F) -> usize
    where
        F: FnMut(),
    {
        let mut count = 0;

        while !self.stopped() {
            cycle();
            count += 1;

            if self.max_cycles.is_some_and(|max| count >= max) {
                break;
            }

            info!("Next check in {} seconds", self.interval.as_secs());
            self.sleep();
        }

        count
    }

    fn sleep(&self) {
        let deadline = Instant::now() + self.interval;
        while !self.stopped() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep(SLEEP_STEP.min(deadline - now));
        }
    }
}
