//! Tick clock for the timed ordering mode.
//!
//! A [`SessionClock`] owns a background task that counts fixed 100 ms ticks.
//! The clock belongs to exactly one session: stopping it freezes the count,
//! and dropping it aborts the task.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Tick period. Elapsed time therefore has 0.1 s resolution.
pub const TICK: Duration = Duration::from_millis(100);

/// Ticks per second of elapsed time.
const TICKS_PER_SEC: f64 = 10.0;

/// Periodic tick counter owned by a running session.
///
/// Must be created inside a Tokio runtime.
#[derive(Debug)]
pub struct SessionClock {
    ticks: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl SessionClock {
    /// Start counting from zero.
    pub fn start() -> Self {
        let ticks = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&ticks);

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + TICK, TICK);
            loop {
                interval.tick().await;
                counter.fetch_add(1, Ordering::Relaxed);
            }
        });

        Self {
            ticks,
            task: Some(task),
        }
    }

    /// Ticks counted so far (frozen once stopped).
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Elapsed seconds, rounded to the tick resolution.
    pub fn elapsed_secs(&self) -> f64 {
        self.ticks() as f64 / TICKS_PER_SEC
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Stop ticking and return the frozen elapsed seconds. Idempotent.
    pub fn stop(&mut self) -> f64 {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.elapsed_secs()
    }
}

impl Drop for SessionClock {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
