use std::cell::Cell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

const LOG_INTERVAL: Duration = Duration::from_secs(5);

thread_local! { static LOCAL_EPOCH: Cell<usize> = const { Cell::new(0) }; }

/// Common progress surface for BFS and retrograde drivers: depth/level
/// reached, positions produced, and elapsed time.
pub trait Progress {
    fn epoch(&self) -> usize;
    fn positions(&self) -> usize;
    fn elapsed(&self) -> Duration;
    fn stats(&self) -> String;
}

/// Thread-local epoch counter plus atomic position/elapsed tracking, used by
/// both the BFS generator and the retrograde driver to report throughput
/// without contending on a shared lock from worker threads.
pub struct Metrics {
    epoch: AtomicUsize,
    positions: AtomicUsize,
    start: Instant,
    prior: Mutex<(Instant, usize)>,
}

impl Default for Metrics {
    fn default() -> Self {
        let now = Instant::now();
        Self {
            epoch: AtomicUsize::new(0),
            positions: AtomicUsize::new(0),
            start: now,
            prior: Mutex::new((now, 0)),
        }
    }
}

impl Metrics {
    /// Increments the thread-local epoch counter; call once per depth or
    /// seed-level advance on the driving thread.
    pub fn inc_epoch(&self) {
        LOCAL_EPOCH.with(|c| c.set(c.get() + 1));
    }

    pub fn add_positions(&self, n: usize) {
        self.positions.fetch_add(n, Ordering::Relaxed);
    }

    fn flush(&self) {
        LOCAL_EPOCH.with(|c| self.epoch.fetch_add(c.replace(0), Ordering::Relaxed));
    }

    /// Returns a formatted progress line only if the log interval has
    /// elapsed since the last checkpoint, rate-limiting log noise under
    /// tight loops.
    pub fn checkpoint(&self) -> Option<String> {
        let mut prior = self.prior.lock().expect("poison");
        if prior.0.elapsed() >= LOG_INTERVAL {
            self.flush();
            let secs = prior.0.elapsed().as_secs().max(1) as f64;
            let curr = self.positions();
            let rate = (curr - prior.1) as f64 / secs;
            *prior = (Instant::now(), curr);
            Some(format!(
                "{:<16}{:<20}{:<16}",
                format!("epoch {}", self.epoch()),
                format!("positions {curr}"),
                format!("pos/sec {rate:.1}"),
            ))
        } else {
            None
        }
    }
}

impl Progress for Metrics {
    fn epoch(&self) -> usize {
        self.epoch.load(Ordering::Relaxed)
    }
    fn positions(&self) -> usize {
        self.positions.load(Ordering::Relaxed)
    }
    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
    fn stats(&self) -> String {
        self.flush();
        format!(
            "epoch {} positions {} elapsed {:.1}s",
            self.epoch(),
            self.positions(),
            self.elapsed().as_secs_f64()
        )
    }
}
