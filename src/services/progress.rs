// src/services/progress.rs
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Expected duration of a typical analysis call, in seconds.
pub const EXPECTED_DURATION_SECS: f64 = 15.0;

/// Perceived progress never passes this while the call is still in flight.
/// The last 5% belongs to the real result.
pub const IN_FLIGHT_CEILING: f64 = 95.0;

/// Perceived progress at `elapsed_secs` seconds into an analysis call. A
/// linear ramp over the expected duration carries 80 points; a fast-saturating
/// exponential carries the other 15, so the bar moves early and then creeps.
pub fn estimated_progress(elapsed_secs: f64) -> f64 {
    let linear = (elapsed_secs / EXPECTED_DURATION_SECS) * 80.0;
    let saturating = (1.0 - (-elapsed_secs / 8.0).exp()) * 15.0;
    (linear + saturating).min(IN_FLIGHT_CEILING)
}

/// Per-call progress counter. Exists only while a call is in flight.
#[derive(Debug, Clone, Default)]
pub struct ProgressState {
    pub percent: f32,
    pub elapsed_secs: u64,
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances one second and recomputes the estimate.
    pub fn tick(&mut self) -> f32 {
        self.elapsed_secs += 1;
        self.percent = estimated_progress(self.elapsed_secs as f64) as f32;
        self.percent
    }

    pub fn complete(&mut self) {
        self.percent = 100.0;
    }
}

/// 1 Hz ticker publishing estimated progress into a watch channel while an
/// analysis call is outstanding. Dropping it stops the ticker without forcing
/// completion; `complete` stops it and publishes exactly 100.
pub struct ProgressEstimator {
    tx: Arc<watch::Sender<f32>>,
    ticker: JoinHandle<()>,
}

impl ProgressEstimator {
    pub fn start() -> (Self, watch::Receiver<f32>) {
        let (tx, rx) = watch::channel(0.0f32);
        let tx = Arc::new(tx);

        let tick_tx = Arc::clone(&tx);
        let ticker = tokio::spawn(async move {
            let mut state = ProgressState::new();
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // The first interval tick fires immediately; skip it so tick #1
            // lands a full second after start.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tick_tx.send(state.tick()).is_err() {
                    break;
                }
            }
        });

        (Self { tx, ticker }, rx)
    }

    /// The real result arrived; pin progress to 100 and stop ticking.
    pub fn complete(self) {
        self.ticker.abort();
        let _ = self.tx.send(100.0);
    }
}

impl Drop for ProgressEstimator {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}
