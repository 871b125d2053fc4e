//! Simulated progress for an operation of unknown duration.
//!
//! The simulator has no notion of real completion. It advances quickly at
//! first, decelerates towards a ceiling it can never pass on its own, and
//! only reaches 100 through [`ProgressSimulator::complete`].

use novelty_core::config::ProgressSettings;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const COMPLETE: f64 = 100.0;
pub const COMPLETED_STATUS: &str = "Finalizing visualization protocols...";

/// A status message shown once progress reaches `threshold`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressStep {
    pub threshold: f64,
    pub text: String,
}

impl ProgressStep {
    pub fn new(threshold: f64, text: impl Into<String>) -> Self {
        Self {
            threshold,
            text: text.into(),
        }
    }
}

/// The stock status messages, ascending. The zero-threshold entry is the
/// message shown right after `start()`.
pub fn default_steps() -> Vec<ProgressStep> {
    vec![
        ProgressStep::new(0.0, "Initializing architect agent..."),
        ProgressStep::new(10.0, "Analyzing domain context and user profile..."),
        ProgressStep::new(30.0, "Searching prior art and patents..."),
        ProgressStep::new(50.0, "Synthesizing novel architectural patterns..."),
        ProgressStep::new(70.0, "Drafting detailed invention claims..."),
        ProgressStep::new(85.0, "Designing claymation visual specifications..."),
    ]
}

/// One observable progress sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressState {
    /// 0–100
    pub value: f64,
    pub status: String,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            value: 0.0,
            status: String::new(),
        }
    }
}

/// Value after one tick from `current`.
///
/// The step shrinks with the remaining distance to the ceiling but never
/// drops below `min_increment`, and the result is capped at the ceiling.
/// Values already at or past the ceiling are returned unchanged.
pub fn next_value(current: f64, settings: &ProgressSettings) -> f64 {
    if current >= settings.ceiling {
        return current;
    }
    let increment = settings
        .min_increment
        .max((settings.ceiling - current) / settings.deceleration);
    (current + increment).min(settings.ceiling)
}

/// Text of the highest-threshold step whose threshold is at or below `value`.
pub fn status_for(value: f64, steps: &[ProgressStep]) -> Option<&str> {
    steps
        .iter()
        .rev()
        .find(|step| value >= step.threshold)
        .map(|step| step.text.as_str())
}

/// Owned handle over a periodic progress ticker.
///
/// Observers read samples through [`subscribe`](Self::subscribe). At most one
/// ticker runs at a time; dropping the handle stops it.
pub struct ProgressSimulator {
    settings: ProgressSettings,
    steps: Arc<[ProgressStep]>,
    state: Arc<watch::Sender<ProgressState>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
    /// Bumped on every start/stop; a tick only lands if its epoch is still current.
    epoch: Arc<AtomicU64>,
}

impl ProgressSimulator {
    pub fn new(settings: ProgressSettings) -> Self {
        let (state, _) = watch::channel(ProgressState::default());
        Self {
            settings,
            steps: default_steps().into(),
            state: Arc::new(state),
            ticker: Mutex::new(None),
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Replaces the status steps. They are sorted by threshold.
    pub fn with_steps(mut self, mut steps: Vec<ProgressStep>) -> Self {
        steps.sort_by(|a, b| a.threshold.total_cmp(&b.threshold));
        self.steps = steps.into();
        self
    }

    /// Resets to zero and begins ticking, replacing any running ticker.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) {
        let mut ticker = self.ticker.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = ticker.take() {
            previous.abort();
        }
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;

        let initial = ProgressState {
            value: 0.0,
            status: status_for(0.0, &self.steps).unwrap_or_default().to_string(),
        };
        self.state.send_replace(initial);

        let state = Arc::clone(&self.state);
        let steps = Arc::clone(&self.steps);
        let current_epoch = Arc::clone(&self.epoch);
        let settings = self.settings.clone();

        *ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(settings.tick());
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of a tokio interval completes immediately.
            interval.tick().await;

            loop {
                interval.tick().await;
                state.send_if_modified(|progress| {
                    if current_epoch.load(Ordering::SeqCst) != epoch {
                        return false;
                    }
                    advance(progress, &settings, &steps)
                });
            }
        }));

        tracing::trace!(epoch, "Progress ticker started");
    }

    /// Cancels the ticker. Safe to call any number of times.
    ///
    /// Returns whether a ticker was running.
    pub fn stop(&self) -> bool {
        let mut ticker = self.ticker.lock().unwrap_or_else(PoisonError::into_inner);
        self.epoch.fetch_add(1, Ordering::SeqCst);
        match ticker.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Stops ticking and jumps to exactly 100 with the terminal status.
    pub fn complete(&self) {
        self.stop();
        self.state.send_replace(ProgressState {
            value: COMPLETE,
            status: COMPLETED_STATUS.to_string(),
        });
    }

    pub fn is_running(&self) -> bool {
        self.ticker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Current sample.
    pub fn state(&self) -> ProgressState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ProgressState> {
        self.state.subscribe()
    }
}

impl Drop for ProgressSimulator {
    fn drop(&mut self) {
        self.stop();
    }
}

fn advance(
    progress: &mut ProgressState,
    settings: &ProgressSettings,
    steps: &[ProgressStep],
) -> bool {
    let next = next_value(progress.value, settings);
    if next == progress.value {
        return false;
    }
    progress.value = next;
    if let Some(status) = status_for(next, steps)
        && status != progress.status
    {
        progress.status = status.to_string();
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn settings() -> ProgressSettings {
        ProgressSettings::default()
    }

    #[test]
    fn test_next_value_decelerates_and_caps_at_ceiling() {
        let s = settings();
        // (95 - 0) / 50 = 1.9
        assert!((next_value(0.0, &s) - 1.9).abs() < 1e-9);
        // Near the ceiling the floor increment applies.
        assert!((next_value(90.0, &s) - 90.5).abs() < 1e-9);
        assert_eq!(next_value(94.8, &s), 95.0);
        assert_eq!(next_value(95.0, &s), 95.0);
        assert_eq!(next_value(COMPLETE, &s), COMPLETE);
    }

    #[test]
    fn test_repeated_ticks_are_monotonic_and_bounded() {
        let s = settings();
        let mut value = 0.0;
        for _ in 0..1_000 {
            let next = next_value(value, &s);
            assert!(next >= value);
            assert!(next <= s.ceiling);
            value = next;
        }
        assert_eq!(value, s.ceiling);
    }

    #[test]
    fn test_status_picks_highest_reached_threshold() {
        let steps = default_steps();
        assert_eq!(status_for(0.0, &steps), Some("Initializing architect agent..."));
        assert_eq!(status_for(9.99, &steps), Some("Initializing architect agent..."));
        assert_eq!(status_for(10.0, &steps), Some("Analyzing domain context and user profile..."));
        assert_eq!(status_for(69.0, &steps), Some("Synthesizing novel architectural patterns..."));
        assert_eq!(
            status_for(95.0, &steps),
            Some("Designing claymation visual specifications...")
        );
    }

    #[test]
    fn test_status_matches_rule_for_every_tick() {
        let s = settings();
        let steps = default_steps();
        let mut state = ProgressState {
            value: 0.0,
            status: status_for(0.0, &steps).unwrap().to_string(),
        };
        while advance(&mut state, &s, &steps) {
            let expected = steps
                .iter()
                .filter(|step| step.threshold <= state.value)
                .max_by(|a, b| a.threshold.total_cmp(&b.threshold))
                .map(|step| step.text.as_str());
            assert_eq!(Some(state.status.as_str()), expected);
        }
    }

    #[test]
    fn test_with_steps_sorts_thresholds() {
        let simulator = ProgressSimulator::new(settings()).with_steps(vec![
            ProgressStep::new(50.0, "half"),
            ProgressStep::new(0.0, "start"),
        ]);
        assert_eq!(status_for(60.0, &simulator.steps), Some("half"));
        assert_eq!(status_for(10.0, &simulator.steps), Some("start"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_resets_and_ticks() {
        let simulator = ProgressSimulator::new(settings());
        simulator.start();

        let initial = simulator.state();
        assert_eq!(initial.value, 0.0);
        assert_eq!(initial.status, "Initializing architect agent...");

        tokio::time::sleep(Duration::from_millis(1_050)).await;
        let later = simulator.state();
        assert!(later.value > 0.0);
        assert!(later.value < 95.0);
        assert!(simulator.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_passes_ceiling_without_complete() {
        let simulator = ProgressSimulator::new(settings());
        simulator.start();

        tokio::time::sleep(Duration::from_secs(120)).await;
        let state = simulator.state();
        assert_eq!(state.value, 95.0);
        assert_eq!(state.status, "Designing claymation visual specifications...");
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_does_not_leave_two_tickers() {
        let single = ProgressSimulator::new(settings());
        let restarted = ProgressSimulator::new(settings());

        single.start();
        restarted.start();
        restarted.start();

        tokio::time::sleep(Duration::from_millis(550)).await;
        assert_eq!(single.state(), restarted.state());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent_and_freezes_progress() {
        let simulator = ProgressSimulator::new(settings());
        assert!(!simulator.stop());

        simulator.start();
        tokio::time::sleep(Duration::from_millis(350)).await;
        assert!(simulator.stop());
        assert!(!simulator.stop());

        let frozen = simulator.state();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(simulator.state(), frozen);
        assert!(!simulator.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_is_the_only_way_to_100() {
        let simulator = ProgressSimulator::new(settings());
        let mut rx = simulator.subscribe();
        simulator.start();
        tokio::time::sleep(Duration::from_millis(500)).await;

        simulator.complete();
        tokio::time::sleep(Duration::from_secs(1)).await;

        let state = rx.borrow_and_update().clone();
        assert_eq!(state.value, COMPLETE);
        assert_eq!(state.status, COMPLETED_STATUS);
        assert!(!simulator.is_running());
    }
}
