//! Page-Hinkley sequential change test on the prediction error stream.
//!
//! Accumulates `error - delta` and compares the accumulator with its running
//! minimum. While the model keeps predicting correctly the sum falls
//! steadily, the minimum follows it down, and the test statistic stays near
//! zero. A sustained rise in errors lifts the sum away from the minimum.

use serde::{Deserialize, Serialize};

use crate::config::{PageHinkleyConfig, PH_WARNING_FRACTION};
use crate::detector::{BinaryDetector, DetectorState, Verdict};
use crate::error::DriftResult;
use crate::history::HistoryLog;

#[derive(Clone, Debug)]
pub struct PageHinkley {
    config: PageHinkleyConfig,
    state: DetectorState,
    cumsum: f64,
    min_cumsum: f64,
}

/// Page-Hinkley statistics snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageHinkleyStats {
    pub n_samples: u64,
    pub cumsum: f64,
    pub min_cumsum: f64,
    /// `cumsum - min_cumsum`.
    pub ph_value: f64,
    pub drift_detected: bool,
    pub warning_detected: bool,
    pub history_len: usize,
}

impl PageHinkley {
    pub const NAME: &'static str = "page_hinkley";

    pub fn new(config: PageHinkleyConfig) -> DriftResult<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    /// Standalone defaults (threshold 50.0).
    pub fn with_defaults() -> Self {
        Self::from_valid(PageHinkleyConfig::default())
    }

    /// Drift-focused preset (threshold 20.0), as used inside a monitor.
    pub fn drift_focused() -> Self {
        Self::from_valid(PageHinkleyConfig::drift_focused())
    }

    fn from_valid(config: PageHinkleyConfig) -> Self {
        let state = DetectorState::new(Self::NAME, config.history_capacity);
        Self {
            config,
            state,
            cumsum: 0.0,
            min_cumsum: 0.0,
        }
    }

    pub fn update(&mut self, prediction: u8, actual: u8) -> Verdict {
        let was_warning = self.state.warning_detected;
        let n = self.state.begin_sample();
        let error = if prediction != actual { 1.0 } else { 0.0 };

        self.cumsum += error - self.config.delta;
        self.min_cumsum = self.min_cumsum.min(self.cumsum);

        if n < self.config.min_samples {
            return Verdict::STABLE;
        }

        let ph_value = self.ph_value();
        let verdict = if ph_value > self.config.threshold {
            Verdict::drift()
        } else if ph_value > PH_WARNING_FRACTION * self.config.threshold {
            Verdict::warning()
        } else {
            Verdict::STABLE
        };
        self.state.conclude(verdict, ph_value, was_warning);
        verdict
    }

    pub fn reset(&mut self) {
        self.state.reset();
        self.cumsum = 0.0;
        self.min_cumsum = 0.0;
    }

    pub fn ph_value(&self) -> f64 {
        self.cumsum - self.min_cumsum
    }

    pub fn cumsum(&self) -> f64 {
        self.cumsum
    }

    pub fn min_cumsum(&self) -> f64 {
        self.min_cumsum
    }

    pub fn config(&self) -> &PageHinkleyConfig {
        &self.config
    }

    pub fn n_samples(&self) -> u64 {
        self.state.n_samples
    }

    pub fn drift_detected(&self) -> bool {
        self.state.drift_detected
    }

    pub fn warning_detected(&self) -> bool {
        self.state.warning_detected
    }

    pub fn last_verdict(&self) -> Verdict {
        self.state.verdict()
    }

    pub fn history(&self) -> &HistoryLog {
        &self.state.history
    }

    pub fn stats(&self) -> PageHinkleyStats {
        PageHinkleyStats {
            n_samples: self.state.n_samples,
            cumsum: self.cumsum,
            min_cumsum: self.min_cumsum,
            ph_value: self.ph_value(),
            drift_detected: self.state.drift_detected,
            warning_detected: self.state.warning_detected,
            history_len: self.state.history.len(),
        }
    }
}

impl Default for PageHinkley {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl BinaryDetector for PageHinkley {
    fn update_binary(&mut self, prediction: u8, actual: u8) -> Verdict {
        self.update(prediction, actual)
    }

    fn reset(&mut self) {
        PageHinkley::reset(self)
    }

    fn n_samples(&self) -> u64 {
        self.state.n_samples
    }

    fn history(&self) -> &HistoryLog {
        &self.state.history
    }
}
