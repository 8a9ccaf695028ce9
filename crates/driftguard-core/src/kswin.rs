//! KSWIN (Kolmogorov–Smirnov Windowing).
//!
//! Keeps the last `window_size` values in a FIFO window. Once the window is
//! full, every update compares its oldest `stat_size` values (reference)
//! with its newest `stat_size` values (test) using the two-sample KS test
//! and flags drift when the p-value drops below `alpha`.
//!
//! The reference segment slides with the window, so drift is judged
//! relative to recent history rather than a frozen baseline.

use serde::{Deserialize, Serialize};

use crate::buffer::RingBuffer;
use crate::config::KswinConfig;
use crate::detector::{ContinuousDetector, DetectorState, Verdict};
use crate::error::DriftResult;
use crate::history::HistoryLog;
use crate::ks::{ks_2samp, KsTest};

#[derive(Clone, Debug)]
pub struct Kswin {
    config: KswinConfig,
    state: DetectorState,
    window: RingBuffer<f64>,
    last_test: Option<KsTest>,
}

/// KSWIN statistics snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KswinStats {
    pub n_samples: u64,
    pub window_len: usize,
    /// Most recent KS statistic; `None` until the window first fills.
    pub last_statistic: Option<f64>,
    pub last_p_value: Option<f64>,
    pub drift_detected: bool,
    pub history_len: usize,
}

impl Kswin {
    pub const NAME: &'static str = "kswin";

    pub fn new(config: KswinConfig) -> DriftResult<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    pub fn with_defaults() -> Self {
        Self::from_valid(KswinConfig::default())
    }

    fn from_valid(config: KswinConfig) -> Self {
        Self {
            state: DetectorState::new(Self::NAME, config.history_capacity),
            window: RingBuffer::new(config.window_size),
            last_test: None,
            config,
        }
    }

    /// Push one value and return whether drift is detected.
    pub fn update(&mut self, value: f64) -> bool {
        self.state.begin_sample();
        self.window.push(value);

        if !self.window.is_full() {
            return false;
        }

        let stat_size = self.config.stat_size;
        let reference: Vec<f64> = self.window.iter().take(stat_size).copied().collect();
        let test: Vec<f64> = self
            .window
            .iter()
            .skip(self.config.window_size - stat_size)
            .copied()
            .collect();

        let result = ks_2samp(&reference, &test);
        self.last_test = Some(result);

        let verdict = if result.p_value < self.config.alpha {
            Verdict::drift()
        } else {
            Verdict::STABLE
        };
        self.state.conclude(verdict, result.p_value, false);
        verdict.drift
    }

    pub fn reset(&mut self) {
        self.state.reset();
        self.window.clear();
        self.last_test = None;
    }

    pub fn config(&self) -> &KswinConfig {
        &self.config
    }

    pub fn n_samples(&self) -> u64 {
        self.state.n_samples
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// Window contents, oldest first.
    pub fn window(&self) -> impl Iterator<Item = f64> + '_ {
        self.window.iter().copied()
    }

    pub fn last_test(&self) -> Option<KsTest> {
        self.last_test
    }

    pub fn drift_detected(&self) -> bool {
        self.state.drift_detected
    }

    pub fn history(&self) -> &HistoryLog {
        &self.state.history
    }

    pub fn stats(&self) -> KswinStats {
        KswinStats {
            n_samples: self.state.n_samples,
            window_len: self.window.len(),
            last_statistic: self.last_test.map(|t| t.statistic),
            last_p_value: self.last_test.map(|t| t.p_value),
            drift_detected: self.state.drift_detected,
            history_len: self.state.history.len(),
        }
    }
}

impl Default for Kswin {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ContinuousDetector for Kswin {
    fn update_continuous(&mut self, value: f64) -> bool {
        self.update(value)
    }

    fn reset(&mut self) {
        Kswin::reset(self)
    }

    fn n_samples(&self) -> u64 {
        self.state.n_samples
    }

    fn history(&self) -> &HistoryLog {
        &self.state.history
    }
}
