//! DDM (Drift Detection Method).
//!
//! Treats each prediction as a Bernoulli trial and tracks the running error
//! rate `p` with its binomial standard deviation `s = sqrt(p(1-p)/n)`. The
//! lowest `p + s` seen after warm-up is the reference operating point; the
//! detector warns or flags drift when the current `p + s` climbs a chosen
//! number of reference deviations above the reference error rate.
//!
//! Reference: Gama, Medas, Castillo, Rodrigues (2004), "Learning with drift
//! detection".

use serde::{Deserialize, Serialize};

use crate::config::DdmConfig;
use crate::detector::{BinaryDetector, DetectorState, Verdict};
use crate::error::DriftResult;
use crate::history::HistoryLog;

/// Error-rate based drift detector.
#[derive(Clone, Debug)]
pub struct Ddm {
    config: DdmConfig,
    state: DetectorState,
    n_errors: u64,
    error_rate: f64,
    std_dev: f64,
    /// Error rate at the minimum of `error_rate + std_dev`.
    min_error_rate: f64,
    /// Std dev at the minimum of `error_rate + std_dev`.
    min_std_dev: f64,
}

/// DDM statistics snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DdmStats {
    pub n_samples: u64,
    pub n_errors: u64,
    pub error_rate: f64,
    pub std_dev: f64,
    /// `None` until the reference point is established.
    pub min_error_rate: Option<f64>,
    pub min_std_dev: Option<f64>,
    pub drift_detected: bool,
    pub warning_detected: bool,
    pub history_len: usize,
}

impl Ddm {
    pub const NAME: &'static str = "ddm";

    pub fn new(config: DdmConfig) -> DriftResult<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    pub fn with_defaults() -> Self {
        Self::from_valid(DdmConfig::default())
    }

    fn from_valid(config: DdmConfig) -> Self {
        let state = DetectorState::new(Self::NAME, config.history_capacity);
        Self {
            config,
            state,
            n_errors: 0,
            error_rate: 0.0,
            std_dev: 0.0,
            min_error_rate: f64::INFINITY,
            min_std_dev: f64::INFINITY,
        }
    }

    /// Feed one (prediction, actual) pair.
    pub fn update(&mut self, prediction: u8, actual: u8) -> Verdict {
        let was_warning = self.state.warning_detected;
        let n = self.state.begin_sample();
        if prediction != actual {
            self.n_errors += 1;
        }

        let n_f = n as f64;
        self.error_rate = self.n_errors as f64 / n_f;
        self.std_dev = (self.error_rate * (1.0 - self.error_rate) / n_f).sqrt();

        if n < self.config.min_samples {
            return Verdict::STABLE;
        }

        let current = self.error_rate + self.std_dev;
        if current < self.min_error_rate + self.min_std_dev {
            self.min_error_rate = self.error_rate;
            self.min_std_dev = self.std_dev;
        }

        let drift_threshold = self.min_error_rate + self.config.drift_level * self.min_std_dev;
        let warn_threshold = self.min_error_rate + self.config.warning_level * self.min_std_dev;

        let verdict = if current > drift_threshold {
            Verdict::drift()
        } else if current > warn_threshold {
            Verdict::warning()
        } else {
            Verdict::STABLE
        };
        self.state.conclude(verdict, current, was_warning);
        verdict
    }

    pub fn reset(&mut self) {
        self.state.reset();
        self.n_errors = 0;
        self.error_rate = 0.0;
        self.std_dev = 0.0;
        self.min_error_rate = f64::INFINITY;
        self.min_std_dev = f64::INFINITY;
    }

    pub fn config(&self) -> &DdmConfig {
        &self.config
    }

    pub fn n_samples(&self) -> u64 {
        self.state.n_samples
    }

    pub fn n_errors(&self) -> u64 {
        self.n_errors
    }

    pub fn error_rate(&self) -> f64 {
        self.error_rate
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
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

    pub fn stats(&self) -> DdmStats {
        let established = self.min_error_rate.is_finite();
        DdmStats {
            n_samples: self.state.n_samples,
            n_errors: self.n_errors,
            error_rate: self.error_rate,
            std_dev: self.std_dev,
            min_error_rate: established.then_some(self.min_error_rate),
            min_std_dev: established.then_some(self.min_std_dev),
            drift_detected: self.state.drift_detected,
            warning_detected: self.state.warning_detected,
            history_len: self.state.history.len(),
        }
    }
}

impl Default for Ddm {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl BinaryDetector for Ddm {
    fn update_binary(&mut self, prediction: u8, actual: u8) -> Verdict {
        self.update(prediction, actual)
    }

    fn reset(&mut self) {
        Ddm::reset(self)
    }

    fn n_samples(&self) -> u64 {
        self.state.n_samples
    }

    fn history(&self) -> &HistoryLog {
        &self.state.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DriftError;
    use crate::history::RecordKind;

    fn ddm(min_samples: u64, drift_level: f64) -> Ddm {
        Ddm::new(DdmConfig {
            min_samples,
            drift_level,
            ..DdmConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn all_correct_never_drifts() {
        let mut d = Ddm::with_defaults();
        for _ in 0..500 {
            let v = d.update(1, 1);
            assert_eq!(v, Verdict::STABLE);
        }
        assert_eq!(d.n_samples(), 500);
        assert_eq!(d.error_rate(), 0.0);
        assert_eq!(d.std_dev(), 0.0);
        assert!(d.history().is_empty());
    }

    #[test]
    fn all_wrong_has_zero_std_and_no_drift() {
        let mut d = Ddm::with_defaults();
        for _ in 0..100 {
            assert!(!d.update(0, 1).drift);
        }
        assert_eq!(d.error_rate(), 1.0);
        assert_eq!(d.std_dev(), 0.0);
    }

    #[test]
    fn silent_below_min_samples() {
        let mut d = ddm(30, 3.0);
        for _ in 0..29 {
            assert_eq!(d.update(0, 1), Verdict::STABLE);
        }
        assert!(d.stats().min_error_rate.is_none());
    }

    #[test]
    fn error_rate_and_std_follow_counts() {
        let mut d = Ddm::with_defaults();
        d.update(1, 1);
        d.update(0, 1);
        d.update(1, 1);
        d.update(0, 1);
        assert_eq!(d.n_errors(), 2);
        assert!((d.error_rate() - 0.5).abs() < 1e-12);
        assert!((d.std_dev() - (0.25f64 / 4.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn degradation_flags_drift_and_records_it() {
        let mut d = ddm(30, 3.0);
        // 10% error rate, evenly spread
        for i in 0..100 {
            d.update(u8::from(i % 10 == 9), 0);
        }
        assert!(!d.drift_detected());

        let mut saw_drift = false;
        for _ in 0..100 {
            saw_drift |= d.update(1, 0).drift;
        }
        assert!(saw_drift);
        let drifts: Vec<_> = d.history().of_kind(RecordKind::Drift).collect();
        assert!(!drifts.is_empty());
        assert!(drifts[0].sample_index > 100);
    }

    #[test]
    fn warning_precedes_drift() {
        let mut d = ddm(30, 3.0);
        for i in 0..200 {
            d.update(u8::from(i % 10 == 9), 0);
        }
        let mut first_warning = None;
        let mut first_drift = None;
        for step in 0..100u64 {
            let v = d.update(1, 0);
            if v.warning && first_warning.is_none() {
                first_warning = Some(step);
            }
            if v.drift && first_drift.is_none() {
                first_drift = Some(step);
            }
            assert!(!(v.warning && v.drift));
        }
        let (w, dr) = (first_warning.unwrap(), first_drift.unwrap());
        assert!(w < dr, "warning at {w} should precede drift at {dr}");
    }

    #[test]
    fn minimum_is_non_increasing() {
        let mut d = Ddm::with_defaults();
        let mut last = f64::INFINITY;
        for i in 0..300u32 {
            d.update(u8::from(i % 7 == 0 || (i > 150 && i % 3 == 0)), 0);
            let s = d.stats();
            if let (Some(p), Some(sd)) = (s.min_error_rate, s.min_std_dev) {
                assert!(p + sd <= last);
                last = p + sd;
            }
            assert!(s.n_errors <= s.n_samples);
        }
    }

    #[test]
    fn reset_matches_fresh_detector() {
        let cfg = DdmConfig {
            min_samples: 10,
            ..DdmConfig::default()
        };
        let mut d = Ddm::new(cfg.clone()).unwrap();
        for i in 0..80 {
            d.update(u8::from(i > 40), 0);
        }
        assert!(!d.history().is_empty());
        d.reset();
        let fresh = Ddm::new(cfg).unwrap();
        assert_eq!(d.stats(), fresh.stats());
        assert!(d.history().is_empty());
        assert_eq!(d.config().min_samples, 10);
    }

    #[test]
    fn invalid_config_rejected() {
        let err = Ddm::new(DdmConfig {
            warning_level: 0.0,
            ..DdmConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, DriftError::Config { .. }));
    }
}
