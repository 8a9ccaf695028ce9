//! Shared detector scaffolding.
//!
//! Provides:
//! - `Verdict`: the per-call output of a binary detector
//! - `BinaryDetector` / `ContinuousDetector`: the two update capabilities
//! - `DetectorState`: sample counter, fresh-per-call flags, bounded history
//! - `Detector`: tagged variant over the built-in detectors, so the monitor
//!   can hold them in one collection

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ddm::{Ddm, DdmStats};
use crate::history::{DetectorRecord, HistoryLog, RecordKind};
use crate::kswin::{Kswin, KswinStats};
use crate::page_hinkley::{PageHinkley, PageHinkleyStats};

// ── Verdict ─────────────────────────────────────────────────────────────

/// Drift/warning flags produced by one update. Never both true.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub drift: bool,
    pub warning: bool,
}

impl Verdict {
    pub const STABLE: Verdict = Verdict {
        drift: false,
        warning: false,
    };

    pub fn drift() -> Self {
        Self {
            drift: true,
            warning: false,
        }
    }

    pub fn warning() -> Self {
        Self {
            drift: false,
            warning: true,
        }
    }
}

// ── Capabilities ────────────────────────────────────────────────────────

/// Detector fed with (prediction, actual) label pairs.
///
/// Any pair of labels is accepted; the detector only looks at whether they
/// differ. Label-domain validation happens at the monitor boundary.
pub trait BinaryDetector {
    fn update_binary(&mut self, prediction: u8, actual: u8) -> Verdict;
    fn reset(&mut self);
    fn n_samples(&self) -> u64;
    fn history(&self) -> &HistoryLog;
}

/// Detector fed with a continuous value (e.g. a predicted probability).
pub trait ContinuousDetector {
    fn update_continuous(&mut self, value: f64) -> bool;
    fn reset(&mut self);
    fn n_samples(&self) -> u64;
    fn history(&self) -> &HistoryLog;
}

// ── Shared state ────────────────────────────────────────────────────────

/// Counters and flags every detector carries.
#[derive(Clone, Debug)]
pub(crate) struct DetectorState {
    name: &'static str,
    pub(crate) n_samples: u64,
    pub(crate) drift_detected: bool,
    pub(crate) warning_detected: bool,
    pub(crate) history: HistoryLog,
}

impl DetectorState {
    pub(crate) fn new(name: &'static str, history_capacity: usize) -> Self {
        Self {
            name,
            n_samples: 0,
            drift_detected: false,
            warning_detected: false,
            history: HistoryLog::new(history_capacity),
        }
    }

    /// Count a new sample and clear the previous call's flags.
    pub(crate) fn begin_sample(&mut self) -> u64 {
        self.n_samples += 1;
        self.drift_detected = false;
        self.warning_detected = false;
        self.n_samples
    }

    /// Store this call's verdict.
    ///
    /// Drift is recorded on every call that flags it; a warning is recorded
    /// only when the detector enters the warning state.
    pub(crate) fn conclude(&mut self, verdict: Verdict, metric_value: f64, was_warning: bool) {
        self.drift_detected = verdict.drift;
        self.warning_detected = verdict.warning;

        if verdict.drift {
            debug!(
                detector = self.name,
                sample = self.n_samples,
                metric = metric_value,
                "drift detected"
            );
            self.history.record(DetectorRecord::new(
                RecordKind::Drift,
                self.n_samples,
                metric_value,
            ));
        } else if verdict.warning && !was_warning {
            debug!(
                detector = self.name,
                sample = self.n_samples,
                metric = metric_value,
                "entered warning"
            );
            self.history.record(DetectorRecord::new(
                RecordKind::Warning,
                self.n_samples,
                metric_value,
            ));
        }
    }

    pub(crate) fn verdict(&self) -> Verdict {
        Verdict {
            drift: self.drift_detected,
            warning: self.warning_detected,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.n_samples = 0;
        self.drift_detected = false;
        self.warning_detected = false;
        self.history.clear();
    }
}

// ── Tagged variant ──────────────────────────────────────────────────────

/// One of the built-in detectors.
#[derive(Clone, Debug)]
pub enum Detector {
    Ddm(Ddm),
    PageHinkley(PageHinkley),
    Kswin(Kswin),
}

/// Per-detector statistics snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "detector", rename_all = "snake_case")]
pub enum DetectorStats {
    Ddm(DdmStats),
    PageHinkley(PageHinkleyStats),
    Kswin(KswinStats),
}

impl Detector {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ddm(_) => Ddm::NAME,
            Self::PageHinkley(_) => PageHinkley::NAME,
            Self::Kswin(_) => Kswin::NAME,
        }
    }

    pub fn is_binary(&self) -> bool {
        self.as_binary().is_some()
    }

    pub fn as_binary(&self) -> Option<&dyn BinaryDetector> {
        match self {
            Self::Ddm(d) => Some(d),
            Self::PageHinkley(d) => Some(d),
            Self::Kswin(_) => None,
        }
    }

    pub fn as_binary_mut(&mut self) -> Option<&mut dyn BinaryDetector> {
        match self {
            Self::Ddm(d) => Some(d),
            Self::PageHinkley(d) => Some(d),
            Self::Kswin(_) => None,
        }
    }

    pub fn as_continuous_mut(&mut self) -> Option<&mut dyn ContinuousDetector> {
        match self {
            Self::Kswin(d) => Some(d),
            _ => None,
        }
    }

    pub fn n_samples(&self) -> u64 {
        match self {
            Self::Ddm(d) => BinaryDetector::n_samples(d),
            Self::PageHinkley(d) => BinaryDetector::n_samples(d),
            Self::Kswin(d) => ContinuousDetector::n_samples(d),
        }
    }

    pub fn history(&self) -> &HistoryLog {
        match self {
            Self::Ddm(d) => BinaryDetector::history(d),
            Self::PageHinkley(d) => BinaryDetector::history(d),
            Self::Kswin(d) => ContinuousDetector::history(d),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Self::Ddm(d) => BinaryDetector::reset(d),
            Self::PageHinkley(d) => BinaryDetector::reset(d),
            Self::Kswin(d) => ContinuousDetector::reset(d),
        }
    }

    pub fn stats(&self) -> DetectorStats {
        match self {
            Self::Ddm(d) => DetectorStats::Ddm(d.stats()),
            Self::PageHinkley(d) => DetectorStats::PageHinkley(d.stats()),
            Self::Kswin(d) => DetectorStats::Kswin(d.stats()),
        }
    }
}

impl From<Ddm> for Detector {
    fn from(d: Ddm) -> Self {
        Self::Ddm(d)
    }
}

impl From<PageHinkley> for Detector {
    fn from(d: PageHinkley) -> Self {
        Self::PageHinkley(d)
    }
}

impl From<Kswin> for Detector {
    fn from(d: Kswin) -> Self {
        Self::Kswin(d)
    }
}
