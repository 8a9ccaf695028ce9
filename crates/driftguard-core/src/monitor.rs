//! The drift monitor: fans observations out to every enabled detector and
//! fuses their verdicts.
//!
//! ```text
//!   (prediction, actual, proba?)
//!       │  validate (atomic reject)
//!       ├──► DDM          ─┐
//!       ├──► Page-Hinkley ─┼──► drift = any drift, warning = any binary warning
//!       └──► KSWIN (proba) ─┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::MonitorConfig;
use crate::ddm::{Ddm, DdmStats};
use crate::detector::{Detector, Verdict};
use crate::error::{DriftError, DriftResult};
use crate::kswin::{Kswin, KswinStats};
use crate::page_hinkley::{PageHinkley, PageHinkleyStats};

/// Fused result of a single [`DriftMonitor::update`] call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub drift_detected: bool,
    pub warning_detected: bool,
    pub ddm: Verdict,
    pub page_hinkley: Verdict,
    /// `None` when KSWIN is disabled or no probability was supplied.
    pub kswin_drift: Option<bool>,
    pub n_updates: u64,
    pub drift_count: u64,
}

/// Point-in-time snapshot of the monitor and its detectors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonitorStats {
    pub n_updates: u64,
    pub drift_count: u64,
    pub ddm: DdmStats,
    pub page_hinkley: PageHinkleyStats,
    pub kswin: Option<KswinStats>,
}

/// Concept-drift monitor for one deployed model.
///
/// Owns its detectors outright; callers that share one monitor between
/// request handlers must serialize access (e.g. `Mutex<DriftMonitor>`).
#[derive(Clone, Debug)]
pub struct DriftMonitor {
    config: MonitorConfig,
    /// DDM, Page-Hinkley and (when enabled) KSWIN, in that order.
    detectors: Vec<Detector>,
    n_updates: u64,
    drift_count: u64,
    last_drift: bool,
}

impl DriftMonitor {
    pub fn new(config: MonitorConfig) -> DriftResult<Self> {
        config.validate()?;

        let mut detectors = vec![
            Detector::Ddm(Ddm::new(config.ddm.clone())?),
            Detector::PageHinkley(PageHinkley::new(config.page_hinkley.clone())?),
        ];
        if config.enable_kswin {
            detectors.push(Detector::Kswin(Kswin::new(config.kswin.clone())?));
        }

        Ok(Self {
            config,
            detectors,
            n_updates: 0,
            drift_count: 0,
            last_drift: false,
        })
    }

    /// Monitor with the default configuration (KSWIN enabled).
    pub fn with_defaults() -> Self {
        Self {
            config: MonitorConfig::default(),
            detectors: vec![
                Detector::Ddm(Ddm::with_defaults()),
                Detector::PageHinkley(PageHinkley::drift_focused()),
                Detector::Kswin(Kswin::with_defaults()),
            ],
            n_updates: 0,
            drift_count: 0,
            last_drift: false,
        }
    }

    /// Feed one served prediction.
    ///
    /// `prediction` and `actual` must be 0 or 1 and `proba`, when given,
    /// must be finite. Invalid input is rejected before any detector sees it.
    pub fn update(
        &mut self,
        prediction: u8,
        actual: u8,
        proba: Option<f64>,
    ) -> DriftResult<AggregateResult> {
        if let Err(e) = Self::validate_input(prediction, actual, proba) {
            warn!(error = %e, "rejected drift monitor input");
            return Err(e);
        }

        let mut ddm = Verdict::STABLE;
        let mut page_hinkley = Verdict::STABLE;
        let mut kswin_drift = None;

        for detector in &mut self.detectors {
            match detector {
                Detector::Ddm(d) => ddm = d.update(prediction, actual),
                Detector::PageHinkley(d) => page_hinkley = d.update(prediction, actual),
                Detector::Kswin(d) => kswin_drift = proba.map(|p| d.update(p)),
            }
        }

        let drift_detected = ddm.drift || page_hinkley.drift || kswin_drift.unwrap_or(false);
        let warning_detected = ddm.warning || page_hinkley.warning;

        self.n_updates += 1;
        if drift_detected {
            self.drift_count += 1;
        }

        if drift_detected && !self.last_drift {
            info!(
                update = self.n_updates,
                ddm = ddm.drift,
                page_hinkley = page_hinkley.drift,
                kswin = kswin_drift.unwrap_or(false),
                "concept drift detected"
            );
        } else if !drift_detected && self.last_drift {
            debug!(update = self.n_updates, "drift signal cleared");
        }
        self.last_drift = drift_detected;

        Ok(AggregateResult {
            drift_detected,
            warning_detected,
            ddm,
            page_hinkley,
            kswin_drift,
            n_updates: self.n_updates,
            drift_count: self.drift_count,
        })
    }

    fn validate_input(prediction: u8, actual: u8, proba: Option<f64>) -> DriftResult<()> {
        if prediction > 1 {
            return Err(DriftError::InvalidInput(format!(
                "prediction must be 0 or 1, got {prediction}"
            )));
        }
        if actual > 1 {
            return Err(DriftError::InvalidInput(format!(
                "actual must be 0 or 1, got {actual}"
            )));
        }
        if let Some(p) = proba {
            if !p.is_finite() {
                return Err(DriftError::InvalidInput(format!(
                    "probability must be finite, got {p}"
                )));
            }
        }
        Ok(())
    }

    /// Reset every detector and the monitor counters; configuration is kept.
    pub fn reset_all(&mut self) {
        for detector in &mut self.detectors {
            detector.reset();
        }
        self.n_updates = 0;
        self.drift_count = 0;
        self.last_drift = false;
        debug!("drift monitor reset");
    }

    pub fn get_stats(&self) -> MonitorStats {
        MonitorStats {
            n_updates: self.n_updates,
            drift_count: self.drift_count,
            ddm: self.ddm().stats(),
            page_hinkley: self.page_hinkley().stats(),
            kswin: self.kswin().map(Kswin::stats),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn n_updates(&self) -> u64 {
        self.n_updates
    }

    pub fn drift_count(&self) -> u64 {
        self.drift_count
    }

    /// Whether the most recent update reported drift.
    pub fn drift_detected(&self) -> bool {
        self.last_drift
    }

    pub fn kswin_enabled(&self) -> bool {
        self.kswin().is_some()
    }

    /// All owned detectors, in fan-out order.
    pub fn detectors(&self) -> &[Detector] {
        &self.detectors
    }

    pub fn ddm(&self) -> &Ddm {
        self.detectors
            .iter()
            .find_map(|d| match d {
                Detector::Ddm(ddm) => Some(ddm),
                _ => None,
            })
            .unwrap_or_else(|| unreachable!("monitor always owns a DDM"))
    }

    pub fn page_hinkley(&self) -> &PageHinkley {
        self.detectors
            .iter()
            .find_map(|d| match d {
                Detector::PageHinkley(ph) => Some(ph),
                _ => None,
            })
            .unwrap_or_else(|| unreachable!("monitor always owns a Page-Hinkley detector"))
    }

    pub fn kswin(&self) -> Option<&Kswin> {
        self.detectors.iter().find_map(|d| match d {
            Detector::Kswin(k) => Some(k),
            _ => None,
        })
    }
}

impl Default for DriftMonitor {
    fn default() -> Self {
        Self::with_defaults()
    }
}
