//! Detector and monitor configuration.
//!
//! Every struct deserializes with `#[serde(default)]`, so a TOML file only
//! needs the keys it overrides:
//!
//! ```toml
//! enable_kswin = true
//!
//! [ddm]
//! drift_level = 2.5
//!
//! [kswin]
//! window_size = 200
//! stat_size = 50
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DriftError, DriftResult};

/// Default std-dev multiplier for a DDM warning.
pub const DEFAULT_DDM_WARNING_LEVEL: f64 = 2.0;

/// Default std-dev multiplier for a DDM drift.
pub const DEFAULT_DDM_DRIFT_LEVEL: f64 = 3.0;

/// Samples a binary detector must see before it starts evaluating.
pub const DEFAULT_MIN_SAMPLES: u64 = 30;

/// Page-Hinkley threshold for a standalone detector.
pub const DEFAULT_PH_THRESHOLD: f64 = 50.0;

/// Page-Hinkley threshold used by the monitor's drift-focused preset.
pub const DRIFT_FOCUSED_PH_THRESHOLD: f64 = 20.0;

/// Minimum magnitude of change Page-Hinkley treats as meaningful.
pub const DEFAULT_PH_DELTA: f64 = 0.005;

/// Fraction of the Page-Hinkley threshold that raises a warning.
pub const PH_WARNING_FRACTION: f64 = 0.7;

pub const DEFAULT_KSWIN_WINDOW_SIZE: usize = 100;
pub const DEFAULT_KSWIN_STAT_SIZE: usize = 30;
pub const DEFAULT_KSWIN_ALPHA: f64 = 0.05;

/// Maximum retained history records per detector (memory bound).
pub const DEFAULT_HISTORY_CAPACITY: usize = 1024;

fn require_positive(parameter: &'static str, value: f64) -> DriftResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DriftError::config(parameter, value, "must be finite and > 0"))
    }
}

fn require_history(capacity: usize) -> DriftResult<()> {
    if capacity == 0 {
        return Err(DriftError::config("history_capacity", capacity, "must be > 0"));
    }
    Ok(())
}

// ── DDM ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DdmConfig {
    pub warning_level: f64,
    pub drift_level: f64,
    pub min_samples: u64,
    pub history_capacity: usize,
}

impl Default for DdmConfig {
    fn default() -> Self {
        Self {
            warning_level: DEFAULT_DDM_WARNING_LEVEL,
            drift_level: DEFAULT_DDM_DRIFT_LEVEL,
            min_samples: DEFAULT_MIN_SAMPLES,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl DdmConfig {
    pub fn validate(&self) -> DriftResult<()> {
        require_positive("ddm.warning_level", self.warning_level)?;
        require_positive("ddm.drift_level", self.drift_level)?;
        require_history(self.history_capacity)
    }
}

// ── Page-Hinkley ────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageHinkleyConfig {
    pub threshold: f64,
    pub delta: f64,
    pub min_samples: u64,
    pub history_capacity: usize,
}

impl Default for PageHinkleyConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_PH_THRESHOLD,
            delta: DEFAULT_PH_DELTA,
            min_samples: DEFAULT_MIN_SAMPLES,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl PageHinkleyConfig {
    /// Lower threshold preset used when Page-Hinkley runs inside a monitor.
    pub fn drift_focused() -> Self {
        Self {
            threshold: DRIFT_FOCUSED_PH_THRESHOLD,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> DriftResult<()> {
        require_positive("page_hinkley.threshold", self.threshold)?;
        if !self.delta.is_finite() || self.delta < 0.0 {
            return Err(DriftError::config(
                "page_hinkley.delta",
                self.delta,
                "must be finite and >= 0",
            ));
        }
        require_history(self.history_capacity)
    }
}

// ── KSWIN ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KswinConfig {
    pub window_size: usize,
    pub stat_size: usize,
    pub alpha: f64,
    pub history_capacity: usize,
}

impl Default for KswinConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_KSWIN_WINDOW_SIZE,
            stat_size: DEFAULT_KSWIN_STAT_SIZE,
            alpha: DEFAULT_KSWIN_ALPHA,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl KswinConfig {
    pub fn validate(&self) -> DriftResult<()> {
        if self.window_size == 0 {
            return Err(DriftError::config("kswin.window_size", self.window_size, "must be > 0"));
        }
        if self.stat_size == 0 {
            return Err(DriftError::config("kswin.stat_size", self.stat_size, "must be > 0"));
        }
        if self.stat_size > self.window_size {
            return Err(DriftError::config(
                "kswin.stat_size",
                self.stat_size,
                "must not exceed window_size",
            ));
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(DriftError::config("kswin.alpha", self.alpha, "must be in (0, 1)"));
        }
        require_history(self.history_capacity)
    }
}

// ── Monitor ─────────────────────────────────────────────────────────────

/// Full configuration for a [`DriftMonitor`](crate::DriftMonitor).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Whether to instantiate and feed KSWIN.
    pub enable_kswin: bool,
    pub ddm: DdmConfig,
    pub page_hinkley: PageHinkleyConfig,
    pub kswin: KswinConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enable_kswin: true,
            ddm: DdmConfig::default(),
            page_hinkley: PageHinkleyConfig::drift_focused(),
            kswin: KswinConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Validate every section. The KSWIN section is checked even when
    /// disabled so that toggling `enable_kswin` never exposes a bad config.
    pub fn validate(&self) -> DriftResult<()> {
        self.ddm.validate()?;
        self.page_hinkley.validate()?;
        self.kswin.validate()
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> DriftResult<Self> {
        let config: MonitorConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> DriftResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> DriftResult<String> {
        toml::to_string(self).map_err(|e| DriftError::ConfigParse(e.to_string()))
    }
}
