//! # driftguard-core
//!
//! Online concept-drift detection for deployed binary classifiers.
//!
//! Each served prediction is reported once its ground truth is known. Three
//! detectors watch the resulting streams and a monitor fuses their verdicts
//! into one drift/warning signal.
//!
//! ## Architecture
//!
//! ```text
//!   (prediction, actual, proba?)
//!              │
//!              ▼
//!   ┌─────────────────────┐
//!   │    DriftMonitor     │  validate, fan out, fuse
//!   └──┬────────┬──────┬──┘
//!      │        │      │ proba (optional)
//!      ▼        ▼      ▼
//!   ┌─────┐ ┌──────┐ ┌───────┐
//!   │ DDM │ │  PH  │ │ KSWIN │  ← window: RingBuffer<f64>
//!   └──┬──┘ └──┬───┘ └───┬───┘
//!      │       │         │
//!      └───────┴────┬────┘
//!                   ▼
//!            HistoryLog (bounded, per detector)
//! ```
//!
//! - **DDM** follows the error rate and its binomial standard deviation.
//! - **Page-Hinkley** runs a cumulative-sum change test on the error stream.
//! - **KSWIN** compares the oldest and newest segments of a sliding window of
//!   prediction probabilities with a two-sample Kolmogorov–Smirnov test.
//!
//! ## Quick Start
//!
//! ```rust
//! use driftguard_core::DriftMonitor;
//!
//! let mut monitor = DriftMonitor::with_defaults();
//! for _ in 0..100 {
//!     let result = monitor.update(1, 1, Some(0.92)).unwrap();
//!     assert!(!result.drift_detected);
//! }
//! assert_eq!(monitor.get_stats().n_updates, 100);
//! ```

#![deny(unsafe_code)]

pub mod buffer;
pub mod config;
pub mod ddm;
pub mod detector;
pub mod error;
pub mod history;
pub mod ks;
pub mod kswin;
pub mod monitor;
pub mod page_hinkley;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use buffer::RingBuffer;
pub use config::{
    DdmConfig, KswinConfig, MonitorConfig, PageHinkleyConfig, DEFAULT_HISTORY_CAPACITY,
    DEFAULT_MIN_SAMPLES,
};
pub use ddm::{Ddm, DdmStats};
pub use detector::{BinaryDetector, ContinuousDetector, Detector, DetectorStats, Verdict};
pub use error::{DriftError, DriftResult};
pub use history::{DetectorRecord, HistoryLog, RecordKind};
pub use ks::{ks_2samp, KsTest};
pub use kswin::{Kswin, KswinStats};
pub use monitor::{AggregateResult, DriftMonitor, MonitorStats};
pub use page_hinkley::{PageHinkley, PageHinkleyStats};
