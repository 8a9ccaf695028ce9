//! Detector history with an explicit retention bound.
//!
//! Each detector appends a [`DetectorRecord`] when it flags drift or enters
//! a warning. Records live in a [`HistoryLog`] backed by a ring buffer, so a
//! long-running monitor holds at most `capacity` records per detector; older
//! records are evicted and only counted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::buffer::RingBuffer;

/// What a detector flagged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Drift,
    Warning,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Drift => write!(f, "drift"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single drift or warning event emitted by a detector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectorRecord {
    pub kind: RecordKind,
    /// 1-based index of the sample that produced the event.
    pub sample_index: u64,
    /// Detector-specific metric at the time of the event
    /// (DDM: error_rate + std_dev, Page-Hinkley: ph value, KSWIN: p-value).
    pub metric_value: f64,
    pub timestamp: DateTime<Utc>,
}

impl DetectorRecord {
    pub fn new(kind: RecordKind, sample_index: u64, metric_value: f64) -> Self {
        Self {
            kind,
            sample_index,
            metric_value,
            timestamp: Utc::now(),
        }
    }
}

/// Bounded, append-only event log.
#[derive(Clone, Debug)]
pub struct HistoryLog {
    records: RingBuffer<DetectorRecord>,
    evicted: u64,
}

impl HistoryLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: RingBuffer::new(capacity),
            evicted: 0,
        }
    }

    pub fn record(&mut self, record: DetectorRecord) {
        if self.records.push(record).is_some() {
            self.evicted += 1;
        }
    }

    /// Retained records, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &DetectorRecord> {
        self.records.iter()
    }

    /// Retained records of one kind, oldest first.
    pub fn of_kind(&self, kind: RecordKind) -> impl Iterator<Item = &DetectorRecord> {
        self.records.iter().filter(move |r| r.kind == kind)
    }

    pub fn last(&self) -> Option<&DetectorRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.records.capacity()
    }

    /// Records dropped because the log was full.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Every record ever appended since construction or the last clear.
    pub fn total_recorded(&self) -> u64 {
        self.evicted + self.records.len() as u64
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.evicted = 0;
    }
}
