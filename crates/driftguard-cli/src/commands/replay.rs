//! Replay command
//!
//! Streams a JSON-lines observation log through a fresh [`DriftMonitor`].
//! Each non-blank line is one observation:
//!
//! ```text
//! {"prediction": 1, "actual": 0, "proba": 0.83}
//! {"prediction": 0, "actual": 0}
//! ```
//!
//! `proba` is optional; other fields are ignored.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use driftguard_core::{AggregateResult, DriftMonitor, MonitorConfig, MonitorStats, RecordKind};
use serde::{Deserialize, Serialize};
use tabled::{Table, Tabled};
use tracing::{debug, warn};

use crate::error::{CliError, CliResult};
use crate::output::{self, OutputFormat};

/// Replay arguments
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Observation log in JSON lines; `-` reads stdin
    pub input: PathBuf,

    /// Skip malformed or rejected lines instead of aborting
    #[arg(long)]
    pub skip_invalid: bool,

    /// Exit with status 2 if any update reported drift
    #[arg(long)]
    pub fail_on_drift: bool,
}

#[derive(Debug, Deserialize)]
struct Observation {
    prediction: u8,
    actual: u8,
    #[serde(default)]
    proba: Option<f64>,
}

/// A transition into warning or drift.
#[derive(Debug, Serialize)]
struct ReplayEvent {
    line: usize,
    update: u64,
    kind: RecordKind,
    detectors: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct ReplaySummary {
    observations: usize,
    skipped: usize,
    events: Vec<ReplayEvent>,
    stats: MonitorStats,
}

#[derive(Tabled)]
struct DetectorRow {
    #[tabled(rename = "Detector")]
    name: &'static str,
    #[tabled(rename = "Samples")]
    samples: u64,
    #[tabled(rename = "Drift")]
    drift: bool,
    #[tabled(rename = "Warning")]
    warning: bool,
    #[tabled(rename = "Records")]
    records: usize,
}

/// Remembers the previous fused verdict so only transitions are reported.
#[derive(Default)]
struct TransitionTracker {
    in_drift: bool,
    in_warning: bool,
}

impl TransitionTracker {
    fn observe(&mut self, line: usize, result: &AggregateResult) -> Option<ReplayEvent> {
        let entered_drift = result.drift_detected && !self.in_drift;
        let entered_warning =
            !result.drift_detected && result.warning_detected && !self.in_warning;
        self.in_drift = result.drift_detected;
        self.in_warning = result.warning_detected;

        let kind = if entered_drift {
            RecordKind::Drift
        } else if entered_warning {
            RecordKind::Warning
        } else {
            return None;
        };

        let detectors = match kind {
            RecordKind::Drift => [
                ("ddm", result.ddm.drift),
                ("page_hinkley", result.page_hinkley.drift),
                ("kswin", result.kswin_drift == Some(true)),
            ]
            .into_iter()
            .filter_map(|(name, flagged)| flagged.then_some(name))
            .collect(),
            RecordKind::Warning => [
                ("ddm", result.ddm.warning),
                ("page_hinkley", result.page_hinkley.warning),
            ]
            .into_iter()
            .filter_map(|(name, flagged)| flagged.then_some(name))
            .collect(),
        };

        Some(ReplayEvent {
            line,
            update: result.n_updates,
            kind,
            detectors,
        })
    }
}

pub fn execute(args: ReplayArgs, config: MonitorConfig, format: OutputFormat) -> anyhow::Result<()> {
    let mut monitor = DriftMonitor::new(config)?;
    let reader = open_input(&args.input)?;

    let mut tracker = TransitionTracker::default();
    let mut events = Vec::new();
    let mut observations = 0;
    let mut skipped = 0;

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("reading line {line_no}"))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        observations += 1;

        let result = match apply(&mut monitor, line, line_no) {
            Ok(result) => result,
            Err(e) if args.skip_invalid => {
                warn!(line = line_no, error = %e, "skipping observation");
                skipped += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(event) = tracker.observe(line_no, &result) {
            debug!(line = line_no, kind = %event.kind, "transition");
            if format == OutputFormat::Text {
                print_event(&event);
            }
            events.push(event);
        }
    }

    let summary = ReplaySummary {
        observations,
        skipped,
        events,
        stats: monitor.get_stats(),
    };

    match format {
        OutputFormat::Json => output::print_json(&summary)?,
        OutputFormat::Text => print_summary(&summary),
    }

    if args.fail_on_drift && summary.stats.drift_count > 0 {
        std::process::exit(2);
    }
    Ok(())
}

fn open_input(path: &Path) -> anyhow::Result<Box<dyn BufRead>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

fn apply(monitor: &mut DriftMonitor, line: &str, line_no: usize) -> CliResult<AggregateResult> {
    let obs: Observation =
        serde_json::from_str(line).map_err(|e| CliError::MalformedRecord {
            line: line_no,
            reason: e.to_string(),
        })?;
    monitor
        .update(obs.prediction, obs.actual, obs.proba)
        .map_err(|source| CliError::Rejected {
            line: line_no,
            source,
        })
}

fn print_event(event: &ReplayEvent) {
    let message = format!(
        "{} at update {} (line {}): {}",
        event.kind,
        event.update,
        event.line,
        event.detectors.join(", ")
    );
    match event.kind {
        RecordKind::Drift => output::print_drift(&message),
        RecordKind::Warning => output::print_warning(&message),
    }
}

fn print_summary(summary: &ReplaySummary) {
    let stats = &summary.stats;

    println!();
    output::print_heading("Replay summary");
    println!("Observations: {} ({} skipped)", summary.observations, summary.skipped);
    println!("Updates:      {}", stats.n_updates);
    println!("Drift calls:  {}", stats.drift_count);
    println!();

    let mut rows = vec![
        DetectorRow {
            name: "ddm",
            samples: stats.ddm.n_samples,
            drift: stats.ddm.drift_detected,
            warning: stats.ddm.warning_detected,
            records: stats.ddm.history_len,
        },
        DetectorRow {
            name: "page_hinkley",
            samples: stats.page_hinkley.n_samples,
            drift: stats.page_hinkley.drift_detected,
            warning: stats.page_hinkley.warning_detected,
            records: stats.page_hinkley.history_len,
        },
    ];
    if let Some(kswin) = &stats.kswin {
        rows.push(DetectorRow {
            name: "kswin",
            samples: kswin.n_samples,
            drift: kswin.drift_detected,
            warning: false,
            records: kswin.history_len,
        });
    }
    println!("{}", Table::new(rows));
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftguard_core::Verdict;

    fn result(drift: bool, warning: bool, n_updates: u64) -> AggregateResult {
        AggregateResult {
            drift_detected: drift,
            warning_detected: warning,
            ddm: Verdict { drift: false, warning },
            page_hinkley: Verdict {
                drift,
                warning: false,
            },
            kswin_drift: None,
            n_updates,
            drift_count: 0,
        }
    }

    #[test]
    fn tracker_reports_transitions_only() {
        let mut tracker = TransitionTracker::default();
        assert!(tracker.observe(1, &result(false, false, 1)).is_none());

        let warn = tracker.observe(2, &result(false, true, 2)).unwrap();
        assert_eq!(warn.kind, RecordKind::Warning);
        assert_eq!(warn.detectors, vec!["ddm"]);
        assert!(tracker.observe(3, &result(false, true, 3)).is_none());

        let drift = tracker.observe(4, &result(true, false, 4)).unwrap();
        assert_eq!(drift.kind, RecordKind::Drift);
        assert_eq!(drift.detectors, vec!["page_hinkley"]);
        assert_eq!(drift.update, 4);
        assert!(tracker.observe(5, &result(true, false, 5)).is_none());

        assert!(tracker.observe(6, &result(false, false, 6)).is_none());
        assert!(tracker.observe(7, &result(true, false, 7)).is_some());
    }

    #[test]
    fn malformed_and_rejected_lines_carry_line_numbers() {
        let mut monitor = DriftMonitor::with_defaults();
        let err = apply(&mut monitor, "{\"prediction\": 1}", 3).unwrap_err();
        assert!(matches!(err, CliError::MalformedRecord { line: 3, .. }));

        let err = apply(&mut monitor, "{\"prediction\": 4, \"actual\": 0}", 9).unwrap_err();
        assert!(matches!(err, CliError::Rejected { line: 9, .. }));
        assert_eq!(monitor.n_updates(), 0);

        let ok = apply(&mut monitor, "{\"prediction\": 1, \"actual\": 1, \"id\": \"a\"}", 10);
        assert!(ok.is_ok());
        assert_eq!(monitor.n_updates(), 1);
    }
}
