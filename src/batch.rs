//! Cycle batches
//!
//! One [`ReportBatch`] is produced per aggregation cycle. It keeps the reports
//! in configured device order and derives a [`BatchSummary`] for logging and
//! gauges.

use crate::report::Report;
use crate::status::Status;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-cycle status counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Number of reports
    pub total: usize,
    /// Reports per status
    pub by_status: BTreeMap<Status, usize>,
    /// Highest severity among evaluated devices
    pub worst: Option<Status>,
    /// Samples recorded as absent across all windows
    pub absent_samples: usize,
}

impl BatchSummary {
    /// Summarize a slice of reports
    pub fn from_reports(reports: &[Report]) -> Self {
        let mut summary = Self {
            total: reports.len(),
            ..Self::default()
        };
        for report in reports {
            let status = report.status();
            *summary.by_status.entry(status).or_insert(0) += 1;
            summary.absent_samples += report.absent_samples();
            if status.severity().is_some() && summary.worst.map_or(true, |w| status > w) {
                summary.worst = Some(status);
            }
        }
        summary
    }

    /// Reports with the given status
    pub fn count(&self, status: Status) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    /// Reports in UNREACHABLE or INVALID
    pub fn failures(&self) -> usize {
        Status::ALL
            .iter()
            .filter(|s| s.is_failure())
            .map(|s| self.count(*s))
            .sum()
    }

    /// True when every report is OK
    pub fn all_ok(&self) -> bool {
        self.count(Status::Ok) == self.total
    }
}

/// Ordered reports from one cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportBatch {
    /// Cycle start
    pub captured_at: DateTime<Utc>,
    /// Summary of `reports`
    pub summary: BatchSummary,
    /// Reports in configured device order
    pub reports: Vec<Report>,
}

impl ReportBatch {
    /// Wrap reports and compute their summary
    pub fn new(captured_at: DateTime<Utc>, reports: Vec<Report>) -> Self {
        let summary = BatchSummary::from_reports(&reports);
        Self {
            captured_at,
            summary,
            reports,
        }
    }

    /// Number of reports
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// Whether the batch has no reports
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Report for a device name
    pub fn get(&self, name: &str) -> Option<&Report> {
        self.reports.iter().find(|r| r.name() == name)
    }

    /// Iterate over reports in order
    pub fn iter(&self) -> std::slice::Iter<'_, Report> {
        self.reports.iter()
    }

    /// Reports that are not OK
    pub fn needing_attention(&self) -> impl Iterator<Item = &Report> {
        self.reports.iter().filter(|r| r.status().needs_attention())
    }

    /// Give up the batch, keeping only its reports
    pub fn into_reports(self) -> Vec<Report> {
        self.reports
    }
}

impl<'a> IntoIterator for &'a ReportBatch {
    type Item = &'a Report;
    type IntoIter = std::slice::Iter<'a, Report>;

    fn into_iter(self) -> Self::IntoIter {
        self.reports.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{Device, DeviceKind, PULSE_COUNT};
    use crate::report::ReportBuilder;
    use crate::sample::SampleSet;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.timestamp_opt(1_760_000_000, 0).unwrap()
    }

    fn report(name: &str, status: Status, window: &[Option<i64>]) -> Report {
        let device = Device::new(name, "10.0.0.1", DeviceKind::Encoder)
            .with_metric(PULSE_COUNT, "1.3.6.1.4.1.1");
        ReportBuilder::new(&device, at())
            .windowed(SampleSet::from_integers(window, at()), None)
            .build(status)
    }

    #[test]
    fn test_summary_counts() {
        let batch = ReportBatch::new(
            at(),
            vec![
                report("A", Status::Ok, &[Some(1), Some(1)]),
                report("B", Status::Unreachable, &[None, None]),
                report("C", Status::Critical, &[Some(1), None]),
                report("D", Status::Ok, &[Some(1), Some(1)]),
            ],
        );

        assert_eq!(batch.summary.total, 4);
        assert_eq!(batch.summary.count(Status::Ok), 2);
        assert_eq!(batch.summary.count(Status::Warning), 0);
        assert_eq!(batch.summary.failures(), 1);
        assert_eq!(batch.summary.absent_samples, 3);
        assert_eq!(batch.summary.worst, Some(Status::Critical));
        assert!(!batch.summary.all_ok());
        assert_eq!(batch.needing_attention().count(), 2);
    }

    #[test]
    fn test_worst_ignores_failures() {
        let batch = ReportBatch::new(
            at(),
            vec![
                report("A", Status::Unreachable, &[]),
                report("B", Status::Warning, &[]),
            ],
        );
        assert_eq!(batch.summary.worst, Some(Status::Warning));
    }

    #[test]
    fn test_empty_batch() {
        let batch = ReportBatch::new(at(), Vec::new());
        assert!(batch.is_empty());
        assert_eq!(batch.summary.worst, None);
        assert!(batch.summary.all_ok());
    }

    #[test]
    fn test_order_preserved() {
        let batch = ReportBatch::new(
            at(),
            vec![
                report("C", Status::Ok, &[]),
                report("A", Status::Ok, &[]),
            ],
        );
        let names: Vec<_> = batch.iter().map(Report::name).collect();
        assert_eq!(names, vec!["C", "A"]);
        assert!(batch.get("A").is_some());
    }
}
