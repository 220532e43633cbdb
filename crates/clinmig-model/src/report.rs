//! Run statistics and the structured end-of-run report.
//!
//! Statistics are an explicit accumulator value: each pipeline stage receives
//! a `&mut RunStats`, records its outcomes, and the orchestrator serializes
//! the final state into a [`RunReport`] artifact. The report is produced even
//! when every row fails.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::config::RunMode;

/// Counters and capped message lists accumulated across a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Source rows considered, after the row limit.
    pub total: usize,
    /// Rows written (or counted as written under simulate mode).
    pub succeeded: usize,
    /// Rows dropped for a missing mandatory field.
    pub skipped: usize,
    /// Rows or batches that failed with a captured message.
    pub errors: usize,
    /// Encounter rows whose patient name resolved to nothing.
    pub patient_not_found: usize,
    /// Encounter rows whose date column (and fallback) never parsed.
    pub invalid_date: usize,
    /// Rows skipped because their code already exists in scope.
    pub duplicate: usize,
    /// Field-level rejection counts keyed by field name.
    pub field_warnings: BTreeMap<String, usize>,
    /// Every distinct patient name that failed to resolve.
    pub unmatched_names: BTreeSet<String>,
    /// Captured error messages, in discovery order.
    pub error_messages: Vec<String>,
}

impl RunStats {
    /// Count one field-level rejection; the record proceeds with the field
    /// absent.
    pub fn record_field_warning(&mut self, field: &str) {
        *self.field_warnings.entry(field.to_string()).or_insert(0) += 1;
    }

    /// Count an error and keep its message for the report.
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.errors += 1;
        self.error_messages.push(message.into());
    }

    pub fn record_unmatched(&mut self, name: &str) {
        self.patient_not_found += 1;
        self.unmatched_names.insert(name.to_string());
    }

    pub fn warning_total(&self) -> usize {
        self.field_warnings.values().sum()
    }
}

/// The serialized artifact written at the end of every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub timestamp: String,
    pub source: String,
    pub mode: RunMode,
    pub stats: RunStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_warnings_accumulate_per_field() {
        let mut stats = RunStats::default();
        stats.record_field_warning("national_id");
        stats.record_field_warning("national_id");
        stats.record_field_warning("email");
        assert_eq!(stats.field_warnings.get("national_id"), Some(&2));
        assert_eq!(stats.warning_total(), 3);
    }

    #[test]
    fn test_unmatched_names_deduplicate() {
        let mut stats = RunStats::default();
        stats.record_unmatched("Maria Silva");
        stats.record_unmatched("Maria Silva");
        assert_eq!(stats.patient_not_found, 2);
        assert_eq!(stats.unmatched_names.len(), 1);
    }

    #[test]
    fn test_report_serializes_mode_as_kebab_case() {
        let report = RunReport {
            timestamp: "2025-06-01T00:00:00Z".to_string(),
            source: "patients.csv".to_string(),
            mode: RunMode::Simulate,
            stats: RunStats::default(),
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"simulate\""));
    }
}
