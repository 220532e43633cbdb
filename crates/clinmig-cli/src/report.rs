//! Run-report artifacts.
//!
//! Every run ends with a JSON artifact carrying the full statistics and the
//! uncapped message lists, written even when every row failed. The console
//! summary shows the capped view; the artifact is the complete record.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;

use clinmig_model::{DuplicateCriterion, DuplicateGroup};

/// Local timestamp recorded in report artifacts.
pub fn timestamp() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%z").to_string()
}

/// `migration_report_<kind>_<timestamp>.json` in the working directory.
pub fn default_report_path(kind: &str) -> PathBuf {
    PathBuf::from(format!(
        "migration_report_{kind}_{}.json",
        Local::now().format("%Y%m%d_%H%M%S")
    ))
}

/// Serialize an artifact as pretty JSON.
pub fn write_json<T: Serialize>(path: &Path, artifact: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(artifact).context("serialize report")?;
    fs::write(path, json).with_context(|| format!("write report {}", path.display()))
}

/// Audit artifact of a duplicate-detection run.
#[derive(Debug, Clone, Serialize)]
pub struct DedupeReport {
    pub timestamp: String,
    pub total_patients: usize,
    pub national_id_groups: usize,
    pub birth_date_groups: usize,
    pub combined_groups: usize,
    pub groups: Vec<DuplicateGroup>,
}

impl DedupeReport {
    pub fn new(total_patients: usize, groups: Vec<DuplicateGroup>) -> Self {
        let count = |criterion: DuplicateCriterion| {
            groups
                .iter()
                .filter(|group| group.criterion == criterion)
                .count()
        };
        Self {
            timestamp: timestamp(),
            total_patients,
            national_id_groups: count(DuplicateCriterion::NationalId),
            birth_date_groups: count(DuplicateCriterion::BirthDate),
            combined_groups: count(DuplicateCriterion::Combined),
            groups,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinmig_model::PatientId;

    #[test]
    fn test_dedupe_report_counts_by_criterion() {
        let group = |criterion| DuplicateGroup {
            criterion,
            key: "maria silva|11144477735".to_string(),
            patient_ids: vec![PatientId::new(1), PatientId::new(2)],
            names: vec!["Maria Silva".to_string(), "Maria Silva".to_string()],
        };
        let report = DedupeReport::new(
            10,
            vec![
                group(DuplicateCriterion::NationalId),
                group(DuplicateCriterion::Combined),
                group(DuplicateCriterion::Combined),
            ],
        );
        assert_eq!(report.national_id_groups, 1);
        assert_eq!(report.birth_date_groups, 0);
        assert_eq!(report.combined_groups, 2);
    }
}
