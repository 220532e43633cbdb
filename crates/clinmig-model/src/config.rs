//! Run configuration threaded into every pipeline component.
//!
//! Nothing in the migration reads process-wide state: the tenant scope, date
//! bounds, batch sizing, and the fixed synonym vocabularies all travel inside
//! a [`MigrationConfig`] value handed to each stage explicitly.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ids::TenantId;

/// Whether a run writes to the store or only simulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// Full run: batches are committed to the store.
    #[default]
    Production,
    /// Dry run: every stage executes, no write is issued.
    Simulate,
}

impl RunMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RunMode::Production => "production",
            RunMode::Simulate => "simulate",
        }
    }
}

/// How patient inserts behave when a code already exists in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConflictPolicy {
    /// Plain insert; an existing code fails the batch.
    #[default]
    Insert,
    /// Update every non-key column of the existing row.
    Upsert,
}

/// Fixed lookup table mapping raw spreadsheet spellings to canonical values.
///
/// Keys are matched on the uppercase-trimmed input, never fuzzily.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymTable {
    entries: BTreeMap<String, String>,
}

impl SynonymTable {
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let entries = pairs
            .iter()
            .map(|(raw, canonical)| (raw.to_uppercase(), (*canonical).to_string()))
            .collect();
        Self { entries }
    }

    /// Exact lookup by uppercase-trimmed key.
    pub fn resolve(&self, raw: &str) -> Option<&str> {
        self.entries
            .get(&raw.trim().to_uppercase())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The legacy system's fixed vocabularies, one table per categorical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Insurer spellings on patient rows (canonical value kept verbatim).
    pub patient_insurers: SynonymTable,
    /// Insurer spellings on encounter rows.
    pub insurers: SynonymTable,
    pub encounter_types: SynonymTable,
    pub locations: SynonymTable,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            patient_insurers: SynonymTable::from_pairs(&[
                ("UNIMED", "UNIMED"),
                ("PARTICULAR", "Particular"),
                ("IPE", "IPE"),
                ("IPE-SAUDE", "IPE"),
                ("BRADESCO SAÚDE", "BRADESCO SAÚDE"),
                ("CASSI", "CASSI"),
                ("CABERGS", "CABERGS"),
                ("SAUDE PAS", "SAUDE PAS"),
                ("COOPMED", "COOPMED"),
                ("CCG", "CCG"),
                ("SAUDE CAIXA", "SAUDE CAIXA"),
                ("ACERTO ESPECIAL", "ACERTO ESPECIAL"),
                ("CAF RBS", "CAF RBS"),
                ("JANSSEN - GASTROS", "Janssen - Gastros"),
                ("PESQUISA/HCPA", "PESQUISA/HCPA"),
            ]),
            insurers: SynonymTable::from_pairs(&[
                ("UNIMED", "UNIMED"),
                ("PARTICULAR", "PARTICULAR"),
                ("IPE", "IPE SAÚDE"),
                ("IPE SAÚDE", "IPE SAÚDE"),
                ("BRADESCO", "BRADESCO SAÚDE"),
                ("BRADESCO SAÚDE", "BRADESCO SAÚDE"),
                ("CASSI", "CASSI"),
                ("AMIL", "AMIL"),
                ("SAUDEPAS", "SAUDEPAS"),
                ("CORTESIA", "CORTESIA"),
                ("RETORNO DE PARTICULAR", "RETORNO PARTICULAR"),
                ("GEAP", "GEAP"),
                ("SULAMERICA", "SULAMERICA"),
                ("SUL AMERICA", "SULAMERICA"),
                ("CABERGS", "CABERGS"),
                ("PETROBRAS", "PETROBRAS"),
                ("POSTAL SAUDE", "POSTAL SAÚDE"),
                ("POSTAL SAÚDE", "POSTAL SAÚDE"),
            ]),
            encounter_types: SynonymTable::from_pairs(&[
                ("CONSULTA", "Consulta"),
                ("VISITA INTERNADO", "Visita internado"),
                ("CIRURGIA", "Cirurgia"),
                ("PROCEDIMENTO", "Procedimento em consultório"),
                ("EXAME", "Exame"),
                ("RETORNO", "Retorno"),
            ]),
            locations: SynonymTable::from_pairs(&[
                ("CONSULTÓRIO", "Consultório"),
                ("CONSULTORIO", "Consultório"),
                ("HMV", "HMV"),
                ("HMDC", "HMD CG"),
                ("HMD", "HMD"),
                ("SANTA CASA", "Santa Casa"),
                ("ON-LINE", "On-line"),
                ("ONLINE", "On-line"),
            ]),
        }
    }
}

/// Configuration for one migration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationConfig {
    pub tenant: TenantId,
    pub mode: RunMode,
    pub conflict_policy: ConflictPolicy,
    /// Rows per committed batch.
    pub batch_size: usize,
    /// Optional cap on source rows, for test runs.
    pub row_limit: Option<usize>,
    /// Lower bound of the accepted birth-date range.
    pub min_birth_date: NaiveDate,
    /// Upper bound of the accepted birth-date range; also supplies the
    /// fallback year for encounter-code repair.
    pub reference_date: NaiveDate,
    /// Maximum `-2`, `-3`, ... suffixes tried when a repaired code collides.
    pub max_code_suffix_attempts: u32,
    pub vocabulary: Vocabulary,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            tenant: TenantId::new(1),
            mode: RunMode::Production,
            conflict_policy: ConflictPolicy::Insert,
            batch_size: 500,
            row_limit: None,
            min_birth_date: NaiveDate::from_ymd_opt(1900, 1, 1).expect("static date"),
            reference_date: NaiveDate::from_ymd_opt(2025, 12, 31).expect("static date"),
            max_code_suffix_attempts: 99,
            vocabulary: Vocabulary::default(),
        }
    }
}

impl MigrationConfig {
    #[must_use]
    pub fn with_tenant(mut self, tenant: TenantId) -> Self {
        self.tenant = tenant;
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    #[must_use]
    pub fn with_row_limit(mut self, limit: Option<usize>) -> Self {
        self.row_limit = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synonym_table_uppercase_trimmed_lookup() {
        let table = SynonymTable::from_pairs(&[("IPE", "IPE SAÚDE")]);
        assert_eq!(table.resolve("ipe"), Some("IPE SAÚDE"));
        assert_eq!(table.resolve("  Ipe  "), Some("IPE SAÚDE"));
        assert_eq!(table.resolve("unknown"), None);
    }

    #[test]
    fn test_default_vocabulary_maps_legacy_spellings() {
        let vocabulary = Vocabulary::default();
        assert_eq!(vocabulary.insurers.resolve("SUL AMERICA"), Some("SULAMERICA"));
        assert_eq!(
            vocabulary.encounter_types.resolve("procedimento"),
            Some("Procedimento em consultório")
        );
        assert_eq!(vocabulary.locations.resolve("HMDC"), Some("HMD CG"));
    }
}
