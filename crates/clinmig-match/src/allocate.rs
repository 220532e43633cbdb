//! Identifier allocation for migrated patients and encounter codes.
//!
//! Patient identifiers carry a fixed migration prefix so migrated rows stay
//! distinguishable from records created in the target system. Encounter codes
//! follow `<patient code>-<year><seq>` with a four-digit sequence per year;
//! the corrective repair rewrites legacy codes that predate the prefixed
//! format.

use tracing::{debug, warn};

use clinmig_model::{MigrationConfig, NewPatient, TenantId};
use clinmig_store::EncounterStore;

use crate::MatchError;

/// Marker prepended to every migrated patient identifier.
pub const MIGRATION_PREFIX: &str = "MIG-";

/// Patient identifier for a legacy source id.
pub fn patient_code(legacy_id: &str) -> String {
    format!("{MIGRATION_PREFIX}{legacy_id}")
}

/// Suffix duplicate patient codes within one transform batch.
///
/// The first occurrence keeps its code; later occurrences get a `-DUP-<row>`
/// suffix built from their position, so re-running the transform over the same
/// rows assigns the same codes. Returns how many rows were suffixed.
pub fn disambiguate_patient_codes(rows: &mut [NewPatient]) -> usize {
    let mut seen = std::collections::BTreeSet::new();
    let mut suffixed = 0;
    for (index, row) in rows.iter_mut().enumerate() {
        if !seen.insert(row.patient_code.clone()) {
            row.patient_code = format!("{}-DUP-{index}", row.patient_code);
            suffixed += 1;
        }
    }
    suffixed
}

/// Next encounter code for `year`, scoped to the tenant.
///
/// Looks up the lexicographically greatest stored code starting with the year
/// digits, parses its trailing sequence, and increments it; with no prior code
/// for the year the sequence starts at `0001`. The emitted code is
/// `<patient code>-<year><seq:04>`.
pub fn next_encounter_code<S: EncounterStore>(
    store: &mut S,
    tenant: TenantId,
    patient_code: &str,
    year: i32,
) -> Result<String, MatchError> {
    let year_digits = year.to_string();
    let sequence = store
        .max_encounter_code_with_prefix(tenant, &year_digits)?
        .and_then(|code| parse_sequence(&code, &year_digits))
        .map_or(1, |seq| seq + 1);
    Ok(format!("{patient_code}-{year_digits}{sequence:04}"))
}

/// Trailing numeric sequence of an encounter code.
///
/// Works for both code shapes in the store: the legacy `YYYYNNNN` form (the
/// year digits are stripped from the front of the trailing run) and the
/// prefixed `<patient>-<year><seq>` form.
fn parse_sequence(code: &str, year_digits: &str) -> Option<u32> {
    let head = code.trim_end_matches(|ch: char| ch.is_ascii_digit());
    let mut trailing = &code[head.len()..];
    if trailing.len() > year_digits.len() && trailing.starts_with(year_digits) {
        trailing = &trailing[year_digits.len()..];
    }
    if trailing.is_empty() {
        return None;
    }
    trailing.parse().ok()
}

/// Outcome of one corrective repair run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairOutcome {
    /// Codes found in the legacy hyphen-less form.
    pub scanned: usize,
    /// Codes rewritten to the prefixed format.
    pub repaired: usize,
    /// Codes skipped because the encounter has no linked patient.
    pub skipped: usize,
    /// Captured per-code failure messages.
    pub errors: Vec<String>,
}

/// Rewrite legacy encounter codes that lack the patient-identifier prefix.
///
/// A numeric `YYYYNNNN` code keeps its embedded year and sequence; anything
/// else is rebuilt as `<patient>-<year>0001` from the encounter's own year
/// (the configured reference year when the date is missing). A collision on
/// the rebuilt code appends `-2`, `-3`, ... up to the configured attempt
/// bound. Idempotent: only hyphen-less codes are ever selected, so repaired
/// codes are never touched again.
pub fn repair_encounter_codes<S: EncounterStore>(
    store: &mut S,
    config: &MigrationConfig,
) -> Result<RepairOutcome, MatchError> {
    use chrono::Datelike;

    let legacy = store.list_unprefixed_codes(config.tenant)?;
    let mut outcome = RepairOutcome {
        scanned: legacy.len(),
        ..RepairOutcome::default()
    };
    for entry in legacy {
        let Some(patient) = entry.patient_code.as_deref() else {
            warn!(code = %entry.code, "encounter has no linked patient, skipping repair");
            outcome.skipped += 1;
            continue;
        };
        let year = entry.year.unwrap_or_else(|| config.reference_date.year());
        let rebuilt = match split_legacy_code(&entry.code) {
            Some((code_year, sequence)) => format!("{patient}-{code_year}{sequence}"),
            None => format!("{patient}-{year}0001"),
        };
        let code = if store.encounter_code_in_use_by_other(config.tenant, &rebuilt, entry.id)? {
            match free_suffixed_code(store, config, &rebuilt) {
                Ok(code) => code,
                Err(error) => {
                    outcome.errors.push(format!("{}: {error}", entry.code));
                    continue;
                }
            }
        } else {
            rebuilt
        };
        store.rewrite_encounter_code(entry.id, &code)?;
        debug!(old = %entry.code, new = %code, "encounter code repaired");
        outcome.repaired += 1;
    }
    Ok(outcome)
}

/// Year and zero-padded sequence of a numeric `YYYYNNNN` legacy code.
fn split_legacy_code(code: &str) -> Option<(&str, String)> {
    if code.len() < 5 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (year, sequence) = code.split_at(4);
    Some((year, format!("{:0>4}", sequence)))
}

/// First free `-2`, `-3`, ... suffix of `base`, within the configured bound.
fn free_suffixed_code<S: EncounterStore>(
    store: &mut S,
    config: &MigrationConfig,
    base: &str,
) -> Result<String, MatchError> {
    for attempt in 2..2 + config.max_code_suffix_attempts {
        let candidate = format!("{base}-{attempt}");
        if !store.encounter_code_exists(config.tenant, &candidate)? {
            return Ok(candidate);
        }
    }
    Err(MatchError::SuffixExhausted {
        code: base.to_string(),
        attempts: config.max_code_suffix_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use clinmig_model::{NewEncounter, PatientId};
    use clinmig_store::MemStore;

    fn tenant() -> TenantId {
        TenantId::new(1)
    }

    fn encounter(code: &str, patient_id: i64, date: Option<NaiveDate>) -> NewEncounter {
        NewEncounter {
            tenant: tenant(),
            code: code.to_string(),
            patient_id: PatientId::new(patient_id),
            patient_name: "Maria Silva".to_string(),
            date,
            week: None,
            encounter_type: None,
            procedure: None,
            location: None,
            insurer: None,
            insurer_plan: None,
            private: false,
            payment_made: false,
            projected_billing: None,
            manual_fee_record: None,
            final_projected_billing: None,
            partner_billing_primary: None,
            partner_billing_secondary: None,
            billing_sent_date: None,
            expected_payment_date: None,
            payment_date: None,
            invoice_ref: None,
            notes: None,
            month: None,
            year: None,
            quarter: None,
            quarter_year: None,
        }
    }

    fn seed_patient(store: &mut MemStore, code: &str) -> PatientId {
        store.insert_patient(NewPatient {
            tenant: tenant(),
            patient_code: code.to_string(),
            legacy_code: None,
            name: "Maria Silva".to_string(),
            birth_date: None,
            sex: None,
            national_id: None,
            mother_name: None,
            email: None,
            phone: None,
            street: None,
            district: None,
            postal_code: None,
            city: None,
            state: None,
            country: None,
            primary_insurance: Default::default(),
            secondary_insurance: Default::default(),
            deceased_or_lost: false,
            case_status: "Ativo".to_string(),
        })
    }

    #[test]
    fn test_patient_code_prefix() {
        assert_eq!(patient_code("123"), "MIG-123");
    }

    #[test]
    fn test_disambiguation_keeps_first_and_suffixes_rest() {
        let make = |code: &str| NewPatient {
            tenant: tenant(),
            patient_code: code.to_string(),
            legacy_code: None,
            name: "X".to_string(),
            birth_date: None,
            sex: None,
            national_id: None,
            mother_name: None,
            email: None,
            phone: None,
            street: None,
            district: None,
            postal_code: None,
            city: None,
            state: None,
            country: None,
            primary_insurance: Default::default(),
            secondary_insurance: Default::default(),
            deceased_or_lost: false,
            case_status: "Ativo".to_string(),
        };
        let mut rows = vec![make("MIG-7"), make("MIG-8"), make("MIG-7")];
        let suffixed = disambiguate_patient_codes(&mut rows);
        assert_eq!(suffixed, 1);
        assert_eq!(rows[0].patient_code, "MIG-7");
        assert_eq!(rows[1].patient_code, "MIG-8");
        assert_eq!(rows[2].patient_code, "MIG-7-DUP-2");
        // Re-running over the same input is stable.
        let mut again = vec![make("MIG-7"), make("MIG-8"), make("MIG-7")];
        disambiguate_patient_codes(&mut again);
        assert_eq!(again[2].patient_code, "MIG-7-DUP-2");
    }

    #[test]
    fn test_first_code_of_a_year() {
        let mut store = MemStore::new();
        let code = next_encounter_code(&mut store, tenant(), "MIG-1", 2025).unwrap();
        assert_eq!(code, "MIG-1-20250001");
    }

    #[test]
    fn test_sequence_increments_past_existing_codes() {
        let mut store = MemStore::new();
        for seq in 1..=9 {
            store.insert_encounter(encounter(&format!("2025-patientA-{seq:04}"), 1, None));
        }
        let code = next_encounter_code(&mut store, tenant(), "MIG-1", 2025).unwrap();
        assert_eq!(code, "MIG-1-20250010");
    }

    #[test]
    fn test_sequence_reads_legacy_unprefixed_codes() {
        let mut store = MemStore::new();
        store.insert_encounter(encounter("20250117", 1, None));
        let code = next_encounter_code(&mut store, tenant(), "MIG-1", 2025).unwrap();
        assert_eq!(code, "MIG-1-20250118");
    }

    #[test]
    fn test_repair_rebuilds_numeric_codes() {
        let mut store = MemStore::new();
        let patient = seed_patient(&mut store, "MIG-55");
        let date = NaiveDate::from_ymd_opt(2025, 3, 1);
        let id = store.insert_encounter(encounter("2025013", patient.get(), date));
        let outcome = repair_encounter_codes(&mut store, &MigrationConfig::default()).unwrap();
        assert_eq!(outcome.repaired, 1);
        // Sequence is zero-padded when the legacy code was short.
        assert_eq!(store.encounter_code_of(id), Some("MIG-55-20250013"));
    }

    #[test]
    fn test_repair_rebuilds_non_numeric_codes_from_year() {
        let mut store = MemStore::new();
        let patient = seed_patient(&mut store, "MIG-55");
        let date = NaiveDate::from_ymd_opt(2024, 7, 15);
        let id = store.insert_encounter(encounter("TESTE001", patient.get(), date));
        let outcome = repair_encounter_codes(&mut store, &MigrationConfig::default()).unwrap();
        assert_eq!(outcome.repaired, 1);
        assert_eq!(store.encounter_code_of(id), Some("MIG-55-20240001"));
    }

    #[test]
    fn test_repair_collision_appends_suffix() {
        let mut store = MemStore::new();
        let patient = seed_patient(&mut store, "MIG-55");
        store.insert_encounter(encounter("MIG-55-20250001", patient.get(), None));
        let id = store.insert_encounter(encounter("20250001", patient.get(), None));
        let outcome = repair_encounter_codes(&mut store, &MigrationConfig::default()).unwrap();
        assert_eq!(outcome.repaired, 1);
        assert_eq!(store.encounter_code_of(id), Some("MIG-55-20250001-2"));
    }

    #[test]
    fn test_repair_is_idempotent() {
        let mut store = MemStore::new();
        let patient = seed_patient(&mut store, "MIG-55");
        let id = store.insert_encounter(encounter("20250001", patient.get(), None));
        let config = MigrationConfig::default();
        repair_encounter_codes(&mut store, &config).unwrap();
        let first = store.encounter_code_of(id).unwrap().to_string();
        let outcome = repair_encounter_codes(&mut store, &config).unwrap();
        assert_eq!(outcome.scanned, 0);
        assert_eq!(store.encounter_code_of(id), Some(first.as_str()));
    }

    #[test]
    fn test_repair_skips_unlinked_encounters() {
        let mut store = MemStore::new();
        let id = store.insert_encounter(encounter("20250001", 999, None));
        let outcome = repair_encounter_codes(&mut store, &MigrationConfig::default()).unwrap();
        assert_eq!(outcome.skipped, 1);
        assert_eq!(store.encounter_code_of(id), Some("20250001"));
    }

    #[test]
    fn test_suffix_attempts_are_bounded() {
        let mut store = MemStore::new();
        let patient = seed_patient(&mut store, "MIG-55");
        store.insert_encounter(encounter("MIG-55-20250001", patient.get(), None));
        store.insert_encounter(encounter("MIG-55-20250001-2", patient.get(), None));
        store.insert_encounter(encounter("MIG-55-20250001-3", patient.get(), None));
        let id = store.insert_encounter(encounter("20250001", patient.get(), None));
        let config = MigrationConfig {
            max_code_suffix_attempts: 2,
            ..MigrationConfig::default()
        };
        let outcome = repair_encounter_codes(&mut store, &config).unwrap();
        assert_eq!(outcome.repaired, 0);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].contains("2 suffix attempts"));
        assert_eq!(store.encounter_code_of(id), Some("20250001"));
    }
}
