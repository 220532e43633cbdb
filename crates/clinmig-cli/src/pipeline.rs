//! Migration orchestrator.
//!
//! Drives the batch runs over a loaded [`RowSet`]: transform and validate
//! each row, resolve patient links, allocate codes, and write in batches of
//! `config.batch_size`. Statistics travel in an explicit [`RunStats`]
//! accumulator that every stage receives and the caller gets back; a failed
//! batch is counted and the run continues with the next one.

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use clinmig_ingest::{Row, RowSet, schema};
use clinmig_match::{next_encounter_code, patient_code, resolve};
use clinmig_model::{
    DuplicateGroup, InsuranceSlot, MigrationConfig, NewEncounter, NewPatient, RunMode, RunStats,
};
use clinmig_normalize::{
    clean_text, month_number, normalize_category, normalize_sex, parse_boolean,
    parse_flexible_date, parse_money, validate_birth_date, validate_email, validate_national_id,
    validate_postal_code,
};
use clinmig_store::{EncounterStore, PatientStore, StoreError};

use crate::logging::redact_value;

/// Transform the patient export into insert payloads.
///
/// Rows without a legacy identifier or a name are counted and skipped; every
/// field-level rejection is a warning and the record proceeds with that field
/// absent. Duplicate patient codes within the batch are suffixed after the
/// scan so re-runs assign the same codes.
pub fn transform_patients(table: &RowSet, config: &MigrationConfig) -> (Vec<NewPatient>, RunStats) {
    let mut stats = RunStats::default();
    let mut rows = Vec::new();
    for row in table.rows() {
        stats.total += 1;
        let Some(legacy_id) = row.value(schema::patient::LEGACY_ID) else {
            stats.skipped += 1;
            continue;
        };
        let Some(name) = clean_text(row.value(schema::patient::NAME).unwrap_or(""), 255) else {
            debug!(line = row.line_number(), "patient row without a name, skipping");
            stats.skipped += 1;
            continue;
        };
        rows.push(patient_from_row(&row, legacy_id, name, config, &mut stats));
    }
    let suffixed = clinmig_match::disambiguate_patient_codes(&mut rows);
    if suffixed > 0 {
        warn!(count = suffixed, "duplicate legacy identifiers suffixed");
        stats
            .field_warnings
            .insert("duplicate_patient_code".to_string(), suffixed);
    }
    (rows, stats)
}

fn patient_from_row(
    row: &Row<'_>,
    legacy_id: &str,
    name: String,
    config: &MigrationConfig,
    stats: &mut RunStats,
) -> NewPatient {
    use schema::patient as col;

    let birth_date = row.value(col::BIRTH_DATE).and_then(|raw| {
        validate_birth_date(raw, config.min_birth_date, config.reference_date)
            .map_err(|_| stats.record_field_warning("birth_date"))
            .ok()
    });
    let national_id = row.value(col::NATIONAL_ID).and_then(|raw| {
        validate_national_id(raw)
            .map_err(|_| stats.record_field_warning("national_id"))
            .ok()
    });
    let email = row.value(col::EMAIL).and_then(|raw| {
        validate_email(raw)
            .map_err(|_| stats.record_field_warning("email"))
            .ok()
    });
    NewPatient {
        tenant: config.tenant,
        patient_code: patient_code(legacy_id),
        legacy_code: Some(legacy_id.to_string()),
        name,
        birth_date,
        sex: row.value(col::SEX).and_then(normalize_sex),
        national_id,
        mother_name: row.value(col::MOTHER_NAME).and_then(|raw| clean_text(raw, 255)),
        email,
        phone: row.value(col::PHONE).and_then(|raw| clean_text(raw, 20)),
        street: row.value(col::STREET).and_then(|raw| clean_text(raw, 500)),
        district: row.value(col::DISTRICT).and_then(|raw| clean_text(raw, 100)),
        postal_code: row.value(col::POSTAL_CODE).map(validate_postal_code),
        city: row.value(col::CITY).and_then(|raw| clean_text(raw, 100)),
        state: row
            .value(col::STATE)
            .and_then(|raw| clean_text(raw, 2))
            .map(|state| state.to_uppercase()),
        country: row
            .value(col::COUNTRY)
            .and_then(|raw| clean_text(raw, 100))
            .or_else(|| Some("Brasil".to_string())),
        primary_insurance: InsuranceSlot {
            // Known insurer spellings map to their canonical value; unknown
            // ones survive verbatim.
            insurer: row.value(col::INSURER_1).map(|raw| {
                config
                    .vocabulary
                    .patient_insurers
                    .resolve(raw)
                    .map_or_else(|| raw.to_string(), str::to_string)
            }),
            plan: row.value(col::PLAN_1).and_then(|raw| clean_text(raw, 100)),
            member_code: row.value(col::MEMBER_CODE_1).and_then(|raw| clean_text(raw, 100)),
            active: parse_boolean(row.value(col::ACTIVE_1).unwrap_or("")),
            private: parse_boolean(row.value(col::PRIVATE_1).unwrap_or("")),
        },
        secondary_insurance: InsuranceSlot {
            insurer: row.value(col::INSURER_2).and_then(|raw| clean_text(raw, 100)),
            plan: row.value(col::PLAN_2).and_then(|raw| clean_text(raw, 100)),
            member_code: row.value(col::MEMBER_CODE_2).and_then(|raw| clean_text(raw, 100)),
            active: parse_boolean(row.value(col::ACTIVE_2).unwrap_or("")),
            private: parse_boolean(row.value(col::PRIVATE_2).unwrap_or("")),
        },
        deceased_or_lost: parse_boolean(row.value(col::DECEASED_OR_LOST).unwrap_or("")),
        case_status: row
            .value(col::CASE_STATUS)
            .and_then(|raw| clean_text(raw, 50))
            .unwrap_or_else(|| "Ativo".to_string()),
    }
}

/// Insert transformed patients in batches, accumulating into `stats`.
pub fn insert_patients<S: PatientStore>(
    store: &mut S,
    rows: &[NewPatient],
    config: &MigrationConfig,
    stats: &mut RunStats,
) {
    let progress = row_progress(rows.len(), "patients");
    for (index, batch) in rows.chunks(config.batch_size.max(1)).enumerate() {
        if config.mode == RunMode::Simulate {
            stats.succeeded += batch.len();
        } else {
            match store.insert_patients(batch, config.conflict_policy) {
                Ok(written) => stats.succeeded += written,
                Err(error) => stats.record_error(format!("patient batch {}: {error}", index + 1)),
            }
        }
        progress.inc(batch.len() as u64);
    }
    progress.finish_and_clear();
}

/// Full patient run: transform, then batched insert.
pub fn migrate_patients<S: PatientStore>(
    store: &mut S,
    table: &RowSet,
    config: &MigrationConfig,
) -> RunStats {
    let (rows, mut stats) = transform_patients(table, config);
    insert_patients(store, &rows, config, &mut stats);
    stats
}

/// Full encounter run.
///
/// Each row resolves its patient through the matching cascade; misses, code
/// duplicates, and unparseable dates are counted per the row and never abort
/// the run. Writes go out in batches of `config.batch_size`.
pub fn migrate_encounters<S: PatientStore + EncounterStore>(
    store: &mut S,
    table: &RowSet,
    config: &MigrationConfig,
) -> RunStats {
    use schema::encounter as col;

    let mut stats = RunStats::default();
    let mut pending: Vec<NewEncounter> = Vec::new();
    // Codes inserted earlier in this run are not yet visible to the store in
    // batch gaps, so track them here too.
    let mut seen_codes = std::collections::BTreeSet::new();
    let progress = row_progress(table.len(), "encounters");

    for row in table.rows() {
        stats.total += 1;
        progress.inc(1);

        let Some(name) = row.value(col::PATIENT_NAME) else {
            stats.record_error(format!("linha {}: nome do paciente vazio", row.line_number()));
            continue;
        };

        let (date, month, year) = encounter_date(&row);
        if date.is_none() {
            stats.invalid_date += 1;
            debug!(
                line = row.line_number(),
                patient = redact_value(name),
                "encounter date missing or unparseable"
            );
        }

        let linked = match resolve(store, config.tenant, name) {
            Ok(linked) => linked,
            Err(error) => {
                stats.record_error(format!("linha {}: {error}", row.line_number()));
                continue;
            }
        };
        let Some(linked) = linked else {
            debug!(
                line = row.line_number(),
                patient = redact_value(name),
                "patient not found"
            );
            stats.record_unmatched(name);
            continue;
        };
        debug!(
            line = row.line_number(),
            patient = redact_value(name),
            strategy = linked.strategy.as_str(),
            "patient resolved"
        );

        let code = match encounter_code(store, &row, &linked.candidate.patient_code, year, config) {
            Ok(code) => code,
            Err(message) => {
                stats.record_error(message);
                continue;
            }
        };
        match store.encounter_code_exists(config.tenant, &code) {
            Ok(exists) => {
                if exists || seen_codes.contains(&code) {
                    debug!(code = %code, "duplicate encounter code, skipping");
                    stats.duplicate += 1;
                    continue;
                }
            }
            Err(error) => {
                stats.record_error(format!("linha {}: {error}", row.line_number()));
                continue;
            }
        }
        seen_codes.insert(code.clone());

        pending.push(encounter_from_row(&row, code, &linked, name, month, year, date, config));
        if pending.len() >= config.batch_size.max(1) {
            flush_encounters(store, &mut pending, config, &mut stats);
        }
    }
    flush_encounters(store, &mut pending, config, &mut stats);
    progress.finish_and_clear();
    stats
}

/// Date of an encounter row, with the `Mes`/`Ano` auxiliary columns as a
/// fallback (first day of the month) when the date column fails to parse.
fn encounter_date(row: &Row<'_>) -> (Option<chrono::NaiveDate>, Option<u32>, Option<i32>) {
    use chrono::Datelike;
    use schema::encounter as col;

    if let Some(date) = row.value(col::DATE).and_then(parse_flexible_date) {
        return (Some(date), Some(date.month()), Some(date.year()));
    }
    let month = row.value(col::MONTH).and_then(month_number);
    let year = row.value(col::YEAR).and_then(parse_integer::<i32>);
    let date = match (month, year) {
        (Some(month), Some(year)) => chrono::NaiveDate::from_ymd_opt(year, month, 1),
        _ => None,
    };
    (date, month, year)
}

/// Row code when present (spreadsheet floats carry a `.0` artifact), next
/// allocated code for the patient's year otherwise.
fn encounter_code<S: EncounterStore>(
    store: &mut S,
    row: &Row<'_>,
    patient: &str,
    year: Option<i32>,
    config: &MigrationConfig,
) -> Result<String, String> {
    if let Some(code) = row.value(schema::encounter::CODE) {
        let code = code.strip_suffix(".0").unwrap_or(code).trim();
        if !code.is_empty() {
            return Ok(code.to_string());
        }
    }
    let Some(year) = year else {
        return Err(format!(
            "linha {}: sem codigo de atendimento e sem ano para alocar um",
            row.line_number()
        ));
    };
    next_encounter_code(store, config.tenant, patient, year)
        .map_err(|error| format!("linha {}: {error}", row.line_number()))
}

#[allow(clippy::too_many_arguments)]
fn encounter_from_row(
    row: &Row<'_>,
    code: String,
    linked: &clinmig_model::NameMatch,
    name: &str,
    month: Option<u32>,
    year: Option<i32>,
    date: Option<chrono::NaiveDate>,
    config: &MigrationConfig,
) -> NewEncounter {
    use schema::encounter as col;

    NewEncounter {
        tenant: config.tenant,
        code,
        patient_id: linked.candidate.id,
        patient_name: name.to_string(),
        date,
        week: row.value(col::WEEK).and_then(parse_integer::<i32>),
        encounter_type: row
            .value(col::ENCOUNTER_TYPE)
            .and_then(|raw| normalize_category(raw, &config.vocabulary.encounter_types)),
        procedure: row.value(col::PROCEDURE).map(str::to_string),
        location: row
            .value(col::LOCATION)
            .and_then(|raw| normalize_category(raw, &config.vocabulary.locations)),
        insurer: row
            .value(col::INSURER)
            .and_then(|raw| normalize_category(raw, &config.vocabulary.insurers)),
        insurer_plan: row.value(col::INSURER_PLAN).map(str::to_string),
        private: parse_boolean(row.value(col::PRIVATE).unwrap_or("")),
        payment_made: parse_boolean(row.value(col::PAYMENT_MADE).unwrap_or("")),
        projected_billing: row.value(col::PROJECTED_BILLING).and_then(parse_money),
        manual_fee_record: row.value(col::MANUAL_FEE_RECORD).and_then(parse_money),
        final_projected_billing: row
            .value(col::FINAL_PROJECTED_BILLING)
            .and_then(parse_money),
        partner_billing_primary: row
            .value(col::PARTNER_BILLING_PRIMARY)
            .and_then(parse_money),
        partner_billing_secondary: row
            .value(col::PARTNER_BILLING_SECONDARY)
            .and_then(parse_money),
        billing_sent_date: row.value(col::BILLING_SENT_DATE).and_then(parse_flexible_date),
        expected_payment_date: row
            .value(col::EXPECTED_PAYMENT_DATE)
            .and_then(parse_flexible_date),
        payment_date: row.value(col::PAYMENT_DATE).and_then(parse_flexible_date),
        invoice_ref: row.value(col::INVOICE_REF).map(str::to_string),
        notes: row.value(col::NOTES).map(str::to_string),
        month,
        year,
        quarter: row.value(col::QUARTER).map(str::to_string),
        quarter_year: row.value(col::QUARTER_YEAR).map(str::to_string),
    }
}

fn flush_encounters<S: EncounterStore>(
    store: &mut S,
    pending: &mut Vec<NewEncounter>,
    config: &MigrationConfig,
    stats: &mut RunStats,
) {
    if pending.is_empty() {
        return;
    }
    if config.mode == RunMode::Simulate {
        stats.succeeded += pending.len();
    } else {
        match store.insert_encounters(pending) {
            Ok(written) => stats.succeeded += written,
            Err(error) => stats.record_error(format!("encounter batch: {error}")),
        }
    }
    pending.clear();
}

/// Scan the tenant's active patients for duplicate groups.
pub fn scan_duplicates<S: PatientStore>(
    store: &mut S,
    config: &MigrationConfig,
) -> Result<(usize, Vec<DuplicateGroup>), StoreError> {
    let patients = store.list_active(config.tenant)?;
    let groups = clinmig_match::find_duplicates(&patients);
    Ok((patients.len(), groups))
}

/// Numeric cell, tolerating the `.0` float artifact of spreadsheet exports.
fn parse_integer<T: std::str::FromStr>(raw: &str) -> Option<T> {
    let trimmed = raw.trim();
    trimmed.strip_suffix(".0").unwrap_or(trimmed).parse().ok()
}

fn row_progress(total: usize, label: &str) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    if let Ok(style) =
        ProgressStyle::with_template("{prefix} {bar:30} {pos}/{len} ({eta})")
    {
        progress.set_style(style);
    }
    progress.set_prefix(label.to_string());
    progress
}
