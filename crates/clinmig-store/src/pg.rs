//! Blocking Postgres implementation of the store traits.
//!
//! The accent-insensitive search relies on the `unaccent` extension being
//! installed in the target database. Money columns hold integer cents.

use native_tls::TlsConnector;
use postgres::{Client, NoTls};
use postgres_native_tls::MakeTlsConnector;
use tracing::{debug, info};

use clinmig_model::{
    ConflictPolicy, EncounterId, MatchCandidate, NewEncounter, NewPatient, PatientId,
    PatientRecord, Sex, TenantId,
};

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::traits::{EncounterStore, LegacyEncounterCode, PatientStore};

pub struct PgStore {
    client: Client,
}

const PATIENT_INSERT_COLUMNS: &str = "tenant_id, patient_code, legacy_code, name, birth_date, \
     sex, national_id, mother_name, email, phone, street, district, postal_code, city, state, \
     country, insurer_1, plan_1, member_code_1, active_1, private_1, insurer_2, plan_2, \
     member_code_2, active_2, private_2, deceased_or_lost, case_status";

const PATIENT_UPSERT_CLAUSE: &str = "ON CONFLICT (tenant_id, patient_code) DO UPDATE SET \
     legacy_code = EXCLUDED.legacy_code, name = EXCLUDED.name, \
     birth_date = EXCLUDED.birth_date, sex = EXCLUDED.sex, \
     national_id = EXCLUDED.national_id, mother_name = EXCLUDED.mother_name, \
     email = EXCLUDED.email, phone = EXCLUDED.phone, street = EXCLUDED.street, \
     district = EXCLUDED.district, postal_code = EXCLUDED.postal_code, \
     city = EXCLUDED.city, state = EXCLUDED.state, country = EXCLUDED.country, \
     insurer_1 = EXCLUDED.insurer_1, plan_1 = EXCLUDED.plan_1, \
     member_code_1 = EXCLUDED.member_code_1, active_1 = EXCLUDED.active_1, \
     private_1 = EXCLUDED.private_1, insurer_2 = EXCLUDED.insurer_2, \
     plan_2 = EXCLUDED.plan_2, member_code_2 = EXCLUDED.member_code_2, \
     active_2 = EXCLUDED.active_2, private_2 = EXCLUDED.private_2, \
     deceased_or_lost = EXCLUDED.deceased_or_lost, case_status = EXCLUDED.case_status";

const ENCOUNTER_INSERT_COLUMNS: &str = "tenant_id, code, patient_id, patient_name, \
     encounter_date, week, encounter_type, procedure_name, location, insurer, insurer_plan, \
     private, payment_made, projected_billing, manual_fee_record, final_projected_billing, \
     partner_billing_primary, partner_billing_secondary, billing_sent_date, \
     expected_payment_date, payment_date, invoice_ref, notes, month, year, quarter, quarter_year";

impl PgStore {
    /// Open a connection; the caller treats a failure here as fatal.
    pub fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let params = config.connection_params();
        let client = if config.tls {
            let connector = TlsConnector::builder()
                .danger_accept_invalid_certs(true)
                .build()?;
            Client::connect(&params, MakeTlsConnector::new(connector))?
        } else {
            Client::connect(&params, NoTls)?
        };
        info!(
            host = %config.host,
            database = %config.database,
            tls = config.tls,
            "connected to store"
        );
        Ok(Self { client })
    }

    fn find_candidate(
        &mut self,
        sql: &str,
        tenant: TenantId,
        name: &str,
    ) -> Result<Option<MatchCandidate>, StoreError> {
        let row = self.client.query_opt(sql, &[&tenant.get(), &name])?;
        Ok(row.map(|row| candidate_from_row(&row)))
    }
}

fn candidate_from_row(row: &postgres::Row) -> MatchCandidate {
    MatchCandidate {
        id: PatientId::new(row.get(0)),
        patient_code: row.get(1),
        name: row.get(2),
        legacy_code: row.get(3),
    }
}

impl PatientStore for PgStore {
    fn find_exact(
        &mut self,
        tenant: TenantId,
        name: &str,
    ) -> Result<Option<MatchCandidate>, StoreError> {
        self.find_candidate(
            "SELECT id, patient_code, name, legacy_code FROM patients \
             WHERE tenant_id = $1 AND deleted_at IS NULL AND LOWER(name) = LOWER($2) \
             ORDER BY name, id LIMIT 1",
            tenant,
            name,
        )
    }

    fn find_substring(
        &mut self,
        tenant: TenantId,
        name: &str,
    ) -> Result<Option<MatchCandidate>, StoreError> {
        self.find_candidate(
            "SELECT id, patient_code, name, legacy_code FROM patients \
             WHERE tenant_id = $1 AND deleted_at IS NULL \
               AND (LOWER(name) LIKE '%' || LOWER($2) || '%' \
                    OR LOWER($2) LIKE '%' || LOWER(name) || '%') \
             ORDER BY name, id LIMIT 1",
            tenant,
            name,
        )
    }

    fn find_by_surname(
        &mut self,
        tenant: TenantId,
        surname: &str,
        cap: usize,
    ) -> Result<Vec<MatchCandidate>, StoreError> {
        let rows = self.client.query(
            "SELECT id, patient_code, name, legacy_code FROM patients \
             WHERE tenant_id = $1 AND deleted_at IS NULL \
               AND LOWER(name) LIKE '%' || LOWER($2) || '%' \
             ORDER BY name, id LIMIT $3",
            &[&tenant.get(), &surname, &(cap as i64)],
        )?;
        Ok(rows.iter().map(candidate_from_row).collect())
    }

    fn find_accent_insensitive(
        &mut self,
        tenant: TenantId,
        name: &str,
    ) -> Result<Option<MatchCandidate>, StoreError> {
        self.find_candidate(
            "SELECT id, patient_code, name, legacy_code FROM patients \
             WHERE tenant_id = $1 AND deleted_at IS NULL \
               AND unaccent(LOWER(name)) LIKE '%' || unaccent(LOWER($2)) || '%' \
             ORDER BY name, id LIMIT 1",
            tenant,
            name,
        )
    }

    fn list_active(&mut self, tenant: TenantId) -> Result<Vec<PatientRecord>, StoreError> {
        let rows = self.client.query(
            "SELECT id, patient_code, legacy_code, name, birth_date, national_id, email, phone \
             FROM patients WHERE tenant_id = $1 AND deleted_at IS NULL ORDER BY name, id",
            &[&tenant.get()],
        )?;
        Ok(rows
            .iter()
            .map(|row| PatientRecord {
                id: PatientId::new(row.get(0)),
                tenant,
                patient_code: row.get(1),
                legacy_code: row.get(2),
                name: row.get(3),
                birth_date: row.get(4),
                national_id: row.get(5),
                email: row.get(6),
                phone: row.get(7),
            })
            .collect())
    }

    fn insert_patients(
        &mut self,
        rows: &[NewPatient],
        policy: ConflictPolicy,
    ) -> Result<usize, StoreError> {
        let placeholders = placeholder_list(28);
        let sql = match policy {
            ConflictPolicy::Insert => format!(
                "INSERT INTO patients ({PATIENT_INSERT_COLUMNS}) VALUES ({placeholders})"
            ),
            ConflictPolicy::Upsert => format!(
                "INSERT INTO patients ({PATIENT_INSERT_COLUMNS}) VALUES ({placeholders}) \
                 {PATIENT_UPSERT_CLAUSE}"
            ),
        };
        let mut tx = self.client.transaction()?;
        let statement = tx.prepare(&sql)?;
        for row in rows {
            let sex = row.sex.map(Sex::as_code);
            tx.execute(
                &statement,
                &[
                    &row.tenant.get(),
                    &row.patient_code,
                    &row.legacy_code,
                    &row.name,
                    &row.birth_date,
                    &sex,
                    &row.national_id,
                    &row.mother_name,
                    &row.email,
                    &row.phone,
                    &row.street,
                    &row.district,
                    &row.postal_code,
                    &row.city,
                    &row.state,
                    &row.country,
                    &row.primary_insurance.insurer,
                    &row.primary_insurance.plan,
                    &row.primary_insurance.member_code,
                    &row.primary_insurance.active,
                    &row.primary_insurance.private,
                    &row.secondary_insurance.insurer,
                    &row.secondary_insurance.plan,
                    &row.secondary_insurance.member_code,
                    &row.secondary_insurance.active,
                    &row.secondary_insurance.private,
                    &row.deceased_or_lost,
                    &row.case_status,
                ],
            )?;
        }
        tx.commit()?;
        debug!(rows = rows.len(), "patient batch committed");
        Ok(rows.len())
    }
}

impl EncounterStore for PgStore {
    fn encounter_code_exists(
        &mut self,
        tenant: TenantId,
        code: &str,
    ) -> Result<bool, StoreError> {
        let row = self.client.query_opt(
            "SELECT 1 FROM encounters WHERE tenant_id = $1 AND code = $2 LIMIT 1",
            &[&tenant.get(), &code],
        )?;
        Ok(row.is_some())
    }

    fn encounter_code_in_use_by_other(
        &mut self,
        tenant: TenantId,
        code: &str,
        id: EncounterId,
    ) -> Result<bool, StoreError> {
        let row = self.client.query_opt(
            "SELECT 1 FROM encounters \
             WHERE tenant_id = $1 AND code = $2 AND id <> $3 LIMIT 1",
            &[&tenant.get(), &code, &id.get()],
        )?;
        Ok(row.is_some())
    }

    fn max_encounter_code_with_prefix(
        &mut self,
        tenant: TenantId,
        prefix: &str,
    ) -> Result<Option<String>, StoreError> {
        let pattern = format!("{prefix}%");
        let row = self.client.query_opt(
            "SELECT code FROM encounters WHERE tenant_id = $1 AND code LIKE $2 \
             ORDER BY code DESC LIMIT 1",
            &[&tenant.get(), &pattern],
        )?;
        Ok(row.map(|row| row.get(0)))
    }

    fn insert_encounters(&mut self, rows: &[NewEncounter]) -> Result<usize, StoreError> {
        let placeholders = placeholder_list(27);
        let sql = format!(
            "INSERT INTO encounters ({ENCOUNTER_INSERT_COLUMNS}) VALUES ({placeholders})"
        );
        let mut tx = self.client.transaction()?;
        let statement = tx.prepare(&sql)?;
        for row in rows {
            let money = [
                row.projected_billing,
                row.manual_fee_record,
                row.final_projected_billing,
                row.partner_billing_primary,
                row.partner_billing_secondary,
            ]
            .map(|value| value.map(clinmig_model::Money::cents));
            let month = row.month.map(|month| month as i32);
            tx.execute(
                &statement,
                &[
                    &row.tenant.get(),
                    &row.code,
                    &row.patient_id.get(),
                    &row.patient_name,
                    &row.date,
                    &row.week,
                    &row.encounter_type,
                    &row.procedure,
                    &row.location,
                    &row.insurer,
                    &row.insurer_plan,
                    &row.private,
                    &row.payment_made,
                    &money[0],
                    &money[1],
                    &money[2],
                    &money[3],
                    &money[4],
                    &row.billing_sent_date,
                    &row.expected_payment_date,
                    &row.payment_date,
                    &row.invoice_ref,
                    &row.notes,
                    &month,
                    &row.year,
                    &row.quarter,
                    &row.quarter_year,
                ],
            )?;
        }
        tx.commit()?;
        debug!(rows = rows.len(), "encounter batch committed");
        Ok(rows.len())
    }

    fn list_unprefixed_codes(
        &mut self,
        tenant: TenantId,
    ) -> Result<Vec<LegacyEncounterCode>, StoreError> {
        let rows = self.client.query(
            "SELECT e.id, e.code, p.patient_code, \
                    CAST(EXTRACT(YEAR FROM e.encounter_date) AS INT) \
             FROM encounters e \
             LEFT JOIN patients p ON e.patient_id = p.id \
             WHERE e.tenant_id = $1 AND e.code NOT LIKE '%-%' \
             ORDER BY e.id",
            &[&tenant.get()],
        )?;
        Ok(rows
            .iter()
            .map(|row| LegacyEncounterCode {
                id: EncounterId::new(row.get(0)),
                code: row.get(1),
                patient_code: row.get(2),
                year: row.get(3),
            })
            .collect())
    }

    fn rewrite_encounter_code(
        &mut self,
        id: EncounterId,
        code: &str,
    ) -> Result<(), StoreError> {
        self.client.execute(
            "UPDATE encounters SET code = $2 WHERE id = $1",
            &[&id.get(), &code],
        )?;
        Ok(())
    }
}

fn placeholder_list(count: usize) -> String {
    (1..=count)
        .map(|index| format!("${index}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_list() {
        assert_eq!(placeholder_list(3), "$1, $2, $3");
    }
}
