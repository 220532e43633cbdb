//! Deterministic in-memory store used by tests and offline simulation.
//!
//! Mirrors the Postgres implementation's observable behavior: tenant scoping,
//! soft-delete filtering, stable (name, id) candidate ordering, and atomic
//! batch inserts.

use std::collections::BTreeMap;

use chrono::Datelike;

use clinmig_model::{
    ConflictPolicy, EncounterId, MatchCandidate, NewEncounter, NewPatient, PatientId,
    PatientRecord, TenantId,
};
use clinmig_normalize::fold_diacritics;

use crate::error::StoreError;
use crate::traits::{EncounterStore, LegacyEncounterCode, PatientStore};

#[derive(Debug, Clone)]
struct StoredPatient {
    row: NewPatient,
    deleted: bool,
}

#[derive(Debug, Default)]
pub struct MemStore {
    next_patient_id: i64,
    next_encounter_id: i64,
    patients: BTreeMap<i64, StoredPatient>,
    encounters: BTreeMap<i64, NewEncounter>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one patient directly, bypassing batch semantics.
    pub fn insert_patient(&mut self, row: NewPatient) -> PatientId {
        self.next_patient_id += 1;
        let id = self.next_patient_id;
        self.patients.insert(id, StoredPatient { row, deleted: false });
        PatientId::new(id)
    }

    /// Seed one encounter directly.
    pub fn insert_encounter(&mut self, row: NewEncounter) -> EncounterId {
        self.next_encounter_id += 1;
        let id = self.next_encounter_id;
        self.encounters.insert(id, row);
        EncounterId::new(id)
    }

    /// Mark a patient soft-deleted; it disappears from every lookup.
    pub fn soft_delete(&mut self, id: PatientId) {
        if let Some(stored) = self.patients.get_mut(&id.get()) {
            stored.deleted = true;
        }
    }

    pub fn encounter_by_code(&self, tenant: TenantId, code: &str) -> Option<&NewEncounter> {
        self.encounters
            .values()
            .find(|row| row.tenant == tenant && row.code == code)
    }

    pub fn encounter_code_of(&self, id: EncounterId) -> Option<&str> {
        self.encounters.get(&id.get()).map(|row| row.code.as_str())
    }

    /// Active candidates in the stable (name, id) order the queries promise.
    fn candidates(&self, tenant: TenantId) -> Vec<(i64, &NewPatient)> {
        let mut active: Vec<(i64, &NewPatient)> = self
            .patients
            .iter()
            .filter(|(_, stored)| !stored.deleted && stored.row.tenant == tenant)
            .map(|(id, stored)| (*id, &stored.row))
            .collect();
        active.sort_by(|a, b| (&a.1.name, a.0).cmp(&(&b.1.name, b.0)));
        active
    }
}

fn candidate(id: i64, row: &NewPatient) -> MatchCandidate {
    MatchCandidate {
        id: PatientId::new(id),
        patient_code: row.patient_code.clone(),
        name: row.name.clone(),
        legacy_code: row.legacy_code.clone(),
    }
}

impl PatientStore for MemStore {
    fn find_exact(
        &mut self,
        tenant: TenantId,
        name: &str,
    ) -> Result<Option<MatchCandidate>, StoreError> {
        let needle = name.to_lowercase();
        Ok(self
            .candidates(tenant)
            .into_iter()
            .find(|(_, row)| row.name.to_lowercase() == needle)
            .map(|(id, row)| candidate(id, row)))
    }

    fn find_substring(
        &mut self,
        tenant: TenantId,
        name: &str,
    ) -> Result<Option<MatchCandidate>, StoreError> {
        let needle = name.to_lowercase();
        Ok(self
            .candidates(tenant)
            .into_iter()
            .find(|(_, row)| {
                let stored = row.name.to_lowercase();
                stored.contains(&needle) || needle.contains(&stored)
            })
            .map(|(id, row)| candidate(id, row)))
    }

    fn find_by_surname(
        &mut self,
        tenant: TenantId,
        surname: &str,
        cap: usize,
    ) -> Result<Vec<MatchCandidate>, StoreError> {
        let needle = surname.to_lowercase();
        Ok(self
            .candidates(tenant)
            .into_iter()
            .filter(|(_, row)| row.name.to_lowercase().contains(&needle))
            .take(cap)
            .map(|(id, row)| candidate(id, row))
            .collect())
    }

    fn find_accent_insensitive(
        &mut self,
        tenant: TenantId,
        name: &str,
    ) -> Result<Option<MatchCandidate>, StoreError> {
        let needle = fold_diacritics(&name.to_lowercase());
        Ok(self
            .candidates(tenant)
            .into_iter()
            .find(|(_, row)| fold_diacritics(&row.name.to_lowercase()).contains(&needle))
            .map(|(id, row)| candidate(id, row)))
    }

    fn list_active(&mut self, tenant: TenantId) -> Result<Vec<PatientRecord>, StoreError> {
        Ok(self
            .candidates(tenant)
            .into_iter()
            .map(|(id, row)| PatientRecord {
                id: PatientId::new(id),
                tenant,
                patient_code: row.patient_code.clone(),
                legacy_code: row.legacy_code.clone(),
                name: row.name.clone(),
                birth_date: row.birth_date,
                national_id: row.national_id.clone(),
                email: row.email.clone(),
                phone: row.phone.clone(),
            })
            .collect())
    }

    fn insert_patients(
        &mut self,
        rows: &[NewPatient],
        policy: ConflictPolicy,
    ) -> Result<usize, StoreError> {
        // Validate the whole batch before touching state, so a conflict
        // leaves nothing half-applied.
        if policy == ConflictPolicy::Insert {
            for row in rows {
                let exists = self.patients.values().any(|stored| {
                    stored.row.tenant == row.tenant
                        && stored.row.patient_code == row.patient_code
                });
                if exists {
                    return Err(StoreError::DuplicateKey(row.patient_code.clone()));
                }
            }
        }
        for row in rows {
            let existing = self.patients.iter().find_map(|(id, stored)| {
                (stored.row.tenant == row.tenant
                    && stored.row.patient_code == row.patient_code)
                    .then_some(*id)
            });
            match existing {
                Some(id) => {
                    self.patients.insert(
                        id,
                        StoredPatient {
                            row: row.clone(),
                            deleted: false,
                        },
                    );
                }
                None => {
                    self.insert_patient(row.clone());
                }
            }
        }
        Ok(rows.len())
    }
}

impl EncounterStore for MemStore {
    fn encounter_code_exists(
        &mut self,
        tenant: TenantId,
        code: &str,
    ) -> Result<bool, StoreError> {
        Ok(self.encounter_by_code(tenant, code).is_some())
    }

    fn encounter_code_in_use_by_other(
        &mut self,
        tenant: TenantId,
        code: &str,
        id: EncounterId,
    ) -> Result<bool, StoreError> {
        Ok(self
            .encounters
            .iter()
            .any(|(row_id, row)| {
                *row_id != id.get() && row.tenant == tenant && row.code == code
            }))
    }

    fn max_encounter_code_with_prefix(
        &mut self,
        tenant: TenantId,
        prefix: &str,
    ) -> Result<Option<String>, StoreError> {
        Ok(self
            .encounters
            .values()
            .filter(|row| row.tenant == tenant && row.code.starts_with(prefix))
            .map(|row| row.code.clone())
            .max())
    }

    fn insert_encounters(&mut self, rows: &[NewEncounter]) -> Result<usize, StoreError> {
        for row in rows {
            if self.encounter_by_code(row.tenant, &row.code).is_some() {
                return Err(StoreError::DuplicateKey(row.code.clone()));
            }
        }
        for row in rows {
            self.insert_encounter(row.clone());
        }
        Ok(rows.len())
    }

    fn list_unprefixed_codes(
        &mut self,
        tenant: TenantId,
    ) -> Result<Vec<LegacyEncounterCode>, StoreError> {
        Ok(self
            .encounters
            .iter()
            .filter(|(_, row)| row.tenant == tenant && !row.code.contains('-'))
            .map(|(id, row)| LegacyEncounterCode {
                id: EncounterId::new(*id),
                code: row.code.clone(),
                patient_code: self
                    .patients
                    .get(&row.patient_id.get())
                    .map(|stored| stored.row.patient_code.clone()),
                year: row.date.map(|date| date.year()),
            })
            .collect())
    }

    fn rewrite_encounter_code(
        &mut self,
        id: EncounterId,
        code: &str,
    ) -> Result<(), StoreError> {
        if let Some(row) = self.encounters.get_mut(&id.get()) {
            row.code = code.to_string();
        }
        Ok(())
    }
}
