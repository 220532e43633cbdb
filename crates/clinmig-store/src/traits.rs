//! Query capabilities the migration core requires of the store.

use clinmig_model::{
    ConflictPolicy, EncounterId, MatchCandidate, NewEncounter, NewPatient, PatientRecord, TenantId,
};

use crate::error::StoreError;

/// Patient-side queries. All lookups are tenant-scoped and see only
/// non-deleted records; candidate lists come back in a stable order
/// (stored name, then row id) so matching stays deterministic.
pub trait PatientStore {
    /// Case-insensitive equality with the stored display name.
    fn find_exact(
        &mut self,
        tenant: TenantId,
        name: &str,
    ) -> Result<Option<MatchCandidate>, StoreError>;

    /// Stored name contains the input as a case-insensitive substring, or the
    /// input contains the stored name.
    fn find_substring(
        &mut self,
        tenant: TenantId,
        name: &str,
    ) -> Result<Option<MatchCandidate>, StoreError>;

    /// Up to `cap` records whose stored name contains `surname`.
    fn find_by_surname(
        &mut self,
        tenant: TenantId,
        surname: &str,
        cap: usize,
    ) -> Result<Vec<MatchCandidate>, StoreError>;

    /// Accent-insensitive substring comparison, evaluated store-side.
    fn find_accent_insensitive(
        &mut self,
        tenant: TenantId,
        name: &str,
    ) -> Result<Option<MatchCandidate>, StoreError>;

    /// Every non-deleted patient in scope, for deduplication.
    fn list_active(&mut self, tenant: TenantId) -> Result<Vec<PatientRecord>, StoreError>;

    /// Insert a batch atomically; `Upsert` updates every non-key column of a
    /// conflicting row instead of failing.
    fn insert_patients(
        &mut self,
        rows: &[NewPatient],
        policy: ConflictPolicy,
    ) -> Result<usize, StoreError>;
}

/// Encounter-side queries.
pub trait EncounterStore {
    fn encounter_code_exists(
        &mut self,
        tenant: TenantId,
        code: &str,
    ) -> Result<bool, StoreError>;

    /// Existence check that ignores the row being repaired.
    fn encounter_code_in_use_by_other(
        &mut self,
        tenant: TenantId,
        code: &str,
        id: EncounterId,
    ) -> Result<bool, StoreError>;

    /// Lexicographically greatest code starting with `prefix` in scope.
    fn max_encounter_code_with_prefix(
        &mut self,
        tenant: TenantId,
        prefix: &str,
    ) -> Result<Option<String>, StoreError>;

    fn insert_encounters(&mut self, rows: &[NewEncounter]) -> Result<usize, StoreError>;

    /// Codes still in the legacy hyphen-less form, with the linked patient's
    /// code and the encounter year when available.
    fn list_unprefixed_codes(
        &mut self,
        tenant: TenantId,
    ) -> Result<Vec<LegacyEncounterCode>, StoreError>;

    fn rewrite_encounter_code(
        &mut self,
        id: EncounterId,
        code: &str,
    ) -> Result<(), StoreError>;
}

/// A malformed legacy code awaiting repair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyEncounterCode {
    pub id: EncounterId,
    pub code: String,
    pub patient_code: Option<String>,
    pub year: Option<i32>,
}
