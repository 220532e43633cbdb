//! Name resolution cascade.
//!
//! Links a free-text patient name from an encounter row to a stored patient
//! record. Strategies are attempted in order and each is tried only when the
//! previous one yields nothing; all lookups run against non-deleted records in
//! the tenant scope and come back in a stable order, so identical inputs
//! against an unchanged patient set always produce the same result.

use tracing::debug;

use clinmig_model::{MatchStrategy, NameMatch, TenantId};
use clinmig_normalize::normalize_name;
use clinmig_store::PatientStore;

use crate::MatchError;

/// Candidate-set cap for the surname-anchored strategy.
pub const SURNAME_CANDIDATE_CAP: usize = 5;

/// Resolve `raw_name` to a stored patient, or `None` when every strategy
/// misses.
///
/// The returned [`NameMatch`] carries the strategy that fired so callers can
/// tell a confident link from a best-effort one.
pub fn resolve<S: PatientStore>(
    store: &mut S,
    tenant: TenantId,
    raw_name: &str,
) -> Result<Option<NameMatch>, MatchError> {
    let name = raw_name.trim();
    if name.is_empty() {
        return Ok(None);
    }

    if let Some(candidate) = store.find_exact(tenant, name)? {
        return Ok(Some(NameMatch {
            candidate,
            strategy: MatchStrategy::Exact,
        }));
    }

    if let Some(candidate) = store.find_substring(tenant, name)? {
        return Ok(Some(NameMatch {
            candidate,
            strategy: MatchStrategy::Substring,
        }));
    }

    if let Some(found) = resolve_by_surname(store, tenant, name)? {
        return Ok(Some(found));
    }

    Ok(store
        .find_accent_insensitive(tenant, name)?
        .map(|candidate| NameMatch {
            candidate,
            strategy: MatchStrategy::AccentInsensitive,
        }))
}

/// Anchor on the last input token and refine a capped candidate set by the
/// normalized first token.
fn resolve_by_surname<S: PatientStore>(
    store: &mut S,
    tenant: TenantId,
    name: &str,
) -> Result<Option<NameMatch>, MatchError> {
    let tokens: Vec<&str> = name.split_whitespace().collect();
    let Some(surname) = tokens.last() else {
        return Ok(None);
    };
    if tokens.len() < 2 {
        // A single token already failed the substring strategy; anchoring on
        // it again would scan the same rows.
        return Ok(None);
    }

    let candidates = store.find_by_surname(tenant, surname, SURNAME_CANDIDATE_CAP)?;
    if candidates.is_empty() {
        return Ok(None);
    }
    if candidates.len() == 1 {
        return Ok(Some(NameMatch {
            candidate: candidates.into_iter().next().expect("len checked"),
            strategy: MatchStrategy::SurnameAnchor,
        }));
    }

    let first_token = normalize_name(tokens[0]);
    let refined = candidates.iter().find(|candidate| {
        candidate
            .name
            .split_whitespace()
            .next()
            .is_some_and(|token| normalize_name(token) == first_token)
    });
    let candidate = match refined {
        Some(candidate) => candidate.clone(),
        None => {
            // Best-effort tie-break: the first candidate under the stable
            // order, not a verified identity.
            let fallback = candidates[0].clone();
            debug!(
                surname,
                candidates = candidates.len(),
                patient_code = %fallback.patient_code,
                "surname anchor fell back to first candidate"
            );
            fallback
        }
    };
    Ok(Some(NameMatch {
        candidate,
        strategy: MatchStrategy::SurnameAnchor,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinmig_model::{NewPatient, TenantId};
    use clinmig_store::MemStore;

    fn patient(code: &str, name: &str) -> NewPatient {
        NewPatient {
            tenant: TenantId::new(1),
            patient_code: code.to_string(),
            legacy_code: None,
            name: name.to_string(),
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
        }
    }

    fn tenant() -> TenantId {
        TenantId::new(1)
    }

    #[test]
    fn test_exact_beats_substring() {
        let mut store = MemStore::new();
        store.insert_patient(patient("P1", "Maria Silva Costa"));
        store.insert_patient(patient("P2", "Maria Silva"));
        let hit = resolve(&mut store, tenant(), "maria silva").unwrap().unwrap();
        assert_eq!(hit.strategy, MatchStrategy::Exact);
        assert_eq!(hit.candidate.patient_code, "P2");
    }

    #[test]
    fn test_substring_match_when_no_exact() {
        let mut store = MemStore::new();
        store.insert_patient(patient("P1", "Maria da Silva Costa"));
        let hit = resolve(&mut store, tenant(), "da Silva").unwrap().unwrap();
        assert_eq!(hit.strategy, MatchStrategy::Substring);
        assert_eq!(hit.candidate.patient_code, "P1");
        // Input containing the stored name also counts.
        let mut store = MemStore::new();
        store.insert_patient(patient("P2", "Ana Costa"));
        let hit = resolve(&mut store, tenant(), "Ana Costa Pereira")
            .unwrap()
            .unwrap();
        assert_eq!(hit.strategy, MatchStrategy::Substring);
        assert_eq!(hit.candidate.patient_code, "P2");
    }

    #[test]
    fn test_dropped_connective_resolves_through_surname_anchor() {
        // "Maria Silva" is not a literal substring of "Maria da Silva", so the
        // link comes from the surname strategy refined by first token.
        let mut store = MemStore::new();
        store.insert_patient(patient("P1", "Maria da Silva"));
        store.insert_patient(patient("P2", "Pedro da Silva"));
        let hit = resolve(&mut store, tenant(), "Maria Silva").unwrap().unwrap();
        assert_eq!(hit.strategy, MatchStrategy::SurnameAnchor);
        assert_eq!(hit.candidate.patient_code, "P1");
    }

    #[test]
    fn test_surname_anchor_single_candidate() {
        let mut store = MemStore::new();
        store.insert_patient(patient("P1", "João Pereira Gonçalves"));
        store.insert_patient(patient("P2", "Ana Souza"));
        let hit = resolve(&mut store, tenant(), "Joao Gonçalves")
            .unwrap()
            .unwrap();
        assert_eq!(hit.strategy, MatchStrategy::SurnameAnchor);
        assert_eq!(hit.candidate.patient_code, "P1");
    }

    #[test]
    fn test_surname_anchor_refines_by_first_token() {
        let mut store = MemStore::new();
        store.insert_patient(patient("P1", "Ana Santos"));
        store.insert_patient(patient("P2", "Bruna Santos"));
        let hit = resolve(&mut store, tenant(), "Brúna Maria Santos")
            .unwrap()
            .unwrap();
        assert_eq!(hit.strategy, MatchStrategy::SurnameAnchor);
        assert_eq!(hit.candidate.patient_code, "P2");
    }

    #[test]
    fn test_surname_anchor_falls_back_to_first_candidate() {
        let mut store = MemStore::new();
        store.insert_patient(patient("P1", "Ana Santos"));
        store.insert_patient(patient("P2", "Bruna Santos"));
        let hit = resolve(&mut store, tenant(), "Carla X. Santos")
            .unwrap()
            .unwrap();
        assert_eq!(hit.strategy, MatchStrategy::SurnameAnchor);
        // Stable order puts "Ana Santos" first.
        assert_eq!(hit.candidate.patient_code, "P1");
    }

    #[test]
    fn test_accent_insensitive_last_resort() {
        let mut store = MemStore::new();
        store.insert_patient(patient("P1", "José"));
        let hit = resolve(&mut store, tenant(), "Jose").unwrap().unwrap();
        assert_eq!(hit.strategy, MatchStrategy::AccentInsensitive);
        assert_eq!(hit.candidate.patient_code, "P1");
    }

    #[test]
    fn test_all_strategies_miss() {
        let mut store = MemStore::new();
        store.insert_patient(patient("P1", "Maria Silva"));
        assert!(resolve(&mut store, tenant(), "Pedro Costa").unwrap().is_none());
        assert!(resolve(&mut store, tenant(), "   ").unwrap().is_none());
    }

    #[test]
    fn test_deterministic_over_unchanged_set() {
        let mut store = MemStore::new();
        store.insert_patient(patient("P1", "Ana Santos"));
        store.insert_patient(patient("P2", "Bruna Santos"));
        let first = resolve(&mut store, tenant(), "Carla Santos").unwrap();
        let second = resolve(&mut store, tenant(), "Carla Santos").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_soft_deleted_records_invisible() {
        let mut store = MemStore::new();
        let id = store.insert_patient(patient("P1", "Maria Silva"));
        store.soft_delete(id);
        assert!(resolve(&mut store, tenant(), "Maria Silva").unwrap().is_none());
    }
}
