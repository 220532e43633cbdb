//! Duplicate detection over the stored patient set.
//!
//! Two independent keys group records believed to represent the same person:
//! normalized name plus national-id digits, and normalized name plus birth
//! date. Groups that surface with the exact same member set under both keys
//! are merged into one `Combined` group; partially overlapping groups are
//! reported separately.

use std::collections::BTreeMap;

use clinmig_model::{DuplicateCriterion, DuplicateGroup, PatientId, PatientRecord};
use clinmig_normalize::{digits_only, normalize_name};

/// Partition `patients` into duplicate groups.
///
/// The input is expected to be the full non-deleted patient set of one
/// tenant; the output order is deterministic (national-id groups first, each
/// family ordered by key).
pub fn find_duplicates(patients: &[PatientRecord]) -> Vec<DuplicateGroup> {
    let mut by_national_id: BTreeMap<String, Vec<&PatientRecord>> = BTreeMap::new();
    let mut by_birth_date: BTreeMap<String, Vec<&PatientRecord>> = BTreeMap::new();

    for patient in patients {
        let name = normalize_name(&patient.name);
        if let Some(digits) = patient
            .national_id
            .as_deref()
            .map(digits_only)
            .filter(|digits| digits.len() >= 11)
        {
            by_national_id
                .entry(format!("{name}|{digits}"))
                .or_default()
                .push(patient);
        }
        if let Some(date) = patient.birth_date {
            by_birth_date
                .entry(format!("{name}|{}", date.format("%Y-%m-%d")))
                .or_default()
                .push(patient);
        }
    }

    let mut groups: Vec<DuplicateGroup> = Vec::new();
    for (key, members) in by_national_id {
        if members.len() > 1 {
            groups.push(group(DuplicateCriterion::NationalId, key, &members));
        }
    }
    for (key, members) in by_birth_date {
        if members.len() < 2 {
            continue;
        }
        let ids = sorted_ids(&members);
        // The same member set under both keys is one person seen twice, not
        // two findings. Anything short of exact set equality stays separate.
        match groups.iter_mut().find(|existing| existing.patient_ids == ids) {
            Some(existing) => existing.criterion = DuplicateCriterion::Combined,
            None => groups.push(group(DuplicateCriterion::BirthDate, key, &members)),
        }
    }
    groups
}

fn sorted_ids(members: &[&PatientRecord]) -> Vec<PatientId> {
    let mut ids: Vec<PatientId> = members.iter().map(|patient| patient.id).collect();
    ids.sort_unstable();
    ids
}

fn group(
    criterion: DuplicateCriterion,
    key: String,
    members: &[&PatientRecord],
) -> DuplicateGroup {
    let mut ordered: Vec<&PatientRecord> = members.to_vec();
    ordered.sort_unstable_by_key(|patient| patient.id);
    DuplicateGroup {
        criterion,
        key,
        patient_ids: ordered.iter().map(|patient| patient.id).collect(),
        names: ordered.iter().map(|patient| patient.name.clone()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use clinmig_model::TenantId;

    fn record(
        id: i64,
        name: &str,
        national_id: Option<&str>,
        birth_date: Option<(i32, u32, u32)>,
    ) -> PatientRecord {
        PatientRecord {
            id: PatientId::new(id),
            tenant: TenantId::new(1),
            patient_code: format!("MIG-{id}"),
            legacy_code: None,
            name: name.to_string(),
            birth_date: birth_date
                .and_then(|(year, month, day)| NaiveDate::from_ymd_opt(year, month, day)),
            national_id: national_id.map(str::to_string),
            email: None,
            phone: None,
        }
    }

    #[test]
    fn test_shared_national_id_groups() {
        let patients = [
            record(1, "Maria Silva", Some("111.444.777-35"), None),
            record(2, "MARIA SILVA", Some("11144477735"), None),
            record(3, "Pedro Costa", Some("390.533.447-05"), None),
        ];
        let groups = find_duplicates(&patients);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].criterion, DuplicateCriterion::NationalId);
        assert_eq!(
            groups[0].patient_ids,
            vec![PatientId::new(1), PatientId::new(2)]
        );
    }

    #[test]
    fn test_same_set_under_both_keys_upgrades_to_combined() {
        let patients = [
            record(1, "Maria Silva", Some("11144477735"), Some((1990, 1, 1))),
            record(2, "maria silva", Some("11144477735"), Some((1990, 1, 1))),
        ];
        let groups = find_duplicates(&patients);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].criterion, DuplicateCriterion::Combined);
    }

    #[test]
    fn test_birth_date_only_group() {
        let patients = [
            record(1, "José Santos", None, Some((1985, 6, 15))),
            record(2, "Jose Santos", None, Some((1985, 6, 15))),
        ];
        let groups = find_duplicates(&patients);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].criterion, DuplicateCriterion::BirthDate);
    }

    #[test]
    fn test_partial_overlap_stays_distinct() {
        // 1 and 2 share a national id; 2 and 3 share a birth date. The two
        // findings overlap in patient 2 but are reported as separate groups.
        let patients = [
            record(1, "Maria Silva", Some("11144477735"), None),
            record(2, "Maria Silva", Some("11144477735"), Some((1990, 1, 1))),
            record(3, "Maria Silva", None, Some((1990, 1, 1))),
        ];
        let groups = find_duplicates(&patients);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].criterion, DuplicateCriterion::NationalId);
        assert_eq!(
            groups[0].patient_ids,
            vec![PatientId::new(1), PatientId::new(2)]
        );
        assert_eq!(groups[1].criterion, DuplicateCriterion::BirthDate);
        assert_eq!(
            groups[1].patient_ids,
            vec![PatientId::new(2), PatientId::new(3)]
        );
    }

    #[test]
    fn test_short_national_ids_never_key_a_group() {
        let patients = [
            record(1, "Maria Silva", Some("123"), None),
            record(2, "Maria Silva", Some("123"), None),
        ];
        assert!(find_duplicates(&patients).is_empty());
    }

    #[test]
    fn test_different_names_with_same_id_stay_apart() {
        let patients = [
            record(1, "Maria Silva", Some("11144477735"), None),
            record(2, "Pedro Costa", Some("11144477735"), None),
        ];
        assert!(find_duplicates(&patients).is_empty());
    }
}
