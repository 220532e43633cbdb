//! Match and duplicate-detection result types.

use serde::{Deserialize, Serialize};

use crate::ids::PatientId;

/// Minimal projection of a stored patient used for name comparison.
///
/// Produced transiently by store lookups; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub id: PatientId,
    pub patient_code: String,
    pub name: String,
    pub legacy_code: Option<String>,
}

/// Which cascade strategy produced a match.
///
/// Kept on the result so callers and tests can assert how a link was made,
/// not just which patient came back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStrategy {
    /// Case-insensitive equality with the stored name.
    Exact,
    /// Stored name contains the input as a case-insensitive substring.
    Substring,
    /// Resolved through the surname-anchored candidate set.
    SurnameAnchor,
    /// Database-level accent-insensitive comparison.
    AccentInsensitive,
}

impl MatchStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStrategy::Exact => "exact",
            MatchStrategy::Substring => "substring",
            MatchStrategy::SurnameAnchor => "surname",
            MatchStrategy::AccentInsensitive => "accent-insensitive",
        }
    }
}

/// A resolved patient link together with the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameMatch {
    pub candidate: MatchCandidate,
    pub strategy: MatchStrategy,
}

/// The criterion under which a duplicate group was formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuplicateCriterion {
    NationalId,
    BirthDate,
    /// The same member set surfaced under both keys.
    Combined,
}

impl DuplicateCriterion {
    pub fn as_str(self) -> &'static str {
        match self {
            DuplicateCriterion::NationalId => "national-id",
            DuplicateCriterion::BirthDate => "birth-date",
            DuplicateCriterion::Combined => "national-id + birth-date",
        }
    }
}

/// A set of patient records believed to represent the same person.
///
/// Report artifact only; member identifiers are kept sorted so equal groups
/// compare equal regardless of discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub criterion: DuplicateCriterion,
    /// The grouping key (normalized name joined with the shared attribute).
    pub key: String,
    pub patient_ids: Vec<PatientId>,
    pub names: Vec<String>,
}
