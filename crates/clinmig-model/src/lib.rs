//! Data model for the legacy clinic record migration.
//!
//! Defines the records exchanged between the pipeline stages (patients,
//! encounters), the typed identifiers scoping them, the match and duplicate
//! report types, and the run configuration threaded into every component.

pub mod config;
pub mod ids;
pub mod matching;
pub mod money;
pub mod records;
pub mod report;

pub use config::{ConflictPolicy, MigrationConfig, RunMode, SynonymTable, Vocabulary};
pub use ids::{EncounterId, PatientId, TenantId};
pub use matching::{
    DuplicateCriterion, DuplicateGroup, MatchCandidate, MatchStrategy, NameMatch,
};
pub use money::Money;
pub use records::{InsuranceSlot, NewEncounter, NewPatient, PatientRecord, Sex};
pub use report::{RunReport, RunStats};
