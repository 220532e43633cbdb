//! The identity-resolution core of the migration.
//!
//! - **resolver**: links a free-text patient name to a stored record through
//!   a deterministic four-strategy cascade.
//! - **allocate**: collision-free identifier assignment for migrated patients
//!   and encounter codes, plus the corrective repair of legacy codes.
//! - **dedupe**: groups stored patients believed to represent the same
//!   person under two independent keys.

pub mod allocate;
pub mod dedupe;
pub mod resolver;

use thiserror::Error;

use clinmig_store::StoreError;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("no free code for {code} after {attempts} suffix attempts")]
    SuffixExhausted { code: String, attempts: u32 },
}

pub use allocate::{
    RepairOutcome, disambiguate_patient_codes, next_encounter_code, patient_code,
    repair_encounter_codes,
};
pub use dedupe::find_duplicates;
pub use resolver::resolve;
