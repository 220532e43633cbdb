//! Patient and encounter records.
//!
//! `NewPatient`/`NewEncounter` are the insert payloads produced by the
//! transform stage; `PatientRecord` is the read model the store returns for
//! matching and deduplication. Cross-references are always by identifier.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ids::{PatientId, TenantId};
use crate::money::Money;

/// Patient sex as recorded by the legacy system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
    Other,
}

impl Sex {
    /// Storage code: `M`, `F`, or `Outro`.
    pub fn as_code(self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
            Sex::Other => "Outro",
        }
    }
}

/// One of the two insurance-plan slots on a patient record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceSlot {
    pub insurer: Option<String>,
    pub plan: Option<String>,
    pub member_code: Option<String>,
    pub active: bool,
    pub private: bool,
}

/// A patient row ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPatient {
    pub tenant: TenantId,
    /// Tenant-unique patient code (`MIG-` prefixed legacy id).
    pub patient_code: String,
    /// Original spreadsheet identifier, kept without the migration prefix.
    pub legacy_code: Option<String>,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub sex: Option<Sex>,
    /// Canonical formatted national id (`XXX.XXX.XXX-XX`), when it validated.
    pub national_id: Option<String>,
    pub mother_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street: Option<String>,
    pub district: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub primary_insurance: InsuranceSlot,
    pub secondary_insurance: InsuranceSlot,
    pub deceased_or_lost: bool,
    pub case_status: String,
}

/// Projection of a stored patient used by the matcher and deduplicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub id: PatientId,
    pub tenant: TenantId,
    pub patient_code: String,
    pub legacy_code: Option<String>,
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub national_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// An encounter row ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEncounter {
    pub tenant: TenantId,
    /// Tenant-unique human-readable encounter code.
    pub code: String,
    pub patient_id: PatientId,
    /// Display name as it appeared in the source row.
    pub patient_name: String,
    pub date: Option<NaiveDate>,
    pub week: Option<i32>,
    pub encounter_type: Option<String>,
    pub procedure: Option<String>,
    pub location: Option<String>,
    pub insurer: Option<String>,
    pub insurer_plan: Option<String>,
    pub private: bool,
    pub payment_made: bool,
    pub projected_billing: Option<Money>,
    pub manual_fee_record: Option<Money>,
    pub final_projected_billing: Option<Money>,
    pub partner_billing_primary: Option<Money>,
    pub partner_billing_secondary: Option<Money>,
    pub billing_sent_date: Option<NaiveDate>,
    pub expected_payment_date: Option<NaiveDate>,
    pub payment_date: Option<NaiveDate>,
    pub invoice_ref: Option<String>,
    pub notes: Option<String>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub quarter: Option<String>,
    pub quarter_year: Option<String>,
}
