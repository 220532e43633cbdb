use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// A monetary amount fixed at two fractional digits.
///
/// Stored as integer cents so arithmetic stays exact; rendered as `1234.56`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Build from whole units and a two-digit fraction.
    pub fn from_parts(units: i64, hundredths: i64) -> Self {
        if units < 0 {
            Self(units * 100 - hundredths)
        } else {
            Self(units * 100 + hundredths)
        }
    }

    pub fn cents(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}
