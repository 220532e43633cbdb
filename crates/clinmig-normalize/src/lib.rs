//! Normalization and validation for legacy spreadsheet fields.
//!
//! Every function here is pure and total: normalizers turn noisy input into a
//! canonical value or "no value", validators return a canonical value or a
//! [`Rejection`] reason. Nothing in this crate performs I/O or aborts a row.
//!
//! - **name**: comparison form of patient names (diacritic folding)
//! - **datetime**: the legacy export's three date formats
//! - **numeric**: Brazilian money format, truthy tokens
//! - **category**: fixed synonym tables with a title-case fallback
//! - **text**: bounded free text, digit extraction, sex codes
//! - **validate**: constraint checks producing tagged rejections

pub mod category;
pub mod datetime;
pub mod name;
pub mod numeric;
pub mod text;
pub mod validate;

pub use category::{normalize_category, title_case};
pub use datetime::{month_number, parse_flexible_date};
pub use name::{fold_diacritics, normalize_name};
pub use numeric::{parse_boolean, parse_money};
pub use text::{clean_text, digits_only, normalize_sex};
pub use validate::{
    Rejection, validate_birth_date, validate_email, validate_national_id, validate_postal_code,
};
