pub mod validation;

pub use validation::{parse_iso_date, ValidatedJson};
