//! Invoice number grammar: `INV-{year}-{seq:04}` or the fallback `INV-{year}-F{stamp:08}`.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// Largest sequence that still fits the four digit form.
pub const MAX_SEQUENCE: u32 = 9999;

const STAMP_MODULUS: i64 = 100_000_000;

static INVOICE_NUMBER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^INV-(\d{4})-(?:(\d{4})|F(\d{8}))$").expect("valid invoice number regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvoiceNumber {
    Sequential { year: i32, sequence: u32 },
    Fallback { year: i32, stamp: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid invoice number: {0}")]
pub struct InvalidInvoiceNumber(pub String);

impl InvoiceNumber {
    pub fn sequential(year: i32, sequence: u32) -> Self {
        Self::Sequential { year, sequence }
    }

    /// Fallback number stamped with the last eight digits of the epoch milliseconds.
    pub fn fallback(year: i32, now: DateTime<Utc>) -> Self {
        let stamp = now.timestamp_millis().rem_euclid(STAMP_MODULUS) as u32;
        Self::Fallback { year, stamp }
    }

    pub fn year(&self) -> i32 {
        match self {
            Self::Sequential { year, .. } | Self::Fallback { year, .. } => *year,
        }
    }

    pub fn sequence(&self) -> Option<u32> {
        match self {
            Self::Sequential { sequence, .. } => Some(*sequence),
            Self::Fallback { .. } => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential { year, sequence } => write!(f, "INV-{year}-{sequence:04}"),
            Self::Fallback { year, stamp } => write!(f, "INV-{year}-F{stamp:08}"),
        }
    }
}

impl FromStr for InvoiceNumber {
    type Err = InvalidInvoiceNumber;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidInvoiceNumber(s.to_string());
        let caps = INVOICE_NUMBER_PATTERN.captures(s).ok_or_else(invalid)?;
        let year = caps[1].parse::<i32>().map_err(|_| invalid())?;

        if let Some(sequence) = caps.get(2) {
            let sequence = sequence.as_str().parse::<u32>().map_err(|_| invalid())?;
            return Ok(Self::Sequential { year, sequence });
        }

        let stamp = caps
            .get(3)
            .ok_or_else(invalid)?
            .as_str()
            .parse::<u32>()
            .map_err(|_| invalid())?;
        Ok(Self::Fallback { year, stamp })
    }
}

pub fn is_valid_invoice_number(s: &str) -> bool {
    INVOICE_NUMBER_PATTERN.is_match(s)
}

/// Common prefix of every number issued in `year`, e.g. `INV-2024-`.
pub fn year_prefix(year: i32) -> String {
    format!("INV-{year}-")
}

/// Anchored pattern matching only the sequential numbers of `year`, usable as a
/// database `$regex`.
pub fn sequential_pattern(year: i32) -> String {
    format!(r"^INV-{year}-\d{{4}}$")
}

/// Highest sequential suffix for `year` among `existing`, plus one.
///
/// Fallback numbers, other years and anything unparseable are ignored.
pub fn next_sequence<I, S>(year: i32, existing: I) -> u32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    existing
        .into_iter()
        .filter_map(|number| number.as_ref().parse::<InvoiceNumber>().ok())
        .filter(|number| number.year() == year)
        .filter_map(|number| number.sequence())
        .max()
        .unwrap_or(0)
        .saturating_add(1)
}
