//! GSTIN format checks.

use once_cell::sync::Lazy;
use regex::Regex;

static GSTIN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][1-9A-Z]Z[0-9A-Z]$").expect("valid GSTIN regex")
});

/// Structural check only; the trailing checksum character is not verified.
pub fn is_valid_gstin(gstin: &str) -> bool {
    GSTIN_PATTERN.is_match(gstin)
}

/// Two digit state code a GSTIN starts with.
pub fn state_code(gstin: &str) -> Option<&str> {
    if is_valid_gstin(gstin) {
        gstin.get(..2)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_gstin() {
        assert!(is_valid_gstin("27AAPFU0939F1ZV"));
        assert!(is_valid_gstin("29ABCDE1234F1Z5"));
    }

    #[test]
    fn rejects_malformed_gstin() {
        assert!(!is_valid_gstin(""));
        assert!(!is_valid_gstin("27aapfu0939f1zv"));
        assert!(!is_valid_gstin("27AAPFU0939F0ZV"));
        assert!(!is_valid_gstin("27AAPFU0939F1XV"));
        assert!(!is_valid_gstin("27AAPFU0939F1ZVX"));
    }

    #[test]
    fn extracts_state_code() {
        assert_eq!(state_code("27AAPFU0939F1ZV"), Some("27"));
        assert_eq!(state_code("not-a-gstin"), None);
    }
}
