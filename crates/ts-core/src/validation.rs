//! Input validation helpers.

/// Checks a contact number against a permissive E.164-style shape:
/// an optional leading `+` followed by 7 to 15 digits.
///
/// Validation happens here, server-side, regardless of what any client
/// form enforces.
pub fn validate_contact_number(number: &str) -> bool {
    let digits = number.strip_prefix('+').unwrap_or(number);
    (7..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_numbers() {
        assert!(validate_contact_number("+15550100123"));
        assert!(validate_contact_number("5550100"));
        assert!(validate_contact_number("+442071838750"));
    }

    #[test]
    fn test_invalid_numbers() {
        assert!(!validate_contact_number(""));
        assert!(!validate_contact_number("+1"));
        assert!(!validate_contact_number("555-0100"));
        assert!(!validate_contact_number("call me maybe"));
        assert!(!validate_contact_number("+1234567890123456"));
    }
}
