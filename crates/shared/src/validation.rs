//! Field validators shared by request models.

use chrono::{Datelike, NaiveDate, Utc};
use validator::ValidationError;

/// Earliest accepted birth year.
const MIN_BIRTH_YEAR: i32 = 1900;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: u64 = 8;

lazy_static::lazy_static! {
    /// Usernames: 3-50 characters of letters, digits, `_`, `.` or `-`.
    pub static ref USERNAME_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Za-z0-9_.-]{3,50}$").unwrap();

    /// Contact numbers: optional leading `+`, then 7-15 digits.
    pub static ref CONTACT_NUMBER_REGEX: regex::Regex =
        regex::Regex::new(r"^\+?[0-9]{7,15}$").unwrap();
}

/// Validates that a birthday lies between 1900-01-01 and today.
pub fn validate_birthday(date: &NaiveDate) -> Result<(), ValidationError> {
    let today = Utc::now().date_naive();
    if *date > today {
        let mut err = ValidationError::new("birthday_future");
        err.message = Some("Birthday cannot be in the future".into());
        return Err(err);
    }
    if date.year() < MIN_BIRTH_YEAR {
        let mut err = ValidationError::new("birthday_range");
        err.message = Some("Birthday is out of range".into());
        return Err(err);
    }
    Ok(())
}

/// Validates that a string has at least one non-whitespace character.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value cannot be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_username_regex() {
        assert!(USERNAME_REGEX.is_match("juan.delacruz"));
        assert!(USERNAME_REGEX.is_match("stud_2024-01"));
        assert!(!USERNAME_REGEX.is_match("ab"));
        assert!(!USERNAME_REGEX.is_match("has space"));
        assert!(!USERNAME_REGEX.is_match("emoji😀"));
        assert!(!USERNAME_REGEX.is_match(&"a".repeat(51)));
    }

    #[test]
    fn test_contact_number_regex() {
        assert!(CONTACT_NUMBER_REGEX.is_match("09171234567"));
        assert!(CONTACT_NUMBER_REGEX.is_match("+639171234567"));
        assert!(!CONTACT_NUMBER_REGEX.is_match("12345"));
        assert!(!CONTACT_NUMBER_REGEX.is_match("0917-123-4567"));
        assert!(!CONTACT_NUMBER_REGEX.is_match("++639171234567"));
    }

    #[test]
    fn test_validate_birthday() {
        let today = Utc::now().date_naive();
        assert!(validate_birthday(&NaiveDate::from_ymd_opt(2004, 5, 17).unwrap()).is_ok());
        assert!(validate_birthday(&today).is_ok());
        assert!(validate_birthday(&(today + Duration::days(1))).is_err());
        assert!(validate_birthday(&NaiveDate::from_ymd_opt(1899, 12, 31).unwrap()).is_err());
    }

    #[test]
    fn test_validate_birthday_error_message() {
        let tomorrow = Utc::now().date_naive() + Duration::days(1);
        let err = validate_birthday(&tomorrow).unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Birthday cannot be in the future"
        );
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Merit Scholarship").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   \t").is_err());
    }
}
