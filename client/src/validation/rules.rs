//! Common validation rules shared across action payloads.

use chrono::{Datelike, NaiveDate, NaiveTime, Utc};
use validator::ValidationError;

use crate::models::ChildSettings;

/// Validates password strength.
///
/// Requirements:
/// - At least 8 characters
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.len() < 8 {
        return Err(ValidationError::new("password_too_short"));
    }
    Ok(())
}

/// Validates a child's display name.
///
/// Requirements:
/// - Non-empty after trimming
/// - At most 100 characters
pub fn validate_child_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("child_name_empty"));
    }
    if name.len() > 100 {
        return Err(ValidationError::new("child_name_too_long"));
    }
    Ok(())
}

/// Validates a child's date of birth.
///
/// Requirements:
/// - Not in the future
/// - Year 1900 or later
pub fn validate_birthdate(date: &NaiveDate) -> Result<(), ValidationError> {
    if *date > Utc::now().date_naive() {
        return Err(ValidationError::new("birthdate_in_future"));
    }
    if date.year() < 1900 {
        return Err(ValidationError::new("birthdate_too_old"));
    }
    Ok(())
}

/// Validates a time-of-day string in "HH:MM" format.
pub fn validate_time_of_day(value: &str) -> Result<(), ValidationError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map(|_| ())
        .map_err(|_| ValidationError::new("time_of_day_invalid"))
}

/// Validates the time-of-day fields of a settings value.
pub fn validate_settings(settings: &ChildSettings) -> Result<(), ValidationError> {
    validate_time_of_day(&settings.bedtime)?;
    validate_time_of_day(&settings.wake_time)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_rejects_short() {
        assert!(validate_password("seven77").is_err());
    }

    #[test]
    fn password_accepts_eight_chars() {
        assert!(validate_password("eight888").is_ok());
    }

    #[test]
    fn child_name_rejects_blank() {
        assert!(validate_child_name("   ").is_err());
    }

    #[test]
    fn child_name_rejects_over_100_chars() {
        assert!(validate_child_name(&"a".repeat(101)).is_err());
    }

    #[test]
    fn child_name_accepts_valid() {
        assert!(validate_child_name("Sam").is_ok());
    }

    #[test]
    fn birthdate_rejects_future() {
        let future = Utc::now().date_naive() + chrono::Days::new(1);
        assert!(validate_birthdate(&future).is_err());
    }

    #[test]
    fn birthdate_rejects_before_1900() {
        let date = NaiveDate::from_ymd_opt(1899, 12, 31).unwrap();
        assert!(validate_birthdate(&date).is_err());
    }

    #[test]
    fn birthdate_accepts_valid() {
        let date = NaiveDate::from_ymd_opt(2015, 5, 20).unwrap();
        assert!(validate_birthdate(&date).is_ok());
    }

    #[test]
    fn time_of_day_rejects_out_of_range() {
        assert!(validate_time_of_day("25:00").is_err());
        assert!(validate_time_of_day("21-00").is_err());
    }

    #[test]
    fn time_of_day_accepts_valid() {
        assert!(validate_time_of_day("21:00").is_ok());
        assert!(validate_time_of_day("07:30").is_ok());
    }

    #[test]
    fn settings_validate_both_times() {
        let mut settings = ChildSettings::default();
        assert!(validate_settings(&settings).is_ok());
        settings.wake_time = "7am".to_string();
        assert!(validate_settings(&settings).is_err());
    }
}
