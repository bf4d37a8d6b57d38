//! Unit tests for input validation.

use glucolog::validation::{
    target_exceeded, validate_email, validate_name, validate_password_format,
    validate_reading_value, ValidationError,
};
use glucolog::GlucoseType;

#[test]
fn test_reading_value_range() {
    assert!(validate_reading_value(20.0).is_ok());
    assert!(validate_reading_value(600.0).is_ok());
    assert_eq!(
        validate_reading_value(10.0),
        Err(ValidationError::ValueOutOfRange(10.0))
    );
    assert_eq!(
        validate_reading_value(601.0),
        Err(ValidationError::ValueOutOfRange(601.0))
    );
}

#[test]
fn test_target_hint_only_when_over_target() {
    assert!(target_exceeded(GlucoseType::Fasting, 85.0).is_none());
    assert!(target_exceeded(GlucoseType::Fasting, 92.0).is_some());
    assert!(target_exceeded(GlucoseType::PostDinner, 140.0).is_none());
    assert!(target_exceeded(GlucoseType::PostDinner, 141.0).is_some());
}

#[test]
fn test_name_rules() {
    assert!(validate_name("Jo").is_ok());
    assert!(validate_name("J").is_err());
    assert!(validate_name("   ").is_err());
    assert!(validate_name(&"a".repeat(50)).is_ok());
    assert!(validate_name(&"a".repeat(51)).is_err());
}

#[test]
fn test_email_rules() {
    for good in ["a@b.co", "user.name@host.example.org"] {
        assert!(validate_email(good).is_ok(), "{good} should be valid");
    }
    for bad in ["", "plain", "a@b", "@b.co", "a@.co", "a b@c.co"] {
        assert!(validate_email(bad).is_err(), "{bad} should be invalid");
    }
}

#[test]
fn test_password_rules() {
    assert!(validate_password_format("glico123").is_ok());
    for bad in ["ab1", "onlyletters", "12345678", "has space1", "senha-123"] {
        assert!(
            validate_password_format(bad).is_err(),
            "{bad} should be invalid"
        );
    }
}
