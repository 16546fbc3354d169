// Built-in rule validators

use crate::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Display;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$").unwrap()
});

/// Validates that a string is not empty or whitespace
pub struct NotEmpty;

impl NotEmpty {
    pub fn validate(value: &str, field: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            Err(
                ValidationError::new(field, format!("{} should not be empty", field))
                    .with_constraint("notEmpty"),
            )
        } else {
            Ok(())
        }
    }
}

/// Validates minimum string length
pub struct MinLength(pub usize);

impl MinLength {
    pub fn validate(&self, value: &str, field: &str) -> Result<(), ValidationError> {
        if value.len() < self.0 {
            Err(ValidationError::new(
                field,
                format!("{} must be at least {} characters", field, self.0),
            )
            .with_constraint("minLength")
            .with_value(value.to_string()))
        } else {
            Ok(())
        }
    }
}

/// Validates maximum string length
pub struct MaxLength(pub usize);

impl MaxLength {
    pub fn validate(&self, value: &str, field: &str) -> Result<(), ValidationError> {
        if value.len() > self.0 {
            Err(ValidationError::new(
                field,
                format!("{} must be at most {} characters", field, self.0),
            )
            .with_constraint("maxLength")
            .with_value(value.to_string()))
        } else {
            Ok(())
        }
    }
}

/// Validates email format
pub struct IsEmail;

impl IsEmail {
    pub fn validate(value: &str, field: &str) -> Result<(), ValidationError> {
        if EMAIL_REGEX.is_match(value) {
            Ok(())
        } else {
            Err(
                ValidationError::new(field, format!("{} must be a valid email", field))
                    .with_constraint("isEmail")
                    .with_value(value.to_string()),
            )
        }
    }
}

/// Validates a minimum numeric value
pub struct Min<T>(pub T);

impl<T: PartialOrd + Display + Copy> Min<T> {
    pub fn validate(&self, value: T, field: &str) -> Result<(), ValidationError> {
        if value < self.0 {
            Err(ValidationError::new(
                field,
                format!("{} must be at least {}", field, self.0),
            )
            .with_constraint("min")
            .with_value(value.to_string()))
        } else {
            Ok(())
        }
    }
}

/// Validates a maximum numeric value
pub struct Max<T>(pub T);

impl<T: PartialOrd + Display + Copy> Max<T> {
    pub fn validate(&self, value: T, field: &str) -> Result<(), ValidationError> {
        if value > self.0 {
            Err(ValidationError::new(
                field,
                format!("{} must be at most {}", field, self.0),
            )
            .with_constraint("max")
            .with_value(value.to_string()))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_empty() {
        assert!(NotEmpty::validate("value", "field").is_ok());
        assert!(NotEmpty::validate("", "field").is_err());
        assert!(NotEmpty::validate("   ", "field").is_err());
    }

    #[test]
    fn length_bounds() {
        assert!(MinLength(3).validate("abc", "field").is_ok());
        assert!(MinLength(3).validate("ab", "field").is_err());
        assert!(MaxLength(3).validate("abc", "field").is_ok());
        assert!(MaxLength(3).validate("abcd", "field").is_err());
    }

    #[test]
    fn email_format() {
        assert!(IsEmail::validate("alice@example.com", "email").is_ok());
        assert!(IsEmail::validate("not-an-email", "email").is_err());
        assert!(IsEmail::validate("a@b", "email").is_err());
    }

    #[test]
    fn numeric_bounds() {
        assert!(Min(18).validate(25, "age").is_ok());
        assert!(Min(18).validate(17, "age").is_err());
        assert!(Max(100).validate(50, "age").is_ok());
        assert!(Max(100).validate(101, "age").is_err());
    }
}
