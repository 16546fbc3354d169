// Validation errors

use serde::Serialize;
use std::fmt;

/// Validation error for a single field.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    /// Field name that failed validation
    pub field: String,

    /// Error message
    pub message: String,

    /// Validation constraint that failed
    pub constraint: String,

    /// Value that failed validation (optional)
    pub value: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            constraint: "custom".to_string(),
            value: None,
        }
    }

    /// Set the constraint name.
    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = constraint.into();
        self
    }

    /// Set the invalid value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors for one request.
#[derive(Debug, Clone, Serialize, Default)]
pub struct ValidationErrors {
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Errors reported against a specific field.
    pub fn field_errors(&self, field: &str) -> Vec<&ValidationError> {
        self.errors.iter().filter(|e| e.field == field).collect()
    }

    /// JSON representation suitable for API responses.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "errors": self.errors })
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in &self.errors {
            writeln!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::new(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_constraint_and_value() {
        let error = ValidationError::new("email", "email must be valid")
            .with_constraint("isEmail")
            .with_value("not-an-email");

        assert_eq!(error.field, "email");
        assert_eq!(error.constraint, "isEmail");
        assert_eq!(error.value.as_deref(), Some("not-an-email"));
        assert_eq!(error.to_string(), "email: email must be valid");
    }

    #[test]
    fn collects_field_errors() {
        let mut errors = ValidationErrors::default();
        errors.add(ValidationError::new("name", "required"));
        errors.add(ValidationError::new("email", "invalid"));
        errors.add(ValidationError::new("name", "too short"));

        assert_eq!(errors.len(), 3);
        assert_eq!(errors.field_errors("name").len(), 2);
    }

    #[test]
    fn renders_json() {
        let errors =
            ValidationErrors::new(vec![ValidationError::new("name", "required")]);
        let json = errors.to_json();
        assert_eq!(json["errors"][0]["field"], "name");
    }
}
