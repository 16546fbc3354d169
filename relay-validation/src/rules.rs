// Validation rules builder

use crate::ValidationError;
use std::sync::Arc;

type ValidatorFn = Arc<dyn Fn(&str, &str) -> Result<(), ValidationError> + Send + Sync>;

/// Chain of rule functions bound to a single field name.
#[derive(Clone)]
pub struct ValidationRules {
    validators: Vec<ValidatorFn>,
    field: String,
}

impl ValidationRules {
    /// Create new validation rules for a field.
    pub fn for_field(field: impl Into<String>) -> Self {
        Self {
            validators: Vec::new(),
            field: field.into(),
        }
    }

    /// Add a rule function.
    #[allow(clippy::should_implement_trait)]
    pub fn add<F>(mut self, validator: F) -> Self
    where
        F: Fn(&str, &str) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Run every rule against a value, collecting all failures.
    pub fn validate(&self, value: &str) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        for validator in &self.validators {
            if let Err(error) = validator(value, &self.field) {
                errors.push(error);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
