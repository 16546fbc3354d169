//! Binding rule chains to commands through the validator registry.

use relay_cqrs::Command;
use relay_validation::{
    CommandValidator, IsEmail, MaxLength, NotEmpty, ValidationErrors, ValidationRules,
    ValidatorRegistry,
};

struct InviteUserCommand {
    email: String,
    note: String,
}

impl Command for InviteUserCommand {
    type Result = ();
}

struct InviteUserValidator {
    email_rules: ValidationRules,
    note_rules: ValidationRules,
}

impl InviteUserValidator {
    fn new() -> Self {
        Self {
            email_rules: ValidationRules::for_field("email")
                .add(|value, field| NotEmpty::validate(value, field))
                .add(|value, field| IsEmail::validate(value, field)),
            note_rules: ValidationRules::for_field("note")
                .add(|value, field| MaxLength(140).validate(value, field)),
        }
    }
}

impl CommandValidator<InviteUserCommand> for InviteUserValidator {
    fn validate(&self, command: &InviteUserCommand) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        if let Err(mut failures) = self.email_rules.validate(&command.email) {
            errors.append(&mut failures);
        }
        if let Err(mut failures) = self.note_rules.validate(&command.note) {
            errors.append(&mut failures);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.into())
        }
    }
}

#[test]
fn bound_rule_chains_run_through_the_registry() {
    let registry = ValidatorRegistry::new();
    registry.register_command_validator::<InviteUserCommand, _>(InviteUserValidator::new());

    let valid = InviteUserCommand {
        email: "alice@example.com".to_string(),
        note: "welcome aboard".to_string(),
    };
    assert!(registry.validate_command(&valid).is_ok());

    let invalid = InviteUserCommand {
        email: "not-an-email".to_string(),
        note: "x".repeat(200),
    };
    let failures = registry.validate_command(&invalid).unwrap_err();
    assert_eq!(failures.len(), 2);
    assert_eq!(failures.field_errors("email").len(), 1);
    assert_eq!(failures.field_errors("note").len(), 1);
}
