//! Request validation for Relay commands and queries.
//!
//! The crate has two layers: a small rule framework (field-level errors, a
//! rules builder, built-in rule validators) and the request bindings:
//! [`CommandValidator`]/[`QueryValidator`] traits tying a ruleset to one
//! request type, collected in a [`ValidatorRegistry`] at startup.
//!
//! # Examples
//!
//! ```
//! use relay_validation::{ValidationRules, NotEmpty, MinLength};
//!
//! let rules = ValidationRules::for_field("username")
//!     .add(|value, field| NotEmpty::validate(value, field))
//!     .add(|value, field| MinLength(3).validate(value, field));
//!
//! assert!(rules.validate("john").is_ok());
//! assert!(rules.validate("").is_err());
//! ```

mod errors;
mod registry;
mod rules;
mod validators;

pub use errors::{ValidationError, ValidationErrors};
pub use registry::{CommandValidator, QueryValidator, ValidatorRegistry};
pub use rules::ValidationRules;
pub use validators::{IsEmail, Max, MaxLength, Min, MinLength, NotEmpty};
