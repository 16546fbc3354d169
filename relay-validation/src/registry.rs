//! Request-bound validators and the registry the bootstrapper populates.

use crate::ValidationErrors;
use dashmap::DashMap;
use relay_cqrs::{Command, Query};
use std::any::{Any, TypeId};
use std::sync::Arc;

/// Validation ruleset bound to a single command type.
///
/// Implementations hold no dispatch logic; they express rules with the
/// framework pieces in this crate and report failures per field.
pub trait CommandValidator<C: Command>: Send + Sync + 'static {
    fn validate(&self, command: &C) -> Result<(), ValidationErrors>;
}

/// Validation ruleset bound to a single query type.
pub trait QueryValidator<Q: Query>: Send + Sync + 'static {
    fn validate(&self, query: &Q) -> Result<(), ValidationErrors>;
}

/// Registry from request type to its bound validators.
///
/// More than one validator may be bound to the same request type; validation
/// runs all of them and aggregates the failures.
pub struct ValidatorRegistry {
    command_validators: DashMap<TypeId, Vec<Arc<dyn Any + Send + Sync>>>,
    query_validators: DashMap<TypeId, Vec<Arc<dyn Any + Send + Sync>>>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self {
            command_validators: DashMap::new(),
            query_validators: DashMap::new(),
        }
    }

    /// Bind a validator to a command type.
    pub fn register_command_validator<C, V>(&self, validator: V)
    where
        C: Command,
        V: CommandValidator<C>,
    {
        let slot: Arc<dyn Any + Send + Sync> =
            Arc::new(Arc::new(validator) as Arc<dyn CommandValidator<C>>);
        self.command_validators
            .entry(TypeId::of::<C>())
            .or_default()
            .push(slot);
    }

    /// Bind a validator to a query type.
    pub fn register_query_validator<Q, V>(&self, validator: V)
    where
        Q: Query,
        V: QueryValidator<Q>,
    {
        let slot: Arc<dyn Any + Send + Sync> =
            Arc::new(Arc::new(validator) as Arc<dyn QueryValidator<Q>>);
        self.query_validators
            .entry(TypeId::of::<Q>())
            .or_default()
            .push(slot);
    }

    /// Run every validator bound to the command type.
    ///
    /// A command type with no bound validators validates clean.
    pub fn validate_command<C: Command>(&self, command: &C) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        if let Some(slots) = self.command_validators.get(&TypeId::of::<C>()) {
            for slot in slots.iter() {
                if let Some(validator) = slot.downcast_ref::<Arc<dyn CommandValidator<C>>>() {
                    if let Err(failures) = validator.validate(command) {
                        errors.extend(failures.errors);
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors::new(errors))
        }
    }

    /// Run every validator bound to the query type.
    pub fn validate_query<Q: Query>(&self, query: &Q) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        if let Some(slots) = self.query_validators.get(&TypeId::of::<Q>()) {
            for slot in slots.iter() {
                if let Some(validator) = slot.downcast_ref::<Arc<dyn QueryValidator<Q>>>() {
                    if let Err(failures) = validator.validate(query) {
                        errors.extend(failures.errors);
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors::new(errors))
        }
    }

    /// Number of validators bound to a command type.
    pub fn command_validator_count<C: Command>(&self) -> usize {
        self.command_validators
            .get(&TypeId::of::<C>())
            .map(|slots| slots.len())
            .unwrap_or(0)
    }

    /// Number of validators bound to a query type.
    pub fn query_validator_count<Q: Query>(&self) -> usize {
        self.query_validators
            .get(&TypeId::of::<Q>())
            .map(|slots| slots.len())
            .unwrap_or(0)
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
