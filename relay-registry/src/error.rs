// Error types for discovery and registration

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("provider not found: {0}")]
    ProviderNotFound(String),

    #[error("module failed to load: {0}")]
    ModuleLoad(String),

    #[error("registration failed: {0}")]
    Installation(String),
}
