//! Module discovery and contract search.
//!
//! Discovery consumes an explicit list of module sources computed once at
//! startup: descriptors the host already built, plus deferred loaders for
//! modules that may or may not be loadable. Nothing process-wide is mutated.

use crate::error::RegistryError;
use crate::module::{Contract, ModuleDescriptor, ModuleSet};
use tracing::debug;

type LoadFn = Box<dyn FnOnce() -> Result<ModuleDescriptor, RegistryError> + Send>;

/// One candidate module handed to [`discover_modules`].
pub enum ModuleSource {
    /// A descriptor already built by the host application.
    Loaded(ModuleDescriptor),

    /// A module produced by running a fallible loader. The identity is known
    /// up front so an already-known module is never loaded twice.
    Deferred { name: &'static str, load: LoadFn },
}

impl ModuleSource {
    pub fn loaded(module: ModuleDescriptor) -> Self {
        ModuleSource::Loaded(module)
    }

    pub fn deferred<F>(name: &'static str, load: F) -> Self
    where
        F: FnOnce() -> Result<ModuleDescriptor, RegistryError> + Send + 'static,
    {
        ModuleSource::Deferred {
            name,
            load: Box::new(load),
        }
    }
}

impl std::fmt::Debug for ModuleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModuleSource::Loaded(module) => {
                f.debug_tuple("Loaded").field(&module.name()).finish()
            }
            ModuleSource::Deferred { name, .. } => {
                f.debug_tuple("Deferred").field(name).finish()
            }
        }
    }
}

/// Build the candidate module set for this process invocation.
///
/// Already-built descriptors are taken first; a deferred source whose
/// identity is already known is skipped without running its loader. A loader
/// that fails is skipped silently: discovery is best-effort, and one bad
/// source must not abort startup. Calling twice over the same sources yields
/// a set with identical membership.
pub fn discover_modules<I>(sources: I) -> ModuleSet
where
    I: IntoIterator<Item = ModuleSource>,
{
    let mut set = ModuleSet::new();

    for source in sources {
        match source {
            ModuleSource::Loaded(module) => {
                let name = module.name();
                if !set.insert(module) {
                    debug!(module = name, "duplicate module ignored");
                }
            }
            ModuleSource::Deferred { name, load } => {
                if set.contains(name) {
                    debug!(module = name, "module already loaded");
                    continue;
                }
                match load() {
                    Ok(module) => {
                        set.insert(module);
                    }
                    Err(error) => {
                        debug!(module = name, error = %error, "skipping module that failed to load");
                    }
                }
            }
        }
    }

    set
}

/// Modules declaring at least one registration of the target contract shape.
///
/// Granularity is per module: one matching registration is enough, and a
/// module never appears twice however many of its registrations match.
pub fn find_modules_implementing(modules: &ModuleSet, contract: Contract) -> ModuleSet {
    modules
        .iter()
        .filter(|module| module.implements(contract))
        .cloned()
        .collect()
}
