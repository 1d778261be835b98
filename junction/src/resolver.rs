use std::any::Any;
use std::sync::Arc;

use crate::descriptor::Implementation;
use crate::registry::Registry;
use crate::{Error, Instance, Interface, Key, Result};

/// Outcome of resolving a capability.
///
/// Holds the concrete instance together with its capability handle, so the
/// caller can either use the handle or inspect the implementation.
pub struct Resolved {
    implementation: Key,
    instance: Instance,
    view: Box<dyn Any + Send + Sync>,
}

impl Resolved {
    /// Key of the implementation type that produced this instance.
    pub fn implementation(&self) -> Key {
        self.implementation
    }

    /// The concrete instance.
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// Extracts the capability handle. Fails when `I` is not the capability
    /// this value was resolved for.
    pub fn downcast<I>(self) -> std::result::Result<Arc<I>, Self>
    where
        I: ?Sized + Interface,
    {
        let Self {
            implementation,
            instance,
            view,
        } = self;
        match view.downcast::<Arc<I>>() {
            Ok(view) => Ok(*view),
            Err(view) => Err(Self {
                implementation,
                instance,
                view,
            }),
        }
    }
}

impl std::fmt::Debug for Resolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolved")
            .field("implementation", &self.implementation)
            .finish_non_exhaustive()
    }
}

impl Registry {
    /// Resolves the single implementation registered for `capability`.
    pub(crate) fn resolve_one(&self, capability: &Key) -> Result<Resolved> {
        let implementations = self.lookup(capability)?;
        if implementations.len() > 1 {
            return Err(Error::AmbiguousCapability {
                name: capability.name(),
                count: implementations.len(),
            });
        }
        tracing::trace!(%capability, "Resolving capability");
        self.produce(capability, &implementations[0])
    }

    /// Resolves every implementation registered for `capability` in
    /// registration order.
    pub(crate) fn resolve_many(&self, capability: &Key) -> Result<Vec<Resolved>> {
        let implementations = self.lookup(capability)?;
        tracing::trace!(
            %capability,
            count = implementations.len(),
            "Resolving all implementations",
        );
        implementations
            .iter()
            .map(|implementation| self.produce(capability, implementation))
            .collect()
    }

    fn produce(&self, capability: &Key, implementation: &Arc<Implementation>) -> Result<Resolved> {
        let instance = self.instantiate(implementation)?;
        let view = implementation
            .cast(capability, &instance)
            .ok_or_else(|| {
                Error::invalid_argument(format!(
                    "'{}' does not export '{}'",
                    implementation.key, capability
                ))
            })?;
        Ok(Resolved {
            implementation: implementation.key,
            instance,
            view,
        })
    }
}
