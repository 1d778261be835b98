use crate::descriptor::Implementation;
use crate::registry::Registry;
use crate::{Instance, Result};

impl Registry {
    /// Builds or reuses an instance of `implementation`.
    ///
    /// A singleton is stored in its slot before its fields are wired, so a
    /// dependency cycle that leads back to it receives the same, possibly
    /// partially wired, instance instead of recursing. Transient instances
    /// are never cached; a cycle made only of transient types does not
    /// terminate.
    pub(crate) fn instantiate(&self, implementation: &Implementation) -> Result<Instance> {
        if implementation.singleton {
            let (instance, created) = self.singleton(implementation)?;
            if created {
                tracing::debug!(implementation = %implementation.key, "Singleton created");
                self.wire_erased(implementation, instance.as_ref())?;
            }
            return Ok(instance);
        }
        let instance = implementation.create();
        tracing::trace!(implementation = %implementation.key, "Transient created");
        self.wire_erased(implementation, instance.as_ref())?;
        Ok(instance)
    }
}
