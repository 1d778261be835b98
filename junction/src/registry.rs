use std::any::TypeId;
use std::fmt::Write as _;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::descriptor::Implementation;
use crate::{Error, Instance, Key, Result};

struct Capability {
    order: usize,
    implementations: Vec<Arc<Implementation>>,
}

/// Capability and singleton tables shared by a container and its handles.
pub(crate) struct Registry {
    exports: DashMap<Key, Capability>,
    singletons: DashMap<TypeId, Option<Instance>>,
    implementations: DashMap<TypeId, Arc<Implementation>>,
    next_order: AtomicUsize,
    disposed: AtomicBool,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            exports: DashMap::new(),
            singletons: DashMap::new(),
            implementations: DashMap::new(),
            next_order: AtomicUsize::new(0),
            disposed: AtomicBool::new(false),
        }
    }

    pub(crate) fn ensure_live(&self) -> Result<()> {
        match self.disposed.load(Ordering::Acquire) {
            true => Err(Error::Disposed),
            false => Ok(()),
        }
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Appends the implementation to every capability it exports and opens
    /// an empty singleton slot for singleton-scoped types.
    ///
    /// Registering the same type twice appends it twice.
    pub(crate) fn register(&self, implementation: &Arc<Implementation>) -> Result<()> {
        self.ensure_live()?;
        implementation.validate()?;
        let id = implementation.key.id();
        if implementation.singleton {
            self.singletons.entry(id).or_insert(None);
        }
        self.append(implementation);
        Ok(())
    }

    /// Registers the type of `instance` and stores `instance` in its
    /// singleton slot.
    pub(crate) fn install_singleton(
        &self,
        implementation: &Arc<Implementation>,
        instance: Instance,
    ) -> Result<()> {
        self.ensure_live()?;
        implementation.validate()?;
        let name = implementation.key.name();
        if !implementation.singleton {
            return Err(Error::SingletonConflict {
                name,
                reason: "type is not singleton-scoped",
            });
        }
        let registered = match self.singletons.entry(implementation.key.id()) {
            Entry::Occupied(mut entry) => {
                if entry.get().is_some() {
                    return Err(Error::SingletonConflict {
                        name,
                        reason: "type already has an instance",
                    });
                }
                entry.insert(Some(instance));
                true
            }
            Entry::Vacant(entry) => {
                entry.insert(Some(instance));
                false
            }
        };
        // A type registered earlier keeps its existing export entries.
        if !registered {
            self.append(implementation);
        }
        tracing::debug!(implementation = %implementation.key, "Singleton instance seeded");
        Ok(())
    }

    /// Registers a singleton together with its instance on a fresh
    /// registry.
    pub(crate) fn seed(&self, implementation: &Arc<Implementation>, instance: Instance) {
        self.singletons.insert(implementation.key.id(), Some(instance));
        self.append(implementation);
    }

    fn append(&self, implementation: &Arc<Implementation>) {
        self.implementations
            .entry(implementation.key.id())
            .or_insert_with(|| implementation.clone());
        for export in &implementation.exports {
            self.exports
                .entry(export.key)
                .or_insert_with(|| Capability {
                    order: self.next_order.fetch_add(1, Ordering::Relaxed),
                    implementations: Vec::new(),
                })
                .implementations
                .push(implementation.clone());
            tracing::debug!(
                capability = %export.key,
                implementation = %implementation.key,
                singleton = implementation.singleton,
                "Registered export",
            );
        }
    }

    /// Returns the implementations registered for `capability` in
    /// registration order.
    pub(crate) fn lookup(&self, capability: &Key) -> Result<Vec<Arc<Implementation>>> {
        self.ensure_live()?;
        if !capability.is_interface() {
            return Err(Error::InvalidCapability {
                name: capability.name(),
            });
        }
        let implementations = self
            .exports
            .get(capability)
            .map(|v| v.implementations.clone())
            .unwrap_or_default();
        if implementations.is_empty() {
            return Err(Error::UnknownCapability {
                name: capability.name(),
                registry: self.dump(),
            });
        }
        Ok(implementations)
    }

    pub(crate) fn implementation(&self, id: &TypeId) -> Option<Arc<Implementation>> {
        self.implementations.get(id).map(|v| v.value().clone())
    }

    /// Returns the singleton instance for `implementation`, creating it if
    /// the slot is still empty. The flag is `true` when the instance was
    /// created by this call and still needs wiring.
    ///
    /// The slot is filled under its entry lock, so concurrent first
    /// resolutions construct a single instance. Wiring happens after the
    /// lock is released.
    pub(crate) fn singleton(&self, implementation: &Implementation) -> Result<(Instance, bool)> {
        self.ensure_live()?;
        let mut slot = self
            .singletons
            .entry(implementation.key.id())
            .or_insert(None);
        if let Some(instance) = slot.value() {
            return Ok((instance.clone(), false));
        }
        let instance = implementation.create();
        *slot = Some(instance.clone());
        Ok((instance, true))
    }

    /// Known capabilities in registration order.
    pub(crate) fn capabilities(&self) -> Vec<Key> {
        self.snapshot().into_iter().map(|(key, _)| key).collect()
    }

    fn snapshot(&self) -> Vec<(Key, Vec<Arc<Implementation>>)> {
        let mut entries: Vec<_> = self
            .exports
            .iter()
            .map(|v| (v.order, *v.key(), v.implementations.clone()))
            .collect();
        entries.sort_by_key(|(order, _, _)| *order);
        entries
            .into_iter()
            .map(|(_, key, implementations)| (key, implementations))
            .collect()
    }

    /// Renders every capability with its implementations for humans.
    pub(crate) fn dump(&self) -> String {
        let entries = self.snapshot();
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Container has following registered types (#{}):",
            entries.len()
        );
        for (i, (key, implementations)) in entries.iter().enumerate() {
            let _ = writeln!(out, "{}: {} #{}", i + 1, key, implementations.len());
            for (j, implementation) in implementations.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "  {}: {} [{}]",
                    j,
                    implementation.key,
                    self.slot_marker(implementation)
                );
            }
        }
        out
    }

    fn slot_marker(&self, implementation: &Implementation) -> String {
        match self.singletons.get(&implementation.key.id()) {
            Some(slot) => match slot.value() {
                Some(instance) => {
                    format!("Singleton {:p}", Arc::as_ptr(instance).cast::<()>())
                }
                None => "Singleton <empty>".to_string(),
            },
            None => "Instance".to_string(),
        }
    }

    /// Marks the registry as disposed and releases all tables.
    pub(crate) fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.exports.clear();
        self.singletons.clear();
        self.implementations.clear();
        tracing::debug!("Container disposed");
    }
}
