use std::any::Any;
use std::sync::{Arc, Weak};

use crate::descriptor::Implementation;
use crate::registry::Registry;
use crate::{
    Catalog, Component, Config, Descriptor, Error, Instance, Interface, Key, Registration,
    Resolved, Result, Target, View,
};

/// Dependency-resolution runtime.
///
/// The container maps capabilities to the implementation types registered
/// for them, builds instances on demand and wires their empty import fields
/// by resolving those recursively. Singleton-scoped types are built once and
/// shared; all other types are built anew on every resolution.
///
/// Every new container registers a [`ContainerHandle`] exporting
/// `dyn Resolve`, so components can import the container itself.
///
/// # Examples
///
/// ```rust
/// use junction::{Component, Container, Descriptor, Interface, Wired};
/// use std::sync::Arc;
///
/// trait Logger: Send + Sync {
///     fn log(&self, message: &str) -> String;
/// }
///
/// impl Interface for dyn Logger {}
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// impl Interface for dyn Greeter {}
///
/// #[derive(Default)]
/// struct PrefixLogger;
///
/// impl Logger for PrefixLogger {
///     fn log(&self, message: &str) -> String {
///         format!("[log] {message}")
///     }
/// }
///
/// impl Component for PrefixLogger {
///     fn descriptor() -> Descriptor<Self> {
///         Descriptor::<Self>::new()
///             .singleton()
///             .export::<dyn Logger>(|this| this)
///     }
/// }
///
/// #[derive(Default)]
/// struct HelloGreeter {
///     logger: Wired<Arc<dyn Logger>>,
/// }
///
/// impl Greeter for HelloGreeter {
///     fn greet(&self) -> String {
///         self.logger.get().map(|l| l.log("hello")).unwrap_or_default()
///     }
/// }
///
/// impl Component for HelloGreeter {
///     fn descriptor() -> Descriptor<Self> {
///         Descriptor::<Self>::new()
///             .export::<dyn Greeter>(|this| this)
///             .import("logger", |this| &this.logger)
///     }
/// }
///
/// let container = Container::new();
/// container.register::<PrefixLogger>().unwrap();
/// container.register::<HelloGreeter>().unwrap();
///
/// let greeter = container.resolve_one::<dyn Greeter>().unwrap();
/// assert_eq!(greeter.greet(), "[log] hello");
/// ```
pub struct Container {
    registry: Arc<Registry>,
}

impl Container {
    pub fn new() -> Self {
        let registry = Arc::new(Registry::new());
        let handle = ContainerHandle {
            registry: Arc::downgrade(&registry),
        };
        registry.seed(
            &Arc::new(Implementation::of::<ContainerHandle>()),
            Arc::new(handle),
        );
        Self { registry }
    }

    /// Registers the implementation type `T` for every capability it
    /// exports.
    ///
    /// Registration is not idempotent: registering a type twice makes it a
    /// duplicate candidate for each of its capabilities.
    pub fn register<T>(&self) -> Result<()>
    where
        T: Component,
    {
        self.registry.register(&Arc::new(Implementation::of::<T>()))
    }

    /// Registers several implementation types in order.
    pub fn register_all<I>(&self, registrations: I) -> Result<()>
    where
        I: IntoIterator<Item = Registration>,
    {
        self.registry.ensure_live()?;
        for registration in registrations {
            self.registry.register(&registration.implementation)?;
        }
        Ok(())
    }

    /// Registers the components named by `config`, looked up in `catalog`.
    ///
    /// Every name is checked before anything is registered.
    pub fn register_config(&self, catalog: &Catalog, config: &Config) -> Result<()> {
        let registrations = config
            .components
            .iter()
            .map(|name| {
                catalog
                    .get(name)
                    .cloned()
                    .ok_or_else(|| Error::UnknownComponent { name: name.clone() })
            })
            .collect::<Result<Vec<_>>>()?;
        self.register_all(registrations)
    }

    /// Seeds the singleton slot of `T` with `instance`.
    ///
    /// Fails when `T` is not singleton-scoped or its slot already holds an
    /// instance, whether seeded or created by resolution. The seeded
    /// instance is not wired; call [`Container::wire_fields`] first if it
    /// needs its imports.
    pub fn register_singleton_instance<T>(&self, instance: impl Into<Arc<T>>) -> Result<()>
    where
        T: Component,
    {
        let instance: Instance = instance.into();
        self.registry
            .install_singleton(&Arc::new(Implementation::of::<T>()), instance)
    }

    /// Resolves the single implementation of `capability`.
    pub fn resolve(&self, capability: &Key) -> Result<Resolved> {
        self.registry.resolve_one(capability)
    }

    /// Resolves the single implementation of `I` as a capability handle.
    pub fn resolve_one<I>(&self) -> Result<Arc<I>>
    where
        I: ?Sized + Interface,
    {
        downcast(self.resolve(&Key::interface::<I>())?)
    }

    /// Resolves all implementations of `capability` in registration order.
    pub fn resolve_many(&self, capability: &Key) -> Result<Vec<Resolved>> {
        self.registry.resolve_many(capability)
    }

    /// Resolves all implementations of the element capability of `F` and
    /// packages them as `F`.
    pub fn resolve_many_as<F>(&self) -> Result<F>
    where
        F: Target,
    {
        let element = F::element();
        F::assemble(self.resolve_many(&element)?).ok_or_else(|| {
            Error::invalid_argument(format!(
                "'{}' cannot hold all instances of '{}'",
                std::any::type_name::<F>(),
                element
            ))
        })
    }

    /// Resolves all implementations of `I` as a fixed-size sequence.
    pub fn resolve_array<I>(&self) -> Result<Box<[Arc<I>]>>
    where
        I: ?Sized + Interface,
    {
        self.resolve_many_as()
    }

    /// Resolves all implementations of `I` as a growable sequence.
    pub fn resolve_list<I>(&self) -> Result<Vec<Arc<I>>>
    where
        I: ?Sized + Interface,
    {
        self.resolve_many_as()
    }

    /// Resolves all implementations of `I` as a read-only view.
    pub fn resolve_view<I>(&self) -> Result<View<I>>
    where
        I: ?Sized + Interface,
    {
        self.resolve_many_as()
    }

    /// Wires the empty import fields of a manually constructed component.
    pub fn wire_fields<T>(&self, instance: &T) -> Result<()>
    where
        T: Component,
    {
        let implementation = match self.registry.implementation(&std::any::TypeId::of::<T>()) {
            Some(v) => v,
            None => {
                let implementation = Arc::new(Implementation::of::<T>());
                implementation.validate()?;
                implementation
            }
        };
        self.registry.wire_erased(&implementation, instance)
    }

    /// Wires the empty import fields of an erased instance whose type has
    /// been registered.
    pub fn wire_instance(&self, instance: &Instance) -> Result<()> {
        wire_instance(&self.registry, instance)
    }

    /// Known capabilities in registration order.
    pub fn capabilities(&self) -> Result<Vec<Key>> {
        self.registry.ensure_live()?;
        Ok(self.registry.capabilities())
    }

    /// Renders every known capability, its implementations and their
    /// singleton slots. The format is meant for humans.
    pub fn dump_registry(&self) -> Result<String> {
        self.registry.ensure_live()?;
        Ok(self.registry.dump())
    }

    /// Returns a weak handle for ad-hoc resolution.
    pub fn handle(&self) -> ContainerHandle {
        ContainerHandle {
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Releases all registrations and singletons. Every later operation
    /// fails with [`Error::Disposed`].
    pub fn dispose(&self) {
        self.registry.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.registry.is_disposed()
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

fn downcast<I>(resolved: Resolved) -> Result<Arc<I>>
where
    I: ?Sized + Interface,
{
    resolved.downcast::<I>().map_err(|resolved| {
        Error::invalid_argument(format!(
            "'{}' did not resolve to '{}'",
            resolved.implementation(),
            std::any::type_name::<I>()
        ))
    })
}

fn wire_instance(registry: &Registry, instance: &Instance) -> Result<()> {
    registry.ensure_live()?;
    let target: &(dyn Any + Send + Sync) = instance.as_ref();
    let implementation = registry.implementation(&target.type_id()).ok_or_else(|| {
        Error::invalid_argument("instance type is not registered in this container")
    })?;
    registry.wire_erased(&implementation, target)
}

/// Object-safe resolution interface of a container.
///
/// Registered by every [`Container`] under its own capability, so a
/// component can import `Wired<Arc<dyn Resolve>>` and resolve lazily.
pub trait Resolve: Send + Sync {
    fn resolve(&self, capability: &Key) -> Result<Resolved>;

    fn resolve_many(&self, capability: &Key) -> Result<Vec<Resolved>>;

    fn wire_instance(&self, instance: &Instance) -> Result<()>;
}

impl Interface for dyn Resolve {}

impl dyn Resolve {
    /// Resolves the single implementation of `I` as a capability handle.
    pub fn resolve_one<I>(&self) -> Result<Arc<I>>
    where
        I: ?Sized + Interface,
    {
        downcast(self.resolve(&Key::interface::<I>())?)
    }

    /// Resolves all implementations of `I` in registration order.
    pub fn resolve_list<I>(&self) -> Result<Vec<Arc<I>>>
    where
        I: ?Sized + Interface,
    {
        self.resolve_many(&Key::interface::<I>())?
            .into_iter()
            .map(downcast::<I>)
            .collect()
    }
}

impl Resolve for Container {
    fn resolve(&self, capability: &Key) -> Result<Resolved> {
        Container::resolve(self, capability)
    }

    fn resolve_many(&self, capability: &Key) -> Result<Vec<Resolved>> {
        Container::resolve_many(self, capability)
    }

    fn wire_instance(&self, instance: &Instance) -> Result<()> {
        Container::wire_instance(self, instance)
    }
}

/// Weak handle to a [`Container`].
///
/// The handle does not keep the container alive. Once the container is
/// dropped or disposed, every operation fails with [`Error::Disposed`].
#[derive(Clone, Default)]
pub struct ContainerHandle {
    registry: Weak<Registry>,
}

impl ContainerHandle {
    fn registry(&self) -> Result<Arc<Registry>> {
        self.registry.upgrade().ok_or(Error::Disposed)
    }
}

impl Resolve for ContainerHandle {
    fn resolve(&self, capability: &Key) -> Result<Resolved> {
        self.registry()?.resolve_one(capability)
    }

    fn resolve_many(&self, capability: &Key) -> Result<Vec<Resolved>> {
        self.registry()?.resolve_many(capability)
    }

    fn wire_instance(&self, instance: &Instance) -> Result<()> {
        wire_instance(self.registry()?.as_ref(), instance)
    }
}

impl Component for ContainerHandle {
    fn descriptor() -> Descriptor<Self> {
        Descriptor::<Self>::new()
            .singleton()
            .export::<dyn Resolve>(|this| this)
    }
}
