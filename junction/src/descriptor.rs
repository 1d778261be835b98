use std::any::{Any, type_name};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::{Error, Interface, Key, Resolved, Result, Shape, Target, Wired};

/// Type-erased component instance as stored by the container.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Trait for types the container can construct and wire.
///
/// A component is built bare through [`Default`] and then has its empty
/// [`Wired`] fields filled by the container. Its [`Descriptor`] declares the
/// capabilities it exports, whether it is a singleton, and which fields
/// import other capabilities.
///
/// # Examples
///
/// ```rust
/// use junction::{Component, Descriptor, Interface, Wired};
/// use std::sync::Arc;
///
/// trait Logger: Send + Sync {
///     fn log(&self, message: &str);
/// }
///
/// impl Interface for dyn Logger {}
///
/// #[derive(Default)]
/// struct ConsoleLogger;
///
/// impl Logger for ConsoleLogger {
///     fn log(&self, message: &str) {
///         println!("{message}");
///     }
/// }
///
/// impl Component for ConsoleLogger {
///     fn descriptor() -> Descriptor<Self> {
///         Descriptor::<Self>::new()
///             .singleton()
///             .export::<dyn Logger>(|this| this)
///     }
/// }
///
/// #[derive(Default)]
/// struct Service {
///     logger: Wired<Arc<dyn Logger>>,
/// }
///
/// impl Component for Service {
///     fn descriptor() -> Descriptor<Self> {
///         Descriptor::<Self>::new().import("logger", |this| &this.logger)
///     }
/// }
/// ```
pub trait Component: Default + Send + Sync + 'static {
    /// Returns the descriptor table for this type.
    fn descriptor() -> Descriptor<Self>;
}

/// Kind of import declared on a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportKind {
    /// The field holds exactly one resolved instance.
    Single,
    /// The field holds every instance registered for a capability.
    Many,
}

/// Descriptor table of a [`Component`].
///
/// Built with a fluent API, either by hand or by `#[derive(Component)]`.
pub struct Descriptor<T> {
    singleton: bool,
    exports: Vec<Export>,
    fields: Vec<FieldImport>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Descriptor<T>
where
    T: Component,
{
    pub fn new() -> Self {
        Self {
            singleton: false,
            exports: Vec::new(),
            fields: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Marks the component as singleton-scoped.
    pub fn singleton(mut self) -> Self {
        self.singleton = true;
        self
    }

    /// Exports the capability `I`. The cast turns a shared instance into
    /// the capability handle and is usually just `|this| this`.
    pub fn export<I>(mut self, cast: fn(Arc<T>) -> Arc<I>) -> Self
    where
        I: ?Sized + Interface,
    {
        self.exports.push(Export {
            key: Key::interface::<I>(),
            cast: Box::new(Upcast { cast }),
        });
        self
    }

    /// Declares a single import whose capability is inferred from the field
    /// type.
    pub fn import<F>(self, name: &'static str, access: fn(&T) -> &Wired<F>) -> Self
    where
        F: Target,
    {
        self.field(name, ImportKind::Single, None, access)
    }

    /// Declares a single import of an explicitly named capability.
    pub fn import_as<F>(
        self,
        name: &'static str,
        capability: Key,
        access: fn(&T) -> &Wired<F>,
    ) -> Self
    where
        F: Target,
    {
        self.field(name, ImportKind::Single, Some(capability), access)
    }

    /// Declares a multi import whose capability is inferred from the field's
    /// element type.
    pub fn import_many<F>(self, name: &'static str, access: fn(&T) -> &Wired<F>) -> Self
    where
        F: Target,
    {
        self.field(name, ImportKind::Many, None, access)
    }

    /// Declares a multi import of an explicitly named capability.
    pub fn import_many_as<F>(
        self,
        name: &'static str,
        capability: Key,
        access: fn(&T) -> &Wired<F>,
    ) -> Self
    where
        F: Target,
    {
        self.field(name, ImportKind::Many, Some(capability), access)
    }

    /// Wires the imports of an embedded component through `access`.
    ///
    /// Only field imports are taken over; exports and scope of the embedded
    /// component are not.
    pub fn embed<B>(mut self, name: &'static str, access: fn(&T) -> &B) -> Self
    where
        B: Component,
    {
        for field in B::descriptor().fields {
            self.fields.push(FieldImport {
                name: format!("{name}.{}", field.name),
                access: Box::new(Embedded {
                    access,
                    inner: field.access,
                }),
                ..field
            });
        }
        self
    }

    fn field<F>(
        mut self,
        name: &'static str,
        kind: ImportKind,
        capability: Option<Key>,
        access: fn(&T) -> &Wired<F>,
    ) -> Self
    where
        F: Target,
    {
        self.fields.push(FieldImport {
            name: name.to_string(),
            field_type: type_name::<F>(),
            kind,
            capability,
            element: F::element(),
            shape: F::SHAPE,
            access: Box::new(Accessor { access }),
        });
        self
    }
}

impl<T> Default for Descriptor<T>
where
    T: Component,
{
    fn default() -> Self {
        Self::new()
    }
}

trait Cast: Send + Sync {
    fn cast(&self, instance: &Instance) -> Option<Box<dyn Any + Send + Sync>>;
}

struct Upcast<T, I: ?Sized> {
    cast: fn(Arc<T>) -> Arc<I>,
}

impl<T, I> Cast for Upcast<T, I>
where
    T: Component,
    I: ?Sized + Interface,
{
    fn cast(&self, instance: &Instance) -> Option<Box<dyn Any + Send + Sync>> {
        let this = instance.clone().downcast::<T>().ok()?;
        Some(Box::new((self.cast)(this)))
    }
}

pub(crate) struct Export {
    pub(crate) key: Key,
    cast: Box<dyn Cast>,
}

trait FieldAccess: Send + Sync {
    fn is_set(&self, instance: &(dyn Any + Send + Sync)) -> Option<bool>;

    /// Returns `None` when the instance is of the wrong type or the values
    /// do not fit the field.
    fn assign(&self, instance: &(dyn Any + Send + Sync), values: Vec<Resolved>) -> Option<()>;
}

struct Accessor<T, F> {
    access: fn(&T) -> &Wired<F>,
}

impl<T, F> FieldAccess for Accessor<T, F>
where
    T: Component,
    F: Target,
{
    fn is_set(&self, instance: &(dyn Any + Send + Sync)) -> Option<bool> {
        let this = instance.downcast_ref::<T>()?;
        Some((self.access)(this).is_set())
    }

    fn assign(&self, instance: &(dyn Any + Send + Sync), values: Vec<Resolved>) -> Option<()> {
        let this = instance.downcast_ref::<T>()?;
        // A value stored concurrently wins; it is never overwritten.
        (self.access)(this).set(F::assemble(values)?);
        Some(())
    }
}

struct Embedded<T, B> {
    access: fn(&T) -> &B,
    inner: Box<dyn FieldAccess>,
}

impl<T, B> FieldAccess for Embedded<T, B>
where
    T: Component,
    B: Component,
{
    fn is_set(&self, instance: &(dyn Any + Send + Sync)) -> Option<bool> {
        let this = instance.downcast_ref::<T>()?;
        self.inner.is_set((self.access)(this))
    }

    fn assign(&self, instance: &(dyn Any + Send + Sync), values: Vec<Resolved>) -> Option<()> {
        let this = instance.downcast_ref::<T>()?;
        self.inner.assign((self.access)(this), values)
    }
}

/// Import declaration of a single field, as read from a descriptor.
pub(crate) struct FieldImport {
    pub(crate) name: String,
    pub(crate) field_type: &'static str,
    pub(crate) kind: ImportKind,
    pub(crate) capability: Option<Key>,
    pub(crate) element: Key,
    pub(crate) shape: Shape,
    access: Box<dyn FieldAccess>,
}

impl FieldImport {
    pub(crate) fn is_set(&self, instance: &(dyn Any + Send + Sync)) -> Option<bool> {
        self.access.is_set(instance)
    }

    pub(crate) fn assign(
        &self,
        instance: &(dyn Any + Send + Sync),
        values: Vec<Resolved>,
    ) -> Option<()> {
        self.access.assign(instance, values)
    }
}

/// Erased metadata of a registered implementation type.
pub(crate) struct Implementation {
    pub(crate) key: Key,
    pub(crate) singleton: bool,
    pub(crate) exports: Vec<Export>,
    pub(crate) fields: Vec<FieldImport>,
    create: fn() -> Instance,
}

fn create<T>() -> Instance
where
    T: Component,
{
    Arc::new(T::default())
}

impl Implementation {
    pub(crate) fn of<T>() -> Self
    where
        T: Component,
    {
        let descriptor = T::descriptor();
        Self {
            key: Key::of::<T>(),
            singleton: descriptor.singleton,
            exports: descriptor.exports,
            fields: descriptor.fields,
            create: create::<T>,
        }
    }

    /// Rejects export and explicit import targets that are not interfaces,
    /// and single imports whose capability differs from the field type.
    pub(crate) fn validate(&self) -> Result<()> {
        let explicit = self.fields.iter().filter_map(|f| f.capability);
        for key in self.exports.iter().map(|e| e.key).chain(explicit) {
            if !key.is_interface() {
                return Err(Error::InvalidCapability { name: key.name() });
            }
        }
        for field in &self.fields {
            if field.shape == Shape::Single
                && field.capability.is_some_and(|key| key != field.element)
            {
                return Err(Error::unwireable(
                    self.key.name(),
                    &field.name,
                    "imported capability does not match field type",
                ));
            }
        }
        Ok(())
    }

    /// Builds a bare, unwired instance.
    pub(crate) fn create(&self) -> Instance {
        (self.create)()
    }

    pub(crate) fn cast(
        &self,
        capability: &Key,
        instance: &Instance,
    ) -> Option<Box<dyn Any + Send + Sync>> {
        self.exports
            .iter()
            .find(|e| e.key == *capability)
            .and_then(|e| e.cast.cast(instance))
    }

    /// Iterates the import declarations of fields still empty on `instance`.
    pub(crate) fn unset_imports<'a>(
        &'a self,
        instance: &'a (dyn Any + Send + Sync),
    ) -> impl Iterator<Item = &'a FieldImport> + 'a {
        self.fields
            .iter()
            .filter(move |f| f.is_set(instance) == Some(false))
    }
}

/// Registration of an implementation type, usable where a list of types is
/// expected.
///
/// ```rust
/// use junction::{Component, Container, Descriptor, Registration};
///
/// #[derive(Default)]
/// struct Worker;
///
/// impl Component for Worker {
///     fn descriptor() -> Descriptor<Self> {
///         Descriptor::new()
///     }
/// }
///
/// let container = Container::new();
/// container.register_all([Registration::of::<Worker>()]).unwrap();
/// ```
#[derive(Clone)]
pub struct Registration {
    pub(crate) implementation: Arc<Implementation>,
}

impl Registration {
    pub fn of<T>() -> Self
    where
        T: Component,
    {
        Self {
            implementation: Arc::new(Implementation::of::<T>()),
        }
    }

    /// Key of the implementation type.
    pub fn key(&self) -> Key {
        self.implementation.key
    }
}
