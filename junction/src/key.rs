use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Marker trait for capability contracts.
///
/// A capability is a trait-object type such as `dyn Logger`. Only types
/// implementing this trait can be requested through the typed resolution
/// API or used as the element of a wired field.
///
/// Implement it for your trait object directly, or let the `#[interface]`
/// attribute do it:
///
/// ```rust
/// use junction::Interface;
///
/// trait Logger: Send + Sync {
///     fn log(&self, message: &str);
/// }
///
/// impl Interface for dyn Logger {}
/// ```
pub trait Interface: Send + Sync + 'static {}

/// Runtime identity of a type known to the container.
///
/// Keys compare and hash by [`TypeId`] only. The interface flag records
/// whether the key was built from an [`Interface`] and therefore may be used
/// as a capability.
#[derive(Clone, Copy)]
pub struct Key {
    id: TypeId,
    name: &'static str,
    interface: bool,
}

impl Key {
    /// Builds a key for an arbitrary type. Such a key is never a valid
    /// capability.
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            interface: false,
        }
    }

    /// Builds a capability key for an interface type.
    pub fn interface<I>() -> Self
    where
        I: ?Sized + Interface,
    {
        Self {
            id: TypeId::of::<I>(),
            name: type_name::<I>(),
            interface: true,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_interface(&self) -> bool {
        self.interface
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Key").field(&self.name).finish()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
