use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::{Interface, Key, Resolved};

/// Set-once cell holding an injected dependency.
///
/// A component declares each dependency field as `Wired<F>`. The field
/// starts empty after default construction and is filled by the container
/// during field wiring. A cell that already holds a value is never
/// overwritten, so values supplied up front block injection for that field.
///
/// ```rust
/// use junction::{Interface, Wired};
/// use std::sync::Arc;
///
/// trait Clock: Send + Sync {
///     fn now(&self) -> u64;
/// }
///
/// impl Interface for dyn Clock {}
///
/// struct Fixed;
///
/// impl Clock for Fixed {
///     fn now(&self) -> u64 {
///         42
///     }
/// }
///
/// let clock: Wired<Arc<dyn Clock>> = Wired::new();
/// assert!(!clock.is_set());
///
/// let clock: Wired<Arc<dyn Clock>> = Wired::with(Arc::new(Fixed));
/// assert_eq!(clock.get().map(|c| c.now()), Some(42));
/// ```
pub struct Wired<T>(OnceLock<T>);

impl<T> Wired<T> {
    /// Creates an empty cell.
    pub fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Creates a cell that already holds `value`.
    pub fn with(value: T) -> Self {
        Self(OnceLock::from(value))
    }

    pub fn get(&self) -> Option<&T> {
        self.0.get()
    }

    pub fn is_set(&self) -> bool {
        self.0.get().is_some()
    }

    /// Stores `value` if the cell is still empty. Returns `false` when the
    /// cell was already filled.
    pub fn set(&self, value: T) -> bool {
        self.0.set(value).is_ok()
    }

    pub fn into_inner(self) -> Option<T> {
        self.0.into_inner()
    }
}

impl<T> Default for Wired<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Wired<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.is_set() {
            true => f.write_str("Wired(<set>)"),
            false => f.write_str("Wired(<unset>)"),
        }
    }
}

/// Declared shape of a dependency field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    /// `Arc<dyn I>`
    Single,
    /// `Box<[Arc<dyn I>]>`
    Fixed,
    /// `Vec<Arc<dyn I>>`
    Growable,
    /// `View<dyn I>`
    View,
}

/// Value types a [`Wired`] field may hold.
///
/// The set of implementations is closed: a single capability handle and the
/// three sequence shapes. Every sequence shape is assembled from the same
/// eagerly resolved list of values.
pub trait Target: Sized + Send + Sync + 'static {
    const SHAPE: Shape;

    /// Capability inferred from the field type.
    fn element() -> Key;

    /// Builds the field value. Returns `None` when the values do not fit
    /// the shape or are not views of the element capability.
    fn assemble(values: Vec<Resolved>) -> Option<Self>;
}

fn collect<I>(values: Vec<Resolved>) -> Option<Vec<Arc<I>>>
where
    I: ?Sized + Interface,
{
    values.into_iter().map(|v| v.downcast::<I>().ok()).collect()
}

impl<I> Target for Arc<I>
where
    I: ?Sized + Interface,
{
    const SHAPE: Shape = Shape::Single;

    fn element() -> Key {
        Key::interface::<I>()
    }

    fn assemble(values: Vec<Resolved>) -> Option<Self> {
        let mut values = values.into_iter();
        match (values.next(), values.next()) {
            (Some(value), None) => value.downcast::<I>().ok(),
            _ => None,
        }
    }
}

impl<I> Target for Box<[Arc<I>]>
where
    I: ?Sized + Interface,
{
    const SHAPE: Shape = Shape::Fixed;

    fn element() -> Key {
        Key::interface::<I>()
    }

    fn assemble(values: Vec<Resolved>) -> Option<Self> {
        collect::<I>(values).map(Vec::into_boxed_slice)
    }
}

impl<I> Target for Vec<Arc<I>>
where
    I: ?Sized + Interface,
{
    const SHAPE: Shape = Shape::Growable;

    fn element() -> Key {
        Key::interface::<I>()
    }

    fn assemble(values: Vec<Resolved>) -> Option<Self> {
        collect::<I>(values)
    }
}

impl<I> Target for View<I>
where
    I: ?Sized + Interface,
{
    const SHAPE: Shape = Shape::View;

    fn element() -> Key {
        Key::interface::<I>()
    }

    fn assemble(values: Vec<Resolved>) -> Option<Self> {
        collect::<I>(values).map(|v| View(Arc::from(v)))
    }
}

/// Read-only, cheaply cloneable sequence of resolved capability handles.
pub struct View<I: ?Sized>(Arc<[Arc<I>]>);

impl<I: ?Sized> View<I> {
    pub fn iter(&self) -> std::slice::Iter<'_, Arc<I>> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<I: ?Sized> Clone for View<I> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<I: ?Sized> std::ops::Deref for View<I> {
    type Target = [Arc<I>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a, I: ?Sized> IntoIterator for &'a View<I> {
    type Item = &'a Arc<I>;
    type IntoIter = std::slice::Iter<'a, Arc<I>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<I: ?Sized> From<Vec<Arc<I>>> for View<I> {
    fn from(value: Vec<Arc<I>>) -> Self {
        Self(Arc::from(value))
    }
}
