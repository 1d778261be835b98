use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Component, Registration, Result};

/// Manifest of components to register, usually loaded from JSON.
///
/// ```rust
/// use junction::Config;
///
/// let config = Config::parse(r#"{ "components": ["logger", "service"] }"#).unwrap();
/// assert_eq!(config.components, ["logger", "service"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub components: Vec<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_component(mut self, name: impl Into<String>) -> Self {
        self.components.push(name.into());
        self
    }

    pub fn parse<T>(text: T) -> Result<Self>
    where
        T: AsRef<str>,
    {
        Ok(serde_json::from_str(text.as_ref())?)
    }

    pub fn parse_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(text)
    }

    /// Appends the components of `other` after the ones already listed.
    pub fn merge_from(&mut self, other: Self) {
        self.components.extend(other.components);
    }
}

/// Named registrations a [`Config`] can refer to.
#[derive(Clone, Default)]
pub struct Catalog {
    entries: BTreeMap<String, Registration>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `T` under `name`, replacing an earlier entry with the same name.
    pub fn add<T>(&mut self, name: impl Into<String>) -> &mut Self
    where
        T: Component,
    {
        self.entries.insert(name.into(), Registration::of::<T>());
        self
    }

    /// Adds `T` under its type name.
    pub fn add_named<T>(&mut self) -> &mut Self
    where
        T: Component,
    {
        self.add::<T>(std::any::type_name::<T>())
    }

    pub fn get(&self, name: &str) -> Option<&Registration> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
