//! # junction
//!
//! A dependency-resolution runtime that builds and wires object graphs on
//! demand from declarative component metadata.
//!
//! ## Core Concepts
//!
//! - **Capability**: A trait-object type such as `dyn Logger`, marked with [`Interface`]
//! - **Component**: A concrete type that exports capabilities and may be singleton-scoped
//! - **Descriptor**: The explicit metadata table of a component: exports, scope and imports
//! - **Container**: The registry that resolves capabilities and wires component fields
//! - **Wired**: A set-once field cell the container fills during wiring
//!
//! ## Basic Usage
//!
//! Register implementations and resolve them by capability:
//!
//! ```rust
//! use junction::{Component, Container, Descriptor, Interface};
//! use std::sync::Arc;
//!
//! trait Storage: Send + Sync {
//!     fn name(&self) -> &'static str;
//! }
//!
//! impl Interface for dyn Storage {}
//!
//! #[derive(Default)]
//! struct MemoryStorage;
//!
//! impl Storage for MemoryStorage {
//!     fn name(&self) -> &'static str {
//!         "memory"
//!     }
//! }
//!
//! impl Component for MemoryStorage {
//!     fn descriptor() -> Descriptor<Self> {
//!         Descriptor::<Self>::new().export::<dyn Storage>(|this| this)
//!     }
//! }
//!
//! let container = Container::new();
//! container.register::<MemoryStorage>().unwrap();
//!
//! let storage = container.resolve_one::<dyn Storage>().unwrap();
//! assert_eq!(storage.name(), "memory");
//! ```
//!
//! ## Field Wiring
//!
//! Dependencies are declared as [`Wired`] fields. A singleton is built once
//! and shared by every component importing it:
//!
//! ```rust
//! use junction::{Component, Container, Descriptor, Interface, Wired};
//! use std::sync::Arc;
//!
//! trait Clock: Send + Sync {
//!     fn now(&self) -> u64;
//! }
//!
//! impl Interface for dyn Clock {}
//!
//! trait Job: Send + Sync {
//!     fn clock(&self) -> Option<&Arc<dyn Clock>>;
//! }
//!
//! impl Interface for dyn Job {}
//!
//! #[derive(Default)]
//! struct SystemClock;
//!
//! impl Clock for SystemClock {
//!     fn now(&self) -> u64 {
//!         1
//!     }
//! }
//!
//! impl Component for SystemClock {
//!     fn descriptor() -> Descriptor<Self> {
//!         Descriptor::<Self>::new()
//!             .singleton()
//!             .export::<dyn Clock>(|this| this)
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Cleanup {
//!     clock: Wired<Arc<dyn Clock>>,
//! }
//!
//! impl Job for Cleanup {
//!     fn clock(&self) -> Option<&Arc<dyn Clock>> {
//!         self.clock.get()
//!     }
//! }
//!
//! impl Component for Cleanup {
//!     fn descriptor() -> Descriptor<Self> {
//!         Descriptor::<Self>::new()
//!             .export::<dyn Job>(|this| this)
//!             .import("clock", |this| &this.clock)
//!     }
//! }
//!
//! let container = Container::new();
//! container.register::<SystemClock>().unwrap();
//! container.register::<Cleanup>().unwrap();
//!
//! let first = container.resolve_one::<dyn Job>().unwrap();
//! let second = container.resolve_one::<dyn Job>().unwrap();
//! assert!(!Arc::ptr_eq(&first, &second));
//! assert!(Arc::ptr_eq(first.clock().unwrap(), second.clock().unwrap()));
//! ```
//!
//! ## Using Macros
//!
//! With the `macros` feature enabled, descriptors are derived from
//! attributes:
//!
//! ```rust
//! use junction::{Component, Container, Wired, interface};
//! use std::sync::Arc;
//!
//! #[interface]
//! trait Plugin: Send + Sync {
//!     fn id(&self) -> u32;
//! }
//!
//! #[derive(Default, Component)]
//! #[export(dyn Plugin)]
//! struct First;
//!
//! impl Plugin for First {
//!     fn id(&self) -> u32 {
//!         1
//!     }
//! }
//!
//! #[derive(Default, Component)]
//! #[export(dyn Plugin)]
//! struct Second;
//!
//! impl Plugin for Second {
//!     fn id(&self) -> u32 {
//!         2
//!     }
//! }
//!
//! #[derive(Default, Component)]
//! struct Host {
//!     #[import_many]
//!     plugins: Wired<Vec<Arc<dyn Plugin>>>,
//! }
//!
//! let container = Container::new();
//! container.register::<First>().unwrap();
//! container.register::<Second>().unwrap();
//!
//! let host = Host::default();
//! container.wire_fields(&host).unwrap();
//! let ids: Vec<u32> = host.plugins.get().unwrap().iter().map(|p| p.id()).collect();
//! assert_eq!(ids, [1, 2]);
//! ```
//!
//! ## Features
//!
//! - `macros` (default): Enables `#[derive(Component)]` and `#[interface]`

mod config;
mod container;
mod descriptor;
mod error;
mod instantiate;
mod key;
mod registry;
mod resolver;
mod wire;
mod wired;

pub use config::*;
pub use container::*;
pub use descriptor::*;
pub use error::*;
pub use key::*;
pub use resolver::*;
pub use wired::*;

#[cfg(feature = "macros")]
pub use junction_macros::*;
