//! # Dataset Architecture
//!
//! Dataset is an **in-memory record store with change tracking**. It holds an
//! ordered collection of opaque JSON records, gives each a stable identity and
//! tracks what happened to it since it was loaded, so that a UI can render the
//! records, let a user edit them and later hand exactly the changes to a backend.
//!
//! The store never renders and never talks to a backend itself. Renderers and
//! transport adapters are collaborators that call the query/mutation API and
//! listen to notifications.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Dataset (store/)                                           │
//! │  - Ordered items, identity index, current cursor, selection │
//! │  - Mutations, queries, dirty aggregate, notifications       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Filter (filter.rs)                                         │
//! │  - Which items a call applies to, resolved once per call    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  DataItem (item.rs)                                         │
//! │  - One record with identity, selection and lifecycle state  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Formats (format.rs)                                        │
//! │  - Per-property parse/format, placeholder patterns          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Item Lifecycle
//!
//! ```text
//!            load                 local load / add
//!             │                          │
//!             ▼                          ▼
//!          clean ──modify──▶ modified   added ──remove──▶ ignored
//!             │                 │
//!             └─────remove──────┴──────▶ removed
//! ```
//!
//! `added`, `modified` and `removed` items are dirty. `removed` and `ignored`
//! items are unreachable: they are hidden from default views and from
//! mutations but stay in the store until erased or reloaded. Only a reload or
//! [`Dataset::replace`] brings an item back to `clean`.
//!
//! ## Single Thread, Inline Callbacks
//!
//! Every call runs to completion and notifies its [`DatasetObserver`] inline
//! before returning (see [`observer`] for the order). The store is not `Sync`
//! and is meant to be owned by one thread of control.
//!
//! ## Module Overview
//!
//! - [`store`]: The [`Dataset`] and its operations
//! - [`filter`]: Filter variants and their resolution
//! - [`item`]: The [`DataItem`] record wrapper
//! - [`identity`]: Derived and surrogate identity strategies
//! - [`format`]: Value formats and the format registry
//! - [`observer`]: Notification interface
//! - [`config`]: Serializable configuration and the builder
//! - [`model`]: Keys, states and loose value equality
//! - [`error`]: Error types

pub mod config;
pub mod error;
pub mod filter;
pub mod format;
pub mod identity;
pub mod item;
pub mod model;
pub mod observer;
pub mod store;

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures;

pub use config::{DatasetBuilder, DatasetConfig, IdentityConfig};
pub use error::{DatasetError, Result};
pub use filter::{Filter, Status};
pub use format::{
    DateFormat, DateTimeFormat, DefaultFormat, FormatRegistry, InvalidValue, NumberFormat,
    ValueFormat,
};
pub use item::DataItem;
pub use model::{loose_eq, ItemState, Key, Record};
pub use observer::{DatasetObserver, LoggingObserver};
pub use store::{Anchor, Dataset, DatasetState, DirtyPartition, LoadOptions, Replacement};
