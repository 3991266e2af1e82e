//! Tick List - a persistent todo list core
//!
//! Core modules:
//! - `list`: Item collection, edit state and the controller that mutates it
//! - `persistence`: Key-value store abstraction (LocalStorage on web, files on native)
//! - `platform`: Browser/native platform abstraction (clock, confirmation prompt)
//! - `settings`: User-tunable configuration

pub mod list;
pub mod persistence;
pub mod platform;
pub mod settings;

pub use list::{Change, Item, ItemAction, ItemId, Snapshot, SubscriptionId, TodoList};
pub use persistence::{MemoryStore, PersistentStore, StorageError};
pub use platform::{Clock, Confirm, SystemClock};
pub use settings::Settings;
