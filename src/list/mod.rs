//! Todo list state
//!
//! Everything the presentation layer renders lives here:
//! - Insertion order only (newest first)
//! - Ids are creation timestamps and never change
//! - No rendering or platform dependencies

pub mod controller;
pub mod item;
pub mod observer;

pub use controller::{ItemAction, TodoList};
pub use item::{Item, ItemId, decode_items, encode_items};
pub use observer::{Change, Snapshot, SubscriptionId};
