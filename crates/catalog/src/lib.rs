//! Catalog domain module (event-sourced).
//!
//! This crate contains business rules for catalog entries — the sellable
//! representation of dealership vehicles — implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod category;
pub mod entry;

pub use category::{CategoryBook, CategoryId};
pub use entry::{
    AttachOrigin, CatalogEntry, CatalogEntryId, CreateEntry, DetachOrigin, EntryCommand,
    EntryCreated, EntryEvent, EntryMarkedAvailable, EntryMarkedUnavailable, EntrySynced,
    MarkAvailable, MarkUnavailable, OriginAttached, OriginDetached, SyncEntry,
};
