//! Entry store abstraction and its implementations.

pub mod entry_store;
pub mod memory;
pub mod weather_entry;

pub use entry_store::EntryStore;
pub use memory::InMemoryEntryStore;
pub use weather_entry::SqliteEntryStore;
