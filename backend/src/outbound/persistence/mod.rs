//! Persistence adapters implementing the domain store ports.

pub mod firestore;
pub mod memory;

pub use firestore::{FirestoreConfig, FirestoreStore};
pub use memory::MemoryStore;
