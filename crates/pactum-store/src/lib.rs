//! # Pactum Store
//!
//! Storage adapters implementing the `EscrowStore` seam from `pactum-core`.
//! Ships the in-memory store used by the watchdog service and the test
//! suites; persistent backends plug in behind the same trait.

pub mod memory;

pub use memory::MemoryStore;
