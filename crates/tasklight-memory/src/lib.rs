// tasklight-memory — in-memory UserStore.
//
// HashMap-based store for fast, ephemeral data. Ideal for tests,
// prototyping, and development; data is lost when the store is dropped.

pub mod store;

pub use store::MemoryStore;
