//! Calendar providers shipped with the crate.

pub mod local_store;

pub use local_store::LocalStoreHandle;
