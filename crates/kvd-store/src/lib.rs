//! Database registry, configuration loading, and the LSM engine adapter
//! that backs each opened database.

pub mod config;
pub mod engine;
pub mod registry;

pub use config::StoreOptions;
pub use engine::{EngineError, RocksStore, Store};
pub use registry::{Registry, StoreHandle};
