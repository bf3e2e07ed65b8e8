//! hostgrid-curator — interface to the distributed coordination store.
//!
//! Every stateful component goes through the [`Curator`] trait: scoped
//! locks, raw reads/writes, prefix listing. The physical store (ZooKeeper,
//! etcd, ...) lives behind this trait in an adapter crate; this crate only
//! defines the contract, the JSON record helpers, the namespace path
//! layout, and an in-process [`MemoryCurator`] used by tests.
//!
//! Cross-process truth always lives behind the curator. In-process maps in
//! the component crates are caches and gatekeepers, never the source of
//! truth for state shared between control-plane replicas.

pub mod curator;
pub mod error;
pub mod memory;
pub mod paths;

pub use curator::{Curator, CuratorLock, read_json, write_json};
pub use error::{CuratorError, CuratorResult};
pub use memory::MemoryCurator;
