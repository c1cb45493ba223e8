//! Versioned cache partitions
//!
//! A partition maps a request identity (method + URL) to a stored response.
//! Two partitions are current at any time, both named after the deployed
//! version; every other partition is garbage once that version activates.
//!
//! | Partition | Populated | Strategy that writes it |
//! |-----------|-----------|-------------------------|
//! | static | install, cache-first misses | cache-first |
//! | dynamic | runtime | network-first, stale-while-revalidate |

pub mod disk;
pub mod memory;
pub mod partition;
pub mod request;
pub mod storage;

pub use disk::DiskStorage;
pub use memory::MemoryStorage;
pub use partition::{PartitionInfo, PartitionKind, PartitionNames};
pub use request::{Method, Request, RequestKey, Response};
pub use storage::CacheStorage;
