//! recym-cache - offline resource cache manager
//!
//! Intercepts page resource requests and answers them from versioned cache
//! partitions, falling back to the network per resource class.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod host;
pub mod journal;
pub mod worker;

pub use error::{RecymError, RecymResult};
