//! Common utilities shared by discovery, execution and the CLI

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use error::{DiscoveryError, Error, Result};
