//! `donor_registry` - A small blood donor registry backed by a flat JSON file
//!
//! This library provides the donor record store, the search and status-update
//! workflows over it, and the HTTP service that exposes them.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod donor;
pub mod error;
pub mod http;
pub mod logging;
pub mod registry;
pub mod storage;

pub use config::Config;
pub use donor::{Donor, DonorId};
pub use error::{Error, LoadWarning, Result};
pub use logging::init_logging;
pub use registry::{Registry, SearchQuery};
pub use storage::{DonorStore, StoreStats};
