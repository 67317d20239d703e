//! CLI command implementations.
//!
//! - [`config`] - Configuration file helpers (path, show, init)
//! - [`discover`] - Find X-Plane instances on the network
//! - [`run`] - Stream positions to the serial device
//! - [`sentence`] - Print sentences for a given position

pub mod config;
pub mod discover;
pub mod run;
pub mod sentence;
