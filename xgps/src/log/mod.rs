//! Logger abstraction for components that log on behalf of the user.
//!
//! Most of the crate logs through `tracing` directly. Components whose log
//! output *is* their product, like the dry-run output sink that prints NMEA
//! sentences instead of writing them to a device, take an injected
//! `Arc<dyn Logger>` so the destination is explicit configuration:
//!
//! - [`TracingLogger`]: forwards to `tracing`, optionally tagged with a
//!   component name
//! - [`MemoryLogger`]: keeps every line, for tests and embedding
//! - [`NoOpLogger`]: discards everything
//!
//! ```
//! use std::sync::Arc;
//! use xgps::log::{Logger, MemoryLogger};
//! use xgps::log_info;
//!
//! let logger = Arc::new(MemoryLogger::new());
//! log_info!(logger, "Sent {} sentences", 2);
//! assert_eq!(logger.lines(), vec!["Sent 2 sentences".to_string()]);
//! ```

mod memory;
mod noop;
mod tracing_adapter;
mod r#trait;

pub use memory::MemoryLogger;
pub use noop::NoOpLogger;
pub use r#trait::{LogLevel, Logger};
pub use tracing_adapter::TracingLogger;
