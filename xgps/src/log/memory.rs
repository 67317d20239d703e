//! Logger that keeps every message in memory.

use crate::log::{LogLevel, Logger};
use parking_lot::Mutex;
use std::fmt::Arguments;

#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message with its level, oldest first.
    pub fn entries(&self) -> Vec<(LogLevel, String)> {
        self.entries.lock().clone()
    }

    /// Message text only, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.entries.lock().iter().map(|(_, m)| m.clone()).collect()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Logger for MemoryLogger {
    fn log(&self, level: LogLevel, args: Arguments<'_>) {
        self.entries.lock().push((level, args.to_string()));
    }
}
