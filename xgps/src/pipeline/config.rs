//! Runtime configuration store contents.

use std::net::SocketAddr;

use crate::nmea::Precision;
use crate::output::{SentenceKind, SerialParams};
use crate::xplane::DEFAULT_FREQUENCY;

/// Where sentences go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Serial(SerialParams),
    /// Log sentences instead of writing them (dry run).
    Log,
}

impl OutputTarget {
    pub fn is_configured(&self) -> bool {
        match self {
            OutputTarget::Serial(params) => params.is_configured(),
            OutputTarget::Log => true,
        }
    }
}

impl Default for OutputTarget {
    fn default() -> Self {
        OutputTarget::Serial(SerialParams::default())
    }
}

/// Everything a run needs.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Simulator address, usually from discovery.
    pub endpoint: Option<SocketAddr>,
    pub output: OutputTarget,
    /// RPOS records per second.
    pub frequency: u32,
    pub precision: Precision,
    /// Sentences written per sample, in order.
    pub sentences: Vec<SentenceKind>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            output: OutputTarget::default(),
            frequency: DEFAULT_FREQUENCY,
            precision: Precision::default(),
            sentences: SentenceKind::ALL.to_vec(),
        }
    }
}

impl AppConfig {
    /// Edit the serial parameters, switching the target to serial if needed.
    pub(crate) fn update_serial(&mut self, update: impl FnOnce(&mut SerialParams)) {
        let mut params = match &self.output {
            OutputTarget::Serial(params) => params.clone(),
            OutputTarget::Log => SerialParams::default(),
        };
        update(&mut params);
        self.output = OutputTarget::Serial(params);
    }
}
