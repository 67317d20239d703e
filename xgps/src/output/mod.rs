//! Output side of the pipeline: sentence generation and devices.

mod device;
mod error;
mod outputter;
mod sink;

pub use device::{
    DataBits, Device, Parity, SerialDevice, SerialParams, StopBits, DEFAULT_BAUD_RATE,
    SUPPORTED_BAUD_RATES,
};
pub use error::OutputError;
pub use outputter::{outputters_for, GgaOutputter, Outputter, SentenceKind, VtgOutputter};
pub use sink::{DeviceSink, LogSink, OutputSink};

#[cfg(test)]
pub(crate) use sink::tests::RecordingDevice;
