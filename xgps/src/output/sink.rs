//! Sample consumers.
//!
//! An [`OutputSink`] drains the pipeline's sample channel on a blocking
//! worker thread. It has no cancellation path of its own: it finishes when
//! the telemetry source drops its sender and the channel closes.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::device::{Device, SerialDevice, SerialParams};
use super::error::OutputError;
use super::outputter::Outputter;
use crate::log::Logger;
use crate::status::StatusReporter;
use crate::xplane::TelemetrySample;
use crate::{log_debug, log_info};

/// Consumes samples until the channel closes.
pub trait OutputSink: Send {
    /// Whether [`drain`](Self::drain) can run with the current settings.
    fn is_configured(&self) -> bool;

    /// Run every outputter over every sample and emit the sentences.
    ///
    /// Blocks the calling thread. Returns `Ok(())` once the sample channel
    /// is closed and empty.
    fn drain(
        &mut self,
        samples: &mut mpsc::Receiver<TelemetrySample>,
        status: &StatusReporter,
    ) -> Result<(), OutputError>;
}

impl<S: OutputSink + ?Sized> OutputSink for Box<S> {
    fn is_configured(&self) -> bool {
        (**self).is_configured()
    }

    fn drain(
        &mut self,
        samples: &mut mpsc::Receiver<TelemetrySample>,
        status: &StatusReporter,
    ) -> Result<(), OutputError> {
        (**self).drain(samples, status)
    }
}

/// Closes the wrapped device when dropped.
struct CloseOnDrop<'a, D: Device>(&'a mut D);

impl<D: Device> Deref for CloseOnDrop<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        self.0
    }
}

impl<D: Device> DerefMut for CloseOnDrop<'_, D> {
    fn deref_mut(&mut self) -> &mut D {
        self.0
    }
}

impl<D: Device> Drop for CloseOnDrop<'_, D> {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// Writes sentences to a device, by default a serial port.
pub struct DeviceSink<D = SerialDevice> {
    device: D,
    params: SerialParams,
    outputters: Vec<Box<dyn Outputter>>,
}

impl DeviceSink<SerialDevice> {
    pub fn serial(params: SerialParams, outputters: Vec<Box<dyn Outputter>>) -> Self {
        Self::new(SerialDevice::new(), params, outputters)
    }
}

impl<D: Device> DeviceSink<D> {
    pub fn new(device: D, params: SerialParams, outputters: Vec<Box<dyn Outputter>>) -> Self {
        Self {
            device,
            params,
            outputters,
        }
    }

    pub fn params(&self) -> &SerialParams {
        &self.params
    }

    pub fn device(&self) -> &D {
        &self.device
    }
}

impl<D: Device> OutputSink for DeviceSink<D> {
    fn is_configured(&self) -> bool {
        self.params.is_configured()
    }

    fn drain(
        &mut self,
        samples: &mut mpsc::Receiver<TelemetrySample>,
        status: &StatusReporter,
    ) -> Result<(), OutputError> {
        let Self {
            device,
            params,
            outputters,
        } = self;
        let mut device = CloseOnDrop(device);

        if let Err(e) = device.open(params) {
            warn!(error = %e, "Failed to open output device");
            status.info(e.to_string());
            return Err(e);
        }
        debug!(params = %params, "Output device ready");

        let mut written: u64 = 0;
        while let Some(sample) = samples.blocking_recv() {
            for outputter in outputters.iter() {
                let sentence = match outputter.output(&sample) {
                    Ok(sentence) => sentence,
                    Err(e) => {
                        warn!(sentence = outputter.name(), error = %e, "Output failed");
                        status.info(format!("Output failed: {}", e));
                        continue;
                    }
                };

                if let Err(e) = device.write(sentence.as_bytes()) {
                    warn!(error = %e, "Device write failed");
                    status.info(e.to_string());
                    return Err(e);
                }
                written += 1;
                debug!(sentence = sentence.trim_end(), "Sent");
            }
        }

        info!(written, "Sample channel closed, output finished");
        Ok(())
    }
}

/// Writes sentences to a logger instead of a device.
///
/// Always configured; used for dry runs.
pub struct LogSink {
    logger: Arc<dyn Logger>,
    outputters: Vec<Box<dyn Outputter>>,
}

impl LogSink {
    pub fn new(logger: Arc<dyn Logger>, outputters: Vec<Box<dyn Outputter>>) -> Self {
        Self { logger, outputters }
    }
}

impl OutputSink for LogSink {
    fn is_configured(&self) -> bool {
        true
    }

    fn drain(
        &mut self,
        samples: &mut mpsc::Receiver<TelemetrySample>,
        status: &StatusReporter,
    ) -> Result<(), OutputError> {
        while let Some(sample) = samples.blocking_recv() {
            log_debug!(
                self.logger,
                "Position lat={:.6} lon={:.6} ele={:.1}",
                sample.latitude,
                sample.longitude,
                sample.elevation
            );
            for outputter in &self.outputters {
                match outputter.output(&sample) {
                    Ok(sentence) => log_info!(self.logger, "{}", sentence.trim_end()),
                    Err(e) => {
                        warn!(sentence = outputter.name(), error = %e, "Output failed");
                        status.info(format!("Output failed: {}", e));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::log::{MemoryLogger, NoOpLogger};
    use crate::nmea::Precision;
    use crate::output::outputter::{outputters_for, SentenceKind};
    use crate::status::{status_channel, Status};
    use parking_lot::Mutex;

    #[derive(Debug, Default)]
    pub(crate) struct DeviceLog {
        pub(crate) opens: usize,
        pub(crate) closes: usize,
        pub(crate) writes: Vec<Vec<u8>>,
    }

    /// Records calls; can be told to fail opening or writing.
    #[derive(Default)]
    pub(crate) struct RecordingDevice {
        pub(crate) log: Arc<Mutex<DeviceLog>>,
        pub(crate) open: bool,
        pub(crate) fail_open: bool,
        pub(crate) fail_write: bool,
    }

    impl Device for RecordingDevice {
        fn open(&mut self, params: &SerialParams) -> Result<(), OutputError> {
            self.log.lock().opens += 1;
            if self.fail_open {
                return Err(OutputError::DeviceOpen {
                    port: params.port.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such device"),
                });
            }
            self.open = true;
            Ok(())
        }

        fn write(&mut self, bytes: &[u8]) -> Result<(), OutputError> {
            if self.fail_write {
                return Err(OutputError::Write(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "unplugged",
                )));
            }
            self.log.lock().writes.push(bytes.to_vec());
            Ok(())
        }

        fn close(&mut self) {
            self.log.lock().closes += 1;
            self.open = false;
        }

        fn is_open(&self) -> bool {
            self.open
        }
    }

    /// Fails for every sample.
    struct BrokenOutputter;

    impl Outputter for BrokenOutputter {
        fn name(&self) -> &'static str {
            "BROKEN"
        }

        fn output(&self, _sample: &TelemetrySample) -> Result<String, OutputError> {
            Err(OutputError::Encode {
                sentence: "BROKEN",
                reason: "always".into(),
            })
        }
    }

    fn sample() -> TelemetrySample {
        TelemetrySample {
            latitude: 10.0,
            longitude: 20.0,
            ..Default::default()
        }
    }

    fn params() -> SerialParams {
        SerialParams::new("/dev/ttyTEST", 9600)
    }

    fn sink_for(device: RecordingDevice, kinds: &[SentenceKind]) -> DeviceSink<RecordingDevice> {
        DeviceSink::new(device, params(), outputters_for(kinds, Precision::Standard))
    }

    #[test]
    fn test_closed_channel_closes_device_once() {
        let device = RecordingDevice::default();
        let log = Arc::clone(&device.log);
        let mut sink = sink_for(device, &SentenceKind::ALL);

        let (tx, mut rx) = mpsc::channel(1);
        drop(tx);
        let (reporter, _stream) = status_channel();

        sink.drain(&mut rx, &reporter).unwrap();

        let log = log.lock();
        assert_eq!(log.opens, 1);
        assert_eq!(log.closes, 1);
        assert!(log.writes.is_empty());
        assert!(!sink.device().is_open());
    }

    #[test]
    fn test_writes_every_sentence_verbatim() {
        let device = RecordingDevice::default();
        let log = Arc::clone(&device.log);
        let outputters = outputters_for(&SentenceKind::ALL, Precision::Standard);
        let expected: Vec<Vec<u8>> = outputters
            .iter()
            .map(|o| o.output(&sample()).unwrap().into_bytes())
            .collect();
        // GGA carries the current time; only compare VTG bytes exactly
        let mut sink = DeviceSink::new(device, params(), outputters);

        let (tx, mut rx) = mpsc::channel(4);
        tx.try_send(sample()).unwrap();
        tx.try_send(sample()).unwrap();
        drop(tx);
        let (reporter, _stream) = status_channel();

        sink.drain(&mut rx, &reporter).unwrap();

        let log = log.lock();
        assert_eq!(log.writes.len(), 4);
        assert!(log.writes[0].starts_with(b"$GPGGA,"));
        assert_eq!(log.writes[1], expected[1]);
        assert_eq!(log.writes[3], expected[1]);
        assert_eq!(log.closes, 1);
    }

    #[test]
    fn test_open_failure_consumes_nothing() {
        let device = RecordingDevice {
            fail_open: true,
            ..Default::default()
        };
        let log = Arc::clone(&device.log);
        let mut sink = sink_for(device, &SentenceKind::ALL);

        let (tx, mut rx) = mpsc::channel(4);
        tx.try_send(sample()).unwrap();
        let (reporter, mut stream) = status_channel();

        let result = sink.drain(&mut rx, &reporter);

        assert!(matches!(result, Err(OutputError::DeviceOpen { .. })));
        assert!(rx.try_recv().is_ok(), "sample must still be queued");
        assert!(matches!(stream.try_recv(), Some(Status::Info(m)) if m.contains("/dev/ttyTEST")));
        let log = log.lock();
        assert_eq!(log.closes, 1);
        assert!(log.writes.is_empty());
    }

    #[test]
    fn test_outputter_failure_skips_only_that_sentence() {
        let device = RecordingDevice::default();
        let log = Arc::clone(&device.log);
        let outputters: Vec<Box<dyn Outputter>> = vec![
            Box::new(BrokenOutputter),
            SentenceKind::Vtg.outputter(Precision::Standard),
        ];
        let mut sink = DeviceSink::new(device, params(), outputters);

        let (tx, mut rx) = mpsc::channel(4);
        tx.try_send(sample()).unwrap();
        tx.try_send(sample()).unwrap();
        drop(tx);
        let (reporter, mut stream) = status_channel();

        sink.drain(&mut rx, &reporter).unwrap();

        assert_eq!(log.lock().writes.len(), 2);
        for _ in 0..2 {
            assert!(matches!(
                stream.try_recv(),
                Some(Status::Info(m)) if m.starts_with("Output failed")
            ));
        }
        assert_eq!(stream.try_recv(), None);
    }

    #[test]
    fn test_write_failure_stops_and_closes() {
        let device = RecordingDevice {
            fail_write: true,
            ..Default::default()
        };
        let log = Arc::clone(&device.log);
        let mut sink = sink_for(device, &[SentenceKind::Vtg]);

        let (tx, mut rx) = mpsc::channel(4);
        tx.try_send(sample()).unwrap();
        let (reporter, _stream) = status_channel();

        assert!(matches!(sink.drain(&mut rx, &reporter), Err(OutputError::Write(_))));
        assert_eq!(log.lock().closes, 1);
    }

    #[test]
    fn test_is_configured() {
        let device = RecordingDevice::default();
        let sink = DeviceSink::new(device, SerialParams::default(), Vec::new());
        assert!(!sink.is_configured());

        let sink = LogSink::new(Arc::new(NoOpLogger), Vec::new());
        assert!(sink.is_configured());
    }

    #[test]
    fn test_log_sink_reports_outputter_failures() {
        let mut sink = LogSink::new(Arc::new(NoOpLogger), vec![Box::new(BrokenOutputter)]);

        let (tx, mut rx) = mpsc::channel(4);
        tx.try_send(sample()).unwrap();
        drop(tx);
        let (reporter, mut stream) = status_channel();

        sink.drain(&mut rx, &reporter).unwrap();

        assert!(matches!(
            stream.try_recv(),
            Some(Status::Info(m)) if m.starts_with("Output failed")
        ));
        assert_eq!(stream.try_recv(), None);
    }

    #[test]
    fn test_log_sink_logs_sentences() {
        let logger = Arc::new(MemoryLogger::new());
        let mut sink = LogSink::new(
            logger.clone(),
            outputters_for(&[SentenceKind::Vtg], Precision::Standard),
        );

        let (tx, mut rx) = mpsc::channel(4);
        tx.try_send(sample()).unwrap();
        drop(tx);
        let (reporter, _stream) = status_channel();

        sink.drain(&mut rx, &reporter).unwrap();

        let lines = logger.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Position lat=10.000000"));
        assert!(lines[1].starts_with("$GPVTG,0.000,T"));
        assert!(!lines[1].ends_with('\n'));
    }
}
