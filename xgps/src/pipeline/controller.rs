//! Pipeline lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::config::{AppConfig, OutputTarget};
use super::error::PipelineError;
use super::state::ConnectionState;
use crate::log::{Logger, TracingLogger};
use crate::nmea::Precision;
use crate::output::{outputters_for, DeviceSink, LogSink, OutputSink, SentenceKind, SerialParams};
use crate::status::{status_channel, Status, StatusStream};
use crate::xplane::{
    bind_ephemeral, TelemetrySource, TelemetrySourceConfig, TelemetryTransport, MAX_FREQUENCY,
};

/// Samples buffered between source and sink.
const SAMPLE_CHANNEL_CAPACITY: usize = 16;

struct Inner {
    config: AppConfig,
    running: bool,
}

/// Configuration store and run controller.
///
/// Cheap to clone; every clone shares one configuration guarded by a single
/// lock, so a front-end can keep editing settings while a run is active.
/// Changes take effect on the next run.
#[derive(Clone)]
pub struct Pipeline {
    inner: Arc<Mutex<Inner>>,
    logger: Arc<dyn Logger>,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                config,
                running: false,
            })),
            logger: Arc::new(TracingLogger::with_component("nmea")),
        }
    }

    /// Logger used by dry runs ([`OutputTarget::Log`]).
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn state(&self) -> ConnectionState {
        let inner = self.inner.lock();
        ConnectionState::derive(
            inner.config.endpoint.is_some(),
            inner.config.output.is_configured(),
            inner.running,
        )
    }

    pub fn is_running(&self) -> bool {
        self.inner.lock().running
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> AppConfig {
        self.inner.lock().config.clone()
    }

    pub fn endpoint(&self) -> Option<SocketAddr> {
        self.inner.lock().config.endpoint
    }

    pub fn set_endpoint(&self, endpoint: Option<SocketAddr>) {
        debug!(endpoint = ?endpoint, "Set simulator endpoint");
        self.inner.lock().config.endpoint = endpoint;
    }

    pub fn set_output(&self, output: OutputTarget) {
        debug!(output = ?output, "Set output");
        self.inner.lock().config.output = output;
    }

    pub fn set_serial_params(&self, params: SerialParams) {
        self.set_output(OutputTarget::Serial(params));
    }

    pub fn set_serial_port(&self, port: &str) {
        debug!(port, "Set serial port");
        self.inner
            .lock()
            .config
            .update_serial(|params| params.port = port.to_string());
    }

    pub fn set_baud_rate(&self, baud_rate: u32) {
        debug!(baud_rate, "Set baud rate");
        self.inner
            .lock()
            .config
            .update_serial(|params| params.baud_rate = baud_rate);
    }

    /// Set the RPOS poll rate, 1 to 60 Hz.
    pub fn set_frequency(&self, frequency: u32) -> Result<(), PipelineError> {
        if !(1..=MAX_FREQUENCY).contains(&frequency) {
            return Err(PipelineError::InvalidFrequency(frequency));
        }
        debug!(frequency, "Set position frequency");
        self.inner.lock().config.frequency = frequency;
        Ok(())
    }

    pub fn set_precision(&self, precision: Precision) {
        debug!(%precision, "Set precision");
        self.inner.lock().config.precision = precision;
    }

    pub fn set_sentences(&self, sentences: Vec<SentenceKind>) {
        debug!(sentences = ?sentences, "Set sentences");
        self.inner.lock().config.sentences = sentences;
    }

    /// Start a run with the configured output.
    ///
    /// Must be called inside a tokio runtime. Returns the merged status
    /// stream; it closes only after both the telemetry source and the output
    /// sink have finished, at which point the pipeline is back to
    /// [`ConnectionState::Runable`].
    ///
    /// The pipeline never cancels itself: on [`Status::Fatal`] the caller is
    /// expected to cancel `cancel`.
    pub fn run(&self, cancel: CancellationToken) -> Result<StatusStream, PipelineError> {
        let (config, endpoint) = self.begin(None)?;

        let socket = match bind_ephemeral() {
            Ok(socket) => socket,
            Err(e) => {
                self.inner.lock().running = false;
                return Err(e.into());
            }
        };

        let outputters = outputters_for(&config.sentences, config.precision);
        let sink: Box<dyn OutputSink> = match &config.output {
            OutputTarget::Serial(params) => {
                Box::new(DeviceSink::serial(params.clone(), outputters))
            }
            OutputTarget::Log => Box::new(LogSink::new(Arc::clone(&self.logger), outputters)),
        };

        Ok(self.spawn(config, endpoint, socket, sink, cancel))
    }

    /// Start a run with an explicit transport and sink.
    ///
    /// The configured output target is ignored; `sink` decides whether the
    /// run can start.
    pub fn run_with<T, S>(
        &self,
        cancel: CancellationToken,
        transport: T,
        sink: S,
    ) -> Result<StatusStream, PipelineError>
    where
        T: TelemetryTransport + 'static,
        S: OutputSink + 'static,
    {
        let (config, endpoint) = self.begin(Some(sink.is_configured()))?;
        Ok(self.spawn(config, endpoint, transport, sink, cancel))
    }

    /// Check the state and mark the pipeline running, atomically.
    fn begin(
        &self,
        sink_configured: Option<bool>,
    ) -> Result<(AppConfig, SocketAddr), PipelineError> {
        let mut inner = self.inner.lock();
        let output_configured =
            sink_configured.unwrap_or_else(|| inner.config.output.is_configured());
        let state = ConnectionState::derive(
            inner.config.endpoint.is_some(),
            output_configured,
            inner.running,
        );
        match (state, inner.config.endpoint) {
            (ConnectionState::Runable, Some(endpoint)) => {
                inner.running = true;
                Ok((inner.config.clone(), endpoint))
            }
            _ => Err(PipelineError::NotRunnable { state }),
        }
    }

    fn spawn<T, S>(
        &self,
        config: AppConfig,
        endpoint: SocketAddr,
        transport: T,
        mut sink: S,
        cancel: CancellationToken,
    ) -> StatusStream
    where
        T: TelemetryTransport + 'static,
        S: OutputSink + 'static,
    {
        let (reporter, stream) = status_channel();
        let (sample_tx, mut sample_rx) = mpsc::channel(SAMPLE_CHANNEL_CAPACITY);

        let source = TelemetrySource::with_transport(
            transport,
            TelemetrySourceConfig::new(endpoint, config.frequency),
        );

        info!(
            %endpoint,
            frequency = config.frequency,
            precision = %config.precision,
            "Pipeline starting"
        );

        let source_task = tokio::spawn(source.run(sample_tx, reporter.clone(), cancel));

        let sink_reporter = reporter.clone();
        let sink_task = tokio::task::spawn_blocking(move || {
            let result = sink.drain(&mut sample_rx, &sink_reporter);
            if let Err(e) = &result {
                sink_reporter.report(Status::Fatal(e.to_string()));
                // keep the source from blocking on a full channel until it
                // is cancelled
                let mut discarded: u64 = 0;
                while sample_rx.blocking_recv().is_some() {
                    discarded += 1;
                }
                debug!(discarded, "Sample channel drained after sink failure");
            }
            result
        });

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let (source_result, sink_result) = tokio::join!(source_task, sink_task);

            match source_result {
                Ok(Ok(())) => debug!("Telemetry source finished"),
                Ok(Err(e)) => warn!(error = %e, "Telemetry source failed"),
                Err(e) => error!(error = %e, "Telemetry source task panicked"),
            }
            match sink_result {
                Ok(Ok(())) => debug!("Output sink finished"),
                Ok(Err(e)) => warn!(error = %e, "Output sink failed"),
                Err(e) => {
                    error!(error = %e, "Output sink task panicked");
                    reporter.report(Status::Fatal("output sink stopped unexpectedly".into()));
                }
            }

            inner.lock().running = false;
            info!("Pipeline stopped");
            // last reporter: the status stream closes here
            drop(reporter);
        });

        stream
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::MemoryLogger;
    use crate::output::{RecordingDevice, SentenceKind};
    use crate::xplane::encode_position;
    use crate::xplane::source::tests::ScriptedTransport;
    use crate::xplane::TelemetrySample;
    use std::time::Duration;

    fn endpoint() -> SocketAddr {
        "127.0.0.1:49000".parse().unwrap()
    }

    fn configured() -> Pipeline {
        let pipeline = Pipeline::default();
        pipeline.set_endpoint(Some(endpoint()));
        pipeline.set_serial_port("/dev/ttyTEST");
        pipeline
    }

    fn position(latitude: f64) -> std::io::Result<Vec<u8>> {
        Ok(encode_position(&TelemetrySample {
            latitude,
            longitude: 8.5,
            ..Default::default()
        }))
    }

    fn vtg_sink(device: RecordingDevice) -> DeviceSink<RecordingDevice> {
        DeviceSink::new(
            device,
            SerialParams::new("/dev/ttyTEST", 9600),
            outputters_for(&[SentenceKind::Vtg], Precision::Standard),
        )
    }

    /// Collect events until the stream closes.
    async fn collect(stream: &mut StatusStream) -> Vec<Status> {
        let mut events = Vec::new();
        let closed = tokio::time::timeout(Duration::from_secs(5), async {
            while let Some(event) = stream.recv().await {
                events.push(event);
            }
        })
        .await;
        assert!(closed.is_ok(), "status stream did not close");
        events
    }

    #[test]
    fn test_state_follows_configuration() {
        let pipeline = Pipeline::default();
        assert_eq!(pipeline.state(), ConnectionState::Incomplete);

        pipeline.set_endpoint(Some(endpoint()));
        assert_eq!(pipeline.state(), ConnectionState::Incomplete);

        pipeline.set_serial_port("COM3");
        assert_eq!(pipeline.state(), ConnectionState::Runable);

        pipeline.set_baud_rate(0);
        assert_eq!(pipeline.state(), ConnectionState::Incomplete);

        pipeline.set_output(OutputTarget::Log);
        assert_eq!(pipeline.state(), ConnectionState::Runable);

        pipeline.set_endpoint(None);
        assert_eq!(pipeline.state(), ConnectionState::Incomplete);
    }

    #[test]
    fn test_clones_share_configuration() {
        let pipeline = configured();
        let other = pipeline.clone();
        other.set_precision(Precision::Enhanced);
        assert_eq!(pipeline.config().precision, Precision::Enhanced);
    }

    #[test]
    fn test_frequency_bounds() {
        let pipeline = Pipeline::default();
        assert!(pipeline.set_frequency(20).is_ok());
        assert_eq!(pipeline.config().frequency, 20);
        assert!(matches!(
            pipeline.set_frequency(0),
            Err(PipelineError::InvalidFrequency(0))
        ));
        assert!(pipeline.set_frequency(61).is_err());
        assert_eq!(pipeline.config().frequency, 20);
    }

    #[tokio::test]
    async fn test_run_requires_runable() {
        let pipeline = Pipeline::default();
        let result = pipeline.run(CancellationToken::new());
        assert!(matches!(
            result,
            Err(PipelineError::NotRunnable {
                state: ConnectionState::Incomplete
            })
        ));
        assert!(!pipeline.is_running());
    }

    #[tokio::test]
    async fn test_run_delivers_samples_and_closes_after_join() {
        let pipeline = configured();
        let incoming = vec![position(1.0), position(2.0), position(3.0)];
        let transport = ScriptedTransport::with_incoming(incoming);
        let device = RecordingDevice::default();
        let device_log = Arc::clone(&device.log);
        let cancel = CancellationToken::new();

        let mut stream = pipeline
            .run_with(cancel.clone(), Arc::clone(&transport), vtg_sink(device))
            .unwrap();
        assert_eq!(pipeline.state(), ConnectionState::Running);

        // a second run is refused while the first is active
        let second = vtg_sink(RecordingDevice::default());
        assert!(matches!(
            pipeline.run_with(cancel.clone(), Arc::clone(&transport), second),
            Err(PipelineError::NotRunnable {
                state: ConnectionState::Running
            })
        ));

        for _ in 0..500 {
            if device_log.lock().writes.len() == 3 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        cancel.cancel();

        let events = collect(&mut stream).await;
        assert_eq!(events.iter().filter(|e| e.is_heartbeat()).count(), 3);
        assert!(!events.iter().any(Status::is_fatal));

        // stream closure means both halves are done
        assert_eq!(pipeline.state(), ConnectionState::Runable);
        let log = device_log.lock();
        assert_eq!(log.writes.len(), 3);
        assert_eq!(log.opens, 1);
        assert_eq!(log.closes, 1);
        assert_eq!(transport.unsubscribes(), 1);
    }

    #[tokio::test]
    async fn test_sink_failure_reports_fatal_and_keeps_draining() {
        let pipeline = configured();
        let transport = ScriptedTransport::with_incoming(
            (0..40).map(|i| position(f64::from(i))).collect(),
        );
        let device = RecordingDevice {
            fail_open: true,
            ..Default::default()
        };
        let device_log = Arc::clone(&device.log);
        let cancel = CancellationToken::new();

        let mut stream = pipeline
            .run_with(cancel.clone(), Arc::clone(&transport), vtg_sink(device))
            .unwrap();

        // caller-side cancellation on the fatal marker
        let mut events = Vec::new();
        while let Some(event) = stream.recv().await {
            if event.is_fatal() {
                cancel.cancel();
            }
            events.push(event);
        }

        assert!(events.iter().any(Status::is_fatal));
        assert_eq!(device_log.lock().closes, 1);
        assert!(device_log.lock().writes.is_empty());
        assert_eq!(transport.unsubscribes(), 1);
        assert_eq!(pipeline.state(), ConnectionState::Runable);
    }

    #[tokio::test]
    async fn test_log_output_runs_through_injected_logger() {
        let logger = Arc::new(MemoryLogger::new());
        let pipeline = Pipeline::default().with_logger(logger.clone());
        pipeline.set_endpoint(Some(endpoint()));
        pipeline.set_output(OutputTarget::Log);
        pipeline.set_sentences(vec![SentenceKind::Vtg]);

        let config = pipeline.config();
        let sink = LogSink::new(
            logger.clone(),
            outputters_for(&config.sentences, config.precision),
        );
        let transport = ScriptedTransport::with_incoming(vec![position(4.0)]);
        let cancel = CancellationToken::new();

        let mut stream = pipeline.run_with(cancel.clone(), transport, sink).unwrap();
        assert_eq!(stream.recv().await, Some(Status::Heartbeat));

        for _ in 0..500 {
            if logger.lines().iter().any(|l| l.starts_with("$GPVTG")) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        cancel.cancel();
        collect(&mut stream).await;

        assert!(logger.lines().iter().any(|l| l.starts_with("$GPVTG")));
    }
}
