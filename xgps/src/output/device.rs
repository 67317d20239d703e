//! Output devices and their serial framing parameters.

use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::time::Duration;

use serialport::SerialPort;
use tracing::{debug, info};

use super::error::OutputError;

/// Baud rates offered to the user. Any other non-zero rate is accepted.
pub const SUPPORTED_BAUD_RATES: [u32; 6] = [9600, 14400, 19200, 38400, 57600, 115200];

/// Baud rate used when none is configured.
pub const DEFAULT_BAUD_RATE: u32 = 38400;

/// Write timeout for serial devices.
const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// Bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataBits {
    Five,
    Six,
    Seven,
    #[default]
    Eight,
}

impl DataBits {
    pub fn bits(self) -> u8 {
        match self {
            DataBits::Five => 5,
            DataBits::Six => 6,
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        }
    }
}

impl fmt::Display for DataBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

impl FromStr for DataBits {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "5" => Ok(DataBits::Five),
            "6" => Ok(DataBits::Six),
            "7" => Ok(DataBits::Seven),
            "8" => Ok(DataBits::Eight),
            other => Err(OutputError::InvalidParameter {
                field: "data bits",
                value: other.to_string(),
            }),
        }
    }
}

impl From<DataBits> for serialport::DataBits {
    fn from(bits: DataBits) -> Self {
        match bits {
            DataBits::Five => serialport::DataBits::Five,
            DataBits::Six => serialport::DataBits::Six,
            DataBits::Seven => serialport::DataBits::Seven,
            DataBits::Eight => serialport::DataBits::Eight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parity {
    #[default]
    None,
    Odd,
    Even,
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Parity::None => "none",
            Parity::Odd => "odd",
            Parity::Even => "even",
        })
    }
}

impl FromStr for Parity {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "n" => Ok(Parity::None),
            "odd" | "o" => Ok(Parity::Odd),
            "even" | "e" => Ok(Parity::Even),
            other => Err(OutputError::InvalidParameter {
                field: "parity",
                value: other.to_string(),
            }),
        }
    }
}

impl From<Parity> for serialport::Parity {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => serialport::Parity::None,
            Parity::Odd => serialport::Parity::Odd,
            Parity::Even => serialport::Parity::Even,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopBits {
    #[default]
    One,
    Two,
}

impl fmt::Display for StopBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StopBits::One => "1",
            StopBits::Two => "2",
        })
    }
}

impl FromStr for StopBits {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(StopBits::One),
            "2" => Ok(StopBits::Two),
            other => Err(OutputError::InvalidParameter {
                field: "stop bits",
                value: other.to_string(),
            }),
        }
    }
}

impl From<StopBits> for serialport::StopBits {
    fn from(stop_bits: StopBits) -> Self {
        match stop_bits {
            StopBits::One => serialport::StopBits::One,
            StopBits::Two => serialport::StopBits::Two,
        }
    }
}

/// Serial port path and framing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialParams {
    /// Device path, e.g. `/dev/ttyUSB0` or `COM3`. Empty when unset.
    pub port: String,
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
}

impl Default for SerialParams {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: DataBits::default(),
            parity: Parity::default(),
            stop_bits: StopBits::default(),
        }
    }
}

impl SerialParams {
    pub fn new(port: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port: port.into(),
            baud_rate,
            ..Default::default()
        }
    }

    /// A port is named and the baud rate is non-zero.
    pub fn is_configured(&self) -> bool {
        !self.port.is_empty() && self.baud_rate != 0
    }
}

impl fmt::Display for SerialParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parity = match self.parity {
            Parity::None => 'N',
            Parity::Odd => 'O',
            Parity::Even => 'E',
        };
        write!(
            f,
            "{} {} {}{}{}",
            self.port, self.baud_rate, self.data_bits, parity, self.stop_bits
        )
    }
}

/// Byte sink the output side writes sentences to.
///
/// `close` must be safe to call on a device that was never opened or is
/// already closed.
pub trait Device: Send {
    fn open(&mut self, params: &SerialParams) -> Result<(), OutputError>;

    fn write(&mut self, bytes: &[u8]) -> Result<(), OutputError>;

    fn close(&mut self);

    fn is_open(&self) -> bool;
}

/// Serial port device.
#[derive(Default)]
pub struct SerialDevice {
    port: Option<Box<dyn SerialPort>>,
}

impl SerialDevice {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Device for SerialDevice {
    fn open(&mut self, params: &SerialParams) -> Result<(), OutputError> {
        if !params.is_configured() {
            return Err(OutputError::NotConfigured);
        }

        let port = serialport::new(params.port.as_str(), params.baud_rate)
            .data_bits(params.data_bits.into())
            .parity(params.parity.into())
            .stop_bits(params.stop_bits.into())
            .flow_control(serialport::FlowControl::None)
            .timeout(WRITE_TIMEOUT)
            .open()
            .map_err(|e| OutputError::DeviceOpen {
                port: params.port.clone(),
                source: e.into(),
            })?;

        info!(params = %params, "Serial port opened");
        self.port = Some(port);
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), OutputError> {
        let port = self.port.as_mut().ok_or(OutputError::NotOpen)?;
        port.write_all(bytes).map_err(OutputError::Write)?;
        port.flush().map_err(OutputError::Write)
    }

    fn close(&mut self) {
        if let Some(port) = self.port.take() {
            debug!(name = ?port.name(), "Serial port closed");
        }
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }
}
