//! INI serialization: `ConfigFile` → commented INI string.

use std::path::Path;

use super::settings::ConfigFile;
use crate::output::SUPPORTED_BAUD_RATES;
use crate::xplane::SUPPORTED_FREQUENCIES;

pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let address = config
        .simulator
        .address
        .map(|a| a.to_string())
        .unwrap_or_default();
    let sentences = config
        .nmea
        .sentences
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"[simulator]
; X-Plane address as ip:port. Leave empty to discover the master instance
; through its network beacon.
address = {}
; Position records requested per second (1-60). Common values: {}
frequency = {}
; Seconds to wait for a beacon during discovery
discovery_timeout = {}

[serial]
; Serial device the GPS sentences are written to, e.g. /dev/ttyUSB0 or COM3
port = {}
; Supported baud rates: {}
baud_rate = {}
; Data bits: 5, 6, 7 or 8
data_bits = {}
; Parity: none, odd or even
parity = {}
; Stop bits: 1 or 2
stop_bits = {}

[nmea]
; Decimal places in coordinates and speeds:
;   standard - what consumer GPS receivers emit
;   enhanced - extra digits for software that can use them
precision = {}
; Sentences written for every position: gga, vtg
sentences = {}

[logging]
; Log file, cleared at the start of every session
file = {}
"#,
        address,
        join_numbers(&SUPPORTED_FREQUENCIES),
        config.simulator.frequency,
        config.simulator.discovery_timeout,
        config.serial.port,
        join_numbers(&SUPPORTED_BAUD_RATES),
        config.serial.baud_rate,
        config.serial.data_bits,
        config.serial.parity,
        config.serial.stop_bits,
        config.nmea.precision,
        sentences,
        path_to_string(&config.logging.file),
    )
}

fn join_numbers(values: &[u32]) -> String {
    values
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
