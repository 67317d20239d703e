//! INI parsing: `Ini` → `ConfigFile`.
//!
//! The single place where INI key names map to struct fields.

use ini::Ini;
use std::path::PathBuf;
use std::str::FromStr;

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use crate::output::SentenceKind;
use crate::xplane::MAX_FREQUENCY;

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse `value` with `FromStr`, mapping failures to `InvalidValue`.
fn parse_value<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

/// Parse an `Ini` into a `ConfigFile`.
///
/// Starts from defaults and overlays the values present. Empty values keep
/// the default.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [simulator]
    if let Some(section) = ini.section(Some("simulator")) {
        if let Some(v) = section.get("address").filter(|v| !v.trim().is_empty()) {
            config.simulator.address = Some(parse_value(
                "simulator",
                "address",
                v,
                "expected ip:port, e.g. 192.168.1.20:49000",
            )?);
        }
        if let Some(v) = section.get("frequency").filter(|v| !v.trim().is_empty()) {
            let frequency: u32 =
                parse_value("simulator", "frequency", v, "must be an integer (Hz)")?;
            if !(1..=MAX_FREQUENCY).contains(&frequency) {
                return Err(invalid(
                    "simulator",
                    "frequency",
                    v,
                    "must be between 1 and 60 Hz",
                ));
            }
            config.simulator.frequency = frequency;
        }
        if let Some(v) = section.get("discovery_timeout").filter(|v| !v.trim().is_empty()) {
            let timeout: u64 = parse_value(
                "simulator",
                "discovery_timeout",
                v,
                "must be a positive integer (seconds)",
            )?;
            if timeout == 0 {
                return Err(invalid(
                    "simulator",
                    "discovery_timeout",
                    v,
                    "must be a positive integer (seconds)",
                ));
            }
            config.simulator.discovery_timeout = timeout;
        }
    }

    // [serial]
    if let Some(section) = ini.section(Some("serial")) {
        if let Some(v) = section.get("port") {
            config.serial.port = v.trim().to_string();
        }
        if let Some(v) = section.get("baud_rate").filter(|v| !v.trim().is_empty()) {
            config.serial.baud_rate =
                parse_value("serial", "baud_rate", v, "must be a positive integer")?;
        }
        if let Some(v) = section.get("data_bits").filter(|v| !v.trim().is_empty()) {
            config.serial.data_bits =
                parse_value("serial", "data_bits", v, "must be 5, 6, 7 or 8")?;
        }
        if let Some(v) = section.get("parity").filter(|v| !v.trim().is_empty()) {
            config.serial.parity =
                parse_value("serial", "parity", v, "must be one of: none, odd, even")?;
        }
        if let Some(v) = section.get("stop_bits").filter(|v| !v.trim().is_empty()) {
            config.serial.stop_bits = parse_value("serial", "stop_bits", v, "must be 1 or 2")?;
        }
    }

    // [nmea]
    if let Some(section) = ini.section(Some("nmea")) {
        if let Some(v) = section.get("precision").filter(|v| !v.trim().is_empty()) {
            config.nmea.precision =
                parse_value("nmea", "precision", v, "must be 'standard' or 'enhanced'")?;
        }
        if let Some(v) = section.get("sentences") {
            config.nmea.sentences = parse_sentences(v)?;
        }
    }

    // [logging]
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file").map(str::trim).filter(|v| !v.is_empty()) {
            config.logging.file = expand_tilde(v);
        }
    }

    Ok(config)
}

/// Comma-separated sentence list, duplicates dropped, order kept.
fn parse_sentences(value: &str) -> Result<Vec<SentenceKind>, ConfigFileError> {
    let reason = "comma-separated list of: gga, vtg";
    let mut sentences = Vec::new();
    for name in value.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        let kind: SentenceKind = parse_value("nmea", "sentences", name, reason)?;
        if !sentences.contains(&kind) {
            sentences.push(kind);
        }
    }
    if sentences.is_empty() {
        return Err(invalid("nmea", "sentences", value, reason));
    }
    Ok(sentences)
}

pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
