//! `GPGGA` - global positioning system fix data.
//!
//! ```text
//! $GPGGA,123519.000,4807.0380,N,01131.0000,E,8,12,0.5,545.40,M,0.00,M,,*hh
//!        |          |           |            | |  |   |        |      ||
//!        |          |           |            | |  |   |        |      |+ DGPS station (empty)
//!        |          |           |            | |  |   |        |      + DGPS age (empty)
//!        |          |           |            | |  |   |        + geoid separation, metres
//!        |          |           |            | |  |   + altitude above MSL, metres
//!        |          |           |            | |  + HDOP
//!        |          |           |            | + satellites in use
//!        |          |           |            + fix quality (8 = simulation)
//!        |          |           + longitude dddmm.mmmm,E/W
//!        |          + latitude ddmm.mmmm,N/S
//!        + UTC time hhmmss.sss
//! ```

use chrono::{DateTime, Utc};

use super::{format_coordinate, frame, Axis, Precision};

/// Fix metadata reported alongside the position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GgaFix {
    /// Fix quality indicator (0 = invalid, 1 = GPS, 2 = DGPS, 8 = simulation).
    pub quality: u8,
    /// Number of satellites in use.
    pub satellites: u8,
    /// Horizontal dilution of precision.
    pub hdop: f64,
    /// Height of the geoid above the WGS84 ellipsoid, metres.
    pub geoid_separation: f64,
}

impl GgaFix {
    /// Synthetic always-valid fix reported for simulator positions.
    pub const SIMULATED: GgaFix = GgaFix {
        quality: 8,
        satellites: 12,
        hdop: 0.5,
        geoid_separation: 0.0,
    };
}

impl Default for GgaFix {
    fn default() -> Self {
        Self::SIMULATED
    }
}

/// Encode a `GPGGA` sentence stamped with the current UTC time.
pub fn encode_gga(latitude: f64, longitude: f64, altitude: f64, precision: Precision) -> String {
    gga_sentence(
        Utc::now(),
        latitude,
        longitude,
        altitude,
        &GgaFix::SIMULATED,
        precision,
    )
}

/// Encode a `GPGGA` sentence for an explicit time and fix.
pub fn gga_sentence(
    time: DateTime<Utc>,
    latitude: f64,
    longitude: f64,
    altitude: f64,
    fix: &GgaFix,
    precision: Precision,
) -> String {
    let profile = precision.profile();

    let body = format!(
        "GPGGA,{},{},{},{},{},{:.1},{:.alt$},M,{:.alt$},M,,",
        time.format("%H%M%S%.3f"),
        format_coordinate(latitude, Axis::Latitude, profile.latitude),
        format_coordinate(longitude, Axis::Longitude, profile.longitude),
        fix.quality,
        fix.satellites,
        fix.hdop,
        altitude,
        fix.geoid_separation,
        alt = profile.altitude,
    );

    frame(&body)
}
