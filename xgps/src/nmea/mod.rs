//! NMEA 0183 sentence encoding.
//!
//! Pure functions that turn position and velocity values into the ASCII
//! sentences a GPS receiver emits. No state and no I/O: the precision
//! profile is passed into every call instead of living in a global table.
//!
//! Every sentence is framed as `$<body>*<checksum>\r\n`, where the checksum
//! is the XOR of every byte of `<body>` rendered as two uppercase hex digits.
//!
//! # Sentences
//!
//! - [`gga`] - `GPGGA` position fix (time, latitude, longitude, altitude)
//! - [`vtg`] - `GPVTG` course and speed over ground

mod error;
pub mod gga;
mod precision;
pub mod vtg;

pub use error::NmeaError;
pub use gga::{encode_gga, gga_sentence, GgaFix};
pub use precision::{Precision, PrecisionProfile};
pub use vtg::{encode_vtg, KMH_PER_MPS, KNOTS_PER_MPS};

/// Which coordinate axis a value belongs to.
///
/// Selects the hemisphere letters and the number of degree digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Latitude: `ddmm.mmmm`, N or S.
    Latitude,
    /// Longitude: `dddmm.mmmm`, E or W.
    Longitude,
}

impl Axis {
    /// Hemisphere letter for a signed degree value.
    ///
    /// Zero (including negative zero) resolves to the positive hemisphere.
    pub fn hemisphere(self, value: f64) -> char {
        let negative = value < 0.0;
        match (self, negative) {
            (Axis::Latitude, false) => 'N',
            (Axis::Latitude, true) => 'S',
            (Axis::Longitude, false) => 'E',
            (Axis::Longitude, true) => 'W',
        }
    }

    fn degree_digits(self) -> usize {
        match self {
            Axis::Latitude => 2,
            Axis::Longitude => 3,
        }
    }
}

/// XOR checksum of a sentence body (the text between `$` and `*`).
pub fn checksum(body: &str) -> u8 {
    body.bytes().fold(0, |acc, byte| acc ^ byte)
}

/// Frame a sentence body with `$`, the checksum and `\r\n`.
pub fn frame(body: &str) -> String {
    format!("${}*{:02X}\r\n", body, checksum(body))
}

/// Format a signed degree value as NMEA degrees and minutes plus hemisphere.
///
/// Produces e.g. `4807.0380,N` for latitude or `01131.0000,E` for longitude.
/// Minutes are zero-padded to two integer digits and carry `decimals`
/// fractional digits.
pub fn format_coordinate(value: f64, axis: Axis, decimals: usize) -> String {
    let magnitude = value.abs();
    let mut degrees = magnitude.floor();
    let mut minutes = (magnitude - degrees) * 60.0;

    // 59.99999 minutes must not print as "60.0000"
    let scale = 10f64.powi(decimals as i32);
    if (minutes * scale).round() / scale >= 60.0 {
        degrees += 1.0;
        minutes = 0.0;
    }

    format!(
        "{:0dw$}{:0mw$.prec$},{}",
        degrees as u32,
        minutes,
        axis.hemisphere(value),
        dw = axis.degree_digits(),
        mw = decimals + 3,
        prec = decimals,
    )
}

/// Normalize a heading into `[0, 360)` degrees.
///
/// Handles any number of whole rotations in either direction.
pub fn normalize_heading(heading: f64) -> f64 {
    let normalized = heading.rem_euclid(360.0);
    // rem_euclid rounds tiny negative values up to exactly 360.0, and -0.0
    // would print with a sign
    if normalized >= 360.0 || normalized == 0.0 {
        0.0
    } else {
        normalized
    }
}

/// Format a heading as a course in `[0, 360)` with `decimals` fractional
/// digits.
///
/// Rounding happens after the wrap, so a course that rounds up to 360 is
/// written as 0.
pub fn format_heading(heading: f64, decimals: usize) -> String {
    let mut course = normalize_heading(heading);

    // 359.9999 must not print as "360.000"
    let scale = 10f64.powi(decimals as i32);
    if (course * scale).round() / scale >= 360.0 {
        course = 0.0;
    }

    format!("{:.prec$}", course, prec = decimals)
}

/// Check the framing and checksum of a complete sentence.
///
/// Returns the checksum on success.
pub fn verify_sentence(sentence: &str) -> Result<u8, NmeaError> {
    let inner = sentence
        .strip_suffix("\r\n")
        .ok_or(NmeaError::MissingTerminator)?;
    let inner = inner.strip_prefix('$').ok_or(NmeaError::MissingStart)?;
    let (body, declared) = inner.rsplit_once('*').ok_or(NmeaError::MissingChecksum)?;

    if declared.len() != 2 {
        return Err(NmeaError::InvalidChecksum(declared.to_string()));
    }
    let declared = u8::from_str_radix(declared, 16)
        .map_err(|_| NmeaError::InvalidChecksum(declared.to_string()))?;

    let computed = checksum(body);
    if computed != declared {
        return Err(NmeaError::ChecksumMismatch { declared, computed });
    }
    Ok(computed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_known_sentences() {
        let cases: [(&str, u8); 5] = [
            ("PFEC,GPint,RMC05", 0x2D),
            (
                "GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W",
                0x6A,
            ),
            ("GPGLL,4807.038,N,01131.000,E,123519,A", 0x25),
            ("GPGSA,A,3,04,05,,09,12,,,24,,,,,2.5,1.3,2.1", 0x39),
            (
                "GPGSV,3,1,11,20,75,064,46,24,63,231,42,28,52,160,41,32,45,047,39",
                0x78,
            ),
        ];

        for (body, expected) in cases {
            assert_eq!(checksum(body), expected, "checksum of {}", body);
        }
    }

    #[test]
    fn test_frame_uses_uppercase_hex() {
        assert_eq!(frame("PFEC,GPint,RMC05"), "$PFEC,GPint,RMC05*2D\r\n");
    }

    #[test]
    fn test_hemisphere_signs() {
        assert_eq!(Axis::Latitude.hemisphere(45.0), 'N');
        assert_eq!(Axis::Latitude.hemisphere(-45.0), 'S');
        assert_eq!(Axis::Longitude.hemisphere(120.0), 'E');
        assert_eq!(Axis::Longitude.hemisphere(-120.0), 'W');
    }

    #[test]
    fn test_hemisphere_zero_is_positive() {
        assert_eq!(Axis::Latitude.hemisphere(0.0), 'N');
        assert_eq!(Axis::Latitude.hemisphere(-0.0), 'N');
        assert_eq!(Axis::Longitude.hemisphere(0.0), 'E');
        assert_eq!(Axis::Longitude.hemisphere(-0.0), 'E');
    }

    #[test]
    fn test_hemisphere_over_latitude_range() {
        let mut v = -90.0;
        while v <= 90.0 {
            let expected = if v >= 0.0 { 'N' } else { 'S' };
            assert_eq!(Axis::Latitude.hemisphere(v), expected, "latitude {}", v);
            v += 0.25;
        }
    }

    #[test]
    fn test_format_latitude() {
        let cases = [
            (0.0, "0000.0000,N"),
            (8.123456, "0807.4074,N"),
            (89.123456, "8907.4074,N"),
            (-8.123456, "0807.4074,S"),
            (-89.123456, "8907.4074,S"),
        ];
        for (value, expected) in cases {
            assert_eq!(format_coordinate(value, Axis::Latitude, 4), expected);
        }
    }

    #[test]
    fn test_format_longitude() {
        let cases = [
            (0.0, "00000.0000,E"),
            (8.123456, "00807.4074,E"),
            (89.123456, "08907.4074,E"),
            (-8.123456, "00807.4074,W"),
            (109.123456, "10907.4074,E"),
            (-109.123456, "10907.4074,W"),
        ];
        for (value, expected) in cases {
            assert_eq!(format_coordinate(value, Axis::Longitude, 4), expected);
        }
    }

    #[test]
    fn test_format_coordinate_minute_rollover() {
        // 0.99999999 degrees is 59.9999994 minutes, which rounds to 60
        assert_eq!(
            format_coordinate(10.99999999, Axis::Latitude, 4),
            "1100.0000,N"
        );
    }

    #[test]
    fn test_normalize_heading() {
        assert_eq!(normalize_heading(0.0), 0.0);
        assert_eq!(normalize_heading(90.0), 90.0);
        assert_eq!(normalize_heading(-90.0), 270.0);
        assert_eq!(normalize_heading(360.0), 0.0);
        assert_eq!(normalize_heading(450.0), 90.0);
        assert_eq!(normalize_heading(-400.0), 320.0);
        assert!(normalize_heading(-1e-20) < 360.0);
        assert!(normalize_heading(-0.0).is_sign_positive());
    }

    #[test]
    fn test_normalize_heading_is_idempotent() {
        let headings = [
            -1080.5, -720.0, -359.999, -45.123, -0.0, 0.0, 0.123, 45.123, 359.999, 360.0, 720.123,
            1e6, -1e-12,
        ];
        for h in headings {
            let once = normalize_heading(h);
            assert_eq!(normalize_heading(once), once, "heading {}", h);
            assert!((0.0..360.0).contains(&once), "heading {} -> {}", h, once);
        }
    }

    #[test]
    fn test_format_heading_never_reaches_360() {
        assert_eq!(format_heading(359.9999, 3), "0.000");
        assert_eq!(format_heading(f64::from(359.9996f32), 3), "0.000");
        assert_eq!(format_heading(-0.0001, 3), "0.000");
        assert_eq!(format_heading(359.9994, 3), "359.999");
        assert_eq!(format_heading(359.99, 1), "0.0");
        assert_eq!(format_heading(45.123, 3), "45.123");
        assert_eq!(format_heading(-45.123, 3), "314.877");
    }

    #[test]
    fn test_verify_sentence_accepts_valid() {
        assert_eq!(verify_sentence("$PFEC,GPint,RMC05*2D\r\n").unwrap(), 0x2D);
    }

    #[test]
    fn test_verify_sentence_rejects_bad_framing() {
        assert!(matches!(
            verify_sentence("$PFEC,GPint,RMC05*2D"),
            Err(NmeaError::MissingTerminator)
        ));
        assert!(matches!(
            verify_sentence("PFEC,GPint,RMC05*2D\r\n"),
            Err(NmeaError::MissingStart)
        ));
        assert!(matches!(
            verify_sentence("$PFEC,GPint,RMC05\r\n"),
            Err(NmeaError::MissingChecksum)
        ));
        assert!(matches!(
            verify_sentence("$PFEC,GPint,RMC05*ZZ\r\n"),
            Err(NmeaError::InvalidChecksum(_))
        ));
    }

    #[test]
    fn test_verify_sentence_rejects_wrong_checksum() {
        assert!(matches!(
            verify_sentence("$PFEC,GPint,RMC05*2E\r\n"),
            Err(NmeaError::ChecksumMismatch {
                declared: 0x2E,
                computed: 0x2D
            })
        ));
    }
}
