//! RPOS position records.
//!
//! X-Plane answers an RPOS subscription with datagrams of the form
//! `"RPOS4"` followed by a packed little-endian record:
//!
//! | Field            | Type | Unit    |
//! |------------------|------|---------|
//! | longitude        | f64  | degrees |
//! | latitude         | f64  | degrees |
//! | elevation (MSL)  | f64  | metres  |
//! | height AGL       | f32  | metres  |
//! | pitch            | f32  | degrees |
//! | true heading     | f32  | degrees |
//! | roll             | f32  | degrees |
//! | velocity east    | f32  | m/s     |
//! | velocity up      | f32  | m/s     |
//! | velocity south   | f32  | m/s     |
//! | roll rate        | f32  | rad/s   |
//! | pitch rate       | f32  | rad/s   |
//! | yaw rate         | f32  | rad/s   |
//!
//! Field order and width are part of the wire contract.

use chrono::{DateTime, Utc};

use super::error::TelemetryError;

/// Tag that starts every position datagram.
pub const RPOS_TAG: &[u8; 5] = b"RPOS4";

/// Size of the packed record after the tag: 3 doubles and 10 singles.
pub const RECORD_LEN: usize = 3 * 8 + 10 * 4;

/// One decoded position/attitude sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TelemetrySample {
    pub longitude: f64,
    pub latitude: f64,
    /// Elevation above mean sea level, metres.
    pub elevation: f64,
    /// Height above terrain, metres.
    pub height_agl: f32,
    pub pitch: f32,
    pub true_heading: f32,
    pub roll: f32,
    pub velocity_east: f32,
    pub velocity_up: f32,
    pub velocity_south: f32,
    pub roll_rate: f32,
    pub pitch_rate: f32,
    pub yaw_rate: f32,
    /// Time of the fix. RPOS records carry none, so decoded samples leave
    /// this empty and encoders fall back to the time of encoding.
    pub timestamp: Option<DateTime<Utc>>,
}

impl TelemetrySample {
    /// Horizontal speed over ground in metres per second.
    pub fn speed_over_ground(&self) -> f64 {
        let east = f64::from(self.velocity_east);
        let south = f64::from(self.velocity_south);
        (east * east + south * south).sqrt()
    }

    /// Attach a fix time.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Sequential little-endian reader over the record bytes.
struct FieldReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> FieldReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], TelemetryError> {
        let end = self.offset + N;
        let slice = self.bytes.get(self.offset..end).ok_or_else(|| {
            TelemetryError::MalformedRecord(format!(
                "record truncated at byte {} of {}",
                self.bytes.len(),
                RECORD_LEN
            ))
        })?;
        self.offset = end;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    fn f64(&mut self) -> Result<f64, TelemetryError> {
        self.take::<8>().map(f64::from_le_bytes)
    }

    fn f32(&mut self) -> Result<f32, TelemetryError> {
        self.take::<4>().map(f32::from_le_bytes)
    }
}

/// Decode one position datagram, tag included.
///
/// Trailing bytes beyond the record are ignored.
pub fn decode_position(datagram: &[u8]) -> Result<TelemetrySample, TelemetryError> {
    let tag = datagram.get(..RPOS_TAG.len()).ok_or_else(|| {
        TelemetryError::MalformedRecord(format!("datagram of {} bytes has no tag", datagram.len()))
    })?;
    if tag != RPOS_TAG {
        return Err(TelemetryError::MalformedRecord(format!(
            "invalid header {:?}",
            String::from_utf8_lossy(tag)
        )));
    }

    let mut reader = FieldReader::new(&datagram[RPOS_TAG.len()..]);
    let sample = TelemetrySample {
        longitude: reader.f64()?,
        latitude: reader.f64()?,
        elevation: reader.f64()?,
        height_agl: reader.f32()?,
        pitch: reader.f32()?,
        true_heading: reader.f32()?,
        roll: reader.f32()?,
        velocity_east: reader.f32()?,
        velocity_up: reader.f32()?,
        velocity_south: reader.f32()?,
        roll_rate: reader.f32()?,
        pitch_rate: reader.f32()?,
        yaw_rate: reader.f32()?,
        timestamp: None,
    };

    if reader.offset != RECORD_LEN {
        return Err(TelemetryError::ProtocolMismatch {
            expected: RECORD_LEN,
            actual: reader.offset,
        });
    }

    Ok(sample)
}

/// Encode a sample as an RPOS datagram.
///
/// The inverse of [`decode_position`]; used by fake simulators in tests and
/// by tooling that replays recorded flights.
pub fn encode_position(sample: &TelemetrySample) -> Vec<u8> {
    let mut datagram = Vec::with_capacity(RPOS_TAG.len() + RECORD_LEN);
    datagram.extend_from_slice(RPOS_TAG);
    for value in [sample.longitude, sample.latitude, sample.elevation] {
        datagram.extend_from_slice(&value.to_le_bytes());
    }
    for value in [
        sample.height_agl,
        sample.pitch,
        sample.true_heading,
        sample.roll,
        sample.velocity_east,
        sample.velocity_up,
        sample.velocity_south,
        sample.roll_rate,
        sample.pitch_rate,
        sample.yaw_rate,
    ] {
        datagram.extend_from_slice(&value.to_le_bytes());
    }
    datagram
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TelemetrySample {
        TelemetrySample {
            longitude: -122.309_444,
            latitude: 47.448_889,
            elevation: 131.5,
            height_agl: 2.25,
            pitch: 1.5,
            true_heading: 163.0,
            roll: -0.5,
            velocity_east: 3.0,
            velocity_up: 0.25,
            velocity_south: -4.0,
            roll_rate: 0.01,
            pitch_rate: 0.02,
            yaw_rate: 0.03,
            timestamp: None,
        }
    }

    #[test]
    fn test_record_len() {
        assert_eq!(RECORD_LEN, 64);
    }

    #[test]
    fn test_decode_field_order() {
        let mut datagram = RPOS_TAG.to_vec();
        datagram.extend_from_slice(&1.0f64.to_le_bytes());
        datagram.extend_from_slice(&2.0f64.to_le_bytes());
        datagram.extend_from_slice(&3.0f64.to_le_bytes());
        for i in 4..=13 {
            datagram.extend_from_slice(&(i as f32).to_le_bytes());
        }

        let decoded = decode_position(&datagram).unwrap();
        assert_eq!(decoded.longitude, 1.0);
        assert_eq!(decoded.latitude, 2.0);
        assert_eq!(decoded.elevation, 3.0);
        assert_eq!(decoded.height_agl, 4.0);
        assert_eq!(decoded.pitch, 5.0);
        assert_eq!(decoded.true_heading, 6.0);
        assert_eq!(decoded.roll, 7.0);
        assert_eq!(decoded.velocity_east, 8.0);
        assert_eq!(decoded.velocity_up, 9.0);
        assert_eq!(decoded.velocity_south, 10.0);
        assert_eq!(decoded.roll_rate, 11.0);
        assert_eq!(decoded.pitch_rate, 12.0);
        assert_eq!(decoded.yaw_rate, 13.0);
        assert!(decoded.timestamp.is_none());
    }

    #[test]
    fn test_encode_matches_decoder() {
        let datagram = encode_position(&sample());
        assert_eq!(datagram.len(), 5 + RECORD_LEN);
        assert_eq!(decode_position(&datagram).unwrap(), sample());
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut datagram = encode_position(&sample());
        datagram.extend_from_slice(&[0xAA; 16]);
        assert_eq!(decode_position(&datagram).unwrap(), sample());
    }

    #[test]
    fn test_wrong_tag_rejected() {
        let mut datagram = encode_position(&sample());
        datagram[4] = b'3';
        assert!(matches!(
            decode_position(&datagram),
            Err(TelemetryError::MalformedRecord(_))
        ));
        assert!(matches!(
            decode_position(b"DATA\0"),
            Err(TelemetryError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_short_datagrams_rejected() {
        assert!(matches!(
            decode_position(b"RPO"),
            Err(TelemetryError::MalformedRecord(_))
        ));

        let datagram = encode_position(&sample());
        for len in [5, 6, 29, 5 + RECORD_LEN - 1] {
            assert!(
                matches!(
                    decode_position(&datagram[..len]),
                    Err(TelemetryError::MalformedRecord(_))
                ),
                "length {}",
                len
            );
        }
    }

    #[test]
    fn test_speed_over_ground() {
        assert_eq!(sample().speed_over_ground(), 5.0);
        assert_eq!(TelemetrySample::default().speed_over_ground(), 0.0);
    }

    #[test]
    fn test_speed_ignores_vertical_velocity() {
        let climbing = TelemetrySample {
            velocity_up: 25.0,
            ..Default::default()
        };
        assert_eq!(climbing.speed_over_ground(), 0.0);
    }
}
