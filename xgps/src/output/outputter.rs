//! Sentence generators run for every sample.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;

use super::error::OutputError;
use crate::nmea::{encode_vtg, gga_sentence, GgaFix, Precision};
use crate::xplane::TelemetrySample;

/// Produces one sentence per sample.
pub trait Outputter: Send + Sync {
    /// Short sentence name for logs and status messages.
    fn name(&self) -> &'static str;

    fn output(&self, sample: &TelemetrySample) -> Result<String, OutputError>;
}

/// `GPGGA` position fix.
#[derive(Debug, Clone, Default)]
pub struct GgaOutputter {
    precision: Precision,
    fix: GgaFix,
}

impl GgaOutputter {
    pub fn new(precision: Precision) -> Self {
        Self {
            precision,
            fix: GgaFix::SIMULATED,
        }
    }

    /// Use a different fix quality block.
    pub fn with_fix(mut self, fix: GgaFix) -> Self {
        self.fix = fix;
        self
    }
}

impl Outputter for GgaOutputter {
    fn name(&self) -> &'static str {
        "GGA"
    }

    fn output(&self, sample: &TelemetrySample) -> Result<String, OutputError> {
        let invalid = |reason: String| OutputError::Encode {
            sentence: "GGA",
            reason,
        };

        if !(-90.0..=90.0).contains(&sample.latitude) {
            return Err(invalid(format!("latitude {} out of range", sample.latitude)));
        }
        if !(-180.0..=180.0).contains(&sample.longitude) {
            return Err(invalid(format!("longitude {} out of range", sample.longitude)));
        }
        if !sample.elevation.is_finite() {
            return Err(invalid(format!("elevation {}", sample.elevation)));
        }

        Ok(gga_sentence(
            sample.timestamp.unwrap_or_else(Utc::now),
            sample.latitude,
            sample.longitude,
            sample.elevation,
            &self.fix,
            self.precision,
        ))
    }
}

/// `GPVTG` course and speed over ground.
#[derive(Debug, Clone, Default)]
pub struct VtgOutputter {
    precision: Precision,
}

impl VtgOutputter {
    pub fn new(precision: Precision) -> Self {
        Self { precision }
    }
}

impl Outputter for VtgOutputter {
    fn name(&self) -> &'static str {
        "VTG"
    }

    fn output(&self, sample: &TelemetrySample) -> Result<String, OutputError> {
        let heading = f64::from(sample.true_heading);
        let speed = sample.speed_over_ground();
        if !heading.is_finite() || !speed.is_finite() {
            return Err(OutputError::Encode {
                sentence: "VTG",
                reason: format!("heading {} speed {}", heading, speed),
            });
        }
        Ok(encode_vtg(heading, speed, self.precision))
    }
}

/// Sentence types that can be enabled in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SentenceKind {
    Gga,
    Vtg,
}

impl SentenceKind {
    pub const ALL: [SentenceKind; 2] = [SentenceKind::Gga, SentenceKind::Vtg];

    pub fn as_str(self) -> &'static str {
        match self {
            SentenceKind::Gga => "gga",
            SentenceKind::Vtg => "vtg",
        }
    }

    /// Build the outputter for this sentence.
    pub fn outputter(self, precision: Precision) -> Box<dyn Outputter> {
        match self {
            SentenceKind::Gga => Box::new(GgaOutputter::new(precision)),
            SentenceKind::Vtg => Box::new(VtgOutputter::new(precision)),
        }
    }
}

impl fmt::Display for SentenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentenceKind {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gga" | "gpgga" => Ok(SentenceKind::Gga),
            "vtg" | "gpvtg" => Ok(SentenceKind::Vtg),
            other => Err(OutputError::InvalidParameter {
                field: "sentence",
                value: other.to_string(),
            }),
        }
    }
}

/// Outputters for `kinds`, in order.
pub fn outputters_for(kinds: &[SentenceKind], precision: Precision) -> Vec<Box<dyn Outputter>> {
    kinds.iter().map(|k| k.outputter(precision)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nmea::verify_sentence;
    use chrono::TimeZone;

    fn sample() -> TelemetrySample {
        TelemetrySample {
            latitude: 47.5,
            longitude: -122.25,
            elevation: 120.0,
            true_heading: 90.0,
            velocity_east: 3.0,
            velocity_south: 4.0,
            ..Default::default()
        }
        .with_timestamp(Utc.with_ymd_and_hms(2022, 1, 1, 12, 30, 0).unwrap())
    }

    #[test]
    fn test_gga_uses_sample_timestamp() {
        let sentence = GgaOutputter::new(Precision::Standard)
            .output(&sample())
            .unwrap();
        assert!(
            sentence.starts_with("$GPGGA,123000.000,4730.0000,N,12215.0000,W,8,12,0.5,120.00,M,0.00,M,,*"),
            "{}",
            sentence
        );
        verify_sentence(&sentence).unwrap();
    }

    #[test]
    fn test_gga_without_timestamp_uses_now() {
        let mut s = sample();
        s.timestamp = None;
        let sentence = GgaOutputter::default().output(&s).unwrap();
        verify_sentence(&sentence).unwrap();
    }

    #[test]
    fn test_vtg_uses_ground_speed() {
        let sentence = VtgOutputter::new(Precision::Standard)
            .output(&sample())
            .unwrap();
        assert!(
            sentence.starts_with("$GPVTG,90.000,T,90.000,M,9.719226,N,18.000000,K,D*"),
            "{}",
            sentence
        );
    }

    #[test]
    fn test_rejects_impossible_positions() {
        let gga = GgaOutputter::default();
        let mut s = sample();
        s.latitude = f64::NAN;
        assert!(matches!(
            gga.output(&s),
            Err(OutputError::Encode { sentence, .. }) if sentence == "GGA"
        ));

        let mut s = sample();
        s.longitude = 181.0;
        assert!(gga.output(&s).is_err());

        let mut s = sample();
        s.elevation = f64::INFINITY;
        assert!(gga.output(&s).is_err());

        let mut s = sample();
        s.true_heading = f32::NAN;
        assert!(VtgOutputter::default().output(&s).is_err());
    }

    #[test]
    fn test_sentence_kind() {
        assert_eq!("GGA".parse::<SentenceKind>().unwrap(), SentenceKind::Gga);
        assert_eq!(
            " gpvtg ".parse::<SentenceKind>().unwrap(),
            SentenceKind::Vtg
        );
        assert!("rmc".parse::<SentenceKind>().is_err());

        let outputters = outputters_for(&SentenceKind::ALL, Precision::Enhanced);
        let names: Vec<&str> = outputters.iter().map(|o| o.name()).collect();
        assert_eq!(names, vec!["GGA", "VTG"]);
    }
}
