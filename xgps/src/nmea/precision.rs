//! Decimal precision profiles for encoded sentences.

use std::fmt;
use std::str::FromStr;

/// Number of decimal places used for each encoded quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrecisionProfile {
    /// Fractional digits of latitude minutes.
    pub latitude: usize,
    /// Fractional digits of longitude minutes.
    pub longitude: usize,
    /// Fractional digits of altitude and geoid separation.
    pub altitude: usize,
    /// Fractional digits of speed over ground.
    pub speed: usize,
    /// Fractional digits of headings.
    pub heading: usize,
}

/// Built-in precision profiles.
///
/// `Standard` matches what consumer GPS receivers emit. `Enhanced` carries
/// extra digits for consumers that can use them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    #[default]
    Standard,
    Enhanced,
}

impl Precision {
    const STANDARD: PrecisionProfile = PrecisionProfile {
        latitude: 4,
        longitude: 4,
        altitude: 2,
        speed: 6,
        heading: 3,
    };

    const ENHANCED: PrecisionProfile = PrecisionProfile {
        latitude: 7,
        longitude: 7,
        altitude: 4,
        speed: 7,
        heading: 3,
    };

    /// Decimal places for this profile.
    pub const fn profile(self) -> PrecisionProfile {
        match self {
            Precision::Standard => Self::STANDARD,
            Precision::Enhanced => Self::ENHANCED,
        }
    }

    /// Config/CLI name of the profile.
    pub fn as_str(self) -> &'static str {
        match self {
            Precision::Standard => "standard",
            Precision::Enhanced => "enhanced",
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Precision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" | "default" => Ok(Precision::Standard),
            "enhanced" => Ok(Precision::Enhanced),
            other => Err(format!(
                "unknown precision '{}', expected 'standard' or 'enhanced'",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_standard() {
        assert_eq!(Precision::default(), Precision::Standard);
    }

    #[test]
    fn test_profiles() {
        let standard = Precision::Standard.profile();
        assert_eq!(standard.latitude, 4);
        assert_eq!(standard.altitude, 2);
        assert_eq!(standard.speed, 6);

        let enhanced = Precision::Enhanced.profile();
        assert_eq!(enhanced.longitude, 7);
        assert_eq!(enhanced.altitude, 4);
        assert_eq!(enhanced.heading, 3);
    }

    #[test]
    fn test_parse_round_trips_display() {
        for precision in [Precision::Standard, Precision::Enhanced] {
            assert_eq!(precision.to_string().parse::<Precision>(), Ok(precision));
        }
        assert_eq!(" Enhanced ".parse::<Precision>(), Ok(Precision::Enhanced));
        assert!("ultra".parse::<Precision>().is_err());
    }
}
