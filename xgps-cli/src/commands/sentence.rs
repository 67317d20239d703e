//! Sentence command - print the sentences for one position.

use clap::Args;
use xgps::nmea::Precision;
use xgps::output::{outputters_for, SentenceKind};
use xgps::xplane::TelemetrySample;

use crate::error::CliError;

#[derive(Debug, Args)]
pub struct SentenceArgs {
    /// Latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// Altitude in metres above mean sea level
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub alt: f64,

    /// True heading in degrees
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub heading: f32,

    /// Ground speed in metres per second
    #[arg(long, default_value = "0")]
    pub speed: f32,

    /// Sentence precision: standard or enhanced
    #[arg(long, default_value = "standard")]
    pub precision: Precision,
}

pub fn run(args: SentenceArgs) -> Result<(), CliError> {
    for sentence in render(&args)? {
        print!("{}", sentence);
    }
    Ok(())
}

fn render(args: &SentenceArgs) -> Result<Vec<String>, CliError> {
    // all of the speed as eastward velocity; only the magnitude is encoded
    let sample = TelemetrySample {
        latitude: args.lat,
        longitude: args.lon,
        elevation: args.alt,
        true_heading: args.heading,
        velocity_east: args.speed,
        ..Default::default()
    };

    outputters_for(&SentenceKind::ALL, args.precision)
        .iter()
        .map(|o| o.output(&sample))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| CliError::InvalidInput(e.to_string()))
}
