//! `GPVTG` - course over ground and ground speed.
//!
//! ```text
//! $GPVTG,224.592,T,224.592,M,0.003000,N,0.005556,K,D*hh
//! ```
//!
//! True and magnetic courses carry the same value: the simulator reports a
//! true heading only.

use super::{format_heading, frame, Precision};

/// Knots per metre per second.
pub const KNOTS_PER_MPS: f64 = 1.943845249221964;

/// Kilometres per hour per metre per second.
pub const KMH_PER_MPS: f64 = 3.6;

/// Mode indicator: differential fix.
const MODE_DIFFERENTIAL: char = 'D';

/// Encode a `GPVTG` sentence.
///
/// `heading` is in degrees and may lie outside `[0, 360)`;
/// `speed_over_ground` is in metres per second.
pub fn encode_vtg(heading: f64, speed_over_ground: f64, precision: Precision) -> String {
    let profile = precision.profile();
    let course = format_heading(heading, profile.heading);

    let body = format!(
        "GPVTG,{course},T,{course},M,{:.spd$},N,{:.spd$},K,{}",
        speed_over_ground * KNOTS_PER_MPS,
        speed_over_ground * KMH_PER_MPS,
        MODE_DIFFERENTIAL,
        spd = profile.speed,
    );

    frame(&body)
}
