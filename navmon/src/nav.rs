//! Per-constellation navigation message decoders.

pub mod beidou;
pub mod galileo;
pub mod gps;

use crate::constants::SECONDS_PER_WEEK;

/// Age in seconds of data referenced at `reference` when the current time of
/// week is `tow`, folded into (-half week, +half week] so that a week rollover
/// between the two does not produce a huge age.
pub fn ephemeris_age(reference: u32, tow: u32) -> i32 {
    let week = i64::from(SECONDS_PER_WEEK);
    let age = (i64::from(tow) - i64::from(reference)).rem_euclid(week);
    let age = if age > week / 2 { age - week } else { age };
    // |age| <= half a week
    age as i32
}
