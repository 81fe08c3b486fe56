//! Julian dates and mean sidereal time

use crate::coords::wrap_degrees;
use chrono::{DateTime, Utc};

/// Julian date of the Unix epoch, 1970-01-01T00:00:00Z
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Julian date of the J2000.0 epoch
pub const J2000_JD: f64 = 2_451_545.0;

/// Days per Julian century
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Julian date of a UTC instant
pub fn julian_date(time: &DateTime<Utc>) -> f64 {
    // Split seconds and nanoseconds to keep sub-millisecond precision
    let seconds = time.timestamp() as f64;
    let nanos = time.timestamp_subsec_nanos() as f64;
    UNIX_EPOCH_JD + (seconds + nanos * 1e-9) / SECONDS_PER_DAY
}

/// Julian centuries elapsed since J2000.0
pub fn julian_centuries_since_j2000(jd: f64) -> f64 {
    (jd - J2000_JD) / DAYS_PER_JULIAN_CENTURY
}

/// Greenwich mean sidereal time in degrees, [0, 360).
///
/// Uses the IAU 1982 expression in the form given by Meeus (eq. 12.4).
pub fn gmst_degrees(jd: f64) -> f64 {
    let d = jd - J2000_JD;
    let t = d / DAYS_PER_JULIAN_CENTURY;
    let gmst = 280.460_618_37 + 360.985_647_366_29 * d + 0.000_387_933 * t * t
        - t * t * t / 38_710_000.0;
    wrap_degrees(gmst)
}

/// Local mean sidereal time in degrees for an east-positive longitude
pub fn local_sidereal_degrees(jd: f64, longitude_deg: f64) -> f64 {
    wrap_degrees(gmst_degrees(jd) + longitude_deg)
}

/// Local hour angle in degrees, wrapped into (-180, 180]
pub fn hour_angle_degrees(jd: f64, longitude_deg: f64, ra_deg: f64) -> f64 {
    let h = wrap_degrees(local_sidereal_degrees(jd, longitude_deg) - ra_deg);
    if h > 180.0 {
        h - 360.0
    } else {
        h
    }
}
