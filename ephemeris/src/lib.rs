//! Topocentric positions of fixed celestial targets.
//!
//! This crate converts J2000 equatorial coordinates into altitude and azimuth
//! for a ground observer at a given UTC instant. It provides:
//!
//! - **Observer sites**: geodetic position of a telescope ([`ObserverSite`])
//! - **Sidereal time**: Julian dates and mean sidereal time ([`sidereal`])
//! - **Precession**: IAU 1976 rotation from J2000 to the mean equinox of date
//! - **Altitude providers**: the [`AltitudeProvider`] capability and its
//!   default implementation [`Ephemeris`]
//!
//! UTC is used in place of UT1 and TT: sidereal time is off by less than a
//! second of time, and the effect on precession is negligible.

pub mod celestial;
pub mod coords;
pub mod provider;
pub mod sidereal;
pub mod site;

pub use celestial::Ephemeris;
pub use coords::{EquatorialCoord, HorizontalCoord};
pub use provider::{AltAzSample, AltitudeProvider};
pub use site::ObserverSite;

use thiserror::Error;

/// Errors raised when building ephemeris inputs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EphemerisError {
    #[error("Latitude {0} deg is outside [-90, 90]")]
    InvalidLatitude(f64),
    #[error("Longitude {0} deg is outside [-180, 360)")]
    InvalidLongitude(f64),
    #[error("Declination {0} deg is outside [-90, 90]")]
    InvalidDeclination(f64),
    #[error("Coordinate value is not finite")]
    NotFinite,
}
