//! Equatorial and horizontal coordinate types and the transform between them.

use crate::EphemerisError;
use nalgebra::Vector3;

/// Right ascension and declination in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquatorialCoord {
    /// Right ascension in degrees, normalized to [0, 360)
    pub ra_deg: f64,
    /// Declination in degrees
    pub dec_deg: f64,
}

impl EquatorialCoord {
    /// Create a coordinate, wrapping RA into [0, 360) and validating Dec
    pub fn new(ra_deg: f64, dec_deg: f64) -> Result<Self, EphemerisError> {
        if !ra_deg.is_finite() || !dec_deg.is_finite() {
            return Err(EphemerisError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&dec_deg) {
            return Err(EphemerisError::InvalidDeclination(dec_deg));
        }
        Ok(Self {
            ra_deg: wrap_degrees(ra_deg),
            dec_deg,
        })
    }

    /// Unit vector in the equatorial frame (x toward the equinox, z toward the pole)
    pub fn to_unit_vector(&self) -> Vector3<f64> {
        let ra = self.ra_deg.to_radians();
        let dec = self.dec_deg.to_radians();
        Vector3::new(dec.cos() * ra.cos(), dec.cos() * ra.sin(), dec.sin())
    }

    /// Inverse of [`to_unit_vector`](Self::to_unit_vector). The input need not be normalized.
    pub fn from_vector(v: &Vector3<f64>) -> Self {
        let n = v.normalize();
        let dec = n.z.clamp(-1.0, 1.0).asin();
        let ra = n.y.atan2(n.x);
        Self {
            ra_deg: wrap_degrees(ra.to_degrees()),
            dec_deg: dec.to_degrees(),
        }
    }
}

/// Altitude above the horizon and azimuth from north through east, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalCoord {
    pub altitude_deg: f64,
    /// Azimuth in [0, 360)
    pub azimuth_deg: f64,
}

/// Convert local hour angle and declination to horizontal coordinates.
///
/// # Arguments
/// * `hour_angle_deg` - Local hour angle, positive west of the meridian
/// * `dec_deg` - Declination of the target
/// * `latitude_deg` - Observer latitude
pub fn equatorial_to_horizontal(
    hour_angle_deg: f64,
    dec_deg: f64,
    latitude_deg: f64,
) -> HorizontalCoord {
    let h = hour_angle_deg.to_radians();
    let dec = dec_deg.to_radians();
    let lat = latitude_deg.to_radians();

    let sin_alt = lat.sin() * dec.sin() + lat.cos() * dec.cos() * h.cos();
    let altitude = sin_alt.clamp(-1.0, 1.0).asin();

    let az_y = -dec.cos() * h.sin();
    let az_x = dec.sin() * lat.cos() - dec.cos() * h.cos() * lat.sin();
    let azimuth = az_y.atan2(az_x);

    HorizontalCoord {
        altitude_deg: altitude.to_degrees(),
        azimuth_deg: wrap_degrees(azimuth.to_degrees()),
    }
}

/// Wrap an angle in degrees into [0, 360)
pub fn wrap_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
