//! Geodetic observer positions

use crate::EphemerisError;

/// Geodetic position of a ground observatory.
///
/// Longitude is east-positive. Elevation is carried for completeness; for
/// stellar targets the topocentric parallax it would introduce is negligible.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverSite {
    /// Site name used in log output
    pub name: String,
    /// Geodetic latitude in degrees
    pub latitude_deg: f64,
    /// Geodetic longitude in degrees, east positive
    pub longitude_deg: f64,
    /// Height above the ellipsoid in meters
    pub elevation_m: f64,
}

impl ObserverSite {
    /// Create a validated observer site
    pub fn new(
        name: impl Into<String>,
        latitude_deg: f64,
        longitude_deg: f64,
        elevation_m: f64,
    ) -> Result<Self, EphemerisError> {
        if !latitude_deg.is_finite() || !longitude_deg.is_finite() || !elevation_m.is_finite() {
            return Err(EphemerisError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&latitude_deg) {
            return Err(EphemerisError::InvalidLatitude(latitude_deg));
        }
        if !(-180.0..360.0).contains(&longitude_deg) {
            return Err(EphemerisError::InvalidLongitude(longitude_deg));
        }

        Ok(Self {
            name: name.into(),
            latitude_deg,
            longitude_deg,
            elevation_m,
        })
    }

    /// The T80-South telescope at Cerro Tololo
    pub fn t80s() -> Self {
        Self {
            name: "T80S".to_string(),
            latitude_deg: -30.167_863_888_9,
            longitude_deg: -70.805_688_888_9,
            elevation_m: 2187.0,
        }
    }

    /// Latitude in radians
    pub fn latitude_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }
}

impl Default for ObserverSite {
    fn default() -> Self {
        Self::t80s()
    }
}

impl std::fmt::Display for ObserverSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (lat {:.6}, lon {:.6}, {:.0} m)",
            self.name, self.latitude_deg, self.longitude_deg, self.elevation_m
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_t80s() {
        let site = ObserverSite::default();
        assert_eq!(site.name, "T80S");
        assert!(site.latitude_deg < -30.0);
        assert_eq!(site.elevation_m, 2187.0);
    }

    #[test]
    fn test_rejects_bad_latitude() {
        assert_eq!(
            ObserverSite::new("bad", 91.0, 0.0, 0.0),
            Err(EphemerisError::InvalidLatitude(91.0))
        );
    }

    #[test]
    fn test_rejects_bad_longitude() {
        assert!(matches!(
            ObserverSite::new("bad", 0.0, -200.0, 0.0),
            Err(EphemerisError::InvalidLongitude(_))
        ));
    }

    #[test]
    fn test_rejects_nan() {
        assert_eq!(
            ObserverSite::new("bad", f64::NAN, 0.0, 0.0),
            Err(EphemerisError::NotFinite)
        );
    }
}
