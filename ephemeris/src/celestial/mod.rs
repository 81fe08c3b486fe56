//! Celestial target positions as seen from an observer site

pub mod precession;

use crate::coords::{equatorial_to_horizontal, EquatorialCoord, HorizontalCoord};
use crate::provider::AltitudeProvider;
use crate::sidereal::{hour_angle_degrees, julian_date};
use crate::site::ObserverSite;
use chrono::{DateTime, Utc};

pub use precession::{precess_from_j2000, precession_matrix};

/// Topocentric ephemeris for fixed (sidereal) targets at one site.
///
/// Target coordinates are taken as J2000 mean positions and, unless disabled,
/// precessed to the mean equinox of date before the hour angle is formed.
/// Nutation, aberration and refraction are not applied.
#[derive(Debug, Clone)]
pub struct Ephemeris {
    site: ObserverSite,
    precess: bool,
}

impl Ephemeris {
    /// Create an ephemeris calculator for `site`
    pub fn new(site: ObserverSite) -> Self {
        Self {
            site,
            precess: true,
        }
    }

    /// Treat target coordinates as already referred to the equinox of date
    pub fn without_precession(mut self) -> Self {
        self.precess = false;
        self
    }

    pub fn site(&self) -> &ObserverSite {
        &self.site
    }

    pub fn applies_precession(&self) -> bool {
        self.precess
    }

    /// Position of `target` referred to the equator used for the hour angle
    fn apparent_place(&self, jd: f64, target: &EquatorialCoord) -> EquatorialCoord {
        if self.precess {
            precess_from_j2000(target, jd)
        } else {
            *target
        }
    }
}

impl Default for Ephemeris {
    fn default() -> Self {
        Self::new(ObserverSite::default())
    }
}

impl AltitudeProvider for Ephemeris {
    fn altitude_azimuth_at(
        &self,
        time: &DateTime<Utc>,
        target: &EquatorialCoord,
    ) -> HorizontalCoord {
        let jd = julian_date(time);
        let place = self.apparent_place(jd, target);
        let ha = hour_angle_degrees(jd, self.site.longitude_deg, place.ra_deg);
        equatorial_to_horizontal(ha, place.dec_deg, self.site.latitude_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sidereal::local_sidereal_degrees;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    fn equator_site() -> ObserverSite {
        ObserverSite::new("equator", 0.0, 0.0, 0.0).unwrap()
    }

    #[test]
    fn test_transit_altitude() {
        // A target on the local meridian culminates at 90 - |lat - dec|
        let site = ObserverSite::t80s();
        let t = Utc.with_ymd_and_hms(2024, 6, 1, 3, 0, 0).unwrap();
        let lst = local_sidereal_degrees(julian_date(&t), site.longitude_deg);
        let target = EquatorialCoord::new(lst, -60.0).unwrap();
        let eph = Ephemeris::new(site.clone()).without_precession();

        let hz = eph.altitude_azimuth_at(&t, &target);
        assert_relative_eq!(
            hz.altitude_deg,
            90.0 - (site.latitude_deg + 60.0).abs(),
            epsilon = 1e-8
        );
        assert_relative_eq!(hz.azimuth_deg, 180.0, epsilon = 1e-6);
    }

    #[test]
    fn test_precession_shifts_altitude_slightly() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let target = EquatorialCoord::new(83.8, -5.4).unwrap();
        let with = Ephemeris::new(equator_site());
        let without = Ephemeris::new(equator_site()).without_precession();

        let a = with.altitude_azimuth_at(&t, &target).altitude_deg;
        let b = without.altitude_azimuth_at(&t, &target).altitude_deg;
        let shift = (a - b).abs();
        assert!(shift > 0.01 && shift < 0.5, "unexpected precession shift {shift}");
    }

    #[test]
    fn test_sample_matches_pointwise() {
        let eph = Ephemeris::new(equator_site());
        let target = EquatorialCoord::new(10.0, 5.0).unwrap();
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let times: Vec<_> = (0..5).map(|i| t0 + chrono::Duration::minutes(i)).collect();

        let samples = eph.sample(&times, &target);
        assert_eq!(samples.len(), 5);
        for s in &samples {
            let hz = eph.altitude_azimuth_at(&s.time, &target);
            assert_eq!(s.altitude_deg, hz.altitude_deg);
            assert_eq!(s.azimuth_deg, hz.azimuth_deg);
        }
    }

    #[test]
    fn test_default_uses_t80s_with_precession() {
        let eph = Ephemeris::default();
        assert_eq!(eph.site().name, "T80S");
        assert!(eph.applies_precession());
    }
}
