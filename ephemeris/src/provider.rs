//! The altitude capability consumed by crossing searches

use crate::coords::{EquatorialCoord, HorizontalCoord};
use chrono::{DateTime, Utc};

/// One point of an altitude/azimuth curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AltAzSample {
    pub time: DateTime<Utc>,
    pub altitude_deg: f64,
    pub azimuth_deg: f64,
}

/// Anything that can tell where a target sits in the local sky at an instant.
///
/// Implementations must be deterministic: the same inputs always give the
/// same output.
pub trait AltitudeProvider {
    /// Altitude and azimuth of `target` at `time`
    fn altitude_azimuth_at(&self, time: &DateTime<Utc>, target: &EquatorialCoord)
        -> HorizontalCoord;

    /// Evaluate the provider over a sequence of instants
    fn sample(&self, times: &[DateTime<Utc>], target: &EquatorialCoord) -> Vec<AltAzSample> {
        times
            .iter()
            .map(|t| {
                let hz = self.altitude_azimuth_at(t, target);
                AltAzSample {
                    time: *t,
                    altitude_deg: hz.altitude_deg,
                    azimuth_deg: hz.azimuth_deg,
                }
            })
            .collect()
    }
}

impl<P: AltitudeProvider + ?Sized> AltitudeProvider for &P {
    fn altitude_azimuth_at(
        &self,
        time: &DateTime<Utc>,
        target: &EquatorialCoord,
    ) -> HorizontalCoord {
        (**self).altitude_azimuth_at(time, target)
    }
}
