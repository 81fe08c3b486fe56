//! IAU 1976 precession of J2000 mean positions to the mean equinox of date

use crate::coords::EquatorialCoord;
use crate::sidereal::julian_centuries_since_j2000;
use nalgebra::Matrix3;

const ARCSEC_TO_RAD: f64 = std::f64::consts::PI / (180.0 * 3600.0);

/// Precession angles (zeta, z, theta) in radians for `t` Julian centuries after J2000.
///
/// Lieske et al. (1977), as tabulated in Meeus eq. 21.3 with the starting
/// epoch fixed at J2000.
pub fn precession_angles(t: f64) -> (f64, f64, f64) {
    let t2 = t * t;
    let t3 = t2 * t;
    let zeta = 2306.2181 * t + 0.30188 * t2 + 0.017998 * t3;
    let z = 2306.2181 * t + 1.09468 * t2 + 0.018203 * t3;
    let theta = 2004.3109 * t - 0.42665 * t2 - 0.041833 * t3;
    (zeta * ARCSEC_TO_RAD, z * ARCSEC_TO_RAD, theta * ARCSEC_TO_RAD)
}

/// Frame rotation about the z axis
fn rot_z(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(c, s, 0.0, -s, c, 0.0, 0.0, 0.0, 1.0)
}

/// Frame rotation about the y axis
fn rot_y(angle: f64) -> Matrix3<f64> {
    let (s, c) = angle.sin_cos();
    Matrix3::new(c, 0.0, -s, 0.0, 1.0, 0.0, s, 0.0, c)
}

/// Rotation matrix taking J2000 unit vectors to the mean equator and equinox of `jd`.
///
/// P = R3(-z) * R2(theta) * R3(-zeta)
pub fn precession_matrix(jd: f64) -> Matrix3<f64> {
    let (zeta, z, theta) = precession_angles(julian_centuries_since_j2000(jd));
    rot_z(-z) * rot_y(theta) * rot_z(-zeta)
}

/// Precess a J2000 position to the mean equinox of `jd`
pub fn precess_from_j2000(coord: &EquatorialCoord, jd: f64) -> EquatorialCoord {
    let v = precession_matrix(jd) * coord.to_unit_vector();
    EquatorialCoord::from_vector(&v)
}
