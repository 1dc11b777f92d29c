//! Ellipsoidal geodesy and receiver local topocentric transforms.
use crate::Vector3D;

/// WGS84 reference ellipsoid parameters.
pub mod wgs84 {
    /// Semi major axis [m]
    pub const A: f64 = 6378137.0;
    /// Flattening factor
    pub const F: f64 = 1.0 / 298.257223563;
    /// First eccentricity, squared
    pub const E2: f64 = 2.0 * F - F * F;
    /// Semi minor axis [m]
    pub const B: f64 = A * (1.0 - F);
}

fn sub(lhs: Vector3D, rhs: Vector3D) -> Vector3D {
    (lhs.0 - rhs.0, lhs.1 - rhs.1, lhs.2 - rhs.2)
}

fn dot(lhs: Vector3D, rhs: Vector3D) -> f64 {
    lhs.0 * rhs.0 + lhs.1 * rhs.1 + lhs.2 * rhs.2
}

fn norm(v: Vector3D) -> f64 {
    dot(v, v).sqrt()
}

/// Converts ECEF coordinates in meters to geodetic (latitude, longitude,
/// ellipsoidal height), in radians and meters. Iterates until successive
/// latitude estimates agree within `tol` radians, with a hard cap of 10
/// iterations: on non convergence the best estimate is returned, never an
/// error.
pub fn xyz2llh(xyz: Vector3D, tol: f64) -> (f64, f64, f64) {
    let (x, y, z) = xyz;

    let lon = y.atan2(x);
    let p = (x * x + y * y).sqrt();

    // spherical first guess
    let mut lat = (z / p / (1.0 - wgs84::E2)).atan();
    let mut height = 0.0_f64;

    let a2 = wgs84::A * wgs84::A;
    let b2 = wgs84::B * wgs84::B;

    let mut error = 1.0_f64;
    let mut niter = 0_u8;

    while error > tol && niter < 10 {
        let n = a2 / (a2 * lat.cos().powi(2) + b2 * lat.sin().powi(2)).sqrt();
        height = p / lat.cos() - n;

        let estimate = (z / p / (1.0 - wgs84::E2 * n / (n + height))).atan();

        error = (estimate - lat).abs();
        lat = estimate;
        niter += 1;
    }

    (lat, lon, height)
}

/// Converts geodetic (latitude, longitude, ellipsoidal height), in radians
/// and meters, to ECEF coordinates in meters.
pub fn llh2xyz(lat: f64, lon: f64, height: f64) -> Vector3D {
    let n = wgs84::A / (1.0 - wgs84::E2 * lat.sin().powi(2)).sqrt();
    (
        (n + height) * lat.cos() * lon.cos(),
        (n + height) * lat.cos() * lon.sin(),
        (n * (1.0 - wgs84::E2) + height) * lat.sin(),
    )
}

/// Builds the ECEF to ENU rotation matrix for given geodetic
/// (latitude, longitude) in radians. Rows are (east, north, up).
pub fn llh2rot(lat: f64, lon: f64) -> [[f64; 3]; 3] {
    [
        [-lon.sin(), lon.cos(), 0.0],
        [-lat.sin() * lon.cos(), -lat.sin() * lon.sin(), lat.cos()],
        [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()],
    ]
}

/// Expresses the receiver to satellite displacement in the receiver local
/// ENU frame. Both positions in ECEF meters.
pub fn ecef2enu(rec_pos: Vector3D, sat_pos: Vector3D) -> Vector3D {
    let (lat, lon, _) = xyz2llh(rec_pos, 1.0E-8);
    let rot = llh2rot(lat, lon);
    let d = sub(sat_pos, rec_pos);
    (
        rot[0][0] * d.0 + rot[0][1] * d.1 + rot[0][2] * d.2,
        rot[1][0] * d.0 + rot[1][1] * d.1 + rot[1][2] * d.2,
        rot[2][0] * d.0 + rot[2][1] * d.1 + rot[2][2] * d.2,
    )
}

/// Elevation angle of the satellite above the receiver local horizon,
/// in radians. Both positions in ECEF meters. A zero length displacement
/// has no defined elevation and yields NaN.
pub fn el_ang(rec_pos: Vector3D, sat_pos: Vector3D) -> f64 {
    let enu = ecef2enu(rec_pos, sat_pos);
    let n = norm(enu);
    if n == 0.0 {
        return f64::NAN;
    }
    // rounding can push the ratio a hair past 1 at exact zenith
    (enu.2 / n).clamp(-1.0, 1.0).asin()
}

/// Azimuth angle of the satellite as seen from the receiver, in radians,
/// counted from local north, in (-π, π]. NaN on zero length displacement.
pub fn az_ang(rec_pos: Vector3D, sat_pos: Vector3D) -> f64 {
    let enu = ecef2enu(rec_pos, sat_pos);
    let n = norm(enu);
    if n == 0.0 {
        return f64::NAN;
    }
    (enu.0 / n).atan2(enu.1 / n)
}

/// Line of sight distance between receiver and satellite, in meters.
pub fn calc_dist(rec_pos: Vector3D, sat_pos: Vector3D) -> f64 {
    norm(sub(rec_pos, sat_pos))
}

/// Angle between the satellite nadir axis and the line to the receiver,
/// in degrees. `sat_pos` is the geocentric satellite vector and `disp` the
/// satellite minus receiver displacement, in consistent units.
/// NaN when either vector is zero length.
pub fn nadir_ang(sat_pos: Vector3D, disp: Vector3D) -> f64 {
    let denom = norm(sat_pos) * norm(disp);
    if denom == 0.0 {
        return f64::NAN;
    }
    let cosine = (dot(sat_pos, disp) / denom).clamp(-1.0, 1.0);
    cosine.acos().to_degrees()
}

/// Full angle set tied to one (satellite, receiver) geometry sample.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Angles {
    /// Elevation above local horizon [°], in [-90, 90]
    pub elevation_deg: f64,
    /// Azimuth from local north [°], in (-180, 180]
    pub azimuth_deg: f64,
    /// Nadir angle at the satellite [°], in [0, 180], NaN when undefined
    pub nadir_deg: f64,
    /// Line of sight range [km]
    pub range_km: f64,
}

/// Computes the full [Angles] set for one satellite position expressed in
/// kilometers against a receiver position in meters. The receiver position
/// is scaled down to match the km table.
pub fn all_angles(rec_pos_m: Vector3D, sat_pos_km: Vector3D) -> Angles {
    let rec_km = (rec_pos_m.0 / 1.0E3, rec_pos_m.1 / 1.0E3, rec_pos_m.2 / 1.0E3);
    let disp_km = sub(sat_pos_km, rec_km);

    let nadir_deg = nadir_ang(sat_pos_km, disp_km);
    let range_km = norm(disp_km);

    let (lat, lon, _) = xyz2llh(rec_pos_m, 1.0E-8);
    let rot = llh2rot(lat, lon);
    let enu = (
        rot[0][0] * disp_km.0 + rot[0][1] * disp_km.1 + rot[0][2] * disp_km.2,
        rot[1][0] * disp_km.0 + rot[1][1] * disp_km.1 + rot[1][2] * disp_km.2,
        rot[2][0] * disp_km.0 + rot[2][1] * disp_km.1 + rot[2][2] * disp_km.2,
    );

    let n = norm(enu);
    let (elevation_deg, azimuth_deg) = if n == 0.0 {
        (f64::NAN, f64::NAN)
    } else {
        (
            (enu.2 / n).clamp(-1.0, 1.0).asin().to_degrees(),
            (enu.0 / n).atan2(enu.1 / n).to_degrees(),
        )
    };

    Angles {
        elevation_deg,
        azimuth_deg,
        nadir_deg,
        range_km,
    }
}
