//! Unit conversion and planar rotation in the (longitude, latitude) plane.
//!
//! Parcels are a few hundred meters across, so degrees are treated as a local
//! Cartesian frame: x = longitude, y = latitude.
//!
//! meters -> degrees: Δφ = m / 111132, Δλ = m / (111132·cos φ₀)

use serde::{Deserialize, Serialize};

/// Meters spanned by one degree of latitude.
pub const METERS_PER_DEG_LAT: f64 = 111_132.0;

/// Lower bound on |cos φ₀| so longitude conversion stays finite at the poles.
const MIN_COS_LAT: f64 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build from planar (x, y) = (longitude, latitude).
    #[inline]
    pub fn from_xy(x: f64, y: f64) -> Self {
        Self {
            latitude: y,
            longitude: x,
        }
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.longitude
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.latitude
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

pub fn meters_to_deg_lat(meters: f64) -> f64 {
    meters / METERS_PER_DEG_LAT
}

pub fn meters_to_deg_lng(meters: f64, ref_lat: f64) -> f64 {
    meters / (METERS_PER_DEG_LAT * clamped_cos_lat(ref_lat))
}

/// cos(φ) with its magnitude held at or above `MIN_COS_LAT`, sign preserved.
fn clamped_cos_lat(lat_deg: f64) -> f64 {
    let cos_lat = lat_deg.to_radians().cos();
    if cos_lat.abs() < MIN_COS_LAT {
        MIN_COS_LAT.copysign(cos_lat)
    } else {
        cos_lat
    }
}

/// Rotate `point` about `pivot` by `angle_deg`, clockwise-positive like a
/// compass bearing: a point due north of the pivot rotated by 90 ends up due east.
pub fn rotate(point: Coordinate, pivot: Coordinate, angle_deg: f64) -> Coordinate {
    let (sin_a, cos_a) = angle_deg.to_radians().sin_cos();
    rotate_by_sin_cos(point, pivot, sin_a, cos_a)
}

/// Rotate by precomputed sin and cos values.
#[inline]
pub fn rotate_by_sin_cos(point: Coordinate, pivot: Coordinate, sin_a: f64, cos_a: f64) -> Coordinate {
    let dx = point.x() - pivot.x();
    let dy = point.y() - pivot.y();
    Coordinate::from_xy(
        pivot.x() + dx * cos_a + dy * sin_a,
        pivot.y() - dx * sin_a + dy * cos_a,
    )
}

/// Rotate every point of a ring about the same pivot.
pub fn rotate_all(points: &[Coordinate], pivot: Coordinate, angle_deg: f64) -> Vec<Coordinate> {
    let (sin_a, cos_a) = angle_deg.to_radians().sin_cos();
    points
        .iter()
        .map(|p| rotate_by_sin_cos(*p, pivot, sin_a, cos_a))
        .collect()
}

/// Compass bearing of the directed segment `from -> to`, in [0, 360).
pub fn bearing(from: Coordinate, to: Coordinate) -> f64 {
    let d_lng = to.longitude - from.longitude;
    let d_lat = to.latitude - from.latitude;
    let theta = d_lng.atan2(d_lat).to_degrees();
    let normalized = theta.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Local planar offset of `point` from `origin`, in meters (x east, y north).
pub fn to_local_meters(point: Coordinate, origin: Coordinate) -> (f64, f64) {
    let x = (point.longitude - origin.longitude)
        * METERS_PER_DEG_LAT
        * clamped_cos_lat(origin.latitude);
    let y = (point.latitude - origin.latitude) * METERS_PER_DEG_LAT;
    (x, y)
}
