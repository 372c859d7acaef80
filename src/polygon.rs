//! Polygon primitives over `Coordinate` rings.
//!
//! Rings are stored open: the last vertex implicitly connects back to the
//! first. All predicates treat x = longitude and y = latitude.

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;
use crate::geo::{self, Coordinate};

/// Axis-aligned bounding box in (longitude, latitude).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    #[inline]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// True when `other` lies inside `self`, edges included.
    #[inline]
    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }
}

/// Bounding box of a ring, `None` when the ring is empty.
pub fn bounding_box(points: &[Coordinate]) -> Option<BoundingBox> {
    let first = points.first()?;
    let mut bb = BoundingBox {
        min_x: first.x(),
        min_y: first.y(),
        max_x: first.x(),
        max_y: first.y(),
    };
    for p in &points[1..] {
        bb.min_x = bb.min_x.min(p.x());
        bb.min_y = bb.min_y.min(p.y());
        bb.max_x = bb.max_x.max(p.x());
        bb.max_y = bb.max_y.max(p.y());
    }
    Some(bb)
}

/// Rectangle corners in (lng, lat) order: SW, SE, NE, NW.
pub fn rectangle(x0: f64, y0: f64, x1: f64, y1: f64) -> [Coordinate; 4] {
    [
        Coordinate::from_xy(x0, y0),
        Coordinate::from_xy(x1, y0),
        Coordinate::from_xy(x1, y1),
        Coordinate::from_xy(x0, y1),
    ]
}

/// Ray-casting parity test. Points exactly on an edge may land either way.
pub fn point_in_polygon(point: Coordinate, ring: &[Coordinate]) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let (px, py) = (point.x(), point.y());
    let mut inside = false;
    let mut j = ring.len() - 1;

    for i in 0..ring.len() {
        let (xi, yi) = (ring[i].x(), ring[i].y());
        let (xj, yj) = (ring[j].x(), ring[j].y());

        if ((yi > py) != (yj > py)) && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// True iff every corner of `rect` is inside `ring`.
pub fn fully_contained(rect: &[Coordinate], ring: &[Coordinate]) -> bool {
    match bounding_box(ring) {
        Some(ring_bbox) => fully_contained_in(rect, ring, &ring_bbox),
        None => false,
    }
}

/// [`fully_contained`] with the ring's bounding box precomputed.
///
/// A corner outside `ring_bbox` can never pass the parity test, so rejecting
/// on it first gives the same answer.
pub fn fully_contained_in(rect: &[Coordinate], ring: &[Coordinate], ring_bbox: &BoundingBox) -> bool {
    match bounding_box(rect) {
        Some(rect_bbox) if ring_bbox.contains_box(&rect_bbox) => {
            rect.iter().all(|corner| point_in_polygon(*corner, ring))
        }
        _ => false,
    }
}

/// Drop non-finite vertices and a trailing duplicate of the first vertex.
pub fn sanitize_ring(points: &[Coordinate]) -> Vec<Coordinate> {
    let mut ring: Vec<Coordinate> = points.iter().copied().filter(Coordinate::is_finite).collect();
    while ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

/// Boundary guard for callers: at least three usable vertices.
pub fn validate_parcel(points: &[Coordinate]) -> Result<(), LayoutError> {
    let usable = sanitize_ring(points).len();
    if usable < 3 {
        return Err(LayoutError::InvalidParcel(format!(
            "parcel needs at least 3 distinct vertices, got {usable}"
        )));
    }
    Ok(())
}

/// Vertex mean of the ring, used as the rotation pivot.
pub fn centroid(ring: &[Coordinate]) -> Option<Coordinate> {
    if ring.is_empty() {
        return None;
    }
    let n = ring.len() as f64;
    let (sum_x, sum_y) = ring
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x(), sy + p.y()));
    Some(Coordinate::from_xy(sum_x / n, sum_y / n))
}

/// Directed edges of the ring in vertex order, including the closing edge.
pub fn edges(ring: &[Coordinate]) -> impl Iterator<Item = (Coordinate, Coordinate)> + '_ {
    let n = ring.len();
    (0..n).map(move |i| (ring[i], ring[(i + 1) % n]))
}

/// Planar area in square meters, measured in a local frame anchored at the
/// vertex mean so the result does not depend on vertex order.
pub fn area_m2(points: &[Coordinate]) -> f64 {
    let ring = sanitize_ring(points);
    let origin = match centroid(&ring) {
        Some(origin) if ring.len() >= 3 => origin,
        _ => return 0.0,
    };
    let local: Vec<(f64, f64)> = ring
        .iter()
        .map(|p| geo::to_local_meters(*p, origin))
        .collect();

    // Shoelace
    let mut twice_area = 0.0;
    for i in 0..local.len() {
        let (x0, y0) = local[i];
        let (x1, y1) = local[(i + 1) % local.len()];
        twice_area += x0 * y1 - x1 * y0;
    }
    twice_area.abs() / 2.0
}
