//! Pure path geometry for connection polylines.
//!
//! A connection's path is `[device1 center, ...waypoints, device2 center]`.
//! Everything here is stateless math over that point list: segment
//! distances, total length, positions at a length ratio, and the inverse
//! lookup used to keep custom text labels anchored under path edits.

use serde::{Deserialize, Serialize};

/// A point in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn lerp(&self, other: Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    pub fn midpoint(&self, other: Point) -> Point {
        self.lerp(other, 0.5)
    }
}

/// Distance from `p` to the segment `a`–`b`, clamped to the segment's
/// extent (so a point past an endpoint measures to that endpoint).
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    p.distance(project_onto_segment(p, a, b))
}

/// The closest point to `p` on the segment `a`–`b`.
pub fn project_onto_segment(p: Point, a: Point, b: Point) -> Point {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return a; // degenerate segment
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    a.lerp(b, t)
}

/// Total length of a polyline.
pub fn path_length(path: &[Point]) -> f64 {
    path.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// The point at `ratio ∈ [0, 1]` of a polyline's total length.
/// Ratios outside the range clamp to the endpoints.
pub fn point_at_ratio(path: &[Point], ratio: f64) -> Option<Point> {
    let (&first, &last) = (path.first()?, path.last()?);
    let total = path_length(path);
    if total == 0.0 || ratio <= 0.0 {
        return Some(first);
    }
    if ratio >= 1.0 {
        return Some(last);
    }

    let mut remaining = ratio * total;
    for w in path.windows(2) {
        let seg = w[0].distance(w[1]);
        if remaining <= seg && seg > 0.0 {
            return Some(w[0].lerp(w[1], remaining / seg));
        }
        remaining -= seg;
    }
    Some(last)
}

/// The length ratio of the point on the polyline closest to `p`.
/// Inverse of [`point_at_ratio`] up to floating-point error.
pub fn ratio_at_point(path: &[Point], p: Point) -> Option<f64> {
    let total = path_length(path);
    if path.len() < 2 || total == 0.0 {
        return None;
    }

    let mut best = (f64::MAX, 0.0);
    let mut walked = 0.0;
    for w in path.windows(2) {
        let nearest = project_onto_segment(p, w[0], w[1]);
        let d = p.distance(nearest);
        if d < best.0 {
            best = (d, (walked + w[0].distance(nearest)) / total);
        }
        walked += w[0].distance(w[1]);
    }
    Some(best.1.clamp(0.0, 1.0))
}

/// Index of the polyline segment closest to `p` (by clamped perpendicular
/// distance), together with that distance. Segment `i` spans
/// `path[i]`–`path[i + 1]`.
pub fn nearest_segment(path: &[Point], p: Point) -> Option<(usize, f64)> {
    if path.len() < 2 {
        return None;
    }
    let mut best: Option<(usize, f64)> = None;
    for (i, w) in path.windows(2).enumerate() {
        let d = point_segment_distance(p, w[0], w[1]);
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((i, d));
        }
    }
    best
}

/// Even-odd ray cast: is `p` inside the polygon?
/// Used by the zone/room tooling to attribute devices to areas.
pub fn polygon_contains(polygon: &[Point], p: Point) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}
