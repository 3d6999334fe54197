//! Line-of-sight geometry.
//!
//! Obstruction checks are segment-vs-rectangle tests. The clip runs on exact
//! rationals built from the raw fixed-point bits, so the answer never depends
//! on rounding and is identical when the endpoints are swapped.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed, Vec2Fixed};

/// Axis-aligned rectangle in world units (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner.
    pub origin: Vec2Fixed,
    /// Width.
    #[serde(with = "fixed_serde")]
    pub width: Fixed,
    /// Height.
    #[serde(with = "fixed_serde")]
    pub height: Fixed,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(origin: Vec2Fixed, width: Fixed, height: Fixed) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    /// Create a rectangle from whole world units.
    #[must_use]
    pub fn from_ints(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(
            Vec2Fixed::from_ints(x, y),
            Fixed::from_num(width),
            Fixed::from_num(height),
        )
    }

    /// Left edge.
    #[must_use]
    pub fn left(&self) -> Fixed {
        self.origin.x
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> Fixed {
        self.origin.x + self.width
    }

    /// Top edge.
    #[must_use]
    pub fn top(&self) -> Fixed {
        self.origin.y
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> Fixed {
        self.origin.y + self.height
    }

    /// Geometric center.
    #[must_use]
    pub fn center(&self) -> Vec2Fixed {
        Vec2Fixed::new(
            self.origin.x + self.width / 2,
            self.origin.y + self.height / 2,
        )
    }

    /// Point-in-rectangle test. Edges count as inside.
    #[must_use]
    pub fn contains_point(&self, point: Vec2Fixed) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }

    /// Area overlap test. Rectangles that only share an edge do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Whether `other` lies entirely inside this rectangle.
    #[must_use]
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.top() >= self.top()
            && other.bottom() <= self.bottom()
    }
}

/// Perpendicular distance from `point` to the infinite line through `p0` and `p1`.
///
/// Degenerates to the distance between `point` and `p0` when the two line
/// points coincide.
#[must_use]
pub fn distance_to_line(p0: Vec2Fixed, p1: Vec2Fixed, point: Vec2Fixed) -> Fixed {
    let direction = p1 - p0;
    let length = direction.length();
    if length == Fixed::ZERO {
        return point.distance(p0);
    }

    direction.cross(point - p0).abs() / length
}

/// Segment parameter `num / den` with `den > 0`.
#[derive(Debug, Clone, Copy)]
struct Param {
    num: i128,
    den: i128,
}

impl Param {
    const ZERO: Self = Self { num: 0, den: 1 };
    const ONE: Self = Self { num: 1, den: 1 };

    fn ratio(q: i128, p: i128) -> Self {
        if p < 0 {
            Self { num: -q, den: -p }
        } else {
            Self { num: q, den: p }
        }
    }

    fn cmp(self, other: Self) -> Ordering {
        (self.num * other.den).cmp(&(other.num * self.den))
    }
}

/// Liang-Barsky test: does the segment `p0 -> p1` touch `rect`?
///
/// The parametric interval `[t0, t1]` starts at `[0, 1]` and each of the four
/// boundaries narrows it. A boundary the segment runs parallel to rejects
/// outright when the segment lies outside it. Touching an edge or a corner
/// counts as intersecting, and a zero-length segment intersects iff the point
/// lies inside the rectangle.
#[must_use]
pub fn line_intersects_rect(p0: Vec2Fixed, p1: Vec2Fixed, rect: &Rect) -> bool {
    let bits = |value: Fixed| i128::from(value.to_bits());

    let x0 = bits(p0.x);
    let y0 = bits(p0.y);
    let dx = bits(p1.x) - x0;
    let dy = bits(p1.y) - y0;

    let clips = [
        (-dx, x0 - bits(rect.left())),
        (dx, bits(rect.right()) - x0),
        (-dy, y0 - bits(rect.top())),
        (dy, bits(rect.bottom()) - y0),
    ];

    let mut t0 = Param::ZERO;
    let mut t1 = Param::ONE;

    for (p, q) in clips {
        match p.cmp(&0) {
            Ordering::Equal => {
                if q < 0 {
                    return false;
                }
            }
            Ordering::Less => {
                let r = Param::ratio(q, p);
                if r.cmp(t1) == Ordering::Greater {
                    return false;
                }
                if r.cmp(t0) == Ordering::Greater {
                    t0 = r;
                }
            }
            Ordering::Greater => {
                let r = Param::ratio(q, p);
                if r.cmp(t0) == Ordering::Less {
                    return false;
                }
                if r.cmp(t1) == Ordering::Less {
                    t1 = r;
                }
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall() -> Rect {
        Rect::from_ints(100, 100, 64, 64)
    }

    #[test]
    fn test_segment_through_interior() {
        let a = Vec2Fixed::from_ints(0, 132);
        let b = Vec2Fixed::from_ints(300, 132);
        assert!(line_intersects_rect(a, b, &wall()));
    }

    #[test]
    fn test_segment_stops_short() {
        let a = Vec2Fixed::from_ints(0, 132);
        let b = Vec2Fixed::from_ints(99, 132);
        assert!(!line_intersects_rect(a, b, &wall()));
    }

    #[test]
    fn test_segment_touching_edge_intersects() {
        let a = Vec2Fixed::from_ints(0, 132);
        let b = Vec2Fixed::from_ints(100, 132);
        assert!(line_intersects_rect(a, b, &wall()));
    }

    #[test]
    fn test_segment_touching_corner_intersects() {
        let a = Vec2Fixed::from_ints(0, 0);
        let b = Vec2Fixed::from_ints(100, 100);
        assert!(line_intersects_rect(a, b, &wall()));
    }

    #[test]
    fn test_diagonal_missing_corner() {
        let a = Vec2Fixed::from_ints(0, 101);
        let b = Vec2Fixed::from_ints(101, 0);
        assert!(!line_intersects_rect(a, b, &wall()));
    }

    #[test]
    fn test_axis_parallel_outside() {
        let a = Vec2Fixed::from_ints(0, 50);
        let b = Vec2Fixed::from_ints(500, 50);
        assert!(!line_intersects_rect(a, b, &wall()));
    }

    #[test]
    fn test_axis_parallel_along_edge() {
        let a = Vec2Fixed::from_ints(0, 164);
        let b = Vec2Fixed::from_ints(500, 164);
        assert!(line_intersects_rect(a, b, &wall()));
    }

    #[test]
    fn test_zero_length_segment() {
        let inside = Vec2Fixed::from_ints(120, 120);
        let outside = Vec2Fixed::from_ints(20, 20);
        assert!(line_intersects_rect(inside, inside, &wall()));
        assert!(!line_intersects_rect(outside, outside, &wall()));
    }

    #[test]
    fn test_segment_inside_rect() {
        let a = Vec2Fixed::from_ints(110, 110);
        let b = Vec2Fixed::from_ints(150, 150);
        assert!(line_intersects_rect(a, b, &wall()));
    }

    #[test]
    fn test_distance_to_line() {
        let p0 = Vec2Fixed::from_ints(0, 0);
        let p1 = Vec2Fixed::from_ints(100, 0);
        let point = Vec2Fixed::from_ints(40, 30);
        assert_eq!(distance_to_line(p0, p1, point), Fixed::from_num(30));
    }

    #[test]
    fn test_distance_to_line_uses_infinite_line() {
        let p0 = Vec2Fixed::from_ints(0, 0);
        let p1 = Vec2Fixed::from_ints(10, 0);
        let point = Vec2Fixed::from_ints(500, 7);
        assert_eq!(distance_to_line(p0, p1, point), Fixed::from_num(7));
    }

    #[test]
    fn test_distance_to_degenerate_line() {
        let p = Vec2Fixed::from_ints(10, 10);
        let point = Vec2Fixed::from_ints(13, 14);
        assert_eq!(distance_to_line(p, p, point), Fixed::from_num(5));
    }

    #[test]
    fn test_rect_contains_point_inclusive() {
        let r = wall();
        assert!(r.contains_point(Vec2Fixed::from_ints(100, 164)));
        assert!(!r.contains_point(Vec2Fixed::from_ints(165, 120)));
    }

    #[test]
    fn test_rect_overlap_excludes_shared_edge() {
        let r = wall();
        assert!(!r.overlaps(&Rect::from_ints(164, 100, 64, 64)));
        assert!(r.overlaps(&Rect::from_ints(163, 100, 64, 64)));
    }

    #[test]
    fn test_rect_center() {
        assert_eq!(wall().center(), Vec2Fixed::from_ints(132, 132));
    }
}
