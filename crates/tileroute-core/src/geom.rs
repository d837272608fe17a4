//! Coordinate primitives: [`ModelCoordinate`], [`ExactModelCoordinate`] and
//! [`Range`].
//!
//! Layer coordinates address cells (`ModelCoordinate`); exact coordinates
//! carry sub-cell precision and are what grid transforms operate on.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};

// ---------------------------------------------------------------------------
// ModelCoordinate
// ---------------------------------------------------------------------------

/// An integer cell address on a layer. `z` is the elevation step.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelCoordinate {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ModelCoordinate {
    /// Origin (0, 0, 0).
    pub const ZERO: Self = Self { x: 0, y: 0, z: 0 };

    /// Create a coordinate on the ground plane (`z == 0`).
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y, z: 0 }
    }

    /// Create a coordinate with an explicit elevation.
    #[inline]
    pub const fn new_3d(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Same cell, different elevation.
    #[inline]
    pub const fn with_z(self, z: i32) -> Self {
        Self { z, ..self }
    }

    /// Return a coordinate shifted by (dx, dy).
    #[inline]
    pub const fn shift(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z,
        }
    }

    /// Whether `y` is an odd row. Negative rows use two's complement parity,
    /// so row -1 is odd.
    #[inline]
    pub const fn is_odd_row(self) -> bool {
        self.y & 1 == 1
    }

    /// Whether two coordinates address the same cell, ignoring elevation.
    #[inline]
    pub const fn same_cell(self, other: Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl PartialOrd for ModelCoordinate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ModelCoordinate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.y
            .cmp(&other.y)
            .then(self.x.cmp(&other.x))
            .then(self.z.cmp(&other.z))
    }
}

impl fmt::Display for ModelCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl Add for ModelCoordinate {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new_3d(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for ModelCoordinate {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new_3d(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl AddAssign for ModelCoordinate {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for ModelCoordinate {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<i32> for ModelCoordinate {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: i32) -> Self {
        Self::new_3d(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<i32> for ModelCoordinate {
    type Output = Self;
    #[inline]
    fn div(self, rhs: i32) -> Self {
        Self::new_3d(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

// ---------------------------------------------------------------------------
// ExactModelCoordinate
// ---------------------------------------------------------------------------

/// A continuous coordinate with sub-cell precision.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExactModelCoordinate {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Lengths below this are treated as zero by [`ExactModelCoordinate::normalize`].
const ZERO_TOLERANCE: f64 = 1e-8;

impl ExactModelCoordinate {
    /// Origin (0, 0, 0).
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Create a coordinate on the ground plane (`z == 0`).
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// Create a coordinate with an explicit elevation.
    #[inline]
    pub const fn new_3d(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length of the vector.
    #[inline]
    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit vector in the same direction, or zero for a (near) zero vector.
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len > ZERO_TOLERANCE {
            self / len
        } else {
            Self::ZERO
        }
    }

    /// Rotate around the origin in the xy plane by `angle` degrees
    /// (counter-clockwise for a y-up frame).
    pub fn rotate(self, angle: f64) -> Self {
        let (sin, cos) = angle.to_radians().sin_cos();
        Self::new_3d(
            cos * self.x - sin * self.y,
            sin * self.x + cos * self.y,
            self.z,
        )
    }

    /// Rotate around `origin` in the xy plane by `angle` degrees.
    pub fn rotate_around(self, origin: Self, angle: f64) -> Self {
        let rel = Self::new_3d(self.x - origin.x, self.y - origin.y, self.z);
        let r = rel.rotate(angle);
        Self::new_3d(r.x + origin.x, r.y + origin.y, self.z)
    }

    /// Component-wise comparison with an absolute tolerance.
    #[inline]
    pub fn approx_eq(self, other: Self, eps: f64) -> bool {
        (self.x - other.x).abs() <= eps
            && (self.y - other.y).abs() <= eps
            && (self.z - other.z).abs() <= eps
    }

    /// Round every component to the nearest integer (half away from zero).
    #[inline]
    pub fn round(self) -> ModelCoordinate {
        ModelCoordinate::new_3d(
            self.x.round() as i32,
            self.y.round() as i32,
            self.z.round() as i32,
        )
    }
}

impl From<ModelCoordinate> for ExactModelCoordinate {
    #[inline]
    fn from(c: ModelCoordinate) -> Self {
        Self::new_3d(f64::from(c.x), f64::from(c.y), f64::from(c.z))
    }
}

impl fmt::Display for ExactModelCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

impl Add for ExactModelCoordinate {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new_3d(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for ExactModelCoordinate {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new_3d(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl AddAssign for ExactModelCoordinate {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for ExactModelCoordinate {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<f64> for ExactModelCoordinate {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self::new_3d(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<f64> for ExactModelCoordinate {
    type Output = Self;
    #[inline]
    fn div(self, rhs: f64) -> Self {
        Self::new_3d(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// A half-open rectangle of cells \[min, max) on the xy plane. Elevation is
/// ignored by every query.
///
/// All empty ranges are considered equal.
#[derive(Copy, Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub min: ModelCoordinate,
    pub max: ModelCoordinate,
}

impl PartialEq for Range {
    fn eq(&self, other: &Self) -> bool {
        (self.min.same_cell(other.min) && self.max.same_cell(other.max))
            || (self.is_empty() && other.is_empty())
    }
}

impl Eq for Range {}

impl Range {
    /// Create a new range from two corners and auto-canonicalize so that
    /// `min` ≤ `max` on each axis.
    #[inline]
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self {
            min: ModelCoordinate::new(x0.min(x1), y0.min(y1)),
            max: ModelCoordinate::new(x0.max(x1), y0.max(y1)),
        }
    }

    /// Range of `width` x `height` cells starting at the origin.
    #[inline]
    pub fn sized(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Width of the range.
    #[inline]
    pub fn width(self) -> i32 {
        self.max.x - self.min.x
    }

    /// Height of the range.
    #[inline]
    pub fn height(self) -> i32 {
        self.max.y - self.min.y
    }

    /// Total number of cells in the range.
    #[inline]
    pub fn len(self) -> usize {
        if self.is_empty() {
            return 0;
        }
        (self.width() as usize) * (self.height() as usize)
    }

    /// Whether the range has zero or negative area.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y
    }

    /// Whether `p` is inside the half-open range.
    #[inline]
    pub fn contains(self, p: ModelCoordinate) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }

    /// Intersection of two ranges (may be empty).
    ///
    /// If the two ranges do not overlap, the zero (empty) range is returned.
    #[inline]
    pub fn intersect(self, other: Range) -> Self {
        let r = Self {
            min: ModelCoordinate::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            max: ModelCoordinate::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        };
        if r.is_empty() { Self::default() } else { r }
    }

    /// Smallest range that contains both ranges.
    #[inline]
    pub fn union(self, other: Range) -> Self {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        Self {
            min: ModelCoordinate::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: ModelCoordinate::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Row-major iterator over every cell in the range.
    #[inline]
    pub fn iter(self) -> RangeIter {
        RangeIter {
            range: self,
            cur: ModelCoordinate::new(self.min.x, self.min.y),
        }
    }
}

impl IntoIterator for Range {
    type Item = ModelCoordinate;
    type IntoIter = RangeIter;
    #[inline]
    fn into_iter(self) -> RangeIter {
        self.iter()
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[({}, {})-({}, {}))",
            self.min.x, self.min.y, self.max.x, self.max.y
        )
    }
}

/// Row-major iterator over the cells in a [`Range`].
#[derive(Clone, Debug)]
pub struct RangeIter {
    range: Range,
    cur: ModelCoordinate,
}

impl Iterator for RangeIter {
    type Item = ModelCoordinate;

    #[inline]
    fn next(&mut self) -> Option<ModelCoordinate> {
        if self.cur.y >= self.range.max.y || self.range.is_empty() {
            return None;
        }
        let p = self.cur;
        self.cur.x += 1;
        if self.cur.x >= self.range.max.x {
            self.cur.x = self.range.min.x;
            self.cur.y += 1;
        }
        Some(p)
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn coordinate_round_trip() {
        let c = ModelCoordinate::new_3d(3, -7, 2);
        let json = serde_json::to_string(&c).unwrap();
        let back: ModelCoordinate = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);
    }
}
