//! Homogeneous coordinates for the projective plane and projective 3-space.
//!
//! A `Pt2` `(x, y, w)` with `w != 0` is the point `(x/w, y/w)`; with `w == 0` it is the point
//! at infinity in direction `(x, y)`. Weights closer to zero than [`EPSILON`] count as zero.
//! `Pt3` follows the same convention with four components.

use std::{
    fmt,
    ops::{Add, Index, IndexMut},
    str::FromStr,
};

use anyhow::{Context, Result, bail};
use approx::abs_diff_eq;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::Point;

/// Weights below this are treated as zero, and coordinates closer than this are equal.
pub const EPSILON: f64 = 1e-6;

/// What `affine()` returns for points at infinity.
pub const HUGE: f64 = 1e18;

/// Axes of projective 3-space. `W` is the homogeneous axis; as a column of a projection it
/// denotes the image of the origin.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
    W = 3,
}

impl Axis {
    pub const SPATIAL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
    pub const ALL: [Axis; 4] = [Axis::X, Axis::Y, Axis::Z, Axis::W];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn is_spatial(self) -> bool {
        self != Axis::W
    }

    pub fn name(self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
            Axis::W => "W",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A point of the projective plane.
#[derive(Debug, Copy, Clone)]
pub struct Pt2 {
    pub x: f64,
    pub y: f64,
    pub w: f64,
}

impl Pt2 {
    pub const fn new(x: f64, y: f64, w: f64) -> Self {
        Self { x, y, w }
    }

    /// The point at infinity in direction `dir`.
    pub const fn direction(dir: Point) -> Self {
        Self::new(dir.x, dir.y, 0.0)
    }

    /// Weights below [`EPSILON`] count as zero.
    pub fn is_finite(&self) -> bool {
        self.w.abs() >= EPSILON
    }

    /// Divide through by `w`. Points at infinity are left alone.
    pub fn normalize(&mut self) {
        if !self.is_finite() || self.w == 1.0 {
            return;
        }
        self.x /= self.w;
        self.y /= self.w;
        self.w = 1.0;
    }

    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// The affine point this represents.
    ///
    /// Only meaningful for finite points: points at infinity map to `(HUGE, HUGE)`. Test
    /// [`Self::is_finite`] or use [`Self::try_affine`] if that matters.
    pub fn affine(&self) -> Point {
        self.try_affine().unwrap_or(Point::new(HUGE, HUGE))
    }

    pub fn try_affine(&self) -> Option<Point> {
        if !self.is_finite() {
            return None;
        }
        Some(Point::new(self.x / self.w, self.y / self.w))
    }

    /// The `(x, y)` part, which is the direction for points at infinity.
    pub fn xy(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.w]
    }

    fn is_zero(&self) -> bool {
        self.to_array().iter().all(|c| *c == 0.0)
    }
}

impl From<Point> for Pt2 {
    fn from(p: Point) -> Self {
        Self::new(p.x, p.y, 1.0)
    }
}

impl From<[f64; 3]> for Pt2 {
    fn from([x, y, w]: [f64; 3]) -> Self {
        Self::new(x, y, w)
    }
}

impl Add for Pt2 {
    type Output = Pt2;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.w + rhs.w)
    }
}

impl PartialEq for Pt2 {
    fn eq(&self, other: &Self) -> bool {
        if self.is_zero() || other.is_zero() {
            return self.is_zero() && other.is_zero();
        }
        match (self.try_affine(), other.try_affine()) {
            (Some(a), Some(b)) => {
                abs_diff_eq!(a.x, b.x, epsilon = EPSILON) && abs_diff_eq!(a.y, b.y, epsilon = EPSILON)
            }
            (None, None) => match (self.xy().normalized(), other.xy().normalized()) {
                (Some(a), Some(b)) => {
                    abs_diff_eq!(a.x, b.x, epsilon = EPSILON)
                        && abs_diff_eq!(a.y, b.y, epsilon = EPSILON)
                }
                _ => false,
            },
            _ => false,
        }
    }
}

impl fmt::Display for Pt2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {} : {}", self.x, self.y, self.w)
    }
}

impl FromStr for Pt2 {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(parse_components::<3>(s)?.into())
    }
}

/// A point of projective 3-space.
#[derive(Debug, Copy, Clone)]
pub struct Pt3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Pt3 {
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub fn is_finite(&self) -> bool {
        self.w.abs() >= EPSILON
    }

    pub fn normalize(&mut self) {
        if !self.is_finite() || self.w == 1.0 {
            return;
        }
        self.x /= self.w;
        self.y /= self.w;
        self.z /= self.w;
        self.w = 1.0;
    }

    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// One of the eight corners of the box spanned by `c0` and `c7`.
    ///
    /// Bit `i` of `selector` picks the coordinate of spatial axis `i` from `c7`, otherwise from
    /// `c0`. Both corners are normalized first.
    pub fn from_corners(selector: u8, c0: &Pt3, c7: &Pt3) -> Self {
        let (c0, c7) = (c0.normalized(), c7.normalized());
        let mut corner = Self::new(0.0, 0.0, 0.0, 1.0);
        for axis in Axis::SPATIAL {
            let source = if selector & (1 << axis.index()) != 0 {
                &c7
            } else {
                &c0
            };
            corner[axis] = source[axis];
        }
        corner
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.x, self.y, self.z, self.w]
    }

    fn is_zero(&self) -> bool {
        self.to_array().iter().all(|c| *c == 0.0)
    }
}

impl From<[f64; 4]> for Pt3 {
    fn from([x, y, z, w]: [f64; 4]) -> Self {
        Self::new(x, y, z, w)
    }
}

impl Index<Axis> for Pt3 {
    type Output = f64;

    fn index(&self, axis: Axis) -> &f64 {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
            Axis::W => &self.w,
        }
    }
}

impl IndexMut<Axis> for Pt3 {
    fn index_mut(&mut self, axis: Axis) -> &mut f64 {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
            Axis::W => &mut self.w,
        }
    }
}

impl PartialEq for Pt3 {
    fn eq(&self, other: &Self) -> bool {
        if self.is_zero() || other.is_zero() {
            return self.is_zero() && other.is_zero();
        }
        let a = self.normalized();
        let b = other.normalized();
        if a.is_finite() != b.is_finite() {
            return false;
        }
        let (a, b) = if a.is_finite() {
            (a.to_array(), b.to_array())
        } else {
            (unit(a.to_array()), unit(b.to_array()))
        };
        a.iter()
            .zip(b.iter())
            .all(|(a, b)| abs_diff_eq!(*a, *b, epsilon = EPSILON))
    }
}

fn unit(v: [f64; 4]) -> [f64; 4] {
    let length = v.iter().map(|c| c * c).sum::<f64>().sqrt();
    if length == 0.0 {
        return v;
    }
    v.map(|c| c / length)
}

impl fmt::Display for Pt3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {} : {} : {}", self.x, self.y, self.z, self.w)
    }
}

impl FromStr for Pt3 {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(parse_components::<4>(s)?.into())
    }
}

fn parse_components<const N: usize>(s: &str) -> Result<[f64; N]> {
    let parts: Vec<&str> = s.split(':').map(str::trim).collect();
    if parts.len() < N {
        bail!("Malformed coordinate string `{s}`: expected {N} components");
    }
    let mut components = [0.0; N];
    for (component, part) in components.iter_mut().zip(parts) {
        *component = part
            .parse()
            .with_context(|| format!("Invalid coordinate `{part}` in `{s}`"))?;
    }
    Ok(components)
}

// The persisted representation is the colon separated coordinate string.

impl Serialize for Pt2 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Pt2 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

impl Serialize for Pt3 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Pt3 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_positive_scale() {
        let p = Pt2::new(3.0, -2.0, 0.5);
        for k in [0.001, 1.0, 2.0, 1000.0] {
            assert_eq!(Pt2::new(k * p.x, k * p.y, k * p.w), p);
        }
    }

    #[test]
    fn equality_of_directions_ignores_positive_scale() {
        let dir = Pt2::new(3.0, 4.0, 0.0);
        assert_eq!(Pt2::new(6.0, 8.0, 0.0), dir);
        assert_ne!(Pt2::new(-3.0, -4.0, 0.0), dir);
        assert_ne!(Pt2::new(3.0, 4.0, 1.0), dir);
    }

    #[test]
    fn zero_point_only_equals_itself() {
        let zero = Pt2::new(0.0, 0.0, 0.0);
        assert_eq!(zero, zero);
        assert_ne!(zero, Pt2::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn normalize_leaves_directions_alone() {
        let mut dir = Pt2::new(2.0, 5.0, 0.0);
        dir.normalize();
        assert_eq!((dir.x, dir.y, dir.w), (2.0, 5.0, 0.0));

        let mut p = Pt2::new(2.0, 5.0, 2.0);
        p.normalize();
        assert_eq!((p.x, p.y, p.w), (1.0, 2.5, 1.0));
    }

    #[test]
    fn affine_of_infinite_point() {
        let dir = Pt2::new(1.0, 0.0, 0.0);
        assert_eq!(dir.try_affine(), None);
        assert_eq!(dir.affine(), Point::new(HUGE, HUGE));
        assert_eq!(Pt2::new(4.0, 2.0, 2.0).affine(), Point::new(2.0, 1.0));
    }

    #[test]
    fn tiny_weights_are_at_infinity() {
        let almost = Pt2::new(3.0, 4.0, 1e-9);
        assert!(!almost.is_finite());
        assert_eq!(almost.try_affine(), None);
        assert_eq!(almost, Pt2::new(3.0, 4.0, 0.0));
        assert!(Pt2::new(3.0, 4.0, -EPSILON).is_finite());
        assert!(!Pt3::new(1.0, 2.0, 3.0, -1e-9).is_finite());
    }

    #[test]
    fn components_in_array_order() {
        let p = Pt2::from([1.0, -2.0, 0.5]);
        assert_eq!((p.x, p.y, p.w), (1.0, -2.0, 0.5));
        assert_eq!(p.to_array(), [1.0, -2.0, 0.5]);
        assert!(Pt2::from([0.0; 3]).is_zero());
    }

    #[test]
    fn parse_coordinate_strings() {
        let p: Pt2 = "0 : 300.5 : 1".parse().unwrap();
        assert_eq!((p.x, p.y, p.w), (0.0, 300.5, 1.0));

        let p: Pt3 = " 1:2 : 3 : 0 ".parse().unwrap();
        assert_eq!(p.to_array(), [1.0, 2.0, 3.0, 0.0]);

        assert!("1 : 2".parse::<Pt2>().is_err());
        assert!("1 : x : 2".parse::<Pt2>().is_err());
    }

    #[test]
    fn display_is_colon_separated() {
        assert_eq!(Pt2::new(0.0, 1000.0, 0.0).to_string(), "0 : 1000 : 0");
        assert_eq!(Pt3::new(1.5, 2.0, -3.0, 1.0).to_string(), "1.5 : 2 : -3 : 1");
    }

    #[test]
    fn corners_select_coordinates_per_axis() {
        let c0 = Pt3::new(0.0, 0.0, 2.0, 1.0);
        let c7 = Pt3::new(2.0, 4.0, 0.0, 2.0);
        assert_eq!(Pt3::from_corners(0, &c0, &c7).to_array(), [0.0, 0.0, 2.0, 1.0]);
        assert_eq!(Pt3::from_corners(0b011, &c0, &c7).to_array(), [1.0, 2.0, 2.0, 1.0]);
        assert_eq!(Pt3::from_corners(0b111, &c0, &c7).to_array(), [1.0, 2.0, 0.0, 1.0]);
    }

    #[test]
    fn pt3_equality_after_normalization() {
        assert_eq!(
            Pt3::new(2.0, 4.0, 6.0, 2.0),
            Pt3::new(1.0, 2.0, 3.0, 1.0)
        );
        assert_ne!(
            Pt3::new(1.0, 2.0, 3.0, 0.0),
            Pt3::new(1.0, 2.0, 3.0, 1.0)
        );
    }
}
