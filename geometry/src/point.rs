use std::ops::{Add, Div, Mul, Neg, Sub};

use serde_tuple::{Deserialize_tuple, Serialize_tuple};

/// A point (or vector) on the drawing surface. x to the right, y down.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize_tuple, Deserialize_tuple)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

pub type Vector = Point;

impl Point {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing in the direction of `degrees`, measured from the positive x axis
    /// toward the positive y axis.
    pub fn from_angle(degrees: f64) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        Self::new(c, s)
    }

    pub fn length(&self) -> f64 {
        self.squared_length().sqrt()
    }

    pub fn squared_length(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    pub fn dot(&self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// The z component of the 3D cross product, or the determinant of the 2x2 matrix with
    /// `self` and `other` as columns.
    pub fn cross(&self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Rotated by 90 degrees counter-clockwise in a y-up frame.
    pub fn ccw(&self) -> Self {
        Self::new(-self.y, self.x)
    }

    /// Returns `None` for the zero vector.
    pub fn normalized(&self) -> Option<Self> {
        let length = self.length();
        if length == 0.0 {
            return None;
        }
        Some(*self / length)
    }

    /// Angle of the vector in degrees, in `(-180, 180]`.
    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x).to_degrees()
    }

    pub fn distance(&self, other: Self) -> f64 {
        (*self - other).length()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<Point> for f64 {
    type Output = Point;

    fn mul(self, rhs: Point) -> Self::Output {
        rhs * self
    }
}

impl Div<f64> for Point {
    type Output = Point;

    fn div(self, rhs: f64) -> Self::Output {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<Point> for (f64, f64) {
    fn from(value: Point) -> Self {
        (value.x, value.y)
    }
}

impl From<glam::DVec2> for Point {
    fn from(v: glam::DVec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<Point> for glam::DVec2 {
    fn from(p: Point) -> Self {
        glam::DVec2::new(p.x, p.y)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn cross_is_signed_area() {
        let x = Point::new(1.0, 0.0);
        let y = Point::new(0.0, 1.0);
        assert_eq!(x.cross(y), 1.0);
        assert_eq!(y.cross(x), -1.0);
        assert_eq!(x.cross(x * 3.0), 0.0);
    }

    #[test]
    fn angle_and_from_angle_agree() {
        let v = Point::from_angle(135.0);
        assert_abs_diff_eq!(v.angle(), 135.0, epsilon = 1e-9);
        assert_abs_diff_eq!(v.length(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_vector_has_no_direction() {
        assert_eq!(Point::ZERO.normalized(), None);
        assert_eq!(
            Point::new(0.0, -4.0).normalized(),
            Some(Point::new(0.0, -1.0))
        );
    }
}
