use crate::{Point, Vector};

/// Lines whose directions produce a dot product with the other line's normal below this value
/// are considered parallel.
pub const PARALLEL_EPSILON: f64 = 1e-6;

/// An infinite line through `anchor` with direction `direction`.
///
/// The line is stored in Hessian-like form as well: `normal` is the direction rotated by 90
/// degrees and `offset` is `normal · anchor`, so that `evaluate` is a signed distance (scaled
/// by the length of the direction).
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Line {
    anchor: Point,
    direction: Vector,
    normal: Vector,
    offset: f64,
}

impl Line {
    pub fn new(anchor: Point, direction: Vector) -> Self {
        let normal = direction.ccw();
        Self {
            anchor,
            direction,
            normal,
            offset: normal.dot(anchor),
        }
    }

    /// The line from `start` through `end`.
    pub fn through(start: Point, end: Point) -> Self {
        Self::new(start, end - start)
    }

    pub fn anchor(&self) -> Point {
        self.anchor
    }

    pub fn direction(&self) -> Vector {
        self.direction
    }

    pub fn normal(&self) -> Vector {
        self.normal
    }

    /// A line without direction does not describe anything; it appears when both defining
    /// points coincide.
    pub fn is_degenerate(&self) -> bool {
        self.direction == Vector::ZERO
    }

    pub fn point_at(&self, lambda: f64) -> Point {
        self.anchor + self.direction * lambda
    }

    /// Positive on one side of the line, negative on the other and zero on it.
    pub fn evaluate(&self, pt: Point) -> f64 {
        self.normal.dot(pt) - self.offset
    }

    pub fn lie_on_same_side(&self, a: Point, b: Point) -> bool {
        self.evaluate(a) * self.evaluate(b) > 0.0
    }

    pub fn intersect(&self, other: &Line) -> Option<Point> {
        let denominator = self.direction.dot(other.normal);
        if denominator.abs() < PARALLEL_EPSILON {
            return None;
        }
        let lambda = (other.offset - self.anchor.dot(other.normal)) / denominator;
        Some(self.point_at(lambda))
    }

    /// Orthogonal projection of `pt` onto the line.
    ///
    /// A degenerate line projects everything onto its anchor.
    pub fn closest_to(&self, pt: Point) -> Point {
        if self.is_degenerate() {
            return self.anchor;
        }
        let perpendicular = Line::new(pt, self.normal);
        self.intersect(&perpendicular).unwrap_or(self.anchor)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn intersect_crossing_lines() {
        let horizontal = Line::through(Point::new(0.0, 1.0), Point::new(5.0, 1.0));
        let vertical = Line::new(Point::new(3.0, -4.0), Vector::new(0.0, 2.0));

        let p = horizontal.intersect(&vertical).unwrap();
        assert_abs_diff_eq!(p.x, 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn parallel_lines_do_not_intersect() {
        let a = Line::new(Point::new(0.0, 0.0), Vector::new(1.0, 1.0));
        let b = Line::new(Point::new(0.0, 5.0), Vector::new(-2.0, -2.0));
        assert_eq!(a.intersect(&b), None);
    }

    #[test]
    fn closest_point_is_orthogonal_projection() {
        let line = Line::through(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        let p = line.closest_to(Point::new(4.0, 7.0));
        assert_abs_diff_eq!(p.x, 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_line_projects_onto_anchor() {
        let line = Line::through(Point::new(2.0, 2.0), Point::new(2.0, 2.0));
        assert!(line.is_degenerate());
        assert_eq!(line.closest_to(Point::new(9.0, 9.0)), Point::new(2.0, 2.0));
    }

    #[test]
    fn same_side_is_strict() {
        let line = Line::through(Point::new(0.0, 0.0), Point::new(1.0, 0.0));
        assert!(line.lie_on_same_side(Point::new(0.0, 1.0), Point::new(5.0, 3.0)));
        assert!(!line.lie_on_same_side(Point::new(0.0, 1.0), Point::new(5.0, -3.0)));
        assert!(!line.lie_on_same_side(Point::new(0.0, 0.0), Point::new(5.0, 3.0)));
    }
}
