use vanishing_geometry::{Axis, Line, Point, Pt2, Vector};

use crate::Perspective;

/// The line from an anchor point toward the vanishing point of one axis.
///
/// For a vanishing point at infinity the line runs through the anchor in the stored direction.
/// Built for a single query and dropped afterwards.
#[derive(Debug, Copy, Clone)]
pub struct PerspectiveLine<'a> {
    line: Line,
    axis: Axis,
    perspective: &'a Perspective,
}

impl<'a> PerspectiveLine<'a> {
    pub fn new(anchor: Point, axis: Axis, perspective: &'a Perspective) -> Self {
        debug_assert!(axis.is_spatial(), "Perspective lines run toward spatial axes");
        let vp = perspective.vp(axis);
        let line = match vp.try_affine() {
            Some(vp) => Line::through(anchor, vp),
            None => Line::new(anchor, vp.xy()),
        };
        Self {
            line,
            axis,
            perspective,
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn anchor(&self) -> Point {
        self.line.anchor()
    }

    pub fn direction(&self) -> Vector {
        self.line.direction()
    }

    pub fn vanishing_point(&self) -> Pt2 {
        self.perspective.vp(self.axis)
    }

    pub fn line(&self) -> &Line {
        &self.line
    }

    /// Orthogonal projection of `pt`. If the anchor lies on the vanishing point, the anchor.
    pub fn closest_to(&self, pt: Point) -> Point {
        self.line.closest_to(pt)
    }

    /// `None` for parallel lines, which includes two lines toward the same vanishing point at
    /// infinity.
    pub fn intersect(&self, other: &PerspectiveLine) -> Option<Point> {
        self.line.intersect(&other.line)
    }

    pub fn lie_on_same_side(&self, a: Point, b: Point) -> bool {
        self.line.lie_on_same_side(a, b)
    }

    /// Whether the perspective line through the same anchor toward `other` is not parallel to
    /// this one.
    pub fn meets(&self, other: Axis) -> bool {
        let other = PerspectiveLine::new(self.anchor(), other, self.perspective);
        self.intersect(&other).is_some()
    }
}
