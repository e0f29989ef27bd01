use std::ops::{Mul, MulAssign};

use log::debug;

use crate::{
    Affine2, Axis, Point, Pt2, Pt3,
    solver::{Pin, Solution, gauss_jordan},
};

/// A projective map from 3-space to the drawing surface.
///
/// Column `k` is the image of the basis direction `k`, i.e. the vanishing point of axis `k`;
/// the `W` column is the image of the origin. A column with weight zero is a vanishing point at
/// infinity, so edges along that axis are drawn parallel.
#[derive(Debug, Copy, Clone)]
pub struct TransformMatrix {
    rows: [[f64; 4]; 3],
}

impl Default for TransformMatrix {
    /// Identity-like placeholder. The origin column is zero, so this needs real vanishing points
    /// before it is usable.
    fn default() -> Self {
        let mut rows = [[0.0; 4]; 3];
        for (i, row) in rows.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        Self { rows }
    }
}

impl TransformMatrix {
    pub fn new(vp_x: Pt2, vp_y: Pt2, vp_z: Pt2, origin: Pt2) -> Self {
        let mut matrix = Self {
            rows: [[0.0; 4]; 3],
        };
        matrix.set_image_pt(Axis::X, vp_x);
        matrix.set_image_pt(Axis::Y, vp_y);
        matrix.set_image_pt(Axis::Z, vp_z);
        matrix.set_image_pt(Axis::W, origin);
        matrix
    }

    pub fn rows(&self) -> &[[f64; 4]; 3] {
        &self.rows
    }

    pub fn column(&self, axis: Axis) -> Pt2 {
        let i = axis.index();
        self.rows.map(|row| row[i]).into()
    }

    pub fn set_image_pt(&mut self, axis: Axis, pt: Pt2) {
        let i = axis.index();
        for (row, component) in self.rows.iter_mut().zip(pt.to_array()) {
            row[i] = component;
        }
    }

    /// Same weight threshold as [`Pt2::is_finite`].
    pub fn has_finite_image(&self, axis: Axis) -> bool {
        self.column(axis).is_finite()
    }

    pub fn image(&self, pt: &Pt3) -> Pt2 {
        let p = pt.to_array();
        let [x, y, w] = self
            .rows
            .map(|row| row.iter().zip(p.iter()).map(|(m, c)| m * c).sum::<f64>());
        Pt2::new(x, y, w)
    }

    /// The point of 3-space that maps to `pt` and whose affine coordinate along `axis` is
    /// `coord`.
    ///
    /// Degenerate configurations (a box squeezed to zero extent, a vanishing point on the
    /// origin) yield [`Solution::NoSolution`]; during interactive editing this is expected and
    /// callers just skip the update.
    pub fn preimage(&self, pt: Point, coord: f64, axis: Axis) -> Solution<Pt3> {
        debug_assert!(axis.is_spatial(), "Can't pin the homogeneous coordinate");
        let v = [pt.x, pt.y, 1.0];
        let solution = gauss_jordan(&self.rows, &v, Some(Pin::ratio(axis.index(), coord)));
        match &solution {
            Solution::Unique(_) => {}
            Solution::Ambiguous(_) => {
                debug!("Preimage of {pt:?} with {axis} = {coord} is ambiguous")
            }
            Solution::NoSolution => {
                debug!("Preimage of {pt:?} with {axis} = {coord} has no solution")
            }
        }
        solution.map(Pt3::from)
    }

    /// Moves a finite vanishing point to infinity, keeping its direction as seen from the
    /// origin, or back from infinity to the point at `origin + direction`.
    pub fn toggle_finite(&mut self, axis: Axis) {
        debug_assert!(axis.is_spatial(), "The origin can't be toggled");
        if !axis.is_spatial() {
            return;
        }

        let origin = self.column(Axis::W);
        let toggled = if self.has_finite_image(axis) {
            let dir = self.column(axis).affine() - origin.affine();
            Pt2::direction(dir)
        } else {
            let mut finite = self.column(axis) + Pt2::from(origin.affine());
            finite.w = 1.0;
            finite
        };
        self.set_image_pt(axis, toggled);
    }

    /// Direction of an infinite vanishing point in degrees. `None` for finite ones.
    pub fn infinite_angle(&self, axis: Axis) -> Option<f64> {
        if self.has_finite_image(axis) {
            return None;
        }
        Some(self.column(axis).xy().angle())
    }

    /// Points an infinite vanishing point in direction `degrees`, keeping the length of the
    /// stored direction. Finite vanishing points stay as they are.
    pub fn set_infinite_direction(&mut self, axis: Axis, degrees: f64) {
        if self.has_finite_image(axis) {
            debug!("Not setting a direction for the finite vanishing point {axis}");
            return;
        }
        let radius = self.column(axis).xy().length();
        self.set_image_pt(axis, Pt2::direction(Point::from_angle(degrees) * radius));
    }

    /// The persisted `"x : y : w"` form of a column.
    pub fn pt_to_string(&self, axis: Axis) -> String {
        self.column(axis).to_string()
    }
}

impl PartialEq for TransformMatrix {
    fn eq(&self, other: &Self) -> bool {
        Axis::ALL
            .iter()
            .all(|axis| self.column(*axis) == other.column(*axis))
    }
}

/// Post-composition with an affine map of the drawing surface. Only the planar rows are
/// affected; columns at infinity pick up the linear part but not the translation.
impl Mul<&Affine2> for TransformMatrix {
    type Output = TransformMatrix;

    fn mul(self, affine: &Affine2) -> Self::Output {
        let (a, b) = (affine.matrix2.x_axis.x, affine.matrix2.x_axis.y);
        let (c, d) = (affine.matrix2.y_axis.x, affine.matrix2.y_axis.y);
        let (e, f) = (affine.translation.x, affine.translation.y);

        let mut rows = self.rows;
        for j in 0..4 {
            let (x, y, w) = (self.rows[0][j], self.rows[1][j], self.rows[2][j]);
            rows[0][j] = a * x + c * y + e * w;
            rows[1][j] = b * x + d * y + f * w;
        }
        Self { rows }
    }
}

impl MulAssign<&Affine2> for TransformMatrix {
    fn mul_assign(&mut self, affine: &Affine2) {
        *self = *self * affine;
    }
}
