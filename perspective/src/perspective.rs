use log::debug;
use vanishing_geometry::{Affine2, Axis, Point, Pt2, TransformMatrix, Vector};

use crate::BoxId;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VpState {
    Finite,
    Infinite,
}

/// Three vanishing points and an origin, shared by all boxes drawn in this perspective.
///
/// The perspective only keeps track of the ids of its boxes. Operations that need to refresh
/// the boxes after a change live in [`crate::Scene`].
#[derive(Debug, Clone)]
pub struct Perspective {
    tmat: TransformMatrix,
    boxes: Vec<BoxId>,
}

impl Perspective {
    pub fn new(vp_x: Pt2, vp_y: Pt2, vp_z: Pt2, origin: Pt2) -> Self {
        Self::with_matrix(TransformMatrix::new(vp_x, vp_y, vp_z, origin))
    }

    pub fn with_matrix(tmat: TransformMatrix) -> Self {
        Self {
            tmat,
            boxes: Vec::new(),
        }
    }

    /// The perspective a new document of the given size starts with: X and Z vanish at the
    /// left and right borders at half height, Y vanishes downwards at infinity.
    pub fn with_document_defaults(width: f64, height: f64) -> Self {
        Self::new(
            Pt2::new(0.0, height / 2.0, 1.0),
            Pt2::new(0.0, 1000.0, 0.0),
            Pt2::new(width, height / 2.0, 1.0),
            Pt2::new(width / 2.0, height / 3.0, 1.0),
        )
    }

    pub fn matrix(&self) -> &TransformMatrix {
        &self.tmat
    }

    pub fn vp(&self, axis: Axis) -> Pt2 {
        self.tmat.column(axis)
    }

    pub fn vp_is_finite(&self, axis: Axis) -> bool {
        self.tmat.has_finite_image(axis)
    }

    pub fn vp_state(&self, axis: Axis) -> VpState {
        if self.vp_is_finite(axis) {
            VpState::Finite
        } else {
            VpState::Infinite
        }
    }

    pub fn finite_vp_count(&self) -> usize {
        Axis::SPATIAL
            .iter()
            .filter(|axis| self.vp_is_finite(**axis))
            .count()
    }

    pub fn toggle_vp(&mut self, axis: Axis) {
        self.tmat.toggle_finite(axis);
    }

    /// Returns `true` if the state changed.
    pub fn set_vp_state(&mut self, axis: Axis, state: VpState) -> bool {
        if self.vp_state(axis) == state {
            return false;
        }
        self.toggle_vp(axis);
        true
    }

    pub fn set_vp(&mut self, axis: Axis, pt: Pt2) {
        self.tmat.set_image_pt(axis, pt);
    }

    /// Rotate an infinite vanishing point by `degrees`. Finite vanishing points don't rotate,
    /// `false` is returned for them.
    pub fn rotate_vp(&mut self, axis: Axis, degrees: f64) -> bool {
        let Some(angle) = self.tmat.infinite_angle(axis) else {
            debug!("Not rotating the finite vanishing point {axis}");
            return false;
        };
        self.tmat.set_infinite_direction(axis, angle + degrees);
        true
    }

    pub fn infinite_angle(&self, axis: Axis) -> Option<f64> {
        self.tmat.infinite_angle(axis)
    }

    /// The direction of an infinite vanishing point.
    pub fn infinite_dir(&self, axis: Axis) -> Option<Vector> {
        (!self.vp_is_finite(axis)).then(|| self.vp(axis).xy())
    }

    /// The vector from `pt` to a finite vanishing point.
    pub fn finite_dir(&self, pt: Point, axis: Axis) -> Option<Vector> {
        self.vp(axis).try_affine().map(|vp| vp - pt)
    }

    /// The direction of the perspective line from `pt` toward the vanishing point of `axis`.
    pub fn pl_dir_from_pt(&self, pt: Point, axis: Axis) -> Vector {
        self.finite_dir(pt, axis)
            .unwrap_or_else(|| self.vp(axis).xy())
    }

    pub fn apply_affine(&mut self, affine: &Affine2) {
        self.tmat *= affine;
    }

    pub fn boxes(&self) -> &[BoxId] {
        &self.boxes
    }

    pub fn has_box(&self, id: BoxId) -> bool {
        self.boxes.contains(&id)
    }

    pub fn add_box(&mut self, id: BoxId) {
        if !self.has_box(id) {
            self.boxes.push(id);
        }
    }

    pub fn remove_box(&mut self, id: BoxId) {
        self.boxes.retain(|b| *b != id);
    }

    pub(crate) fn take_boxes(&mut self) -> Vec<BoxId> {
        std::mem::take(&mut self.boxes)
    }

    /// Both perspectives have the same vanishing points and origin.
    pub fn coincides(&self, other: &Perspective) -> bool {
        self.tmat == other.tmat
    }
}
