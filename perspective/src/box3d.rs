use std::mem;

use log::{debug, error};
use vanishing_geometry::{Axis, Point, Pt3, Solution};

use crate::{
    Axes, Config, Face, FaceOrder, Perspective, PerspectiveId, PerspectiveLine, snap::SnapLines,
    z_order::compute_face_order,
};

/// A box in 3-space, spanned by the two opposite corners `corner0` and `corner7`.
///
/// Canonically, `corner0` is not larger than `corner7` on X and Y and not smaller on Z. During
/// a drag the corners may cross; the box is then everted on these axes until the corners are
/// relabeled.
#[derive(Debug, Clone)]
pub struct Box3D {
    perspective: PerspectiveId,
    corner0: Pt3,
    corner7: Pt3,
    saved_corner0: Pt3,
    saved_corner7: Pt3,
    face_order: FaceOrder,
    /// The snapping line chosen last during a constrained drag.
    snap_line: usize,
}

impl Box3D {
    pub fn new(perspective: PerspectiveId, corner0: Pt3, corner7: Pt3) -> Self {
        Self {
            perspective,
            corner0,
            corner7,
            saved_corner0: corner0,
            saved_corner7: corner7,
            face_order: FaceOrder::default(),
            snap_line: 0,
        }
    }

    pub fn perspective(&self) -> PerspectiveId {
        self.perspective
    }

    pub(crate) fn set_perspective(&mut self, perspective: PerspectiveId) {
        self.perspective = perspective;
    }

    pub fn corners(&self) -> (Pt3, Pt3) {
        (self.corner0, self.corner7)
    }

    pub fn set_corners(&mut self, corner0: Pt3, corner7: Pt3) {
        self.corner0 = corner0;
        self.corner7 = corner7;
    }

    pub fn face_order(&self) -> FaceOrder {
        self.face_order
    }

    /// One of the eight corners in 3-space.
    pub fn proj_corner(&self, id: Axes) -> Pt3 {
        Pt3::from_corners(id.bits(), &self.corner0, &self.corner7)
    }

    /// Where a corner is drawn. Corners on the vanishing line are reported at a huge distance.
    pub fn corner_screen(&self, id: Axes, perspective: &Perspective) -> Point {
        perspective.matrix().image(&self.proj_corner(id)).affine()
    }

    pub fn proj_center(&self) -> Pt3 {
        let (c0, c7) = (self.corner0.normalized(), self.corner7.normalized());
        Pt3::new(
            (c0.x + c7.x) / 2.0,
            (c0.y + c7.y) / 2.0,
            (c0.z + c7.z) / 2.0,
            1.0,
        )
    }

    pub fn center_screen(&self, perspective: &Perspective) -> Option<Point> {
        perspective.matrix().image(&self.proj_center()).try_affine()
    }

    /// The outline of a face in cyclic order.
    pub fn face_outline(&self, face: Face, perspective: &Perspective) -> [Point; 4] {
        face.corners().map(|id| self.corner_screen(id, perspective))
    }

    /// The four corners of the face farthest along `axis`, whose perspective lines toward the
    /// vanishing point of `axis` serve as guides.
    pub fn perspective_line_corners(&self, axis: Axis, perspective: &Perspective) -> [Point; 4] {
        let (c0, c7) = (self.corner0.normalized(), self.corner7.normalized());
        let coord = c0[axis].max(c7[axis]);
        let (a, b) = Axes::remaining(axis);
        [(&c0, &c0), (&c7, &c0), (&c7, &c7), (&c0, &c7)].map(|(ca, cb)| {
            let mut pt = Pt3::new(0.0, 0.0, 0.0, 1.0);
            pt[axis] = coord;
            pt[a] = ca[a];
            pt[b] = cb[b];
            perspective.matrix().image(&pt).affine()
        })
    }

    pub fn perspective_lines<'a>(
        &self,
        axis: Axis,
        perspective: &'a Perspective,
    ) -> [PerspectiveLine<'a>; 4] {
        self.perspective_line_corners(axis, perspective)
            .map(|corner| PerspectiveLine::new(corner, axis, perspective))
    }

    /// Remember the corners at the start of a drag. The next constrained move picks its
    /// snapping line afresh.
    pub fn save_corners(&mut self) {
        self.saved_corner0 = self.corner0.normalized();
        self.saved_corner7 = self.corner7.normalized();
        self.snap_line = 0;
    }

    pub fn restore_saved_corners(&mut self) {
        self.corner0 = self.saved_corner0;
        self.corner7 = self.saved_corner7;
    }

    pub fn saved_corners(&self) -> (Pt3, Pt3) {
        (self.saved_corner0, self.saved_corner7)
    }

    /// Move corner `id` so that it is drawn at `screen_pt`.
    ///
    /// With `movement` in the XY plane the corner keeps its Z coordinate; with Z movement the
    /// point is first projected onto the Z perspective line through the corner's position at
    /// the start of the drag and only the Z coordinate changes. Coordinates are taken relative
    /// to the corners saved by [`Self::save_corners`].
    ///
    /// Returns `false` and leaves the box alone if the point can't be mapped back into 3-space.
    pub fn set_corner(
        &mut self,
        perspective: &Perspective,
        id: Axes,
        screen_pt: Point,
        movement: Axes,
        constrained: bool,
        config: &Config,
    ) -> bool {
        if !valid_movement(movement) {
            return false;
        }
        let (s0, s7) = (
            self.saved_corner0.normalized(),
            self.saved_corner7.normalized(),
        );
        let tmat = perspective.matrix();

        if !movement.contains(Axes::Z) {
            let z = self.proj_corner(id).z;
            let Some(mut pt) = finite(tmat.preimage(screen_pt, z, Axis::Z)) else {
                debug!("Skipping corner move to {screen_pt:?}");
                return false;
            };
            if constrained {
                let start = Pt3::from_corners(id.bits(), &s0, &s7);
                let extent = (s7.x - s0.x, s7.y - s0.y);
                let Some(snapped) = self.snap(perspective, &pt, &start, extent, Some(id), config)
                else {
                    return false;
                };
                pt = snapped;
            }

            let pick = |axis: Axes, own: f64, moved: f64, at7: bool| {
                if id.contains(axis) == at7 { moved } else { own }
            };
            self.corner0 = Pt3::new(
                pick(Axes::X, s0.x, pt.x, false),
                pick(Axes::Y, s0.y, pt.y, false),
                s0.z,
                1.0,
            );
            self.corner7 = Pt3::new(
                pick(Axes::X, s7.x, pt.x, true),
                pick(Axes::Y, s7.y, pt.y, true),
                s7.z,
                1.0,
            );
        } else {
            let start = Pt3::from_corners(id.bits(), &s0, &s7);
            let anchor = tmat.image(&start).affine();
            let on_line = PerspectiveLine::new(anchor, Axis::Z, perspective).closest_to(screen_pt);

            let current = self.proj_corner(id);
            let pt = finite(tmat.preimage(on_line, current.x, Axis::X))
                .or_else(|| finite(tmat.preimage(on_line, current.y, Axis::Y)));
            let Some(pt) = pt else {
                debug!("Skipping depth move of a corner to {screen_pt:?}");
                return false;
            };

            let at7 = id.contains(Axes::Z);
            self.corner0 = Pt3::new(s0.x, s0.y, if at7 { s0.z } else { pt.z }, 1.0);
            self.corner7 = Pt3::new(s7.x, s7.y, if at7 { pt.z } else { s7.z }, 1.0);
        }
        true
    }

    /// Move the whole box so that its center is drawn at `new_pos`, keeping its extent.
    ///
    /// `old_pos` is where the center was when the drag started.
    pub fn set_center(
        &mut self,
        perspective: &Perspective,
        new_pos: Point,
        old_pos: Point,
        movement: Axes,
        constrained: bool,
        config: &Config,
    ) -> bool {
        if !valid_movement(movement) {
            return false;
        }
        let (c0, c7) = (self.corner0.normalized(), self.corner7.normalized());
        let tmat = perspective.matrix();

        if !movement.contains(Axes::Z) {
            let coord = (c0.z + c7.z) / 2.0;
            let radx = (c7.x - c0.x) / 2.0;
            let rady = (c7.y - c0.y) / 2.0;

            let Some(mut pt) = finite(tmat.preimage(new_pos, coord, Axis::Z)) else {
                debug!("Skipping center move to {new_pos:?}");
                return false;
            };
            if constrained {
                let Some(start) = finite(tmat.preimage(old_pos, coord, Axis::Z)) else {
                    return false;
                };
                let (s0, s7) = (
                    self.saved_corner0.normalized(),
                    self.saved_corner7.normalized(),
                );
                let extent = (s7.x - s0.x, s7.y - s0.y);
                let Some(snapped) = self.snap(perspective, &pt, &start, extent, None, config)
                else {
                    return false;
                };
                pt = snapped;
            }

            let moves_x = movement.contains(Axes::X);
            let moves_y = movement.contains(Axes::Y);
            self.corner0 = Pt3::new(
                if moves_x { pt.x - radx } else { c0.x },
                if moves_y { pt.y - rady } else { c0.y },
                c0.z,
                1.0,
            );
            self.corner7 = Pt3::new(
                if moves_x { pt.x + radx } else { c7.x },
                if moves_y { pt.y + rady } else { c7.y },
                c7.z,
                1.0,
            );
        } else {
            let coord = (c0.x + c7.x) / 2.0;
            let radz = (c7.z - c0.z) / 2.0;

            let on_line = PerspectiveLine::new(old_pos, Axis::Z, perspective).closest_to(new_pos);
            let Some(pt) = finite(tmat.preimage(on_line, coord, Axis::X)) else {
                debug!("Skipping depth move of the center to {new_pos:?}");
                return false;
            };
            self.corner0 = Pt3::new(c0.x, c0.y, pt.z - radz, 1.0);
            self.corner7 = Pt3::new(c7.x, c7.y, pt.z + radz, 1.0);
        }
        true
    }

    fn snap(
        &mut self,
        perspective: &Perspective,
        pt: &Pt3,
        start: &Pt3,
        extent: (f64, f64),
        dragged: Option<Axes>,
        config: &Config,
    ) -> Option<Pt3> {
        let lines = SnapLines::new(perspective, start, extent, dragged);
        let tmat = perspective.matrix();
        let screen = tmat.image(pt).affine();
        let snapped = lines.snap(screen, &mut self.snap_line, config.snapping.tolerance);
        finite(tmat.preimage(snapped, start.normalized().z, Axis::Z))
    }

    /// The axes on which the corners are in reverse order.
    pub fn eversion(&self) -> Axes {
        eversion(&self.corner0, &self.corner7)
    }

    pub fn canonical_corners(&self) -> (Pt3, Pt3) {
        let (c0, c7, _) = canonical_corners(&self.corner0, &self.corner7);
        (c0, c7)
    }

    /// Swap coordinates so that the corners are in canonical order again.
    pub fn relabel_corners(&mut self) {
        (self.corner0, self.corner7) = self.canonical_corners();
    }

    /// Recompute the face order. Returns `true` if it changed.
    pub fn recompute_z_orders(&mut self, perspective: &Perspective, tolerance: f64) -> bool {
        let order = compute_face_order(perspective, &self.corner0, &self.corner7, tolerance);
        if order == self.face_order {
            return false;
        }
        self.face_order = order;
        true
    }
}

/// The axes on which `corner0` and `corner7` are in reverse order.
pub fn eversion(corner0: &Pt3, corner7: &Pt3) -> Axes {
    let (c0, c7) = (corner0.normalized(), corner7.normalized());
    let mut everted = Axes::empty();
    if c0.x > c7.x {
        everted |= Axes::X;
    }
    if c0.y > c7.y {
        everted |= Axes::Y;
    }
    if c0.z < c7.z {
        everted |= Axes::Z;
    }
    everted
}

/// The normalized corners in canonical order, and the axes on which they had to be swapped.
pub fn canonical_corners(corner0: &Pt3, corner7: &Pt3) -> (Pt3, Pt3, Axes) {
    let everted = eversion(corner0, corner7);
    let (mut c0, mut c7) = (corner0.normalized(), corner7.normalized());
    for axis in Axis::SPATIAL {
        if everted.contains(axis.into()) {
            mem::swap(&mut c0[axis], &mut c7[axis]);
        }
    }
    (c0, c7, everted)
}

fn valid_movement(movement: Axes) -> bool {
    let valid = !movement.is_empty() && movement != Axes::XYZ;
    debug_assert!(valid, "Invalid movement {movement:?}");
    if !valid {
        error!("Ignoring invalid movement {movement:?}");
    }
    valid
}

/// The normalized point of a preimage, if it is a finite one.
fn finite(solution: Solution<Pt3>) -> Option<Pt3> {
    let pt = solution.value()?;
    pt.is_finite().then(|| pt.normalized())
}
