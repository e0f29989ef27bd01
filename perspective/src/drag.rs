//! Interactive dragging of box corners, box centers and vanishing points: press, a number of
//! motions, release.

use anyhow::{Result, bail};
use log::debug;
use vanishing_geometry::{Axis, Point, Pt2};

use crate::{Axes, BoxId, PerspectiveId, Scene};

/// Vanishing points closer than this form one handle and are dragged together.
const MERGE_DISTANCE: f64 = 0.1;

/// One step of a drag gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEvent<T> {
    Proceed(T),
    /// Keep the state reached by the last `Proceed`. This is the last event.
    Commit,
    /// Go back to the state before the drag. This is the last event.
    Cancel,
}

impl<T> DragEvent<T> {
    pub fn map<R>(self, mut f: impl FnMut(T) -> R) -> DragEvent<R> {
        match self {
            DragEvent::Proceed(v) => DragEvent::Proceed(f(v)),
            DragEvent::Commit => DragEvent::Commit,
            DragEvent::Cancel => DragEvent::Cancel,
        }
    }

    pub fn ends(&self) -> bool {
        self.proceeds().is_none()
    }

    pub fn proceeds(&self) -> Option<&T> {
        match self {
            DragEvent::Proceed(v) => Some(v),
            DragEvent::Commit => None,
            DragEvent::Cancel => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CornerDrag {
    pub box_id: BoxId,
    pub corner: Axes,
    pub movement: Axes,
    pub constrained: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct CenterDrag {
    pub box_id: BoxId,
    /// Where the center was drawn when the drag started.
    pub start: Point,
    pub movement: Axes,
    pub constrained: bool,
}

/// A handle of coinciding finite vanishing points, possibly of several perspectives.
#[derive(Debug, Clone)]
pub struct VpDrag {
    vps: Vec<DraggedVp>,
    /// Boxes were split off at the start. The handle then does not snap onto other vanishing
    /// points.
    split: bool,
}

#[derive(Debug, Clone, Copy)]
struct DraggedVp {
    perspective: PerspectiveId,
    axis: Axis,
    start: Pt2,
}

impl VpDrag {
    pub fn vps(&self) -> impl Iterator<Item = (PerspectiveId, Axis)> + '_ {
        self.vps.iter().map(|vp| (vp.perspective, vp.axis))
    }

    /// The dragged perspectives, each one once.
    pub fn perspectives(&self) -> Vec<PerspectiveId> {
        let mut perspectives: Vec<_> = self.vps.iter().map(|vp| vp.perspective).collect();
        perspectives.sort();
        perspectives.dedup();
        perspectives
    }

    fn contains(&self, (perspective, axis): (PerspectiveId, Axis)) -> bool {
        self.vps
            .iter()
            .any(|vp| vp.perspective == perspective && vp.axis == axis)
    }
}

impl Scene {
    pub fn begin_corner_drag(
        &mut self,
        box_id: BoxId,
        corner: Axes,
        movement: Axes,
        constrained: bool,
    ) -> Result<CornerDrag> {
        self.box3d_mut(box_id)?.save_corners();
        Ok(CornerDrag {
            box_id,
            corner,
            movement,
            constrained,
        })
    }

    /// Returns `true` if the box changed.
    pub fn drive_corner_drag(
        &mut self,
        drag: &CornerDrag,
        event: DragEvent<Point>,
    ) -> Result<bool> {
        match event {
            DragEvent::Proceed(pt) => self.move_corner(
                drag.box_id,
                drag.corner,
                pt,
                drag.movement,
                drag.constrained,
            ),
            DragEvent::Commit => self.commit_drag(drag.box_id),
            DragEvent::Cancel => self.cancel_drag(drag.box_id),
        }
    }

    pub fn begin_center_drag(
        &mut self,
        box_id: BoxId,
        start: Point,
        movement: Axes,
        constrained: bool,
    ) -> Result<CenterDrag> {
        self.box3d_mut(box_id)?.save_corners();
        Ok(CenterDrag {
            box_id,
            start,
            movement,
            constrained,
        })
    }

    pub fn drive_center_drag(
        &mut self,
        drag: &CenterDrag,
        event: DragEvent<Point>,
    ) -> Result<bool> {
        match event {
            DragEvent::Proceed(pt) => self.move_center(
                drag.box_id,
                pt,
                drag.start,
                drag.movement,
                drag.constrained,
            ),
            DragEvent::Commit => self.commit_drag(drag.box_id),
            DragEvent::Cancel => self.cancel_drag(drag.box_id),
        }
    }

    /// Start dragging the finite vanishing point `axis` of `perspective`, together with all
    /// vanishing points drawn at the same place.
    ///
    /// With `split`, every dragged perspective that draws some of the `selected` boxes and
    /// others hands the others over to a copy of itself, so that only the selected boxes follow
    /// the drag.
    pub fn begin_vp_drag(
        &mut self,
        perspective: PerspectiveId,
        axis: Axis,
        selected: &[BoxId],
        split: bool,
    ) -> Result<VpDrag> {
        let Some(pt) = self.perspective(perspective)?.vp(axis).try_affine() else {
            bail!("The vanishing point {axis} of {perspective} is at infinity");
        };
        let handle = self.vps_near(pt, MERGE_DISTANCE);

        if split {
            let mut seen = Vec::new();
            for (id, _) in &handle {
                if seen.contains(id) {
                    continue;
                }
                seen.push(*id);
                let boxes = self.perspective(*id)?.boxes();
                let unselected: Vec<BoxId> = boxes
                    .iter()
                    .copied()
                    .filter(|b| !selected.contains(b))
                    .collect();
                if unselected.is_empty() || unselected.len() == boxes.len() {
                    continue;
                }
                let copy = self.split_perspective(*id, &unselected)?;
                debug!("Split {} boxes off {id} into {copy}", unselected.len());
            }
        }

        let mut vps = Vec::with_capacity(handle.len());
        for (perspective, axis) in handle {
            let start = self.perspective(perspective)?.vp(axis);
            vps.push(DraggedVp {
                perspective,
                axis,
                start,
            });
        }
        Ok(VpDrag { vps, split })
    }

    /// Returns `true` if a vanishing point changed.
    ///
    /// Moving onto another vanishing point within the configured distance snaps onto it, unless
    /// the drag was started with `split` or that vanishing point belongs to one of the dragged
    /// perspectives. Perspectives that coincide after snapping are merged, and the handle then
    /// drags the vanishing points of both. Cancelling does not undo a merge.
    pub fn drive_vp_drag(&mut self, drag: &mut VpDrag, event: DragEvent<Point>) -> Result<bool> {
        match event {
            DragEvent::Proceed(pt) => {
                if !drag.split && self.snap_vp(drag, pt)? {
                    return Ok(true);
                }
                self.move_vps(drag, pt.into())?;
                Ok(true)
            }
            DragEvent::Commit => {
                let mut moved = false;
                for vp in &drag.vps {
                    moved |= self.perspective(vp.perspective)?.vp(vp.axis) != vp.start;
                }
                Ok(moved)
            }
            DragEvent::Cancel => {
                let mut moved = false;
                for vp in &drag.vps {
                    if self.perspective(vp.perspective)?.vp(vp.axis) != vp.start {
                        self.set_vp(vp.perspective, vp.axis, vp.start)?;
                        moved = true;
                    }
                }
                Ok(moved)
            }
        }
    }

    /// Snap the handle onto another one near `pt` and merge coinciding perspectives. Returns
    /// `false` if there is none that may be merged.
    fn snap_vp(&mut self, drag: &mut VpDrag, pt: Point) -> Result<bool> {
        let dragged = drag.perspectives();
        let candidates: Vec<_> = self
            .vps_near(pt, self.config().snapping.vp_distance)
            .into_iter()
            .filter(|vp| !drag.contains(*vp))
            .collect();

        for (id, axis) in candidates {
            let target = self.perspective(id)?.vp(axis);
            let handle: Vec<_> = self
                .vps_near(target.affine(), MERGE_DISTANCE)
                .into_iter()
                .filter(|vp| !drag.contains(*vp))
                .collect();
            if handle.iter().any(|(p, _)| dragged.contains(p)) {
                // The boxes would degenerate.
                debug!("Not merging onto the vanishing point {axis} of a dragged perspective");
                continue;
            }

            self.move_vps(drag, target)?;
            let mut ids: Vec<PerspectiveId> = handle.iter().map(|(p, _)| *p).collect();
            ids.extend(dragged.iter().copied());
            let merged = self.merge_coinciding(&ids)?;
            debug!("Merged {merged:?} into the perspectives of {id}");

            drag.vps.retain(|vp| !merged.contains(&vp.perspective));
            for (perspective, axis) in handle {
                if !merged.contains(&perspective) {
                    drag.vps.push(DraggedVp {
                        perspective,
                        axis,
                        start: target,
                    });
                }
            }
            return Ok(true);
        }
        Ok(false)
    }

    fn move_vps(&mut self, drag: &VpDrag, pt: Pt2) -> Result<()> {
        for vp in &drag.vps {
            self.set_vp(vp.perspective, vp.axis, pt)?;
        }
        Ok(())
    }

    /// The finite vanishing points drawn closer than `distance` to `pt`.
    fn vps_near(&self, pt: Point, distance: f64) -> Vec<(PerspectiveId, Axis)> {
        self.perspectives()
            .flat_map(|(id, perspective)| {
                Axis::SPATIAL.into_iter().filter_map(move |axis| {
                    let vp = perspective.vp(axis).try_affine()?;
                    (vp.distance(pt) < distance).then_some((id, axis))
                })
            })
            .collect()
    }

    fn commit_drag(&mut self, box_id: BoxId) -> Result<bool> {
        let bx = self.box3d_mut(box_id)?;
        let everted = !bx.eversion().is_empty();
        bx.relabel_corners();
        bx.save_corners();
        if everted {
            self.refresh_box(box_id)?;
        }
        Ok(everted)
    }

    fn cancel_drag(&mut self, box_id: BoxId) -> Result<bool> {
        let bx = self.box3d_mut(box_id)?;
        let moved = bx.corners() != bx.saved_corners();
        bx.restore_saved_corners();
        if moved {
            self.refresh_box(box_id)?;
        }
        Ok(moved)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use vanishing_geometry::Pt3;

    use super::*;
    use crate::SceneChange;

    #[test]
    fn map_keeps_the_end_events() {
        let event = DragEvent::Proceed(2).map(|v| v * 3);
        assert_eq!(event, DragEvent::Proceed(6));
        assert_eq!(event.proceeds(), Some(&6));
        assert!(DragEvent::<i32>::Commit.map(|v| v + 1).ends());
        assert_eq!(DragEvent::<i32>::Cancel.map(|v| v + 1), DragEvent::Cancel);
    }

    #[test]
    fn cancel_restores_the_box() {
        let (mut scene, persp, bx) = scene_with_box();
        let before = scene.box3d(bx).unwrap().corners();

        let drag = scene
            .begin_corner_drag(bx, Axes::XYZ, Axes::XY, false)
            .unwrap();
        let pt = screen(&scene, persp, Pt3::new(3.0, 2.0, 0.0, 1.0));
        assert!(scene.drive_corner_drag(&drag, DragEvent::Proceed(pt)).unwrap());
        assert_ne!(scene.box3d(bx).unwrap().corners(), before);

        assert!(scene.drive_corner_drag(&drag, DragEvent::Cancel).unwrap());
        assert_eq!(scene.box3d(bx).unwrap().corners(), before);
    }

    #[test]
    fn repeated_motion_does_not_change_the_result() {
        let (mut scene, persp, bx) = scene_with_box();
        let drag = scene
            .begin_corner_drag(bx, Axes::XYZ, Axes::XY, false)
            .unwrap();
        let pt = screen(&scene, persp, Pt3::new(3.0, 2.0, 0.0, 1.0));

        scene.drive_corner_drag(&drag, DragEvent::Proceed(pt)).unwrap();
        let corners = scene.box3d(bx).unwrap().corners();
        scene.take_changes();

        scene.drive_corner_drag(&drag, DragEvent::Proceed(pt)).unwrap();
        assert_eq!(scene.box3d(bx).unwrap().corners(), corners);
        assert!(
            !scene
                .take_changes()
                .iter()
                .any(|c| matches!(c, SceneChange::FaceOrder(..)))
        );
    }

    #[test]
    fn commit_relabels_an_everted_box() {
        let (mut scene, persp, bx) = scene_with_box();
        let drag = scene
            .begin_corner_drag(bx, Axes::XYZ, Axes::XY, false)
            .unwrap();
        // Drag corner 7 past corner 0 on X.
        let pt = screen(&scene, persp, Pt3::new(-0.5, 1.0, 0.0, 1.0));
        scene.drive_corner_drag(&drag, DragEvent::Proceed(pt)).unwrap();
        assert_eq!(scene.box3d(bx).unwrap().eversion(), Axes::X);

        assert!(scene.drive_corner_drag(&drag, DragEvent::Commit).unwrap());
        let bx = scene.box3d(bx).unwrap();
        assert_eq!(bx.eversion(), Axes::empty());
        let (c0, c7) = bx.corners();
        assert_abs_diff_eq!(c0.x, -0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(c7.x, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn center_drag_moves_the_whole_box() {
        let (mut scene, persp, bx) = scene_with_box();
        let perspective = scene.perspective(persp).unwrap();
        let start = scene.box3d(bx).unwrap().center_screen(perspective).unwrap();
        let drag = scene.begin_center_drag(bx, start, Axes::XY, false).unwrap();

        let target = screen(&scene, persp, Pt3::new(2.5, 1.5, 0.5, 1.0));
        assert!(scene.drive_center_drag(&drag, DragEvent::Proceed(target)).unwrap());
        assert_eq!(scene.box3d(bx).unwrap().proj_center(), Pt3::new(2.5, 1.5, 0.5, 1.0));

        assert!(!scene.drive_center_drag(&drag, DragEvent::Commit).unwrap());
        assert_eq!(scene.box3d(bx).unwrap().proj_center(), Pt3::new(2.5, 1.5, 0.5, 1.0));
    }

    #[test]
    fn coinciding_vps_move_together() {
        let (mut scene, a, _) = scene_with_box();
        let b = scene.duplicate_perspective(a).unwrap();

        let mut drag = scene.begin_vp_drag(a, Axis::Z, &[], false).unwrap();
        assert_eq!(drag.perspectives(), [a, b]);
        let pt = Point::new(650.0, 180.0);
        assert!(scene.drive_vp_drag(&mut drag, DragEvent::Proceed(pt)).unwrap());
        for persp in [a, b] {
            assert_eq!(scene.perspective(persp).unwrap().vp(Axis::Z), Pt2::from(pt));
        }

        assert!(scene.drive_vp_drag(&mut drag, DragEvent::Cancel).unwrap());
        for persp in [a, b] {
            assert_eq!(
                scene.perspective(persp).unwrap().vp(Axis::Z),
                Pt2::new(600.0, 200.0, 1.0)
            );
        }
    }

    #[test]
    fn infinite_vps_have_no_handle() {
        let (mut scene, persp, _) = scene_with_box();
        assert!(scene.begin_vp_drag(persp, Axis::Y, &[], false).is_err());
    }

    #[test]
    fn snapping_onto_another_perspective_merges() {
        let (mut scene, a, in_a) = scene_with_box();
        let b = scene.duplicate_perspective(a).unwrap();
        let in_b = scene
            .create_box(b, Pt3::new(0.0, 0.0, 1.0, 1.0), Pt3::new(2.0, 2.0, 0.0, 1.0))
            .unwrap();
        scene.set_vp(b, Axis::X, Pt2::new(-50.0, 200.0, 1.0)).unwrap();

        let mut drag = scene.begin_vp_drag(b, Axis::X, &[], false).unwrap();
        assert_eq!(drag.perspectives(), [b]);

        // Within snapping distance of the X vanishing point of `a`.
        let near = Point::new(2.0, 201.0);
        assert!(scene.drive_vp_drag(&mut drag, DragEvent::Proceed(near)).unwrap());
        assert!(scene.perspective(b).is_err());
        assert_eq!(scene.perspective(a).unwrap().boxes(), [in_a, in_b]);
        assert_eq!(scene.box3d(in_b).unwrap().perspective(), a);
        assert_eq!(drag.vps().collect::<Vec<_>>(), [(a, Axis::X)]);

        // The merged handle keeps following the pointer.
        let pt = Point::new(10.0, 220.0);
        scene.drive_vp_drag(&mut drag, DragEvent::Proceed(pt)).unwrap();
        assert_eq!(scene.perspective(a).unwrap().vp(Axis::X), Pt2::from(pt));
        assert!(scene.drive_vp_drag(&mut drag, DragEvent::Commit).unwrap());
    }

    #[test]
    fn vps_of_the_same_perspective_are_not_merged() {
        let (mut scene, persp, _) = scene_with_box();
        let mut drag = scene.begin_vp_drag(persp, Axis::X, &[], false).unwrap();

        // Close to the Z vanishing point of the same perspective.
        let pt = Point::new(598.0, 199.0);
        assert!(scene.drive_vp_drag(&mut drag, DragEvent::Proceed(pt)).unwrap());
        let perspective = scene.perspective(persp).unwrap();
        assert_eq!(perspective.vp(Axis::X), Pt2::from(pt));
        assert_eq!(perspective.vp(Axis::Z), Pt2::new(600.0, 200.0, 1.0));
        assert_eq!(scene.perspectives().count(), 1);
        assert_eq!(drag.vps().count(), 1);
    }

    #[test]
    fn split_drag_leaves_unselected_boxes_behind() {
        let (mut scene, persp, selected) = scene_with_box();
        let other = scene
            .create_box(
                persp,
                Pt3::new(0.0, 0.0, 1.0, 1.0),
                Pt3::new(2.0, 2.0, 0.0, 1.0),
            )
            .unwrap();

        let mut drag = scene.begin_vp_drag(persp, Axis::X, &[selected], true).unwrap();
        let copy = scene.box3d(other).unwrap().perspective();
        assert_ne!(copy, persp);
        assert_eq!(scene.perspective(persp).unwrap().boxes(), [selected]);
        assert_eq!(drag.perspectives(), [persp]);

        // Split drags do not snap, not even onto the copy left behind.
        let pt = Point::new(3.0, 202.0);
        assert!(scene.drive_vp_drag(&mut drag, DragEvent::Proceed(pt)).unwrap());
        assert_eq!(scene.perspective(persp).unwrap().vp(Axis::X), Pt2::from(pt));
        assert_eq!(
            scene.perspective(copy).unwrap().vp(Axis::X),
            Pt2::new(0.0, 200.0, 1.0)
        );
        assert_eq!(scene.box3d(selected).unwrap().perspective(), persp);
    }

    #[test]
    fn split_without_a_selection_in_the_perspective_keeps_it_whole() {
        let (mut scene, persp, bx) = scene_with_box();
        scene.begin_vp_drag(persp, Axis::X, &[], true).unwrap();
        assert_eq!(scene.perspectives().count(), 1);
        assert_eq!(scene.perspective(persp).unwrap().boxes(), [bx]);
    }

    fn screen(scene: &Scene, persp: PerspectiveId, pt: Pt3) -> Point {
        scene.perspective(persp).unwrap().matrix().image(&pt).affine()
    }

    fn scene_with_box() -> (Scene, PerspectiveId, BoxId) {
        let mut scene = Scene::default();
        let persp = scene.create_document_perspective(600.0, 400.0);
        let bx = scene
            .create_box(
                persp,
                Pt3::new(0.0, 0.0, 1.0, 1.0),
                Pt3::new(1.0, 1.0, 0.0, 1.0),
            )
            .unwrap();
        (scene, persp, bx)
    }
}
