use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use anyhow::{Result, anyhow, bail};
use log::{debug, error};
use vanishing_geometry::{Affine2, Axis, Point, Pt2, Pt3};

use crate::{
    Axes, Box3D, BoxId, Change, ChangeTracker, Config, Face, FaceOrder, Generator, Perspective,
    PerspectiveId, SceneChange, VpState,
};

/// Owns all perspectives and boxes of a document, and the perspective new boxes are drawn in.
///
/// Every operation that changes a perspective refreshes the boxes drawn in it and records what
/// changed. The changes are collected with [`Scene::take_changes`].
#[derive(Debug)]
pub struct Scene {
    config: Config,
    perspective_ids: Generator,
    box_ids: Generator,
    perspectives: BTreeMap<PerspectiveId, Perspective>,
    boxes: BTreeMap<BoxId, Box3D>,
    current: Option<PerspectiveId>,
    changes: ChangeTracker,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Scene {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            perspective_ids: Generator::default(),
            box_ids: Generator::default(),
            perspectives: BTreeMap::new(),
            boxes: BTreeMap::new(),
            current: None,
            changes: ChangeTracker::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn take_changes(&mut self) -> Vec<SceneChange> {
        self.changes.take_all()
    }

    // Perspectives

    /// Add a perspective. The first one becomes the current perspective.
    pub fn create_perspective(&mut self, perspective: Perspective) -> PerspectiveId {
        let id = PerspectiveId::from(self.perspective_ids.acquire());
        self.insert_perspective(id, perspective);
        id
    }

    pub(crate) fn insert_perspective(&mut self, id: PerspectiveId, mut perspective: Perspective) {
        let stale = perspective.take_boxes();
        if !stale.is_empty() {
            debug!("Dropping {} box references of a new perspective", stale.len());
        }
        self.perspectives.insert(id, perspective);
        self.changes.push(Change::Create(id));
        if self.current.is_none() {
            self.current = Some(id);
        }
    }

    pub(crate) fn reserve_perspective_id(&mut self, id: PerspectiveId) {
        self.perspective_ids.reserve(*id);
    }

    pub(crate) fn reserve_box_id(&mut self, id: BoxId) {
        self.box_ids.reserve(*id);
    }

    pub fn create_document_perspective(&mut self, width: f64, height: f64) -> PerspectiveId {
        self.create_perspective(Perspective::with_document_defaults(width, height))
    }

    /// A new perspective with the same vanishing points and no boxes.
    pub fn duplicate_perspective(&mut self, id: PerspectiveId) -> Result<PerspectiveId> {
        let matrix = *self.perspective(id)?.matrix();
        Ok(self.create_perspective(Perspective::with_matrix(matrix)))
    }

    /// Delete a perspective.
    ///
    /// With `reassign_to`, its boxes are moved there. Otherwise they are deleted with it and
    /// their ids are returned.
    pub fn delete_perspective(
        &mut self,
        id: PerspectiveId,
        reassign_to: Option<PerspectiveId>,
    ) -> Result<Vec<BoxId>> {
        if let Some(target) = reassign_to {
            if target == id {
                bail!("Can't reassign the boxes of {id} to itself");
            }
            self.perspective(target)?;
        }

        let boxes = lookup_mut(&mut self.perspectives, id)?.take_boxes();
        let mut orphans = Vec::new();
        for box_id in boxes {
            match reassign_to {
                Some(target) => self.attach(box_id, target)?,
                None => {
                    self.remove_box(box_id)?;
                    orphans.push(box_id);
                }
            }
        }

        self.perspectives.remove(&id);
        self.perspective_ids.release(*id);
        self.changes.push(Change::Delete(id));
        if self.current == Some(id) {
            self.current = self.first_perspective();
        }
        Ok(orphans)
    }

    pub fn current_perspective(&self) -> Option<PerspectiveId> {
        self.current
    }

    pub fn set_current_perspective(&mut self, id: PerspectiveId) -> Result<()> {
        self.perspective(id)?;
        self.current = Some(id);
        Ok(())
    }

    pub fn first_perspective(&self) -> Option<PerspectiveId> {
        self.perspectives.keys().next().copied()
    }

    pub fn perspective(&self, id: PerspectiveId) -> Result<&Perspective> {
        lookup(&self.perspectives, id)
    }

    pub fn perspectives(&self) -> impl Iterator<Item = (PerspectiveId, &Perspective)> {
        self.perspectives.iter().map(|(id, p)| (*id, p))
    }

    pub fn perspectives_coincide(&self, a: PerspectiveId, b: PerspectiveId) -> Result<bool> {
        Ok(self.perspective(a)?.coincides(self.perspective(b)?))
    }

    /// Move all boxes of `source` to `target`. The perspectives must coincide.
    pub fn absorb(&mut self, target: PerspectiveId, source: PerspectiveId) -> Result<()> {
        let coincide = self.perspectives_coincide(target, source)?;
        debug_assert!(coincide, "{source} does not coincide with {target}");
        if !coincide {
            error!("Refusing to absorb {source} into the different {target}");
            return Ok(());
        }
        if target == source {
            return Ok(());
        }

        let boxes = lookup_mut(&mut self.perspectives, source)?.take_boxes();
        for box_id in boxes {
            self.attach(box_id, target)?;
        }
        Ok(())
    }

    /// Move `boxes` of `id` onto a fresh copy of it.
    pub fn split_perspective(
        &mut self,
        id: PerspectiveId,
        boxes: &[BoxId],
    ) -> Result<PerspectiveId> {
        let perspective = self.perspective(id)?;
        if let Some(foreign) = boxes.iter().find(|b| !perspective.has_box(**b)) {
            bail!("{foreign} is not drawn in {id}");
        }

        let copy = self.duplicate_perspective(id)?;
        for box_id in boxes {
            self.switch_perspective(*box_id, copy, false)?;
        }
        Ok(copy)
    }

    /// Merge coinciding perspectives among `ids`. Each one is absorbed by the first earlier
    /// one it coincides with and then deleted. Returns the deleted perspectives.
    pub fn merge_coinciding(&mut self, ids: &[PerspectiveId]) -> Result<Vec<PerspectiveId>> {
        let mut kept: Vec<PerspectiveId> = Vec::new();
        let mut merged = Vec::new();
        for id in ids.iter().copied() {
            if kept.contains(&id) || merged.contains(&id) {
                continue;
            }
            let perspective = self.perspective(id)?;
            let target = kept
                .iter()
                .copied()
                .find(|k| self.perspectives[k].coincides(perspective));
            match target {
                Some(target) => {
                    self.absorb(target, id)?;
                    self.delete_perspective(id, None)?;
                    merged.push(id);
                }
                None => kept.push(id),
            }
        }
        Ok(merged)
    }

    // Vanishing points

    pub fn toggle_vp(&mut self, id: PerspectiveId, axis: Axis) -> Result<()> {
        lookup_mut(&mut self.perspectives, id)?.toggle_vp(axis);
        self.perspective_changed(id)
    }

    /// Toggle the same vanishing point in several perspectives.
    pub fn toggle_vps(&mut self, ids: &[PerspectiveId], axis: Axis) -> Result<()> {
        for id in ids {
            self.perspective(*id)?;
        }
        for id in ids {
            self.toggle_vp(*id, axis)?;
        }
        Ok(())
    }

    /// Returns `true` if the state changed.
    pub fn set_vp_state(&mut self, id: PerspectiveId, axis: Axis, state: VpState) -> Result<bool> {
        let changed = lookup_mut(&mut self.perspectives, id)?.set_vp_state(axis, state);
        if changed {
            self.perspective_changed(id)?;
        }
        Ok(changed)
    }

    pub fn set_vp(&mut self, id: PerspectiveId, axis: Axis, pt: Pt2) -> Result<()> {
        lookup_mut(&mut self.perspectives, id)?.set_vp(axis, pt);
        self.perspective_changed(id)
    }

    /// Rotate an infinite vanishing point. A `fine` rotation turns by the configured step in
    /// the direction of `degrees` instead.
    ///
    /// Returns `false` for finite vanishing points.
    pub fn rotate_vp(
        &mut self,
        id: PerspectiveId,
        axis: Axis,
        degrees: f64,
        fine: bool,
    ) -> Result<bool> {
        let degrees = if !fine {
            degrees
        } else if degrees == 0.0 {
            0.0
        } else {
            self.config.rotation.fine_step * degrees.signum()
        };
        let rotated = lookup_mut(&mut self.perspectives, id)?.rotate_vp(axis, degrees);
        if rotated {
            self.perspective_changed(id)?;
        }
        Ok(rotated)
    }

    /// Apply an affine map of the drawing surface to a perspective, e.g. when the canvas
    /// is transformed.
    pub fn apply_affine(&mut self, id: PerspectiveId, affine: &Affine2) -> Result<()> {
        lookup_mut(&mut self.perspectives, id)?.apply_affine(affine);
        self.perspective_changed(id)
    }

    /// Apply an affine map to the drawing of `boxes`.
    ///
    /// The boxes keep their coordinates in 3-space. Each perspective they are drawn in is mapped
    /// once, however many of its boxes are listed, so other boxes drawn in it move along.
    /// Returns the mapped perspectives.
    pub fn transform_boxes(
        &mut self,
        boxes: &[BoxId],
        affine: &Affine2,
    ) -> Result<Vec<PerspectiveId>> {
        let mut perspectives = BTreeSet::new();
        for id in boxes {
            perspectives.insert(self.box3d(*id)?.perspective());
        }
        for id in &perspectives {
            self.apply_affine(*id, affine)?;
        }
        Ok(perspectives.into_iter().collect())
    }

    fn perspective_changed(&mut self, id: PerspectiveId) -> Result<()> {
        self.changes.push(Change::Update(id));
        for box_id in self.perspective(id)?.boxes().to_vec() {
            self.refresh_box(box_id)?;
        }
        Ok(())
    }

    // Boxes

    pub fn create_box(
        &mut self,
        perspective: PerspectiveId,
        corner0: Pt3,
        corner7: Pt3,
    ) -> Result<BoxId> {
        self.perspective(perspective)?;
        let id = BoxId::from(self.box_ids.acquire());
        self.insert_box(id, Box3D::new(perspective, corner0, corner7))?;
        Ok(id)
    }

    pub(crate) fn insert_box(&mut self, id: BoxId, bx: Box3D) -> Result<()> {
        let perspective = lookup_mut(&mut self.perspectives, bx.perspective())?;
        perspective.add_box(id);
        self.boxes.insert(id, bx);
        self.changes.push(Change::Create(id));
        self.update_z_order(id)?;
        Ok(())
    }

    pub fn create_box_in_current(&mut self, corner0: Pt3, corner7: Pt3) -> Result<BoxId> {
        let Some(current) = self.current else {
            bail!("There is no current perspective");
        };
        self.create_box(current, corner0, corner7)
    }

    pub fn remove_box(&mut self, id: BoxId) -> Result<Box3D> {
        let Some(bx) = self.boxes.remove(&id) else {
            bail!("Unknown {id}");
        };
        if let Some(perspective) = self.perspectives.get_mut(&bx.perspective()) {
            perspective.remove_box(id);
        }
        self.box_ids.release(*id);
        self.changes.push(Change::Delete(id));
        Ok(bx)
    }

    pub fn box3d(&self, id: BoxId) -> Result<&Box3D> {
        lookup(&self.boxes, id)
    }

    pub(crate) fn box3d_mut(&mut self, id: BoxId) -> Result<&mut Box3D> {
        lookup_mut(&mut self.boxes, id)
    }

    pub fn boxes(&self) -> impl Iterator<Item = (BoxId, &Box3D)> {
        self.boxes.iter().map(|(id, b)| (*id, b))
    }

    /// Draw a box in another perspective.
    ///
    /// With `recompute_corners`, corner 0 and corner 7 keep their position on the drawing
    /// surface and their Z coordinate; otherwise the box keeps its coordinates in 3-space.
    pub fn switch_perspective(
        &mut self,
        id: BoxId,
        perspective: PerspectiveId,
        recompute_corners: bool,
    ) -> Result<()> {
        let new = self.perspective(perspective)?;
        let bx = self.box3d(id)?;
        let old = self.perspective(bx.perspective())?;

        let corners = if recompute_corners {
            recomputed_corners(bx, old, new)
        } else {
            None
        };

        if let Some((corner0, corner7)) = corners {
            self.box3d_mut(id)?.set_corners(corner0, corner7);
        }
        self.attach(id, perspective)
    }

    /// Move a box to `perspective` without touching its coordinates.
    fn attach(&mut self, id: BoxId, perspective: PerspectiveId) -> Result<()> {
        let bx = lookup_mut(&mut self.boxes, id)?;
        let old = bx.perspective();
        bx.set_perspective(perspective);
        if let Some(old) = self.perspectives.get_mut(&old) {
            old.remove_box(id);
        }
        lookup_mut(&mut self.perspectives, perspective)?.add_box(id);
        self.refresh_box(id)
    }

    /// Move a corner of a box so that it is drawn at `screen_pt`. See [`Box3D::set_corner`].
    ///
    /// Returns `false` if the point could not be mapped and the box was left alone.
    pub fn move_corner(
        &mut self,
        id: BoxId,
        corner: Axes,
        screen_pt: Point,
        movement: Axes,
        constrained: bool,
    ) -> Result<bool> {
        let bx = lookup_mut(&mut self.boxes, id)?;
        let perspective = lookup(&self.perspectives, bx.perspective())?;
        let moved = bx.set_corner(
            perspective,
            corner,
            screen_pt,
            movement,
            constrained,
            &self.config,
        );
        if moved {
            self.refresh_box(id)?;
        }
        Ok(moved)
    }

    /// Move the center of a box from `old_pos` to `new_pos`. See [`Box3D::set_center`].
    pub fn move_center(
        &mut self,
        id: BoxId,
        new_pos: Point,
        old_pos: Point,
        movement: Axes,
        constrained: bool,
    ) -> Result<bool> {
        let bx = lookup_mut(&mut self.boxes, id)?;
        let perspective = lookup(&self.perspectives, bx.perspective())?;
        let moved = bx.set_center(
            perspective,
            new_pos,
            old_pos,
            movement,
            constrained,
            &self.config,
        );
        if moved {
            self.refresh_box(id)?;
        }
        Ok(moved)
    }

    /// Recompute the face order of a box. Returns `true` if it changed.
    pub fn update_z_order(&mut self, id: BoxId) -> Result<bool> {
        let bx = lookup_mut(&mut self.boxes, id)?;
        let perspective = lookup(&self.perspectives, bx.perspective())?;
        let changed = bx.recompute_z_orders(perspective, self.config.z_order.sector_tolerance);
        if changed {
            self.changes.push(SceneChange::FaceOrder(id, bx.face_order()));
        }
        Ok(changed)
    }

    pub fn face_order(&self, id: BoxId) -> Result<FaceOrder> {
        Ok(self.box3d(id)?.face_order())
    }

    pub fn face_outline(&self, id: BoxId, face: Face) -> Result<[Point; 4]> {
        let bx = self.box3d(id)?;
        Ok(bx.face_outline(face, self.perspective(bx.perspective())?))
    }

    /// The outlines of all six faces in draw order, backmost first.
    pub fn outlines_back_to_front(&self, id: BoxId) -> Result<Vec<(Face, [Point; 4])>> {
        let bx = self.box3d(id)?;
        let perspective = self.perspective(bx.perspective())?;
        Ok(bx
            .face_order()
            .back_to_front()
            .map(|face| (face, bx.face_outline(face, perspective)))
            .collect())
    }

    /// The outline of a box changed.
    pub(crate) fn refresh_box(&mut self, id: BoxId) -> Result<()> {
        self.changes.push(Change::Update(id));
        self.update_z_order(id)?;
        Ok(())
    }
}

fn recomputed_corners(bx: &Box3D, old: &Perspective, new: &Perspective) -> Option<(Pt3, Pt3)> {
    let (c0, c7) = bx.corners();
    let preimage = |corner: Axes, z: f64| {
        let screen = bx.corner_screen(corner, old);
        let pt = new.matrix().preimage(screen, z, Axis::Z).value()?;
        pt.is_finite().then(|| pt.normalized())
    };
    let corners = preimage(Axes::empty(), c0.normalized().z)
        .zip(preimage(Axes::XYZ, c7.normalized().z));
    if corners.is_none() {
        debug!("Keeping the corners of a box switched to a degenerate perspective");
    }
    corners
}

fn lookup<K: Ord + fmt::Display + Copy, V>(map: &BTreeMap<K, V>, id: K) -> Result<&V> {
    map.get(&id).ok_or_else(|| anyhow!("Unknown {id}"))
}

fn lookup_mut<K: Ord + fmt::Display + Copy, V>(
    map: &mut BTreeMap<K, V>,
    id: K,
) -> Result<&mut V> {
    map.get_mut(&id).ok_or_else(|| anyhow!("Unknown {id}"))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn first_perspective_becomes_current() {
        let mut scene = Scene::default();
        assert_eq!(scene.current_perspective(), None);
        assert!(scene.create_box_in_current(c0(), c7()).is_err());

        let a = scene.create_document_perspective(600.0, 400.0);
        let b = scene.create_document_perspective(800.0, 600.0);
        assert_eq!(scene.current_perspective(), Some(a));
        scene.set_current_perspective(b).unwrap();

        let bx = scene.create_box_in_current(c0(), c7()).unwrap();
        assert_eq!(scene.box3d(bx).unwrap().perspective(), b);
        assert!(scene.perspective(b).unwrap().has_box(bx));
    }

    #[test]
    fn creation_is_reported() {
        let mut scene = Scene::default();
        let persp = scene.create_document_perspective(600.0, 400.0);
        let bx = scene.create_box(persp, c0(), c7()).unwrap();

        let changes = scene.take_changes();
        assert_eq!(changes[0], SceneChange::Perspective(Change::Create(persp)));
        assert_eq!(changes[1], SceneChange::Box(Change::Create(bx)));
        assert!(changes.contains(&SceneChange::FaceOrder(bx, scene.face_order(bx).unwrap())));
        assert!(scene.take_changes().is_empty());
    }

    #[test]
    fn unknown_ids_are_errors() {
        let (mut scene, persp, bx) = scene_with_box();
        scene.remove_box(bx).unwrap();
        assert!(scene.box3d(bx).is_err());
        assert!(scene.remove_box(bx).is_err());
        assert!(scene.move_corner(bx, Axes::XYZ, Point::ZERO, Axes::XY, false).is_err());

        scene.delete_perspective(persp, None).unwrap();
        let err = scene.create_box(persp, c0(), c7()).unwrap_err();
        assert_eq!(err.to_string(), format!("Unknown {persp}"));
        assert!(scene.toggle_vp(persp, Axis::X).is_err());
    }

    #[test]
    fn deleting_a_perspective_reassigns_its_boxes() {
        let (mut scene, persp, bx) = scene_with_box();
        let other = scene.create_document_perspective(800.0, 600.0);

        assert!(scene.delete_perspective(persp, Some(persp)).is_err());
        let orphans = scene.delete_perspective(persp, Some(other)).unwrap();
        assert!(orphans.is_empty());
        assert_eq!(scene.box3d(bx).unwrap().perspective(), other);
        assert!(scene.perspective(other).unwrap().has_box(bx));
        assert_eq!(scene.current_perspective(), Some(other));
    }

    #[test]
    fn deleting_a_perspective_removes_its_boxes() {
        let (mut scene, persp, bx) = scene_with_box();
        let orphans = scene.delete_perspective(persp, None).unwrap();
        assert_eq!(orphans, [bx]);
        assert!(scene.box3d(bx).is_err());
        assert_eq!(scene.current_perspective(), None);
        assert!(
            scene
                .take_changes()
                .contains(&SceneChange::Box(Change::Delete(bx)))
        );
    }

    #[test]
    fn detaching_the_last_box_keeps_the_perspective() {
        let (mut scene, persp, bx) = scene_with_box();
        scene.remove_box(bx).unwrap();
        assert!(scene.perspective(persp).unwrap().boxes().is_empty());
        assert_eq!(scene.first_perspective(), Some(persp));
    }

    #[test]
    fn toggling_refreshes_dependent_boxes() {
        let (mut scene, persp, bx) = scene_with_box();
        let matrix = *scene.perspective(persp).unwrap().matrix();
        let order = scene.face_order(bx).unwrap();
        scene.take_changes();

        scene.toggle_vp(persp, Axis::X).unwrap();
        let changes = scene.take_changes();
        assert_eq!(changes[0], SceneChange::Perspective(Change::Update(persp)));
        assert!(changes.contains(&SceneChange::Box(Change::Update(bx))));

        scene.toggle_vp(persp, Axis::X).unwrap();
        assert_eq!(*scene.perspective(persp).unwrap().matrix(), matrix);
        assert_eq!(scene.face_order(bx).unwrap(), order);
    }

    #[test]
    fn toggling_several_perspectives() {
        let mut scene = Scene::default();
        let a = scene.create_document_perspective(600.0, 400.0);
        let b = scene.create_document_perspective(800.0, 600.0);
        scene.toggle_vps(&[a, b], Axis::Z).unwrap();
        assert!(!scene.perspective(a).unwrap().vp_is_finite(Axis::Z));
        assert!(!scene.perspective(b).unwrap().vp_is_finite(Axis::Z));

        scene.delete_perspective(b, None).unwrap();
        assert!(scene.toggle_vps(&[a, b], Axis::Z).is_err());
        // Nothing is toggled if one of the perspectives is unknown.
        assert!(!scene.perspective(a).unwrap().vp_is_finite(Axis::Z));
    }

    #[test]
    fn vp_state_and_position() {
        let (mut scene, persp, _) = scene_with_box();
        assert!(!scene.set_vp_state(persp, Axis::Z, VpState::Finite).unwrap());
        assert!(scene.set_vp_state(persp, Axis::Z, VpState::Infinite).unwrap());

        scene
            .set_vp(persp, Axis::X, Pt2::new(-100.0, 150.0, 1.0))
            .unwrap();
        assert_eq!(
            scene.perspective(persp).unwrap().vp(Axis::X),
            Pt2::new(-100.0, 150.0, 1.0)
        );
    }

    #[test]
    fn fine_rotation_uses_the_configured_step() {
        let (mut scene, persp, _) = scene_with_box();
        assert!(!scene.rotate_vp(persp, Axis::X, 10.0, false).unwrap());

        assert!(scene.rotate_vp(persp, Axis::Y, -30.0, true).unwrap());
        let angle = scene.perspective(persp).unwrap().infinite_angle(Axis::Y).unwrap();
        assert_abs_diff_eq!(angle, 89.5, epsilon = 1e-9);

        assert!(scene.rotate_vp(persp, Axis::Y, 0.0, true).unwrap());
        let angle = scene.perspective(persp).unwrap().infinite_angle(Axis::Y).unwrap();
        assert_abs_diff_eq!(angle, 89.5, epsilon = 1e-9);

        assert!(scene.rotate_vp(persp, Axis::Y, 10.0, false).unwrap());
        let angle = scene.perspective(persp).unwrap().infinite_angle(Axis::Y).unwrap();
        assert_abs_diff_eq!(angle, 99.5, epsilon = 1e-9);
    }

    #[test]
    fn affine_maps_move_the_drawn_box() {
        let (mut scene, persp, bx) = scene_with_box();
        let before = scene.face_outline(bx, Face::Front).unwrap();
        scene
            .apply_affine(persp, &Affine2::from_translation(glam::DVec2::new(5.0, -2.0)))
            .unwrap();
        let after = scene.face_outline(bx, Face::Front).unwrap();
        for (b, a) in before.iter().zip(after.iter()) {
            assert_abs_diff_eq!(a.x - b.x, 5.0, epsilon = 1e-9);
            assert_abs_diff_eq!(a.y - b.y, -2.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn transforming_boxes_maps_each_perspective_once() {
        let (mut scene, persp, a) = scene_with_box();
        let b = scene.create_box(persp, c0(), Pt3::new(2.0, 2.0, 0.0, 1.0)).unwrap();
        let other = scene.create_document_perspective(800.0, 600.0);
        let c = scene.create_box(other, c0(), c7()).unwrap();
        let origin = scene.perspective(persp).unwrap().vp(Axis::W).affine();
        scene.take_changes();

        let shift = Affine2::from_translation(glam::DVec2::new(5.0, 0.0));
        let mapped = scene.transform_boxes(&[a, b, c, a], &shift).unwrap();
        assert_eq!(mapped, [persp, other]);

        let moved = scene.perspective(persp).unwrap().vp(Axis::W).affine();
        assert_abs_diff_eq!(moved.x - origin.x, 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(moved.y, origin.y, epsilon = 1e-9);
        let updates = scene
            .take_changes()
            .into_iter()
            .filter(|change| *change == SceneChange::Perspective(Change::Update(persp)))
            .count();
        assert_eq!(updates, 1);
    }

    #[test]
    fn transforming_unknown_boxes_changes_nothing() {
        let (mut scene, persp, bx) = scene_with_box();
        let matrix = *scene.perspective(persp).unwrap().matrix();
        let stale = scene.create_box(persp, c0(), c7()).unwrap();
        scene.remove_box(stale).unwrap();

        let shift = Affine2::from_translation(glam::DVec2::new(5.0, 0.0));
        assert!(scene.transform_boxes(&[bx, stale], &shift).is_err());
        assert_eq!(*scene.perspective(persp).unwrap().matrix(), matrix);
    }

    #[test]
    fn split_and_merge() {
        let (mut scene, persp, a) = scene_with_box();
        let b = scene.create_box(persp, c0(), Pt3::new(2.0, 2.0, 0.0, 1.0)).unwrap();

        let copy = scene.split_perspective(persp, &[b]).unwrap();
        assert_eq!(scene.perspective(persp).unwrap().boxes(), [a]);
        assert_eq!(scene.perspective(copy).unwrap().boxes(), [b]);
        assert!(scene.perspectives_coincide(persp, copy).unwrap());

        let merged = scene.merge_coinciding(&[persp, copy]).unwrap();
        assert_eq!(merged, [copy]);
        assert!(scene.perspective(copy).is_err());
        assert_eq!(scene.perspective(persp).unwrap().boxes(), [a, b]);
        assert_eq!(scene.box3d(b).unwrap().perspective(), persp);
    }

    #[test]
    fn split_rejects_foreign_boxes() {
        let (mut scene, _, bx) = scene_with_box();
        let other = scene.create_document_perspective(800.0, 600.0);
        assert!(scene.split_perspective(other, &[bx]).is_err());
    }

    #[test]
    fn merge_keeps_different_perspectives() {
        let mut scene = Scene::default();
        let a = scene.create_document_perspective(600.0, 400.0);
        let b = scene.create_document_perspective(800.0, 600.0);
        assert!(scene.merge_coinciding(&[a, b, a]).unwrap().is_empty());
        assert!(scene.perspective(b).is_ok());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn absorbing_a_different_perspective_is_a_contract_violation() {
        let mut scene = Scene::default();
        let a = scene.create_document_perspective(600.0, 400.0);
        let b = scene.create_document_perspective(800.0, 600.0);
        let _ = scene.absorb(a, b);
    }

    #[test]
    fn switching_with_recomputed_corners_keeps_the_drawing() {
        let (mut scene, _, bx) = scene_with_box();
        let other = scene.create_document_perspective(800.0, 500.0);
        let before = scene.face_outline(bx, Face::Front).unwrap();
        let (old0, _) = scene.box3d(bx).unwrap().corners();

        scene.switch_perspective(bx, other, true).unwrap();
        let after = scene.face_outline(bx, Face::Front).unwrap();
        // Corner 0 keeps its place, the front face is spanned from there.
        assert_abs_diff_eq!(after[0].x, before[0].x, epsilon = 1e-6);
        assert_abs_diff_eq!(after[0].y, before[0].y, epsilon = 1e-6);
        let (new0, _) = scene.box3d(bx).unwrap().corners();
        assert_abs_diff_eq!(new0.z, old0.z, epsilon = 1e-9);
    }

    #[test]
    fn switching_without_recomputing_keeps_the_coordinates() {
        let (mut scene, persp, bx) = scene_with_box();
        let other = scene.create_document_perspective(800.0, 500.0);
        scene.switch_perspective(bx, other, false).unwrap();
        assert_eq!(scene.box3d(bx).unwrap().corners(), (c0(), c7()));
        assert!(!scene.perspective(persp).unwrap().has_box(bx));
    }

    #[test]
    fn moving_a_corner_is_reported() {
        let (mut scene, persp, bx) = scene_with_box();
        scene.take_changes();
        let target = Pt3::new(2.0, 3.0, 0.0, 1.0);
        let screen = scene.perspective(persp).unwrap().matrix().image(&target).affine();

        assert!(scene.move_corner(bx, Axes::XYZ, screen, Axes::XY, false).unwrap());
        assert_eq!(scene.box3d(bx).unwrap().corners().1, target);
        assert_eq!(scene.take_changes()[0], SceneChange::Box(Change::Update(bx)));
        assert!(!scene.update_z_order(bx).unwrap());
    }

    #[test]
    fn outlines_are_listed_in_draw_order() {
        let (scene, _, bx) = scene_with_box();
        let outlines = scene.outlines_back_to_front(bx).unwrap();
        let faces: Vec<Face> = outlines.iter().map(|(face, _)| *face).collect();
        assert_eq!(
            faces,
            [Face::Rear, Face::Left, Face::Top, Face::Bottom, Face::Right, Face::Front]
        );
        for (face, outline) in outlines {
            assert_eq!(outline, scene.face_outline(bx, face).unwrap());
        }
    }

    fn c0() -> Pt3 {
        Pt3::new(0.0, 0.0, 1.0, 1.0)
    }

    fn c7() -> Pt3 {
        Pt3::new(1.0, 1.0, 0.0, 1.0)
    }

    fn scene_with_box() -> (Scene, PerspectiveId, BoxId) {
        let mut scene = Scene::default();
        let persp = scene.create_document_perspective(600.0, 400.0);
        let bx = scene.create_box(persp, c0(), c7()).unwrap();
        (scene, persp, bx)
    }
}
