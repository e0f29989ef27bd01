//! Drags a box corner and a vanishing point across the canvas and prints how the faces are
//! stacked.
//!
//! Run with `RUST_LOG=debug` to see skipped frames and solver diagnostics.

use anyhow::Result;
use vanishing_geometry::{Axis, Point, Pt3};
use vanishing_perspective::{Axes, DragEvent, Scene};

fn main() -> Result<()> {
    env_logger::init();

    let mut scene = Scene::default();
    let persp = scene.create_document_perspective(600.0, 400.0);
    let bx = scene.create_box_in_current(
        Pt3::new(0.0, 0.0, 1.0, 1.0),
        Pt3::new(1.0, 1.0, 0.0, 1.0),
    )?;
    println!("{bx} in {persp}: {}", scene.face_order(bx)?);

    let drag = scene.begin_corner_drag(bx, Axes::XYZ, Axes::XY, true)?;
    for step in 0..8 {
        let pt = Point::new(150.0 - 40.0 * step as f64, 300.0 + 25.0 * step as f64);
        if !scene.drive_corner_drag(&drag, DragEvent::Proceed(pt))? {
            println!("  skipped {pt:?}");
            continue;
        }
        let (_, corner7) = scene.box3d(bx)?.corners();
        println!("  corner 7 at {corner7}, faces {}", scene.face_order(bx)?);
    }
    scene.drive_corner_drag(&drag, DragEvent::Commit)?;

    scene.rotate_vp(persp, Axis::Y, 15.0, false)?;
    println!("after rotating Y: {}", scene.face_order(bx)?);

    let mut drag = scene.begin_vp_drag(persp, Axis::Z, &[bx], false)?;
    for step in 1..=4 {
        let pt = Point::new(600.0 - 60.0 * step as f64, 200.0 + 10.0 * step as f64);
        scene.drive_vp_drag(&mut drag, DragEvent::Proceed(pt))?;
        println!("  Z vanishing at {pt:?}, faces {}", scene.face_order(bx)?);
    }
    scene.drive_vp_drag(&mut drag, DragEvent::Commit)?;

    for (face, outline) in scene.outlines_back_to_front(bx)? {
        println!("  {face:?}: {outline:?}");
    }

    for change in scene.take_changes() {
        log::debug!("{change:?}");
    }
    Ok(())
}
