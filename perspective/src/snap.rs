//! Constrained dragging: the dragged point is pulled onto a line through the drag start that
//! runs along X, along Y or along one of the box diagonals in the XY plane.

use vanishing_geometry::{Line, Point, Pt3};

use crate::{Axes, Perspective};

#[derive(Debug, Clone)]
pub struct SnapLines {
    lines: Vec<Line>,
}

impl SnapLines {
    /// The snapping lines through `start`.
    ///
    /// `extent` is the X/Y extent of the box at the start of the drag. `dragged` is the corner
    /// being dragged, or `None` for the center, which can snap to both diagonals.
    pub fn new(
        perspective: &Perspective,
        start: &Pt3,
        extent: (f64, f64),
        dragged: Option<Axes>,
    ) -> Self {
        let start = start.normalized();
        let (dx, dy) = extent;
        let screen = |x: f64, y: f64| {
            let p = Pt3::new(start.x + x, start.y + y, start.z, 1.0);
            perspective.matrix().image(&p).affine()
        };

        let a = screen(0.0, 0.0);
        let b = screen(dx, 0.0);
        let c = screen(dx, dy);
        let d = screen(0.0, dy);
        let e = screen(-dx, dy);

        let main_diagonal = match dragged {
            None => true,
            Some(id) => id.contains(Axes::X) == id.contains(Axes::Y),
        };

        let mut lines = vec![
            Line::through(a, b),
            Line::through(a, d),
            Line::through(a, if main_diagonal { c } else { e }),
        ];
        if dragged.is_none() {
            lines.push(Line::through(a, e));
        }
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Project `pt` onto the nearest line.
    ///
    /// While `pt` is within `tolerance` of every line, the line at `remembered` is used instead,
    /// so the snapping direction does not flip around near the start point. Otherwise
    /// `remembered` is updated to the nearest line.
    pub fn snap(&self, pt: Point, remembered: &mut usize, tolerance: f64) -> Point {
        let candidates: Vec<(Point, f64)> = self
            .lines
            .iter()
            .map(|line| {
                let snapped = line.closest_to(pt);
                (snapped, snapped.distance(pt))
            })
            .collect();

        let within_tolerance = candidates.iter().all(|(_, dist)| *dist <= tolerance);
        if within_tolerance {
            if let Some((snapped, _)) = candidates.get(*remembered) {
                return *snapped;
            }
        }

        let nearest = candidates
            .iter()
            .enumerate()
            .min_by(|(_, (_, a)), (_, (_, b))| a.total_cmp(b));
        match nearest {
            Some((index, (snapped, _))) => {
                *remembered = index;
                *snapped
            }
            None => pt,
        }
    }
}
