//! Face visibility of a box, derived from the screen positions of the vanishing points relative
//! to the box corners.
//!
//! There is no depth involved. The order follows from sector and side tests around corner 3
//! (`X|Y`), the corner opposite corner 0 on the front face, and is looked up in [`RULES`].

use log::debug;
use vanishing_geometry::{Axis, Line, Point, Pt3, Vector, sector::lies_in_sector};

use crate::{Axes, FaceOrder, Perspective, PerspectiveLine, box3d::canonical_corners};
use Axis::{X, Y, Z};
use FiniteVps::{Many, One, Zero};

/// The reference corner.
const C3: Axes = Axes::XY;

/// How many vanishing points are finite.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FiniteVps {
    Zero,
    One,
    /// Two or three.
    Many,
}

/// A sector probe, evaluating to `1`, `0` or `-1`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Probe {
    /// With one finite vanishing point and the other axes `a1 < a2`: the finite vanishing point
    /// relative to the `a1` lines through corners 3 and `3 ^ a2`.
    Inside1,
    /// Same, with the roles of `a1` and `a2` exchanged.
    Inside2,
    /// The vanishing point of the first axis relative to the lines toward the second axis
    /// through corner 3 and the corner next to it along the remaining axis.
    XY,
    YX,
    YZ,
    ZY,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Sign {
    Positive,
    Negative,
    Zero,
    NonZero,
}

impl Sign {
    fn matches(self, value: i8) -> bool {
        match self {
            Sign::Positive => value > 0,
            Sign::Negative => value < 0,
            Sign::Zero => value == 0,
            Sign::NonZero => value != 0,
        }
    }
}

#[derive(Debug, Copy, Clone)]
pub struct Rule {
    pub finite: FiniteVps,
    pub central: Option<Axis>,
    /// `None` matches both.
    pub swapped: Option<bool>,
    pub condition: Option<(Probe, Sign)>,
    pub order: FaceOrder,
}

const fn rule(
    finite: FiniteVps,
    central: Option<Axis>,
    swapped: Option<bool>,
    condition: Option<(Probe, Sign)>,
    order: [u8; 6],
) -> Rule {
    Rule {
        finite,
        central,
        swapped,
        condition,
        order: FaceOrder::from_indices(order),
    }
}

const UNSWAPPED: Option<bool> = Some(false);
const SWAPPED: Option<bool> = Some(true);
const EITHER: Option<bool> = None;

/// The face orders, first match wins.
#[rustfmt::skip]
pub const RULES: &[Rule] = &[
    // All vanishing points at infinity.
    rule(Zero, Some(X), UNSWAPPED, None, [2, 0, 4, 1, 3, 5]),
    rule(Zero, Some(X), SWAPPED,   None, [3, 1, 5, 2, 4, 0]),
    rule(Zero, Some(Y), UNSWAPPED, None, [2, 3, 1, 4, 0, 5]),
    rule(Zero, Some(Y), SWAPPED,   None, [5, 0, 4, 1, 3, 2]),
    rule(Zero, Some(Z), UNSWAPPED, None, [2, 0, 1, 4, 3, 5]),
    rule(Zero, Some(Z), SWAPPED,   None, [5, 3, 4, 1, 0, 2]),
    rule(Zero, None,    UNSWAPPED, None, [2, 3, 4, 1, 0, 5]),
    rule(Zero, None,    SWAPPED,   None, [5, 0, 1, 4, 3, 2]),

    // One finite vanishing point.
    rule(One, Some(X), UNSWAPPED, None, [2, 4, 0, 1, 3, 5]),
    rule(One, Some(X), SWAPPED,   None, [5, 3, 1, 0, 2, 4]),
    rule(One, Some(Y), EITHER,    Some((Probe::Inside2, Sign::Positive)), [1, 2, 3, 0, 5, 4]),
    rule(One, Some(Y), EITHER,    Some((Probe::Inside2, Sign::Negative)), [2, 3, 1, 4, 0, 5]),
    rule(One, Some(Y), UNSWAPPED, None, [2, 3, 1, 5, 0, 4]),
    rule(One, Some(Y), SWAPPED,   None, [5, 0, 4, 1, 3, 2]),
    rule(One, Some(Z), UNSWAPPED, Some((Probe::Inside2, Sign::NonZero)), [2, 1, 3, 0, 4, 5]),
    rule(One, Some(Z), SWAPPED,   Some((Probe::Inside2, Sign::NonZero)), [5, 3, 4, 0, 1, 2]),
    rule(One, Some(Z), UNSWAPPED, Some((Probe::Inside1, Sign::NonZero)), [2, 0, 1, 4, 3, 5]),
    rule(One, Some(Z), SWAPPED,   Some((Probe::Inside1, Sign::NonZero)), [5, 3, 4, 1, 0, 2]),
    rule(One, Some(Z), UNSWAPPED, None, [0, 1, 2, 5, 4, 3]),
    rule(One, Some(Z), SWAPPED,   None, [5, 3, 4, 0, 2, 1]),
    rule(One, None,    UNSWAPPED, None, [2, 3, 4, 5, 0, 1]),
    rule(One, None,    SWAPPED,   None, [5, 0, 1, 3, 2, 4]),

    // Two or three finite vanishing points.
    rule(Many, Some(X), UNSWAPPED, Some((Probe::ZY, Sign::Negative)), [2, 4, 0, 1, 3, 5]),
    rule(Many, Some(X), UNSWAPPED, Some((Probe::XY, Sign::Positive)), [2, 4, 0, 5, 1, 3]),
    rule(Many, Some(X), UNSWAPPED, None, [2, 4, 0, 1, 3, 5]),
    rule(Many, Some(X), SWAPPED,   Some((Probe::YZ, Sign::Negative)), [3, 1, 5, 0, 2, 4]),
    rule(Many, Some(X), SWAPPED,   Some((Probe::XY, Sign::Zero)), [3, 5, 1, 0, 2, 4]),
    rule(Many, Some(X), SWAPPED,   None, [3, 1, 5, 0, 2, 4]),
    rule(Many, Some(Y), UNSWAPPED, Some((Probe::YZ, Sign::Positive)), [2, 3, 1, 0, 5, 4]),
    rule(Many, Some(Y), UNSWAPPED, None, [2, 3, 1, 5, 0, 4]),
    rule(Many, Some(Y), SWAPPED,   Some((Probe::YX, Sign::Positive)), [4, 0, 5, 1, 3, 2]),
    rule(Many, Some(Y), SWAPPED,   None, [5, 0, 4, 1, 3, 2]),
    rule(Many, Some(Z), UNSWAPPED, Some((Probe::ZY, Sign::Positive)), [2, 1, 0, 4, 3, 5]),
    rule(Many, Some(Z), UNSWAPPED, Some((Probe::XY, Sign::Negative)), [2, 1, 0, 5, 4, 3]),
    rule(Many, Some(Z), UNSWAPPED, None, [2, 0, 1, 5, 3, 4]),
    rule(Many, Some(Z), SWAPPED,   None, [3, 4, 5, 1, 0, 2]),
    rule(Many, None,    UNSWAPPED, None, [2, 3, 4, 1, 0, 5]),
    rule(Many, None,    SWAPPED,   None, [5, 0, 1, 4, 3, 2]),
];

/// The face order of the box spanned by `corner0` and `corner7`, in any orientation.
pub fn compute_face_order(
    perspective: &Perspective,
    corner0: &Pt3,
    corner7: &Pt3,
    tolerance: f64,
) -> FaceOrder {
    let (c0, c7, eversion) = canonical_corners(corner0, corner7);
    face_order_for(perspective, &c0, &c7, eversion, tolerance)
}

/// The face order of the box spanned by the canonically ordered `corner0` and `corner7`, with
/// the faces along the axes in `eversion` exchanged.
pub fn face_order_for(
    perspective: &Perspective,
    corner0: &Pt3,
    corner7: &Pt3,
    eversion: Axes,
    tolerance: f64,
) -> FaceOrder {
    let visibility = Visibility::new(perspective, corner0, corner7, tolerance);
    let mut order = visibility.face_order();
    for axis in Axis::SPATIAL {
        if eversion.contains(axis.into()) {
            order.swap_sides(axis);
        }
    }
    order
}

/// The sector tests for one box in one perspective.
pub struct Visibility<'a> {
    perspective: &'a Perspective,
    /// Screen positions of the eight corners, indexed by corner id.
    corners: [Point; 8],
    tolerance: f64,
}

impl<'a> Visibility<'a> {
    pub fn new(
        perspective: &'a Perspective,
        corner0: &Pt3,
        corner7: &Pt3,
        tolerance: f64,
    ) -> Self {
        let corners = std::array::from_fn(|id| {
            let corner = Pt3::from_corners(id as u8, corner0, corner7);
            perspective.matrix().image(&corner).affine()
        });
        Self {
            perspective,
            corners,
            tolerance,
        }
    }

    fn corner(&self, id: Axes) -> Point {
        self.corners[id.bits() as usize]
    }

    /// The axis whose perspective line from `from` lies between the other two, if any.
    pub fn central_axis(&self, from: Point) -> Option<Axis> {
        let [dx, dy, dz] = Axis::SPATIAL.map(|axis| self.perspective.pl_dir_from_pt(from, axis));
        if lies_in_sector(dx, dy, dz, self.tolerance) {
            Some(Axis::Z)
        } else if lies_in_sector(dy, dz, dx, self.tolerance) {
            Some(Axis::X)
        } else if lies_in_sector(dz, dx, dy, self.tolerance) {
            Some(Axis::Y)
        } else {
            None
        }
    }

    /// Whether the unit X and Y perspective line directions from corner 3 turn positively.
    pub fn xy_swapped(&self) -> bool {
        let c3 = self.corner(C3);
        let unit = |axis| {
            PerspectiveLine::new(c3, axis, self.perspective)
                .direction()
                .normalized()
                .unwrap_or(Vector::ZERO)
        };
        unit(Axis::X).cross(unit(Axis::Y)) > 0.0
    }

    /// Where `pt` lies relative to the sector of perspective lines toward `axis` through the
    /// corners `id1` and `id2`.
    ///
    /// For a finite vanishing point: `1` inside the sector, `0` outside. For an infinite one
    /// the sector is a strip: inside it, `1` if `pt` is on the same side of the edge
    /// `id1`-`id2` as the corner `id1 ^ axis`, `-1` if not, and `0` outside the strip.
    pub fn pt_in_pl_sector(&self, pt: Point, id1: Axes, id2: Axes, axis: Axis) -> i8 {
        let c1 = self.corner(id1);
        let c2 = self.corner(id2);

        if let Some(vp) = self.perspective.vp(axis).try_affine() {
            return lies_in_sector(c1 - vp, c2 - vp, pt - vp, self.tolerance) as i8;
        }

        let pl1 = PerspectiveLine::new(c1, axis, self.perspective);
        let pl2 = PerspectiveLine::new(c2, axis, self.perspective);
        if !(pl1.lie_on_same_side(pt, c2) && pl2.lie_on_same_side(pt, c1)) {
            return 0;
        }

        let edge = Line::through(c1, c2);
        let c3 = self.corner(id1 ^ Axes::from(axis));
        if edge.lie_on_same_side(pt, c3) { 1 } else { -1 }
    }

    /// [`Self::pt_in_pl_sector`] for the vanishing point of `vp_axis`, `0` if that one is
    /// infinite.
    pub fn vp_in_pl_sector(&self, vp_axis: Axis, id1: Axes, id2: Axes, axis: Axis) -> i8 {
        match self.perspective.vp(vp_axis).try_affine() {
            Some(vp) => self.pt_in_pl_sector(vp, id1, id2, axis),
            None => 0,
        }
    }

    fn probe(&self, probe: Probe, finite_axis: Option<Axis>) -> i8 {
        let c3 = C3;
        match probe {
            Probe::Inside1 | Probe::Inside2 => {
                let Some(finite_axis) = finite_axis else {
                    return 0;
                };
                let (a1, a2) = Axes::remaining(finite_axis);
                let (axis, other) = if probe == Probe::Inside1 {
                    (a1, a2)
                } else {
                    (a2, a1)
                };
                self.vp_in_pl_sector(finite_axis, c3, c3 ^ Axes::from(other), axis)
            }
            Probe::XY => self.vp_in_pl_sector(X, c3, c3 ^ Axes::Z, Y),
            Probe::YX => self.vp_in_pl_sector(Y, c3, c3 ^ Axes::Z, X),
            Probe::YZ => self.vp_in_pl_sector(Y, c3, c3 ^ Axes::X, Z),
            Probe::ZY => self.vp_in_pl_sector(Z, c3, c3 ^ Axes::X, Y),
        }
    }

    /// The face order of the canonically ordered box, without eversion.
    ///
    /// If corner 3 is drawn inside the triangle of three finite vanishing points, no axis is
    /// central and the order is the one of an axonometric box.
    pub fn face_order(&self) -> FaceOrder {
        let c3 = self.corner(C3);
        let finite = match self.perspective.finite_vp_count() {
            0 => Zero,
            1 => One,
            _ => Many,
        };
        let finite_axis = match finite {
            One => Axis::SPATIAL
                .into_iter()
                .find(|axis| self.perspective.vp_is_finite(*axis)),
            Zero | Many => None,
        };
        let central = self.central_axis(c3);
        let swapped = self.xy_swapped();

        let order = lookup(finite, central, swapped, |probe| self.probe(probe, finite_axis));
        debug!("Face order {order} ({finite:?} finite, central {central:?}, swapped {swapped})");
        order
    }
}

/// The order of the first rule in [`RULES`] matching the case, `probe` evaluates the
/// conditions.
pub fn lookup(
    finite: FiniteVps,
    central: Option<Axis>,
    swapped: bool,
    probe: impl Fn(Probe) -> i8,
) -> FaceOrder {
    RULES
        .iter()
        .find(|rule| {
            rule.finite == finite
                && rule.central == central
                && rule.swapped.is_none_or(|s| s == swapped)
                && rule
                    .condition
                    .is_none_or(|(p, sign)| sign.matches(probe(p)))
        })
        .map(|rule| rule.order)
        .unwrap_or_default()
}
