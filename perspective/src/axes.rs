//! Axis sets, corner ids and the six faces of a box.

use std::fmt;

use bitflags::bitflags;
use derive_more::Deref;
use vanishing_geometry::Axis;

bitflags! {
    /// A set of spatial axes.
    ///
    /// Also used as corner id: a set bit selects `corner7`'s coordinate on that axis, a cleared
    /// bit `corner0`'s. Corner 0 is the empty set and corner 7 is [`Axes::XYZ`].
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
    pub struct Axes: u8 {
        const X = 0b001;
        const Y = 0b010;
        const Z = 0b100;
        const XY = Self::X.bits() | Self::Y.bits();
        const XZ = Self::X.bits() | Self::Z.bits();
        const YZ = Self::Y.bits() | Self::Z.bits();
        const XYZ = Self::X.bits() | Self::Y.bits() | Self::Z.bits();
    }
}

impl Axes {
    /// The single spatial axis if exactly one is set.
    pub fn single(self) -> Option<Axis> {
        match self {
            Axes::X => Some(Axis::X),
            Axes::Y => Some(Axis::Y),
            Axes::Z => Some(Axis::Z),
            _ => None,
        }
    }

    /// The two axes not in `axis`, in ascending order.
    pub fn remaining(axis: Axis) -> (Axis, Axis) {
        match axis {
            Axis::X => (Axis::Y, Axis::Z),
            Axis::Y => (Axis::X, Axis::Z),
            Axis::Z | Axis::W => (Axis::X, Axis::Y),
        }
    }

    /// All eight corner ids.
    pub fn corners() -> impl Iterator<Item = Axes> {
        (0..8).map(Axes::from_bits_truncate)
    }
}

impl From<Axis> for Axes {
    fn from(axis: Axis) -> Self {
        match axis {
            Axis::X => Axes::X,
            Axis::Y => Axes::Y,
            Axis::Z => Axes::Z,
            Axis::W => Axes::empty(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Face {
    Left = 0,
    Top = 1,
    Front = 2,
    Right = 3,
    Bottom = 4,
    Rear = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::Left,
        Face::Top,
        Face::Front,
        Face::Right,
        Face::Bottom,
        Face::Rear,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// The two axes spanning the plane of the face.
    pub fn plane(self) -> Axes {
        match self {
            Face::Left | Face::Right => Axes::YZ,
            Face::Top | Face::Bottom => Axes::XZ,
            Face::Front | Face::Rear => Axes::XY,
        }
    }

    /// Faces on `corner7`'s side of the box.
    pub fn is_rear(self) -> bool {
        self.index() >= 3
    }

    /// The four corner ids of the face in cyclic order.
    pub fn corners(self) -> [Axes; 4] {
        let plane = self.plane();
        let orth = Axes::XYZ - plane;
        let (dir1, dir2) = match orth.single() {
            Some(axis) => Axes::remaining(axis),
            None => (Axis::X, Axis::Y),
        };
        let (dir1, dir2) = (Axes::from(dir1), Axes::from(dir2));
        let c0 = if self.is_rear() { orth } else { Axes::empty() };
        [c0, c0 ^ dir1, c0 ^ dir1 ^ dir2, c0 ^ dir2]
    }
}

/// The visibility order of the six faces of a box, frontmost first.
///
/// The renderer lowers the faces to the bottom one after the other in this order, so the last
/// face ends up at the very back.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Deref)]
pub struct FaceOrder([Face; 6]);

impl FaceOrder {
    /// Build an order from face indices.
    ///
    /// In const contexts an invalid index fails compilation.
    pub const fn from_indices(indices: [u8; 6]) -> Self {
        let mut faces = [Face::Left; 6];
        let mut i = 0;
        while i < 6 {
            faces[i] = Face::ALL[indices[i] as usize];
            i += 1;
        }
        Self(faces)
    }

    pub fn indices(&self) -> [usize; 6] {
        self.0.map(Face::index)
    }

    pub fn position(&self, face: Face) -> Option<usize> {
        self.0.iter().position(|f| *f == face)
    }

    /// The draw order: backmost face first.
    pub fn back_to_front(&self) -> impl Iterator<Item = Face> + '_ {
        self.0.iter().rev().copied()
    }

    pub fn is_permutation(&self) -> bool {
        Face::ALL.iter().all(|face| self.position(*face).is_some())
    }

    /// Exchange the two faces whose planes do not contain `axis`, i.e. the pair of faces
    /// opposite along `axis`.
    pub fn swap_sides(&mut self, axis: Axis) {
        let axis = Axes::from(axis);
        let mut positions = self
            .0
            .iter()
            .enumerate()
            .filter(|(_, face)| !face.plane().contains(axis))
            .map(|(i, _)| i);
        if let (Some(a), Some(b)) = (positions.next(), positions.next()) {
            self.0.swap(a, b);
        }
    }
}

impl Default for FaceOrder {
    fn default() -> Self {
        Self::from_indices([0, 1, 2, 3, 4, 5])
    }
}

impl fmt::Display for FaceOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.indices();
        write!(f, "{{{a},{b},{c},{d},{e},{g}}}")
    }
}
