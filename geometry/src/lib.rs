//! Projective geometry primitives for perspective drawing.

mod homogeneous;
mod line;
mod point;
pub mod sector;
pub mod solver;
mod transform_matrix;

pub use homogeneous::*;
pub use line::*;
pub use point::*;
pub use solver::{Pin, Solution, SolutionKind};
pub use transform_matrix::*;

/// Affine maps of the drawing surface.
pub type Affine2 = glam::DAffine2;
