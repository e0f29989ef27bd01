//! Boxes drawn in a three point perspective.
//!
//! A [`Perspective`] maps 3-space onto the drawing surface through three vanishing points and
//! an origin. A [`Box3D`] is spanned by two opposite corners in 3-space and is drawn as six
//! faces, stacked in the order computed by [`z_order`]. The [`Scene`] owns both and keeps the
//! boxes up to date when their perspective changes.

mod axes;
mod box3d;
mod change;
mod config;
mod drag;
mod id;
mod perspective;
mod perspective_line;
pub mod record;
mod scene;
pub mod snap;
pub mod z_order;

pub use axes::*;
pub use box3d::{Box3D, canonical_corners, eversion};
pub use change::*;
pub use config::*;
pub use drag::*;
pub use id::*;
pub use perspective::*;
pub use perspective_line::*;
pub use scene::*;
