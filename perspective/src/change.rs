use std::mem;

use derive_more::From;

use crate::{BoxId, FaceOrder, PerspectiveId};

/// A notification for the rendering collaborator.
#[derive(Debug, Clone, PartialEq, From)]
pub enum SceneChange {
    Perspective(Change<PerspectiveId>),
    /// The outline of a box changed.
    Box(Change<BoxId>),
    /// The faces of a box need to be restacked.
    FaceOrder(BoxId, FaceOrder),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Change<I> {
    Create(I),
    Update(I),
    Delete(I),
}

impl<I: Copy> Change<I> {
    pub fn id(&self) -> I {
        match *self {
            Change::Create(id) => id,
            Change::Update(id) => id,
            Change::Delete(id) => id,
        }
    }
}

#[derive(Debug, Default)]
pub struct ChangeTracker(Vec<SceneChange>);

impl ChangeTracker {
    pub fn push(&mut self, change: impl Into<SceneChange>) {
        self.0.push(change.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn take_all(&mut self) -> Vec<SceneChange> {
        mem::take(&mut self.0)
    }
}
