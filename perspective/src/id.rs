use derive_more::{Deref, Display, From};
use serde::{Deserialize, Serialize};

/// An identifier of an object in the scene.
///
/// Ids start at 0 and released ids are reused, so they stay small and dense.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deref, Display, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Id(u32);

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deref, From, Display, Serialize, Deserialize,
)]
#[display("perspective#{_0}")]
#[serde(transparent)]
pub struct PerspectiveId(Id);

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deref, From, Display, Serialize, Deserialize,
)]
#[display("box#{_0}")]
#[serde(transparent)]
pub struct BoxId(Id);

#[derive(Debug, Default)]
pub struct Generator {
    next_id: u32,
    free_list: Vec<u32>,
}

impl Generator {
    pub fn acquire(&mut self) -> Id {
        if let Some(free) = self.free_list.pop() {
            return Id(free);
        }

        let this_id = self.next_id;
        self.next_id += 1;

        Id(this_id)
    }

    pub fn release(&mut self, id: Id) {
        self.free_list.push(id.0);
    }

    /// Make sure `id` will not be handed out again. Used when objects are restored with
    /// previously persisted ids.
    pub fn reserve(&mut self, id: Id) {
        self.free_list.retain(|free| *free != id.0);
        if id.0 >= self.next_id {
            self.free_list.extend(self.next_id..id.0);
            self.next_id = id.0 + 1;
        }
    }
}
