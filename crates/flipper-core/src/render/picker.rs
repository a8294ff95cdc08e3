//! Picker registry: the side table resolving "what was clicked".
//!
//! During a hit-test pass every display-list invocation draws with a
//! unique ID; the off-screen pass reads the ID back under the cursor
//! and this registry maps it to the entity/stream/list that drew it.
//! Append-only within a frame; the list index is the stable ID.

use crate::scene::entity::EntityId;

/// Stable picker identifier: the index into the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PickerId(pub u32);

/// Provenance of one pickable draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerObject {
    pub entity: EntityId,
    /// Which visual stream of the entity issued the draw.
    pub stream: usize,
    /// Which display list within the stream.
    pub list: usize,
}

#[derive(Default)]
pub struct PickerRegistry {
    objects: Vec<PickerObject>,
}

impl PickerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all registrations; IDs restart from zero. Called at the
    /// start of each hit-test pass.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    pub fn register(&mut self, object: PickerObject) -> PickerId {
        let id = PickerId(self.objects.len() as u32);
        self.objects.push(object);
        id
    }

    pub fn get(&self, id: PickerId) -> Option<&PickerObject> {
        self.objects.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
