use std::collections::BTreeMap;
use bevy_ecs::prelude::*;

use crate::mesh::Mesh;


/// Renderable objects of an entity, stored under named slots.
///
/// Several components can contribute to the same entity as long as they use
/// different slot names.
#[derive(Component, Debug, Default)]
pub struct Object3D {
    slots: BTreeMap<String, Mesh>,
}

impl Object3D {
    pub const MESH: &'static str = "mesh";

    pub fn with(slot: &str, mesh: Mesh) -> Self {
        let mut object = Self::default();
        object.set(slot, mesh);
        object
    }

    /// Returns the mesh previously stored under `slot`.
    pub fn set(&mut self, slot: &str, mesh: Mesh) -> Option<Mesh> {
        self.slots.insert(slot.to_string(), mesh)
    }

    pub fn get(&self, slot: &str) -> Option<&Mesh> {
        self.slots.get(slot)
    }

    pub fn remove(&mut self, slot: &str) -> Option<Mesh> {
        self.slots.remove(slot)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
