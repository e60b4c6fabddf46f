use crate::api::types::{EntityId, MeshId};
use crate::components::entity::Entity;
use crate::geometry::mesh::MeshData;

/// Entity storage using a flat Vec, plus the meshes those entities reference.
/// Entities are spawned once at startup and mutated in place afterwards.
pub struct Scene {
    entities: Vec<Entity>,
    meshes: Vec<MeshData>,
    next_id: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self::with_capacity(16)
    }

    /// Pre-size for `capacity` entities.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entities: Vec::with_capacity(capacity),
            meshes: Vec::new(),
            next_id: 1,
        }
    }

    /// Generate the next unique entity ID.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Insert `entity` and return its id.
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        let id = entity.id;
        self.entities.push(entity);
        id
    }

    /// Register a mesh; the returned handle stays valid for the scene's lifetime.
    pub fn add_mesh(&mut self, mesh: MeshData) -> MeshId {
        let id = MeshId(self.meshes.len() as u32);
        self.meshes.push(mesh);
        id
    }

    pub fn mesh(&self, id: MeshId) -> Option<&MeshData> {
        self.meshes.get(id.0 as usize)
    }

    /// All registered meshes with their handles, in registration order.
    pub fn meshes(&self) -> impl Iterator<Item = (MeshId, &MeshData)> {
        self.meshes.iter().enumerate().map(|(i, m)| (MeshId(i as u32), m))
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Tags are unique per scene in practice; the first match wins.
    pub fn find_by_tag(&self, tag: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.tag == tag)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::primitives::uv_sphere;
    use glam::Vec3;

    #[test]
    fn spawn_and_get() {
        let mut scene = Scene::new();
        let id = scene.next_id();
        scene.spawn(Entity::new(id).with_pos(Vec3::new(10.0, 20.0, 30.0)));
        let e = scene.get(id).unwrap();
        assert_eq!(e.pos, Vec3::new(10.0, 20.0, 30.0));
    }

    #[test]
    fn ids_are_unique() {
        let mut scene = Scene::new();
        assert_ne!(scene.next_id(), scene.next_id());
    }

    #[test]
    fn find_by_tag() {
        let mut scene = Scene::new();
        let earth = scene.next_id();
        let moon = scene.next_id();
        scene.spawn(Entity::new(earth).with_tag("earth"));
        scene.spawn(Entity::new(moon).with_tag("moon"));
        assert_eq!(scene.find_by_tag("moon").unwrap().id, moon);
        assert!(scene.find_by_tag("mars").is_none());
    }

    #[test]
    fn meshes_keep_registration_order() {
        let mut scene = Scene::new();
        let a = scene.add_mesh(uv_sphere(1.0, 8, 8));
        let b = scene.add_mesh(uv_sphere(2.0, 8, 8));
        assert_eq!(a, MeshId(0));
        assert_eq!(b, MeshId(1));
        let ids: Vec<MeshId> = scene.meshes().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, b]);
        assert!(scene.mesh(MeshId(5)).is_none());
    }
}
