use crate::api::config::Rgb;
use crate::api::types::Viewport;
use crate::assets::textures::TextureRegistry;
use crate::components::mesh::BlendMode;
use crate::core::scene::Scene;
use crate::geometry::mesh::Topology;
use crate::renderer::camera::PerspectiveCamera;
use crate::renderer::traits::{DrawItem, FrameData, LightingState, LineStrip};

/// Per-frame inputs that do not live in the scene.
pub struct FrameInputs<'a> {
    pub camera: &'a PerspectiveCamera,
    pub viewport: Viewport,
    pub lighting: &'a LightingState,
    pub textures: &'a TextureRegistry,
    pub clear_color: Rgb,
    pub lines: Vec<LineStrip>,
}

/// Build the frame from the scene's active mesh entities.
/// Groups draws into opaque, translucent (sorted far-to-near) and point
/// lists. Textures that are not loaded yet are dropped from the material so
/// the backend draws the flat colour.
pub fn build_frame(scene: &Scene, inputs: FrameInputs<'_>) -> FrameData {
    let FrameInputs { camera, viewport, lighting, textures, clear_color, lines } = inputs;

    let mut opaque = Vec::new();
    let mut translucent: Vec<(f32, DrawItem)> = Vec::new();
    let mut points = Vec::new();

    for entity in scene.iter() {
        if !entity.active {
            continue;
        }
        let component = match &entity.mesh {
            Some(m) => m,
            None => continue,
        };
        let topology = match scene.mesh(component.mesh) {
            Some(mesh) => mesh.topology,
            None => continue,
        };

        let mut material = component.material.clone();
        if let Some(tex) = material.texture {
            if !textures.is_ready(tex) {
                material.texture = None;
            }
        }

        let item = DrawItem {
            mesh: component.mesh,
            model: entity.model_matrix(),
            material,
        };

        match (topology, item.material.blend) {
            (Topology::Points, _) => points.push(item),
            (Topology::Triangles, BlendMode::Opaque) => opaque.push(item),
            (Topology::Triangles, BlendMode::Alpha) => {
                let depth = entity.pos.distance_squared(camera.position);
                translucent.push((depth, item));
            }
        }
    }

    translucent.sort_by(|a, b| b.0.total_cmp(&a.0));

    FrameData {
        view: camera.view_matrix(),
        projection: camera.projection_matrix(),
        camera_position: camera.position,
        viewport,
        clear_color,
        lighting: lighting.clone(),
        opaque,
        translucent: translucent.into_iter().map(|(_, item)| item).collect(),
        points,
        lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::CameraConfig;
    use crate::components::entity::Entity;
    use crate::components::mesh::{Material, MeshComponent};
    use crate::geometry::mesh::MeshData;
    use crate::geometry::primitives::uv_sphere;
    use glam::Vec3;

    fn camera() -> PerspectiveCamera {
        let mut cam = PerspectiveCamera::new(&CameraConfig::default(), Viewport::new(800.0, 600.0)).unwrap();
        cam.position = Vec3::new(0.0, 0.0, 100.0);
        cam
    }

    fn inputs<'a>(
        cam: &'a PerspectiveCamera,
        lighting: &'a LightingState,
        textures: &'a TextureRegistry,
    ) -> FrameInputs<'a> {
        FrameInputs {
            camera: cam,
            viewport: Viewport::new(800.0, 600.0),
            lighting,
            textures,
            clear_color: Rgb::BLACK,
            lines: Vec::new(),
        }
    }

    #[test]
    fn groups_by_topology_and_blend() {
        let mut scene = Scene::new();
        let sphere = scene.add_mesh(uv_sphere(1.0, 8, 8));
        let stars = scene.add_mesh(MeshData::points(&[Vec3::ZERO, Vec3::ONE]));

        let id = scene.next_id();
        scene.spawn(Entity::new(id).with_mesh(MeshComponent::new(sphere, Material::standard(Rgb::WHITE))));
        let id = scene.next_id();
        scene.spawn(
            Entity::new(id)
                .with_pos(Vec3::new(0.0, 0.0, 90.0))
                .with_mesh(MeshComponent::new(sphere, Material::translucent(Rgb::WHITE, 0.3))),
        );
        let id = scene.next_id();
        scene.spawn(
            Entity::new(id)
                .with_pos(Vec3::new(0.0, 0.0, -50.0))
                .with_mesh(MeshComponent::new(sphere, Material::translucent(Rgb::WHITE, 0.3))),
        );
        let id = scene.next_id();
        scene.spawn(Entity::new(id).with_mesh(MeshComponent::new(stars, Material::points(Rgb::WHITE, 0.5))));
        let id = scene.next_id();
        scene.spawn(Entity::new(id).with_tag("empty"));

        let cam = camera();
        let lighting = LightingState::default();
        let textures = TextureRegistry::new();
        let frame = build_frame(&scene, inputs(&cam, &lighting, &textures));

        assert_eq!(frame.opaque.len(), 1);
        assert_eq!(frame.points.len(), 1);
        assert_eq!(frame.translucent.len(), 2);
        // Farther translucent entity is drawn first.
        assert_eq!(frame.translucent[0].model.w_axis.z, -50.0);
        assert_eq!(frame.translucent[1].model.w_axis.z, 90.0);
    }

    #[test]
    fn inactive_entities_are_skipped() {
        let mut scene = Scene::new();
        let sphere = scene.add_mesh(uv_sphere(1.0, 8, 8));
        let id = scene.next_id();
        let mut e = Entity::new(id).with_mesh(MeshComponent::new(sphere, Material::standard(Rgb::WHITE)));
        e.active = false;
        scene.spawn(e);

        let cam = camera();
        let lighting = LightingState::default();
        let textures = TextureRegistry::new();
        let frame = build_frame(&scene, inputs(&cam, &lighting, &textures));
        assert_eq!(frame.draw_count(), 0);
    }

    #[test]
    fn pending_texture_falls_back_to_flat_colour() {
        let mut scene = Scene::new();
        let sphere = scene.add_mesh(uv_sphere(1.0, 8, 8));
        let mut textures = TextureRegistry::new();
        let tex = textures.register("textures/earth.jpg");
        let id = scene.next_id();
        scene.spawn(Entity::new(id).with_mesh(MeshComponent::new(
            sphere,
            Material::standard(Rgb::WHITE).with_texture(Some(tex)),
        )));

        let cam = camera();
        let lighting = LightingState::default();
        let frame = build_frame(&scene, inputs(&cam, &lighting, &textures));
        assert_eq!(frame.opaque[0].material.texture, None);

        textures.mark_loaded(tex);
        let frame = build_frame(&scene, inputs(&cam, &lighting, &textures));
        assert_eq!(frame.opaque[0].material.texture, Some(tex));

        textures.mark_failed(tex);
        let frame = build_frame(&scene, inputs(&cam, &lighting, &textures));
        assert_eq!(frame.opaque[0].material.texture, None);
    }
}
