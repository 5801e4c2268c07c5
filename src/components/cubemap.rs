use std::collections::HashMap;
use bevy_ecs::prelude::*;
use log::{debug, info, warn};

use crate::components::{NameMap, Object3D, CUBE_ORDER};
use crate::error::CubemapError;
use crate::geometry::BoxGeometry;
use crate::loader::{CubeTextureHandle, CubeTextureLoader};
use crate::material::{ShaderLib, Side, UniformValue};
use crate::mesh::Mesh;


pub const DEFAULT_EDGE_LENGTH: u32 = 5000;

/// Skybox built from six images in `folder`.
///
/// Configured like an html attribute:
/// `"folder: skies/sunset/; edgeLength: 2000; nameMap: posx=right negx=left"`.
/// Adding the component attaches a skybox mesh to the entity's `Object3D`
/// under [`Object3D::MESH`], changing it rebuilds that mesh and removing it
/// takes the mesh away again.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Cubemap {
    pub folder: String,
    pub edge_length: u32,
    pub name_map: NameMap,
}

impl Default for Cubemap {
    fn default() -> Self {
        Self {
            folder: String::new(),
            edge_length: DEFAULT_EDGE_LENGTH,
            name_map: NameMap::default(),
        }
    }
}

// Configuration and texture each entity's skybox was built from, so
// unchanged writes are not rebuilt and the texture can be released on
// rebuild or removal even after the entity itself is gone
#[derive(Resource, Default)]
pub struct AttachedCubemaps {
    attached: HashMap<Entity, Attached>,
}

struct Attached {
    config: Cubemap,
    texture: Option<CubeTextureHandle>,
}

impl AttachedCubemaps {
    pub fn texture(&self, entity: Entity) -> Option<CubeTextureHandle> {
        self.attached.get(&entity).and_then(|a| a.texture)
    }

    pub fn config(&self, entity: Entity) -> Option<&Cubemap> {
        self.attached.get(&entity).map(|a| &a.config)
    }

    pub fn len(&self) -> usize {
        self.attached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }
}

impl Cubemap {
    pub fn new(folder: &str) -> Self {
        Self {
            folder: folder.to_string(),
            ..Default::default()
        }
    }

    pub fn from_attributes(attributes: &str) -> Result<Self, CubemapError> {
        let mut cubemap = Self::default();
        cubemap.apply_attributes(attributes)?;
        Ok(cubemap)
    }

    /// Merge `key: value` pairs separated by `;` into this configuration.
    /// Keys that are not mentioned keep their current value. On error
    /// nothing is changed.
    pub fn apply_attributes(&mut self, attributes: &str) -> Result<(), CubemapError> {
        let mut updated = self.clone();
        for declaration in attributes.split(';') {
            let declaration = declaration.trim();
            if declaration.is_empty() {
                continue;
            }
            let Some((key, value)) = declaration.split_once(':') else {
                warn!("cubemap: ignoring `{declaration}`, expected key: value");
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "folder" => updated.folder = value.to_string(),
                "edgeLength" => updated.edge_length = parse_edge_length(value)?,
                "nameMap" => updated.name_map = NameMap::parse(value),
                other => warn!("cubemap: ignoring unknown attribute `{other}`"),
            }
        }
        *self = updated;
        Ok(())
    }

    /// `folder + stem + ".jpg"` for each face, in `CUBE_ORDER`.
    pub fn face_urls(&self) -> [String; 6] {
        CUBE_ORDER.map(|face| format!("{}{}.jpg", self.folder, self.name_map.stem(face)))
    }

    pub fn build_mesh(
        &self,
        loader: &mut CubeTextureLoader,
        shader_lib: &ShaderLib,
    ) -> Result<Mesh, CubemapError> {
        let mut material = shader_lib.instantiate(ShaderLib::CUBE)?;
        material.depth_write = false;
        material.side = Side::Back;

        let cube_texture = loader.load(self.face_urls());
        material.set_uniform("tCube", UniformValue::CubeTexture(Some(cube_texture)));

        Ok(Mesh::new(BoxGeometry::cube(self.edge_length), material))
    }

    /// Add the cubemap lifecycle systems to `schedule`.
    ///
    /// Fails if the host resources the systems rely on are not in `world` yet.
    pub fn register(world: &mut World, schedule: &mut Schedule) -> Result<(), CubemapError> {
        if !world.contains_resource::<ShaderLib>() {
            return Err(CubemapError::HostUnavailable("ShaderLib"));
        }
        if !world.contains_resource::<CubeTextureLoader>() {
            return Err(CubemapError::HostUnavailable("CubeTextureLoader"));
        }
        world.init_resource::<AttachedCubemaps>();
        schedule.add_systems((Cubemap::detach, Cubemap::attach).chain());
        Ok(())
    }

    pub fn attach(
        mut commands: Commands,
        mut loader: ResMut<CubeTextureLoader>,
        shader_lib: Res<ShaderLib>,
        mut attached: ResMut<AttachedCubemaps>,
        mut cubemaps: Query<(Entity, &Cubemap, Option<&mut Object3D>), Changed<Cubemap>>,
    ) {
        for (entity, cubemap, object3d) in cubemaps.iter_mut() {
            // Written through `Mut` without a real change, e.g. a rejected reconfiguration
            if attached.config(entity) == Some(cubemap) {
                debug!("cubemap {entity:?}: configuration unchanged, keeping skybox");
                continue;
            }
            let mesh = match cubemap.build_mesh(&mut loader, &shader_lib) {
                Ok(mesh) => mesh,
                Err(e) => {
                    warn!("cubemap {entity:?}: {e}");
                    continue;
                }
            };
            info!(
                "cubemap {entity:?}: attaching skybox from `{}` (edge {})",
                cubemap.folder, cubemap.edge_length
            );

            let texture = mesh.cube_texture();
            match object3d {
                Some(mut object3d) => {
                    if object3d.set(Object3D::MESH, mesh).is_some() {
                        debug!("cubemap {entity:?}: replaced previous mesh");
                    }
                }
                None => {
                    commands.entity(entity).insert(Object3D::with(Object3D::MESH, mesh));
                }
            }

            let previous = attached.attached.insert(
                entity,
                Attached {
                    config: cubemap.clone(),
                    texture,
                },
            );
            if let Some(previous) = previous.and_then(|a| a.texture) {
                loader.release(previous);
            }
        }
    }

    pub fn detach(
        mut removed: RemovedComponents<Cubemap>,
        mut loader: ResMut<CubeTextureLoader>,
        mut attached: ResMut<AttachedCubemaps>,
        mut objects: Query<&mut Object3D>,
        cubemaps: Query<(), With<Cubemap>>,
    ) {
        for entity in removed.iter() {
            // Removed and added again before this ran: attach rebuilds it
            if cubemaps.contains(entity) {
                continue;
            }
            if let Ok(mut object3d) = objects.get_mut(entity) {
                if object3d.remove(Object3D::MESH).is_some() {
                    info!("cubemap {entity:?}: detached skybox");
                }
            }
            if let Some(texture) = attached.attached.remove(&entity).and_then(|a| a.texture) {
                loader.release(texture);
            }
        }
    }
}

fn parse_edge_length(value: &str) -> Result<u32, CubemapError> {
    match value.parse::<u32>() {
        Ok(edge) if edge > 0 => Ok(edge),
        _ => Err(CubemapError::InvalidAttribute {
            attribute: "edgeLength".to_string(),
            value: value.to_string(),
        }),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::CubeFace;

    #[test]
    fn default_urls_use_face_keys() {
        let cubemap = Cubemap::new("skies/");
        assert_eq!(
            cubemap.face_urls(),
            [
                "skies/posx.jpg",
                "skies/negx.jpg",
                "skies/posy.jpg",
                "skies/negy.jpg",
                "skies/posz.jpg",
                "skies/negz.jpg",
            ]
            .map(String::from)
        );
        assert_eq!(cubemap.edge_length, DEFAULT_EDGE_LENGTH);
    }

    #[test]
    fn full_name_map_replaces_every_stem() {
        let cubemap = Cubemap::from_attributes(
            "folder: sky/; nameMap: posx=r negx=l posy=u negy=d posz=f negz=b",
        )
        .unwrap();
        let stems = ["r", "l", "u", "d", "f", "b"];
        for (url, stem) in cubemap.face_urls().iter().zip(stems) {
            assert_eq!(*url, format!("sky/{stem}.jpg"));
        }
    }

    #[test]
    fn folder_is_used_verbatim() {
        // no separator is inserted between folder and stem
        let cubemap = Cubemap::from_attributes("folder: https://cdn.example.com/sky_").unwrap();
        assert_eq!(cubemap.face_urls()[0], "https://cdn.example.com/sky_posx.jpg");
    }

    #[test]
    fn edge_length_defaults_and_overrides() {
        assert_eq!(Cubemap::from_attributes("folder: a/").unwrap().edge_length, 5000);
        assert_eq!(Cubemap::from_attributes("edgeLength: 120").unwrap().edge_length, 120);
    }

    #[test]
    fn invalid_edge_length_is_rejected() {
        for bad in ["0", "-5", "big", "1.5"] {
            let err = Cubemap::from_attributes(&format!("edgeLength: {bad}")).unwrap_err();
            assert!(matches!(err, CubemapError::InvalidAttribute { ref value, .. } if value == bad));
        }
    }

    #[test]
    fn apply_attributes_merges_and_is_atomic() {
        let mut cubemap = Cubemap::from_attributes("folder: a/; nameMap: posz=front").unwrap();
        cubemap.apply_attributes("edgeLength: 10").unwrap();
        assert_eq!(cubemap.folder, "a/");
        assert_eq!(cubemap.edge_length, 10);
        assert_eq!(cubemap.name_map.stem(CubeFace::PosZ), "front");

        assert!(cubemap.apply_attributes("folder: b/; edgeLength: nope").is_err());
        assert_eq!(cubemap.folder, "a/");
    }

    #[test]
    fn unknown_attributes_are_ignored() {
        let cubemap = Cubemap::from_attributes("folder: a/; color: red; junk").unwrap();
        assert_eq!(cubemap.folder, "a/");
    }

    #[test]
    fn build_mesh_binds_requested_texture() {
        let mut loader = CubeTextureLoader::new();
        let shader_lib = ShaderLib::builtin();
        let cubemap = Cubemap::from_attributes("folder: sky/; edgeLength: 300").unwrap();

        let mesh = cubemap.build_mesh(&mut loader, &shader_lib).unwrap();
        let texture = mesh.cube_texture().unwrap();
        assert_eq!(loader.urls(texture), Some(&cubemap.face_urls()));
        assert_eq!(mesh.geometry.width, 300.0);
        assert_eq!(mesh.material.side, Side::Back);
        assert!(!mesh.material.depth_write);
    }

    #[test]
    fn skyboxes_do_not_share_bindings() {
        let mut loader = CubeTextureLoader::new();
        let shader_lib = ShaderLib::builtin();
        let a = Cubemap::new("a/").build_mesh(&mut loader, &shader_lib).unwrap();
        let b = Cubemap::new("b/").build_mesh(&mut loader, &shader_lib).unwrap();
        assert_ne!(a.cube_texture(), b.cube_texture());
        let template = shader_lib.template(ShaderLib::CUBE).unwrap();
        assert_eq!(template.cube_texture("tCube"), None);
    }
}
