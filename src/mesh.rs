use crate::geometry::BoxGeometry;
use crate::loader::CubeTextureHandle;
use crate::material::ShaderMaterial;


#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub geometry: BoxGeometry,
    pub material: ShaderMaterial,
}

impl Mesh {
    pub fn new(geometry: BoxGeometry, material: ShaderMaterial) -> Self {
        Self { geometry, material }
    }

    // Texture bound to the cube shader sampler, if any
    pub fn cube_texture(&self) -> Option<CubeTextureHandle> {
        self.material.cube_texture("tCube")
    }
}
