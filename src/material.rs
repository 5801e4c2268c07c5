use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use bevy_ecs::prelude::Resource;

use crate::error::CubemapError;
use crate::loader::CubeTextureHandle;


/// Which faces of a mesh get rasterized.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Side {
    Front,
    Back,
    Double,
}

impl Side {
    pub fn cull_mode(self) -> Option<wgpu::Face> {
        match self {
            Side::Front => Some(wgpu::Face::Back),
            Side::Back => Some(wgpu::Face::Front),
            Side::Double => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    // None until a texture is bound
    CubeTexture(Option<CubeTextureHandle>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShaderMaterial {
    pub name: String,
    pub shader_path: &'static str,
    pub shader_source: Cow<'static, str>,
    pub uniforms: BTreeMap<String, UniformValue>,
    pub depth_write: bool,
    pub side: Side,
}

impl ShaderMaterial {
    pub fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.uniforms.insert(name.to_string(), value);
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(name)
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.uniforms.get(name) {
            Some(UniformValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn cube_texture(&self, name: &str) -> Option<CubeTextureHandle> {
        match self.uniforms.get(name) {
            Some(UniformValue::CubeTexture(handle)) => *handle,
            _ => None,
        }
    }
}


/// Built-in shader templates, keyed by name.
///
/// Templates are shared by every consumer and never handed out mutably.
/// Callers that bind per-instance state go through [`ShaderLib::instantiate`],
/// which returns their own copy.
#[derive(Resource)]
pub struct ShaderLib {
    templates: HashMap<String, ShaderMaterial>,
}

impl ShaderLib {
    pub const CUBE: &'static str = "cube";

    pub fn builtin() -> Self {
        let mut templates = HashMap::new();
        templates.insert(Self::CUBE.to_string(), Self::cube_template());
        Self { templates }
    }

    fn cube_template() -> ShaderMaterial {
        let mut uniforms = BTreeMap::new();
        uniforms.insert("tCube".to_string(), UniformValue::CubeTexture(None));
        uniforms.insert("tFlip".to_string(), UniformValue::Float(-1.0));
        uniforms.insert("opacity".to_string(), UniformValue::Float(1.0));
        ShaderMaterial {
            name: Self::CUBE.to_string(),
            shader_path: "shaders/cube.wgsl",
            shader_source: Cow::Borrowed(include_str!("renderers/shaders/cube.wgsl")),
            uniforms,
            depth_write: true,
            side: Side::Front,
        }
    }

    pub fn template(&self, name: &str) -> Option<&ShaderMaterial> {
        self.templates.get(name)
    }

    pub fn instantiate(&self, name: &str) -> Result<ShaderMaterial, CubemapError> {
        self.template(name)
            .cloned()
            .ok_or_else(|| CubemapError::UnknownShader(name.to_string()))
    }
}
