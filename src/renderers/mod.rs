mod shader_utils;
mod skybox;

use bevy_ecs::prelude::Resource;

pub use skybox::{SkyboxInstance, SkyboxPass};


#[derive(Resource, Default)]
pub struct Renderers {
    pub skybox_renderer: Option<SkyboxPass>,
}
