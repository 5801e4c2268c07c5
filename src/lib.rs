pub mod app;
pub mod assets;
pub mod components;
pub mod device;
pub mod error;
pub mod events;
pub mod geometry;
pub mod loader;
pub mod logging;
pub mod material;
pub mod math;
pub mod mesh;
pub mod renderers;
pub mod systems;
pub mod texture;

pub use components::{Cubemap, CubeFace, NameMap, Object3D, CUBE_ORDER, DEFAULT_EDGE_LENGTH};
pub use error::CubemapError;
pub use loader::{CubeTextureHandle, CubeTextureLoader};
pub use material::ShaderLib;

#[cfg(target_arch="wasm32")]
use wasm_bindgen::prelude::*;


#[cfg_attr(target_arch="wasm32", wasm_bindgen(start))]
pub async fn run() {
    crate::app::run_viewer(crate::app::DEFAULT_ATTRIBUTES.to_string()).await
}
