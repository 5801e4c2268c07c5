use bevy_ecs::prelude::*;
use log::warn;

use crate::components::{Camera, CameraRig, Object3D, Transform};
use crate::device::Device;
use crate::loader::CubeTextureLoader;
use crate::math::Mat4f;
use crate::renderers::{Renderers, SkyboxInstance, SkyboxPass};


pub fn prepare_render_pipelines(
    device: Res<Device>,
    mut renderers: ResMut<Renderers>,
) {
    renderers.skybox_renderer = Some(SkyboxPass::new(
        &device,
        device.surface_texture_format(),
    ));
}

pub fn render(
    device: Res<Device>,
    loader: Res<CubeTextureLoader>,
    mut renderers: ResMut<Renderers>,
    camera_qry: Query<(&Camera, &Transform), With<CameraRig>>,
    skyboxes_qry: Query<(Entity, &Object3D, Option<&Transform>)>,
) {
    let Ok(camera) = camera_qry.get_single() else {
        return;
    };
    let Some(skybox_renderer) = renderers.skybox_renderer.as_mut() else {
        return;
    };

    let instances: Vec<SkyboxInstance> = skyboxes_qry
        .iter()
        .filter_map(|(entity, object3d, transform)| {
            let mesh = object3d.get(Object3D::MESH)?;
            Some(SkyboxInstance {
                entity,
                mesh,
                model: transform.map_or_else(Mat4f::identity, |t| t.matrix()),
            })
        })
        .collect();

    let surface_texture = match device.surface().get_current_texture() {
        Ok(texture) => texture,
        Err(e) => {
            warn!("skipping frame: {e}");
            return;
        }
    };
    let color_view = surface_texture.texture.create_view(&wgpu::TextureViewDescriptor::default());

    let skybox_cmd_buffer = skybox_renderer.draw(
        &color_view,
        &device,
        &loader,
        camera,
        &instances,
    );

    device.queue().submit([skybox_cmd_buffer]);
    surface_texture.present();
}
