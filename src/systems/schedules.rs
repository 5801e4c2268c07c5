use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ScheduleLabel;
use crate::components::{Camera, CameraRig, Cubemap};
use crate::device::resize_device;
use crate::error::CubemapError;
use crate::events::{KeyboardEvent, MouseEvent, WindowResizeEvent};
use crate::loader::CubeTextureLoader;
use crate::systems::{escape_on_exit, prepare_render_pipelines, render};


#[derive(ScheduleLabel, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SpawnLabel;

pub fn new_spawn_scene_schedule() -> (Schedule, SpawnLabel) {
    let mut schedule = Schedule::default();
    schedule
        .add_systems(prepare_render_pipelines.run_if(run_once()));
    (schedule, SpawnLabel)
}


#[derive(ScheduleLabel, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PreupdateLabel;

pub fn new_preupdate_schedule() -> (Schedule, PreupdateLabel) {
    let mut schedule = Schedule::default();
    schedule
        .add_systems((
            (
                Events::<WindowResizeEvent>::update_system,
                Events::<KeyboardEvent>::update_system,
                Events::<MouseEvent>::update_system,
            ),
            (
                escape_on_exit,
                resize_device,
                Camera::follow_window,
                CameraRig::update,
            ),
        ).chain());
    (schedule, PreupdateLabel)
}


#[derive(ScheduleLabel, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UpdateLabel;

/// Cubemap lifecycle followed by texture loading. Needs the host resources
/// (`ShaderLib`, `CubeTextureLoader`) to be in `world` already.
pub fn new_update_schedule(world: &mut World) -> Result<(Schedule, UpdateLabel), CubemapError> {
    let mut schedule = Schedule::default();
    Cubemap::register(world, &mut schedule)?;
    schedule
        .add_systems((
            CubeTextureLoader::fetch_requested,
            CubeTextureLoader::upload_fetched,
        ).chain().after(Cubemap::attach))
        .add_systems(Camera::fit_skyboxes);
    Ok((schedule, UpdateLabel))
}


#[derive(ScheduleLabel, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RenderLabel;

pub fn new_render_schedule() -> (Schedule, RenderLabel) {
    let mut schedule = Schedule::default();
    schedule
        .add_systems(render);
    (schedule, RenderLabel)
}
