mod render;
mod schedules;

use crate::events::KeyboardEvent;
use crate::app::AppState;
use bevy_ecs::prelude::*;
use winit::event::VirtualKeyCode;

pub use render::{render, prepare_render_pipelines};
pub use schedules::{
    new_spawn_scene_schedule, new_preupdate_schedule, new_update_schedule, new_render_schedule,
    SpawnLabel, PreupdateLabel, UpdateLabel, RenderLabel,
};


pub fn escape_on_exit(mut app: ResMut<AppState>, mut keyboard_events: EventReader<KeyboardEvent>) {
    if keyboard_events
        .iter()
        .any(|e| e.code == VirtualKeyCode::Escape && e.pressed)
    {
        app.running = false;
    }
}
