use crate::components::{Camera, CameraRig, Cubemap, Transform};
use crate::device::{Device, SurfaceSize};
use crate::events::{KeyboardEvent, MouseEvent, WindowResizeEvent};
use crate::loader::CubeTextureLoader;
use crate::material::ShaderLib;
use crate::renderers::Renderers;
use crate::systems::*;
use crate::logging::{init_logging, printlog};
use anyhow::Context;
use bevy_ecs::prelude::*;
use log::error;
use winit::event::{DeviceEvent, ElementState, Event, KeyboardInput, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
use winit::window::{Window, WindowBuilder};

#[cfg(target_arch="wasm32")]
use winit::platform::web::EventLoopExtWebSys;


pub const DEFAULT_ATTRIBUTES: &str = "folder: res/skyboxes/default/; edgeLength: 5000";

#[derive(Resource)]
pub struct AppState {
    pub running: bool,
}

pub struct App {
    pub world: World,
    window: Window,
}

impl App {
    pub async fn new(window: Window, attributes: &str) -> anyhow::Result<Self> {
        let cubemap = Cubemap::from_attributes(attributes)
            .with_context(|| format!("cubemap attributes `{attributes}`"))?;

        let mut world = World::default();
        world.init_resource::<Schedules>();

        let device = Device::new(&window).await?;
        printlog("running App::new - created device");
        let surface_size = device.surface_size();
        world.insert_resource(device);

        world.insert_resource(AppState {
            running: true,
        });
        world.insert_resource(Renderers::default());
        world.insert_resource(ShaderLib::builtin());
        world.insert_resource(CubeTextureLoader::new());

        // Events
        world.init_resource::<Events<WindowResizeEvent>>();
        world.init_resource::<Events<KeyboardEvent>>();
        world.init_resource::<Events<MouseEvent>>();

        // Schedules
        let spawn_scene_schedule = new_spawn_scene_schedule();
        world.add_schedule(spawn_scene_schedule.0, spawn_scene_schedule.1);
        let preupdate_schedule = new_preupdate_schedule();
        world.add_schedule(preupdate_schedule.0, preupdate_schedule.1);
        let update_schedule = new_update_schedule(&mut world)?;
        world.add_schedule(update_schedule.0, update_schedule.1);
        let render_schedule = new_render_schedule();
        world.add_schedule(render_schedule.0, render_schedule.1);

        // Scene
        world.spawn((
            Camera::new(
                surface_size.width,
                surface_size.height,
                60f32.to_radians(),
                0.1,
                Camera::zfar_for_edge(cubemap.edge_length),
            ),
            Transform::default(),
            CameraRig::default(),
        ));
        world.spawn((cubemap, Transform::default()));

        Ok(Self {
            world,
            window,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn running(&self) -> bool {
        self.world.resource::<AppState>().running
    }

    pub fn frame(&mut self) {
        self.world.run_schedule(SpawnLabel);
        self.world.run_schedule(PreupdateLabel);
        self.world.run_schedule(UpdateLabel);
        self.world.run_schedule(RenderLabel);
        self.world.clear_trackers();
    }

    fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.world.resource_mut::<AppState>().running = false;
            }

            WindowEvent::MouseInput { state, button, .. } => {
                self.world.send_event(MouseEvent::Button {
                    button: *button,
                    pressed: *state == ElementState::Pressed,
                });
            }

            WindowEvent::KeyboardInput {
                input:
                    KeyboardInput {
                        state: key_state,
                        virtual_keycode: Some(keycode),
                        ..
                    },
                ..
            } => {
                self.world.send_event(KeyboardEvent {
                    code: *keycode,
                    pressed: *key_state == ElementState::Pressed,
                });
            }

            WindowEvent::Resized(new_size) => {
                self.world.send_event(WindowResizeEvent {
                    new_size: *new_size,
                });
            }

            WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                self.world.send_event(WindowResizeEvent {
                    new_size: **new_inner_size,
                });
            }

            _ => (),
        }
    }
}


#[cfg(target_arch = "wasm32")]
fn setup_window_canvas(window: &Window, surface_size: SurfaceSize) {

    // Winit prevents sizing with CSS, so we have to set
    // the size manually when on web.
    window.set_inner_size(surface_size);

    use winit::platform::web::WindowExtWebSys;
    let appended = web_sys::window()
        .and_then(|win| win.document())
        .and_then(|doc| {
            let dst = doc.get_element_by_id("cubemap")?;
            let canvas = web_sys::Element::from(window.canvas());
            canvas.set_id("canvas");
            dst.append_child(&canvas).ok()?;
            Some(())
        });
    if appended.is_none() {
        error!("Couldn't append canvas to the #cubemap element.");
    }
}

pub async fn run_viewer(attributes: String) {

    init_logging();
    printlog("running run_viewer - starting");

    let event_loop = EventLoop::new();

    let surface_size = SurfaceSize::new(1600, 900);

    let window = match WindowBuilder::new()
        .with_title("Cubemap")
        .with_inner_size(surface_size)
        .build(&event_loop)
    {
        Ok(window) => window,
        Err(e) => {
            error!("could not create window: {e}");
            return;
        }
    };

    #[cfg(target_arch = "wasm32")]
    {
        setup_window_canvas(&window, surface_size);
    }
    printlog("running run_viewer - created window");

    let mut app = match App::new(window, &attributes).await {
        Ok(app) => app,
        Err(e) => {
            error!("could not start viewer: {e:#}");
            return;
        }
    };
    printlog("running run_viewer - created app");

    let event_handler = move |event: Event<()>, _: &EventLoopWindowTarget<()>,
                             control_flow: &mut ControlFlow| {

        match event {
            Event::DeviceEvent {
                event: DeviceEvent::MouseMotion { delta },
                ..
            } => {
                app.world.send_event(MouseEvent::Move(delta.0 as f32, delta.1 as f32));
            }

            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == app.window().id() => app.handle_window_event(event),

            Event::RedrawRequested(window_id) if window_id == app.window().id() => {
                app.frame();
            },

            Event::RedrawEventsCleared => {
                // RedrawRequested will only trigger once, unless we manually
                // request it.
                app.window().request_redraw();
            },

            _ => {}
        }

        if !app.running() {
            *control_flow = ControlFlow::Exit;
        }
    };


    #[cfg(target_arch = "wasm32")]
    {
        event_loop.spawn(event_handler);
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        event_loop.run(event_handler);
    }
}
