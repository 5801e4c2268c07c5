use nalgebra as na;
use bevy_ecs::prelude::*;

use crate::components::{Cubemap, Transform};
use crate::events::{MouseEvent, WindowResizeEvent};
use crate::math::{Mat4f, UnitQuat, Vec3};


#[derive(Debug,Component)]
pub struct Camera {
    perspective: na::Perspective3<f32>,
}

impl Camera {
    pub fn new(width: u32, height: u32, fovy: f32, znear: f32, zfar: f32) -> Self {
        Self {
            perspective: na::Perspective3::new(width as f32 / height.max(1) as f32, fovy, znear, zfar)
        }
    }

    // Far plane that keeps the corners of a skybox of `edge_length`
    // visible from its center
    pub fn zfar_for_edge(edge_length: u32) -> f32 {
        edge_length as f32 * 0.5 * 3f32.sqrt() * 1.01
    }

    pub fn view_proj(&self, transform: &Transform) -> Mat4f {
        self.projection_matrix() * self.view_matrix(transform)
    }

    pub fn view_matrix(&self, transform: &Transform) -> Mat4f {
        transform.matrix().try_inverse().unwrap_or_else(Mat4f::identity)
    }

    pub fn projection_matrix(&self) -> Mat4f {
        *self.perspective.as_matrix()
    }

    pub fn zfar(&self) -> f32 {
        self.perspective.zfar()
    }

    // Only ever grows, so any skybox in the scene stays inside the frustum
    pub fn fit_edge(&mut self, edge_length: u32) {
        let zfar = Self::zfar_for_edge(edge_length);
        if zfar > self.zfar() {
            self.perspective.set_zfar(zfar);
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.perspective.set_aspect(width as f32 / height as f32);
        }
    }

    pub fn follow_window(
        mut events: EventReader<WindowResizeEvent>,
        mut cameras: Query<&mut Camera>,
    ) {
        if let Some(e) = events.iter().last() {
            for mut camera in cameras.iter_mut() {
                camera.resize(e.new_size.width, e.new_size.height);
            }
        }
    }

    pub fn fit_skyboxes(
        cubemaps: Query<&Cubemap, Changed<Cubemap>>,
        mut cameras: Query<&mut Camera>,
    ) {
        if let Some(edge) = cubemaps.iter().map(|c| c.edge_length).max() {
            for mut camera in cameras.iter_mut() {
                camera.fit_edge(edge);
            }
        }
    }
}


/// Mouse look: drag with the left button to turn the camera in place.
#[derive(Debug, Default, Component)]
pub struct CameraRig {
    pub yaw: f32,
    pub pitch: f32,
    dragging: bool,
}

impl CameraRig {
    const SENSITIVITY: f32 = 0.005;
    const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

    pub fn turn(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * Self::SENSITIVITY;
        self.pitch = (self.pitch - dy * Self::SENSITIVITY).clamp(-Self::MAX_PITCH, Self::MAX_PITCH);
    }

    pub fn rotation(&self) -> na::UnitQuaternion<f32> {
        UnitQuat::from_axis_angle(&Vec3::y_axis(), self.yaw)
            * UnitQuat::from_axis_angle(&Vec3::x_axis(), self.pitch)
    }

    pub fn update(
        mut events: EventReader<MouseEvent>,
        mut rigs: Query<(&mut CameraRig, &mut Transform)>,
    ) {
        for (mut rig, mut transform) in rigs.iter_mut() {
            for event in events.iter() {
                match *event {
                    MouseEvent::Button { button: winit::event::MouseButton::Left, pressed } => {
                        rig.dragging = pressed;
                    }
                    MouseEvent::Move(dx, dy) if rig.dragging => rig.turn(dx, dy),
                    _ => {}
                }
            }
            let rotation = rig.rotation();
            let position = transform.position();
            transform.set_pose(position, rotation);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() <= b * 1e-3, "{a} != {b}");
    }

    #[test]
    fn far_plane_reaches_skybox_corners() {
        let zfar = Camera::zfar_for_edge(5000);
        assert!(zfar > 2500.0 * 3f32.sqrt());
        assert!(zfar < 5000.0);
    }

    #[test]
    fn far_plane_grows_with_larger_skybox() {
        let mut camera = Camera::new(16, 9, 1.0, 0.1, Camera::zfar_for_edge(100));
        camera.fit_edge(10);
        assert_close(camera.zfar(), Camera::zfar_for_edge(100));
        camera.fit_edge(8000);
        assert_close(camera.zfar(), Camera::zfar_for_edge(8000));
    }

    #[test]
    fn reconfigured_skybox_refits_camera() {
        let mut world = World::default();
        let camera = world.spawn(Camera::new(16, 9, 1.0, 0.1, Camera::zfar_for_edge(100))).id();
        let cubemap = world.spawn(Cubemap::from_attributes("edgeLength: 100").unwrap()).id();
        let mut schedule = Schedule::default();
        schedule.add_systems(Camera::fit_skyboxes);
        schedule.run(&mut world);

        world.get_mut::<Cubemap>(cubemap).unwrap().edge_length = 9000;
        schedule.run(&mut world);
        assert_close(world.get::<Camera>(camera).unwrap().zfar(), Camera::zfar_for_edge(9000));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut rig = CameraRig::default();
        rig.turn(0.0, -100_000.0);
        assert!(rig.pitch <= CameraRig::MAX_PITCH);
        rig.turn(0.0, 100_000.0);
        assert!(rig.pitch >= -CameraRig::MAX_PITCH);
    }
}
