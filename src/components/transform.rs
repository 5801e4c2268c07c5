use nalgebra as na;
use bevy_ecs::prelude::*;
use crate::math::{Mat4, Mat4f, Vec3, Vec3f, UnitQuat, UnitQuatf};

#[derive(Component,Debug)]
pub struct Transform {
    // Individual components
    pos: Vec3f,
    rot: UnitQuatf,
    scale: Vec3f,
    // Cached transform matrix
    m: Mat4f,
}

impl Transform {
    pub fn new(pos: Vec3f, rot: UnitQuatf, scale: Vec3f) -> Self {
        let m = Mat4::identity();
        let mut res = Self { pos, rot, scale, m };
        res.rebuild_matrix();
        res
    }

    pub fn from_position(pos: Vec3f) -> Self {
        Transform::new(pos, UnitQuat::identity(), Vec3::from_element(1.0))
    }

    pub fn matrix(&self) -> Mat4f {
        self.m
    }

    pub fn forward(&self) -> Vec3f {
        -self.m.column(2).xyz()
    }

    pub fn position(&self) -> Vec3f {
        self.pos
    }

    pub fn rotation(&self) -> UnitQuatf {
        self.rot
    }

    pub fn set_pose(&mut self, pos: Vec3f, rot: UnitQuatf) {
        self.pos = pos;
        self.rot = rot;
        self.rebuild_matrix();
    }

    fn rebuild_matrix(&mut self) {
        let rot_m = na::Rotation3::from(self.rot);
        let tr_m = na::Translation3::new(self.pos.x, self.pos.y, self.pos.z);
        let rot_and_tr_m = tr_m * rot_m;
        self.m = rot_and_tr_m
            .to_matrix()
            .prepend_nonuniform_scaling(&self.scale);
    }
}

impl Default for Transform {
    fn default() -> Self {
        Transform::new(Vec3::new(0.0, 0.0, 0.0), UnitQuat::identity(), Vec3::from_element(1.0))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_looks_down_negative_z() {
        let t = Transform::default();
        assert_eq!(t.forward(), Vec3f::new(0.0, 0.0, -1.0));
        assert_eq!(t.matrix(), Mat4f::identity());
    }

    #[test]
    fn pose_updates_cached_matrix() {
        let mut t = Transform::from_position(Vec3f::new(1.0, 2.0, 3.0));
        let rot = UnitQuat::from_axis_angle(&Vec3::y_axis(), std::f32::consts::FRAC_PI_2);
        t.set_pose(Vec3f::new(0.0, 0.0, 0.0), rot);
        let forward = t.forward();
        assert!((forward - Vec3f::new(-1.0, 0.0, 0.0)).norm() < 1e-5);
        assert_eq!(t.rotation(), rot);
        assert_eq!(t.position(), Vec3f::zeros());
    }
}
