#![allow(dead_code)]

use nalgebra as na;

// Type defs for convenience
// Makes it easier to switch the maths library

// Float specializations
pub type Vec3f = na::Vector3<f32>;
pub type Mat4f = na::Matrix4<f32>;
pub type UnitQuatf = na::UnitQuaternion<f32>;

// Generic
pub type Vec3<T> = na::Vector3<T>;
pub type Mat4<T> = na::Matrix4<T>;
pub type UnitQuat<T> = na::UnitQuaternion<T>;
