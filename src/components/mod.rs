mod camera;
mod cubemap;
mod name_map;
mod object3d;
mod transform;

pub use camera::{Camera, CameraRig};
pub use cubemap::{AttachedCubemaps, Cubemap, DEFAULT_EDGE_LENGTH};
pub use name_map::{CubeFace, NameMap, CUBE_ORDER};
pub use object3d::Object3D;
pub use transform::Transform;
