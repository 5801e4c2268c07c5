/// Axis-aligned box centered on the origin.
///
/// Only corner positions are stored: the cube shader samples the cube
/// texture with the interpolated local position, so skyboxes need neither
/// normals nor uvs.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxGeometry {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    positions: Vec<[f32; 3]>,
    indices: Vec<u16>,
}

#[rustfmt::skip]
const CORNERS: [[f32; 3]; 8] = [
    [-0.5, -0.5, -0.5],
    [ 0.5, -0.5, -0.5],
    [ 0.5,  0.5, -0.5],
    [-0.5,  0.5, -0.5],
    [-0.5, -0.5,  0.5],
    [ 0.5, -0.5,  0.5],
    [ 0.5,  0.5,  0.5],
    [-0.5,  0.5,  0.5],
];

// Counter-clockwise seen from outside the box
#[rustfmt::skip]
const INDICES: [u16; 36] = [
    1, 2, 6,  1, 6, 5, // +x
    0, 4, 7,  0, 7, 3, // -x
    3, 7, 6,  3, 6, 2, // +y
    0, 1, 5,  0, 5, 4, // -y
    4, 5, 6,  4, 6, 7, // +z
    0, 3, 2,  0, 2, 1, // -z
];

impl BoxGeometry {
    pub fn new(width: f32, height: f32, depth: f32) -> Self {
        let positions = CORNERS
            .iter()
            .map(|c| [c[0] * width, c[1] * height, c[2] * depth])
            .collect();
        Self {
            width,
            height,
            depth,
            positions,
            indices: INDICES.to_vec(),
        }
    }

    pub fn cube(edge_length: u32) -> Self {
        let edge = edge_length as f32;
        Self::new(edge, edge, edge)
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }
}
