use thiserror::Error;

use crate::components::CubeFace;

#[derive(Debug, Error)]
pub enum CubemapError {
    #[error("cubemap attempted to register before the scene host was available (missing {0})")]
    HostUnavailable(&'static str),

    #[error("shader library has no template named `{0}`")]
    UnknownShader(String),

    #[error("invalid value `{value}` for cubemap attribute `{attribute}`")]
    InvalidAttribute { attribute: String, value: String },

    #[error("expected 6 cube faces, got {0}")]
    FaceCount(usize),

    #[error("cube face {face} is not square ({width}x{height})")]
    FaceNotSquare { face: CubeFace, width: u32, height: u32 },

    #[error("cube face {face} is {width}x{height}, expected {expected}x{expected}")]
    FaceSizeMismatch {
        face: CubeFace,
        width: u32,
        height: u32,
        expected: u32,
    },

    #[error("cube faces are {edge}x{edge}, device limit is {max}")]
    FaceTooLarge { edge: u32, max: u32 },
}
