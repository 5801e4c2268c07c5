use std::fmt;
use log::warn;


/// One face of a cube texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

/// Layer order expected by the cube texture loader: +X, -X, +Y, -Y, +Z, -Z.
/// Array position i becomes texture layer i.
pub const CUBE_ORDER: [CubeFace; 6] = [
    CubeFace::PosX,
    CubeFace::NegX,
    CubeFace::PosY,
    CubeFace::NegY,
    CubeFace::PosZ,
    CubeFace::NegZ,
];

impl CubeFace {
    pub fn key(self) -> &'static str {
        match self {
            CubeFace::PosX => "posx",
            CubeFace::NegX => "negx",
            CubeFace::PosY => "posy",
            CubeFace::NegY => "negy",
            CubeFace::PosZ => "posz",
            CubeFace::NegZ => "negz",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        CUBE_ORDER.into_iter().find(|face| face.key() == key)
    }

    pub fn layer(self) -> usize {
        self as usize
    }
}

impl fmt::Display for CubeFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}


/// Filename stem for each cube face.
///
/// Defaults to the face key itself (`posx.jpg`, `negx.jpg`, ...), which keeps
/// folders laid out with the canonical names working without a map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameMap {
    stems: [String; 6],
}

impl Default for NameMap {
    fn default() -> Self {
        Self {
            stems: CUBE_ORDER.map(|face| face.key().to_string()),
        }
    }
}

impl NameMap {
    /// Parse space separated `face=stem` overrides, e.g. `"posx=right negx=left"`.
    ///
    /// Later pairs win over earlier ones. Tokens without `=`, with an empty
    /// stem or with an unknown face key are skipped.
    pub fn parse(overrides: &str) -> Self {
        let mut name_map = Self::default();
        for token in overrides.split_whitespace() {
            let Some((key, stem)) = token.split_once('=') else {
                warn!("cubemap nameMap: ignoring `{token}`, expected face=stem");
                continue;
            };
            if stem.is_empty() {
                warn!("cubemap nameMap: ignoring `{token}`, empty stem");
                continue;
            }
            match CubeFace::from_key(key) {
                Some(face) => name_map.set(face, stem),
                None => warn!("cubemap nameMap: ignoring unknown face `{key}`"),
            }
        }
        name_map
    }

    pub fn stem(&self, face: CubeFace) -> &str {
        &self.stems[face.layer()]
    }

    pub fn set(&mut self, face: CubeFace, stem: &str) {
        self.stems[face.layer()] = stem.to_string();
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}
