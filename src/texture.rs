use anyhow::*;
use image::RgbaImage;

use crate::components::CUBE_ORDER;
use crate::error::CubemapError;


pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Texture {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
    pub const CUBE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    pub fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let desc = wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[Self::DEPTH_FORMAT],
        };
        let texture = device.create_texture(&desc);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            lod_min_clamp: 0.0,
            lod_max_clamp: 100.0,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Upload six decoded faces, in `CUBE_ORDER`, as the layers of a cube texture.
    pub fn from_cube_faces(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        faces: &[RgbaImage],
        label: Option<&str>,
    ) -> Result<Self> {
        let edge = check_faces(faces)?;
        check_edge_limit(edge, device.limits().max_texture_dimension_2d)?;

        let size = wgpu::Extent3d {
            width: edge,
            height: edge,
            depth_or_array_layers: 6,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::CUBE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            label,
            view_formats: &[],
        });

        for (layer, image) in faces.iter().enumerate() {
            queue.write_texture(
                wgpu::ImageCopyTexture {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: layer as u32,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                image,
                wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(edge * 4),
                    rows_per_image: Some(edge),
                },
                wgpu::Extent3d {
                    width: edge,
                    height: edge,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..wgpu::TextureViewDescriptor::default()
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Ok(Self {
            texture,
            view,
            sampler,
        })
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}


/// Decode six encoded face images (jpeg, png) into RGBA.
/// Faces with no alpha channel come out opaque.
pub fn decode_faces(encoded: &[Vec<u8>]) -> Result<Vec<RgbaImage>> {
    if encoded.len() != CUBE_ORDER.len() {
        bail!(CubemapError::FaceCount(encoded.len()));
    }
    let mut faces = Vec::with_capacity(encoded.len());
    for (face, bytes) in CUBE_ORDER.iter().zip(encoded) {
        let image = image::load_from_memory(bytes)
            .with_context(|| format!("decoding cube face {face}"))?
            .to_rgba8();
        faces.push(image);
    }
    check_faces(&faces)?;
    Ok(faces)
}

// All faces must be square and share the edge of the first one
fn check_faces(faces: &[RgbaImage]) -> std::result::Result<u32, CubemapError> {
    if faces.len() != CUBE_ORDER.len() {
        return Err(CubemapError::FaceCount(faces.len()));
    }
    let first = &faces[0];
    if first.width() != first.height() {
        return Err(CubemapError::FaceNotSquare {
            face: CUBE_ORDER[0],
            width: first.width(),
            height: first.height(),
        });
    }
    let expected = first.width();
    for (face, image) in CUBE_ORDER.iter().zip(faces).skip(1) {
        if image.width() != expected || image.height() != expected {
            return Err(CubemapError::FaceSizeMismatch {
                face: *face,
                width: image.width(),
                height: image.height(),
                expected,
            });
        }
    }
    std::result::Result::Ok(expected)
}

fn check_edge_limit(edge: u32, max: u32) -> std::result::Result<(), CubemapError> {
    if edge > max {
        return Err(CubemapError::FaceTooLarge { edge, max });
    }
    std::result::Result::Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use image::{ImageOutputFormat, RgbImage};

    fn encode_jpeg(width: u32, height: u32) -> Vec<u8> {
        let image = image::DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, ImageOutputFormat::Jpeg(90)).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn decodes_six_square_faces() {
        let encoded: Vec<Vec<u8>> = (0..6).map(|_| encode_jpeg(8, 8)).collect();
        let faces = decode_faces(&encoded).unwrap();
        assert_eq!(faces.len(), 6);
        assert!(faces.iter().all(|f| f.dimensions() == (8, 8)));
        // jpeg has no alpha, expanded as opaque
        assert_eq!(faces[0].get_pixel(0, 0)[3], 255);
    }

    #[test]
    fn rejects_wrong_face_count() {
        let encoded: Vec<Vec<u8>> = (0..5).map(|_| encode_jpeg(8, 8)).collect();
        let err = decode_faces(&encoded).unwrap_err();
        assert!(matches!(err.downcast_ref::<CubemapError>(), Some(CubemapError::FaceCount(5))));
    }

    #[test]
    fn rejects_mismatched_faces() {
        let mut encoded: Vec<Vec<u8>> = (0..6).map(|_| encode_jpeg(8, 8)).collect();
        encoded[3] = encode_jpeg(16, 16);
        let err = decode_faces(&encoded).unwrap_err();
        match err.downcast_ref::<CubemapError>() {
            Some(CubemapError::FaceSizeMismatch { face, expected, .. }) => {
                assert_eq!(*face, crate::components::CubeFace::NegY);
                assert_eq!(*expected, 8);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn rejects_non_square_faces() {
        let encoded: Vec<Vec<u8>> = (0..6).map(|_| encode_jpeg(8, 4)).collect();
        let err = decode_faces(&encoded).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CubemapError>(),
            Some(CubemapError::FaceNotSquare { width: 8, height: 4, .. })
        ));
    }

    #[test]
    fn faces_over_device_limit_are_rejected() {
        assert!(check_edge_limit(4096, 4096).is_ok());
        assert!(matches!(
            check_edge_limit(4097, 4096),
            Err(CubemapError::FaceTooLarge { edge: 4097, max: 4096 })
        ));
    }

    #[test]
    fn garbage_bytes_name_the_face() {
        let mut encoded: Vec<Vec<u8>> = (0..6).map(|_| encode_jpeg(4, 4)).collect();
        encoded[1] = b"not an image".to_vec();
        let err = decode_faces(&encoded).unwrap_err();
        assert!(format!("{err:#}").contains("negx"));
    }
}
