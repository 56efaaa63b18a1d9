use binrw::binread;
use cgmath::{Vector2, Vector3};

pub type Vec3 = Vector3<f32>;
pub type Vec2 = Vector2<f32>;

#[binread]
#[derive(Debug, Clone, Copy)]
#[br(little)]
pub struct PlyVector3(
    #[br(map = |raw: [f32; 3]| Vector3::new(raw[0], raw[1], raw[2]))] pub Vec3,
);

#[binread]
#[derive(Debug, Clone, Copy)]
#[br(little)]
pub struct PlyVector2(
    #[br(map = |raw: [f32; 2]| Vector2::new(raw[0], raw[1]))] pub Vec2,
);

/// Converts between file texture space and the importer's, where V grows
/// the other way. Applying it twice gives back the input.
pub fn flip_v(uv: Vec2) -> Vec2 {
    Vector2::new(uv.x, 1.0 - uv.y)
}
