//! EPLY mesh decoder for the chunked binary meshes used by Men of War models.
//!
//! Binary layout:
//! ```text
//! [4 bytes]  magic "EPLY"
//! repeated until end of file:
//!     [4 bytes]  chunk tag (ASCII, case-insensitive)
//!     [...]      tag specific body, no length prefix
//!
//! MESH: fvf(4) + first_face(4) + face_count(4) + flags(4)
//!       [specular flag]  rgba(4)
//!       [material flag]  name_len(1) + name
//!       [sub-skin flag]  bone_num(1) + bone_num × bone index(1)
//! VERT: vertex_num(4) + vertex_size(2) + vertex_flags(2) + vertex_num × record
//!       (record layout comes from the preceding MESH, see `layout`)
//! INDX: index_num(4) + index_num × u16
//! SKIN: bone_num(4) + bone_num × (name_len(1) + name)
//! BNDS: min(12) + max(12)
//! MROR: empty
//! ```

mod chunks;
mod cursor;
mod error;
mod export;
mod layout;
mod options;
mod reader;

use std::collections::BTreeSet;
use std::ops::Range;

use serde::Serialize;

use crate::math::{Vec2, Vec3};

pub use chunks::ChunkTag;
pub use cursor::ByteCursor;
pub use error::{PlyError, PlyResult};
pub use export::{save_obj, to_obj_string, write_obj};
pub use layout::{FieldKind, VertexField, VertexLayout};
pub use options::{DecodeOptions, UnknownChunkPolicy, ENV_UNKNOWN_CHUNKS};
pub use reader::{load_ply, load_ply_with, parse_ply, parse_ply_with, read_ply};

pub const PLY_MAGIC: &[u8; 4] = b"EPLY";

pub const MESH_FLAG_TWO_SIDED: u32 = 1 << 0; // render without culling
pub const MESH_FLAG_USE_ALPHA: u32 = 1 << 1;
pub const MESH_FLAG_LIGHT: u32 = 1 << 2; // realtime scene light
pub const MESH_FLAG_PLAYER_COLOR: u32 = 1 << 3;
pub const MESH_FLAG_SKINNED: u32 = 1 << 4;
pub const MESH_FLAG_SHADOW: u32 = 1 << 5; // shadow volume mesh
pub const MESH_FLAG_MIRRORED: u32 = 1 << 6; // negative scaling
pub const MESH_FLAG_BLEND_TEX: u32 = 1 << 7; // blend by second texture alpha
pub const MESH_FLAG_BUMP: u32 = 1 << 8;
pub const MESH_FLAG_SPECULAR: u32 = 1 << 9; // specular color stored
pub const MESH_FLAG_MATERIAL: u32 = 1 << 10; // material file instead of textures
pub const MESH_FLAG_SUBSKIN: u32 = 1 << 11;
pub const MESH_FLAG_TWO_TEX: u32 = 1 << 12; // two textures, one texcoord set
pub const MESH_FLAG_USING_VD: u32 = 1 << 13; // vertex declaration instead of fvf
pub const MESH_FLAG_LIGHTMAP: u32 = 1 << 14;

const MESH_FLAG_NAMES: [(u32, &str); 15] = [
    (MESH_FLAG_TWO_SIDED, "two_sided"),
    (MESH_FLAG_USE_ALPHA, "use_alpha"),
    (MESH_FLAG_LIGHT, "light"),
    (MESH_FLAG_PLAYER_COLOR, "player_color"),
    (MESH_FLAG_SKINNED, "skinned"),
    (MESH_FLAG_SHADOW, "shadow"),
    (MESH_FLAG_MIRRORED, "mirrored"),
    (MESH_FLAG_BLEND_TEX, "blend_tex"),
    (MESH_FLAG_BUMP, "bump"),
    (MESH_FLAG_SPECULAR, "specular"),
    (MESH_FLAG_MATERIAL, "material"),
    (MESH_FLAG_SUBSKIN, "subskin"),
    (MESH_FLAG_TWO_TEX, "two_tex"),
    (MESH_FLAG_USING_VD, "using_vd"),
    (MESH_FLAG_LIGHTMAP, "lightmap"),
];

/// Mesh FVFs seen in shipped game data.
pub const KNOWN_MESH_FVFS: [u32; 2] = [0x0112, 0x1118];

/// VERT chunk flag values seen in shipped game data.
pub const KNOWN_VERTEX_FLAGS: [u16; 19] = [
    0x0404, 0x0405, 0x0406, 0x0444, 0x0504, 0x0544, 0x0644, 0x0604, 0x0704, 0x0705, 0x0744,
    0x0745, 0x0C14, 0x0C15, 0x0C54, 0x0C55, 0x0F14, 0x0F15, 0x0F54,
];

/// Names of the mesh flag bits set in `flags`, lowest bit first.
pub fn mesh_flag_names(flags: u32) -> Vec<&'static str> {
    MESH_FLAG_NAMES
        .iter()
        .filter(|(bit, _)| flags & bit != 0)
        .map(|(_, name)| *name)
        .collect()
}

/// One MESH chunk and the geometry its VERT/INDX chunks contributed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mesh {
    pub fvf: u32,
    pub first_face: u32,
    pub face_count: u32,
    pub flags: u32,
    /// Packed RGBA, present with `MESH_FLAG_SPECULAR`.
    pub specular_color: Option<[u8; 4]>,
    pub material_file: Option<String>,
    /// Indices into the document's bone table.
    pub subskin_bones: Vec<u8>,
    /// Header of the last VERT chunk decoded for this mesh.
    pub vertex_size: Option<u16>,
    pub vertex_flags: Option<u16>,
    /// Range into the document's per-vertex arrays spanning every vertex
    /// this mesh's triangles reference.
    pub vertices: Range<usize>,
    /// Range into `PlyDocument::indices`. Taken from `first_face`/`face_count`
    /// (counted in indices) when the header declares faces, otherwise from
    /// the INDX chunks that followed this mesh.
    pub triangles: Range<usize>,
}

impl Mesh {
    pub fn has_flag(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }

    pub fn is_mirrored(&self) -> bool {
        self.has_flag(MESH_FLAG_MIRRORED)
    }

    pub fn is_skinned(&self) -> bool {
        self.has_flag(MESH_FLAG_SKINNED)
    }

    pub fn layout(&self) -> VertexLayout {
        VertexLayout::for_mesh(self.fvf, self.flags)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkinBone {
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

/// Where lenient decoding stopped on an unrecognised chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnparsedTail {
    pub offset: u64,
    pub tag: [u8; 4],
}

/// A fully decoded EPLY file.
///
/// Per-vertex arrays are concatenated over all meshes in chunk order. An
/// attribute absent from every mesh leaves its array empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlyDocument {
    pub meshes: Vec<Mesh>,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// First texture set, V already flipped (`1 - v`).
    pub uvs: Vec<Vec2>,
    pub weights: Vec<Vec<f32>>,
    pub matrix_indices: Vec<u32>,
    /// Triangles with winding corrected for non-mirrored meshes.
    pub indices: Vec<[u32; 3]>,
    pub bones: Vec<SkinBone>,
    pub bounds: Option<Aabb>,
    pub unparsed_tail: Option<UnparsedTail>,
}

impl PlyDocument {
    pub fn bone(&self, index: usize) -> Option<&SkinBone> {
        self.bones.get(index)
    }

    /// Bone names for a mesh's sub-skin list; `None` for out-of-range indices.
    pub fn subskin_bone_names<'a>(&'a self, mesh: &Mesh) -> Vec<Option<&'a str>> {
        mesh.subskin_bones
            .iter()
            .map(|&i| self.bone(i as usize).map(|b| b.name.as_str()))
            .collect()
    }

    pub fn has_tex_coords(&self) -> bool {
        !self.uvs.is_empty()
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    pub fn mesh_view(&self, index: usize) -> Option<MeshView<'_>> {
        self.meshes.get(index).map(|mesh| MeshView::new(self, mesh))
    }

    pub fn mesh_views(&self) -> impl Iterator<Item = MeshView<'_>> {
        self.meshes.iter().map(move |mesh| MeshView::new(self, mesh))
    }
}

/// A mesh together with its slices of the document's arrays.
#[derive(Debug, Clone, Copy)]
pub struct MeshView<'a> {
    pub mesh: &'a Mesh,
    pub positions: &'a [Vec3],
    pub normals: &'a [Vec3],
    pub uvs: &'a [Vec2],
    pub weights: &'a [Vec<f32>],
    pub matrix_indices: &'a [u32],
    pub triangles: &'a [[u32; 3]],
}

fn slice_or_empty<'a, T>(items: &'a [T], range: &Range<usize>) -> &'a [T] {
    items.get(range.clone()).unwrap_or(&[])
}

impl<'a> MeshView<'a> {
    fn new(doc: &'a PlyDocument, mesh: &'a Mesh) -> Self {
        Self {
            mesh,
            positions: slice_or_empty(&doc.positions, &mesh.vertices),
            normals: slice_or_empty(&doc.normals, &mesh.vertices),
            uvs: slice_or_empty(&doc.uvs, &mesh.vertices),
            weights: slice_or_empty(&doc.weights, &mesh.vertices),
            matrix_indices: slice_or_empty(&doc.matrix_indices, &mesh.vertices),
            triangles: slice_or_empty(&doc.indices, &mesh.triangles),
        }
    }

    /// Sorted, de-duplicated vertex indices used by this mesh's triangles.
    pub fn vertex_group(&self) -> Vec<u32> {
        self.triangles
            .iter()
            .flatten()
            .copied()
            .collect::<BTreeSet<u32>>()
            .into_iter()
            .collect()
    }
}
