//! Decoders for the individual EPLY chunk types.
//!
//! VERT and INDX chunks have no header of their own describing layout or
//! winding; both read it from the MESH chunk that came before them, tracked
//! in `DecodeState`.

use binrw::binread;
use tracing::{debug, trace, warn};

use crate::math::{flip_v, PlyVector2, PlyVector3};

use super::cursor::ByteCursor;
use super::error::{PlyError, PlyResult};
use super::layout::{FieldKind, VertexLayout};
use super::options::DecodeOptions;
use super::{
    Aabb, Mesh, PlyDocument, SkinBone, KNOWN_MESH_FVFS, KNOWN_VERTEX_FLAGS, MESH_FLAG_MATERIAL,
    MESH_FLAG_SPECULAR, MESH_FLAG_SUBSKIN,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkTag {
    Mesh,
    Vert,
    Indx,
    Skin,
    Bnds,
    Mror,
}

impl ChunkTag {
    /// Maps a raw tag to its decoder; tags are matched case-insensitively.
    pub fn from_tag(tag: [u8; 4]) -> Option<Self> {
        let mut lower = tag;
        lower.make_ascii_lowercase();
        match &lower {
            b"mesh" => Some(ChunkTag::Mesh),
            b"vert" => Some(ChunkTag::Vert),
            b"indx" => Some(ChunkTag::Indx),
            b"skin" => Some(ChunkTag::Skin),
            b"bnds" => Some(ChunkTag::Bnds),
            b"mror" => Some(ChunkTag::Mror),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChunkTag::Mesh => "MESH",
            ChunkTag::Vert => "VERT",
            ChunkTag::Indx => "INDX",
            ChunkTag::Skin => "SKIN",
            ChunkTag::Bnds => "BNDS",
            ChunkTag::Mror => "MROR",
        }
    }
}

/// Context carried from one chunk to the next.
#[derive(Debug, Default)]
pub(crate) struct DecodeState {
    /// Index into `PlyDocument::meshes` of the last MESH chunk.
    current_mesh: Option<usize>,
    vertices_decoded: usize,
    triangles_decoded: usize,
}

#[binread]
#[derive(Debug)]
#[br(little)]
struct MeshChunkHeader {
    fvf: u32,
    first_face: u32,
    face_count: u32,
    flags: u32,
}

#[binread]
#[derive(Debug)]
#[br(little)]
struct VertexChunkHeader {
    vertex_count: u32,
    vertex_size: u16,
    vertex_flags: u16,
}

#[binread]
#[derive(Debug)]
#[br(little)]
struct BoundsChunk {
    min: PlyVector3,
    max: PlyVector3,
}

/// Decodes one chunk body. `offset` is where the chunk's tag started.
pub(crate) fn decode_chunk(
    tag: ChunkTag,
    cursor: &mut ByteCursor<'_>,
    doc: &mut PlyDocument,
    state: &mut DecodeState,
    options: &DecodeOptions,
    offset: u64,
) -> PlyResult<()> {
    match tag {
        ChunkTag::Mesh => decode_mesh(cursor, doc, state),
        ChunkTag::Vert => decode_vertices(cursor, doc, state, options, offset),
        ChunkTag::Indx => decode_indices(cursor, doc, state, offset),
        ChunkTag::Skin => decode_skin(cursor, doc),
        ChunkTag::Bnds => decode_bounds(cursor, doc),
        // Mirrored geometry is left to consumers via the mesh flag.
        ChunkTag::Mror => Ok(()),
    }
}

fn decode_mesh(
    cursor: &mut ByteCursor<'_>,
    doc: &mut PlyDocument,
    state: &mut DecodeState,
) -> PlyResult<()> {
    let header: MeshChunkHeader = cursor.read_le()?;
    debug!(
        fvf = %format!("{:#x}", header.fvf),
        faces = header.face_count,
        flags = %format!("{:#x}", header.flags),
        "mesh header"
    );
    if !KNOWN_MESH_FVFS.contains(&header.fvf) {
        warn!(fvf = %format!("{:#x}", header.fvf), "mesh uses an unfamiliar vertex format");
    }

    let specular_color = if header.flags & MESH_FLAG_SPECULAR != 0 {
        Some(cursor.read_le::<[u8; 4]>()?)
    } else {
        None
    };

    if header.flags & MESH_FLAG_MATERIAL == 0 {
        return Err(PlyError::UnsupportedLegacyMesh {
            offset: cursor.position(),
            flags: header.flags,
        });
    }
    let material_file = cursor.read_pascal_string()?;
    debug!(material = %material_file, "mesh material");

    let subskin_bones = if header.flags & MESH_FLAG_SUBSKIN != 0 {
        let count = cursor.read_u8()?;
        cursor.read_exact(count as usize)?.to_vec()
    } else {
        Vec::new()
    };

    doc.meshes.push(Mesh {
        fvf: header.fvf,
        first_face: header.first_face,
        face_count: header.face_count,
        flags: header.flags,
        specular_color,
        material_file: Some(material_file),
        subskin_bones,
        vertex_size: None,
        vertex_flags: None,
        vertices: state.vertices_decoded..state.vertices_decoded,
        triangles: state.triangles_decoded..state.triangles_decoded,
    });
    state.current_mesh = Some(doc.meshes.len() - 1);
    Ok(())
}

fn decode_vertices(
    cursor: &mut ByteCursor<'_>,
    doc: &mut PlyDocument,
    state: &mut DecodeState,
    options: &DecodeOptions,
    offset: u64,
) -> PlyResult<()> {
    let mesh_index = state
        .current_mesh
        .ok_or(PlyError::VertexLayoutMismatch { offset })?;
    let header: VertexChunkHeader = cursor.read_le()?;
    let layout = doc.meshes[mesh_index].layout();
    let mut vertex_count = header.vertex_count as usize;

    debug!(
        vertices = vertex_count,
        vertex_size = header.vertex_size,
        vertex_flags = %format!("{:#x}", header.vertex_flags),
        layout_size = layout.byte_width(),
        "vertex header"
    );
    trace!(fields = ?layout.fields(), "vertex layout");

    if options.check_vertex_size && header.vertex_size as usize != layout.byte_width() {
        warn!(
            offset,
            declared = header.vertex_size,
            resolved = layout.byte_width(),
            "vertex size disagrees with mesh format, decoding by format"
        );
    }
    if !KNOWN_VERTEX_FLAGS.contains(&header.vertex_flags) {
        warn!(
            vertex_flags = %format!("{:#x}", header.vertex_flags),
            "unfamiliar vertex chunk flags"
        );
    }

    // Counts are untrusted; never reserve more than the buffer could hold.
    let reserve = match layout.byte_width() {
        0 => {
            if vertex_count > 0 {
                warn!(
                    offset,
                    vertices = vertex_count,
                    fvf = %format!("{:#x}", layout.fvf()),
                    "vertex format has no fields, ignoring vertex count"
                );
            }
            vertex_count = 0;
            0
        }
        width => vertex_count.min(cursor.remaining() / width),
    };
    if layout.has(FieldKind::Position) {
        doc.positions.reserve(reserve);
    }
    if layout.has(FieldKind::Normal) {
        doc.normals.reserve(reserve);
    }
    if layout.has(FieldKind::TexCoord) {
        doc.uvs.reserve(reserve);
    }

    for _ in 0..vertex_count {
        read_vertex(cursor, &layout, doc)?;
    }

    let mesh = &mut doc.meshes[mesh_index];
    mesh.vertex_size = Some(header.vertex_size);
    mesh.vertex_flags = Some(header.vertex_flags);
    mesh.vertices.end += vertex_count;
    state.vertices_decoded += vertex_count;
    Ok(())
}

fn read_vertex(
    cursor: &mut ByteCursor<'_>,
    layout: &VertexLayout,
    doc: &mut PlyDocument,
) -> PlyResult<()> {
    for field in layout.fields() {
        match field.kind {
            FieldKind::Position => doc.positions.push(cursor.read_le::<PlyVector3>()?.0),
            FieldKind::Weight => {
                let weights = (0..field.count)
                    .map(|_| cursor.read_f32())
                    .collect::<PlyResult<Vec<f32>>>()?;
                doc.weights.push(weights);
            }
            FieldKind::MatrixIndex => doc.matrix_indices.push(cursor.read_u32()?),
            FieldKind::Normal => doc.normals.push(cursor.read_le::<PlyVector3>()?.0),
            FieldKind::TexCoord => {
                let uv = cursor.read_le::<PlyVector2>()?.0;
                doc.uvs.push(flip_v(uv));
                cursor.skip(field.byte_width - 8)?;
            }
            FieldKind::Rhw
            | FieldKind::PointSize
            | FieldKind::Diffuse
            | FieldKind::Specular
            | FieldKind::MeshSpecular => cursor.skip(field.byte_width)?,
        }
    }
    Ok(())
}

fn decode_indices(
    cursor: &mut ByteCursor<'_>,
    doc: &mut PlyDocument,
    state: &mut DecodeState,
    offset: u64,
) -> PlyResult<()> {
    let mesh_index = state
        .current_mesh
        .ok_or(PlyError::OrphanIndices { offset })?;
    let count_offset = cursor.position();
    let index_count = cursor.read_u32()?;
    if index_count % 3 != 0 {
        return Err(PlyError::MalformedIndexCount {
            offset: count_offset,
            count: index_count,
        });
    }

    let triangle_count = (index_count / 3) as usize;
    let mirrored = doc.meshes[mesh_index].is_mirrored();
    trace!(triangles = triangle_count, mirrored, "index chunk");

    doc.indices
        .reserve(triangle_count.min(cursor.remaining() / 6));
    for _ in 0..triangle_count {
        let [i0, i1, i2] = cursor.read_le::<[u16; 3]>()?;
        let triangle = if mirrored {
            [i0, i1, i2]
        } else {
            [i2, i1, i0]
        };
        doc.indices.push(triangle.map(u32::from));
    }

    doc.meshes[mesh_index].triangles.end += triangle_count;
    state.triangles_decoded += triangle_count;
    Ok(())
}

/// Settles each mesh's triangle and vertex ranges once every chunk is in.
///
/// A mesh whose header declares faces owns
/// `indices[first_face / 3 .. (first_face + face_count) / 3]`, clamped to the
/// triangles actually decoded, and the span of vertices those triangles
/// reference. Several MESH chunks may share one VERT/INDX pair this way.
/// Meshes with `face_count == 0` keep the ranges of the chunks that followed
/// them.
pub(crate) fn resolve_mesh_ranges(doc: &mut PlyDocument, state: &DecodeState) {
    let indices = &doc.indices;
    let vertex_total = state.vertices_decoded;

    for (i, mesh) in doc.meshes.iter_mut().enumerate() {
        if mesh.face_count == 0 {
            continue;
        }

        let first = mesh.first_face as usize / 3;
        let last = (mesh.first_face as usize).saturating_add(mesh.face_count as usize) / 3;
        if last > indices.len() {
            warn!(
                mesh = i,
                first_face = mesh.first_face,
                face_count = mesh.face_count,
                triangles = indices.len(),
                "face range runs past the decoded indices, clamping"
            );
        }
        let start = first.min(indices.len());
        let end = last.min(indices.len()).max(start);
        mesh.triangles = start..end;

        let referenced = indices[start..end].iter().flatten().copied();
        mesh.vertices = match (referenced.clone().min(), referenced.max()) {
            (Some(lo), Some(hi)) => {
                let lo = (lo as usize).min(vertex_total);
                let hi = (hi as usize + 1).min(vertex_total).max(lo);
                lo..hi
            }
            _ => vertex_total..vertex_total,
        };
        trace!(
            mesh = i,
            triangles = ?mesh.triangles,
            vertices = ?mesh.vertices,
            "mesh ranges from face header"
        );
    }
}

fn decode_skin(cursor: &mut ByteCursor<'_>, doc: &mut PlyDocument) -> PlyResult<()> {
    let bone_count = cursor.read_u32()? as usize;
    debug!(bones = bone_count, "skin bones");

    doc.bones.reserve(bone_count.min(cursor.remaining()));
    for _ in 0..bone_count {
        let name = cursor.read_pascal_string()?;
        trace!(bone = %name, "skin bone");
        doc.bones.push(SkinBone { name });
    }
    Ok(())
}

fn decode_bounds(cursor: &mut ByteCursor<'_>, doc: &mut PlyDocument) -> PlyResult<()> {
    let bounds: BoundsChunk = cursor.read_le()?;
    doc.bounds = Some(Aabb {
        min: bounds.min.0,
        max: bounds.max.0,
    });
    Ok(())
}
