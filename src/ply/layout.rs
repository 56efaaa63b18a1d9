//! Per-vertex record layout derived from a mesh's FVF bits.
//!
//! EPLY vertex records have no markers, so the decoder relies entirely on
//! this layout to walk the vertex array byte for byte.

use serde::Serialize;

use crate::d3d::{
    blend_selector, tex_count, D3DFVF_DIFFUSE, D3DFVF_LASTBETA_D3DCOLOR, D3DFVF_LASTBETA_UBYTE4,
    D3DFVF_NORMAL, D3DFVF_POSITION_MASK, D3DFVF_PSIZE, D3DFVF_SPECULAR, D3DFVF_XYZB1,
    D3DFVF_XYZB5, D3DFVF_XYZRHW,
};

use super::MESH_FLAG_SPECULAR;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldKind {
    Position,
    Rhw,
    Weight,
    MatrixIndex,
    Normal,
    PointSize,
    Diffuse,
    Specular,
    TexCoord,
    /// Trailing per-vertex specular block present when the mesh (not the
    /// FVF) has its specular flag set.
    MeshSpecular,
}

impl FieldKind {
    /// Whether the decoder keeps the field's value.
    pub fn is_retained(self) -> bool {
        matches!(
            self,
            FieldKind::Position
                | FieldKind::Weight
                | FieldKind::MatrixIndex
                | FieldKind::Normal
                | FieldKind::TexCoord
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VertexField {
    pub kind: FieldKind,
    /// Weights for `Weight`, texture sets for `TexCoord`, 1 otherwise.
    pub count: u32,
    pub byte_width: usize,
}

impl VertexField {
    fn single(kind: FieldKind, byte_width: usize) -> Self {
        Self {
            kind,
            count: 1,
            byte_width,
        }
    }
}

/// Ordered field list for one vertex record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VertexLayout {
    fvf: u32,
    fields: Vec<VertexField>,
}

impl VertexLayout {
    /// Layout implied by the FVF bits alone.
    pub fn from_fvf(fvf: u32) -> Self {
        let mut fields = Vec::new();

        let has_position = fvf & D3DFVF_POSITION_MASK != 0;
        let has_rhw = fvf & D3DFVF_POSITION_MASK == D3DFVF_XYZRHW;

        let selector = blend_selector(fvf);
        let has_weights = selector >= D3DFVF_XYZB1;
        let mut weight_count = if has_weights {
            1 + ((selector - D3DFVF_XYZB1) >> 1)
        } else {
            0
        };

        // The last beta slot holds packed matrix indices instead of a weight.
        let has_matrix_indices = has_weights
            && (selector == D3DFVF_XYZB5
                || fvf & D3DFVF_LASTBETA_D3DCOLOR != 0
                || fvf & D3DFVF_LASTBETA_UBYTE4 != 0);
        if has_matrix_indices {
            weight_count -= 1;
        }

        if has_position {
            fields.push(VertexField::single(FieldKind::Position, 12));
        }
        if has_rhw {
            fields.push(VertexField::single(FieldKind::Rhw, 4));
        }
        if weight_count > 0 {
            fields.push(VertexField {
                kind: FieldKind::Weight,
                count: weight_count,
                byte_width: 4 * weight_count as usize,
            });
        }
        if has_matrix_indices {
            fields.push(VertexField::single(FieldKind::MatrixIndex, 4));
        }
        if fvf & D3DFVF_NORMAL != 0 {
            fields.push(VertexField::single(FieldKind::Normal, 12));
        }
        if fvf & D3DFVF_PSIZE != 0 {
            fields.push(VertexField::single(FieldKind::PointSize, 4));
        }
        if fvf & D3DFVF_DIFFUSE != 0 {
            fields.push(VertexField::single(FieldKind::Diffuse, 16));
        }
        if fvf & D3DFVF_SPECULAR != 0 {
            fields.push(VertexField::single(FieldKind::Specular, 16));
        }

        // Only the first set is kept; each extra set occupies 4 bytes.
        let tex_sets = tex_count(fvf);
        if tex_sets > 0 {
            fields.push(VertexField {
                kind: FieldKind::TexCoord,
                count: tex_sets,
                byte_width: 8 + (tex_sets as usize - 1) * 4,
            });
        }

        Self { fvf, fields }
    }

    /// Layout of a VERT record belonging to a mesh with `fvf` and `mesh_flags`.
    pub fn for_mesh(fvf: u32, mesh_flags: u32) -> Self {
        let mut layout = Self::from_fvf(fvf);
        if mesh_flags & MESH_FLAG_SPECULAR != 0 {
            layout
                .fields
                .push(VertexField::single(FieldKind::MeshSpecular, 16));
        }
        layout
    }

    pub fn fvf(&self) -> u32 {
        self.fvf
    }

    pub fn fields(&self) -> &[VertexField] {
        &self.fields
    }

    pub fn field(&self, kind: FieldKind) -> Option<&VertexField> {
        self.fields.iter().find(|f| f.kind == kind)
    }

    pub fn has(&self, kind: FieldKind) -> bool {
        self.field(kind).is_some()
    }

    pub fn weight_count(&self) -> u32 {
        self.field(FieldKind::Weight).map_or(0, |f| f.count)
    }

    pub fn tex_coord_count(&self) -> u32 {
        self.field(FieldKind::TexCoord).map_or(0, |f| f.count)
    }

    /// Size in bytes of one vertex record.
    pub fn byte_width(&self) -> usize {
        self.fields.iter().map(|f| f.byte_width).sum()
    }
}
