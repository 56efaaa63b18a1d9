// Common test utilities: builds EPLY byte streams chunk by chunk
#![allow(dead_code)]

use mow_ply_lib::ply::{MESH_FLAG_MATERIAL, MESH_FLAG_SPECULAR, MESH_FLAG_SUBSKIN};

pub fn push_u16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_le_bytes());
}

pub fn push_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

pub fn push_f32(buf: &mut Vec<u8>, v: f32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

pub fn push_name(buf: &mut Vec<u8>, name: &str) {
    buf.push(name.len() as u8);
    buf.extend_from_slice(name.as_bytes());
}

/// One vertex record for the `0x0112` (XYZ | NORMAL | TEX1) format.
pub fn static_vertex(pos: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Vec<u8> {
    let mut buf = Vec::new();
    for v in pos.into_iter().chain(normal).chain(uv) {
        push_f32(&mut buf, v);
    }
    buf
}

/// One vertex record for the `0x1118` (XYZB2 | LASTBETA_UBYTE4 | NORMAL | TEX1) format.
pub fn skinned_vertex(pos: [f32; 3], weight: f32, bones: u32, normal: [f32; 3], uv: [f32; 2]) -> Vec<u8> {
    let mut buf = Vec::new();
    for v in pos {
        push_f32(&mut buf, v);
    }
    push_f32(&mut buf, weight);
    push_u32(&mut buf, bones);
    for v in normal.into_iter().chain(uv) {
        push_f32(&mut buf, v);
    }
    buf
}

/// Appends chunks to an EPLY buffer starting with the magic.
pub struct PlyBuilder {
    buf: Vec<u8>,
}

impl PlyBuilder {
    pub fn new() -> Self {
        Self {
            buf: b"EPLY".to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// MESH chunk with a material; `specular` and `subskin` add their sections and flags.
    /// `faces` is the header's `(first_face, face_count)`, counted in indices.
    pub fn mesh(
        mut self,
        fvf: u32,
        flags: u32,
        faces: (u32, u32),
        specular: Option<[u8; 4]>,
        material: &str,
        subskin: &[u8],
    ) -> Self {
        let mut flags = flags | MESH_FLAG_MATERIAL;
        if specular.is_some() {
            flags |= MESH_FLAG_SPECULAR;
        }
        if !subskin.is_empty() {
            flags |= MESH_FLAG_SUBSKIN;
        }

        self.buf.extend_from_slice(b"MESH");
        push_u32(&mut self.buf, fvf);
        push_u32(&mut self.buf, faces.0);
        push_u32(&mut self.buf, faces.1);
        push_u32(&mut self.buf, flags);
        if let Some(rgba) = specular {
            self.buf.extend_from_slice(&rgba);
        }
        push_name(&mut self.buf, material);
        if !subskin.is_empty() {
            self.buf.push(subskin.len() as u8);
            self.buf.extend_from_slice(subskin);
        }
        self
    }

    pub fn vert(mut self, vertex_size: u16, vertex_flags: u16, records: &[Vec<u8>]) -> Self {
        self.buf.extend_from_slice(b"VERT");
        push_u32(&mut self.buf, records.len() as u32);
        push_u16(&mut self.buf, vertex_size);
        push_u16(&mut self.buf, vertex_flags);
        for record in records {
            self.buf.extend_from_slice(record);
        }
        self
    }

    pub fn indx(mut self, indices: &[u16]) -> Self {
        self.buf.extend_from_slice(b"INDX");
        push_u32(&mut self.buf, indices.len() as u32);
        for &i in indices {
            push_u16(&mut self.buf, i);
        }
        self
    }

    pub fn skin(mut self, bones: &[&str]) -> Self {
        self.buf.extend_from_slice(b"SKIN");
        push_u32(&mut self.buf, bones.len() as u32);
        for bone in bones {
            push_name(&mut self.buf, bone);
        }
        self
    }

    pub fn bnds(mut self, min: [f32; 3], max: [f32; 3]) -> Self {
        self.buf.extend_from_slice(b"BNDS");
        for v in min.into_iter().chain(max) {
            push_f32(&mut self.buf, v);
        }
        self
    }

    pub fn mror(mut self) -> Self {
        self.buf.extend_from_slice(b"MROR");
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}

/// A textured quad: one `0x0112` mesh, four vertices, two triangles.
pub fn quad_ply(flags: u32) -> Vec<u8> {
    let n = [0.0, 0.0, 1.0];
    PlyBuilder::new()
        .mesh(0x0112, flags, (0, 6), None, "quad.mtl", &[])
        .vert(
            32,
            0x0404,
            &[
                static_vertex([0.0, 0.0, 0.0], n, [0.0, 0.0]),
                static_vertex([1.0, 0.0, 0.0], n, [1.0, 0.0]),
                static_vertex([1.0, 1.0, 0.0], n, [1.0, 0.7]),
                static_vertex([0.0, 1.0, 0.0], n, [0.0, 1.0]),
            ],
        )
        .indx(&[0, 1, 2, 0, 2, 3])
        .build()
}
