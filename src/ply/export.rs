//! Plain-text Wavefront OBJ dump of a decoded document.
//!
//! Meant for eyeballing and diffing geometry; there is no importer for it.

use std::fmt::Write as _;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::math::flip_v;

use super::PlyDocument;

fn face_corner(out: &mut String, index: u32, has_uvs: bool, has_normals: bool) {
    let i = index + 1;
    // Writing to a String cannot fail.
    let _ = match (has_uvs, has_normals) {
        (true, true) => write!(out, "{i}/{i}/{i}"),
        (true, false) => write!(out, "{i}/{i}"),
        (false, true) => write!(out, "{i}//{i}"),
        (false, false) => write!(out, "{i}"),
    };
}

/// Writes `v`, `vt`, `vn` and `f` lines.
///
/// UVs are flipped back to file texture space, and each face lists its stored
/// indices last-to-first with 1-based numbering.
pub fn write_obj<W: Write>(doc: &PlyDocument, out: &mut W) -> io::Result<()> {
    for p in &doc.positions {
        writeln!(out, "v {:.6} {:.6} {:.6}", p.x, p.y, p.z)?;
    }
    for uv in &doc.uvs {
        let uv = flip_v(*uv);
        writeln!(out, "vt {:.6} {:.6}", uv.x, uv.y)?;
    }
    for n in &doc.normals {
        writeln!(out, "vn {:.6} {:.6} {:.6}", n.x, n.y, n.z)?;
    }

    let has_uvs = doc.has_tex_coords();
    let has_normals = doc.has_normals();
    let mut line = String::new();
    for triangle in &doc.indices {
        line.clear();
        line.push('f');
        for &index in triangle.iter().rev() {
            line.push(' ');
            face_corner(&mut line, index, has_uvs, has_normals);
        }
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

pub fn to_obj_string(doc: &PlyDocument) -> String {
    let mut buf = Vec::new();
    // Writing to a Vec cannot fail.
    let _ = write_obj(doc, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

pub fn save_obj(doc: &PlyDocument, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_obj(doc, &mut writer).with_context(|| format!("Failed to write {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))
}
