use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::chunks::{decode_chunk, resolve_mesh_ranges, ChunkTag, DecodeState};
use super::cursor::ByteCursor;
use super::error::{PlyError, PlyResult};
use super::options::{DecodeOptions, UnknownChunkPolicy};
use super::{PlyDocument, UnparsedTail, PLY_MAGIC};

/// Decode an EPLY buffer with default options.
pub fn parse_ply(data: &[u8]) -> PlyResult<PlyDocument> {
    parse_ply_with(data, &DecodeOptions::default())
}

/// Decode an EPLY buffer.
///
/// The chunk list has no terminator: decoding ends when the buffer ends
/// exactly on a chunk boundary. Any error discards the whole document.
pub fn parse_ply_with(data: &[u8], options: &DecodeOptions) -> PlyResult<PlyDocument> {
    let mut cursor = ByteCursor::new(data);

    let magic = cursor.read_exact(4)?;
    if magic != PLY_MAGIC {
        let mut found = [0u8; 4];
        found.copy_from_slice(magic);
        return Err(PlyError::BadMagic { found });
    }

    // A bare header is a truncated file, not an empty mesh.
    if cursor.is_at_end() {
        return Err(PlyError::UnexpectedEof {
            offset: cursor.position(),
        });
    }

    let mut doc = PlyDocument::default();
    let mut state = DecodeState::default();

    loop {
        let offset = cursor.position();
        let Some(raw_tag) = cursor.read_tag()? else {
            break;
        };

        let Some(tag) = ChunkTag::from_tag(raw_tag) else {
            match options.unknown_chunks {
                UnknownChunkPolicy::Strict => {
                    return Err(PlyError::UnknownChunk {
                        offset,
                        tag: raw_tag,
                    });
                }
                UnknownChunkPolicy::Lenient => {
                    warn!(
                        offset,
                        tag = %String::from_utf8_lossy(&raw_tag),
                        dropped_bytes = cursor.remaining() + 4,
                        "unknown chunk, ignoring the rest of the file"
                    );
                    doc.unparsed_tail = Some(UnparsedTail {
                        offset,
                        tag: raw_tag,
                    });
                    break;
                }
            }
        };

        debug!(chunk = tag.as_str(), offset = %format!("{:#x}", offset), "found data chunk");
        decode_chunk(tag, &mut cursor, &mut doc, &mut state, options, offset)?;
    }

    resolve_mesh_ranges(&mut doc, &state);

    debug!(
        meshes = doc.meshes.len(),
        vertices = doc.positions.len(),
        triangles = doc.indices.len(),
        bones = doc.bones.len(),
        "decoded ply"
    );
    Ok(doc)
}

/// Decode an EPLY stream with default options.
pub fn read_ply<R: Read>(mut reader: R) -> PlyResult<PlyDocument> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    parse_ply(&data)
}

/// Load an EPLY file, taking options from the environment.
pub fn load_ply(path: &Path) -> Result<PlyDocument> {
    load_ply_with(path, &DecodeOptions::from_env())
}

pub fn load_ply_with(path: &Path, options: &DecodeOptions) -> Result<PlyDocument> {
    let data =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    parse_ply_with(&data, options).with_context(|| format!("Failed to decode {}", path.display()))
}
