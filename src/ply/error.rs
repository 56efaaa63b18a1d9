use std::io;

/// EPLY decode error types.
///
/// Every variant except `Io` carries the byte offset at which the problem
/// was detected.
#[derive(Debug)]
pub enum PlyError {
    /// IO error while reading the source stream
    Io(io::Error),

    /// The stream does not start with `EPLY`
    BadMagic { found: [u8; 4] },

    /// A read ran past the end of the buffer
    UnexpectedEof { offset: u64 },

    /// A chunk tag with no decoder
    UnknownChunk { offset: u64, tag: [u8; 4] },

    /// MESH chunk without a material filename (pre-material format)
    UnsupportedLegacyMesh { offset: u64, flags: u32 },

    /// VERT chunk with no MESH chunk before it
    VertexLayoutMismatch { offset: u64 },

    /// INDX chunk with no MESH chunk before it
    OrphanIndices { offset: u64 },

    /// INDX count that is not a whole number of triangles
    MalformedIndexCount { offset: u64, count: u32 },

    /// Length-prefixed string that is not valid UTF-8
    InvalidString { offset: u64 },
}

impl PlyError {
    pub fn offset(&self) -> Option<u64> {
        match self {
            PlyError::Io(_) => None,
            PlyError::BadMagic { .. } => Some(0),
            PlyError::UnexpectedEof { offset }
            | PlyError::UnknownChunk { offset, .. }
            | PlyError::UnsupportedLegacyMesh { offset, .. }
            | PlyError::VertexLayoutMismatch { offset }
            | PlyError::OrphanIndices { offset }
            | PlyError::MalformedIndexCount { offset, .. }
            | PlyError::InvalidString { offset } => Some(*offset),
        }
    }
}

impl std::fmt::Display for PlyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlyError::Io(e) => write!(f, "IO error: {}", e),
            PlyError::BadMagic { found } => {
                write!(f, "Bad magic {:?}, expected \"EPLY\"", String::from_utf8_lossy(found))
            }
            PlyError::UnexpectedEof { offset } => {
                write!(f, "Unexpected end of data at offset {:#x}", offset)
            }
            PlyError::UnknownChunk { offset, tag } => write!(
                f,
                "Unknown chunk {:?} at offset {:#x}",
                String::from_utf8_lossy(tag),
                offset
            ),
            PlyError::UnsupportedLegacyMesh { offset, flags } => write!(
                f,
                "Mesh chunk at offset {:#x} has no material file (flags {:#x}); old PLY format is not supported",
                offset, flags
            ),
            PlyError::VertexLayoutMismatch { offset } => write!(
                f,
                "Vertex chunk at offset {:#x} has no preceding mesh chunk",
                offset
            ),
            PlyError::OrphanIndices { offset } => write!(
                f,
                "Index chunk at offset {:#x} has no preceding mesh chunk",
                offset
            ),
            PlyError::MalformedIndexCount { offset, count } => write!(
                f,
                "Index count {} at offset {:#x} is not a multiple of 3",
                count, offset
            ),
            PlyError::InvalidString { offset } => {
                write!(f, "Invalid UTF-8 string at offset {:#x}", offset)
            }
        }
    }
}

impl std::error::Error for PlyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlyError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for PlyError {
    fn from(err: io::Error) -> Self {
        PlyError::Io(err)
    }
}

/// Result type for EPLY decoding
pub type PlyResult<T> = std::result::Result<T, PlyError>;
