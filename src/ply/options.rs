/// Environment variable selecting the unknown-chunk policy (`strict`/`lenient`).
pub const ENV_UNKNOWN_CHUNKS: &str = "MOW_PLY_UNKNOWN_CHUNKS";

/// What to do with a chunk tag the decoder has no handler for.
///
/// Chunk bodies carry no length, so an unknown chunk cannot be skipped:
/// `Lenient` keeps what was decoded before it and drops the rest of the file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownChunkPolicy {
    #[default]
    Strict,
    Lenient,
}

fn parse_unknown_chunk_policy(raw: Option<&str>) -> UnknownChunkPolicy {
    match raw.map(|v| v.trim().to_ascii_lowercase()) {
        Some(v) if v == "lenient" => UnknownChunkPolicy::Lenient,
        _ => UnknownChunkPolicy::Strict,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    pub unknown_chunks: UnknownChunkPolicy,
    /// Warn when a VERT header's declared vertex size disagrees with the
    /// layout resolved from the mesh FVF.
    pub check_vertex_size: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            unknown_chunks: UnknownChunkPolicy::Strict,
            check_vertex_size: true,
        }
    }
}

impl DecodeOptions {
    pub fn from_env() -> Self {
        let raw = std::env::var(ENV_UNKNOWN_CHUNKS).ok();
        Self {
            unknown_chunks: parse_unknown_chunk_policy(raw.as_deref()),
            ..Self::default()
        }
    }

    pub fn lenient() -> Self {
        Self {
            unknown_chunks: UnknownChunkPolicy::Lenient,
            ..Self::default()
        }
    }
}
