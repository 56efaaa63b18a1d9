//! Bounds-checked little-endian reader over an in-memory EPLY buffer.

use std::io::{self, Cursor};

use binrw::{binread, BinRead, Endian};

use super::error::{PlyError, PlyResult};

/// `u8` length followed by that many UTF-8 bytes.
#[binread]
#[br(little)]
struct PascalString {
    #[br(temp)]
    len: u8,

    #[br(count = len)]
    bytes: Vec<u8>,
}

/// Sequential reader that owns the read position.
///
/// Every failed read reports the offset where it started, and a failed read
/// never advances the position.
pub struct ByteCursor<'a> {
    inner: Cursor<&'a [u8]>,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            inner: Cursor::new(data),
        }
    }

    pub fn position(&self) -> u64 {
        self.inner.position()
    }

    pub fn len(&self) -> usize {
        self.inner.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn remaining(&self) -> usize {
        self.len().saturating_sub(self.inner.position() as usize)
    }

    pub fn is_at_end(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_exact(&mut self, n: usize) -> PlyResult<&'a [u8]> {
        let start = self.position();
        if self.remaining() < n {
            return Err(PlyError::UnexpectedEof { offset: start });
        }
        let data: &'a [u8] = *self.inner.get_ref();
        let begin = start as usize;
        self.inner.set_position(start + n as u64);
        Ok(&data[begin..begin + n])
    }

    pub fn skip(&mut self, n: usize) -> PlyResult<()> {
        self.read_exact(n).map(|_| ())
    }

    fn read_array<const N: usize>(&mut self) -> PlyResult<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.read_exact(N)?);
        Ok(buf)
    }

    pub fn read_u8(&mut self) -> PlyResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> PlyResult<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> PlyResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> PlyResult<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Next four bytes without consuming them; `None` when fewer remain.
    pub fn peek_tag(&self) -> Option<[u8; 4]> {
        let start = self.position() as usize;
        let data = self.inner.get_ref();
        let bytes = data.get(start..start.checked_add(4)?)?;
        let mut tag = [0u8; 4];
        tag.copy_from_slice(bytes);
        Some(tag)
    }

    /// Reads a chunk tag. `Ok(None)` only when the buffer ends exactly here.
    pub fn read_tag(&mut self) -> PlyResult<Option<[u8; 4]>> {
        if self.is_at_end() {
            return Ok(None);
        }
        self.read_array().map(Some)
    }

    /// Reads a fixed-layout record with binrw.
    pub fn read_le<T>(&mut self) -> PlyResult<T>
    where
        T: for<'b> BinRead<Args<'b> = ()>,
    {
        let start = self.position();
        match T::read_options(&mut self.inner, Endian::Little, ()) {
            Ok(value) => Ok(value),
            Err(err) => {
                self.inner.set_position(start);
                Err(map_binrw_error(err, start))
            }
        }
    }

    /// `u8`-length-prefixed UTF-8 string.
    pub fn read_pascal_string(&mut self) -> PlyResult<String> {
        let start = self.position();
        let raw: PascalString = self.read_le()?;
        String::from_utf8(raw.bytes).map_err(|_| PlyError::InvalidString { offset: start })
    }
}

fn map_binrw_error(err: binrw::Error, offset: u64) -> PlyError {
    if err.is_eof() {
        return PlyError::UnexpectedEof { offset };
    }
    match err {
        binrw::Error::Io(io_err) => PlyError::Io(io_err),
        other => PlyError::Io(io::Error::new(io::ErrorKind::InvalidData, other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_reads_are_little_endian() {
        let mut data = Vec::new();
        data.push(0xAB);
        data.extend_from_slice(&0x1234u16.to_le_bytes());
        data.extend_from_slice(&0xDEADBEEFu32.to_le_bytes());
        data.extend_from_slice(&1.5f32.to_le_bytes());

        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_u8().unwrap(), 0xAB);
        assert_eq!(cursor.read_u16().unwrap(), 0x1234);
        assert_eq!(cursor.read_u32().unwrap(), 0xDEADBEEF);
        assert_eq!(cursor.read_f32().unwrap(), 1.5);
        assert!(cursor.is_at_end());
    }

    #[test]
    fn short_read_reports_start_offset_and_keeps_position() {
        let data = [1u8, 2, 3];
        let mut cursor = ByteCursor::new(&data);
        cursor.skip(1).unwrap();

        let err = cursor.read_u32().unwrap_err();
        assert!(matches!(err, PlyError::UnexpectedEof { offset: 1 }));
        assert_eq!(cursor.position(), 1);
        assert_eq!(cursor.remaining(), 2);
    }

    #[test]
    fn tag_reading_distinguishes_clean_end_from_truncation() {
        let data = *b"MESHVE";
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.peek_tag(), Some(*b"MESH"));
        assert_eq!(cursor.read_tag().unwrap(), Some(*b"MESH"));
        assert_eq!(cursor.peek_tag(), None);
        assert!(matches!(
            cursor.read_tag(),
            Err(PlyError::UnexpectedEof { offset: 4 })
        ));

        let mut empty = ByteCursor::new(&[]);
        assert_eq!(empty.read_tag().unwrap(), None);
    }

    #[test]
    fn pascal_string_reads_length_prefixed_utf8() {
        let mut data = vec![6u8];
        data.extend_from_slice(b"pelvis");
        data.push(0xFF);

        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_pascal_string().unwrap(), "pelvis");
        assert_eq!(cursor.position(), 7);
    }

    #[test]
    fn pascal_string_rejects_invalid_utf8() {
        let data = [2u8, 0xC3, 0x28];
        let mut cursor = ByteCursor::new(&data);
        assert!(matches!(
            cursor.read_pascal_string(),
            Err(PlyError::InvalidString { offset: 0 })
        ));
    }

    #[test]
    fn truncated_pascal_string_is_eof() {
        let data = [5u8, b'a', b'b'];
        let mut cursor = ByteCursor::new(&data);
        assert!(matches!(
            cursor.read_pascal_string(),
            Err(PlyError::UnexpectedEof { offset: 0 })
        ));
        assert_eq!(cursor.position(), 0);
    }
}
