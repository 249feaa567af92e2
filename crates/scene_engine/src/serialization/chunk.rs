//! Chunk framing
//!
//! Every chunk is a 12 byte header `(id, version, size_in_bytes)` of
//! little-endian `u32`s followed by `size_in_bytes` of payload. Readers skip
//! chunks they do not recognise by size, which lets newer writers interleave
//! extension chunks without breaking older readers.

use std::io::{Cursor, Read, Write};

use crate::error::{SceneError, SceneResult};
use super::stream::{read_u32, write_u32};

/// Scene counters: next and minimum automatic node ID
pub const CHUNK_SCENE_INFO: u32 = 0x5343_0001;
/// Scene properties: name, background clear, HDR and bloom
pub const CHUNK_SCENE_PROPERTIES: u32 = 0x5343_0002;
/// Navigation mesh settings
pub const CHUNK_SCENE_NAVIGATION: u32 = 0x5343_0003;
/// Child to parent pairs of local node indices
pub const CHUNK_SCENE_HIERARCHY: u32 = 0x5343_0004;
/// Node count, node IDs and per-node payloads
pub const CHUNK_SCENE_NODES: u32 = 0x5343_0005;

/// Node identity, name, flags and parent
pub const CHUNK_NODE_GENERAL: u32 = 0x4E44_0001;
/// Node local transform
pub const CHUNK_NODE_TRANSFORM: u32 = 0x4E44_0002;
/// Node components
pub const CHUNK_NODE_COMPONENTS: u32 = 0x4E44_0003;

/// Version written for every chunk this crate produces
pub const CHUNK_VERSION: u32 = 1;

/// Human readable chunk name for diagnostics
pub const fn chunk_name(id: u32) -> &'static str {
    match id {
        CHUNK_SCENE_INFO => "SceneInfo",
        CHUNK_SCENE_PROPERTIES => "SceneProperties",
        CHUNK_SCENE_NAVIGATION => "SceneNavigation",
        CHUNK_SCENE_HIERARCHY => "SceneHierarchy",
        CHUNK_SCENE_NODES => "SceneNodes",
        CHUNK_NODE_GENERAL => "NodeGeneral",
        CHUNK_NODE_TRANSFORM => "NodeTransform",
        CHUNK_NODE_COMPONENTS => "NodeComponents",
        _ => "Unknown",
    }
}

/// Header preceding every chunk payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Chunk type
    pub id: u32,
    /// Payload layout version
    pub version: u32,
    /// Payload length in bytes
    pub size: u32,
}

impl ChunkHeader {
    /// Encoded header length
    pub const SIZE: usize = 12;

    /// Write the header
    pub fn write<W: Write>(&self, writer: &mut W) -> SceneResult<()> {
        write_u32(writer, self.id)?;
        write_u32(writer, self.version)?;
        write_u32(writer, self.size)
    }

    /// Read a header, or `None` at a clean end of stream
    pub fn read<R: Read>(reader: &mut R) -> SceneResult<Option<Self>> {
        let mut buf = [0u8; Self::SIZE];
        let mut filled = 0;
        while filled < Self::SIZE {
            let n = reader.read(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        match filled {
            0 => Ok(None),
            Self::SIZE => {
                let mut cursor = Cursor::new(&buf[..]);
                Ok(Some(Self {
                    id: read_u32(&mut cursor)?,
                    version: read_u32(&mut cursor)?,
                    size: read_u32(&mut cursor)?,
                }))
            }
            _ => Err(SceneError::CorruptedData(format!(
                "stream ended inside a chunk header ({filled} of {} bytes)",
                Self::SIZE
            ))),
        }
    }

    /// Fail unless the header carries the current version
    pub fn expect_version(&self) -> SceneResult<()> {
        if self.version == CHUNK_VERSION {
            Ok(())
        } else {
            log::error!(
                "Chunk '{}' has unsupported version {} (expected {})",
                chunk_name(self.id),
                self.version,
                CHUNK_VERSION
            );
            Err(SceneError::UnsupportedChunkVersion {
                chunk: chunk_name(self.id),
                version: self.version,
            })
        }
    }
}

/// A chunk read into memory
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Header as found in the stream
    pub header: ChunkHeader,
    /// Raw payload
    pub payload: Vec<u8>,
}

impl Chunk {
    /// Read the next chunk, or `None` at a clean end of stream
    pub fn read<R: Read>(reader: &mut R) -> SceneResult<Option<Self>> {
        let Some(header) = ChunkHeader::read(reader)? else {
            return Ok(None);
        };
        // Size comes from the stream; never allocate it up front.
        let mut payload = Vec::new();
        reader.by_ref().take(u64::from(header.size)).read_to_end(&mut payload)?;
        if payload.len() != header.size as usize {
            return Err(SceneError::CorruptedData(format!(
                "chunk '{}' truncated, expected {} bytes, found {}",
                chunk_name(header.id),
                header.size,
                payload.len()
            )));
        }
        Ok(Some(Self { header, payload }))
    }

    /// Read the next chunk and require it to be of the given type
    pub fn read_expected<R: Read>(reader: &mut R, id: u32) -> SceneResult<Self> {
        let chunk = Self::read(reader)?.ok_or(SceneError::MissingChunk(chunk_name(id)))?;
        if chunk.header.id != id {
            return Err(SceneError::UnexpectedChunk {
                expected: chunk_name(id),
                found: chunk.header.id,
            });
        }
        chunk.header.expect_version()?;
        Ok(chunk)
    }

    /// Parse the payload, checking that exactly the declared bytes are consumed
    ///
    /// A parser that stops early leaves the stream where the next header is
    /// expected anyway, since the payload was read as a whole; the mismatch is
    /// still reported because it means reader and writer disagree.
    pub fn parse<T>(&self, parse: impl FnOnce(&mut Cursor<&[u8]>) -> SceneResult<T>) -> SceneResult<T> {
        let mut cursor = Cursor::new(self.payload.as_slice());
        let value = parse(&mut cursor)?;
        let consumed = cursor.position();
        if consumed != u64::from(self.header.size) {
            log::error!(
                "Chunk '{}' desynchronized: consumed {consumed} of {} bytes",
                chunk_name(self.header.id),
                self.header.size
            );
            debug_assert_eq!(consumed, u64::from(self.header.size), "chunk payload desynchronized");
        }
        Ok(value)
    }
}

/// Write one chunk whose payload is produced by `body`
pub fn write_chunk<W: Write>(
    writer: &mut W,
    id: u32,
    body: impl FnOnce(&mut Vec<u8>) -> SceneResult<()>,
) -> SceneResult<()> {
    let mut payload = Vec::new();
    body(&mut payload)?;
    let size = u32::try_from(payload.len())
        .map_err(|_| SceneError::CorruptedData(format!("chunk '{}' exceeds 4 GiB", chunk_name(id))))?;

    ChunkHeader { id, version: CHUNK_VERSION, size }.write(writer)?;
    writer.write_all(&payload)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialization::stream::{read_u64, write_u64};

    #[test]
    fn test_header_layout() {
        let mut buf = Vec::new();
        write_chunk(&mut buf, CHUNK_SCENE_INFO, |body| write_u64(body, 9)).unwrap();

        assert_eq!(buf.len(), ChunkHeader::SIZE + 8);
        assert_eq!(&buf[0..4], &CHUNK_SCENE_INFO.to_le_bytes());
        assert_eq!(&buf[4..8], &CHUNK_VERSION.to_le_bytes());
        assert_eq!(&buf[8..12], &8u32.to_le_bytes());
    }

    #[test]
    fn test_read_until_end_of_stream() {
        let mut buf = Vec::new();
        write_chunk(&mut buf, CHUNK_SCENE_INFO, |body| write_u64(body, 1)).unwrap();
        write_chunk(&mut buf, 0xDEAD_BEEF, |body| write_u64(body, 2)).unwrap();

        let mut cursor = Cursor::new(buf);
        let first = Chunk::read(&mut cursor).unwrap().unwrap();
        let second = Chunk::read(&mut cursor).unwrap().unwrap();

        assert_eq!(first.parse(|c| read_u64(c)).unwrap(), 1);
        assert_eq!(second.header.id, 0xDEAD_BEEF);
        assert!(Chunk::read(&mut cursor).unwrap().is_none());
    }

    #[test]
    fn test_unsupported_version_is_rejected() {
        let mut buf = Vec::new();
        ChunkHeader { id: CHUNK_NODE_GENERAL, version: 7, size: 0 }.write(&mut buf).unwrap();

        let result = Chunk::read_expected(&mut Cursor::new(buf), CHUNK_NODE_GENERAL);

        assert!(matches!(
            result,
            Err(SceneError::UnsupportedChunkVersion { chunk: "NodeGeneral", version: 7 })
        ));
    }

    #[test]
    fn test_oversized_chunk_is_corrupt() {
        let mut buf = Vec::new();
        ChunkHeader { id: CHUNK_NODE_GENERAL, version: CHUNK_VERSION, size: u32::MAX }.write(&mut buf).unwrap();
        buf.extend_from_slice(&[0u8; 16]);

        let result = Chunk::read(&mut Cursor::new(buf));
        assert!(matches!(result, Err(SceneError::CorruptedData(_))));
    }

    #[test]
    fn test_partial_header_is_corrupt() {
        let result = ChunkHeader::read(&mut Cursor::new(vec![1u8, 2, 3]));
        assert!(matches!(result, Err(SceneError::CorruptedData(_))));
    }
}
