use crate::cursor::{ByteCursor, latin1};
use crate::error::{Error, Result};
use crate::properties::Endianness;
use std::fmt;

pub type ChunkId = [u8; 4];

// Chunk Structures
pub const CHUNK_HEADER_SIZE: usize = 8; // id + size

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub id: ChunkId,
    pub size: u32,
}

impl ChunkHeader {
    // Read an 8-byte header using the cursor's byte order for the size.
    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let id = cursor.read_four_cc()?;
        let size = cursor.read_u32()?;
        Ok(Self { id, size })
    }

    pub fn id_str(&self) -> String {
        latin1(&self.id)
    }

    // Declared size plus the pad byte IFF adds after odd-sized bodies.
    pub fn padded_size(&self) -> usize {
        self.size as usize + (self.size as usize & 1)
    }
}

impl fmt::Display for ChunkHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' ({} bytes)", self.id_str(), self.size)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RawChunk<'a> {
    pub header: ChunkHeader,
    pub body: &'a [u8],
    pub offset: usize,
}

impl<'a> RawChunk<'a> {
    pub fn is_complete(&self) -> bool {
        self.body.len() == self.header.size as usize
    }

    // Cursor bounded to the declared size.
    pub fn cursor(&self, order: Endianness) -> Result<ByteCursor<'a>> {
        if !self.is_complete() {
            return Err(Error::Truncated {
                needed: self.header.size as usize,
                remaining: self.body.len(),
            });
        }
        Ok(ByteCursor::new(self.body, order))
    }
}

// Walks sibling chunks in file order.
pub struct ChunkIter<'a> {
    data: &'a [u8],
    pos: usize,
    order: Endianness,
}

impl<'a> ChunkIter<'a> {
    pub fn new(data: &'a [u8], order: Endianness) -> Self {
        Self {
            data,
            pos: 0,
            order,
        }
    }
}

impl<'a> Iterator for ChunkIter<'a> {
    type Item = RawChunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let left = self.data.len().saturating_sub(self.pos);
        if left < CHUNK_HEADER_SIZE {
            if left > 0 {
                log::trace!("ignoring {} trailing bytes after last chunk", left);
            }
            self.pos = self.data.len();
            return None;
        }

        let mut cursor = ByteCursor::new(&self.data[self.pos..], self.order);
        let header = ChunkHeader::read(&mut cursor).ok()?;
        let offset = self.pos;
        let body_start = self.pos + CHUNK_HEADER_SIZE;
        let available = self.data.len() - body_start;
        let body_len = (header.size as usize).min(available);
        let body = &self.data[body_start..body_start + body_len];

        self.pos = body_start
            .saturating_add(header.padded_size())
            .min(self.data.len());

        Some(RawChunk {
            header,
            body,
            offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
    use std::io::Write;

    fn be_chunk(out: &mut Vec<u8>, id: &ChunkId, body: &[u8]) {
        out.write_all(id).unwrap();
        out.write_u32::<BigEndian>(body.len() as u32).unwrap();
        out.write_all(body).unwrap();
        if body.len() % 2 == 1 {
            out.push(0);
        }
    }

    #[test]
    fn header_reads_id_and_size() {
        let mut data = Vec::new();
        data.write_all(b"fmt ").unwrap();
        data.write_u32::<LittleEndian>(16).unwrap();
        let mut cursor = ByteCursor::little_endian(&data);
        let header = ChunkHeader::read(&mut cursor).unwrap();
        assert_eq!(&header.id, b"fmt ");
        assert_eq!(header.size, 16);
        assert_eq!(header.id_str(), "fmt ");
    }

    #[test]
    fn walks_siblings_with_padding() {
        let mut data = Vec::new();
        be_chunk(&mut data, b"NAME", b"abc");
        be_chunk(&mut data, b"AUTH", b"de");

        let chunks: Vec<_> = ChunkIter::new(&data, Endianness::Big).collect();
        assert_eq!(chunks.len(), 2);
        assert_eq!(&chunks[0].header.id, b"NAME");
        assert_eq!(chunks[0].body, b"abc");
        assert_eq!(&chunks[1].header.id, b"AUTH");
        assert_eq!(chunks[1].offset, 12);
        assert!(chunks.iter().all(RawChunk::is_complete));
    }

    #[test]
    fn oversized_chunk_is_clipped_and_ends_walk() {
        let mut data = Vec::new();
        be_chunk(&mut data, b"NAME", b"ok");
        data.write_all(b"ANNO").unwrap();
        data.write_u32::<BigEndian>(100).unwrap();
        data.write_all(b"short").unwrap();

        let mut iter = ChunkIter::new(&data, Endianness::Big);
        assert!(iter.next().unwrap().is_complete());
        let clipped = iter.next().unwrap();
        assert!(!clipped.is_complete());
        assert_eq!(clipped.body, b"short");
        assert!(clipped.cursor(Endianness::Big).unwrap_err().is_truncated());
        assert!(iter.next().is_none());
    }

    #[test]
    fn short_tail_is_ignored() {
        let mut data = Vec::new();
        be_chunk(&mut data, b"NAME", b"ok");
        data.extend_from_slice(&[0, 0, 0]);
        assert_eq!(ChunkIter::new(&data, Endianness::Big).count(), 1);
    }
}
