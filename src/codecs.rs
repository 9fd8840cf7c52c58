use crate::chunk::{ChunkHeader, ChunkId, ChunkIter};
use crate::cursor::ByteCursor;
use crate::error::Result;
use crate::prelude::*;
use crate::properties::{AudioProperties, AudioPropertiesBuilder, Endianness};
use crate::tag::{CompositeTag, Id3v2Tag, InfoFlavor, InfoTag};
mod aif;
mod wav;
pub use aif::{AifContainer, AiffVariant, CommonChunk};
pub use wav::{FormatChunk, WavContainer};

// Embedded ID3 chunk identifiers, shared by AIFF and WAV
pub const ID3_CHUNK_ID: &ChunkId = b"ID3 ";
pub const ID3_CHUNK_ID_LOWER: &ChunkId = b"id3 ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Aiff,
    Aifc,
    Wav,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    Complete,
    // The chunk ended before optional data the variant expects.
    Incomplete(&'static str),
    // Recognised, but nothing in it applies.
    Skipped,
}

#[derive(Debug)]
pub struct DecodeTarget {
    pub audio: AudioPropertiesBuilder,
    pub native: Option<InfoTag>,
    pub id3: Option<Id3v2Tag>,
}

impl DecodeTarget {
    pub fn new(endianness: Endianness) -> Self {
        Self {
            audio: AudioPropertiesBuilder::new(endianness),
            native: None,
            id3: None,
        }
    }

    pub fn native_or_insert(&mut self, flavor: InfoFlavor) -> &mut InfoTag {
        self.native.get_or_insert_with(|| InfoTag::new(flavor))
    }
}

// Decodes one kind of chunk.
pub trait ChunkDecoder: Sync {
    fn decode(
        &self,
        header: &ChunkHeader,
        cursor: &mut ByteCursor<'_>,
        target: &mut DecodeTarget,
    ) -> Result<Decoded>;

    // Decoders that only look at the header also run on chunks cut short by
    // the end of the file; they get an empty cursor.
    fn needs_body(&self) -> bool {
        true
    }
}

pub type DecoderTable = [(&'static ChunkId, &'static dyn ChunkDecoder)];

fn find_decoder(table: &DecoderTable, id: &ChunkId) -> Option<&'static dyn ChunkDecoder> {
    table
        .iter()
        .find(|(chunk_id, _)| *chunk_id == id)
        .map(|(_, decoder)| *decoder)
}

pub fn scan_chunks(
    body: &[u8],
    order: Endianness,
    table: &DecoderTable,
    target: &mut DecodeTarget,
) {
    for chunk in ChunkIter::new(body, order) {
        let header = chunk.header;
        let Some(decoder) = find_decoder(table, &header.id) else {
            log::trace!("no decoder for chunk {}", header);
            continue;
        };

        let outcome = if decoder.needs_body() {
            chunk
                .cursor(order)
                .and_then(|mut cursor| decoder.decode(&header, &mut cursor, target))
        } else {
            decoder.decode(&header, &mut ByteCursor::new(&[], order), target)
        };

        match outcome {
            Ok(Decoded::Complete) => log::debug!("decoded chunk {}", header),
            Ok(Decoded::Skipped) => log::debug!("skipped chunk {}", header),
            Ok(Decoded::Incomplete(reason)) => {
                log::warn!("chunk {} incomplete: {}", header, reason)
            }
            Err(e) => log::warn!(
                "chunk {} at offset {} unusable: {}",
                header,
                chunk.offset,
                e
            ),
        }
    }
}

/// Embedded ID3v2 tag. The first one found wins.
pub struct Id3Chunk;

impl ChunkDecoder for Id3Chunk {
    fn decode(
        &self,
        header: &ChunkHeader,
        cursor: &mut ByteCursor<'_>,
        target: &mut DecodeTarget,
    ) -> Result<Decoded> {
        if target.id3.is_some() {
            log::debug!("ignoring extra ID3 chunk {}", header);
            return Ok(Decoded::Skipped);
        }
        target.id3 = Some(Id3v2Tag::read(cursor.rest())?);
        Ok(Decoded::Complete)
    }
}

#[derive(Debug, Clone)]
pub struct Scan {
    pub kind: ContainerKind,
    pub properties: AudioProperties,
    pub tag: CompositeTag,
}

impl Scan {
    pub(crate) fn finish(
        kind: ContainerKind,
        target: DecodeTarget,
        flavor: InfoFlavor,
        options: &ReadOptions,
    ) -> Self {
        let DecodeTarget { audio, native, id3 } = target;
        let mut tag = CompositeTag::from_file(native, id3);

        if !tag.has_native_tag() && options.create_native_tag {
            tag.set_native_tag(Some(InfoTag::new(flavor)));
        }
        if !tag.has_id3_tag() && options.create_id3_tag {
            tag.set_id3_tag(Some(Id3v2Tag::new(options.id3_version)));
        }

        Scan {
            kind,
            properties: audio.build(),
            tag,
        }
    }
}

pub trait Container: Send + Sync {
    fn file_extension(&self) -> &'static str;

    fn validate_file_format(&self, data: &[u8]) -> R<()>;

    fn read(&self, data: &[u8], options: &ReadOptions) -> R<Scan>;
}

pub fn get_container(file_path: &str) -> R<Box<dyn Container>> {
    let extension = std::path::Path::new(file_path)
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| anyhow!("Invalid file extension"))?;

    match extension.to_lowercase().as_str() {
        "wav" => Ok(Box::new(WavContainer)),
        "aif" | "aiff" | "aifc" => Ok(Box::new(AifContainer)),
        _ => Err(anyhow!("No container found for extension: {}", extension)),
    }
}

pub fn detect_container(data: &[u8]) -> R<Box<dyn Container>> {
    if WavContainer.validate_file_format(data).is_ok() {
        return Ok(Box::new(WavContainer));
    }
    if AifContainer.validate_file_format(data).is_ok() {
        return Ok(Box::new(AifContainer));
    }
    Err(anyhow!("Unrecognised container signature"))
}
