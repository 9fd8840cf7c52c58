use super::*;
use crate::compression::{self, SOWT};
use crate::cursor::latin1;
use crate::error::Error;

// Chunk Identifiers
const FORM_CHUNK_ID: &ChunkId = b"FORM";
const AIFF_FORMAT_ID: &ChunkId = b"AIFF";
const AIFC_FORMAT_ID: &ChunkId = b"AIFC";
const COMM_CHUNK_ID: &ChunkId = b"COMM";

// AIFF Metadata Chunk Identifiers
const NAME_CHUNK_ID: &ChunkId = b"NAME";
const AUTH_CHUNK_ID: &ChunkId = b"AUTH";
const COPYRIGHT_CHUNK_ID: &ChunkId = b"(c) ";
const ANNO_CHUNK_ID: &ChunkId = b"ANNO";

// FORM + size + form type
const HEADER_SIZE: usize = 12;

// Plain AIFF carries no compression code; it is always big-endian PCM
const PLAIN_PCM_CODE: &ChunkId = b"NONE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiffVariant {
    Aiff,
    // Carries compression metadata after the fixed COMM fields.
    Aifc,
}

impl AiffVariant {
    fn from_form_type(form_type: &[u8]) -> Option<Self> {
        match form_type {
            t if t == AIFF_FORMAT_ID => Some(AiffVariant::Aiff),
            t if t == AIFC_FORMAT_ID => Some(AiffVariant::Aifc),
            _ => None,
        }
    }

    fn supports_compression(self) -> bool {
        self == AiffVariant::Aifc
    }

    fn kind(self) -> ContainerKind {
        match self {
            AiffVariant::Aiff => ContainerKind::Aiff,
            AiffVariant::Aifc => ContainerKind::Aifc,
        }
    }

    fn decoders(self) -> &'static DecoderTable {
        match self {
            AiffVariant::Aiff => AIFF_DECODERS,
            AiffVariant::Aifc => AIFC_DECODERS,
        }
    }
}

/// The `COMM` chunk: channel count, frame count, sample size and rate, plus
/// the compression code and its name under AIFC.
pub struct CommonChunk {
    pub variant: AiffVariant,
}

impl ChunkDecoder for CommonChunk {
    fn decode(
        &self,
        _header: &ChunkHeader,
        cursor: &mut ByteCursor<'_>,
        target: &mut DecodeTarget,
    ) -> Result<Decoded> {
        let channels = cursor.read_u16()?;
        let frames = cursor.read_u32()?;
        let bits = cursor.read_u16()?;
        let rate = cursor.read_extended_f80()?;

        // Nothing reaches the builder until the chunk is known to be usable
        let commit_fixed = |audio: &mut AudioPropertiesBuilder| {
            audio
                .set_channels(channels)
                .set_sample_frames(frames as u64)
                .set_bits_per_sample(bits)
                .set_sample_rate(rate);
        };

        let mut endianness = Endianness::Big;
        let (lossless, encoding) = if self.variant.supports_compression() {
            if cursor.remaining() == 0 {
                commit_fixed(&mut target.audio);
                return Ok(Decoded::Incomplete("no compression type after fixed fields"));
            }

            let code = cursor.read_four_cc()?;
            if &code == SOWT {
                endianness = Endianness::Little;
            }
            let display_name = cursor.read_pascal_string()?;

            // One trailing byte seen in some writers' output; not accounted
            // for by the pascal string's own padding.
            if cursor.remaining() > 0 {
                cursor.skip(1)?;
            }

            match compression::lookup(&code) {
                Some(entry) => (entry.lossless, entry.name.to_string()),
                None if display_name.is_empty() => (false, latin1(&code)),
                None => (false, display_name),
            }
        } else {
            let name = compression::lookup(PLAIN_PCM_CODE)
                .map(|entry| entry.name)
                .unwrap_or_default();
            (true, name.to_string())
        };

        if !(rate.is_finite() && rate > 0.0) {
            return Err(Error::InvalidSampleRate(rate));
        }

        commit_fixed(&mut target.audio);
        target
            .audio
            .set_endianness(endianness)
            .set_lossless(lossless)
            .set_encoding(encoding)
            .set_duration_seconds(frames as f64 / rate)
            .set_bitrate((rate * bits as f64 * channels as f64) as u64);

        Ok(Decoded::Complete)
    }
}

pub struct TextChunk;

impl ChunkDecoder for TextChunk {
    fn decode(
        &self,
        header: &ChunkHeader,
        cursor: &mut ByteCursor<'_>,
        target: &mut DecodeTarget,
    ) -> Result<Decoded> {
        target
            .native_or_insert(InfoFlavor::AiffText)
            .add_text_chunk(&header.id_str(), cursor.rest());
        Ok(Decoded::Complete)
    }
}

static AIFF_COMMON: CommonChunk = CommonChunk {
    variant: AiffVariant::Aiff,
};
static AIFC_COMMON: CommonChunk = CommonChunk {
    variant: AiffVariant::Aifc,
};

static AIFF_DECODERS: &DecoderTable = &[
    (COMM_CHUNK_ID, &AIFF_COMMON),
    (NAME_CHUNK_ID, &TextChunk),
    (AUTH_CHUNK_ID, &TextChunk),
    (COPYRIGHT_CHUNK_ID, &TextChunk),
    (ANNO_CHUNK_ID, &TextChunk),
    (ID3_CHUNK_ID, &Id3Chunk),
    (ID3_CHUNK_ID_LOWER, &Id3Chunk),
];

static AIFC_DECODERS: &DecoderTable = &[
    (COMM_CHUNK_ID, &AIFC_COMMON),
    (NAME_CHUNK_ID, &TextChunk),
    (AUTH_CHUNK_ID, &TextChunk),
    (COPYRIGHT_CHUNK_ID, &TextChunk),
    (ANNO_CHUNK_ID, &TextChunk),
    (ID3_CHUNK_ID, &Id3Chunk),
    (ID3_CHUNK_ID_LOWER, &Id3Chunk),
];

pub struct AifContainer;

impl AifContainer {
    fn variant(&self, data: &[u8]) -> R<AiffVariant> {
        if data.len() < HEADER_SIZE {
            return Err(anyhow!("File too small to be a valid AIFF"));
        }
        if &data[0..4] != FORM_CHUNK_ID {
            return Err(anyhow!("Not a FORM file"));
        }
        AiffVariant::from_form_type(&data[8..12]).ok_or_else(|| {
            anyhow!(
                "Not an AIFF or AIFC file: form type {:?}",
                latin1(&data[8..12])
            )
        })
    }
}

impl Container for AifContainer {
    fn file_extension(&self) -> &'static str {
        "aif"
    }

    fn validate_file_format(&self, data: &[u8]) -> R<()> {
        self.variant(data).map(|_| ())
    }

    fn read(&self, data: &[u8], options: &ReadOptions) -> R<Scan> {
        let variant = self.variant(data)?;
        let mut target = DecodeTarget::new(Endianness::Big);

        scan_chunks(
            &data[HEADER_SIZE..],
            Endianness::Big,
            variant.decoders(),
            &mut target,
        );

        if target.audio.sample_frames().is_none() {
            log::warn!("no usable COMM chunk; audio properties left at defaults");
        }

        Ok(Scan::finish(
            variant.kind(),
            target,
            InfoFlavor::AiffText,
            options,
        ))
    }
}
