use super::*;

// Format tags
const FORMAT_PCM: u16 = 1;
const FORMAT_IEEE_FLOAT: u16 = 3;
const FORMAT_ALAW: u16 = 6;
const FORMAT_MULAW: u16 = 7;
const FORMAT_EXTENSIBLE: u16 = 65534; // 0xFFFE

// Chunk Identifiers
const RIFF_CHUNK_ID: &ChunkId = b"RIFF";
const WAVE_FORMAT_ID: &ChunkId = b"WAVE";
const FMT_CHUNK_ID: &ChunkId = b"fmt ";
const FACT_CHUNK_ID: &ChunkId = b"fact";
const DATA_CHUNK_ID: &ChunkId = b"data";
const LIST_CHUNK_ID: &ChunkId = b"LIST";
const INFO_LIST_TYPE: &ChunkId = b"INFO";

// Chunk Structures
const HEADER_SIZE: usize = 12; // RIFF + size + WAVE
const EXTENSIBLE_EXTRA_SIZE: usize = 22;

fn format_name(format_tag: u16) -> String {
    match format_tag {
        FORMAT_PCM => "WAV PCM".to_string(),
        FORMAT_IEEE_FLOAT => "WAV IEEE Float".to_string(),
        FORMAT_ALAW => "WAV A-Law".to_string(),
        FORMAT_MULAW => "WAV u-Law".to_string(),
        other => format!("WAV format 0x{:04X}", other),
    }
}

/// The `fmt ` chunk, including the WAVE_FORMAT_EXTENSIBLE tail.
pub struct FormatChunk;

impl ChunkDecoder for FormatChunk {
    fn decode(
        &self,
        _header: &ChunkHeader,
        cursor: &mut ByteCursor<'_>,
        target: &mut DecodeTarget,
    ) -> Result<Decoded> {
        let mut format_tag = cursor.read_u16()?;
        let channels = cursor.read_u16()?;
        let sample_rate = cursor.read_u32()?;
        let byte_rate = cursor.read_u32()?;
        let _block_align = cursor.read_u16()?;
        let bits_per_sample = cursor.read_u16()?;

        let mut outcome = Decoded::Complete;
        if format_tag == FORMAT_EXTENSIBLE {
            let extra = if cursor.remaining() >= 2 {
                cursor.read_u16()? as usize
            } else {
                0
            };
            if extra >= EXTENSIBLE_EXTRA_SIZE && cursor.remaining() >= EXTENSIBLE_EXTRA_SIZE {
                let _valid_bits = cursor.read_u16()?;
                let _channel_mask = cursor.read_u32()?;
                // First two bytes of the sub-format GUID carry the real tag
                format_tag = u16::from_le_bytes([cursor.read_u8()?, cursor.read_u8()?]);
                cursor.skip(14)?;
            } else {
                outcome = Decoded::Incomplete("extensible format without sub-format");
            }
        }

        target
            .audio
            .set_channels(channels)
            .set_sample_rate(sample_rate as f64)
            .set_bits_per_sample(bits_per_sample)
            .set_byte_rate(byte_rate)
            .set_bitrate(byte_rate as u64 * 8)
            .set_lossless(matches!(format_tag, FORMAT_PCM | FORMAT_IEEE_FLOAT))
            .set_encoding(format_name(format_tag));

        Ok(outcome)
    }
}

pub struct FactChunk;

impl ChunkDecoder for FactChunk {
    fn decode(
        &self,
        _header: &ChunkHeader,
        cursor: &mut ByteCursor<'_>,
        target: &mut DecodeTarget,
    ) -> Result<Decoded> {
        let frames = cursor.read_u32()?;
        target.audio.set_sample_frames(frames as u64);
        Ok(Decoded::Complete)
    }
}

// `data`: only its declared length matters.
pub struct DataChunk;

impl ChunkDecoder for DataChunk {
    fn decode(
        &self,
        header: &ChunkHeader,
        _cursor: &mut ByteCursor<'_>,
        target: &mut DecodeTarget,
    ) -> Result<Decoded> {
        target.audio.set_audio_data_len(header.size as u64);
        Ok(Decoded::Complete)
    }

    fn needs_body(&self) -> bool {
        false
    }
}

pub struct ListChunk;

impl ChunkDecoder for ListChunk {
    fn decode(
        &self,
        _header: &ChunkHeader,
        cursor: &mut ByteCursor<'_>,
        target: &mut DecodeTarget,
    ) -> Result<Decoded> {
        let list_type = cursor.read_four_cc()?;
        if &list_type != INFO_LIST_TYPE {
            return Ok(Decoded::Skipped);
        }
        target
            .native_or_insert(InfoFlavor::RiffInfo)
            .read_list_body(cursor)?;
        Ok(Decoded::Complete)
    }
}

static WAV_DECODERS: &DecoderTable = &[
    (FMT_CHUNK_ID, &FormatChunk),
    (FACT_CHUNK_ID, &FactChunk),
    (DATA_CHUNK_ID, &DataChunk),
    (LIST_CHUNK_ID, &ListChunk),
    (ID3_CHUNK_ID, &Id3Chunk),
    (ID3_CHUNK_ID_LOWER, &Id3Chunk),
];

// Fill in frame count and duration once every chunk has been seen.
fn finish_timing(audio: &mut AudioPropertiesBuilder) {
    let rate = audio.sample_rate();
    let props = audio.peek();
    let bytes_per_frame =
        props.channels() as u64 * (props.bits_per_sample() as u64).div_ceil(8);

    // PCM files may omit `fact`; derive the count from the data length
    if audio.sample_frames().is_none() && props.is_lossless() && bytes_per_frame > 0 {
        if let Some(len) = audio.audio_data_len() {
            audio.set_sample_frames(len / bytes_per_frame);
        }
    }

    if rate <= 0.0 {
        log::warn!("zero sample rate; duration left at 0");
        return;
    }

    let duration = match (audio.sample_frames(), audio.audio_data_len()) {
        (Some(frames), _) => frames as f64 / rate,
        (None, Some(len)) if audio.byte_rate() > 0 => len as f64 / audio.byte_rate() as f64,
        _ => 0.0,
    };
    audio.set_duration_seconds(duration);
}

pub struct WavContainer;

impl Container for WavContainer {
    fn file_extension(&self) -> &'static str {
        "wav"
    }

    fn validate_file_format(&self, data: &[u8]) -> R<()> {
        if data.len() < HEADER_SIZE {
            return Err(anyhow!("File too small to be a valid WAV"));
        }

        if &data[0..4] != RIFF_CHUNK_ID || &data[8..12] != WAVE_FORMAT_ID {
            return Err(anyhow!("Invalid WAV File: Missing RIFF/WAVE signature"));
        }

        Ok(())
    }

    fn read(&self, data: &[u8], options: &ReadOptions) -> R<Scan> {
        self.validate_file_format(data)?;
        let mut target = DecodeTarget::new(Endianness::Little);

        scan_chunks(
            &data[HEADER_SIZE..],
            Endianness::Little,
            WAV_DECODERS,
            &mut target,
        );

        if target.audio.peek().encoding().is_empty() {
            log::warn!("no usable fmt chunk; audio properties left at defaults");
        } else {
            finish_timing(&mut target.audio);
        }

        Ok(Scan::finish(
            ContainerKind::Wav,
            target,
            InfoFlavor::RiffInfo,
            options,
        ))
    }
}
