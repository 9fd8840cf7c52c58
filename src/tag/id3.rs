use super::{FieldKey, FieldList, TagField, TagStore};
use crate::cursor::{ByteCursor, latin1};
use crate::error::{Error, Result};

const ID3_MAGIC: &[u8; 3] = b"ID3";
const TAG_HEADER_SIZE: usize = 10;

// Header flags
const FLAG_UNSYNCHRONISATION: u8 = 0x80;
const FLAG_EXTENDED_HEADER: u8 = 0x40;

// ID3v2.3 frame format flags
const V23_COMPRESSION: u16 = 0x0080;
const V23_ENCRYPTION: u16 = 0x0040;
const V23_GROUPING: u16 = 0x0020;

// ID3v2.4 frame format flags
const V24_GROUPING: u16 = 0x0040;
const V24_COMPRESSION: u16 = 0x0008;
const V24_ENCRYPTION: u16 = 0x0004;
const V24_UNSYNCHRONISATION: u16 = 0x0002;
const V24_DATA_LENGTH: u16 = 0x0001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Id3Version {
    V22,
    V23,
    V24,
}

impl Id3Version {
    fn from_major(major: u8) -> Result<Self> {
        match major {
            2 => Ok(Id3Version::V22),
            3 => Ok(Id3Version::V23),
            4 => Ok(Id3Version::V24),
            other => Err(Error::UnsupportedVersion(other)),
        }
    }

    pub fn major(&self) -> u8 {
        match self {
            Id3Version::V22 => 2,
            Id3Version::V23 => 3,
            Id3Version::V24 => 4,
        }
    }

    fn frame_header_size(&self) -> usize {
        match self {
            Id3Version::V22 => 6,
            _ => 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    #[default]
    Iso8859_1,
    Utf16,
    Utf16Be,
    Utf8,
}

impl TextEncoding {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(TextEncoding::Iso8859_1),
            1 => Some(TextEncoding::Utf16),
            2 => Some(TextEncoding::Utf16Be),
            3 => Some(TextEncoding::Utf8),
            _ => None,
        }
    }

    pub fn as_byte(&self) -> u8 {
        match self {
            TextEncoding::Iso8859_1 => 0,
            TextEncoding::Utf16 => 1,
            TextEncoding::Utf16Be => 2,
            TextEncoding::Utf8 => 3,
        }
    }

    fn is_wide(&self) -> bool {
        matches!(self, TextEncoding::Utf16 | TextEncoding::Utf16Be)
    }

    // Split on NUL terminators. A trailing terminator yields no empty tail.
    fn split<'a>(&self, data: &'a [u8]) -> Vec<&'a [u8]> {
        let mut parts = Vec::new();
        let mut start = 0;
        let mut i = 0;
        if self.is_wide() {
            while i + 1 < data.len() {
                if data[i] == 0 && data[i + 1] == 0 {
                    parts.push(&data[start..i]);
                    start = i + 2;
                }
                i += 2;
            }
        } else {
            while i < data.len() {
                if data[i] == 0 {
                    parts.push(&data[start..i]);
                    start = i + 1;
                }
                i += 1;
            }
        }
        if start < data.len() {
            parts.push(&data[start..]);
        }
        parts
    }

    fn decode(&self, data: &[u8]) -> String {
        match self {
            TextEncoding::Iso8859_1 => latin1(data),
            TextEncoding::Utf8 => String::from_utf8_lossy(data).into_owned(),
            TextEncoding::Utf16 => match data {
                [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, true),
                [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, false),
                // Default to big-endian
                _ => decode_utf16(data, true),
            },
            TextEncoding::Utf16Be => decode_utf16(data, true),
        }
    }

    fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            TextEncoding::Iso8859_1 => text
                .chars()
                .map(|c| u8::try_from(c as u32).unwrap_or(b'?'))
                .collect(),
            TextEncoding::Utf8 => text.as_bytes().to_vec(),
            TextEncoding::Utf16 => {
                let mut out = vec![0xFF, 0xFE];
                out.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
                out
            }
            TextEncoding::Utf16Be => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
        }
    }

    fn terminator(&self) -> &'static [u8] {
        if self.is_wide() { &[0, 0] } else { &[0] }
    }
}

fn decode_utf16(data: &[u8], big_endian: bool) -> String {
    let units = data.chunks_exact(2).map(|pair| {
        if big_endian {
            u16::from_be_bytes([pair[0], pair[1]])
        } else {
            u16::from_le_bytes([pair[0], pair[1]])
        }
    });
    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Body of a text-information frame: one encoding byte, then the text.
///
/// NUL-separated strings become separate values (ID3v2.4 multi-value frames).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFrameBody {
    pub encoding: TextEncoding,
    pub values: Vec<String>,
}

impl TextFrameBody {
    pub fn new(encoding: TextEncoding, text: impl Into<String>) -> Self {
        Self {
            encoding,
            values: vec![text.into()],
        }
    }

    pub fn parse(body: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::big_endian(body);
        let indicator = cursor.read_u8()?;
        let encoding = TextEncoding::from_byte(indicator).unwrap_or_else(|| {
            log::debug!("unknown text encoding {}, reading as UTF-8", indicator);
            TextEncoding::Utf8
        });
        let values = encoding
            .split(cursor.rest())
            .into_iter()
            .map(|part| encoding.decode(part))
            .collect();
        Ok(Self { encoding, values })
    }

    pub fn text(&self) -> &str {
        self.values.first().map(String::as_str).unwrap_or("")
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![self.encoding.as_byte()];
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                out.extend_from_slice(self.encoding.terminator());
            }
            out.extend(self.encoding.encode(value));
        }
        out
    }
}

// Comment frame: encoding, 3-byte language, description, text.
fn parse_comment_body(body: &[u8]) -> Result<String> {
    let mut cursor = ByteCursor::big_endian(body);
    let encoding = TextEncoding::from_byte(cursor.read_u8()?).unwrap_or(TextEncoding::Utf8);
    cursor.skip(3)?;
    let parts = encoding.split(cursor.rest());
    // Description first, then the comment text
    Ok(parts
        .get(1)
        .map(|text| encoding.decode(text))
        .unwrap_or_default())
}

fn syncsafe(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |acc, &b| (acc << 7) | (b & 0x7F) as u32)
}

// Undo unsynchronisation: drop the 0x00 inserted after each 0xFF.
fn resync(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut previous_ff = false;
    for &b in data {
        if !(previous_ff && b == 0) {
            out.push(b);
        }
        previous_ff = b == 0xFF;
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Id3v2Tag {
    version: Id3Version,
    fields: FieldList,
}

impl Id3v2Tag {
    pub fn new(version: Id3Version) -> Self {
        Self {
            version,
            fields: FieldList::default(),
        }
    }

    pub fn version(&self) -> Id3Version {
        self.version
    }

    pub fn read(data: &[u8]) -> Result<Self> {
        let mut cursor = ByteCursor::big_endian(data);
        if cursor.read_bytes(3)? != ID3_MAGIC {
            return Err(Error::InvalidHeader("missing ID3 identifier".into()));
        }
        let version = Id3Version::from_major(cursor.read_u8()?)?;
        let _revision = cursor.read_u8()?;
        let flags = cursor.read_u8()?;
        let size = syncsafe(cursor.read_bytes(4)?) as usize;

        let available = data.len() - TAG_HEADER_SIZE;
        if size > available {
            log::debug!(
                "ID3 tag declares {} bytes, only {} present; reading what is there",
                size,
                available
            );
        }
        let raw = &data[TAG_HEADER_SIZE..TAG_HEADER_SIZE + size.min(available)];

        // ID3v2.4 unsynchronises per frame instead
        let body = if flags & FLAG_UNSYNCHRONISATION != 0 && version != Id3Version::V24 {
            resync(raw)
        } else {
            raw.to_vec()
        };

        let mut tag = Self::new(version);
        let mut frames = ByteCursor::big_endian(&body);
        if flags & FLAG_EXTENDED_HEADER != 0 && version != Id3Version::V22 {
            skip_extended_header(&mut frames, version)?;
        }
        tag.read_frames(&mut frames);
        Ok(tag)
    }

    fn read_frames(&mut self, cursor: &mut ByteCursor<'_>) {
        let header_size = self.version.frame_header_size();
        while cursor.remaining() >= header_size {
            match self.read_frame(cursor) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    log::debug!("stopping ID3 frame scan: {}", e);
                    break;
                }
            }
        }
    }

    // Returns `Ok(false)` once padding is reached.
    fn read_frame(&mut self, cursor: &mut ByteCursor<'_>) -> Result<bool> {
        let (id, size, flags) = match self.version {
            Id3Version::V22 => {
                let id = cursor.read_fixed_chars(3)?;
                let size = cursor.read_bytes(3)?;
                let size = (size[0] as usize) << 16 | (size[1] as usize) << 8 | size[2] as usize;
                (id, size, 0u16)
            }
            Id3Version::V23 => {
                let id = cursor.read_fixed_chars(4)?;
                let size = cursor.read_u32()? as usize;
                (id, size, cursor.read_u16()?)
            }
            Id3Version::V24 => {
                let id = cursor.read_fixed_chars(4)?;
                let size = syncsafe(cursor.read_bytes(4)?) as usize;
                (id, size, cursor.read_u16()?)
            }
        };

        if id.starts_with('\0') {
            return Ok(false);
        }
        let body = cursor.read_bytes(size)?;
        if size == 0 {
            return Ok(true);
        }

        let Some(body) = self.frame_payload(&id, body, flags) else {
            return Ok(true);
        };
        match self.decode_frame(&id, &body) {
            Ok(Some(field)) => self.fields.push(field),
            Ok(None) => log::trace!("skipping ID3 frame {}", id),
            Err(e) => log::debug!("unreadable ID3 frame {}: {}", id, e),
        }
        Ok(true)
    }

    // Strip per-frame encodings. `None` when the frame cannot be read.
    fn frame_payload(&self, id: &str, body: &[u8], flags: u16) -> Option<Vec<u8>> {
        match self.version {
            Id3Version::V22 => Some(body.to_vec()),
            Id3Version::V23 => {
                if flags & (V23_COMPRESSION | V23_ENCRYPTION) != 0 {
                    log::debug!("skipping compressed or encrypted frame {}", id);
                    return None;
                }
                let start = if flags & V23_GROUPING != 0 { 1 } else { 0 };
                body.get(start..).map(<[u8]>::to_vec)
            }
            Id3Version::V24 => {
                if flags & (V24_COMPRESSION | V24_ENCRYPTION) != 0 {
                    log::debug!("skipping compressed or encrypted frame {}", id);
                    return None;
                }
                let mut start = 0;
                if flags & V24_GROUPING != 0 {
                    start += 1;
                }
                if flags & V24_DATA_LENGTH != 0 {
                    start += 4;
                }
                let payload = body.get(start..)?;
                if flags & V24_UNSYNCHRONISATION != 0 {
                    Some(resync(payload))
                } else {
                    Some(payload.to_vec())
                }
            }
        }
    }

    fn decode_frame(&self, id: &str, body: &[u8]) -> Result<Option<TagField>> {
        if id == "COMM" || id == "COM" {
            let text = parse_comment_body(body)?;
            return Ok(Some(TagField::new(id, text)));
        }
        if id.starts_with('T') && id != "TXXX" && id != "TXX" {
            let text = TextFrameBody::parse(body)?;
            return Ok(Some(TagField::with_values(id, text.values)));
        }
        Ok(None)
    }
}

fn skip_extended_header(cursor: &mut ByteCursor<'_>, version: Id3Version) -> Result<()> {
    match version {
        // Size excludes its own four bytes
        Id3Version::V23 => {
            let size = cursor.read_u32()? as usize;
            cursor.skip(size)
        }
        // Size includes its own four bytes
        _ => {
            let size = syncsafe(cursor.read_bytes(4)?) as usize;
            cursor.skip(size.saturating_sub(4))
        }
    }
}

fn v22_frame_id(key: FieldKey) -> Option<&'static str> {
    let id = match key {
        FieldKey::Title => "TT2",
        FieldKey::Artist => "TP1",
        FieldKey::Album => "TAL",
        FieldKey::AlbumArtist => "TP2",
        FieldKey::Genre => "TCO",
        FieldKey::Year => "TYE",
        FieldKey::Track => "TRK",
        FieldKey::DiscNo => "TPA",
        FieldKey::Comment => "COM",
        FieldKey::Composer => "TCM",
        FieldKey::Conductor => "TP3",
        FieldKey::Lyricist => "TXT",
        FieldKey::Copyright => "TCR",
        FieldKey::Encoder => "TEN",
        FieldKey::EncoderSettings => "TSS",
        FieldKey::IsCompilation => "TCP",
        FieldKey::Bpm => "TBP",
        FieldKey::Isrc => "TRC",
        FieldKey::Language => "TLA",
        FieldKey::Grouping => "TT1",
        FieldKey::Subtitle => "TT3",
        _ => return None,
    };
    Some(id)
}

fn v23_v24_frame_id(key: FieldKey, version: Id3Version) -> Option<&'static str> {
    let id = match key {
        FieldKey::Title => "TIT2",
        FieldKey::Artist => "TPE1",
        FieldKey::Album => "TALB",
        FieldKey::AlbumArtist => "TPE2",
        FieldKey::Genre => "TCON",
        FieldKey::Year if version == Id3Version::V24 => "TDRC",
        FieldKey::Year => "TYER",
        FieldKey::Track => "TRCK",
        FieldKey::DiscNo => "TPOS",
        FieldKey::Comment => "COMM",
        FieldKey::Composer => "TCOM",
        FieldKey::Conductor => "TPE3",
        FieldKey::Lyricist => "TEXT",
        FieldKey::Copyright => "TCOP",
        FieldKey::Encoder => "TENC",
        FieldKey::EncoderSettings => "TSSE",
        FieldKey::IsCompilation => "TCMP",
        FieldKey::Bpm => "TBPM",
        FieldKey::Isrc => "TSRC",
        FieldKey::Language => "TLAN",
        FieldKey::Grouping => "TIT1",
        FieldKey::Subtitle => "TIT3",
        FieldKey::Mood if version == Id3Version::V24 => "TMOO",
        _ => return None,
    };
    Some(id)
}

impl TagStore for Id3v2Tag {
    fn field_id(&self, key: FieldKey) -> Option<&'static str> {
        match self.version {
            Id3Version::V22 => v22_frame_id(key),
            version => v23_v24_frame_id(key, version),
        }
    }

    fn field_list(&self) -> &FieldList {
        &self.fields
    }

    fn field_list_mut(&mut self) -> &mut FieldList {
        &mut self.fields
    }
}
