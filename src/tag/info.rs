use super::{FieldKey, FieldList, TagField, TagStore};
use crate::chunk::ChunkHeader;
use crate::cursor::{ByteCursor, latin1};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoFlavor {
    // Sub-chunks of a WAV `LIST` chunk of type `INFO`.
    RiffInfo,
    // AIFF `NAME`, `AUTH`, `(c) ` and `ANNO` chunks.
    AiffText,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoTag {
    flavor: InfoFlavor,
    fields: FieldList,
}

impl InfoTag {
    pub fn new(flavor: InfoFlavor) -> Self {
        Self {
            flavor,
            fields: FieldList::default(),
        }
    }

    pub fn riff() -> Self {
        Self::new(InfoFlavor::RiffInfo)
    }

    pub fn aiff() -> Self {
        Self::new(InfoFlavor::AiffText)
    }

    pub fn add_text_chunk(&mut self, id: &str, body: &[u8]) {
        let value = chunk_text(body);
        if value.is_empty() {
            log::trace!("skipping empty {:?} text chunk", id);
            return;
        }
        self.fields.push(TagField::new(id, value));
    }

    // Read the sub-chunks following the `INFO` list type.
    pub fn read_list_body(&mut self, cursor: &mut ByteCursor<'_>) -> Result<()> {
        while cursor.remaining() > 0 {
            let header = ChunkHeader::read(cursor)?;
            let body = cursor.read_bytes(header.size as usize)?;
            self.add_text_chunk(&header.id_str(), body);

            if header.size % 2 == 1 && cursor.remaining() > 0 {
                cursor.skip(1)?;
            }
        }
        Ok(())
    }
}

fn chunk_text(body: &[u8]) -> String {
    latin1(body).trim_end_matches('\0').trim().to_string()
}

fn riff_info_id(key: FieldKey) -> Option<&'static str> {
    let id = match key {
        FieldKey::Title => "INAM",
        FieldKey::Artist => "IART",
        FieldKey::Album => "IPRD",
        FieldKey::AlbumArtist => "iaar",
        FieldKey::Genre => "IGNR",
        FieldKey::Year => "ICRD",
        FieldKey::Track => "ITRK",
        FieldKey::Comment => "ICMT",
        FieldKey::Composer => "IMUS",
        FieldKey::Conductor => "ITCH",
        FieldKey::Lyricist => "IWRI",
        FieldKey::Copyright => "ICOP",
        FieldKey::Encoder => "ISFT",
        FieldKey::Engineer => "IENG",
        FieldKey::Rating => "IRTD",
        FieldKey::Language => "ILNG",
        _ => return None,
    };
    Some(id)
}

fn aiff_text_id(key: FieldKey) -> Option<&'static str> {
    let id = match key {
        FieldKey::Title => "NAME",
        FieldKey::Artist => "AUTH",
        FieldKey::Copyright => "(c) ",
        FieldKey::Comment => "ANNO",
        _ => return None,
    };
    Some(id)
}

impl TagStore for InfoTag {
    fn field_id(&self, key: FieldKey) -> Option<&'static str> {
        match self.flavor {
            InfoFlavor::RiffInfo => riff_info_id(key),
            InfoFlavor::AiffText => aiff_text_id(key),
        }
    }

    fn field_list(&self) -> &FieldList {
        &self.fields
    }

    fn field_list_mut(&mut self) -> &mut FieldList {
        &mut self.fields
    }
}
