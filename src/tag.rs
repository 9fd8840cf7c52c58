use crate::error::{Error, Result};
use std::fmt;

mod composite;
mod id3;
mod info;

pub use composite::CompositeTag;
pub use id3::{Id3Version, Id3v2Tag, TextEncoding, TextFrameBody};
pub use info::{InfoFlavor, InfoTag};

// Format-agnostic metadata concepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKey {
    Title,
    Artist,
    Album,
    AlbumArtist,
    Genre,
    Year,
    Track,
    DiscNo,
    Comment,
    Composer,
    Conductor,
    Lyricist,
    Copyright,
    Encoder,
    EncoderSettings,
    Engineer,
    Rating,
    IsCompilation,
    Bpm,
    Isrc,
    Language,
    Grouping,
    Subtitle,
    Mood,
    CoverArt,
}

impl FieldKey {
    pub const ALL: &'static [FieldKey] = &[
        FieldKey::Title,
        FieldKey::Artist,
        FieldKey::Album,
        FieldKey::AlbumArtist,
        FieldKey::Genre,
        FieldKey::Year,
        FieldKey::Track,
        FieldKey::DiscNo,
        FieldKey::Comment,
        FieldKey::Composer,
        FieldKey::Conductor,
        FieldKey::Lyricist,
        FieldKey::Copyright,
        FieldKey::Encoder,
        FieldKey::EncoderSettings,
        FieldKey::Engineer,
        FieldKey::Rating,
        FieldKey::IsCompilation,
        FieldKey::Bpm,
        FieldKey::Isrc,
        FieldKey::Language,
        FieldKey::Grouping,
        FieldKey::Subtitle,
        FieldKey::Mood,
        FieldKey::CoverArt,
    ];
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagField {
    id: String,
    values: Vec<String>,
}

impl TagField {
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            values: vec![value.into()],
        }
    }

    pub fn with_values(id: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            id: id.into(),
            values,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn first_value(&self) -> &str {
        self.values.first().map(String::as_str).unwrap_or("")
    }

    pub fn add_value(&mut self, value: impl Into<String>) {
        self.values.push(value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(String::is_empty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artwork {
    pub mime_type: String,
    pub description: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldList(Vec<TagField>);

impl FieldList {
    pub fn iter(&self) -> std::slice::Iter<'_, TagField> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn by_id<'a, 'b>(&'a self, id: &'b str) -> impl Iterator<Item = &'a TagField> {
        self.0.iter().filter(move |field| field.id == id)
    }

    pub fn push(&mut self, field: TagField) {
        self.0.push(field);
    }

    /// Replace every field sharing the new field's id, keeping the position of the first.
    pub fn replace(&mut self, field: TagField) {
        match self.0.iter().position(|f| f.id == field.id) {
            Some(index) => {
                self.0.retain(|f| f.id != field.id);
                let index = index.min(self.0.len());
                self.0.insert(index, field);
            }
            None => self.0.push(field),
        }
    }

    pub fn remove_id(&mut self, id: &str) -> usize {
        let before = self.0.len();
        self.0.retain(|f| f.id != id);
        before - self.0.len()
    }
}

pub trait TagStore {
    // Native identifier for a generic key, if this store has one.
    fn field_id(&self, key: FieldKey) -> Option<&'static str>;

    fn field_list(&self) -> &FieldList;

    fn field_list_mut(&mut self) -> &mut FieldList;

    fn key_id(&self, key: FieldKey) -> Result<&'static str> {
        self.field_id(key)
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))
    }

    fn fields(&self) -> std::slice::Iter<'_, TagField> {
        self.field_list().iter()
    }

    fn get_fields_by_id(&self, id: &str) -> Vec<&TagField> {
        self.field_list().by_id(id).collect()
    }

    fn get_fields(&self, key: FieldKey) -> Result<Vec<&TagField>> {
        let id = self.key_id(key)?;
        Ok(self.get_fields_by_id(id))
    }

    fn get_first_by_id(&self, id: &str) -> String {
        self.field_list()
            .by_id(id)
            .next()
            .map(|field| field.first_value().to_string())
            .unwrap_or_default()
    }

    fn get_first_field(&self, key: FieldKey) -> Result<Option<&TagField>> {
        let id = self.key_id(key)?;
        Ok(self.field_list().by_id(id).next())
    }

    fn get_all(&self, key: FieldKey) -> Result<Vec<String>> {
        let id = self.key_id(key)?;
        Ok(self
            .field_list()
            .by_id(id)
            .flat_map(|field| field.values().iter().cloned())
            .collect())
    }

    fn get_value(&self, key: FieldKey, index: usize) -> Result<String> {
        Ok(self.get_all(key)?.into_iter().nth(index).unwrap_or_default())
    }

    fn get_first(&self, key: FieldKey) -> Result<String> {
        self.get_value(key, 0)
    }

    fn has_field(&self, key: FieldKey) -> bool {
        self.field_id(key)
            .is_some_and(|id| self.has_field_by_id(id))
    }

    fn has_field_by_id(&self, id: &str) -> bool {
        self.field_list().by_id(id).next().is_some()
    }

    fn create_field(&self, key: FieldKey, value: &str) -> Result<TagField> {
        let id = self.key_id(key)?;
        Ok(TagField::new(id, value))
    }

    fn set_field(&mut self, field: TagField) {
        self.field_list_mut().replace(field);
    }

    fn add_field(&mut self, field: TagField) {
        self.field_list_mut().push(field);
    }

    fn delete_field(&mut self, key: FieldKey) -> Result<()> {
        let id = self.key_id(key)?;
        self.delete_field_by_id(id);
        Ok(())
    }

    fn delete_field_by_id(&mut self, id: &str) {
        let removed = self.field_list_mut().remove_id(id);
        log::trace!("removed {} field(s) with id {:?}", removed, id);
    }

    fn field_count(&self) -> usize {
        self.field_list().len()
    }

    fn field_count_including_sub_values(&self) -> usize {
        self.fields().map(|field| field.values().len().max(1)).sum()
    }

    fn is_empty(&self) -> bool {
        self.field_list().is_empty()
    }

    fn has_common_fields(&self) -> bool {
        self.has_field(FieldKey::Title) || self.has_field(FieldKey::Artist)
    }
}
