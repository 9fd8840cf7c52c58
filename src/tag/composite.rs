use super::{Artwork, FieldKey, Id3v2Tag, InfoTag, TagField, TagStore};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct CompositeTag {
    native: Option<InfoTag>,
    id3: Option<Id3v2Tag>,
    native_preexisting: bool,
    id3_preexisting: bool,
}

impl CompositeTag {
    // Wrap the stores found in a file. Whatever is passed here counts as
    // pre-existing.
    pub fn from_file(native: Option<InfoTag>, id3: Option<Id3v2Tag>) -> Self {
        Self {
            native_preexisting: native.is_some(),
            id3_preexisting: id3.is_some(),
            native,
            id3,
        }
    }

    pub fn is_existing_native_tag(&self) -> bool {
        self.native_preexisting
    }

    pub fn is_existing_id3_tag(&self) -> bool {
        self.id3_preexisting
    }

    pub fn has_native_tag(&self) -> bool {
        self.native.is_some()
    }

    pub fn has_id3_tag(&self) -> bool {
        self.id3.is_some()
    }

    pub fn native_tag(&self) -> Option<&InfoTag> {
        self.native.as_ref()
    }

    pub fn native_tag_mut(&mut self) -> Option<&mut InfoTag> {
        self.native.as_mut()
    }

    pub fn id3_tag(&self) -> Option<&Id3v2Tag> {
        self.id3.as_ref()
    }

    pub fn id3_tag_mut(&mut self) -> Option<&mut Id3v2Tag> {
        self.id3.as_mut()
    }

    /// Attach or replace the native store. Pre-existence is unchanged.
    pub fn set_native_tag(&mut self, tag: Option<InfoTag>) {
        self.native = tag;
    }

    /// Attach or replace the ID3v2 store. Pre-existence is unchanged.
    pub fn set_id3_tag(&mut self, tag: Option<Id3v2Tag>) {
        self.id3 = tag;
    }

    fn primary(&self) -> Option<&dyn TagStore> {
        match (&self.id3, &self.native) {
            (Some(id3), _) => Some(id3 as &dyn TagStore),
            (None, Some(native)) => Some(native as &dyn TagStore),
            (None, None) => None,
        }
    }

    fn native_for_write(&mut self) -> Result<&mut InfoTag> {
        self.native
            .as_mut()
            .ok_or_else(|| Error::unsupported("no native tag attached"))
    }

    // Reads by generic key, from the primary store

    /// First value for the key, or an empty string when nothing matches or
    /// the primary store has no mapping for the key.
    pub fn get_first(&self, key: FieldKey) -> String {
        self.get_value(key, 0)
    }

    pub fn get_value(&self, key: FieldKey, index: usize) -> String {
        match self.primary() {
            Some(store) => store.get_value(key, index).unwrap_or_default(),
            None => String::new(),
        }
    }

    pub fn get_all(&self, key: FieldKey) -> Result<Vec<String>> {
        match self.primary() {
            Some(store) => store.get_all(key),
            None => Ok(Vec::new()),
        }
    }

    pub fn get_fields(&self, key: FieldKey) -> Result<Vec<&TagField>> {
        match self.primary() {
            Some(store) => store.get_fields(key),
            None => Ok(Vec::new()),
        }
    }

    pub fn get_first_field(&self, key: FieldKey) -> Result<Option<&TagField>> {
        match self.primary() {
            Some(store) => store.get_first_field(key),
            None => Ok(None),
        }
    }

    // Native-store queries

    pub fn get_first_by_id(&self, id: &str) -> String {
        self.native
            .as_ref()
            .map(|tag| tag.get_first_by_id(id))
            .unwrap_or_default()
    }

    pub fn get_fields_by_id(&self, id: &str) -> Vec<&TagField> {
        self.native
            .as_ref()
            .map(|tag| tag.get_fields_by_id(id))
            .unwrap_or_default()
    }

    pub fn has_field(&self, key: FieldKey) -> bool {
        self.native.as_ref().is_some_and(|tag| tag.has_field(key))
    }

    pub fn has_field_by_id(&self, id: &str) -> bool {
        self.native
            .as_ref()
            .is_some_and(|tag| tag.has_field_by_id(id))
    }

    pub fn fields(&self) -> impl Iterator<Item = &TagField> {
        self.native.iter().flat_map(|tag| tag.fields())
    }

    pub fn field_count(&self) -> usize {
        self.native.as_ref().map_or(0, |tag| tag.field_count())
    }

    pub fn field_count_including_sub_values(&self) -> usize {
        self.field_count()
    }

    pub fn is_empty(&self) -> bool {
        self.native.as_ref().is_none_or(|tag| tag.is_empty())
    }

    pub fn has_common_fields(&self) -> bool {
        self.native
            .as_ref()
            .is_some_and(|tag| tag.has_common_fields())
    }

    // Writes, always against the native store

    pub fn create_field(&self, key: FieldKey, value: &str) -> Result<TagField> {
        match &self.native {
            Some(tag) => tag.create_field(key, value),
            None => Err(Error::unsupported(format!(
                "cannot create {} without a native tag",
                key
            ))),
        }
    }

    pub fn create_compilation_field(&self, value: bool) -> Result<TagField> {
        self.create_field(FieldKey::IsCompilation, if value { "true" } else { "false" })
    }

    pub fn set_field(&mut self, key: FieldKey, value: &str) -> Result<()> {
        let field = self.create_field(key, value)?;
        self.set_tag_field(field)
    }

    pub fn add_field(&mut self, key: FieldKey, value: &str) -> Result<()> {
        let field = self.create_field(key, value)?;
        self.add_tag_field(field)
    }

    pub fn set_tag_field(&mut self, field: TagField) -> Result<()> {
        self.native_for_write()?.set_field(field);
        Ok(())
    }

    pub fn add_tag_field(&mut self, field: TagField) -> Result<()> {
        self.native_for_write()?.add_field(field);
        Ok(())
    }

    pub fn delete_field(&mut self, key: FieldKey) -> Result<()> {
        self.native_for_write()?.delete_field(key)
    }

    pub fn delete_field_by_id(&mut self, id: &str) -> Result<()> {
        self.native_for_write()?.delete_field_by_id(id);
        Ok(())
    }

    // Artwork has no home in chunk-native metadata

    pub fn create_artwork_field(&self, _artwork: &Artwork) -> Result<TagField> {
        Err(Error::unsupported("artwork is not supported"))
    }

    pub fn set_artwork(&mut self, artwork: &Artwork) -> Result<()> {
        let field = self.create_artwork_field(artwork)?;
        self.set_tag_field(field)
    }

    pub fn add_artwork(&mut self, artwork: &Artwork) -> Result<()> {
        let field = self.create_artwork_field(artwork)?;
        self.add_tag_field(field)
    }

    pub fn first_artwork(&self) -> Option<Artwork> {
        None
    }

    pub fn artwork_list(&self) -> Vec<Artwork> {
        Vec::new()
    }

    pub fn delete_artwork_field(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::Id3Version;

    fn native_with_title(title: &str) -> InfoTag {
        let mut tag = InfoTag::riff();
        tag.add_field(TagField::new("INAM", title));
        tag
    }

    fn id3_with_title(title: &str) -> Id3v2Tag {
        let mut tag = Id3v2Tag::new(Id3Version::V23);
        tag.add_field(TagField::new("TIT2", title));
        tag
    }

    #[test]
    fn id3_wins_reads_when_present() {
        let tag = CompositeTag::from_file(
            Some(native_with_title("Native")),
            Some(id3_with_title("Id3")),
        );
        assert_eq!(tag.get_first(FieldKey::Title), "Id3");
        assert_eq!(tag.get_all(FieldKey::Title).unwrap(), vec!["Id3"]);
        assert_eq!(
            tag.get_first_field(FieldKey::Title).unwrap().unwrap().id(),
            "TIT2"
        );
    }

    #[test]
    fn native_serves_reads_without_id3() {
        let tag = CompositeTag::from_file(Some(native_with_title("Native")), None);
        assert_eq!(tag.get_first(FieldKey::Title), "Native");
    }

    #[test]
    fn field_reads_share_value_precedence() {
        let both = CompositeTag::from_file(
            Some(native_with_title("Native")),
            Some(id3_with_title("Id3")),
        );
        let ids: Vec<_> = both
            .get_fields(FieldKey::Title)
            .unwrap()
            .iter()
            .map(|field| field.id())
            .collect();
        assert_eq!(ids, vec!["TIT2"]);

        let native_only = CompositeTag::from_file(Some(native_with_title("Native")), None);
        let field = native_only.get_first_field(FieldKey::Title).unwrap().unwrap();
        assert_eq!(field.id(), "INAM");
        assert_eq!(field.first_value(), native_only.get_first(FieldKey::Title));

        // Unmapped on the primary store even though native maps it
        let id3_primary = CompositeTag::from_file(
            Some(native_with_title("Native")),
            Some(Id3v2Tag::new(Id3Version::V23)),
        );
        assert!(id3_primary.get_first_field(FieldKey::Title).unwrap().is_none());
        assert!(CompositeTag::default()
            .get_first_field(FieldKey::Title)
            .unwrap()
            .is_none());
    }

    #[test]
    fn empty_facade_reads_are_empty() {
        let tag = CompositeTag::default();
        assert_eq!(tag.get_first(FieldKey::Artist), "");
        assert!(tag.get_all(FieldKey::Artist).unwrap().is_empty());
        assert!(tag.get_fields(FieldKey::Artist).unwrap().is_empty());
        assert_eq!(tag.field_count(), 0);
        assert!(tag.is_empty());
        assert!(!tag.has_native_tag());
        assert!(!tag.has_id3_tag());
    }

    #[test]
    fn counts_and_presence_follow_native_store() {
        let tag = CompositeTag::from_file(
            Some(InfoTag::riff()),
            Some(id3_with_title("Id3")),
        );
        assert_eq!(tag.field_count(), 0);
        assert!(!tag.has_field(FieldKey::Title));
        assert!(tag.is_empty());
        assert_eq!(tag.fields().count(), 0);
    }

    #[test]
    fn create_field_without_native_is_unsupported_for_every_key() {
        let tag = CompositeTag::from_file(None, Some(id3_with_title("Id3")));
        for &key in FieldKey::ALL {
            assert!(matches!(
                tag.create_field(key, "x"),
                Err(Error::UnsupportedOperation(_))
            ));
        }
    }

    #[test]
    fn writes_land_in_native_store() {
        let mut tag = CompositeTag::from_file(Some(InfoTag::riff()), Some(id3_with_title("Id3")));
        tag.set_field(FieldKey::Title, "New").unwrap();
        tag.add_field(FieldKey::Artist, "A").unwrap();
        tag.add_field(FieldKey::Artist, "B").unwrap();

        assert_eq!(tag.get_first_by_id("INAM"), "New");
        assert_eq!(tag.get_fields_by_id("IART").len(), 2);
        assert_eq!(tag.field_count(), 3);
        assert!(tag.has_common_fields());
        // The ID3 store is still primary for reads
        assert_eq!(tag.get_first(FieldKey::Title), "Id3");

        tag.delete_field(FieldKey::Artist).unwrap();
        assert!(!tag.has_field_by_id("IART"));
        tag.delete_field_by_id("INAM").unwrap();
        assert!(tag.is_empty());
    }

    #[test]
    fn writes_without_native_store_are_rejected() {
        let mut tag = CompositeTag::default();
        assert!(matches!(
            tag.set_field(FieldKey::Title, "x"),
            Err(Error::UnsupportedOperation(_))
        ));
        assert!(matches!(
            tag.add_tag_field(TagField::new("INAM", "x")),
            Err(Error::UnsupportedOperation(_))
        ));
        assert!(matches!(
            tag.delete_field(FieldKey::Title),
            Err(Error::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn unmapped_key_is_key_not_found_not_unsupported() {
        let tag = CompositeTag::from_file(Some(InfoTag::riff()), None);
        assert!(matches!(
            tag.create_compilation_field(true),
            Err(Error::KeyNotFound(_))
        ));
        assert!(matches!(
            tag.get_all(FieldKey::IsCompilation),
            Err(Error::KeyNotFound(_))
        ));
        assert_eq!(tag.get_first(FieldKey::IsCompilation), "");
    }

    #[test]
    fn artwork_is_unsupported() {
        let mut tag = CompositeTag::from_file(Some(InfoTag::riff()), None);
        let art = Artwork {
            mime_type: "image/png".into(),
            description: String::new(),
            data: vec![0x89, b'P', b'N', b'G'],
        };
        assert!(matches!(
            tag.create_artwork_field(&art),
            Err(Error::UnsupportedOperation(_))
        ));
        assert!(tag.set_artwork(&art).is_err());
        assert!(tag.add_artwork(&art).is_err());
        assert!(tag.first_artwork().is_none());
        assert!(tag.artwork_list().is_empty());
        assert!(tag.delete_artwork_field().is_ok());
    }

    #[test]
    fn preexisting_flags_survive_store_changes() {
        let mut tag = CompositeTag::from_file(Some(InfoTag::riff()), None);
        tag.set_id3_tag(Some(Id3v2Tag::new(Id3Version::V24)));
        tag.set_native_tag(None);

        assert!(tag.is_existing_native_tag());
        assert!(!tag.is_existing_id3_tag());
        assert!(tag.has_id3_tag());
        assert!(!tag.has_native_tag());
    }
}
