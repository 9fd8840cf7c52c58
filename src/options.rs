use crate::tag::Id3Version;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    // Give the tag an empty native store when the file had none, so writes
    // succeed.
    pub create_native_tag: bool,
    // Give the tag an empty ID3 store when the file had none. Off by default:
    // an empty ID3 store would shadow native values on reads.
    pub create_id3_tag: bool,
    pub id3_version: Id3Version,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            create_native_tag: true,
            create_id3_tag: false,
            id3_version: Id3Version::V23,
        }
    }
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_native_tag(mut self, create: bool) -> Self {
        self.create_native_tag = create;
        self
    }

    pub fn create_id3_tag(mut self, create: bool) -> Self {
        self.create_id3_tag = create;
        self
    }

    pub fn id3_version(mut self, version: Id3Version) -> Self {
        self.id3_version = version;
        self
    }
}
