use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use iffmeta::cursor::encode_extended_f80;
use iffmeta::tag::{Id3Version, TextEncoding, TextFrameBody};
use iffmeta::{AudioFile, ContainerKind, Endianness, Error, FieldKey, ReadOptions, read_many};
use std::io::Write;

fn be_chunk(out: &mut Vec<u8>, id: &[u8; 4], body: &[u8]) {
    out.write_all(id).unwrap();
    out.write_u32::<BigEndian>(body.len() as u32).unwrap();
    out.write_all(body).unwrap();
    if body.len() % 2 == 1 {
        out.push(0);
    }
}

fn le_chunk(out: &mut Vec<u8>, id: &[u8; 4], body: &[u8]) {
    out.write_all(id).unwrap();
    out.write_u32::<LittleEndian>(body.len() as u32).unwrap();
    out.write_all(body).unwrap();
    if body.len() % 2 == 1 {
        out.push(0);
    }
}

fn form(form_type: &[u8; 4], chunks: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_all(b"FORM").unwrap();
    out.write_u32::<BigEndian>(chunks.len() as u32 + 4).unwrap();
    out.write_all(form_type).unwrap();
    out.write_all(chunks).unwrap();
    out
}

fn comm(channels: u16, frames: u32, bits: u16, rate: f64) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_u16::<BigEndian>(channels).unwrap();
    out.write_u32::<BigEndian>(frames).unwrap();
    out.write_u16::<BigEndian>(bits).unwrap();
    out.write_all(&encode_extended_f80(rate)).unwrap();
    out
}

/// ID3v2.3 tag holding the given text frames.
fn id3v23(frames: &[(&[u8; 4], &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (id, text) in frames {
        let payload = TextFrameBody::new(TextEncoding::Utf8, *text).to_bytes();
        body.write_all(*id).unwrap();
        body.write_u32::<BigEndian>(payload.len() as u32).unwrap();
        body.write_u16::<BigEndian>(0).unwrap();
        body.write_all(&payload).unwrap();
    }
    assert!(body.len() < 128);

    let mut out = b"ID3\x03\x00\x00\x00\x00\x00".to_vec();
    out.push(body.len() as u8);
    out.extend(body);
    out
}

fn aifc_with_tags() -> Vec<u8> {
    let mut common = comm(2, 88200, 16, 44100.0);
    common.write_all(b"sowt").unwrap();
    common.write_all(b"\x00\x00").unwrap();

    let mut chunks = Vec::new();
    be_chunk(&mut chunks, b"FVER", &0xA2805140u32.to_be_bytes());
    be_chunk(&mut chunks, b"COMM", &common);
    be_chunk(&mut chunks, b"NAME", b"Native Title");
    be_chunk(&mut chunks, b"AUTH", b"Native Author");
    be_chunk(&mut chunks, b"SSND", &[0u8; 16]);
    be_chunk(
        &mut chunks,
        b"ID3 ",
        &id3v23(&[(b"TIT2", "ID3 Title"), (b"TALB", "ID3 Album")]),
    );
    form(b"AIFC", &chunks)
}

#[test]
fn aifc_properties_and_tag_precedence() {
    let file = AudioFile::from_bytes(&aifc_with_tags(), &ReadOptions::default()).unwrap();

    assert_eq!(file.container, ContainerKind::Aifc);
    assert!(file.path.is_none());
    assert_eq!(file.properties.endianness(), Endianness::Little);
    assert_eq!(file.properties.duration_seconds(), 2.0);
    assert!(file.properties.is_lossless());

    let tag = &file.tag;
    assert!(tag.is_existing_native_tag());
    assert!(tag.is_existing_id3_tag());

    // Reads prefer the ID3 store
    assert_eq!(tag.get_first(FieldKey::Title), "ID3 Title");
    assert_eq!(tag.get_first(FieldKey::Album), "ID3 Album");
    assert_eq!(tag.get_first(FieldKey::Artist), "");

    // Counts and presence come from the native store
    assert_eq!(tag.field_count(), 2);
    assert!(tag.has_field(FieldKey::Artist));
    assert!(!tag.has_field(FieldKey::Album));
    assert_eq!(tag.get_first_by_id("AUTH"), "Native Author");
}

#[test]
fn writes_land_in_native_store() {
    let mut file = AudioFile::from_bytes(&aifc_with_tags(), &ReadOptions::default()).unwrap();
    let tag = &mut file.tag;

    tag.set_field(FieldKey::Title, "Renamed").unwrap();
    assert_eq!(tag.get_first_by_id("NAME"), "Renamed");
    assert_eq!(tag.get_first(FieldKey::Title), "ID3 Title");

    assert!(matches!(
        tag.set_field(FieldKey::Album, "x"),
        Err(Error::KeyNotFound(_))
    ));

    tag.add_field(FieldKey::Comment, "one").unwrap();
    tag.add_field(FieldKey::Comment, "two").unwrap();
    assert_eq!(tag.get_fields_by_id("ANNO").len(), 2);
    assert_eq!(tag.field_count(), 4);

    tag.delete_field(FieldKey::Comment).unwrap();
    assert!(!tag.has_field_by_id("ANNO"));
}

#[test]
fn bare_aiff_without_options_has_no_store() {
    let mut chunks = Vec::new();
    be_chunk(&mut chunks, b"COMM", &comm(1, 8000, 8, 8000.0));
    let data = form(b"AIFF", &chunks);

    let options = ReadOptions::new().create_native_tag(false);
    let file = AudioFile::from_bytes(&data, &options).unwrap();
    assert!(!file.tag.has_native_tag());
    assert!(matches!(
        file.tag.create_field(FieldKey::Title, "x"),
        Err(Error::UnsupportedOperation(_))
    ));

    let file = AudioFile::from_bytes(&data, &ReadOptions::default()).unwrap();
    assert!(file.tag.has_native_tag());
    assert!(!file.tag.is_existing_native_tag());
    assert!(file.tag.create_field(FieldKey::Title, "x").is_ok());
}

#[test]
fn created_id3_store_shadows_native_reads() {
    let mut chunks = Vec::new();
    be_chunk(&mut chunks, b"COMM", &comm(1, 8000, 8, 8000.0));
    be_chunk(&mut chunks, b"NAME", b"Native");
    let data = form(b"AIFF", &chunks);

    let options = ReadOptions::new()
        .create_id3_tag(true)
        .id3_version(Id3Version::V24);
    let file = AudioFile::from_bytes(&data, &options).unwrap();
    assert!(file.tag.has_id3_tag());
    assert!(!file.tag.is_existing_id3_tag());
    assert_eq!(file.tag.get_first(FieldKey::Title), "");
    assert_eq!(file.tag.get_first_by_id("NAME"), "Native");
}

#[test]
fn broken_chunk_does_not_hide_later_tags() {
    let mut chunks = Vec::new();
    // COMM with a zero sample rate is rejected on its own
    be_chunk(&mut chunks, b"COMM", &comm(2, 100, 16, 0.0));
    be_chunk(&mut chunks, b"ANNO", b"still here");
    let file = AudioFile::from_bytes(&form(b"AIFF", &chunks), &ReadOptions::default()).unwrap();

    assert_eq!(file.properties.duration_seconds(), 0.0);
    assert_eq!(file.tag.get_first(FieldKey::Comment), "still here");
}

#[test]
fn wav_with_info_and_id3() {
    let mut fmt = Vec::new();
    fmt.write_u16::<LittleEndian>(1).unwrap();
    fmt.write_u16::<LittleEndian>(2).unwrap();
    fmt.write_u32::<LittleEndian>(48000).unwrap();
    fmt.write_u32::<LittleEndian>(192000).unwrap();
    fmt.write_u16::<LittleEndian>(4).unwrap();
    fmt.write_u16::<LittleEndian>(16).unwrap();

    let mut info = b"INFO".to_vec();
    le_chunk(&mut info, b"IART", b"Riff Artist\0");
    le_chunk(&mut info, b"ICMT", b"Riff note\0");

    let mut chunks = Vec::new();
    le_chunk(&mut chunks, b"fmt ", &fmt);
    le_chunk(&mut chunks, b"data", &vec![0u8; 192000]);
    le_chunk(&mut chunks, b"LIST", &info);
    le_chunk(&mut chunks, b"id3 ", &id3v23(&[(b"TPE1", "ID3 Artist")]));

    let mut data = b"RIFF".to_vec();
    data.write_u32::<LittleEndian>(chunks.len() as u32 + 4).unwrap();
    data.write_all(b"WAVE").unwrap();
    data.extend(chunks);

    let file = AudioFile::from_bytes(&data, &ReadOptions::default()).unwrap();
    assert_eq!(file.container, ContainerKind::Wav);
    assert_eq!(file.properties.duration_seconds(), 1.0);
    assert_eq!(file.properties.sample_frames(), 48000);
    assert_eq!(file.properties.encoding(), "WAV PCM");

    assert_eq!(file.tag.get_first(FieldKey::Artist), "ID3 Artist");
    assert_eq!(file.tag.get_first(FieldKey::Comment), "");
    assert_eq!(file.tag.get_first_by_id("ICMT"), "Riff note");
    assert!(file.tag.has_common_fields());
}

#[test]
fn unknown_signature_is_rejected() {
    assert!(AudioFile::from_bytes(b"OggS\0\x02\0\0\0\0\0\0", &ReadOptions::default()).is_err());
}

#[test]
fn open_and_read_many_from_disk() {
    let dir = std::env::temp_dir().join(format!("iffmeta-scan-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let aifc = dir.join("take.aifc");
    std::fs::write(&aifc, aifc_with_tags()).unwrap();
    let missing = dir.join("missing.wav");

    let file = AudioFile::open(&aifc, &ReadOptions::default()).unwrap();
    assert_eq!(file.get_filename(), "take.aifc");
    assert_eq!(file.container, ContainerKind::Aifc);

    let results = read_many(&[aifc.clone(), missing], &ReadOptions::default());
    assert_eq!(results.len(), 2);
    assert_eq!(
        results[0].as_ref().unwrap().tag.get_first(FieldKey::Title),
        "ID3 Title"
    );
    assert!(results[1].is_err());

    std::fs::remove_dir_all(&dir).unwrap();
}
