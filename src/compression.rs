// Code under which AIFC stores little-endian PCM.
pub const SOWT: &[u8; 4] = b"sowt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionEntry {
    pub code: &'static [u8; 4],
    pub name: &'static str,
    pub vendor: &'static str,
    pub lossless: bool,
}

macro_rules! entry {
    ($code:literal, $name:literal, $vendor:literal, $lossless:literal) => {
        CompressionEntry {
            code: $code,
            name: $name,
            vendor: $vendor,
            lossless: $lossless,
        }
    };
}

static CATALOGUE: &[CompressionEntry] = &[
    entry!(b"NONE", "Not compressed, big-endian", "Apple", true),
    entry!(b"raw ", "Not compressed, offset-binary", "Apple", true),
    entry!(b"twos", "Not compressed, big-endian", "Apple", true),
    entry!(b"sowt", "Not compressed, little-endian", "Apple", true),
    entry!(b"fl32", "32-bit floating point", "Apple", true),
    entry!(b"FL32", "32-bit floating point", "Apple", true),
    entry!(b"fl64", "64-bit floating point", "Apple", true),
    entry!(b"FL64", "64-bit floating point", "Apple", true),
    entry!(b"in24", "24-bit integer", "Apple", true),
    entry!(b"in32", "32-bit integer", "Apple", true),
    entry!(b"alac", "Apple Lossless", "Apple", true),
    entry!(b"alaw", "A-Law 2:1", "Apple", false),
    entry!(b"ALAW", "A-Law 2:1", "Apple", false),
    entry!(b"ulaw", "\u{b5}-Law 2:1", "Apple", false),
    entry!(b"ULAW", "\u{b5}-Law 2:1", "Apple", false),
    entry!(b"ima4", "IMA 4:1", "Apple", false),
    entry!(b"MAC3", "MACE 3:1", "Apple", false),
    entry!(b"MAC6", "MACE 6:1", "Apple", false),
    entry!(b"QDMC", "QDesign Music", "QDesign", false),
    entry!(b"QDM2", "QDesign Music 2", "QDesign", false),
    entry!(b"Qclp", "Qualcomm PureVoice", "Qualcomm", false),
    entry!(b"rt24", "RT24 50:1", "Voxware", false),
    entry!(b"rt29", "RT29 50:1", "Voxware", false),
    entry!(b"GSM ", "GSM 6.10", "Apple", false),
    entry!(b"G722", "G.722 ADPCM", "ITU", false),
    entry!(b"G726", "G.726 ADPCM", "ITU", false),
    entry!(b"G728", "G.728 LD-CELP", "ITU", false),
    entry!(b"DWVW", "Delta With Variable Word Width", "TDT", false),
    entry!(b"ADP4", "4:1 Intel/DVI ADPCM", "Voxware", false),
];

/// Look a code up. A miss is normal: vendors ship their own codes.
pub fn lookup(code: &[u8; 4]) -> Option<&'static CompressionEntry> {
    CATALOGUE.iter().find(|entry| entry.code == code)
}

pub fn entries() -> &'static [CompressionEntry] {
    CATALOGUE
}
