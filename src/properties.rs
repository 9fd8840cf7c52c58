use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    #[default]
    Big,
    Little,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AudioProperties {
    channels: u16,
    sample_frames: u64,
    bits_per_sample: u16,
    sample_rate: f64,
    duration_seconds: f64,
    bitrate: u64,
    lossless: bool,
    encoding: String,
    endianness: Endianness,
}

impl AudioProperties {
    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_frames(&self) -> u64 {
        self.sample_frames
    }

    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    // Sample rate in Hz. Not always an integer.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    pub fn duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.duration_seconds).unwrap_or_default()
    }

    // Bits per second of the uncompressed stream.
    pub fn bitrate(&self) -> u64 {
        self.bitrate
    }

    pub fn is_lossless(&self) -> bool {
        self.lossless
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }
}

#[derive(Debug, Default)]
pub struct AudioPropertiesBuilder {
    props: AudioProperties,
    byte_rate: u32,
    audio_data_len: Option<u64>,
    has_sample_frames: bool,
}

impl AudioPropertiesBuilder {
    pub fn new(endianness: Endianness) -> Self {
        Self {
            props: AudioProperties {
                endianness,
                ..AudioProperties::default()
            },
            ..Self::default()
        }
    }

    pub fn set_channels(&mut self, channels: u16) -> &mut Self {
        self.props.channels = channels;
        self
    }

    pub fn set_sample_frames(&mut self, frames: u64) -> &mut Self {
        self.props.sample_frames = frames;
        self.has_sample_frames = true;
        self
    }

    pub fn set_bits_per_sample(&mut self, bits: u16) -> &mut Self {
        self.props.bits_per_sample = bits;
        self
    }

    pub fn set_sample_rate(&mut self, rate: f64) -> &mut Self {
        self.props.sample_rate = rate;
        self
    }

    pub fn set_duration_seconds(&mut self, seconds: f64) -> &mut Self {
        self.props.duration_seconds = seconds;
        self
    }

    pub fn set_bitrate(&mut self, bitrate: u64) -> &mut Self {
        self.props.bitrate = bitrate;
        self
    }

    pub fn set_lossless(&mut self, lossless: bool) -> &mut Self {
        self.props.lossless = lossless;
        self
    }

    pub fn set_encoding(&mut self, encoding: impl Into<String>) -> &mut Self {
        self.props.encoding = encoding.into();
        self
    }

    pub fn set_endianness(&mut self, endianness: Endianness) -> &mut Self {
        self.props.endianness = endianness;
        self
    }

    pub fn set_byte_rate(&mut self, byte_rate: u32) -> &mut Self {
        self.byte_rate = byte_rate;
        self
    }

    pub fn set_audio_data_len(&mut self, len: u64) -> &mut Self {
        self.audio_data_len = Some(len);
        self
    }

    pub fn sample_rate(&self) -> f64 {
        self.props.sample_rate
    }

    pub fn sample_frames(&self) -> Option<u64> {
        self.has_sample_frames.then_some(self.props.sample_frames)
    }

    pub fn byte_rate(&self) -> u32 {
        self.byte_rate
    }

    pub fn audio_data_len(&self) -> Option<u64> {
        self.audio_data_len
    }

    pub fn peek(&self) -> &AudioProperties {
        &self.props
    }

    pub fn build(self) -> AudioProperties {
        self.props
    }
}
