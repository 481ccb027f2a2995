use rtprec_media::{IvfOptions, OggOptions};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecorderConfig {
    /// Directory recordings are written to (created on first use)
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default)]
    pub video: VideoConfig,

    #[serde(default)]
    pub audio: AudioConfig,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./recordings")
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            video: VideoConfig::default(),
            audio: AudioConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VideoConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Codec MIME type: `video/VP8` or `video/AV1`
    #[serde(default = "default_codec")]
    pub codec: String,

    #[serde(default = "default_width")]
    pub width: u16,

    #[serde(default = "default_height")]
    pub height: u16,

    #[serde(default = "default_timebase_denominator")]
    pub timebase_denominator: u32,

    #[serde(default = "default_timebase_numerator")]
    pub timebase_numerator: u32,
}

fn default_true() -> bool {
    true
}
fn default_codec() -> String {
    "video/VP8".to_string()
}
fn default_width() -> u16 {
    640
}
fn default_height() -> u16 {
    480
}
fn default_timebase_denominator() -> u32 {
    30
}
fn default_timebase_numerator() -> u32 {
    1
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            codec: default_codec(),
            width: default_width(),
            height: default_height(),
            timebase_denominator: default_timebase_denominator(),
            timebase_numerator: default_timebase_numerator(),
        }
    }
}

impl VideoConfig {
    /// IVF writer options for this section.
    pub fn ivf_options(&self) -> rtprec_media::Result<IvfOptions> {
        Ok(IvfOptions::new()
            .mime_type(&self.codec)?
            .dimensions(self.width, self.height)
            .timebase(self.timebase_denominator, self.timebase_numerator))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AudioConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Input sample rate recorded in the Opus header (default: 48000)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Channel count, 1 to 255 (default: 2)
    #[serde(default = "default_channel_count")]
    pub channel_count: u16,

    /// Vendor string for the Opus comment header
    #[serde(default = "default_vendor")]
    pub vendor: String,
}

fn default_sample_rate() -> u32 {
    48_000
}
fn default_channel_count() -> u16 {
    2
}
fn default_vendor() -> String {
    "rtprec".to_string()
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sample_rate: default_sample_rate(),
            channel_count: default_channel_count(),
            vendor: default_vendor(),
        }
    }
}

impl AudioConfig {
    /// Ogg writer options for this section.
    ///
    /// Channel counts above 255 are clamped; validation rejects them earlier.
    pub fn ogg_options(&self) -> OggOptions {
        OggOptions::new()
            .sample_rate(self.sample_rate)
            .channel_count(u8::try_from(self.channel_count).unwrap_or(u8::MAX))
            .vendor(self.vendor.clone())
    }
}
