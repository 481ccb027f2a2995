mod types;

pub use types::*;

use anyhow::{Context, Result};
use rtprec_media::VideoCodec;
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<RecorderConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: RecorderConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<RecorderConfig> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./rtprec.toml",
        "~/.config/rtprec/config.toml",
        "/etc/rtprec/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(RecorderConfig::default())
}

/// Write the configuration as TOML
pub fn save_config(path: &Path, config: &RecorderConfig) -> Result<()> {
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;
    Ok(())
}

/// Validate configuration
pub fn validate_config(config: &RecorderConfig) -> Result<()> {
    if !config.video.enabled && !config.audio.enabled {
        anyhow::bail!("Both video and audio recording are disabled");
    }

    let video = &config.video;
    video
        .codec
        .parse::<VideoCodec>()
        .with_context(|| format!("Invalid video codec '{}'", video.codec))?;
    if video.timebase_denominator == 0 || video.timebase_numerator == 0 {
        anyhow::bail!(
            "Video timebase must be non-zero (got {}/{})",
            video.timebase_numerator,
            video.timebase_denominator
        );
    }

    let audio = &config.audio;
    if audio.sample_rate == 0 {
        anyhow::bail!("Audio sample rate cannot be 0");
    }
    if !(1..=2).contains(&audio.channel_count) {
        anyhow::bail!(
            "Audio channel count must be 1 or 2 (got {})",
            audio.channel_count
        );
    }

    if config.output_dir.is_file() {
        anyhow::bail!("Output path is a file: {:?}", config.output_dir);
    }

    Ok(())
}
