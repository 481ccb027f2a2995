//! File-backed recordings built from a [`RecorderConfig`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use rtprec_media::{Clock, SystemClock};
use rtprec_rtp::{IvfRecorder, MediaWriter, OggRecorder, RtpPacket};

use crate::config::{validate_config, RecorderConfig};

/// Opens recordings under the configured output directory.
#[derive(Debug, Clone)]
pub struct Recorder {
    config: RecorderConfig,
    clock: Arc<dyn Clock>,
}

impl Recorder {
    /// Validate `config` and build a recorder using the wall clock.
    pub fn new(config: RecorderConfig) -> Result<Self> {
        validate_config(&config)?;
        Ok(Self {
            config,
            clock: Arc::new(SystemClock),
        })
    }

    /// Use `clock` for the offset indexes of every recording opened afterwards.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// Open `<output_dir>/<name>.ivf` and `<output_dir>/<name>.ogg` for the
    /// enabled tracks.
    ///
    /// Both tracks share a base name, so their offset sidecars are
    /// `<name>-video-offsets.json` and `<name>-audio-offsets.json`.
    pub fn open(&self, name: &str) -> Result<Recording> {
        if name.is_empty() || name.contains(|c: char| c == '/' || c == '\\') || name.starts_with('.') {
            anyhow::bail!("Invalid recording name: {:?}", name);
        }

        let dir = &self.config.output_dir;
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {:?}", dir))?;

        let mut recording = Recording {
            name: name.to_string(),
            video: None,
            audio: None,
            video_path: None,
            audio_path: None,
        };

        if self.config.video.enabled {
            let path = dir.join(format!("{name}.ivf"));
            let options = self
                .config
                .video
                .ivf_options()
                .context("Invalid video configuration")?
                .clock(self.clock.clone());
            let writer = IvfRecorder::create(&path, options)
                .with_context(|| format!("Failed to create video file: {:?}", path))?
                .with_offsets_path(dir.join(format!("{name}-video-offsets.json")));
            recording.video = Some(Box::new(writer));
            recording.video_path = Some(path);
        }

        if self.config.audio.enabled {
            let path = dir.join(format!("{name}.ogg"));
            let options = self.config.audio.ogg_options().clock(self.clock.clone());
            let writer = OggRecorder::create(&path, options)
                .with_context(|| format!("Failed to create audio file: {:?}", path))?
                .with_offsets_path(dir.join(format!("{name}-audio-offsets.json")));
            recording.audio = Some(Box::new(writer));
            recording.audio_path = Some(path);
        }

        tracing::info!(
            name,
            video = ?recording.video_path,
            audio = ?recording.audio_path,
            "opened recording"
        );
        Ok(recording)
    }
}

/// One recording session: up to one video and one audio track.
pub struct Recording {
    name: String,
    video: Option<Box<dyn MediaWriter>>,
    audio: Option<Box<dyn MediaWriter>>,
    video_path: Option<PathBuf>,
    audio_path: Option<PathBuf>,
}

impl Recording {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn video_path(&self) -> Option<&Path> {
        self.video_path.as_deref()
    }

    pub fn audio_path(&self) -> Option<&Path> {
        self.audio_path.as_deref()
    }

    /// Feed a video packet. Fails if video recording is disabled.
    pub fn write_video(&mut self, packet: &RtpPacket) -> Result<()> {
        let writer = self.video.as_mut().context("Video recording is disabled")?;
        writer.write_rtp(packet).context("Failed to record video packet")
    }

    /// Feed an audio packet. Fails if audio recording is disabled.
    pub fn write_audio(&mut self, packet: &RtpPacket) -> Result<()> {
        let writer = self.audio.as_mut().context("Audio recording is disabled")?;
        writer.write_rtp(packet).context("Failed to record audio packet")
    }

    /// Close both tracks. Every track is closed even if one fails; the first
    /// failure is returned. Later calls do nothing.
    pub fn close(&mut self) -> Result<()> {
        let video = match self.video.as_mut() {
            Some(writer) => writer.close().context("Failed to close video track"),
            None => Ok(()),
        };
        let audio = match self.audio.as_mut() {
            Some(writer) => writer.close().context("Failed to close audio track"),
            None => Ok(()),
        };

        tracing::info!(name = %self.name, "closed recording");
        video.and(audio)
    }
}

impl std::fmt::Debug for Recording {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recording")
            .field("name", &self.name)
            .field("video_path", &self.video_path)
            .field("audio_path", &self.audio_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder_in(dir: &Path) -> Recorder {
        let config = RecorderConfig {
            output_dir: dir.to_path_buf(),
            ..Default::default()
        };
        Recorder::new(config).unwrap()
    }

    #[test]
    fn test_rejects_bad_names() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = recorder_in(dir.path());
        for name in ["", "../escape", "a/b", ".hidden"] {
            assert!(recorder.open(name).is_err(), "{name:?}");
        }
    }

    #[test]
    fn test_disabled_track() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = RecorderConfig {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        config.video.enabled = false;

        let mut recording = Recorder::new(config).unwrap().open("voice").unwrap();
        assert!(recording.video_path().is_none());
        assert!(recording.audio_path().is_some());

        let packet = RtpPacket::new(1, 0, true, vec![0x10, 0x00]);
        let err = recording.write_video(&packet).unwrap_err();
        assert!(err.to_string().contains("disabled"));
        recording.close().unwrap();
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = RecorderConfig::default();
        config.audio.sample_rate = 0;
        assert!(Recorder::new(config).is_err());
    }
}
