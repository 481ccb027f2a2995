//! Rtprec - record RTP media streams to IVF and Ogg Opus files
//!
//! The container writers live in `rtprec-media` and the RTP handling in
//! `rtprec-rtp`. This crate adds TOML configuration, logging setup and
//! file-backed recordings.

pub mod config;
pub mod logging;
pub mod recorder;

pub use config::{load_config, load_config_or_default, RecorderConfig};
pub use recorder::{Recorder, Recording};
pub use rtprec_media as media;
pub use rtprec_rtp as rtp;
