//! Sidecar path derivation.

use std::path::{Path, PathBuf};

/// Suffix appended to the recording's base name for the offset index.
const OFFSETS_SUFFIX: &str = "-offsets.json";

/// Path of the offset index written next to a recording.
///
/// The base name is the file name up to its first `.`, so multi-part
/// extensions are stripped as a whole. The sidecar lands in the same directory.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use rtprec_media::paths::offsets_path;
///
/// assert_eq!(
///     offsets_path(Path::new("/rec/call.ivf")),
///     Path::new("/rec/call-offsets.json")
/// );
/// assert_eq!(
///     offsets_path(Path::new("audio.opus.ogg")),
///     Path::new("audio-offsets.json")
/// );
/// ```
pub fn offsets_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let base = file_name.split('.').next().unwrap_or_default();

    path.with_file_name(format!("{}{}", base, OFFSETS_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_path_keeps_directory() {
        assert_eq!(
            offsets_path(Path::new("./out/session.v1.ivf")),
            PathBuf::from("./out/session-offsets.json")
        );
    }

    #[test]
    fn test_offsets_path_without_extension() {
        assert_eq!(
            offsets_path(Path::new("recording")),
            PathBuf::from("recording-offsets.json")
        );
    }
}
