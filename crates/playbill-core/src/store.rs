//! On-disk persistence for accepted transcripts.

use std::fs;
use std::path::{Path, PathBuf};

/// Store writing accepted transcripts as numbered files in one directory.
#[derive(Debug, Clone)]
pub struct TranscriptStore {
    dir: PathBuf,
}

impl TranscriptStore {
    pub fn new(dir: &Path) -> Result<Self, String> {
        if dir.as_os_str().is_empty() {
            return Err("output directory required".to_string());
        }
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ensure the output directory exists.
    pub fn ensure_dir(&self) -> Result<(), String> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| format!("create output dir {}: {e}", self.dir.display()))
    }

    /// Zero-padded file name for a one-based transcript index.
    pub fn file_name(index: usize) -> String {
        format!("{index:03}.txt")
    }

    pub fn transcript_path(&self, index: usize) -> PathBuf {
        self.dir.join(Self::file_name(index))
    }

    /// Persist an accepted transcript, normalizing the trailing newline.
    pub fn write_transcript(&self, index: usize, raw_text: &str) -> Result<PathBuf, String> {
        let path = self.transcript_path(index);
        let mut content = raw_text.to_string();
        if !content.ends_with('\n') {
            content.push('\n');
        }
        fs::write(&path, content).map_err(|e| format!("write {}: {e}", path.display()))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_zero_padded_to_three_digits() {
        assert_eq!(TranscriptStore::file_name(1), "001.txt");
        assert_eq!(TranscriptStore::file_name(42), "042.txt");
        assert_eq!(TranscriptStore::file_name(1234), "1234.txt");
    }

    #[test]
    fn empty_directory_path_is_rejected() {
        assert!(TranscriptStore::new(Path::new("")).is_err());
    }
}
