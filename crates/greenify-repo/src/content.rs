//! Working-tree churn so that every commit has a non-empty diff.

use std::path::{Path, PathBuf};

use greenify_core::GreenifyError;
use rand::distr::Alphanumeric;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const CONTENT_LEN: usize = 64;

/// Overwrites one file with fresh random text before each commit.
///
/// # Examples
///
/// ```
/// use greenify_repo::content::ContentWriter;
///
/// let dir = tempfile::tempdir().unwrap();
/// let mut writer = ContentWriter::new("output.txt", 1);
/// let path = writer.write(dir.path()).unwrap();
/// assert_eq!(std::fs::read_to_string(&path).unwrap().len(), 64);
/// ```
#[derive(Debug, Clone)]
pub struct ContentWriter {
    file_name: String,
    rng: ChaCha8Rng,
}

impl ContentWriter {
    pub fn new(file_name: impl Into<String>, seed: u64) -> Self {
        Self {
            file_name: file_name.into(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Replace the file in `dir` with 64 random alphanumeric characters.
    ///
    /// Returns the path written.
    pub fn write(&mut self, dir: &Path) -> Result<PathBuf, GreenifyError> {
        let text: String = (&mut self.rng)
            .sample_iter(Alphanumeric)
            .take(CONTENT_LEN)
            .map(char::from)
            .collect();
        let path = dir.join(&self.file_name);
        std::fs::write(&path, text)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_writes_differ() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ContentWriter::new("output.txt", 9);

        let path = writer.write(dir.path()).unwrap();
        let first = std::fs::read_to_string(&path).unwrap();
        writer.write(dir.path()).unwrap();
        let second = std::fs::read_to_string(&path).unwrap();

        assert_ne!(first, second);
        assert!(second.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(writer.file_name(), "output.txt");
        assert_eq!(path, dir.path().join(writer.file_name()));
    }

    #[test]
    fn seed_fixes_content() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        let pa = ContentWriter::new("f", 3).write(a.path()).unwrap();
        let pb = ContentWriter::new("f", 3).write(b.path()).unwrap();
        assert_eq!(
            std::fs::read_to_string(pa).unwrap(),
            std::fs::read_to_string(pb).unwrap()
        );
    }

    #[test]
    fn missing_directory_is_io_error() {
        let mut writer = ContentWriter::new("output.txt", 0);
        let err = writer.write(Path::new("/no/such/dir/anywhere")).unwrap_err();
        assert!(matches!(err, GreenifyError::Io(_)));
    }
}
