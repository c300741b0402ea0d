//! Lexicon file persistence.
//!
//! The lexicon file holds one obscured record per line, in lexicon order, with
//! no header. The store never reorders or deduplicates records.
//!
//! # Atomicity
//!
//! Writes go to a temporary file in the destination directory which is then
//! renamed over the target, so a crash mid-write never leaves a half-written
//! lexicon under the final name. All records are round-trip verified before
//! the temporary file is created.

use crate::security::obscure::{ObscuringCodec, TermCodec, encode_all_verified};
use crate::{Error, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Default maximum lexicon file size (8 MiB).
pub const DEFAULT_MAX_FILE_BYTES: u64 = 8 * 1024 * 1024;

/// Reads and writes obscured lexicon files.
#[derive(Debug, Clone)]
pub struct LexiconStore<C: TermCodec = ObscuringCodec> {
    path: PathBuf,
    codec: C,
    max_file_bytes: u64,
}

impl LexiconStore<ObscuringCodec> {
    /// Creates a store for `path` using the default obscuring codec.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_codec(path, ObscuringCodec::new())
    }
}

impl<C: TermCodec> LexiconStore<C> {
    /// Creates a store for `path` using a custom codec.
    #[must_use]
    pub fn with_codec(path: impl Into<PathBuf>, codec: C) -> Self {
        Self {
            path: path.into(),
            codec,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }

    /// Sets the maximum accepted file size for [`Self::read`].
    #[must_use]
    pub const fn with_max_file_bytes(mut self, limit: u64) -> Self {
        self.max_file_bytes = limit;
        self
    }

    /// Returns the lexicon file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the codec used for records.
    #[must_use]
    pub const fn codec(&self) -> &C {
        &self.codec
    }

    /// Reads and decodes every record, in file order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the file is missing, unreadable, larger than
    /// the configured limit, or contains a record that fails to decode. Decode
    /// failures carry the 1-based line number.
    #[tracing::instrument(skip_all, fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Vec<String>> {
        let metadata = fs::metadata(&self.path).map_err(|e| self.store_error(None, &e))?;
        if metadata.len() > self.max_file_bytes {
            return Err(self.store_error(
                None,
                &format!(
                    "file is {} bytes, maximum is {}",
                    metadata.len(),
                    self.max_file_bytes
                ),
            ));
        }

        let data = fs::read(&self.path).map_err(|e| self.store_error(None, &e))?;
        let body = data.strip_suffix(b"\n").unwrap_or(&data);
        if body.is_empty() {
            tracing::info!(records = 0, "Loaded empty lexicon");
            return Ok(Vec::new());
        }

        let terms = body
            .split(|b| *b == b'\n')
            .enumerate()
            .map(|(idx, line)| {
                let record = line.strip_suffix(b"\r").unwrap_or(line);
                self.codec
                    .decode(record)
                    .map_err(|e| self.store_error(Some(idx + 1), &e))
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(records = terms.len(), "Loaded lexicon");
        Ok(terms)
    }

    /// Encodes and atomically writes `terms`, one record per line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RoundTripMismatch`] or [`Error::Codec`] if round-trip
    /// verification fails (nothing is written), or [`Error::Store`] if the
    /// file cannot be written.
    #[tracing::instrument(skip_all, fields(path = %self.path.display(), terms = terms.len()))]
    pub fn write<S: AsRef<str>>(&self, terms: &[S]) -> Result<()> {
        let records = encode_all_verified(&self.codec, terms)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| self.store_error(None, &e))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.store_error(None, &e))?;
        for record in &records {
            tmp.write_all(record)
                .and_then(|()| tmp.write_all(b"\n"))
                .map_err(|e| self.store_error(None, &e))?;
        }
        tmp.as_file()
            .sync_all()
            .map_err(|e| self.store_error(None, &e))?;
        tmp.persist(&self.path)
            .map_err(|e| self.store_error(None, &e.error))?;

        tracing::info!(records = records.len(), "Wrote lexicon");
        Ok(())
    }

    fn store_error(&self, line: Option<usize>, cause: &dyn std::fmt::Display) -> Error {
        Error::Store {
            path: self.path.clone(),
            line,
            cause: cause.to_string(),
        }
    }
}

/// Reads a lexicon file with the default codec.
///
/// # Errors
///
/// See [`LexiconStore::read`].
pub fn read(path: impl AsRef<Path>) -> Result<Vec<String>> {
    LexiconStore::new(path.as_ref()).read()
}

/// Writes a lexicon file with the default codec.
///
/// # Errors
///
/// See [`LexiconStore::write`].
pub fn write<S: AsRef<str>>(path: impl AsRef<Path>, terms: &[S]) -> Result<()> {
    LexiconStore::new(path.as_ref()).write(terms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::obscure::{CodecError, encode};
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read_preserves_order_and_duplicates() {
        let dir = TempDir::new().unwrap();
        let store = LexiconStore::new(dir.path().join("lexicon.txt"));
        let terms = ["clocktower", "Big Ben", "on-foot", "Big Ben"];

        store.write(&terms).unwrap();
        assert_eq!(store.read().unwrap(), terms);
    }

    #[test]
    fn test_file_has_one_record_per_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lexicon.txt");
        write(&path, &["cat", "dog"]).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].as_bytes(), encode("cat").as_slice());
        assert!(!contents.contains("dog"));
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("nested").join("lexicon.txt");
        write(&path, &["cat"]).unwrap();
        assert_eq!(read(&path).unwrap(), vec!["cat"]);
    }

    #[test]
    fn test_empty_lexicon_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lexicon.txt");
        write(&path, &[] as &[&str]).unwrap();
        assert!(read(&path).unwrap().is_empty());
    }

    #[test]
    fn test_read_accepts_crlf_and_missing_final_newline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lexicon.txt");
        let mut data = encode("cat");
        data.extend_from_slice(b"\r\n");
        data.extend_from_slice(&encode("big ben"));
        fs::write(&path, data).unwrap();

        assert_eq!(read(&path).unwrap(), vec!["cat", "big ben"]);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read(dir.path().join("absent.txt")).unwrap_err();
        assert!(matches!(err, Error::Store { line: None, .. }));
    }

    #[test]
    fn test_read_reports_bad_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lexicon.txt");
        let mut data = encode("cat");
        data.extend_from_slice(b"\nthis is not a record\n");
        fs::write(&path, data).unwrap();

        let err = read(&path).unwrap_err();
        match err {
            Error::Store { line, cause, .. } => {
                assert_eq!(line, Some(2));
                assert!(cause.contains("base64"));
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_blank_line_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lexicon.txt");
        let mut data = encode("cat");
        data.extend_from_slice(b"\n\n");
        data.extend_from_slice(&encode("dog"));
        fs::write(&path, data).unwrap();

        let err = read(&path).unwrap_err();
        assert!(matches!(err, Error::Store { line: Some(2), .. }));
        assert!(err.to_string().contains(&CodecError::Empty.to_string()));
    }

    #[test]
    fn test_read_rejects_oversized_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lexicon.txt");
        write(&path, &["cat", "dog", "clocktower"]).unwrap();

        let store = LexiconStore::new(&path).with_max_file_bytes(16);
        assert!(matches!(store.read(), Err(Error::Store { line: None, .. })));
    }

    #[test]
    fn test_write_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lexicon.txt");
        write(&path, &["cat", "dog"]).unwrap();
        write(&path, &["on-foot"]).unwrap();
        assert_eq!(read(&path).unwrap(), vec!["on-foot"]);
    }

    /// Codec that upper-cases on decode, so round-trip always fails.
    #[derive(Debug)]
    struct ShoutingCodec;

    impl TermCodec for ShoutingCodec {
        fn encode(&self, term: &str) -> Vec<u8> {
            encode(term)
        }

        fn decode(&self, record: &[u8]) -> std::result::Result<String, CodecError> {
            crate::security::obscure::decode(record).map(|t| t.to_uppercase())
        }
    }

    #[test]
    fn test_round_trip_mismatch_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lexicon.txt");
        let store = LexiconStore::with_codec(&path, ShoutingCodec);

        let err = store.write(&["cat"]).unwrap_err();
        assert!(matches!(err, Error::RoundTripMismatch { index: 0 }));
        assert!(!path.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_round_trip_mismatch_keeps_previous_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lexicon.txt");
        write(&path, &["dog"]).unwrap();

        let store = LexiconStore::with_codec(&path, ShoutingCodec);
        assert!(store.write(&["cat"]).is_err());
        assert_eq!(read(&path).unwrap(), vec!["dog"]);
    }
}
