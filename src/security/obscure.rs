//! Obscuring codec for lexicon terms at rest.
//!
//! Terms are stored so that the lexicon file is not directly greppable for
//! sensitive words. This is **not** encryption: anyone holding the file can
//! recover every term. The transform exists only to keep plaintext off disk.
//!
//! # Record Format
//!
//! ```text
//! base64url_padded( zlib_best( FF FE || utf16le(term) ) )
//! ```
//!
//! The output is pure ASCII with no newlines, so one record fits on one line
//! of the lexicon file. Encoding is deterministic: there is no salt or nonce,
//! and the same term always yields byte-identical output.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use std::io::{Read, Write};
use thiserror::Error as ThisError;

/// UTF-16 little-endian byte-order mark prefixed to every encoded term.
pub const BYTE_ORDER_MARK: [u8; 2] = [0xFF, 0xFE];

/// Default cap on the decompressed size of a single record (4 KiB).
///
/// Terms are words or short phrases; anything larger is malformed input.
pub const DEFAULT_MAX_TERM_BYTES: usize = 4 * 1024;

/// Errors raised when a record was not produced by [`ObscuringCodec::encode`].
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum CodecError {
    /// The record is empty.
    #[error("empty record")]
    Empty,

    /// The record is not valid URL-safe base64.
    #[error("invalid base64: {0}")]
    Base64(String),

    /// The decoded bytes are not a valid zlib stream.
    #[error("invalid zlib stream: {0}")]
    Decompress(String),

    /// The decompressed payload exceeds the configured size limit.
    #[error("decoded record exceeds {limit} bytes")]
    TooLarge {
        /// Configured limit in bytes.
        limit: usize,
    },

    /// The payload does not start with the UTF-16LE byte-order mark.
    #[error("missing UTF-16LE byte-order mark")]
    MissingByteOrderMark,

    /// The payload has an odd number of bytes after the byte-order mark.
    #[error("UTF-16 payload has odd length {0}")]
    OddLength(usize),

    /// The payload contains unpaired surrogates.
    #[error("invalid UTF-16 text")]
    InvalidUtf16,
}

/// A reversible transform between a term and its at-rest record.
///
/// Implementations must satisfy `decode(encode(t)) == Ok(t)` and must be
/// deterministic.
pub trait TermCodec: Send + Sync {
    /// Encodes a term into its at-rest record.
    fn encode(&self, term: &str) -> Vec<u8>;

    /// Decodes an at-rest record back into the term.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] when `record` is not a valid encoding.
    fn decode(&self, record: &[u8]) -> Result<String, CodecError>;
}

/// The default obscuring codec (UTF-16LE, zlib, base64url).
#[derive(Debug, Clone, Copy)]
pub struct ObscuringCodec {
    max_term_bytes: usize,
}

impl ObscuringCodec {
    /// Creates a codec with the default record size limit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_term_bytes: DEFAULT_MAX_TERM_BYTES,
        }
    }

    /// Sets the maximum decompressed size accepted by [`TermCodec::decode`].
    #[must_use]
    pub const fn with_max_term_bytes(mut self, limit: usize) -> Self {
        self.max_term_bytes = limit;
        self
    }

    /// Returns the maximum decompressed record size.
    #[must_use]
    pub const fn max_term_bytes(&self) -> usize {
        self.max_term_bytes
    }
}

impl Default for ObscuringCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl TermCodec for ObscuringCodec {
    fn encode(&self, term: &str) -> Vec<u8> {
        let mut payload = Vec::with_capacity(BYTE_ORDER_MARK.len() + term.len() * 2);
        payload.extend_from_slice(&BYTE_ORDER_MARK);
        for unit in term.encode_utf16() {
            payload.extend_from_slice(&unit.to_le_bytes());
        }

        // Writes into a Vec are infallible.
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
        let compressed = encoder
            .write_all(&payload)
            .and_then(|()| encoder.finish())
            .unwrap_or_default();

        URL_SAFE.encode(compressed).into_bytes()
    }

    fn decode(&self, record: &[u8]) -> Result<String, CodecError> {
        if record.is_empty() {
            return Err(CodecError::Empty);
        }

        let compressed = URL_SAFE
            .decode(record)
            .map_err(|e| CodecError::Base64(e.to_string()))?;

        // Read one byte past the limit so oversized payloads are detectable.
        let read_limit = u64::try_from(self.max_term_bytes)
            .unwrap_or(u64::MAX)
            .saturating_add(1);
        let mut payload = Vec::new();
        ZlibDecoder::new(compressed.as_slice())
            .take(read_limit)
            .read_to_end(&mut payload)
            .map_err(|e| CodecError::Decompress(e.to_string()))?;

        if payload.len() > self.max_term_bytes {
            return Err(CodecError::TooLarge {
                limit: self.max_term_bytes,
            });
        }

        let Some(body) = payload.strip_prefix(&BYTE_ORDER_MARK) else {
            return Err(CodecError::MissingByteOrderMark);
        };
        if body.len() % 2 != 0 {
            return Err(CodecError::OddLength(body.len()));
        }

        let units: Vec<u16> = body
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&units).map_err(|_| CodecError::InvalidUtf16)
    }
}

/// Encodes a term with the default codec.
#[must_use]
pub fn encode(term: &str) -> Vec<u8> {
    ObscuringCodec::new().encode(term)
}

/// Decodes a record with the default codec.
///
/// # Errors
///
/// Returns a [`CodecError`] when `record` is not a valid encoding.
pub fn decode(record: &[u8]) -> Result<String, CodecError> {
    ObscuringCodec::new().decode(record)
}

/// Encodes every term, then decodes them all back and compares.
///
/// Nothing is returned unless every record round-trips to its original term,
/// so callers can hand the result straight to a writer.
///
/// # Errors
///
/// Returns [`crate::Error::Codec`] if a freshly encoded record fails to
/// decode, or [`crate::Error::RoundTripMismatch`] with the index of the first
/// term that decodes to something else.
pub fn encode_all_verified<C, S>(codec: &C, terms: &[S]) -> crate::Result<Vec<Vec<u8>>>
where
    C: TermCodec + ?Sized,
    S: AsRef<str>,
{
    let records: Vec<Vec<u8>> = terms.iter().map(|t| codec.encode(t.as_ref())).collect();

    for (index, (term, record)) in terms.iter().zip(&records).enumerate() {
        let decoded = codec.decode(record)?;
        if decoded != term.as_ref() {
            tracing::warn!(index, "Round-trip verification failed");
            return Err(crate::Error::RoundTripMismatch { index });
        }
    }

    Ok(records)
}
