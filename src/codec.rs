//! Transparent content compression for on-medium storage.
//!
//! Uses zstd compression with a self-describing `zstd:` prefix so that
//! [`decompress`] is always safe to call: content written before compression
//! existed (or whose payload turns out to be malformed) passes through
//! unchanged.
//!
//! The stored form is a plain string (`zstd:` + base64 of the zstd frame)
//! because the local medium is a string key-value store; keeping the value
//! JSON-safe avoids a second encoding layer in the backends.
//!
//! # Why compress at all?
//!
//! Document bodies are text and compress well (often 60-90% reduction), and
//! both media enforce tight per-document size caps. Compression is skipped
//! when the input is small or when the encoded form would not actually be
//! smaller, so [`CompressResult::is_compressed`] is never a lie.
//!
//! # Example
//!
//! ```
//! use scribe_store::codec;
//!
//! let plain = "hello world".repeat(50);
//! let result = codec::compress(&plain);
//! assert!(result.is_compressed);
//! assert_eq!(codec::decompress(&result.content), plain);
//!
//! // Legacy / uncompressed data passes through untouched.
//! assert_eq!(codec::decompress("plain old note"), "plain old note");
//! ```

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

/// Prefix marking a stored value as a base64-wrapped zstd frame.
const COMPRESSED_PREFIX: &str = "zstd:";

/// Inputs shorter than this are stored as-is; the prefix + base64 overhead
/// would outweigh any gain.
const MIN_COMPRESS_BYTES: usize = 64;

/// Default compression level (3 is a good balance of speed/ratio)
const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// Outcome of [`compress`]: the storable string plus size accounting.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressResult {
    /// The value to put on the medium (compressed or plain).
    pub content: String,
    /// Byte length of the original plain content.
    pub original_size: usize,
    /// Byte length of the stored form.
    pub compressed_size: usize,
    /// `compressed_size / original_size` (1.0 when stored plain).
    pub ratio: f64,
    /// Whether the stored form is actually compressed.
    pub is_compressed: bool,
}

/// Check whether a stored value carries the compression marker.
#[inline]
#[must_use]
pub fn is_compressed(stored: &str) -> bool {
    stored.starts_with(COMPRESSED_PREFIX)
}

/// Compress plain content for storage at the default level.
#[must_use]
pub fn compress(plain: &str) -> CompressResult {
    compress_with_level(plain, DEFAULT_COMPRESSION_LEVEL)
}

/// Compress plain content with a custom zstd level (1-22).
///
/// Falls back to storing the plain string whenever compression is not
/// worthwhile, so the result is always valid input for [`decompress`].
#[must_use]
pub fn compress_with_level(plain: &str, level: i32) -> CompressResult {
    let original_size = plain.len();

    if original_size >= MIN_COMPRESS_BYTES {
        if let Ok(frame) = zstd::encode_all(plain.as_bytes(), level) {
            let stored = format!("{COMPRESSED_PREFIX}{}", BASE64.encode(&frame));
            if stored.len() < original_size {
                return CompressResult {
                    compressed_size: stored.len(),
                    ratio: stored.len() as f64 / original_size as f64,
                    content: stored,
                    original_size,
                    is_compressed: true,
                };
            }
        }
    }

    CompressResult {
        content: plain.to_string(),
        original_size,
        compressed_size: original_size,
        ratio: 1.0,
        is_compressed: false,
    }
}

/// Decompress a stored value back to plain content.
///
/// Detects compression via the `zstd:` prefix. Values without the prefix,
/// and values whose payload fails base64/zstd/UTF-8 decoding, are returned
/// unchanged (legacy pass-through).
#[must_use]
pub fn decompress(stored: &str) -> String {
    if !is_compressed(stored) {
        return stored.to_string();
    }

    let payload = &stored[COMPRESSED_PREFIX.len()..];
    let Ok(frame) = BASE64.decode(payload) else {
        return stored.to_string();
    };
    let Ok(plain) = zstd::decode_all(frame.as_slice()) else {
        return stored.to_string();
    };
    String::from_utf8(plain).unwrap_or_else(|_| stored.to_string())
}
