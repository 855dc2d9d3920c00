//! Cheap structural content fingerprint.
//!
//! [`sketch`] builds an identity string from the content's byte length plus a
//! bounded prefix and suffix. It exists solely to short-circuit redundant
//! saves: two contents with the same sketch are treated as identical and the
//! write is skipped.
//!
//! This is **not** a hash. Two different contents that agree on length,
//! prefix and suffix will collide, and that false-positive risk is accepted
//! for this use case. Never use the sketch as an integrity or security
//! guarantee.
//!
//! # Example
//!
//! ```
//! use scribe_store::fingerprint;
//!
//! let a = fingerprint::sketch("hello world");
//! let b = fingerprint::sketch("hello world");
//! let c = fingerprint::sketch("hello there");
//! assert_eq!(a, b);
//! assert_ne!(a, c);
//! ```

/// How many bytes of prefix/suffix to capture (rounded to char boundaries).
const EDGE_BYTES: usize = 64;

/// Build the identity sketch for a piece of content.
///
/// Runs in O(EDGE_BYTES) regardless of content length, so multi-megabyte
/// bodies are never scanned in full.
#[must_use]
pub fn sketch(content: &str) -> String {
    let len = content.len();

    let mut head_end = EDGE_BYTES.min(len);
    while !content.is_char_boundary(head_end) {
        head_end -= 1;
    }

    let mut tail_start = len.saturating_sub(EDGE_BYTES);
    while !content.is_char_boundary(tail_start) {
        tail_start += 1;
    }

    format!("{len}:{}:{}", &content[..head_end], &content[tail_start..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_content_matches() {
        let content = "some document body".repeat(100);
        assert_eq!(sketch(&content), sketch(&content));
    }

    #[test]
    fn test_different_length_differs() {
        assert_ne!(sketch("abc"), sketch("abcd"));
    }

    #[test]
    fn test_different_prefix_differs() {
        let a = format!("AAAA{}", "x".repeat(200));
        let b = format!("BBBB{}", "x".repeat(200));
        assert_ne!(sketch(&a), sketch(&b));
    }

    #[test]
    fn test_different_suffix_differs() {
        let a = format!("{}AAAA", "x".repeat(200));
        let b = format!("{}BBBB", "x".repeat(200));
        assert_ne!(sketch(&a), sketch(&b));
    }

    #[test]
    fn test_middle_edit_same_length_collides() {
        // Documented false positive: same length, prefix and suffix.
        let a = format!("{}MIDDLE-A{}", "p".repeat(100), "s".repeat(100));
        let b = format!("{}MIDDLE-B{}", "p".repeat(100), "s".repeat(100));
        assert_eq!(sketch(&a), sketch(&b));
    }

    #[test]
    fn test_empty_content() {
        assert_eq!(sketch(""), "0::");
    }

    #[test]
    fn test_short_content_embeds_whole_body() {
        let s = sketch("hi");
        assert!(s.starts_with("2:"));
        assert!(s.contains("hi"));
    }

    #[test]
    fn test_unicode_boundaries() {
        // Multi-byte chars straddling the 64-byte edges must not panic.
        let content = "こんにちは世界".repeat(50);
        let s = sketch(&content);
        assert!(s.starts_with(&format!("{}:", content.len())));
    }

    #[test]
    fn test_cost_independent_of_size() {
        // A large body still produces a bounded sketch.
        let content = "x".repeat(5 * 1024 * 1024);
        let s = sketch(&content);
        assert!(s.len() < 2 * EDGE_BYTES + 32);
    }
}
