//! Property-based tests (fuzzing) for the content codec and fingerprint.
//!
//! Uses proptest to throw arbitrary and adversarial strings at the pure
//! transformation layers and verify they never panic, never lose data, and
//! keep their documented invariants.
//!
//! Run with: `cargo test --test proptest_fuzz`

use proptest::prelude::*;

use scribe_store::{codec, fingerprint, Document};

// =============================================================================
// Strategies
// =============================================================================

/// Arbitrary unicode content, from empty up to a few kilobytes.
fn content_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        // Highly compressible
        ("[a-z ]{0,40}", 1usize..200).prop_map(|(s, n)| s.repeat(n)),
        // Arbitrary unicode
        "\\PC{0,2000}",
    ]
}

// =============================================================================
// Codec properties
// =============================================================================

proptest! {
    #[test]
    fn codec_round_trip_is_lossless(plain in content_strategy()) {
        let stored = codec::compress(&plain);
        prop_assert_eq!(codec::decompress(&stored.content), plain);
    }

    #[test]
    fn codec_reports_consistent_sizes(plain in content_strategy()) {
        let result = codec::compress(&plain);
        prop_assert_eq!(result.original_size, plain.len());
        if result.is_compressed {
            // Compression is only kept when it actually wins.
            prop_assert!(result.compressed_size < result.original_size);
            prop_assert!(codec::is_compressed(&result.content));
        } else {
            prop_assert_eq!(&result.content, &plain);
        }
    }

    #[test]
    fn codec_decompress_never_panics_on_arbitrary_input(input in "\\PC{0,500}") {
        // Arbitrary text is treated as plain and passed through.
        let _ = codec::decompress(&input);
    }

    #[test]
    fn codec_decompress_passes_through_fake_prefixes(tail in "[A-Za-z0-9+/=]{0,100}") {
        // '!' is never valid base64, so this can never decode; the stored
        // form must come back intact.
        let input = format!("zstd:!{tail}");
        prop_assert_eq!(codec::decompress(&input), input);
    }

    #[test]
    fn codec_decompress_is_idempotent_on_plain_output(plain in content_strategy()) {
        let once = codec::decompress(&codec::compress(&plain).content);
        prop_assert_eq!(codec::decompress(&once), once);
    }
}

// =============================================================================
// Fingerprint properties
// =============================================================================

proptest! {
    #[test]
    fn fingerprint_is_deterministic(content in content_strategy()) {
        prop_assert_eq!(fingerprint::sketch(&content), fingerprint::sketch(&content));
    }

    #[test]
    fn fingerprint_never_panics_on_unicode_boundaries(content in "\\PC{0,300}") {
        // Edge extraction must respect char boundaries for any content.
        let sketch = fingerprint::sketch(&content);
        prop_assert!(sketch.starts_with(&content.len().to_string()));
    }

    #[test]
    fn fingerprint_separates_different_lengths(
        content in "\\PC{0,200}",
        extra in "\\PC{1,50}",
    ) {
        // Differing byte lengths always yield differing sketches.
        let grown = format!("{content}{extra}");
        prop_assert_ne!(fingerprint::sketch(&content), fingerprint::sketch(&grown));
    }
}

// =============================================================================
// Document sealing properties
// =============================================================================

proptest! {
    #[test]
    fn document_serde_round_trip(
        title in "\\PC{0,50}",
        content in content_strategy(),
    ) {
        let doc = Document::new(title, content);
        let json = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, doc);
    }
}
