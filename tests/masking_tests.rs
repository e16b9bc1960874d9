//! Integration tests for display masking.

use cardvault::masking::{detect_prefix, mask};

#[test]
fn short_values_are_fully_masked() {
    assert_eq!(mask("1234567"), "*****");
    assert_eq!(mask("a"), "*****");
    // A recognised prefix does not matter below the threshold.
    assert_eq!(mask("ghp_abc"), "*****");
}

#[test]
fn empty_value_masks_to_empty() {
    assert_eq!(mask(""), "");
}

#[test]
fn github_token_keeps_prefix_and_four_chars() {
    assert_eq!(mask("ghp_1234567890abcdefABCDEF"), "ghp_*****CDEF");
}

#[test]
fn live_payment_key_keeps_five_chars() {
    assert_eq!(mask("sk_live_51H4RdE2BqJhGwM5N8"), "sk_live_*****wM5N8");
}

#[test]
fn test_publishable_key_keeps_four_chars() {
    assert_eq!(mask("pk_test_abcdefghijklmnop"), "pk_test_*****mnop");
}

#[test]
fn plain_value_has_no_prefix() {
    assert_eq!(mask("12345678"), "*****5678");
    assert_eq!(mask("correct horse battery staple"), "*****aple");
}

#[test]
fn short_prefixed_value_slices_tail_naively() {
    // The tail overlaps the prefix; the visible suffix is not shortened.
    assert_eq!(mask("sk_live_ab"), "sk_live_*****ve_ab");
    assert_eq!(mask("ghp_abcd"), "ghp_*****abcd");
}

#[test]
fn masking_is_deterministic() {
    let value = "xox_bot_1234567890";
    assert_eq!(mask(value), mask(value));
    assert_eq!(detect_prefix(value), "xox_bot_");
}
