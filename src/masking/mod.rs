//! Display masking for secret values.
//!
//! `mask` turns a plaintext secret into the string shown in place of it
//! by default.  Well-known credential prefixes (`ghp_`, `sk_live_`,
//! `pk_test_`, ...) are kept so users can tell keys apart; everything
//! but a short tail is replaced by asterisks.

use std::sync::OnceLock;

use regex::Regex;

/// Values shorter than this (in characters) are fully masked.
const MIN_PARTIAL_LEN: usize = 8;

/// The fixed run of asterisks standing in for the hidden middle.
const MASK: &str = "*****";

/// Visible tail length for ordinary values.
const SUFFIX_LEN: usize = 4;

/// Live payment keys conventionally show one more trailing character.
const LIVE_KEY_PREFIX: &str = "sk_live_";
const LIVE_KEY_SUFFIX_LEN: usize = 5;

/// 2-3 letters, an optional `_word`, then a trailing underscore.
fn prefix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^[a-z]{2,3}(?:_[a-z]+)?_").expect("prefix pattern is a valid regex")
    })
}

/// Return the credential-style prefix of `value`, or `""` if none.
pub fn detect_prefix(value: &str) -> &str {
    prefix_pattern()
        .find(value)
        .map_or("", |m| m.as_str())
}

/// Mask `value` for display.
///
/// Total and deterministic: never fails, and the same input always gives
/// the same output.
///
/// The tail is sliced without regard to the prefix, so a short value
/// with a recognised prefix can show characters that overlap it.
pub fn mask(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    let char_count = value.chars().count();
    if char_count < MIN_PARTIAL_LEN {
        return MASK.to_string();
    }

    let prefix = detect_prefix(value);
    let suffix_len = if prefix == LIVE_KEY_PREFIX {
        LIVE_KEY_SUFFIX_LEN
    } else {
        SUFFIX_LEN
    };

    let suffix: String = value.chars().skip(char_count - suffix_len).collect();
    format!("{prefix}{MASK}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_common_prefixes() {
        assert_eq!(detect_prefix("ghp_abc123"), "ghp_");
        assert_eq!(detect_prefix("sk_live_51H4"), "sk_live_");
        assert_eq!(detect_prefix("pk_test_abcd"), "pk_test_");
        assert_eq!(detect_prefix("xoxb_token"), "");
        assert_eq!(detect_prefix("plainpassword"), "");
    }

    #[test]
    fn prefix_detection_is_case_insensitive() {
        assert_eq!(detect_prefix("GHP_ABCDEFGH"), "GHP_");
        assert_eq!(detect_prefix("Sk_Live_abc"), "Sk_Live_");
    }

    #[test]
    fn live_key_rule_only_applies_to_exact_lowercase_prefix() {
        assert_eq!(mask("SK_LIVE_51H4RdE2BqJhGwM5N8"), "SK_LIVE_*****M5N8");
    }

    #[test]
    fn no_prefix_keeps_four_char_tail() {
        assert_eq!(mask("hunter2hunter2"), "*****ter2");
    }

    #[test]
    fn eight_chars_is_the_first_partial_mask() {
        assert_eq!(mask("abcdefgh"), "*****efgh");
    }

    #[test]
    fn short_prefixed_value_overlaps_the_prefix() {
        assert_eq!(mask("sk_live_ab"), "sk_live_*****ve_ab");
    }

    #[test]
    fn counts_characters_not_bytes() {
        // Seven characters, more than seven bytes.
        assert_eq!(mask("pässwör"), "*****");
        assert_eq!(mask("pässwörtér"), "*****rtér");
    }
}
