//! Post-text token helpers shared by the filter chain and the scorer path.

use regex::Regex;

/// Extract `#hashtag` tokens from post text, without the leading `#`,
/// in order of appearance.
pub fn extract_hashtags(text: &str) -> Vec<String> {
    let re = Regex::new(r"#(\w+)").expect("valid regex");
    re.captures_iter(text)
        .map(|c| c[1].to_string())
        .collect()
}

/// Total characters consumed by `@handle` mention tokens, `@` included.
pub fn mention_chars(text: &str) -> usize {
    let re = Regex::new(r"@\w+").expect("valid regex");
    re.find_iter(text).map(|m| m.as_str().chars().count()).sum()
}

/// Fraction of the text consumed by mention tokens. Empty text is 0.0.
pub fn mention_density(text: &str) -> f64 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }
    mention_chars(text) as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashtags_extracted_in_order_without_hash() {
        let tags = extract_hashtags("gm #solana devs, shipping on #Base today");
        assert_eq!(tags, vec!["solana", "Base"]);
    }

    #[test]
    fn no_hashtags_is_empty() {
        assert!(extract_hashtags("plain text, no tags").is_empty());
    }

    #[test]
    fn mention_chars_counts_at_sign() {
        // "@alice" = 6 chars, "@bob" = 4 chars
        assert_eq!(mention_chars("@alice and @bob"), 10);
    }

    #[test]
    fn density_of_pure_mentions_is_high() {
        let text = "@a @b @c";
        // 6 mention chars out of 8
        assert!((mention_density(text) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn density_of_empty_text_is_zero() {
        assert_eq!(mention_density(""), 0.0);
    }

    #[test]
    fn email_like_tokens_count_as_mentions_mid_word() {
        // The upstream tokenizer is this naive too: "a@b.com" yields "@b".
        assert_eq!(mention_chars("mail me a@bc.com"), 3);
    }
}
