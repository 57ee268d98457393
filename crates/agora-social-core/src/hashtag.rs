//! Hashtag extraction from post content

use regex::Regex;
use std::sync::OnceLock;

fn hashtag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#(\w+)").expect("hashtag pattern is valid"))
}

/// Distinct hashtag names in `content`, in order of first appearance.
///
/// A hashtag is `#` followed by one or more word characters; the name is
/// the part after `#`.
pub fn extract_hashtags(content: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for captures in hashtag_regex().captures_iter(content) {
        let name = &captures[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}
