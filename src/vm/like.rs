// Copyright (c) The exprus Authors.
// Licensed under the MIT License.

use std::sync::Arc;

use regex::Regex;

/// A SQL LIKE pattern compiled once at expression-compile time.
///
/// `%` matches any run of characters, `_` any single character, `\` escapes
/// the next character. Matching is case-sensitive. Common shapes (exact,
/// prefix, suffix, contains, prefix+suffix) match with plain string
/// operations; everything else is translated into an anchored regular
/// expression.
#[derive(Debug, Clone)]
pub struct LikePattern {
    pattern: Arc<str>,
    matcher: Matcher,
}

#[derive(Debug, Clone)]
enum Matcher {
    MatchAll,
    Exact(String),
    Prefix(String),
    Suffix(String),
    Contains(String),
    PrefixSuffix(String, String),
    Regex(Regex),
}

impl LikePattern {
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: Arc::from(pattern),
            matcher: compile_matcher(pattern),
        }
    }

    /// The original LIKE pattern text.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn matches(&self, text: &str) -> bool {
        match &self.matcher {
            Matcher::MatchAll => true,
            Matcher::Exact(s) => text == s,
            Matcher::Prefix(p) => text.starts_with(p),
            Matcher::Suffix(s) => text.ends_with(s),
            Matcher::Contains(c) => text.contains(c),
            Matcher::PrefixSuffix(p, s) => {
                text.len() >= p.len() + s.len() && text.starts_with(p) && text.ends_with(s)
            }
            Matcher::Regex(re) => re.is_match(text),
        }
    }
}

fn compile_matcher(pattern: &str) -> Matcher {
    // Fast paths apply only when `%` is the sole metacharacter in play.
    if !pattern.contains('_') && !pattern.contains('\\') {
        let parts: Vec<&str> = pattern.split('%').collect();
        match parts.as_slice() {
            [exact] => return Matcher::Exact((*exact).to_string()),
            ["", ""] => return Matcher::MatchAll,
            [prefix, ""] if !prefix.is_empty() => return Matcher::Prefix((*prefix).to_string()),
            ["", suffix] if !suffix.is_empty() => return Matcher::Suffix((*suffix).to_string()),
            ["", contains, ""] if !contains.is_empty() => {
                return Matcher::Contains((*contains).to_string())
            }
            [prefix, suffix] if !prefix.is_empty() && !suffix.is_empty() => {
                return Matcher::PrefixSuffix((*prefix).to_string(), (*suffix).to_string())
            }
            _ => {}
        }
    }

    match Regex::new(&like_to_regex(pattern)) {
        Ok(re) => Matcher::Regex(re),
        // The translation escapes every metacharacter, so this arm is not
        // expected to run; fall back to an exact match rather than panic.
        Err(_) => Matcher::Exact(pattern.to_string()),
    }
}

fn push_literal(regex: &mut String, c: char) {
    if matches!(
        c,
        '.' | '^' | '$' | '*' | '+' | '?' | '{' | '}' | '[' | ']' | '(' | ')' | '|' | '\\'
    ) {
        regex.push('\\');
    }
    regex.push(c);
}

/// Translate a LIKE pattern into an anchored regular expression. `(?s)` lets
/// `%` and `_` cross newlines.
fn like_to_regex(pattern: &str) -> String {
    let mut regex = String::with_capacity(pattern.len() * 2 + 6);
    regex.push_str("(?s)^");

    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '%' => regex.push_str(".*"),
            '_' => regex.push('.'),
            '\\' => {
                if let Some(next) = chars.next() {
                    push_literal(&mut regex, next);
                }
            }
            c => push_literal(&mut regex, c),
        }
    }

    regex.push('$');
    regex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match() {
        let p = LikePattern::new("hello");
        assert!(p.matches("hello"));
        assert!(!p.matches("Hello"));
        assert!(!p.matches("hello world"));
    }

    #[test]
    fn prefix_suffix_contains() {
        assert!(LikePattern::new("abc%").matches("abcdef"));
        assert!(!LikePattern::new("abc%").matches("zabc"));
        assert!(LikePattern::new("%xyz").matches("wxyz"));
        assert!(LikePattern::new("%mid%").matches("a mid b"));
        assert!(LikePattern::new("a%z").matches("abcz"));
        // prefix and suffix must not overlap
        assert!(!LikePattern::new("ab%ba").matches("aba"));
        assert!(LikePattern::new("ab%ba").matches("abba"));
    }

    #[test]
    fn match_all_and_empty() {
        assert!(LikePattern::new("%").matches(""));
        assert!(LikePattern::new("%").matches("anything"));
        assert!(LikePattern::new("").matches(""));
        assert!(!LikePattern::new("").matches("x"));
    }

    #[test]
    fn underscore_matches_one_character() {
        let p = LikePattern::new("h_llo");
        assert!(p.matches("hello"));
        assert!(p.matches("hallo"));
        assert!(!p.matches("hllo"));
        assert!(!p.matches("heello"));
    }

    #[test]
    fn escaped_metacharacters_are_literal() {
        let p = LikePattern::new("100\\%");
        assert!(p.matches("100%"));
        assert!(!p.matches("1000"));

        let p = LikePattern::new("a\\_b");
        assert!(p.matches("a_b"));
        assert!(!p.matches("axb"));
    }

    #[test]
    fn regex_metacharacters_in_pattern_are_literal() {
        let p = LikePattern::new("a.c%");
        assert!(p.matches("a.cd"));
        assert!(!p.matches("abcd"));
    }

    #[test]
    fn percent_crosses_newlines() {
        assert!(LikePattern::new("a%_b").matches("a\nxb"));
    }
}
