//! Field rules: ordered literal substitutions applied to template contents and paths.
//!
//! Matching is literal, never a regex. A case-insensitive rule lower-cases both
//! sides while searching (ASCII patterns byte by byte, other patterns char by
//! char over valid UTF-8), then splices the replacement into the original
//! buffer, so bytes outside a match are never touched. Because the search works
//! on raw bytes, binary files pass through unchanged unless a pattern actually
//! occurs in them.

use std::borrow::Cow;

use crate::error::{Error, Result};

/// Which part of a template entry a rule rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleScope {
    /// File contents only.
    #[default]
    Contents,
    /// Relative paths only.
    Paths,
    /// Both contents and relative paths.
    All,
}

impl RuleScope {
    fn covers_contents(self) -> bool {
        matches!(self, RuleScope::Contents | RuleScope::All)
    }

    fn covers_paths(self) -> bool {
        matches!(self, RuleScope::Paths | RuleScope::All)
    }
}

/// One match/replace pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pattern: String,
    replacement: String,
    case_sensitive: bool,
    scope: RuleScope,
}

impl FieldRule {
    /// Creates a case-sensitive rule rewriting file contents.
    ///
    /// # Errors
    /// * `Error::ConfigError` if `pattern` is empty
    pub fn new<P: Into<String>, R: Into<String>>(pattern: P, replacement: R) -> Result<Self> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return Err(Error::ConfigError(
                "field rule pattern must not be empty".to_string(),
            ));
        }
        Ok(Self {
            pattern,
            replacement: replacement.into(),
            case_sensitive: true,
            scope: RuleScope::default(),
        })
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn scope(mut self, scope: RuleScope) -> Self {
        self.scope = scope;
        self
    }

    /// Replaces every non-overlapping occurrence of the pattern, scanning left to right.
    ///
    /// Returns `None` when the pattern does not occur, so callers can keep the
    /// original buffer without copying it.
    pub fn replace(&self, input: &[u8]) -> Option<Vec<u8>> {
        let (mut start, mut len) = self.find(input, 0)?;
        let mut output = Vec::with_capacity(input.len());
        let mut cursor = 0;
        loop {
            output.extend_from_slice(&input[cursor..start]);
            output.extend_from_slice(self.replacement.as_bytes());
            cursor = start + len;
            match self.find(input, cursor) {
                Some((next, next_len)) => {
                    start = next;
                    len = next_len;
                }
                None => break,
            }
        }
        output.extend_from_slice(&input[cursor..]);
        Some(output)
    }

    /// Position and byte length of the next match at or after `from`.
    fn find(&self, haystack: &[u8], from: usize) -> Option<(usize, usize)> {
        if !self.case_sensitive && !self.pattern.is_ascii() {
            return (from..haystack.len())
                .find_map(|i| self.match_folded(&haystack[i..]).map(|len| (i, len)));
        }
        let needle = self.pattern.as_bytes();
        if haystack.len() < needle.len() {
            return None;
        }
        (from..=haystack.len() - needle.len())
            .find(|&i| {
                let window = &haystack[i..i + needle.len()];
                if self.case_sensitive {
                    window == needle
                } else {
                    window.eq_ignore_ascii_case(needle)
                }
            })
            .map(|i| (i, needle.len()))
    }

    /// Lower-cases both sides char by char. Invalid UTF-8 in the haystack never matches.
    /// The matched length can differ from the pattern's byte length.
    fn match_folded(&self, haystack: &[u8]) -> Option<usize> {
        let mut len = 0;
        for expected in self.pattern.chars() {
            let (found, width) = decode_char(&haystack[len..])?;
            if !found.to_lowercase().eq(expected.to_lowercase()) {
                return None;
            }
            len += width;
        }
        Some(len)
    }
}

fn decode_char(bytes: &[u8]) -> Option<(char, usize)> {
    let width = match *bytes.first()? {
        lead if lead < 0x80 => 1,
        lead if lead >= 0xF0 => 4,
        lead if lead >= 0xE0 => 3,
        lead if lead >= 0xC0 => 2,
        _ => return None,
    };
    let ch = std::str::from_utf8(bytes.get(..width)?).ok()?.chars().next()?;
    Some((ch, width))
}

/// Ordered set of [`FieldRule`]s. Each rule sees the output of the previous one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRules {
    rules: Vec<FieldRule>,
}

impl FieldRules {
    pub fn new(rules: Vec<FieldRule>) -> Self {
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Applies every content-scoped rule in order.
    pub fn rewrite_contents<'a>(&self, input: &'a [u8]) -> Cow<'a, [u8]> {
        self.apply(input, |scope| scope.covers_contents())
    }

    /// Applies every path-scoped rule in order to a forward-slash relative path.
    pub fn rewrite_path<'a>(&self, path: &'a str) -> Result<Cow<'a, str>> {
        match self.apply(path.as_bytes(), |scope| scope.covers_paths()) {
            Cow::Borrowed(_) => Ok(Cow::Borrowed(path)),
            Cow::Owned(bytes) => String::from_utf8(bytes).map(Cow::Owned).map_err(|_| {
                Error::TemplateError(format!("rewriting '{}' produced invalid UTF-8", path))
            }),
        }
    }

    fn apply<'a>(&self, input: &'a [u8], in_scope: impl Fn(RuleScope) -> bool) -> Cow<'a, [u8]> {
        let mut output = Cow::Borrowed(input);
        for rule in self.rules.iter().filter(|rule| in_scope(rule.scope)) {
            if let Some(replaced) = rule.replace(&output) {
                output = Cow::Owned(replaced);
            }
        }
        output
    }
}

impl FromIterator<FieldRule> for FieldRules {
    fn from_iter<I: IntoIterator<Item = FieldRule>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(pattern: &str, replacement: &str) -> FieldRule {
        FieldRule::new(pattern, replacement).unwrap()
    }

    #[test]
    fn test_empty_pattern_rejected() {
        assert!(matches!(FieldRule::new("", "x"), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_case_insensitive_keeps_surroundings() {
        let rule = rule("acme/widget", "example.com/gadget").case_sensitive(false);
        let output = rule.replace(br#"import "ACME/Widget/x""#).unwrap();
        assert_eq!(output, br#"import "example.com/gadget/x""#.to_vec());
    }

    #[test]
    fn test_case_sensitive_ignores_other_case() {
        let rule = rule("acme", "corp");
        assert_eq!(rule.replace(b"ACME Acme"), None);
        assert_eq!(rule.replace(b"acme ACME acme").unwrap(), b"corp ACME corp".to_vec());
    }

    #[test]
    fn test_matches_do_not_overlap() {
        assert_eq!(rule("aa", "b").replace(b"aaa").unwrap(), b"ba".to_vec());
        assert_eq!(rule("aa", "b").replace(b"aaaa").unwrap(), b"bb".to_vec());
    }

    #[test]
    fn test_match_at_boundaries() {
        let rule = rule("ab", "X").case_sensitive(false);
        assert_eq!(rule.replace(b"AB").unwrap(), b"X".to_vec());
        assert_eq!(rule.replace(b"abzzAb").unwrap(), b"XzzX".to_vec());
        assert_eq!(rule.replace(b"a"), None);
        assert_eq!(rule.replace(b""), None);
    }

    #[test]
    fn test_replacement_is_not_rescanned() {
        let rule = rule("a", "aa");
        assert_eq!(rule.replace(b"aba").unwrap(), b"aabaa".to_vec());
    }

    #[test]
    fn test_rules_apply_sequentially() {
        let rules: FieldRules = vec![rule("foo", "bar"), rule("bar", "baz")]
            .into_iter()
            .collect();
        assert_eq!(rules.rewrite_contents(b"foo bar").as_ref(), b"baz baz");
    }

    #[test]
    fn test_unmatched_contents_are_borrowed() {
        let rules = FieldRules::new(vec![rule("needle", "pin")]);
        let input = [0u8, 159, 146, 150, 255];
        assert!(matches!(rules.rewrite_contents(&input), Cow::Borrowed(_)));
    }

    #[test]
    fn test_scopes_are_respected() {
        let rules = FieldRules::new(vec![
            rule("name", "contents").scope(RuleScope::Contents),
            rule("name", "paths").scope(RuleScope::Paths),
        ]);
        assert_eq!(rules.rewrite_contents(b"name").as_ref(), b"contents");
        assert_eq!(rules.rewrite_path("dir/name.txt").unwrap(), "dir/paths.txt");

        let both = FieldRules::new(vec![rule("x", "y").scope(RuleScope::All)]);
        assert_eq!(both.rewrite_contents(b"x").as_ref(), b"y");
        assert_eq!(both.rewrite_path("x/x").unwrap(), "y/y");
    }

    #[test]
    fn test_non_ascii_letters_fold_case() {
        let rule = rule("über", "uber").case_sensitive(false);
        assert_eq!(rule.replace("ÜBER".as_bytes()).unwrap(), b"uber".to_vec());
        assert_eq!(
            rule.replace("Ein ÜBER über Über".as_bytes()).unwrap(),
            b"Ein uber uber uber".to_vec()
        );
        assert_eq!(rule.replace("uber".as_bytes()), None);
    }

    #[test]
    fn test_non_ascii_rule_skips_invalid_utf8() {
        let rule = rule("ß", "ss").case_sensitive(false);
        let mut input = vec![0xff, 0xc3];
        input.extend_from_slice("xß".as_bytes());
        input.push(0x80);
        let mut expected = vec![0xff, 0xc3, b'x', b's', b's'];
        expected.push(0x80);
        assert_eq!(rule.replace(&input).unwrap(), expected);
    }

    #[test]
    fn test_non_ascii_case_sensitive_is_exact() {
        let rule = rule("über", "uber");
        assert_eq!(rule.replace("ÜBER".as_bytes()), None);
        assert_eq!(rule.replace("ÜBER über".as_bytes()).unwrap(), "ÜBER uber".as_bytes().to_vec());
    }
}
