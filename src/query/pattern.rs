// Sun Feb 01 2026 - Alex

use super::QueryError;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

static OFFSET_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:0[xX])?([0-9a-fA-F]+)\s*-\s*(?:0[xX])?([0-9a-fA-F]+)\s*$")
        .expect("offset range regex is valid")
});

/// Case-insensitive name matcher. Wildcard patterns (`*`, `?`) must match
/// the whole name; regex patterns match anywhere.
#[derive(Debug, Clone)]
pub struct NamePattern {
    regex: Regex,
}

impl NamePattern {
    pub fn new(pattern: &str, use_regex: bool) -> Result<Self, QueryError> {
        let source = if use_regex {
            pattern.to_string()
        } else {
            wildcard_to_regex(pattern)
        };
        let regex = RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .map_err(|e| QueryError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { regex })
    }

    pub fn wildcard(pattern: &str) -> Result<Self, QueryError> {
        Self::new(pattern, false)
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

fn wildcard_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push('^');
    for c in pattern.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            c => out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    out.push('$');
    out
}

/// Hex offset, with or without `0x`.
pub fn parse_offset(text: &str) -> Result<u32, QueryError> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    u32::from_str_radix(digits, 16).map_err(|_| QueryError::InvalidOffset(text.to_string()))
}

/// `0x10-0x50` style range. Bounds are inclusive.
pub fn parse_offset_range(text: &str) -> Result<(u32, u32), QueryError> {
    let caps = OFFSET_RANGE
        .captures(text)
        .ok_or_else(|| QueryError::InvalidOffset(text.to_string()))?;
    let min = parse_offset(&caps[1])?;
    let max = parse_offset(&caps[2])?;
    if min > max {
        return Err(QueryError::InvalidOffset(text.to_string()));
    }
    Ok((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_is_anchored() {
        let pattern = NamePattern::wildcard("*player*").unwrap();
        assert!(pattern.is_match("Game.LocalPlayer"));
        assert!(pattern.is_match("PLAYER"));
        assert!(!pattern.is_match("Game.Enemy"));

        let pattern = NamePattern::wildcard("Vector?").unwrap();
        assert!(pattern.is_match("vector3"));
        assert!(!pattern.is_match("UnityEngine.Vector3"));
    }

    #[test]
    fn test_wildcard_escapes_metacharacters() {
        let pattern = NamePattern::wildcard("List<T>.Item[*]").unwrap();
        assert!(pattern.is_match("List<T>.Item[0]"));
        assert!(!pattern.is_match("ListXTX.Item[0]"));
    }

    #[test]
    fn test_regex_is_unanchored() {
        let pattern = NamePattern::new("^Game\\..*Manager", true).unwrap();
        assert!(pattern.is_match("game.NetworkManager"));
        assert!(NamePattern::new("(", true).is_err());
    }

    #[test]
    fn test_offsets() {
        assert_eq!(parse_offset("0x1C").unwrap(), 0x1C);
        assert_eq!(parse_offset("20").unwrap(), 0x20);
        assert!(parse_offset("zz").is_err());
        assert_eq!(parse_offset_range("0x10-0x50").unwrap(), (0x10, 0x50));
        assert_eq!(parse_offset_range(" 8 - 10 ").unwrap(), (0x8, 0x10));
        assert!(parse_offset_range("0x50-0x10").is_err());
        assert!(parse_offset_range("0x10").is_err());
    }
}
