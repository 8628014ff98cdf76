//! Wildcard keys (`prefix**` / `**suffix`) used by branch arms and
//! necessary-tag conditions.

/// A literal or single-sided wildcard match against a token or identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// Matches exactly this string.
    Exact(String),
    /// `prefix**`: matches strings starting with the prefix.
    Prefix(String),
    /// `**suffix`: matches strings ending with the suffix.
    Suffix(String),
}

impl Pattern {
    /// Parse a pattern key. `**` may appear once, at either end.
    pub fn parse(key: &str) -> Result<Self, String> {
        let count = key.matches("**").count();
        if count == 0 {
            return Ok(Pattern::Exact(key.to_string()));
        }
        if count > 1 || key == "**" {
            return Err(format!("'{key}': `**` must appear once, at one end"));
        }
        if let Some(prefix) = key.strip_suffix("**") {
            Ok(Pattern::Prefix(prefix.to_string()))
        } else if let Some(suffix) = key.strip_prefix("**") {
            Ok(Pattern::Suffix(suffix.to_string()))
        } else {
            Err(format!("'{key}': `**` must be at the start or end"))
        }
    }

    /// Whether this is a wildcard (non-exact) pattern.
    pub fn is_wildcard(&self) -> bool {
        !matches!(self, Pattern::Exact(_))
    }

    /// Test `value` against the pattern.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Pattern::Exact(s) => s == value,
            Pattern::Prefix(p) => value.starts_with(p.as_str()),
            Pattern::Suffix(s) => value.ends_with(s.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Pattern;

    #[test]
    fn parses_each_form() {
        assert_eq!(Pattern::parse("run").unwrap(), Pattern::Exact("run".into()));
        assert_eq!(Pattern::parse("@**").unwrap(), Pattern::Prefix("@".into()));
        assert_eq!(Pattern::parse("**_sign").unwrap(), Pattern::Suffix("_sign".into()));
    }

    #[test]
    fn rejects_misplaced_wildcards() {
        assert!(Pattern::parse("a**b").is_err());
        assert!(Pattern::parse("**a**").is_err());
        assert!(Pattern::parse("**").is_err());
    }

    #[test]
    fn matches_by_side() {
        assert!(Pattern::parse("minecraft:**").unwrap().matches("minecraft:stone"));
        assert!(Pattern::parse("**_sign").unwrap().matches("minecraft:oak_sign"));
        assert!(!Pattern::parse("**_sign").unwrap().matches("minecraft:signal"));
    }
}
