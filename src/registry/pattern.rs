//! Subscriber filter patterns

use regex::bytes::Regex;

/// A compiled filter expression
///
/// Records are matched as raw bytes, so records that are not valid UTF-8
/// can still be filtered.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern from its source text
    pub fn compile(expr: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(expr)?,
        })
    }

    /// Check whether a record matches
    pub fn is_match(&self, record: &[u8]) -> bool {
        self.regex.is_match(record)
    }

    /// The source text the pattern was compiled from
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
