use serde::Serialize;

/// Patterns used when the configuration does not name any
pub const DEFAULT_PATTERNS: [&str; 4] = ["error", "fail", "critical", "unauthorized"];

/// A log line and the pattern that selected it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogMatch {
    pub line: String,
    pub pattern: String,
}

/// Matched lines from one scan, in original order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogFinding {
    pub matches: Vec<LogMatch>,
}

impl LogFinding {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn total(&self) -> usize {
        self.matches.len()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.matches.iter().map(|m| m.line.as_str())
    }
}

/// Case-insensitive substring matcher over a fixed pattern set
#[derive(Debug, Clone)]
pub struct PatternScanner {
    // (original, lowercased)
    patterns: Vec<(String, String)>,
}

impl PatternScanner {
    /// Build a scanner; empty patterns are dropped since they would match every line
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns = patterns
            .into_iter()
            .map(Into::into)
            .filter(|p: &String| !p.is_empty())
            .map(|p| {
                let lower = p.to_lowercase();
                (p, lower)
            })
            .collect();

        Self { patterns }
    }

    /// Select lines containing any pattern; the first matching pattern is recorded
    pub fn scan<S: AsRef<str>>(&self, lines: &[S]) -> LogFinding {
        let matches = lines
            .iter()
            .filter_map(|line| {
                let line = line.as_ref();
                let lower = line.to_lowercase();
                self.patterns
                    .iter()
                    .find(|(_, needle)| lower.contains(needle.as_str()))
                    .map(|(pattern, _)| LogMatch {
                        line: line.to_string(),
                        pattern: pattern.clone(),
                    })
            })
            .collect();

        LogFinding { matches }
    }
}

impl Default for PatternScanner {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERNS)
    }
}
