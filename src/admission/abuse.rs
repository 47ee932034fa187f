use regex::RegexSet;

// Requests for bulk generated content are the cheapest way to run up
// the completion bill.
const SUSPICIOUS_PATTERNS: &[&str] = &[
    r"(?i)repeat.*\d+.*times",
    r"(?i)generate.*\d+.*words",
    r"(?i)write.*\d+.*sentences",
    r"(?i)create.*\d+.*paragraphs",
    r"(?i)spam.*\d+",
    r"(?i)flood.*\d+",
];

/// Case-insensitive pattern filter for abusive prompts.
#[derive(Debug, Clone)]
pub struct AbuseFilter {
    patterns: RegexSet,
}

impl AbuseFilter {
    pub fn new(patterns: &[&str]) -> Result<Self, regex::Error> {
        Ok(Self {
            patterns: RegexSet::new(patterns)?,
        })
    }

    pub fn is_suspicious(&self, message: &str) -> bool {
        self.patterns.is_match(message)
    }

    /// The patterns that matched, for logging.
    pub fn matches(&self, message: &str) -> Vec<&str> {
        self.patterns
            .matches(message)
            .into_iter()
            .map(|i| self.patterns.patterns()[i].as_str())
            .collect()
    }
}

impl Default for AbuseFilter {
    fn default() -> Self {
        Self::new(SUSPICIOUS_PATTERNS).expect("Built-in abuse patterns are valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_flags_bulk_generation_requests() {
        let filter = AbuseFilter::default();

        assert!(filter.is_suspicious("Repeat the word hello 500 times"));
        assert!(filter.is_suspicious("please GENERATE 10000 words about anything"));
        assert!(filter.is_suspicious("write me 40 sentences"));
        assert!(filter.is_suspicious("Create 12 paragraphs on shoes"));
        assert!(filter.is_suspicious("spam 99"));
        assert!(filter.is_suspicious("flood the chat 3x"));
    }

    #[test]
    fn it_allows_ordinary_questions() {
        let filter = AbuseFilter::default();

        assert!(!filter.is_suspicious("what have you worked on"));
        assert!(!filter.is_suspicious("Can you repeat that?"));
        assert!(!filter.is_suspicious("How many years of React experience?"));
        assert!(!filter.is_suspicious("generate some ideas"));
    }

    #[test]
    fn it_reports_matching_patterns() {
        let filter = AbuseFilter::default();
        let matched = filter.matches("repeat spam 5 times");

        assert_eq!(matched, vec![r"(?i)repeat.*\d+.*times", r"(?i)spam.*\d+"]);
    }
}
