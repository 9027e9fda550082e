use regex::{Regex, RegexBuilder};

use crate::error::Result;

/// Keyword heuristic deciding whether a prompt is about current events.
///
/// Plain substring match, so "worldwide" or "sepakbola" also trigger a lookup.
pub struct NewsTrigger {
    pattern: Regex,
}

impl NewsTrigger {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Result<Self> {
        let alternation = keywords
            .iter()
            .map(|k| k.as_ref().trim())
            .filter(|k| !k.is_empty())
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");

        let pattern = RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .build()?;

        Ok(Self { pattern })
    }

    pub fn matches(&self, prompt: &str) -> bool {
        self.pattern.is_match(prompt)
    }
}
