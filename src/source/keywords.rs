//! Whole-word keyword matching for incident text.
//!
//! Each keyword list compiles into one Aho-Corasick automaton, so a title is
//! scanned once per list no matter how many keywords a provider configures.

use aho_corasick::{AhoCorasick, BuildError};

use crate::registry::ParseHints;
use crate::status::Indicator;

const DEFAULT_RED: &[&str] = &["outage", "down", "unavailable", "major", "offline"];

const DEFAULT_YELLOW: &[&str] = &[
    "degraded",
    "incident",
    "investigating",
    "disruption",
    "delay",
    "delays",
    "issue",
    "issues",
    "maintenance",
    "partial",
    "elevated",
];

/// Red and yellow keyword automatons.  `None` means the list is empty.
#[derive(Debug, Clone)]
pub struct Keywords {
    red: Option<AhoCorasick>,
    yellow: Option<AhoCorasick>,
}

impl Keywords {
    pub fn from_hints(hints: &ParseHints) -> Result<Self, BuildError> {
        let red = match &hints.red_keywords {
            Some(words) => automaton(words)?,
            None => automaton(DEFAULT_RED)?,
        };
        let yellow = match &hints.yellow_keywords {
            Some(words) => automaton(words)?,
            None => automaton(DEFAULT_YELLOW)?,
        };
        Ok(Self { red, yellow })
    }

    pub fn is_red(&self, text: &str) -> bool {
        matches_whole_word(self.red.as_ref(), &normalise(text))
    }

    /// Red beats yellow; `None` when nothing matches.
    pub fn classify(&self, text: &str) -> Option<Indicator> {
        let text = normalise(text);
        if matches_whole_word(self.red.as_ref(), &text) {
            Some(Indicator::Red)
        } else if matches_whole_word(self.yellow.as_ref(), &text) {
            Some(Indicator::Yellow)
        } else {
            None
        }
    }
}

/// Collapse every non-alphanumeric run to one space, so `service-disruption`
/// and `service  disruption` both read as `service disruption`.
fn normalise(text: &str) -> String {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn automaton<S: AsRef<str>>(words: &[S]) -> Result<Option<AhoCorasick>, BuildError> {
    let patterns: Vec<String> = words
        .iter()
        .map(|w| normalise(w.as_ref()))
        .filter(|w| !w.is_empty())
        .collect();
    if patterns.is_empty() {
        return Ok(None);
    }
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(&patterns)
        .map(Some)
}

fn matches_whole_word(automaton: Option<&AhoCorasick>, text: &str) -> bool {
    let Some(ac) = automaton else {
        return false;
    };
    // Overlapping search: `issue` inside `issues` must not hide `issues`.
    ac.find_overlapping_iter(text)
        .any(|m| is_word_boundary(text, m.start(), m.end()))
}

fn is_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text.get(..start).and_then(|s| s.chars().next_back());
    let after = text.get(end..).and_then(|s| s.chars().next());
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

/// First run of ASCII digits in `text`, if any.
pub(crate) fn first_number(text: &str) -> Option<u32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
