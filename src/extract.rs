//! Recovers a code snippet from model output that mixes prose and code.
//!
//! The strategies are heuristics tried in order; the first one that
//! applies wins and the last one always applies.

use lazy_static::lazy_static;
use regex::Regex;

use crate::language::Language;

pub type Strategy = fn(&str, Language) -> Option<String>;

pub const STRATEGIES: [(&str, Strategy); 3] = [
    ("fenced-block", fenced_block),
    ("marker-line", marker_line),
    ("verbatim", verbatim),
];

pub fn extract_code(text: &str, language: Language) -> String {
    STRATEGIES
        .iter()
        .find_map(|(name, strategy)| {
            strategy(text, language).map(|code| {
                tracing::debug!(strategy = name, "extracted code from response");
                code
            })
        })
        .unwrap_or_default()
}

/// Content of the first triple-backtick block, with its info tag removed.
pub fn fenced_block(text: &str, _language: Language) -> Option<String> {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"(?s)```(?:[\w+#.-]*[ \t]*\r?\n)?(.*?)```")
            .expect("The regex expression should be valid");
    }
    RE.captures(text)
        .and_then(|capture| capture.get(1))
        .map(|block| block.as_str().trim().to_string())
}

/// Everything from the first line that starts with one of the language's markers.
pub fn marker_line(text: &str, language: Language) -> Option<String> {
    let markers = language.markers();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let content = line.trim_start();
        if markers.iter().any(|marker| content.starts_with(marker)) {
            return Some(text[offset..].trim().to_string());
        }
        offset += line.len();
    }
    None
}

pub fn verbatim(text: &str, _language: Language) -> Option<String> {
    Some(text.trim().to_string())
}
