//! Phrase-matching availability classifier
//!
//! Turns raw portal HTML into an availability signal by searching for known
//! "no appointment" phrases. The phrase list is an unversioned heuristic
//! against a third-party page, so every classified body is also logged at
//! TRACE for offline re-validation when the portal changes its wording.

use std::sync::LazyLock;

use regex::Regex;

/// Known "no appointment" phrases, authoritative Arabic sentence first
pub const NO_APPOINTMENT_PHRASES: [&str; 9] = [
    "نعتذر منكم ! لا يوجد أي موعد متاح حاليا",
    "aucun rendez-vous disponible",
    "pas de rendez-vous",
    "no appointment available",
    "rendez-vous indisponible",
    "موعد غير متاح",
    "لا توجد مواعيد",
    "indisponible",
    "unavailable",
];

static CSRF_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r#"(?i)name="_token"\s+value="([^"]+)""#).expect("valid regex"),
        Regex::new(r#"(?i)csrf[_-]?token['"]\s*:\s*['"]([^'"]+)['"]"#).expect("valid regex"),
        Regex::new(r#"(?i)meta\s+name=['"]csrf-token['"]\s+content=['"]([^'"]+)['"]"#)
            .expect("valid regex"),
    ]
});

/// What the classifier extracted from one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageAnalysis {
    /// First "no appointment" phrase found, if any. None means the page is
    /// classified as having an available appointment.
    pub matched_phrase: Option<String>,
    pub csrf_token: Option<String>,
    pub has_form: bool,
    pub has_submit_button: bool,
    pub has_input_fields: bool,
}

/// Availability classifier over a fixed phrase list
#[derive(Debug, Clone)]
pub struct Classifier {
    phrases: Vec<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(NO_APPOINTMENT_PHRASES.iter().map(ToString::to_string))
    }
}

impl Classifier {
    pub fn new(phrases: impl IntoIterator<Item = String>) -> Self {
        Self {
            phrases: phrases.into_iter().collect(),
        }
    }

    /// Classify a page body. Case-insensitive phrase containment, first
    /// match wins; absence of every phrase is treated as "available".
    pub fn classify(&self, html: &str) -> PageAnalysis {
        tracing::trace!("Page snapshot ({} chars): {}", html.chars().count(), html);

        let lowered = html.to_lowercase();
        let matched_phrase = self
            .phrases
            .iter()
            .find(|phrase| lowered.contains(&phrase.to_lowercase()))
            .cloned();

        let csrf_token = CSRF_PATTERNS.iter().find_map(|pattern| {
            pattern
                .captures(html)
                .and_then(|captures| captures.get(1))
                .map(|token| token.as_str().to_string())
        });

        PageAnalysis {
            matched_phrase,
            csrf_token,
            has_form: html.contains("<form") || html.contains("input"),
            has_submit_button: html.contains(r#"type="submit""#) || html.contains("submit"),
            has_input_fields: html.contains(r#"name=""#)
                && (html.contains("carte") || html.contains("numero")),
        }
    }
}
