// src/safety/gate.rs

//! Keyword screen for self-harm language.
//!
//! Substring matching, case-insensitive. It misses paraphrases and will
//! occasionally fire on a joke; a false positive only costs a paused session.

/// Phrases that trip the gate. Matched against lowercased input.
pub const CRISIS_PHRASES: &[&str] = &[
    "kill myself",
    "killing myself",
    "end my life",
    "ending my life",
    "take my own life",
    "want to die",
    "wanna die",
    "don't want to live",
    "dont want to live",
    "don't want to be alive",
    "no reason to live",
    "better off dead",
    "end it all",
    "suicide",
    "suicidal",
    "self harm",
    "self-harm",
    "hurt myself",
    "cut myself",
];

/// Returned instead of a roast when the gate fires.
pub const CRISIS_REFERRAL_MESSAGE: &str = "Okay, stepping out of character for a second. \
It sounds like you might be going through something really heavy, and that matters more than any joke. \
You don't have to handle it alone: in the US you can call or text 988 (Suicide & Crisis Lifeline), \
or text HOME to 741741 to reach the Crisis Text Line. Outside the US, findahelpline.com lists free, \
confidential services near you. If you're in immediate danger, please call your local emergency number. \
The roasting is paused for the next hour.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyVerdict {
    Clear,
    Crisis,
}

impl SafetyVerdict {
    pub fn is_crisis(&self) -> bool {
        matches!(self, SafetyVerdict::Crisis)
    }
}

#[derive(Debug, Clone)]
pub struct SafetyGate {
    phrases: Vec<String>,
}

impl Default for SafetyGate {
    fn default() -> Self {
        Self::new(CRISIS_PHRASES.iter().copied())
    }
}

impl SafetyGate {
    pub fn new<'a>(phrases: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            phrases: phrases
                .into_iter()
                .map(normalize)
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn check(&self, text: &str) -> SafetyVerdict {
        if text.trim().is_empty() {
            return SafetyVerdict::Clear;
        }

        let haystack = normalize(text);
        if self.phrases.iter().any(|phrase| haystack.contains(phrase.as_str())) {
            SafetyVerdict::Crisis
        } else {
            SafetyVerdict::Clear
        }
    }
}

/// Lowercase and fold typographic apostrophes so "don’t" matches "don't".
fn normalize(text: &str) -> String {
    text.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'")
}
