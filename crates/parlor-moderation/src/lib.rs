//! Chat message screening.
//!
//! Screening is deliberately blunt: the text is normalized (lowercased,
//! leetspeak substitutions mapped back to letters, everything else
//! dropped) and then checked for blocklisted terms as plain substrings.
//! Substring rather than word-boundary matching is intentional — it
//! resists spacing and punctuation evasion ("f.u c k"). A hit rejects
//! the whole message; there is no redaction.

/// Result of screening one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screening {
    /// No blocklisted term found; the text passes through unchanged.
    Clean,
    /// A blocklisted term was found; the message must be dropped.
    Blocked,
}

impl Screening {
    /// `true` when the message must be dropped.
    pub fn is_blocked(self) -> bool {
        matches!(self, Self::Blocked)
    }
}

/// The terms screened for, and the normalization that feeds them.
#[derive(Debug, Clone)]
pub struct Blocklist {
    terms: Vec<String>,
}

impl Blocklist {
    /// A blocklist over custom terms. Terms are normalized on the way
    /// in so they compare against normalized message text.
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            terms: terms
                .into_iter()
                .map(|t| normalize(t.as_ref()))
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// Screens one message. Pure — no side effects, no mutation.
    pub fn screen(&self, text: &str) -> Screening {
        let normalized = normalize(text);
        if self.terms.iter().any(|term| normalized.contains(term)) {
            Screening::Blocked
        } else {
            Screening::Clean
        }
    }
}

impl Default for Blocklist {
    fn default() -> Self {
        Self::new(DEFAULT_TERMS)
    }
}

const DEFAULT_TERMS: [&str; 7] = [
    "fuck", "shit", "bitch", "asshole", "bastard", "dick", "cunt",
];

/// Lowercases, maps the leetspeak table to letters, keeps ASCII
/// letters, drops everything else (spaces and punctuation included).
fn normalize(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '0' => Some('o'),
            '1' | '!' => Some('i'),
            '3' => Some('e'),
            '4' | '@' => Some('a'),
            '5' | '$' => Some('s'),
            '6' | '9' => Some('g'),
            '7' => Some('t'),
            '8' => Some('b'),
            c if c.is_ascii_alphabetic() => Some(c.to_ascii_lowercase()),
            _ => None,
        })
        .collect()
}
