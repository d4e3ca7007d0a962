//! Masked placeholder detection.
//!
//! The settings API never returns stored secrets verbatim. A secret that
//! exists server-side comes back as a placeholder containing an elision
//! marker (`"SG.a...wxyz"`), which tells the client the value is present
//! without disclosing it. Nothing here can tell what the secret is, only
//! whether one is there.

use serde::{Deserialize, Serialize};

/// Substring the server inserts into every masked secret.
///
/// Matching is a plain substring check, so a legitimate value containing
/// `...` is classified as masked as well.
pub const ELISION_MARKER: &str = "...";

/// Number of characters kept on each side of the marker by [`redact`].
const REDACT_KEEP: usize = 4;

/// Returns true iff `value` is a string containing the elision marker.
///
/// `None` is never masked: it means "no secret", which is different from
/// "secret present but hidden".
pub fn is_masked(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.contains(ELISION_MARKER))
}

/// Three-way view of a secret field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretState {
    /// No value stored anywhere.
    Absent,
    /// Stored server-side, not disclosed.
    Masked,
    /// A value the client knows in full.
    Real,
}

impl SecretState {
    pub fn classify(value: Option<&str>) -> Self {
        match value {
            None => SecretState::Absent,
            Some(v) if v.contains(ELISION_MARKER) => SecretState::Masked,
            Some(_) => SecretState::Real,
        }
    }

    pub fn is_present(self) -> bool {
        !matches!(self, SecretState::Absent)
    }
}

/// Produce the placeholder the server would send for `secret`.
///
/// Keeps the first and last four characters around the marker. Values too
/// short to hide anything collapse to the bare marker.
pub fn redact(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= REDACT_KEEP * 2 {
        return ELISION_MARKER.to_string();
    }
    let head: String = chars[..REDACT_KEEP].iter().collect();
    let tail: String = chars[chars.len() - REDACT_KEEP..].iter().collect();
    format!("{}{}{}", head, ELISION_MARKER, tail)
}
