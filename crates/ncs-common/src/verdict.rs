//! Suppression verdicts.

use serde::{Deserialize, Serialize};

/// Outcome of evaluating one log event.
///
/// There is no explicit "allow": an event that is not denied is passed back
/// to the host as [`Verdict::Neutral`] so other filters can still act on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Drop the event from visible output.
    Deny,
    /// Let the event through unchanged.
    #[default]
    Neutral,
}

impl Verdict {
    /// Build a verdict from a suppression decision.
    pub fn from_suppressed(suppressed: bool) -> Self {
        if suppressed {
            Verdict::Deny
        } else {
            Verdict::Neutral
        }
    }

    pub fn is_deny(self) -> bool {
        self == Verdict::Deny
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Deny => write!(f, "DENY"),
            Verdict::Neutral => write!(f, "NEUTRAL"),
        }
    }
}
