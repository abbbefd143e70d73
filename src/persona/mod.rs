// src/persona/mod.rs
// Persona definition plus the turn -> phase escalation that drives its tone.

pub mod default;
pub mod phase;
pub mod turn;

pub use default::DEFAULT_PERSONA_PROMPT;
pub use phase::{resolve_phase, PersonaPhase};
pub use turn::{recent_window, turn_number, ConversationTurn, Role, HISTORY_WINDOW};

/// Persona overlays define the base character the phases escalate.
/// Only the roaster ships today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersonaOverlay {
    #[default]
    Roaster,
}

impl PersonaOverlay {
    /// Returns the static character sheet for this overlay.
    pub fn prompt(&self) -> &'static str {
        match self {
            PersonaOverlay::Roaster => DEFAULT_PERSONA_PROMPT,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PersonaOverlay::Roaster => "roaster",
        }
    }
}

impl std::fmt::Display for PersonaOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PersonaOverlay {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "roaster" | "default" => Ok(PersonaOverlay::Roaster),
            _ => Err(()),
        }
    }
}
