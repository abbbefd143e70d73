//! Persona phases - how hard the roaster goes at a given turn.
//!
//! Thresholds live in [`PHASE_TABLE`] and nowhere else.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonaPhase {
    /// Opening turn: warm, playful, barely a roast
    Friendly,
    /// Turns 2-3: dry, eye-rolling
    Sarcastic,
    /// Turns 4-5: blunt, personal
    Harsh,
    /// Turn 6 onward: no mercy
    Savage,
}

/// Row of the escalation table
#[derive(Debug)]
pub struct PhaseSpec {
    pub phase: PersonaPhase,
    pub min_turn: u32,
    pub tone_intensity_percent: u8,
    pub directive: &'static str,
}

/// Ordered by `min_turn`; each row's range ends where the next begins.
pub const PHASE_TABLE: [PhaseSpec; 4] = [
    PhaseSpec {
        phase: PersonaPhase::Friendly,
        min_turn: 1,
        tone_intensity_percent: 10,
        directive: "Open friendly. Tease lightly, like a buddy warming up the crowd. \
                    One gentle jab at most, and make them want to keep talking.",
    },
    PhaseSpec {
        phase: PersonaPhase::Sarcastic,
        min_turn: 2,
        tone_intensity_percent: 50,
        directive: "Switch to heavy sarcasm. Deadpan, eye-rolling, backhanded compliments. \
                    Point out what is obviously questionable about what they just said or showed.",
    },
    PhaseSpec {
        phase: PersonaPhase::Harsh,
        min_turn: 4,
        tone_intensity_percent: 80,
        directive: "Get harsh. Be blunt and specific about their choices, taste and effort. \
                    Stack two or three punchlines and do not cushion any of them.",
    },
    PhaseSpec {
        phase: PersonaPhase::Savage,
        min_turn: 6,
        tone_intensity_percent: 90,
        directive: "Go full savage. This is the headliner set: merciless, rapid-fire, callback \
                    to earlier things they said. Still about choices, never about who they are.",
    },
];

impl PersonaPhase {
    pub const ALL: [PersonaPhase; 4] = [
        PersonaPhase::Friendly,
        PersonaPhase::Sarcastic,
        PersonaPhase::Harsh,
        PersonaPhase::Savage,
    ];

    fn spec(self) -> &'static PhaseSpec {
        // Table rows are declared in enum order
        &PHASE_TABLE[self as usize]
    }

    /// Inclusive lower bound on the turn number
    pub fn min_turn(self) -> u32 {
        self.spec().min_turn
    }

    pub fn tone_intensity_percent(self) -> u8 {
        self.spec().tone_intensity_percent
    }

    pub fn directive(self) -> &'static str {
        self.spec().directive
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PersonaPhase::Friendly => "friendly",
            PersonaPhase::Sarcastic => "sarcastic",
            PersonaPhase::Harsh => "harsh",
            PersonaPhase::Savage => "savage",
        }
    }

    /// Name used inside prompts
    pub fn label(&self) -> &'static str {
        match self {
            PersonaPhase::Friendly => "FRIENDLY",
            PersonaPhase::Sarcastic => "SARCASTIC",
            PersonaPhase::Harsh => "HARSH",
            PersonaPhase::Savage => "SAVAGE",
        }
    }
}

impl std::fmt::Display for PersonaPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Map a turn number to the single phase whose range contains it.
/// Turn 0 is not a real turn; it is treated as the opening one.
pub fn resolve_phase(turn: u32) -> PersonaPhase {
    PHASE_TABLE
        .iter()
        .rev()
        .find(|row| turn >= row.min_turn)
        .map(|row| row.phase)
        .unwrap_or(PersonaPhase::Friendly)
}
