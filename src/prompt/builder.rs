use crate::persona::{PersonaOverlay, PersonaPhase};

/// Appended in voice mode; the reply is read aloud.
pub const VOICE_LENGTH_CONSTRAINT: &str = "VOICE MODE: Keep it to two short sentences, under 40 words. \
No lists, no emojis, no stage directions - this gets read out loud.";

/// Appended for every phase after the opening one.
pub const NEGATIVE_CONSTRAINT: &str = "Do NOT be supportive or nice. No compliments that aren't backhanded, \
no encouragement, no pep talks, no softening the blow.";

/// Terse voice replies vs. full text replies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperatingMode {
    #[default]
    Text,
    Voice,
}

impl OperatingMode {
    pub fn from_voice_flag(voice_mode: bool) -> Self {
        if voice_mode {
            OperatingMode::Voice
        } else {
            OperatingMode::Text
        }
    }

    pub fn is_voice(&self) -> bool {
        matches!(self, OperatingMode::Voice)
    }
}

/// Builds the system instruction for one request. Pure string assembly.
pub fn compose_system_prompt(
    persona: &PersonaOverlay,
    turn: u32,
    phase: PersonaPhase,
    mode: OperatingMode,
) -> String {
    let mut prompt = String::new();

    // 1. Character sheet
    prompt.push_str(persona.prompt().trim());
    prompt.push_str("\n\n");

    // 2. Where we are in the set
    prompt.push_str(&format!(
        "CURRENT TURN: {} | PHASE: {} ({}% intensity)\n",
        turn,
        phase.label(),
        phase.tone_intensity_percent()
    ));

    // 3. Phase directive
    prompt.push_str(phase.directive());
    prompt.push('\n');

    // 4. Voice brevity
    if mode.is_voice() {
        prompt.push('\n');
        prompt.push_str(VOICE_LENGTH_CONSTRAINT);
        prompt.push('\n');
    }

    // 5. Once past the warm-up, no niceness
    if phase != PersonaPhase::Friendly {
        prompt.push('\n');
        prompt.push_str(NEGATIVE_CONSTRAINT);
        prompt.push('\n');
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_friendly_prompt_has_no_negative_constraint() {
        let prompt = compose_system_prompt(
            &PersonaOverlay::Roaster,
            1,
            PersonaPhase::Friendly,
            OperatingMode::Text,
        );

        assert!(prompt.contains("Roastmate"));
        assert!(prompt.contains("CURRENT TURN: 1 | PHASE: FRIENDLY (10% intensity)"));
        assert!(prompt.contains(PersonaPhase::Friendly.directive()));
        assert!(!prompt.contains(NEGATIVE_CONSTRAINT));
        assert!(!prompt.contains(VOICE_LENGTH_CONSTRAINT));
    }

    #[test]
    fn test_non_friendly_phases_forbid_niceness() {
        for phase in [PersonaPhase::Sarcastic, PersonaPhase::Harsh, PersonaPhase::Savage] {
            let prompt =
                compose_system_prompt(&PersonaOverlay::Roaster, phase.min_turn(), phase, OperatingMode::Text);
            assert!(prompt.contains(NEGATIVE_CONSTRAINT), "{phase} missing constraint");
            assert!(prompt.contains(phase.directive()));
        }
    }

    #[test]
    fn test_voice_mode_adds_length_constraint() {
        let prompt =
            compose_system_prompt(&PersonaOverlay::Roaster, 5, PersonaPhase::Harsh, OperatingMode::Voice);
        assert!(prompt.contains(VOICE_LENGTH_CONSTRAINT));
        assert!(prompt.contains("CURRENT TURN: 5 | PHASE: HARSH (80% intensity)"));
    }

    #[test]
    fn test_composition_is_deterministic() {
        let a = compose_system_prompt(&PersonaOverlay::Roaster, 9, PersonaPhase::Savage, OperatingMode::Voice);
        let b = compose_system_prompt(&PersonaOverlay::Roaster, 9, PersonaPhase::Savage, OperatingMode::Voice);
        assert_eq!(a, b);
    }
}
