// src/chat/service.rs

use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::{ChatError, ChatOutcome, ChatReply, ChatRequest, CrisisReply};
use crate::clock::{Clock, SystemClock};
use crate::llm::{should_render_speech, LlmError, ResponseSynthesizer, SpeechRenderer};
use crate::persona::{
    recent_window, resolve_phase, turn_number, ConversationTurn, PersonaOverlay, PersonaPhase,
};
use crate::prompt::{compose_system_prompt, OperatingMode};
use crate::quota::{QuotaDecision, QuotaMeter, QuotaStore};
use crate::safety::{LockoutClock, LockoutKey, LockoutState, LockoutStatus, SafetyGate};
use crate::transcript::{Exchange, TranscriptStore};

/// In-character line used when the model fails for a reason the user can't act on
pub const FALLBACK_APOLOGY: &str =
    "I had a roast loaded and it misfired. Even I'm embarrassed. Hit me again.";

const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(40);

pub struct ChatService {
    persona: PersonaOverlay,
    safety: SafetyGate,
    lockouts: Arc<LockoutClock>,
    quota: QuotaMeter,
    synthesizer: Arc<dyn ResponseSynthesizer>,
    speech: Option<Arc<dyn SpeechRenderer>>,
    transcripts: Option<TranscriptStore>,
    clock: Arc<dyn Clock>,
    llm_timeout: Duration,
}

impl ChatService {
    pub fn new(synthesizer: Arc<dyn ResponseSynthesizer>, quota_store: Arc<dyn QuotaStore>) -> Self {
        Self {
            persona: PersonaOverlay::default(),
            safety: SafetyGate::default(),
            lockouts: Arc::new(LockoutClock::new()),
            quota: QuotaMeter::new(quota_store),
            synthesizer,
            speech: None,
            transcripts: None,
            clock: Arc::new(SystemClock),
            llm_timeout: DEFAULT_LLM_TIMEOUT,
        }
    }

    pub fn with_speech(mut self, speech: Arc<dyn SpeechRenderer>) -> Self {
        self.speech = Some(speech);
        self
    }

    pub fn with_transcripts(mut self, transcripts: TranscriptStore) -> Self {
        self.transcripts = Some(transcripts);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_lockouts(mut self, lockouts: Arc<LockoutClock>) -> Self {
        self.lockouts = lockouts;
        self
    }

    pub fn with_safety_gate(mut self, safety: SafetyGate) -> Self {
        self.safety = safety;
        self
    }

    pub fn with_llm_timeout(mut self, llm_timeout: Duration) -> Self {
        self.llm_timeout = llm_timeout;
        self
    }

    pub fn quota(&self) -> &QuotaMeter {
        &self.quota
    }

    pub fn lockouts(&self) -> &LockoutClock {
        &self.lockouts
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub async fn handle(&self, request: ChatRequest) -> Result<ChatOutcome, ChatError> {
        let message = request.message.as_deref().map(str::trim).unwrap_or_default();
        let image = request
            .image
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        if message.is_empty() && image.is_none() {
            return Err(ChatError::EmptyInput);
        }

        let identity = request
            .identity_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let now_ms = self.clock.now_millis();
        let lockout_key = LockoutKey::for_caller(identity, request.session_id.as_deref());

        // 1. Lockout applies to every request shape, image-only and voice included
        let status = self
            .lockouts
            .check(lockout_key.as_ref(), request.crisis_timestamp, now_ms)
            .await;
        if let LockoutStatus::Locked { .. } = status {
            info!("Rejected request during active lockout ({} min left)", status.minutes_remaining());
            return Err(ChatError::Locked {
                minutes_remaining: status.minutes_remaining(),
            });
        }

        // 2. Safety gate; nothing below runs on a match
        if self.safety.check(message).is_crisis() {
            let state = match &lockout_key {
                Some(key) => self.lockouts.arm(key, now_ms).await,
                None => LockoutState::new(now_ms, self.lockouts.duration_ms()),
            };
            warn!(
                "Safety gate fired (identity: {}); lockout until {}",
                identity.is_some(),
                state.deadline_ms()
            );
            return Ok(ChatOutcome::Crisis(CrisisReply::new(state.armed_at_ms)));
        }

        // 3. Quota
        let messages_left = match identity {
            Some(identity_id) => self.consume_quota(identity_id, request.is_privileged).await?,
            None => None,
        };

        // 4. Turn, phase, prompt
        let history = recent_window(&request.conversation_history);
        let turn = turn_number(&request.conversation_history);
        let phase = resolve_phase(turn);
        let mode = OperatingMode::from_voice_flag(request.voice_mode);
        let system_prompt = compose_system_prompt(&self.persona, turn, phase, mode);
        debug!(
            "Turn {} -> {} ({}%), mode {:?}, prompt {} chars, history {}",
            turn,
            phase,
            phase.tone_intensity_percent(),
            mode,
            system_prompt.len(),
            history.len()
        );

        let user_turn = ConversationTurn {
            role: crate::persona::Role::User,
            content: message.to_string(),
            image: image.map(str::to_string),
        };

        // 5. Completion, bounded
        let reply = match timeout(
            self.llm_timeout,
            self.synthesizer.generate(&system_prompt, history, &user_turn),
        )
        .await
        {
            Ok(Ok(text)) => text,
            Ok(Err(LlmError::Upstream(detail))) => {
                warn!("{} failed, answering with fallback: {}", self.synthesizer.name(), detail);
                return Ok(ChatOutcome::Reply(Self::reply(
                    FALLBACK_APOLOGY.to_string(),
                    None,
                    messages_left,
                    turn,
                    phase,
                    true,
                )));
            }
            Ok(Err(err)) => {
                warn!("{} failed: {}", self.synthesizer.name(), err);
                return Err(err.into());
            }
            Err(_) => {
                warn!("{} timed out after {:?}", self.synthesizer.name(), self.llm_timeout);
                return Err(LlmError::Timeout(self.llm_timeout.as_secs()).into());
            }
        };

        // 6. Speech, voice mode only
        let audio_url = if mode.is_voice() {
            self.render_speech(&reply).await
        } else {
            None
        };

        // 7. Transcript, best effort
        if let (Some(store), Some(identity_id)) = (&self.transcripts, identity) {
            let exchange = Exchange {
                identity_id,
                session_id: request.session_id.as_deref(),
                user_text: message,
                has_image: image.is_some(),
                reply: &reply,
                created_at_ms: self.clock.now_millis(),
            };
            if let Err(e) = store.append_exchange(exchange).await {
                warn!("Failed to save transcript for {}: {}", identity_id, e);
            }
        }

        info!(
            "Roast delivered: turn {} ({}), {} chars, audio: {}",
            turn,
            phase,
            reply.chars().count(),
            audio_url.is_some()
        );
        Ok(ChatOutcome::Reply(Self::reply(
            reply,
            audio_url,
            messages_left,
            turn,
            phase,
            false,
        )))
    }

    /// `Ok(None)` means unmetered: privileged, or the store was unreachable.
    async fn consume_quota(&self, identity_id: &str, privileged: bool) -> Result<Option<u32>, ChatError> {
        match self.quota.consume(identity_id, privileged, self.clock.now()).await {
            Ok(QuotaDecision::Unlimited) => Ok(None),
            Ok(QuotaDecision::Allowed { remaining, .. }) => Ok(Some(remaining)),
            Ok(QuotaDecision::Exceeded { limit }) => Err(ChatError::QuotaExceeded { limit }),
            Err(e) => {
                warn!("Quota store unavailable for {}, letting request through: {}", identity_id, e);
                Ok(None)
            }
        }
    }

    async fn render_speech(&self, text: &str) -> Option<String> {
        let speech = self.speech.as_ref()?;
        if !should_render_speech(text) {
            debug!("Skipping speech for {} char reply", text.chars().count());
            return None;
        }

        match speech.speak(text).await {
            Ok(audio) => Some(audio.to_data_url()),
            Err(e) => {
                warn!("Speech synthesis failed, returning text only: {}", e);
                None
            }
        }
    }

    fn reply(
        message: String,
        audio_url: Option<String>,
        messages_left: Option<u32>,
        turn: u32,
        phase: PersonaPhase,
        degraded: bool,
    ) -> ChatReply {
        ChatReply {
            message,
            audio_url,
            messages_left,
            turn,
            phase,
            tone_intensity: phase.tone_intensity_percent(),
            degraded,
        }
    }
}
