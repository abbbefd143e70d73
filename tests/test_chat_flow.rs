// tests/test_chat_flow.rs


use chrono::Duration;
use roastmate::{
    chat::{ChatError, ChatOutcome, ChatReply, ChatRequest},
    clock::Clock,
    persona::PersonaPhase,
    prompt::{NEGATIVE_CONSTRAINT, VOICE_LENGTH_CONSTRAINT},
    safety::{CRISIS_REFERRAL_MESSAGE, LockoutKey},
};
use test_helpers::{RecordingSynthesizer, create_test_harness, history};

fn reply(outcome: ChatOutcome) -> ChatReply {
    match outcome {
        ChatOutcome::Reply(reply) => reply,
        ChatOutcome::Crisis(crisis) => panic!("unexpected crisis reply: {crisis:?}"),
    }
}

#[tokio::test]
async fn test_first_message_is_friendly() {
    let h = create_test_harness(RecordingSynthesizer::replying("Welcome, brave soul.")).await;

    let outcome = h
        .state
        .chat
        .handle(ChatRequest::text("hi").with_identity("user-1"))
        .await
        .unwrap();
    let reply = reply(outcome);

    assert_eq!(reply.message, "Welcome, brave soul.");
    assert_eq!(reply.turn, 1);
    assert_eq!(reply.phase, PersonaPhase::Friendly);
    assert_eq!(reply.tone_intensity, 10);
    assert_eq!(reply.messages_left, Some(9));

    let calls = h.synth.calls();
    assert_eq!(calls.len(), 1);
    assert!(!calls[0].system_prompt.contains(NEGATIVE_CONSTRAINT));
}

#[tokio::test]
async fn test_fifth_turn_is_harsh() {
    let h = create_test_harness(RecordingSynthesizer::replying("That fit filed for divorce.")).await;

    let outcome = h
        .state
        .chat
        .handle(
            ChatRequest::text("rate my fit")
                .with_identity("user-2")
                .with_history(history(4)),
        )
        .await
        .unwrap();
    let reply = reply(outcome);

    assert_eq!(reply.turn, 5);
    assert_eq!(reply.phase, PersonaPhase::Harsh);
    assert_eq!(reply.tone_intensity, 80);

    let calls = h.synth.calls();
    let prompt = &calls[0].system_prompt;
    assert!(prompt.contains("CURRENT TURN: 5 | PHASE: HARSH (80% intensity)"));
    assert!(prompt.contains(PersonaPhase::Harsh.directive()));
    assert!(prompt.contains(NEGATIVE_CONSTRAINT));
    assert_eq!(calls[0].history_len, 8);
    assert_eq!(calls[0].user_turn.content, "rate my fit");
}

#[tokio::test]
async fn test_history_beyond_window_caps_turn() {
    let h = create_test_harness(RecordingSynthesizer::replying("still here?")).await;

    let outcome = h
        .state
        .chat
        .handle(ChatRequest::text("again").with_history(history(40)))
        .await
        .unwrap();
    let reply = reply(outcome);

    assert_eq!(reply.turn, 16);
    assert_eq!(reply.phase, PersonaPhase::Savage);
    assert_eq!(h.synth.calls()[0].history_len, 30);
}

#[tokio::test]
async fn test_crisis_message_arms_lockout_without_model_call() {
    let h = create_test_harness(RecordingSynthesizer::replying("never sent")).await;
    let chat = &h.state.chat;

    let outcome = chat
        .handle(ChatRequest::text("I want to end my life").with_identity("user-3"))
        .await
        .unwrap();
    let ChatOutcome::Crisis(crisis) = outcome else {
        panic!("expected crisis reply");
    };
    assert!(crisis.crisis);
    assert_eq!(crisis.message, CRISIS_REFERRAL_MESSAGE);
    assert_eq!(crisis.crisis_timestamp, h.clock.now_millis());
    assert!(h.synth.calls().is_empty());

    // Voice and image-only requests are blocked too
    h.clock.advance(Duration::minutes(59));
    let err = chat
        .handle(ChatRequest {
            image: Some("aGVsbG8=".into()),
            identity_id: Some("user-3".into()),
            voice_mode: true,
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::Locked { minutes_remaining: 1 }));

    h.clock.advance(Duration::minutes(1));
    let outcome = chat
        .handle(ChatRequest::text("ok I'm back").with_identity("user-3"))
        .await
        .unwrap();
    assert!(!outcome.is_crisis());
    assert_eq!(h.synth.calls().len(), 1);
}

#[tokio::test]
async fn test_crisis_text_during_lockout_keeps_original_deadline() {
    let h = create_test_harness(RecordingSynthesizer::replying("welcome back")).await;
    let chat = &h.state.chat;
    let key = LockoutKey::new("identity:user-6");

    let first = chat
        .handle(ChatRequest::text("I want to kill myself").with_identity("user-6"))
        .await
        .unwrap();
    assert!(first.is_crisis());

    h.clock.advance(Duration::minutes(30));
    let err = chat
        .handle(ChatRequest::text("I still want to end my life").with_identity("user-6"))
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::Locked { minutes_remaining: 30 }));

    let status = chat.lockouts().status(&key, h.clock.now_millis()).await;
    assert_eq!(status.minutes_remaining(), 30);

    // The second message did not re-arm: the window closes at the first deadline
    h.clock.advance(Duration::minutes(30));
    let outcome = chat
        .handle(ChatRequest::text("hey").with_identity("user-6"))
        .await
        .unwrap();
    assert!(!outcome.is_crisis());
    assert_eq!(h.synth.calls().len(), 1);
}

#[tokio::test]
async fn test_quota_boundary_and_daily_reset() {
    let h = create_test_harness(RecordingSynthesizer::replying("roasted")).await;
    let chat = &h.state.chat;
    let request = || ChatRequest::text("again").with_identity("user-4");

    for _ in 0..9 {
        chat.handle(request()).await.unwrap();
    }

    let tenth = reply(chat.handle(request()).await.unwrap());
    assert_eq!(tenth.messages_left, Some(0));

    let err = chat.handle(request()).await.unwrap_err();
    assert!(matches!(err, ChatError::QuotaExceeded { limit: 10 }));
    assert_eq!(h.synth.calls().len(), 10);

    h.clock.advance(Duration::days(1));
    let next_day = reply(chat.handle(request()).await.unwrap());
    assert_eq!(next_day.messages_left, Some(9));
}

#[tokio::test]
async fn test_voice_mode_renders_short_reply() {
    let h = create_test_harness(RecordingSynthesizer::replying("Nice try.")).await;

    let reply = reply(
        h.state
            .chat
            .handle(ChatRequest::text("roast me").voice())
            .await
            .unwrap(),
    );

    let audio = reply.audio_url.expect("voice reply should carry audio");
    assert!(audio.starts_with("data:audio/mpeg;base64,"));
    assert_eq!(h.speech.spoken(), vec!["Nice try.".to_string()]);
    assert!(h.synth.calls()[0].system_prompt.contains(VOICE_LENGTH_CONSTRAINT));
}

#[tokio::test]
async fn test_voice_mode_skips_speech_for_long_reply() {
    let long_reply = "blah ".repeat(130);
    let h = create_test_harness(RecordingSynthesizer::replying(&long_reply)).await;

    let reply = reply(
        h.state
            .chat
            .handle(ChatRequest::text("roast me").voice())
            .await
            .unwrap(),
    );

    assert_eq!(reply.message, long_reply);
    assert!(reply.audio_url.is_none());
    assert!(h.speech.spoken().is_empty());
}

#[tokio::test]
async fn test_exchange_lands_in_transcript() {
    let h = create_test_harness(RecordingSynthesizer::replying("Bold of you.")).await;

    h.state
        .chat
        .handle(ChatRequest::text("judge my code").with_identity("user-5"))
        .await
        .unwrap();

    let turns = h.state.transcripts.recent("user-5", 10).await.unwrap();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].content, "judge my code");
    assert_eq!(turns[1].content, "Bold of you.");
}
