//! Voice session integration tests
//!
//! Tests voice coordination against fake host speech engines

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use voice_chat_relay::config::VoiceConfig;
use voice_chat_relay::voice::{
    RecognitionEvent, RecognitionSession, RecognitionState, SessionState, SpeechSettings,
    SynthesisSession, UtteranceOutcome, Voice, VoiceCapabilities, VoiceController, VoiceEvent,
};
use voice_chat_relay::{Locale, Notice};

mod common;
use common::{FakeRecognition, FakeSynthesis, UnsupportedRecognition, wait_until};

fn drain(events: &mut mpsc::UnboundedReceiver<VoiceEvent>) -> Vec<VoiceEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

fn controller_with(
    recognition: Arc<FakeRecognition>,
    synthesis: Arc<FakeSynthesis>,
) -> (VoiceController, mpsc::UnboundedReceiver<VoiceEvent>) {
    VoiceController::new(
        VoiceCapabilities {
            recognition: Some(recognition),
            synthesis: Some(synthesis),
        },
        &VoiceConfig::default(),
    )
}

#[test]
fn test_missing_recognition_gives_one_notice_and_stays_idle() {
    let (tx, mut events) = mpsc::unbounded_channel();
    let mut session = RecognitionSession::new(None, tx);

    session.start(Locale::En);

    assert_eq!(session.state(), RecognitionState::Idle);
    let events = drain(&mut events);
    assert_eq!(
        events,
        [VoiceEvent::Notice {
            notice: Notice::VoiceInputUnsupported,
            locale: Locale::En,
        }]
    );
    assert_eq!(
        events[0].notice_text(),
        Some(Notice::VoiceInputUnsupported.text(Locale::En))
    );
}

#[test]
fn test_unsupported_host_capability_is_treated_as_absent() {
    let (tx, mut events) = mpsc::unbounded_channel();
    let mut session = RecognitionSession::new(Some(Arc::new(UnsupportedRecognition)), tx);

    session.start(Locale::Bn);

    assert!(!session.is_supported());
    assert_eq!(session.state(), RecognitionState::Idle);
    assert_eq!(drain(&mut events).len(), 1);
}

#[tokio::test]
async fn test_start_then_stop_returns_to_idle_in_each_locale() {
    for locale in Locale::ALL {
        let recognition = FakeRecognition::new();
        let (mut controller, _events) =
            controller_with(recognition.clone(), FakeSynthesis::with_default_voices());
        controller.on_locale_changed(locale).await;

        controller.request_toggle();
        assert_eq!(controller.state(), SessionState::Listening(locale));
        assert_eq!(recognition.last_lang(), Some(locale.tag()));

        controller.request_toggle();
        let event = controller.next_event().await;
        controller.dispatch(event);

        assert_eq!(controller.state(), SessionState::Idle);
    }
}

#[tokio::test]
async fn test_one_handle_across_runs() {
    let recognition = FakeRecognition::new();
    let (mut controller, _events) =
        controller_with(recognition.clone(), FakeSynthesis::with_default_voices());

    for _ in 0..3 {
        controller.request_toggle();
        controller.request_toggle();
        let event = controller.next_event().await;
        controller.dispatch(event);
    }

    recognition.with_log(|log| {
        assert_eq!(log.created, 1);
        assert_eq!(log.starts, 3);
    });
}

#[test]
fn test_start_while_listening_is_noop() {
    let recognition = FakeRecognition::new();
    let (tx, _events) = mpsc::unbounded_channel();
    let mut session = RecognitionSession::new(Some(recognition.clone()), tx);

    session.start(Locale::En);
    session.start(Locale::Bn);

    assert_eq!(session.locale(), Locale::En);
    recognition.with_log(|log| assert_eq!(log.starts, 1));
}

#[test]
fn test_stop_when_idle_is_noop() {
    let recognition = FakeRecognition::new();
    let (tx, mut events) = mpsc::unbounded_channel();
    let mut session = RecognitionSession::new(Some(recognition.clone()), tx);

    session.stop();
    session.stop();

    assert_eq!(session.state(), RecognitionState::Idle);
    assert!(drain(&mut events).is_empty());
    recognition.with_log(|log| assert_eq!(log.stops, 0));
}

#[tokio::test]
async fn test_transcript_is_submitted_once() {
    let recognition = FakeRecognition::new();
    let (mut controller, mut events) =
        controller_with(recognition.clone(), FakeSynthesis::with_default_voices());

    controller.request_toggle();
    drain(&mut events);

    recognition.fire(RecognitionEvent::Result("  আমার জ্বর  ".into()));
    recognition.fire(RecognitionEvent::Result("second".into()));
    recognition.fire(RecognitionEvent::End);
    for _ in 0..3 {
        let event = controller.next_event().await;
        controller.dispatch(event);
    }

    let events = drain(&mut events);
    assert_eq!(
        events[0],
        VoiceEvent::Transcript {
            text: "আমার জ্বর".into(),
            locale: Locale::Bn,
        }
    );
    assert_eq!(
        events[1],
        VoiceEvent::StateChanged {
            state: RecognitionState::Idle,
            locale: Locale::Bn,
        }
    );
    assert_eq!(events.len(), 2);
}

#[tokio::test]
async fn test_blank_transcript_not_submitted() {
    let recognition = FakeRecognition::new();
    let (mut controller, mut events) =
        controller_with(recognition.clone(), FakeSynthesis::with_default_voices());

    controller.request_toggle();
    drain(&mut events);
    recognition.fire(RecognitionEvent::Result("   ".into()));
    let event = controller.next_event().await;
    controller.dispatch(event);

    assert!(drain(&mut events).is_empty());
}

#[tokio::test]
async fn test_recognition_error_stops_and_notifies() {
    let recognition = FakeRecognition::new();
    let (mut controller, mut events) =
        controller_with(recognition.clone(), FakeSynthesis::with_default_voices());

    controller.request_toggle();
    drain(&mut events);
    recognition.fire(RecognitionEvent::Error("no-speech".into()));
    let event = controller.next_event().await;
    controller.dispatch(event);

    assert_eq!(controller.state(), SessionState::Idle);
    let events = drain(&mut events);
    assert!(events.contains(&VoiceEvent::Notice {
        notice: Notice::RecognitionError,
        locale: Locale::Bn,
    }));
}

#[tokio::test(start_paused = true)]
async fn test_locale_switch_while_listening_restarts_in_new_locale() {
    let recognition = FakeRecognition::new();
    let (mut controller, _events) =
        controller_with(recognition.clone(), FakeSynthesis::with_default_voices());

    controller.request_toggle();
    assert_eq!(controller.state(), SessionState::Listening(Locale::Bn));
    let stale = recognition.current_sink();

    let started = tokio::time::Instant::now();
    controller.on_locale_changed(Locale::En).await;
    assert!(started.elapsed() >= Duration::from_millis(250));

    assert_eq!(controller.state(), SessionState::Listening(Locale::En));
    assert_eq!(recognition.last_lang(), Some("en-US"));
    recognition.with_log(|log| {
        assert_eq!(log.created, 1);
        assert_eq!(log.starts, 2);
    });

    // A late result from the superseded run never reaches the session
    let _ = stale.send(RecognitionEvent::Result("old".into()));
    recognition.fire(RecognitionEvent::Result("new".into()));
    let event = controller.next_event().await;
    assert_eq!(event, RecognitionEvent::Result("new".into()));
}

#[tokio::test(start_paused = true)]
async fn test_locale_round_trip_ends_listening_in_starting_locale() {
    let recognition = FakeRecognition::new();
    let (mut controller, _events) =
        controller_with(recognition.clone(), FakeSynthesis::with_default_voices());

    controller.request_toggle();
    controller.on_locale_changed(Locale::En).await;
    controller.on_locale_changed(Locale::Bn).await;

    assert_eq!(controller.state(), SessionState::Listening(Locale::Bn));
    assert_eq!(recognition.last_lang(), Some("bn-BD"));
}

#[tokio::test(start_paused = true)]
async fn test_restart_refused_by_busy_host_settles_idle() {
    let recognition = FakeRecognition::sticky();
    let (mut controller, mut events) =
        controller_with(recognition.clone(), FakeSynthesis::with_default_voices());

    controller.request_toggle();
    drain(&mut events);
    controller.on_locale_changed(Locale::En).await;

    assert_eq!(controller.state(), SessionState::Idle);
    assert_eq!(controller.mic_label(), "🎤 Start Voice");
    assert_eq!(
        drain(&mut events).last(),
        Some(&VoiceEvent::StateChanged {
            state: RecognitionState::Idle,
            locale: Locale::En,
        })
    );

    // No run is left to wait on
    let next = tokio::time::timeout(Duration::from_secs(2), controller.next_event()).await;
    assert!(next.is_err());
}

#[tokio::test]
async fn test_locale_switch_while_idle_does_not_start() {
    let recognition = FakeRecognition::new();
    let (mut controller, _events) =
        controller_with(recognition.clone(), FakeSynthesis::with_default_voices());

    controller.on_locale_changed(Locale::En).await;

    assert_eq!(controller.state(), SessionState::Idle);
    assert_eq!(controller.current_locale(), Locale::En);
    recognition.with_log(|log| assert_eq!(log.starts, 0));
}

#[tokio::test]
async fn test_mic_label_follows_state_and_locale() {
    let recognition = FakeRecognition::new();
    let (mut controller, _events) =
        controller_with(recognition, FakeSynthesis::with_default_voices());
    controller.on_locale_changed(Locale::En).await;

    assert_eq!(controller.mic_label(), "🎤 Start Voice");
    controller.request_toggle();
    assert_eq!(controller.mic_label(), "🔴 Listening...");
}

#[test]
fn test_voices_ready_resolves_in_one_poll_when_catalog_known() {
    let synthesis = SynthesisSession::new(
        Some(FakeSynthesis::with_default_voices()),
        SpeechSettings::default(),
    );

    let mut ready = tokio_test::task::spawn(synthesis.ensure_voices_ready(Duration::from_secs(60)));
    tokio_test::assert_ready_eq!(ready.poll(), true);
}

#[tokio::test(start_paused = true)]
async fn test_voices_ready_times_out_on_empty_catalog() {
    let synthesis = SynthesisSession::new(Some(FakeSynthesis::new(vec![])), SpeechSettings::default());

    let started = tokio::time::Instant::now();
    assert!(!synthesis.ensure_voices_ready(Duration::from_millis(1500)).await);
    assert!(started.elapsed() >= Duration::from_millis(1500));
}

#[tokio::test(start_paused = true)]
async fn test_voices_ready_wakes_on_catalog_change() {
    let fake = FakeSynthesis::new(vec![]);
    let synthesis = Arc::new(SynthesisSession::new(Some(fake.clone()), SpeechSettings::default()));

    let waiter = {
        let synthesis = Arc::clone(&synthesis);
        tokio::spawn(async move { synthesis.ensure_voices_ready(Duration::from_secs(5)).await })
    };
    tokio::task::yield_now().await;
    fake.load_voices(vec![Voice::new("Piya", "bn-IN")]);

    assert!(waiter.await.unwrap());
}

#[tokio::test]
async fn test_speak_uses_locale_voice_and_settings() {
    let fake = FakeSynthesis::with_default_voices();
    let synthesis = Arc::new(SynthesisSession::new(Some(fake.clone()), SpeechSettings::default()));

    let playback = synthesis.speak_detached("নমস্কার".into(), Locale::Bn);
    wait_until(|| fake.spoken_count() == 1).await;
    fake.finish();

    assert_eq!(playback.await.unwrap(), Some(UtteranceOutcome::Ended));
    let spoken = fake.spoken.lock().unwrap();
    assert_eq!(spoken[0].lang, "bn-BD");
    assert_eq!(spoken[0].voice.as_ref().unwrap().name, "Piya");
    assert!((spoken[0].rate - 0.95).abs() < f32::EPSILON);
}

#[tokio::test]
async fn test_new_utterance_preempts_current() {
    let fake = FakeSynthesis::with_default_voices();
    let synthesis = Arc::new(SynthesisSession::new(Some(fake.clone()), SpeechSettings::default()));

    let first = synthesis.speak_detached("first".into(), Locale::En);
    wait_until(|| fake.spoken_count() == 1).await;
    let second = synthesis.speak_detached("second".into(), Locale::En);
    wait_until(|| fake.spoken_count() == 2).await;

    assert!(synthesis.is_speaking());
    fake.finish();

    assert_eq!(first.await.unwrap(), Some(UtteranceOutcome::Interrupted));
    assert_eq!(second.await.unwrap(), Some(UtteranceOutcome::Ended));
    assert!(!synthesis.is_speaking());

    // Each utterance cancels before it is enqueued
    assert_eq!(
        fake.calls(),
        ["resume", "cancel", "speak", "resume", "cancel", "speak"]
    );
}

#[tokio::test]
async fn test_utterance_superseded_while_voices_load_is_never_enqueued() {
    let fake = FakeSynthesis::new(vec![]);
    let synthesis = Arc::new(SynthesisSession::new(Some(fake.clone()), SpeechSettings::default()));

    let first = synthesis.speak_detached("first".into(), Locale::En);
    let second = synthesis.speak_detached("second".into(), Locale::En);
    // Let both requests take a ticket and start waiting for the catalog
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
    assert_eq!(fake.spoken_count(), 0);

    fake.load_voices(vec![Voice::new("Samantha", "en-US")]);
    assert_eq!(first.await.unwrap(), Some(UtteranceOutcome::Interrupted));

    wait_until(|| fake.spoken_count() == 1).await;
    fake.finish();
    assert_eq!(second.await.unwrap(), Some(UtteranceOutcome::Ended));

    assert_eq!(fake.spoken.lock().unwrap()[0].text, "second");
    assert_eq!(fake.calls(), ["resume", "cancel", "speak"]);
    assert!(!synthesis.is_speaking());
}

#[tokio::test]
async fn test_failed_utterance_releases_slot() {
    let fake = FakeSynthesis::with_default_voices();
    let synthesis = Arc::new(SynthesisSession::new(Some(fake.clone()), SpeechSettings::default()));

    let playback = synthesis.speak_detached("hello".into(), Locale::En);
    wait_until(|| fake.spoken_count() == 1).await;
    fake.fail("audio-busy");

    assert_eq!(
        playback.await.unwrap(),
        Some(UtteranceOutcome::Failed("audio-busy".into()))
    );
    assert!(!synthesis.is_speaking());
}
