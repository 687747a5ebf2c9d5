//! End-to-end learner flows.

use chrono::Duration;
use parlons_core::{
    Accent, Catalog, Config, Database, Error, Listener, NextStep, Phase, PracticeOutcome, SessionKind, Settings,
    Speaker, SpeechError, Tutor,
};
use parlons_testing::{Fixtures, RecordingSynthesizer, ScriptedRecognizer};

#[test]
fn exact_answer_advances_to_immediate_recall() {
    let mut orch = Fixtures::orchestrator();
    orch.start_session(SessionKind::NewContent, Fixtures::epoch()).unwrap();

    let now = Fixtures::at(12);
    let response = orch.process_response("a1_1", "Bonjour", 800, now).unwrap();
    assert_eq!(response.accuracy, 100.0);
    assert_eq!(response.next_step, NextStep::Continue);

    let state = orch.memory().peek("a1_1").unwrap();
    assert_eq!(state.phase, Phase::ImmediateRecall);
    assert_eq!(state.next_review_time, now + Duration::seconds(30));
}

#[test]
fn empty_answer_stays_in_introduction() {
    let mut orch = Fixtures::orchestrator();
    orch.start_session(SessionKind::NewContent, Fixtures::epoch()).unwrap();

    let now = Fixtures::at(12);
    let response = orch.process_response("a1_1", "", 800, now).unwrap();
    assert_eq!(response.accuracy, 0.0);
    assert_eq!(response.next_step, NextStep::Explain);

    let state = orch.memory().peek("a1_1").unwrap();
    assert_eq!(state.phase, Phase::Introduction);
    assert_eq!(state.next_review_time, now + Duration::seconds(5));
}

#[test]
fn warmup_without_due_items_is_empty() {
    let mut orch = Fixtures::orchestrator();
    let session = orch.start_session(SessionKind::Warmup, Fixtures::epoch()).unwrap();
    assert!(session.items.is_empty());
    assert!(orch.current_item().is_none());
}

#[test]
fn sessions_never_exceed_ten_items() {
    let mut orch = Fixtures::orchestrator_with(Fixtures::numbered_catalog(25));
    for kind in [SessionKind::Warmup, SessionKind::NewContent, SessionKind::Integration] {
        let session = orch.start_session(kind, Fixtures::at(60)).unwrap();
        assert!(session.total_items() <= 10, "{kind:?} had {} items", session.total_items());
        orch.complete_session(Fixtures::at(60)).unwrap();
    }
}

#[test]
fn completing_an_unanswered_session_keeps_assessment() {
    let mut orch = Fixtures::orchestrator();
    let before = orch.assessment().clone();

    orch.start_session(SessionKind::NewContent, Fixtures::epoch()).unwrap();
    let after = orch.complete_session(Fixtures::at(300)).unwrap();
    assert_eq!(*after, before);
    assert_eq!(orch.history().len(), 1);
}

#[test]
fn errors_leave_state_untouched() {
    let mut orch = Fixtures::orchestrator();
    assert!(matches!(
        orch.process_response("a1_1", "Bonjour", 0, Fixtures::epoch()),
        Err(Error::NoActiveSession)
    ));
    assert_eq!(orch.memory().peek("a1_1").unwrap().repetition_count, 0);

    orch.start_session(SessionKind::NewContent, Fixtures::epoch()).unwrap();
    assert!(matches!(
        orch.process_response("ghost", "Bonjour", 0, Fixtures::epoch()),
        Err(Error::ItemNotFound(_))
    ));
    assert!(orch.active_session().unwrap().responses.is_empty());
}

fn tutor() -> Tutor {
    Tutor::ephemeral(Fixtures::single_item_catalog(), Config::default(), Fixtures::epoch())
}

#[tokio::test(start_paused = true)]
async fn practice_scores_heard_speech() {
    let mut tutor = tutor();
    tutor.start_session(SessionKind::NewContent, Fixtures::epoch()).unwrap();
    let listener = Listener::from_config(
        ScriptedRecognizer::new().say(1200, "bonjour"),
        &Config::default().speech,
    );

    let response = match tutor.practice("a1_1", &listener).await.unwrap() {
        PracticeOutcome::Scored(response) => response,
        other => panic!("expected a scored response, got {other:?}"),
    };
    assert_eq!(response.response_ms, 1200);
    assert!(response.is_correct);
    assert!(!response.hesitation);

    let orch = tutor.orchestrator();
    assert_eq!(orch.memory().peek("a1_1").unwrap().phase, Phase::ImmediateRecall);
    assert!(orch.current_item().is_none());
}

#[tokio::test(start_paused = true)]
async fn practice_timeout_skips_without_scoring() {
    let mut tutor = tutor();
    tutor.start_session(SessionKind::NewContent, Fixtures::epoch()).unwrap();
    let listener = Listener::from_config(
        ScriptedRecognizer::new().say(60_000, "bonjour"),
        &Config::default().speech,
    );

    let outcome = tutor.practice("a1_1", &listener).await.unwrap();
    assert_eq!(outcome, PracticeOutcome::Skipped);

    let orch = tutor.orchestrator();
    assert_eq!(orch.memory().peek("a1_1").unwrap().repetition_count, 0);
    assert!(orch.active_session().unwrap().responses.is_empty());
}

#[tokio::test(start_paused = true)]
async fn recognizer_failure_leaves_memory_alone() {
    let mut tutor = tutor();
    tutor.start_session(SessionKind::NewContent, Fixtures::epoch()).unwrap();
    let listener = Listener::from_config(
        ScriptedRecognizer::new().fail(300, SpeechError::Failed("no microphone".to_string())),
        &Config::default().speech,
    );

    let result = tutor.practice("a1_1", &listener).await;
    assert!(matches!(result, Err(Error::Speech(SpeechError::Failed(_)))));
    assert_eq!(tutor.orchestrator().memory().peek("a1_1").unwrap().repetition_count, 0);
}

#[tokio::test(start_paused = true)]
async fn cancelled_practice_leaves_memory_alone() {
    let mut tutor = tutor();
    tutor.start_session(SessionKind::NewContent, Fixtures::epoch()).unwrap();
    let listener = Listener::from_config(
        ScriptedRecognizer::new().say(5_000, "bonjour"),
        &Config::default().speech,
    );

    let (outcome, _) = tokio::join!(tutor.practice("a1_1", &listener), async {
        tokio::time::sleep(std::time::Duration::from_millis(250)).await;
        listener.cancel();
    });
    assert_eq!(outcome.unwrap(), PracticeOutcome::Cancelled);

    let orch = tutor.orchestrator();
    assert_eq!(orch.memory().peek("a1_1").unwrap().repetition_count, 0);
    assert!(orch.active_session().unwrap().responses.is_empty());
    assert_eq!(orch.current_item().unwrap().id, "a1_1");
    assert!(!listener.is_listening());
}

#[tokio::test(start_paused = true)]
async fn practice_requires_an_active_session() {
    let mut tutor = tutor();
    let listener = Listener::from_config(ScriptedRecognizer::new().say(10, "bonjour"), &Config::default().speech);

    let result = tutor.practice("a1_1", &listener).await;
    assert!(matches!(result, Err(Error::NoActiveSession)));
    assert_eq!(listener.recognizer().remaining(), 1);
}

#[tokio::test(start_paused = true)]
async fn announce_uses_accent_and_rate() {
    let mut tutor = tutor();
    tutor
        .update_settings(Settings {
            accent: Accent::Quebec,
            speech_rate: 0.8,
            ..Settings::default()
        })
        .unwrap();
    let speaker = Speaker::new(RecordingSynthesizer::new(500));

    tutor.announce("a1_1", &speaker).await.unwrap();
    let spoken = speaker.synthesizer().spoken();
    assert_eq!(spoken.len(), 1);
    assert_eq!(spoken[0].text, "Bonjour");
    assert_eq!(spoken[0].locale, "fr-CA");
    assert_eq!(spoken[0].rate, 0.8);

    assert!(matches!(
        tutor.announce("ghost", &speaker).await,
        Err(Error::ItemNotFound(_))
    ));
}

#[test]
fn learner_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("parlons.db");

    {
        let db = Database::open(&path).unwrap();
        let mut tutor = Tutor::open(db, Catalog::builtin(), Config::default()).unwrap();
        let now = chrono::Utc::now();
        tutor.start_session(SessionKind::NewContent, now).unwrap();
        tutor.respond("a1_1", "Bonjour", 900, now).unwrap();
        tutor.complete_session(now).unwrap();
    }

    let db = Database::open(&path).unwrap();
    let tutor = Tutor::open(db, Catalog::builtin(), Config::default()).unwrap();
    let orch = tutor.orchestrator();
    assert_eq!(orch.history().len(), 1);
    assert_eq!(orch.history()[0].responses.len(), 1);
    assert_eq!(orch.memory().peek("a1_1").unwrap().phase, Phase::ImmediateRecall);
    assert_eq!(orch.assessment().overall_progress, 2.0);
}

#[test]
fn export_then_import_merges_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.json");

    let mut source = tutor();
    source.start_session(SessionKind::NewContent, Fixtures::epoch()).unwrap();
    source.respond("a1_1", "Bonjour", 700, Fixtures::at(5)).unwrap();
    source.complete_session(Fixtures::at(60)).unwrap();
    source.export_to(&path).unwrap();

    let mut target = tutor();
    assert_eq!(target.import_from(&path).unwrap(), 1);
    assert_eq!(target.import_from(&path).unwrap(), 0);
    assert_eq!(target.orchestrator().history().len(), 1);
}

#[test]
fn import_with_unknown_items_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.json");

    let mut source = Tutor::ephemeral(Catalog::builtin(), Config::default(), Fixtures::epoch());
    source.start_session(SessionKind::NewContent, Fixtures::epoch()).unwrap();
    source.respond("a1_2", "Comment allez-vous ?", 900, Fixtures::at(5)).unwrap();
    source.complete_session(Fixtures::at(60)).unwrap();
    source.export_to(&path).unwrap();

    // The single-item catalog only knows a1_1.
    let mut target = tutor();
    assert!(matches!(target.import_from(&path), Err(Error::InvalidImport(_))));
    assert!(target.orchestrator().history().is_empty());
}

#[test]
fn conversation_session_counts_toward_streak() {
    let mut tutor = Tutor::ephemeral(Catalog::builtin(), Config::default(), Fixtures::epoch());
    let session = tutor.start_conversation("library", Fixtures::epoch()).unwrap();
    assert_eq!(session.items, vec!["library_2".to_string(), "library_4".to_string()]);

    tutor
        .respond("library_2", "Bonjour, je cherche un livre", 900, Fixtures::at(10))
        .unwrap();
    assert_eq!(tutor.orchestrator().current_item().unwrap().id, "library_4");
    tutor.complete_session(Fixtures::at(120)).unwrap();

    let progress = tutor.orchestrator().progress();
    assert_eq!(progress.total_sessions, 1);
    assert_eq!(progress.current_streak(Fixtures::epoch().date_naive()), 1);
    assert_eq!(progress.conversation_minutes, 2.0);
}

#[test]
fn invalid_import_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, r#"{"schema_version": 1, "sessions": "nope"}"#).unwrap();

    let mut target = tutor();
    let before = target.settings().clone();
    assert!(matches!(target.import_from(&path), Err(Error::InvalidImport(_))));
    assert_eq!(*target.settings(), before);
    assert!(target.orchestrator().history().is_empty());
}
