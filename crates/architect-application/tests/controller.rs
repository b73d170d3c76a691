use architect_application::{CHAT_ERROR, ReplyEnd, Screen, SessionController};
use architect_core::ArchitectError;
use architect_core::config::GeminiConfig;
use architect_core::persona;
use architect_core::profile::{ProfileFields, Tone};
use architect_core::section::SectionKind;
use architect_core::session::{ChatMessage, ChatRole, View};
use architect_core::storage::KeyValueStore;
use architect_infrastructure::{FileKeyValueStore, InMemoryKeyValueStore, SessionStore};
use architect_interaction::GenerationGateway;
use architect_interaction::testing::{ScriptedModelClient, ScriptedReply};
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

struct Harness {
    kv: Arc<InMemoryKeyValueStore>,
    client: Arc<ScriptedModelClient>,
}

impl Harness {
    fn new() -> Self {
        Self {
            kv: Arc::new(InMemoryKeyValueStore::new()),
            client: Arc::new(ScriptedModelClient::new()),
        }
    }

    fn store(&self) -> SessionStore {
        SessionStore::new(self.kv.clone())
    }

    fn login(&self, handle: &str) -> SessionController {
        let gateway = GenerationGateway::new(self.client.clone(), GeminiConfig::default());
        SessionController::login(self.store(), gateway, handle).unwrap()
    }

    fn stored_raw(&self, id: &str) -> Option<String> {
        self.kv.get(&SessionStore::key_for(id)).unwrap()
    }
}

fn fields() -> ProfileFields {
    ProfileFields {
        full_name: "Dana Reyes".into(),
        business_name: "Reyes Bakery".into(),
        industry: "Food & Beverage".into(),
        target_audience: "Independent cafes".into(),
        value_proposition: "Fresh sourdough before opening".into(),
        personal_story: "Left finance to bake".into(),
        achievements: "Supplying 40 cafes".into(),
        tone: Some(Tone::ThoughtLeader),
    }
}

async fn approve(controller: &mut SessionController, harness: &Harness, kind: SectionKind, body: &str) {
    harness.client.push_generate(Ok(body.to_string()));
    controller
        .generate_section(kind, CancellationToken::new())
        .await
        .unwrap();
    controller.select_option(kind, 0).unwrap();
    assert!(controller.toggle_approve(kind).unwrap());
}

async fn finalized(harness: &Harness) -> SessionController {
    let mut controller = harness.login("Reyes Bakery");
    controller.submit_profile(fields()).unwrap();
    approve(&mut controller, harness, SectionKind::Headline, r#"["H1", "H2", "H3"]"#).await;
    approve(&mut controller, harness, SectionKind::About, "Bio").await;
    approve(&mut controller, harness, SectionKind::Experience, "Role").await;
    controller.finalize().unwrap();
    controller
}

#[test]
fn test_login_rejects_blank_handle() {
    let harness = Harness::new();
    let gateway = GenerationGateway::new(harness.client.clone(), GeminiConfig::default());

    let result = SessionController::login(harness.store(), gateway, "   ");

    assert!(result.err().is_some_and(|e| e.is_validation()));
}

#[test]
fn test_new_handle_starts_and_persists_zero_state() {
    let harness = Harness::new();
    let controller = harness.login("  Acme Corp ");

    let session = controller.session();
    assert_eq!(session.id, "Acme Corp");
    assert_eq!(session.view, View::Onboarding);
    assert!(session.profile.is_none());
    assert_eq!(controller.screen(), Screen::Onboarding);
    assert!(controller.available_views().is_empty());
    assert!(harness.stored_raw("Acme Corp").is_some());
}

#[tokio::test]
async fn test_login_restores_and_clears_stale_loading() {
    let harness = Harness::new();
    let mut controller = harness.login("acme");
    controller.submit_profile(fields()).unwrap();
    controller.logout();

    // Simulate a run that died mid-generation.
    let store = harness.store();
    let mut stored = store.load("acme").unwrap().unwrap();
    stored
        .section_mut(SectionKind::About)
        .unwrap()
        .begin_generation()
        .unwrap();
    store.save(&stored).unwrap();

    let controller = harness.login("acme");
    assert_eq!(controller.session().view, View::ProfileBuilder);
    assert!(!controller.section(SectionKind::About).unwrap().is_loading());
    assert_eq!(store.load("acme").unwrap().as_ref(), Some(controller.session()));
}

#[test]
fn test_submit_profile_reports_missing_fields() {
    let harness = Harness::new();
    let mut controller = harness.login("acme");

    let err = controller
        .submit_profile(ProfileFields {
            industry: String::new(),
            ..fields()
        })
        .unwrap_err();

    assert!(err.to_string().contains("industry"));
    assert!(controller.session().profile.is_none());
    assert_eq!(controller.session().view, View::Onboarding);
}

#[tokio::test]
async fn test_headline_generation_populates_options_without_selection() {
    let harness = Harness::new();
    let mut controller = harness.login("acme");
    controller.submit_profile(fields()).unwrap();
    harness.client.push_generate(Ok(r#"["A", "B", "C"]"#.to_string()));

    let drafted = controller
        .generate_section(SectionKind::Headline, CancellationToken::new())
        .await
        .unwrap();

    assert!(drafted);
    let headline = controller.section(SectionKind::Headline).unwrap();
    assert_eq!(headline.options(), ["A", "B", "C"]);
    assert_eq!(headline.selected_index(), None);
    assert!(!headline.is_loading());
    let stored = harness.store().load("acme").unwrap().unwrap();
    assert_eq!(stored.section(SectionKind::Headline).unwrap().options().len(), 3);
}

#[tokio::test]
async fn test_cancelled_generation_keeps_previous_options() {
    let harness = Harness::new();
    let mut controller = harness.login("acme");
    controller.submit_profile(fields()).unwrap();
    harness.client.push_generate(Ok(r#"["A", "B"]"#.to_string()));
    controller
        .generate_section(SectionKind::Headline, CancellationToken::new())
        .await
        .unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let drafted = controller
        .generate_section(SectionKind::Headline, cancel)
        .await
        .unwrap();

    assert!(!drafted);
    assert_eq!(harness.client.generate_requests().len(), 1);
    let headline = controller.section(SectionKind::Headline).unwrap();
    assert_eq!(headline.options(), ["A", "B"]);
    assert!(!headline.is_loading());
    let stored = harness.store().load("acme").unwrap().unwrap();
    assert!(!stored.section(SectionKind::Headline).unwrap().is_loading());

    harness.client.push_generate(Ok(r#"["C"]"#.to_string()));
    assert!(
        controller
            .generate_section(SectionKind::Headline, CancellationToken::new())
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_generation_requires_profile() {
    let harness = Harness::new();
    let mut controller = harness.login("acme");

    let err = controller
        .generate_section(SectionKind::About, CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ArchitectError::MissingPrecondition { .. }));
    assert!(harness.client.generate_requests().is_empty());
}

#[tokio::test]
async fn test_model_failure_becomes_fallback_option() {
    let harness = Harness::new();
    let mut controller = harness.login("acme");
    controller.submit_profile(fields()).unwrap();
    harness
        .client
        .push_generate(Err(ArchitectError::model(Some(401), "bad key")));

    controller
        .generate_section(SectionKind::About, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        controller.section(SectionKind::About).unwrap().options(),
        ["Failed to generate content. Please try again."]
    );
}

#[tokio::test]
async fn test_approval_locks_section_until_revoked() {
    let harness = Harness::new();
    let mut controller = harness.login("acme");
    controller.submit_profile(fields()).unwrap();
    approve(&mut controller, &harness, SectionKind::Headline, r#"["A", "B"]"#).await;

    assert!(controller.select_option(SectionKind::Headline, 1).is_err());
    assert!(controller.edit_option(SectionKind::Headline, 0, "X").is_err());
    assert!(
        controller
            .generate_section(SectionKind::Headline, CancellationToken::new())
            .await
            .is_err()
    );
    assert_eq!(harness.client.generate_requests().len(), 1);

    assert!(!controller.toggle_approve(SectionKind::Headline).unwrap());
    controller.edit_option(SectionKind::Headline, 1, "Edited").unwrap();
    controller.select_option(SectionKind::Headline, 1).unwrap();
    assert_eq!(
        controller.section(SectionKind::Headline).unwrap().selected_text(),
        Some("Edited")
    );
}

#[tokio::test]
async fn test_finalize_reports_missing_sections_without_mutation() {
    let harness = Harness::new();
    let mut controller = harness.login("acme");
    controller.submit_profile(fields()).unwrap();
    approve(&mut controller, &harness, SectionKind::Headline, r#"["A"]"#).await;
    let before = harness.stored_raw("acme");

    let err = controller.finalize().unwrap_err();

    assert_eq!(
        err.missing_sections(),
        Some(&[SectionKind::About, SectionKind::Experience][..])
    );
    assert!(controller.session().persona_instruction.is_none());
    assert_eq!(controller.session().view, View::ProfileBuilder);
    assert_eq!(harness.stored_raw("acme"), before);
}

#[tokio::test]
async fn test_finalize_compiles_persona_and_opens_chat_view() {
    let harness = Harness::new();
    let controller = finalized(&harness).await;

    let session = controller.session();
    let profile = session.profile.as_ref().unwrap();
    assert_eq!(
        session.persona_instruction.as_deref(),
        Some(persona::compile(profile, "H1", "Bio", "Role").as_str())
    );
    assert_eq!(session.view, View::PostWriter);
    assert_eq!(controller.screen(), Screen::PostWriter);
    assert_eq!(controller.home_view(), View::PostWriter);
    assert_eq!(
        controller.available_views(),
        vec![View::ProfileBuilder, View::Troubleshooter, View::PostWriter]
    );
}

#[tokio::test]
async fn test_strategy_is_not_required_to_finalize() {
    let harness = Harness::new();
    let controller = finalized(&harness).await;
    assert!(
        controller
            .section(SectionKind::Strategy)
            .unwrap()
            .options()
            .is_empty()
    );
}

#[test]
fn test_chat_view_fallback_is_idempotent() {
    let harness = Harness::new();
    let mut controller = harness.login("acme");
    controller.submit_profile(fields()).unwrap();
    controller.set_view(View::PostWriter).unwrap();

    let expected = Screen::MissingPersona {
        recovery: View::ProfileBuilder,
    };
    assert_eq!(controller.screen(), expected);
    assert_eq!(controller.screen(), expected);
    assert!(controller.ensure_chat().is_err());
    assert_eq!(controller.screen(), expected);

    assert_eq!(controller.recover().unwrap(), View::ProfileBuilder);
    assert_eq!(controller.screen(), Screen::ProfileBuilder);
    assert_eq!(controller.recover().unwrap(), View::ProfileBuilder);
}

#[tokio::test]
async fn test_ensure_chat_persists_single_welcome() {
    let harness = Harness::new();
    let mut controller = finalized(&harness).await;

    controller.ensure_chat().unwrap();
    controller.ensure_chat().unwrap();

    let history = &controller.session().chat_history;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].role, ChatRole::Model);
    assert!(history[0].text.starts_with("Hello Dana Reyes."));
    let stored = harness.store().load("Reyes Bakery").unwrap().unwrap();
    assert_eq!(stored.chat_history, *history);
}

#[tokio::test]
async fn test_streamed_reply_grows_and_persists_final_text() {
    let harness = Harness::new();
    let mut controller = finalized(&harness).await;
    harness
        .client
        .push_chat(ScriptedReply::chunks(["Hel", "lo", " there"]));

    let mut shown = Vec::new();
    let end = controller
        .send_message("Write about mornings", CancellationToken::new(), |m| {
            shown.push(m.text.clone())
        })
        .await
        .unwrap();

    assert_eq!(end, ReplyEnd::Completed);
    assert_eq!(shown, vec!["Hel", "Hello", "Hello there"]);
    for pair in shown.windows(2) {
        assert!(pair[1].starts_with(&pair[0]));
    }

    let stored = harness.store().load("Reyes Bakery").unwrap().unwrap();
    let tail = &stored.chat_history[stored.chat_history.len() - 2..];
    assert_eq!(
        tail,
        [
            ChatMessage::user("Write about mornings"),
            ChatMessage::model("Hello there")
        ]
    );
    assert_eq!(stored.chat_history, controller.session().chat_history);
}

#[tokio::test]
async fn test_stream_failure_shows_error_but_keeps_user_turn() {
    let harness = Harness::new();
    let mut controller = finalized(&harness).await;
    harness.client.push_chat(ScriptedReply::Chunks(vec![
        Ok("Half a sen".to_string()),
        Err(ArchitectError::model(None, "connection reset")),
    ]));

    let mut shown = Vec::new();
    let end = controller
        .send_message("hi", CancellationToken::new(), |m| shown.push(m.text.clone()))
        .await
        .unwrap();

    assert_eq!(end, ReplyEnd::Failed);
    assert_eq!(shown.last().map(String::as_str), Some(CHAT_ERROR));
    assert_eq!(
        controller.session().chat_history.last(),
        Some(&ChatMessage::model(CHAT_ERROR))
    );

    let stored = harness.store().load("Reyes Bakery").unwrap().unwrap();
    assert_eq!(stored.chat_history.last(), Some(&ChatMessage::user("hi")));
}

#[tokio::test]
async fn test_open_failure_then_retry_succeeds() {
    let harness = Harness::new();
    let mut controller = finalized(&harness).await;
    harness.client.push_chat(ScriptedReply::OpenError(ArchitectError::model(
        Some(403),
        "denied",
    )));
    harness.client.push_chat(ScriptedReply::chunks(["Sure"]));

    let end = controller
        .send_message("hi", CancellationToken::new(), |_| {})
        .await
        .unwrap();
    assert_eq!(end, ReplyEnd::Failed);

    let end = controller
        .send_message("hi", CancellationToken::new(), |_| {})
        .await
        .unwrap();
    assert_eq!(end, ReplyEnd::Completed);

    // Neither the local welcome nor the failed turn is replayed to the model.
    let retry = &harness.client.chat_requests()[1];
    assert!(retry.history.is_empty());
    assert_eq!(retry.message, "hi");
    assert_eq!(
        controller.session().chat_history.last(),
        Some(&ChatMessage::model("Sure"))
    );
}

#[tokio::test]
async fn test_cancelled_reply_commits_partial_text() {
    let harness = Harness::new();
    let mut controller = finalized(&harness).await;
    harness
        .client
        .push_chat(ScriptedReply::Stalled(vec!["Draft: ".to_string()]));
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();

    let end = controller
        .send_message("post", cancel, |_| trigger.cancel())
        .await
        .unwrap();

    assert_eq!(end, ReplyEnd::Cancelled);
    let stored = harness.store().load("Reyes Bakery").unwrap().unwrap();
    assert_eq!(stored.chat_history.last(), Some(&ChatMessage::model("Draft: ")));
}

#[tokio::test]
async fn test_new_persona_reopens_chat_with_history() {
    let harness = Harness::new();
    let mut controller = finalized(&harness).await;
    harness.client.push_chat(ScriptedReply::chunks(["one"]));
    controller
        .send_message("first", CancellationToken::new(), |_| {})
        .await
        .unwrap();

    controller.toggle_approve(SectionKind::About).unwrap();
    controller.edit_option(SectionKind::About, 0, "New bio").unwrap();
    controller.toggle_approve(SectionKind::About).unwrap();
    controller.finalize().unwrap();

    harness.client.push_chat(ScriptedReply::chunks(["two"]));
    controller
        .send_message("second", CancellationToken::new(), |_| {})
        .await
        .unwrap();

    let second = &harness.client.chat_requests()[1];
    assert!(second.system_instruction.contains("New bio"));
    assert_eq!(second.history.len(), 3);
    assert_eq!(second.message, "second");
}

#[tokio::test]
async fn test_file_backed_session_survives_logout() {
    let temp_dir = TempDir::new().unwrap();
    let client = Arc::new(ScriptedModelClient::new());
    let login = || {
        let store = SessionStore::new(Arc::new(FileKeyValueStore::new(temp_dir.path())));
        let gateway = GenerationGateway::new(client.clone(), GeminiConfig::default());
        SessionController::login(store, gateway, "Reyes Bakery").unwrap()
    };

    let mut controller = login();
    controller.submit_profile(fields()).unwrap();
    client.push_generate(Ok(r#"["A", "B"]"#.to_string()));
    controller
        .generate_section(SectionKind::Headline, CancellationToken::new())
        .await
        .unwrap();
    controller.select_option(SectionKind::Headline, 1).unwrap();
    let before = controller.session().clone();
    controller.logout();

    let restored = login();
    let mut expected = before;
    expected.updated_at = restored.session().updated_at;
    assert_eq!(restored.session(), &expected);
}

#[tokio::test]
async fn test_screenshot_help_does_not_touch_session() {
    let harness = Harness::new();
    let mut controller = harness.login("acme");
    controller.submit_profile(fields()).unwrap();
    controller.set_view(View::Troubleshooter).unwrap();
    let before = harness.stored_raw("acme");
    harness.client.push_generate(Ok("Open settings".to_string()));

    let answer = controller.analyze_screenshot(&[1, 2], "image/png", "").await;

    assert_eq!(answer, "Open settings");
    assert_eq!(harness.stored_raw("acme"), before);
    assert_eq!(controller.screen(), Screen::Troubleshooter);
}
