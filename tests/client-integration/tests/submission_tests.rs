use fofou_common::api_error::ApiErrorCode;
use fofou_common::config::ForumConfig;
use fofou_common::draft::SubmissionDraft;
use fofou_common::post::TopicId;
use fofou_common::prefs::{MemoryStore, Preferences};
use fofou_common::submit::{SubmitOutcome, SubmitRequest, Submitter};
use fofou_common::token::IdempotencyToken;
use fofou_common::ForumError;
use fofou_client_integration::harness::ForumSim;
use fofou_client_integration::{init_tracing, RecordingPage, TestButton, TestFile};

type TestSubmitter = Submitter<ForumSim, MemoryStore, RecordingPage>;

fn setup(page: RecordingPage) -> (TestSubmitter, ForumSim, RecordingPage, MemoryStore) {
    init_tracing();
    let sim = ForumSim::new();
    let store = MemoryStore::new();
    let submitter = Submitter::new(
        ForumConfig::default(),
        sim.clone(),
        Preferences::new(store.clone()),
        page.clone(),
    );
    (submitter, sim, page, store)
}

fn draft(subject: &str, message: &str) -> SubmissionDraft<TestFile> {
    let mut draft = SubmissionDraft::new(IdempotencyToken::generate());
    draft.subject = subject.to_string();
    draft.message = message.to_string();
    draft
}

/// Update mode sends only `message` and follows the new post's permalink.
#[tokio::test(flavor = "current_thread")]
async fn update_sends_only_message_and_navigates() {
    let (submitter, sim, page, _) = setup(RecordingPage::default());
    sim.reply_with(r#"{"success":true,"longid":42}"#);

    let outcome = submitter
        .submit(SubmitRequest::new(draft("ignored", "ignored")).with_message("hi"))
        .await;

    assert_eq!(outcome, SubmitOutcome::Navigated("/p/42".into()));
    let req = sim.last_request().expect("one request");
    assert_eq!(req.url, "/api");
    assert_eq!(req.names(), vec!["message"]);
    assert_eq!(req.text("message"), Some("hi"));
    assert_eq!(page.navigations.borrow().as_slice(), ["/p/42"]);
}

/// A too-short message is rejected with the table text and a fresh token.
#[tokio::test(flavor = "current_thread")]
async fn rejection_shows_message_and_rotates_token() {
    let (submitter, sim, page, _) = setup(RecordingPage::default());
    let d = draft("subject", "x");
    let before = d.token.clone();

    let outcome = submitter.submit(SubmitRequest::new(d)).await;

    let SubmitOutcome::Rejected { code, token } = outcome else {
        panic!("expected a rejection");
    };
    assert_eq!(code, Some(ApiErrorCode::MessageTooShort));
    assert_ne!(token, before);
    assert!(token.is_well_formed());
    assert_eq!(page.current_token(), Some(token));
    assert!(page.last_alert().unwrap().contains("正文内容过短"));
    assert_eq!(sim.requests().len(), 1);
}

/// Resubmitting with the rotated token is not mistaken for a duplicate.
#[tokio::test(flavor = "current_thread")]
async fn retry_with_rotated_token_is_accepted() {
    let (submitter, sim, page, _) = setup(RecordingPage::default());
    sim.set_next_longid(77);

    let first = draft("subject", "x");
    let outcome = submitter.submit(SubmitRequest::new(first.clone())).await;
    assert!(matches!(outcome, SubmitOutcome::Rejected { .. }));

    // Same token again: the server has already seen it.
    let mut replay = first.clone();
    replay.message = "long enough now".into();
    let outcome = submitter.submit(SubmitRequest::new(replay)).await;
    assert_eq!(
        outcome,
        SubmitOutcome::Rejected {
            code: Some(ApiErrorCode::BadRequest),
            token: page.current_token().unwrap(),
        }
    );

    let mut retry = first;
    retry.message = "long enough now".into();
    retry.token = page.current_token().unwrap();
    let outcome = submitter.submit(SubmitRequest::new(retry)).await;
    assert_eq!(outcome, SubmitOutcome::Navigated("/p/77".into()));
}

/// Every known code is shown with its table text; unknown codes show no text.
#[tokio::test(flavor = "current_thread")]
async fn every_error_code_maps_to_its_message() {
    let (submitter, sim, page, _) = setup(RecordingPage::default());
    for code in ApiErrorCode::known() {
        sim.reply_with(&format!(r#"{{"success":false,"error":"{}"}}"#, code.as_str()));
        submitter.submit(SubmitRequest::new(draft("s", "m"))).await;
        let alert = page.last_alert().unwrap();
        assert_eq!(
            alert,
            format!("发生错误：\ncode: {}\n{}", code.as_str(), code.message().unwrap())
        );
    }

    sim.reply_with(r#"{"success":false,"error":"flood-control"}"#);
    let outcome = submitter.submit(SubmitRequest::new(draft("s", "m"))).await;
    assert!(matches!(
        outcome,
        SubmitOutcome::Rejected { code: Some(ApiErrorCode::Unknown(ref c)), .. } if c == "flood-control"
    ));
    assert_eq!(page.last_alert().unwrap(), "发生错误：\ncode: flood-control\n");
}

/// Options are remembered exactly as submitted, empty when absent.
#[tokio::test(flavor = "current_thread")]
async fn successful_post_persists_options() {
    let (submitter, _sim, _page, store) = setup(RecordingPage::default());
    let prefs = Preferences::new(store);

    let mut d = draft("s", "hello world");
    d.options = Some("sage".into());
    submitter.submit(SubmitRequest::new(d)).await;
    assert_eq!(prefs.options().as_deref(), Some("sage"));

    submitter.submit(SubmitRequest::new(draft("s", "hello again"))).await;
    assert_eq!(prefs.options().as_deref(), Some(""));
}

/// Failed submissions leave the remembered options alone.
#[tokio::test(flavor = "current_thread")]
async fn failed_post_keeps_previous_options() {
    let (submitter, _sim, _page, store) = setup(RecordingPage::default());
    let prefs = Preferences::new(store);
    prefs.save_options("previous").unwrap();

    let mut d = draft("s", "x");
    d.options = Some("new".into());
    submitter.submit(SubmitRequest::new(d)).await;
    assert_eq!(prefs.options().as_deref(), Some("previous"));
}

/// The redirect marker keeps the poster on the page.
#[tokio::test(flavor = "current_thread")]
async fn no_redirect_marker_reloads() {
    let (submitter, _sim, page, _) = setup(RecordingPage::default());
    let mut d = draft("s", "hello world");
    d.options = Some("sage nonoko".into());

    let outcome = submitter.submit(SubmitRequest::new(d)).await;

    assert_eq!(outcome, SubmitOutcome::Reloaded);
    assert_eq!(page.reloads.get(), 1);
    assert!(page.navigations.borrow().is_empty());
}

/// A reply carries the full draft, including image and captcha proof.
#[tokio::test(flavor = "current_thread")]
async fn reply_payload_fields() {
    let (submitter, sim, _page, _) = setup(RecordingPage::with_captcha("03AGdBq2"));
    sim.add_topic(12, false);
    sim.require_captcha(true);

    let mut d = draft("", "replying with a picture");
    d.topic = TopicId(12);
    d.image = Some(TestFile::new("cat.PNG", b"\x89PNG"));
    let token = d.token.clone();

    let outcome = submitter.submit(SubmitRequest::new(d)).await;

    assert!(matches!(outcome, SubmitOutcome::Navigated(_)));
    let req = sim.last_request().unwrap();
    assert_eq!(
        req.names(),
        vec!["subject", "message", "image", "topic", "uuid", "options", "token"]
    );
    assert_eq!(req.text("topic"), Some("12"));
    assert_eq!(req.text("uuid"), Some(token.as_str()));
    assert_eq!(req.text("token"), Some("03AGdBq2"));
    assert_eq!(req.file().unwrap().name, "cat.PNG");
}

/// Without a captcha widget the field is simply left out.
#[tokio::test(flavor = "current_thread")]
async fn missing_captcha_is_not_fatal() {
    let (submitter, sim, page, _) = setup(RecordingPage::default());
    sim.require_captcha(true);

    submitter.submit(SubmitRequest::new(draft("s", "hello world"))).await;

    let req = sim.last_request().unwrap();
    assert!(req.text("token").is_none());
    assert!(page.last_alert().unwrap().contains("请完成验证"));
}

/// Image checks surface the matching codes.
#[tokio::test(flavor = "current_thread")]
async fn image_rejections() {
    let (submitter, sim, page, _) = setup(RecordingPage::default());

    let mut d = draft("s", "");
    d.image = Some(TestFile::new("notes.txt", b"hi"));
    submitter.submit(SubmitRequest::new(d)).await;
    assert!(page.last_alert().unwrap().contains("图片格式不支持"));

    sim.disable_image_upload(true);
    let mut d = draft("s", "");
    d.image = Some(TestFile::new("cat.jpg", b"\xff\xd8"));
    submitter.submit(SubmitRequest::new(d)).await;
    assert!(page.last_alert().unwrap().contains("禁止上传图片"));
}

/// Replies to a locked topic are refused.
#[tokio::test(flavor = "current_thread")]
async fn locked_topic() {
    let (submitter, sim, page, _) = setup(RecordingPage::default());
    sim.add_topic(3, true);
    let mut d = draft("", "too late to reply");
    d.topic = TopicId(3);

    submitter.submit(SubmitRequest::new(d)).await;

    assert!(page.last_alert().unwrap().contains("主题已被锁定"));
}

/// The button is disabled for the request and re-enabled afterwards,
/// whatever the result.
#[tokio::test(flavor = "current_thread")]
async fn trigger_disabled_during_request() {
    let (submitter, sim, _page, _) = setup(RecordingPage::default());

    let button = TestButton::default();
    submitter
        .submit(SubmitRequest::new(draft("s", "hello world")).with_trigger(&button))
        .await;
    assert_eq!(button.history.borrow().as_slice(), [true, false]);

    sim.reply_with("not json");
    let button = TestButton::default();
    submitter
        .submit(SubmitRequest::new(draft("s", "hello world")).with_trigger(&button))
        .await;
    assert_eq!(button.history.borrow().as_slice(), [true, false]);
    assert!(!button.disabled.get());
}

/// Unparseable bodies are reported verbatim and the token is kept.
#[tokio::test(flavor = "current_thread")]
async fn malformed_body_is_reported_without_rotation() {
    let (submitter, sim, page, _) = setup(RecordingPage::default());
    sim.reply_with("<html>502 Bad Gateway</html>");

    let outcome = submitter.submit(SubmitRequest::new(draft("s", "hello world"))).await;

    assert!(matches!(outcome, SubmitOutcome::Failed(ForumError::MalformedResponse(_))));
    assert!(page.last_alert().unwrap().starts_with("发生错误：\nmalformed response"));
    assert_eq!(page.current_token(), None);
}

/// Transport failures are reported and nothing is retried.
#[tokio::test(flavor = "current_thread")]
async fn offline_submission() {
    let (submitter, sim, page, _) = setup(RecordingPage::default());
    sim.set_offline(true);

    let outcome = submitter.submit(SubmitRequest::new(draft("s", "hello world"))).await;

    assert_eq!(
        outcome,
        SubmitOutcome::Failed(ForumError::Transport("connection refused".into()))
    );
    assert_eq!(page.alerts.borrow().len(), 1);
    assert!(sim.requests().is_empty());
}

/// A success callback runs instead of navigation.
#[tokio::test(flavor = "current_thread")]
async fn success_callback_runs_once() {
    let (submitter, _sim, page, _) = setup(RecordingPage::default());
    let calls = std::cell::Cell::new(0);

    let outcome = submitter
        .submit(
            SubmitRequest::new(draft("s", "x"))
                .with_message("edited body")
                .on_success(|| calls.set(calls.get() + 1)),
        )
        .await;

    assert_eq!(outcome, SubmitOutcome::Callback);
    assert_eq!(calls.get(), 1);
    assert!(page.navigations.borrow().is_empty());
    assert_eq!(page.reloads.get(), 0);
}

/// A moderator command answers with the applied operation and no post id,
/// so the page reloads in place.
#[tokio::test(flavor = "current_thread")]
async fn moderator_operation_reloads() {
    let (submitter, sim, page, _) = setup(RecordingPage::default());
    sim.reply_with(r#"{"success":true,"mod-operation":"!!lock","topic":12}"#);

    let outcome = submitter
        .submit(SubmitRequest::new(draft("s", "m")).with_message("!!lock"))
        .await;

    assert_eq!(outcome, SubmitOutcome::Reloaded);
    assert_eq!(page.reloads.get(), 1);
    assert!(page.navigations.borrow().is_empty());
}
