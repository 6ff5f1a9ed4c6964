//! In-memory stand-ins for the forum server endpoints.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use serde_json::json;

use fofou_common::draft::{FormField, FormValue};
use fofou_common::image::ImageState;
use fofou_common::markup::PostDocument;
use fofou_common::post::PostId;
use fofou_common::reference::{RefAction, RefState};
use fofou_common::submit::ApiTransport;
use fofou_common::ForumError;

use crate::TestFile;

/// One request as it reached the simulated `/api`.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub url: String,
    pub fields: Vec<FormField<TestFile>>,
}

impl RecordedRequest {
    pub fn names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .and_then(|f| f.as_text())
    }

    pub fn file(&self) -> Option<&TestFile> {
        self.fields.iter().find_map(|f| match &f.value {
            FormValue::File(file) => Some(file),
            FormValue::Text(_) => None,
        })
    }
}

#[derive(Debug)]
struct SimState {
    requests: Vec<RecordedRequest>,
    seen_tokens: HashSet<String>,
    topics: HashSet<u32>,
    locked_topics: HashSet<u32>,
    next_longid: u64,
    min_message_len: usize,
    require_captcha: bool,
    image_upload_disabled: bool,
    offline: bool,
    canned_body: Option<String>,
}

/// Simulated submission endpoint applying the server's checks in order.
#[derive(Clone)]
pub struct ForumSim {
    state: Rc<RefCell<SimState>>,
}

impl Default for ForumSim {
    fn default() -> Self {
        Self::new()
    }
}

impl ForumSim {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(SimState {
                requests: Vec::new(),
                seen_tokens: HashSet::new(),
                topics: HashSet::new(),
                locked_topics: HashSet::new(),
                next_longid: 1000,
                min_message_len: 3,
                require_captcha: false,
                image_upload_disabled: false,
                offline: false,
                canned_body: None,
            })),
        }
    }

    pub fn add_topic(&self, topic: u32, locked: bool) {
        let mut s = self.state.borrow_mut();
        s.topics.insert(topic);
        if locked {
            s.locked_topics.insert(topic);
        }
    }

    pub fn set_next_longid(&self, longid: u64) {
        self.state.borrow_mut().next_longid = longid;
    }

    pub fn require_captcha(&self, on: bool) {
        self.state.borrow_mut().require_captcha = on;
    }

    pub fn disable_image_upload(&self, on: bool) {
        self.state.borrow_mut().image_upload_disabled = on;
    }

    pub fn set_offline(&self, on: bool) {
        self.state.borrow_mut().offline = on;
    }

    /// Answer every request with this body, bypassing the checks.
    pub fn reply_with(&self, body: &str) {
        self.state.borrow_mut().canned_body = Some(body.to_string());
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.borrow().requests.clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state.borrow().requests.last().cloned()
    }

    fn handle(&self, request: RecordedRequest) -> Result<String, ForumError> {
        let mut s = self.state.borrow_mut();
        if s.offline {
            return Err(ForumError::Transport("connection refused".into()));
        }
        s.requests.push(request.clone());
        if let Some(body) = &s.canned_body {
            return Ok(body.clone());
        }

        let fail = |code: &str| Ok(json!({ "success": false, "error": code }).to_string());
        let message = request.text("message").unwrap_or("").trim().to_string();

        // Single-field update.
        if request.text("uuid").is_none() {
            if message.len() < s.min_message_len {
                return fail("message-too-short");
            }
            return Ok(json!({ "success": true }).to_string());
        }

        let topic: u32 = request.text("topic").unwrap_or("0").trim().parse().unwrap_or(0);
        if topic > 0 && !s.topics.contains(&topic) {
            return fail("bad-request");
        }
        if s.require_captcha && request.text("token").unwrap_or("").is_empty() {
            return fail("recaptcha-needed");
        }
        let token = request.text("uuid").unwrap_or("").to_string();
        if !s.seen_tokens.insert(token) {
            return fail("bad-request");
        }
        let image = request.file().cloned();
        if image.is_some() && s.image_upload_disabled {
            return fail("image-upload-disabled");
        }
        if message.len() < s.min_message_len && image.is_none() {
            return fail("message-too-short");
        }
        if s.locked_topics.contains(&topic) {
            return fail("topic-locked");
        }
        if let Some(file) = image {
            let name = file.name.to_lowercase();
            if ![".png", ".gif", ".jpg", ".jpeg"].iter().any(|ext| name.ends_with(ext)) {
                return fail("image-invalid-format");
            }
        }

        let longid = s.next_longid;
        s.next_longid += 1;
        Ok(json!({
            "success": true,
            "topic": if topic == 0 { longid as u32 } else { topic },
            "post": 1,
            "longid": longid,
        })
        .to_string())
    }
}

impl ApiTransport for ForumSim {
    type Attachment = TestFile;

    async fn post_form(
        &self,
        url: &str,
        fields: Vec<FormField<TestFile>>,
    ) -> Result<String, ForumError> {
        self.handle(RecordedRequest {
            url: url.to_string(),
            fields,
        })
    }
}

/// Serves `/p/{id}?raw=1` fragments and counts fetches.
#[derive(Clone, Default)]
pub struct FragmentServer {
    posts: Rc<RefCell<HashMap<PostId, String>>>,
    fetches: Rc<RefCell<Vec<PostId>>>,
}

impl FragmentServer {
    pub fn insert(&self, post: PostId, html: &str) {
        self.posts.borrow_mut().insert(post, html.to_string());
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.borrow().len()
    }

    pub async fn fetch_raw(&self, post: PostId) -> Result<String, ForumError> {
        self.fetches.borrow_mut().push(post);
        self.posts
            .borrow()
            .get(&post)
            .cloned()
            .ok_or_else(|| ForumError::Transport(format!("HTTP 404 for /p/{post}?raw=1")))
    }
}

/// A reference link next to the fragment it inserted, like the page's DOM.
#[derive(Debug, Default)]
pub struct ReferenceLink {
    pub state: RefState,
    pub label: String,
}

impl ReferenceLink {
    pub fn new(label: &str) -> Self {
        Self {
            state: RefState::default(),
            label: label.to_string(),
        }
    }

    /// Visible children: the link text, then the inserted fragment if any.
    pub fn children(&self) -> Vec<String> {
        let mut out = vec![self.label.clone()];
        if self.state.is_errored() {
            out[0].push_str(fofou_common::reference::ERROR_MARKER);
        }
        if let Some(html) = self.state.fragment() {
            out.push(html.to_string());
        }
        out
    }

    pub async fn click(&mut self, server: &FragmentServer, post: PostId) -> RefAction {
        let action = self.state.toggle();
        if action == RefAction::Fetch {
            let result = server.fetch_raw(post).await;
            self.state.settle(result);
        }
        action
    }
}

/// Clicks the reference in `slot` the way the post body handler does.
pub async fn click_slot(
    doc: &mut PostDocument,
    server: &FragmentServer,
    slot: &str,
) -> Option<RefAction> {
    let (action, post) = doc.click_reference(slot)?;
    if action == RefAction::Fetch {
        let result = server.fetch_raw(post).await;
        doc.settle_reference(slot, result);
    }
    Some(action)
}

/// Replays a download as a series of progress events and returns the labels seen.
pub fn replay_download(
    state: &mut ImageState,
    total: f64,
    chunks: &[f64],
    result: Result<String, ForumError>,
) -> Vec<String> {
    let mut labels = vec![state.label.clone()];
    let mut loaded = 0.0;
    for chunk in chunks {
        loaded += chunk;
        state.progress(loaded, total);
        labels.push(state.label.clone());
    }
    state.settle(result);
    labels.push(state.label.clone());
    labels
}
