use std::cell::{Cell, RefCell};
use std::rc::Rc;

use fofou_common::submit::{PageHost, Trigger};
use fofou_common::token::IdempotencyToken;

pub mod harness;

/// Install a test subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Image picked in the composer.
#[derive(Clone, Debug, PartialEq)]
pub struct TestFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl TestFile {
    pub fn new(name: &str, bytes: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            bytes: bytes.to_vec(),
        }
    }
}

/// Page host that records every effect instead of touching a browser.
#[derive(Clone, Default)]
pub struct RecordingPage {
    pub alerts: Rc<RefCell<Vec<String>>>,
    pub navigations: Rc<RefCell<Vec<String>>>,
    pub reloads: Rc<Cell<u32>>,
    /// Token the composer currently holds; replaced after a rejection.
    pub token: Rc<RefCell<Option<IdempotencyToken>>>,
    pub captcha: Option<String>,
}

impl RecordingPage {
    pub fn with_captcha(token: &str) -> Self {
        Self {
            captcha: Some(token.to_string()),
            ..Self::default()
        }
    }

    pub fn last_alert(&self) -> Option<String> {
        self.alerts.borrow().last().cloned()
    }

    pub fn current_token(&self) -> Option<IdempotencyToken> {
        self.token.borrow().clone()
    }
}

impl PageHost for RecordingPage {
    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }

    fn navigate(&self, url: &str) {
        self.navigations.borrow_mut().push(url.to_string());
    }

    fn reload(&self) {
        self.reloads.set(self.reloads.get() + 1);
    }

    fn captcha_token(&self) -> Option<String> {
        self.captcha.clone()
    }

    fn replace_token(&self, token: IdempotencyToken) {
        *self.token.borrow_mut() = Some(token);
    }
}

/// Submit button stand-in tracking its disabled attribute.
#[derive(Default)]
pub struct TestButton {
    pub disabled: Cell<bool>,
    /// Every value ever written, in order.
    pub history: RefCell<Vec<bool>>,
}

impl Trigger for TestButton {
    fn set_disabled(&self, disabled: bool) {
        self.disabled.set(disabled);
        self.history.borrow_mut().push(disabled);
    }
}
