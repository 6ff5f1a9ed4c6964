use std::rc::Rc;

use dioxus::prelude::*;

use fofou_common::config::ForumConfig;
use fofou_common::prefs::Preferences;
use fofou_common::signing::LazyLibrary;
use fofou_common::submit::{Submitter, Trigger};
use fofou_common::token::IdempotencyToken;

use super::platform::{BrowserPage, HttpTransport, LocalStorage, ScriptLoader};

/// Client services shared across all components.
///
/// Provided once by `App`; the crypto library is loaded lazily and at most
/// once for the whole page.
#[derive(Clone)]
pub struct ForumServices {
    pub config: ForumConfig,
    pub prefs: Preferences<LocalStorage>,
    pub crypto: Rc<LazyLibrary<ScriptLoader>>,
}

pub type ForumSubmitter = Submitter<HttpTransport, LocalStorage, BrowserPage>;

impl ForumServices {
    pub fn new() -> Self {
        let config = ForumConfig::from_env();
        tracing::info!("Forum client using API at {}", config.api_url());
        let crypto = Rc::new(LazyLibrary::new(ScriptLoader {
            url: config.crypto_lib_url.clone(),
        }));
        Self {
            config,
            prefs: Preferences::new(LocalStorage::default()),
            crypto,
        }
    }

    /// Submitter whose rejections hand the next token to `token`.
    pub fn submitter(&self, token: Signal<IdempotencyToken>) -> ForumSubmitter {
        Submitter::new(
            self.config.clone(),
            HttpTransport,
            self.prefs.clone(),
            BrowserPage { token },
        )
    }
}

pub fn use_services() -> ForumServices {
    use_context::<ForumServices>()
}

/// Submit button state; `true` while a request is in flight.
pub struct SignalTrigger(pub Signal<bool>);

impl Trigger for SignalTrigger {
    fn set_disabled(&self, disabled: bool) {
        let mut busy = self.0;
        busy.set(disabled);
    }
}
