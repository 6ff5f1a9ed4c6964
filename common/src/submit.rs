//! Posting new topics, replies and single-field updates to `POST /api`.

use crate::api_error::ApiErrorCode;
use crate::config::ForumConfig;
use crate::draft::{FormField, Payload, SubmissionDraft};
use crate::envelope::{ErrorReport, ResponseEnvelope};
use crate::error::ForumError;
use crate::prefs::{PreferenceStore, Preferences};
use crate::token::IdempotencyToken;

/// Sends a multipart form and returns the response body.
#[allow(async_fn_in_trait)]
pub trait ApiTransport {
    /// File handle type carried by image fields.
    type Attachment;

    async fn post_form(
        &self,
        url: &str,
        fields: Vec<FormField<Self::Attachment>>,
    ) -> Result<String, ForumError>;
}

/// Page-level effects of a submission.
pub trait PageHost {
    fn alert(&self, message: &str);
    fn navigate(&self, url: &str);
    fn reload(&self);
    /// Response of the captcha widget, `None` when there is no widget or it failed.
    fn captcha_token(&self) -> Option<String>;
    /// Hand the composer the token its next attempt must carry.
    fn replace_token(&self, token: IdempotencyToken);
}

/// Control disabled while a request is in flight.
pub trait Trigger {
    fn set_disabled(&self, disabled: bool);
}

pub struct SubmitRequest<'a, A> {
    pub trigger: Option<&'a dyn Trigger>,
    /// When set, only `message` is sent.
    pub preset_message: Option<String>,
    pub draft: SubmissionDraft<A>,
    /// Replaces the default navigation after success.
    pub on_success: Option<Box<dyn FnOnce() + 'a>>,
}

impl<'a, A> SubmitRequest<'a, A> {
    pub fn new(draft: SubmissionDraft<A>) -> Self {
        Self {
            trigger: None,
            preset_message: None,
            draft,
            on_success: None,
        }
    }

    pub fn with_trigger(mut self, trigger: &'a dyn Trigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.preset_message = Some(message.into());
        self
    }

    pub fn on_success(mut self, callback: impl FnOnce() + 'a) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }
}

/// What a submission ended up doing.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    Callback,
    Navigated(String),
    Reloaded,
    /// `success: false`; the composer now holds `token`.
    Rejected {
        code: Option<ApiErrorCode>,
        token: IdempotencyToken,
    },
    /// Transport or decoding failure, reported verbatim.
    Failed(ForumError),
}

pub struct Submitter<T, S, H> {
    config: ForumConfig,
    transport: T,
    prefs: Preferences<S>,
    host: H,
}

impl<T, S, H> Submitter<T, S, H>
where
    T: ApiTransport,
    S: PreferenceStore,
    H: PageHost,
{
    pub fn new(config: ForumConfig, transport: T, prefs: Preferences<S>, host: H) -> Self {
        Self {
            config,
            transport,
            prefs,
            host,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn prefs(&self) -> &Preferences<S> {
        &self.prefs
    }

    /// Send exactly one request and act on the reply. The trigger is
    /// re-enabled whatever the result.
    pub async fn submit(&self, request: SubmitRequest<'_, T::Attachment>) -> SubmitOutcome {
        let SubmitRequest {
            trigger,
            preset_message,
            mut draft,
            on_success,
        } = request;

        if let Some(trigger) = trigger {
            trigger.set_disabled(true);
        }

        let options = draft.options_or_empty().to_string();
        let token = draft.token.clone();
        let update = preset_message.as_deref().is_some_and(|m| !m.is_empty());
        if !update && draft.captcha.is_none() {
            draft.captcha = self.host.captcha_token();
        }
        let fields = Payload::build(draft, preset_message).into_fields();
        tracing::debug!("Submitting {} field(s), update={update}", fields.len());

        let reply = self
            .transport
            .post_form(&self.config.api_url(), fields)
            .await
            .and_then(|body| ResponseEnvelope::parse(&body));

        let outcome = match reply {
            Ok(resp) if resp.success => self.accepted(&resp, &options, on_success),
            Ok(resp) => {
                self.host
                    .alert(&ErrorReport::Rejected(resp.error.clone()).text());
                let next = token.rotate();
                self.host.replace_token(next.clone());
                tracing::info!("Submission rejected: {:?}", resp.error);
                SubmitOutcome::Rejected {
                    code: resp.error,
                    token: next,
                }
            }
            Err(e) => {
                tracing::error!("Submission failed: {e}");
                self.host.alert(&ErrorReport::Failed(e.clone()).text());
                SubmitOutcome::Failed(e)
            }
        };

        if let Some(trigger) = trigger {
            trigger.set_disabled(false);
        }
        outcome
    }

    fn accepted(
        &self,
        resp: &ResponseEnvelope,
        options: &str,
        on_success: Option<Box<dyn FnOnce() + '_>>,
    ) -> SubmitOutcome {
        match &resp.mod_operation {
            Some(op) => tracing::info!("Moderator operation applied: {op}"),
            None => tracing::debug!(
                "Accepted as topic {:?} post {:?}",
                resp.topic,
                resp.post
            ),
        }
        if let Err(e) = self.prefs.save_options(options) {
            tracing::warn!("Failed to remember submission options: {e}");
        }
        if let Some(callback) = on_success {
            callback();
            return SubmitOutcome::Callback;
        }
        match resp.post_id() {
            Some(post) if !options.contains(self.config.no_redirect_marker.as_str()) => {
                let url = post.permalink(&self.config);
                self.host.navigate(&url);
                SubmitOutcome::Navigated(url)
            }
            _ => {
                self.host.reload();
                SubmitOutcome::Reloaded
            }
        }
    }
}
