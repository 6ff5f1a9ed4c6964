use crate::post::TopicId;
use crate::token::IdempotencyToken;

/// One multipart field of a submission.
#[derive(Clone, Debug, PartialEq)]
pub struct FormField<A> {
    pub name: &'static str,
    pub value: FormValue<A>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FormValue<A> {
    Text(String),
    /// Platform file handle, e.g. a browser `File`.
    File(A),
}

impl<A> FormField<A> {
    fn text(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: FormValue::Text(value.into()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            FormValue::Text(s) => Some(s),
            FormValue::File(_) => None,
        }
    }
}

/// Everything the composer holds for one submission attempt.
#[derive(Clone, Debug)]
pub struct SubmissionDraft<A> {
    pub subject: String,
    pub message: String,
    pub image: Option<A>,
    pub topic: TopicId,
    pub token: IdempotencyToken,
    pub options: Option<String>,
    /// Proof from the captcha widget, when one could be read.
    pub captcha: Option<String>,
}

impl<A> SubmissionDraft<A> {
    pub fn new(token: IdempotencyToken) -> Self {
        Self {
            subject: String::new(),
            message: String::new(),
            image: None,
            topic: TopicId::NEW,
            token,
            options: None,
            captcha: None,
        }
    }

    /// Options string as persisted after a successful post.
    pub fn options_or_empty(&self) -> &str {
        self.options.as_deref().unwrap_or("")
    }
}

/// Body of one `POST /api`.
#[derive(Clone, Debug)]
pub enum Payload<A> {
    /// Single-field update carrying only `message`.
    Update { message: String },
    NewPost(SubmissionDraft<A>),
}

impl<A> Payload<A> {
    /// A preset message switches the payload to update mode.
    pub fn build(draft: SubmissionDraft<A>, preset_message: Option<String>) -> Self {
        match preset_message {
            Some(message) if !message.is_empty() => Payload::Update { message },
            _ => Payload::NewPost(draft),
        }
    }

    pub fn is_update(&self) -> bool {
        matches!(self, Payload::Update { .. })
    }

    /// Multipart fields in the order the endpoint reads them.
    pub fn into_fields(self) -> Vec<FormField<A>> {
        match self {
            Payload::Update { message } => vec![FormField::text("message", message)],
            Payload::NewPost(draft) => {
                let mut fields = vec![
                    FormField::text("subject", draft.subject),
                    FormField::text("message", draft.message),
                ];
                if let Some(image) = draft.image {
                    fields.push(FormField {
                        name: "image",
                        value: FormValue::File(image),
                    });
                }
                fields.push(FormField::text("topic", draft.topic.to_string()));
                fields.push(FormField::text("uuid", draft.token.as_str()));
                fields.push(FormField::text("options", draft.options.unwrap_or_default()));
                if let Some(token) = draft.captcha {
                    fields.push(FormField::text("token", token));
                }
                fields
            }
        }
    }
}

/// Whether a space-separated options string contains `word`.
pub fn has_option(options: &str, word: &str) -> bool {
    options.split_whitespace().any(|w| w == word)
}

/// Add `word` to the options string, or remove it if present.
pub fn toggle_option(options: &str, word: &str) -> String {
    let mut words: Vec<&str> = options.split_whitespace().collect();
    if let Some(pos) = words.iter().position(|w| *w == word) {
        words.remove(pos);
    } else {
        words.push(word);
    }
    words.join(" ")
}
