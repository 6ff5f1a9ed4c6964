use dioxus::prelude::*;

use fofou_common::draft::{has_option, toggle_option, SubmissionDraft};
use fofou_common::post::TopicId;
use fofou_common::submit::SubmitRequest;
use fofou_common::token::IdempotencyToken;

use super::dropdown::Dropdown;
use super::platform::selected_file;
use super::services::{use_services, SignalTrigger};
use super::sign_panel::SignPanel;

const IMAGE_INPUT_ID: &str = "select-image";
const OPTION_SAGE: &str = "sage";

/// New-topic or reply form. `TopicId::NEW` starts a topic.
#[component]
pub fn Composer(topic: TopicId) -> Element {
    let services = use_services();
    let token = use_signal(IdempotencyToken::generate);
    let mut subject = use_signal(String::new);
    let mut message = use_signal(String::new);
    let mut options = use_signal(|| services.prefs.options().unwrap_or_default());
    let busy = use_signal(|| false);
    let mut signing = use_signal(|| false);

    let no_redirect = services.config.no_redirect_marker.clone();
    let submit_services = services.clone();
    let submit = move |_: MouseEvent| {
        let mut draft = SubmissionDraft::new(token.read().clone());
        draft.subject = subject.read().trim().to_string();
        draft.message = message.read().clone();
        draft.image = selected_file(IMAGE_INPUT_ID);
        draft.topic = topic;
        draft.options = Some(options.read().clone());

        let submitter = submit_services.submitter(token);
        spawn(async move {
            let trigger = SignalTrigger(busy);
            let outcome = submitter
                .submit(SubmitRequest::new(draft).with_trigger(&trigger))
                .await;
            tracing::debug!("Submission finished: {outcome:?}");
        });
    };

    let is_busy = busy();
    let is_signing = signing();
    let current_options = options.read().clone();
    let sage = has_option(&current_options, OPTION_SAGE);
    let stay = has_option(&current_options, &no_redirect);
    let marker = no_redirect.clone();
    let heading = if topic.is_new() { "发表新主题" } else { "回复" };

    rsx! {
        form { class: "composer",
            onsubmit: move |evt| evt.prevent_default(),
            h3 { "{heading}" }
            if topic.is_new() {
                div { class: "form-group",
                    input {
                        r#type: "text",
                        placeholder: "标题",
                        value: "{subject}",
                        oninput: move |evt| subject.set(evt.value()),
                    }
                }
            }
            div { class: "form-group",
                textarea {
                    placeholder: "内容",
                    value: "{message}",
                    oninput: move |evt| message.set(evt.value()),
                }
            }
            div { class: "form-group",
                input { r#type: "file", id: IMAGE_INPUT_ID, accept: "image/*" }
            }
            Dropdown { id: "composer-options", title: "选项",
                label {
                    input {
                        r#type: "checkbox",
                        checked: sage,
                        onchange: move |_| {
                            let next = toggle_option(&options.read(), OPTION_SAGE);
                            options.set(next);
                        },
                    }
                    " sage"
                }
                label {
                    input {
                        r#type: "checkbox",
                        checked: stay,
                        onchange: move |_| {
                            let next = toggle_option(&options.read(), &marker);
                            options.set(next);
                        },
                    }
                    " {no_redirect}"
                }
                input {
                    r#type: "text",
                    placeholder: "options",
                    value: "{current_options}",
                    oninput: move |evt| options.set(evt.value()),
                }
            }
            div { class: "composer-actions",
                button {
                    r#type: "button",
                    onclick: move |_| signing.set(!is_signing),
                    if is_signing { "取消签名" } else { "PGP 签名" }
                }
                button {
                    r#type: "button",
                    class: "submit",
                    disabled: is_busy,
                    onclick: submit,
                    if is_busy { "发送中..." } else { "发送" }
                }
            }
            if is_signing {
                SignPanel {
                    text: message(),
                    on_signed: move |signed: String| {
                        message.set(signed);
                        signing.set(false);
                    },
                }
            }
        }
    }
}
