use dioxus::prelude::*;

use fofou_common::draft::SubmissionDraft;
use fofou_common::error::ForumError;
use fofou_common::post::PostId;
use fofou_common::submit::SubmitRequest;
use fofou_common::token::IdempotencyToken;

use super::foldable_post::FoldablePost;
use super::platform::fetch_raw_post;
use super::post_body::PostBody;
use super::services::{use_services, SignalTrigger};

/// One post, loaded from its raw fragment.
#[component]
pub fn PostView(id: PostId) -> Element {
    let services = use_services();
    let mut fragment = use_signal(|| None::<Result<String, ForumError>>);
    let mut generation = use_signal(|| 0u32);

    let config = services.config.clone();
    use_effect(move || {
        let _ = generation();
        let config = config.clone();
        spawn(async move {
            let result = fetch_raw_post(&config, id).await;
            fragment.set(Some(result));
        });
    });

    let loaded = fragment.read().clone();
    let body = match loaded {
        None => rsx! { p { class: "loading", "加载中..." } },
        Some(Err(e)) => rsx! { div { class: "alert alert-error", "{e}" } },
        Some(Ok(html)) => rsx! {
            FoldablePost { post: id,
                PostBody { key: "{generation}", html }
            }
        },
    };

    rsx! {
        div { class: "post-view",
            {body}
            QuickMessage {
                on_saved: move |_| {
                    let next = generation() + 1;
                    generation.set(next);
                },
            }
        }
    }
}

/// Single-field form: only `message` is sent, and the post is reloaded in
/// place on success instead of navigating away.
#[component]
fn QuickMessage(on_saved: EventHandler<()>) -> Element {
    let services = use_services();
    let token = use_signal(IdempotencyToken::generate);
    let mut command = use_signal(String::new);
    let busy = use_signal(|| false);

    let is_busy = busy();

    rsx! {
        div { class: "quick-message",
            input {
                r#type: "text",
                placeholder: "指令",
                value: "{command}",
                oninput: move |evt| command.set(evt.value()),
            }
            button {
                r#type: "button",
                disabled: is_busy || command.read().trim().is_empty(),
                onclick: move |_| {
                    let text = command.read().trim().to_string();
                    let submitter = services.submitter(token);
                    spawn(async move {
                        let trigger = SignalTrigger(busy);
                        let request = SubmitRequest::new(SubmissionDraft::new(token.read().clone()))
                            .with_trigger(&trigger)
                            .with_message(text)
                            .on_success(move || {
                                command.set(String::new());
                                on_saved.call(());
                            });
                        let outcome = submitter.submit(request).await;
                        tracing::debug!("Message update finished: {outcome:?}");
                    });
                },
                "提交"
            }
        }
    }
}
