use dioxus::prelude::*;

use fofou_common::fold::{FoldMap, FoldState};
use fofou_common::post::PostId;

use super::platform::clog;
use super::services::use_services;

/// Post container whose message can be collapsed. The folded state
/// survives reloads through the `fold` preference.
#[component]
pub fn FoldablePost(post: PostId, children: Element) -> Element {
    let services = use_services();
    let mut fold = use_signal(|| {
        let map = services.prefs.fold_map().unwrap_or_else(|e| {
            clog(&format!("[FOLD] Ignoring stored fold state: {e}"));
            FoldMap::default()
        });
        FoldState::restore(&map, post)
    });
    let looks = services.prefs.hide_looks();
    let permalink = post.permalink(&services.config);

    let prefs = services.prefs.clone();
    let toggle = move |_: MouseEvent| {
        if let Err(e) = fold.write().toggle(&prefs, post, chrono::Utc::now()) {
            clog(&format!("[FOLD] Could not save fold state: {e}"));
        }
    };

    let state = *fold.read();
    let container_class = if state.folded {
        format!("post {}", looks.fold_class())
    } else {
        "post".to_string()
    };
    let icon = state.icon_class();
    let message_style = if state.message_visible() {
        ""
    } else {
        "display: none"
    };

    rsx! {
        div { class: "{container_class}", id: "post-{post}",
            div { class: "post-header",
                span { class: "fold-toggle {icon}", onclick: toggle }
                a { href: "{permalink}", "No.{post}" }
            }
            div { class: "post-message", style: "{message_style}", {children} }
        }
    }
}
