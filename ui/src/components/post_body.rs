use dioxus::prelude::*;

use fofou_common::image::ImageAction;
use fofou_common::markup::PostDocument;
use fofou_common::reference::RefAction;

use super::platform::{clicked_slot, download_image, fetch_raw_post, open_in_new_tab};
use super::services::use_services;

/// Rendered post HTML kept as one node; clicks on its references and
/// images are routed by their `data-slot` id.
#[component]
pub fn PostBody(html: String) -> Element {
    let services = use_services();
    let mut doc = use_signal(move || PostDocument::new(html));

    let onclick = move |evt: MouseEvent| {
        let Some(slot) = clicked_slot(&evt) else {
            return;
        };

        let reference = doc.write().click_reference(&slot);
        if let Some((action, post)) = reference {
            if action == RefAction::Fetch {
                let config = services.config.clone();
                spawn(async move {
                    let result = fetch_raw_post(&config, post).await;
                    doc.write().settle_reference(&slot, result);
                });
            }
            return;
        }

        let mode = services.prefs.image_view();
        let image = doc.write().click_image(&slot, mode);
        let Some((action, url)) = image else {
            return;
        };
        match action {
            ImageAction::OpenInNewTab => open_in_new_tab(&url),
            ImageAction::Fetch => {
                spawn(async move {
                    let progress_slot = slot.clone();
                    let result = download_image(&url, move |loaded, total| {
                        doc.write().image_progress(&progress_slot, loaded, total);
                    })
                    .await;
                    doc.write().settle_image(&slot, result);
                });
            }
            ImageAction::Show | ImageAction::Shrink | ImageAction::Ignore => {}
        }
    };

    let rendered = doc.read().render();

    rsx! {
        div { class: "post-body", onclick, dangerous_inner_html: "{rendered}" }
    }
}
