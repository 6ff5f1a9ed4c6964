use dioxus::prelude::*;

use super::platform::fit_dropdown;
use super::services::use_services;

/// Button with a panel that is shrunk to stay inside the viewport.
#[component]
pub fn Dropdown(id: String, title: String, children: Element) -> Element {
    let services = use_services();
    let margin = services.config.dropdown_margin;
    let mut open = use_signal(|| false);

    let panel_id = id.clone();
    use_effect(move || {
        if open() {
            fit_dropdown(&panel_id, margin);
        }
    });

    let is_open = open();

    rsx! {
        div { class: "dropdown",
            button {
                r#type: "button",
                onclick: move |_| open.set(!is_open),
                "{title}"
            }
            if is_open {
                div { id: "{id}", class: "dropdown-panel", {children} }
            }
        }
    }
}
