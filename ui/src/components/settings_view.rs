use dioxus::prelude::*;

use fofou_common::prefs::{HideLooks, ImageViewMode};

use super::platform::clog;
use super::services::use_services;

/// Editor for the `image-view` and `hide-looks` preferences.
#[component]
pub fn SettingsView() -> Element {
    let services = use_services();
    let mut image_view = use_signal(|| services.prefs.image_view());
    let mut hide_looks = use_signal(|| services.prefs.hide_looks());

    let view_prefs = services.prefs.clone();
    let looks_prefs = services.prefs.clone();
    let image_view_value = image_view().as_str();
    let hide_looks_value = hide_looks().as_str();

    rsx! {
        div { class: "settings",
            h2 { "设置" }
            div { class: "form-group",
                label { "图片查看方式" }
                select {
                    value: "{image_view_value}",
                    onchange: move |evt| {
                        let mode = ImageViewMode::parse(Some(evt.value().as_str()));
                        match view_prefs.set_image_view(mode) {
                            Ok(()) => image_view.set(mode),
                            Err(e) => clog(&format!("[SETTINGS] {e}")),
                        }
                    },
                    option { value: "expand", "原地展开" }
                    option { value: "tab", "新标签页打开" }
                }
            }
            div { class: "form-group",
                label { "折叠样式" }
                select {
                    value: "{hide_looks_value}",
                    onchange: move |evt| {
                        let looks = HideLooks::parse(Some(evt.value().as_str()));
                        match looks_prefs.set_hide_looks(looks) {
                            Ok(()) => hide_looks.set(looks),
                            Err(e) => clog(&format!("[SETTINGS] {e}")),
                        }
                    },
                    option { value: "gray", "灰色" }
                    option { value: "hide", "隐藏" }
                }
            }
        }
    }
}
