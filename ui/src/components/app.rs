use dioxus::prelude::*;

use fofou_common::post::{PostId, TopicId};

use super::composer::Composer;
use super::post_view::PostView;
use super::services::ForumServices;
use super::settings_view::SettingsView;

#[derive(Clone, Debug, PartialEq, Routable)]
pub enum Route {
    #[layout(AppLayout)]
    #[route("/")]
    Board {},
    #[route("/t/:topic")]
    Topic { topic: TopicId },
    #[route("/p/:id")]
    Post { id: PostId },
    #[route("/settings")]
    Settings {},
}

#[component]
pub fn App() -> Element {
    use_context_provider(ForumServices::new);

    rsx! { Router::<Route> {} }
}

#[component]
fn AppLayout() -> Element {
    rsx! {
        div { class: "fofou-app",
            header { class: "app-header",
                nav {
                    Link { to: Route::Board {}, "首页" }
                    Link { to: Route::Settings {}, "设置" }
                }
            }
            main { Outlet::<Route> {} }
        }
    }
}

/// Route component: composer for a new topic.
#[component]
fn Board() -> Element {
    rsx! { Composer { topic: TopicId::NEW } }
}

/// Route component: reply composer for an existing topic.
#[component]
fn Topic(topic: TopicId) -> Element {
    rsx! { Composer { topic } }
}

/// Route component: a single post by long id.
#[component]
fn Post(id: PostId) -> Element {
    rsx! { PostView { id } }
}

#[component]
fn Settings() -> Element {
    rsx! { SettingsView {} }
}
