pub mod app;
pub mod composer;
pub mod dropdown;
pub mod foldable_post;
pub mod platform;
pub mod post_body;
pub mod post_view;
pub mod services;
pub mod settings_view;
pub mod sign_panel;
