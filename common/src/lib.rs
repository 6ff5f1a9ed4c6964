pub mod api_error;
pub mod config;
pub mod draft;
pub mod envelope;
pub mod error;
pub mod fold;
pub mod image;
pub mod markup;
pub mod post;
pub mod prefs;
pub mod reference;
pub mod signing;
pub mod submit;
pub mod token;
pub mod viewport;

pub use error::ForumError;
