//! Endpoints, storage keys and layout constants used by the client.
//!
//! Paths are relative to the forum origin unless `FOFOU_BASE_URL` is set at
//! compile time, e.g. `FOFOU_BASE_URL=https://forum.example.org`.

/// localStorage key holding the image display mode.
pub const KEY_IMAGE_VIEW: &str = "image-view";
/// localStorage key holding the JSON fold map.
pub const KEY_FOLD: &str = "fold";
/// localStorage key holding the fold look (`gray` or anything else).
pub const KEY_HIDE_LOOKS: &str = "hide-looks";
/// localStorage key echoing the last successful submission options.
pub const KEY_OPTIONS: &str = "options";

const DEFAULT_API_PATH: &str = "/api";
const DEFAULT_CRYPTO_LIB_PATH: &str = "/s/openpgp.min.js";
const DEFAULT_NO_REDIRECT_MARKER: &str = "nonoko";
const DEFAULT_DROPDOWN_MARGIN: f64 = 5.0;

#[derive(Clone, Debug, PartialEq)]
pub struct ForumConfig {
    /// Prefix prepended to every server path. Empty for same-origin.
    pub base_url: String,
    pub api_path: String,
    pub crypto_lib_url: String,
    /// Options substring that keeps the browser on the current page after posting.
    pub no_redirect_marker: String,
    /// Extra pixels removed from an overflowing dropdown.
    pub dropdown_margin: f64,
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_path: DEFAULT_API_PATH.to_string(),
            crypto_lib_url: DEFAULT_CRYPTO_LIB_PATH.to_string(),
            no_redirect_marker: DEFAULT_NO_REDIRECT_MARKER.to_string(),
            dropdown_margin: DEFAULT_DROPDOWN_MARGIN,
        }
    }
}

impl ForumConfig {
    /// Build the configuration from compile-time overrides.
    pub fn from_env() -> Self {
        let base_url = option_env!("FOFOU_BASE_URL")
            .unwrap_or("")
            .trim_end_matches('/')
            .to_string();
        let crypto_lib_url = match option_env!("FOFOU_CRYPTO_LIB_URL") {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => format!("{}{}", base_url, DEFAULT_CRYPTO_LIB_PATH),
        };
        Self {
            base_url,
            crypto_lib_url,
            ..Self::default()
        }
    }

    /// Absolute or origin-relative URL of the submission endpoint.
    pub fn api_url(&self) -> String {
        self.url(&self.api_path)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
