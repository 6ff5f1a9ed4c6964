//! Thumbnail enlargement with a one-time full-size download.

use crate::error::ForumError;
use crate::prefs::ImageViewMode;

/// Progress label shown when the download fails.
pub const LOAD_FAILED: &str = "加载失败";

#[derive(Clone, Debug, Default, PartialEq)]
pub enum LoadState {
    #[default]
    Unloaded,
    Loading,
    /// Local object URL of the downloaded image.
    Loaded(String),
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageAction {
    OpenInNewTab,
    /// Start the download, reporting through [`ImageState::progress`]
    /// and finishing with [`ImageState::settle`].
    Fetch,
    /// Enlarged using the already downloaded image.
    Show,
    Shrink,
    /// A download is in flight.
    Ignore,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ImageState {
    pub enlarged: bool,
    pub load: LoadState,
    /// Text of the progress label next to the image.
    pub label: String,
}

impl ImageState {
    pub fn toggle(&mut self, mode: ImageViewMode) -> ImageAction {
        if mode == ImageViewMode::NewTab {
            return ImageAction::OpenInNewTab;
        }
        if self.load == LoadState::Loading {
            return ImageAction::Ignore;
        }
        if self.enlarged {
            self.enlarged = false;
            return ImageAction::Shrink;
        }
        self.enlarged = true;
        if matches!(self.load, LoadState::Loaded(_)) {
            return ImageAction::Show;
        }
        self.load = LoadState::Loading;
        self.label = "0%".to_string();
        ImageAction::Fetch
    }

    /// Update the label from a transfer progress event.
    pub fn progress(&mut self, loaded: f64, total: f64) {
        if self.load != LoadState::Loading {
            return;
        }
        if let Some(label) = progress_label(loaded, total) {
            self.label = label;
        }
    }

    pub fn settle(&mut self, result: Result<String, ForumError>) {
        if self.load != LoadState::Loading {
            return;
        }
        match result {
            Ok(url) => {
                self.load = LoadState::Loaded(url);
                self.label.clear();
            }
            Err(e) => {
                tracing::warn!("Image download failed: {e}");
                self.load = LoadState::Failed;
                self.label = LOAD_FAILED.to_string();
            }
        }
    }

    pub fn class(&self) -> &'static str {
        if self.enlarged {
            "image-large"
        } else {
            "image"
        }
    }

    /// Source to display: the downloaded image once available, else the thumbnail.
    pub fn src<'a>(&'a self, thumbnail: &'a str) -> &'a str {
        match &self.load {
            LoadState::Loaded(url) => url,
            _ => thumbnail,
        }
    }
}

/// Events that end a download request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferEnd {
    Load,
    Error,
    Abort,
    Timeout,
}

impl TransferEnd {
    pub const ALL: [TransferEnd; 4] = [
        TransferEnd::Load,
        TransferEnd::Error,
        TransferEnd::Abort,
        TransferEnd::Timeout,
    ];

    /// DOM event name on `XMLHttpRequest`.
    pub fn event_name(&self) -> &'static str {
        match self {
            TransferEnd::Load => "load",
            TransferEnd::Error => "error",
            TransferEnd::Abort => "abort",
            TransferEnd::Timeout => "timeout",
        }
    }

    pub fn result(&self) -> Result<(), ForumError> {
        match self {
            TransferEnd::Load => Ok(()),
            TransferEnd::Error => Err(ForumError::Transport("network error".into())),
            TransferEnd::Abort => Err(ForumError::Transport("download aborted".into())),
            TransferEnd::Timeout => Err(ForumError::Transport("download timed out".into())),
        }
    }
}

/// Integer percentage, `None` when the total size is unknown.
pub fn progress_label(loaded: f64, total: f64) -> Option<String> {
    if total.is_nan() || total <= 0.0 || !loaded.is_finite() {
        return None;
    }
    let pct = ((loaded / total) * 100.0).clamp(0.0, 100.0) as u32;
    Some(format!("{pct}%"))
}
