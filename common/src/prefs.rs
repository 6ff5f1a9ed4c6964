//! Browser-side preferences kept in a string key/value store.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::config::{KEY_FOLD, KEY_HIDE_LOOKS, KEY_IMAGE_VIEW, KEY_OPTIONS};
use crate::error::ForumError;
use crate::fold::FoldMap;

/// Persistent string storage, `localStorage` in the browser.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, ForumError>;
    fn set(&self, key: &str, value: &str) -> Result<(), ForumError>;
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for Rc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, ForumError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ForumError> {
        (**self).set(key, value)
    }
}

/// In-memory store for tests and non-browser builds.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, ForumError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ForumError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// How clicking a thumbnail behaves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ImageViewMode {
    /// Enlarge in place, fetching the full image once.
    #[default]
    Expand,
    /// Open the image URL in a new tab.
    NewTab,
}

impl ImageViewMode {
    /// Interpret a stored value; anything unrecognized selects the alternative.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            None | Some("expand") => ImageViewMode::Expand,
            Some(_) => ImageViewMode::NewTab,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageViewMode::Expand => "expand",
            ImageViewMode::NewTab => "tab",
        }
    }
}

/// Look of a folded post.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HideLooks {
    /// Grayed-out header, class `fold`.
    #[default]
    Gray,
    /// Header hidden as well, class `fold fold-hide`.
    Hide,
}

impl HideLooks {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            None | Some("gray") => HideLooks::Gray,
            Some(_) => HideLooks::Hide,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HideLooks::Gray => "gray",
            HideLooks::Hide => "hide",
        }
    }

    /// CSS class(es) added to the post container while folded.
    pub fn fold_class(&self) -> &'static str {
        match self {
            HideLooks::Gray => "fold",
            HideLooks::Hide => "fold fold-hide",
        }
    }
}

/// Typed view over the four preference keys.
#[derive(Clone, Debug)]
pub struct Preferences<S> {
    store: S,
}

impl<S: PreferenceStore> Preferences<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn image_view(&self) -> ImageViewMode {
        ImageViewMode::parse(self.read(KEY_IMAGE_VIEW).as_deref())
    }

    pub fn set_image_view(&self, mode: ImageViewMode) -> Result<(), ForumError> {
        self.store.set(KEY_IMAGE_VIEW, mode.as_str())
    }

    pub fn hide_looks(&self) -> HideLooks {
        HideLooks::parse(self.read(KEY_HIDE_LOOKS).as_deref())
    }

    pub fn set_hide_looks(&self, looks: HideLooks) -> Result<(), ForumError> {
        self.store.set(KEY_HIDE_LOOKS, looks.as_str())
    }

    /// The stored fold map; empty when nothing was stored yet. Data that
    /// cannot be parsed is an error so callers never overwrite it.
    pub fn fold_map(&self) -> Result<FoldMap, ForumError> {
        match self.store.get(KEY_FOLD)? {
            Some(json) => FoldMap::from_json(&json).inspect_err(|e| {
                tracing::warn!("Unreadable fold map: {e}");
            }),
            None => Ok(FoldMap::default()),
        }
    }

    pub fn save_fold_map(&self, map: &FoldMap) -> Result<(), ForumError> {
        self.store.set(KEY_FOLD, &map.to_json()?)
    }

    pub fn options(&self) -> Option<String> {
        self.read(KEY_OPTIONS)
    }

    pub fn save_options(&self, options: &str) -> Result<(), ForumError> {
        self.store.set(KEY_OPTIONS, options)
    }

    fn read(&self, key: &str) -> Option<String> {
        self.store.get(key).unwrap_or_else(|e| {
            tracing::warn!("Failed to read preference {key}: {e}");
            None
        })
    }
}
