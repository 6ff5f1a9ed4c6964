//! Rendered post fragments and the interactive pieces the client drives
//! itself (quoted references and images).
//!
//! A fragment is never split into separate DOM nodes: [`PostDocument`]
//! renders it back as one HTML string in which every reference and image
//! carries a `data-slot` attribute, and a single click handler on the
//! container routes clicks by slot id. Slot ids are paths: `"2"` is the
//! third interactive element of the post, `"2.0"` the first one inside the
//! fragment that reference `"2"` expanded.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::ForumError;
use crate::image::{ImageAction, ImageState};
use crate::post::PostId;
use crate::prefs::ImageViewMode;
use crate::reference::{RefAction, RefState, ERROR_MARKER};

/// Attribute holding the slot id of an interactive element.
pub const SLOT_ATTR: &str = "data-slot";

#[derive(Clone, Debug, PartialEq)]
pub enum Segment {
    Html(String),
    Reference { post: PostId, label: String },
    Image { thumbnail: String, url: String },
}

impl Segment {
    fn is_interactive(&self) -> bool {
        !matches!(self, Segment::Html(_))
    }
}

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r#"<a\s+href=['"]javascript:void\(0\)['"]\s+onclick=['"]_ref\(this,\s*(?P<ref>\d+)\)['"]\s*>(?P<label>.*?)</a>"#,
            r#"|<img\b(?P<img>[^>]*?)/?>"#,
        ))
        .expect("segment pattern is valid")
    })
}

/// `src` as a whole attribute name, so `data-src` does not match.
fn src_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?:^|\s)src\s*=\s*(?:'(?P<sq>[^']*)'|"(?P<dq>[^"]*)")"#)
            .expect("src pattern is valid")
    })
}

fn src_attr(tag: &str) -> Option<&str> {
    let caps = src_pattern().captures(tag)?;
    caps.name("sq").or_else(|| caps.name("dq")).map(|m| m.as_str())
}

/// Image URL passed to `_enlarge(this, '...')` in an `onclick` attribute.
fn enlarge_target(tag: &str) -> Option<&str> {
    let call = tag.find("_enlarge(this,")? + "_enlarge(this,".len();
    let rest = tag[call..].trim_start();
    let quote = rest.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    let rest = &rest[1..];
    rest.find(quote).map(|end| &rest[..end])
}

fn unescape(text: &str) -> String {
    text.replace("&gt;", ">")
        .replace("&lt;", "<")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn segments(html: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut last = 0;
    for caps in pattern().captures_iter(html) {
        let Some(whole) = caps.get(0) else { continue };
        let segment = if let Some(id) = caps.name("ref") {
            id.as_str().parse().ok().map(|id| Segment::Reference {
                post: PostId(id),
                label: unescape(caps.name("label").map_or("", |m| m.as_str())),
            })
        } else {
            let tag = caps.name("img").map_or("", |m| m.as_str());
            match (src_attr(tag), enlarge_target(tag)) {
                (Some(thumbnail), Some(url)) => Some(Segment::Image {
                    thumbnail: thumbnail.to_string(),
                    url: url.to_string(),
                }),
                _ => None,
            }
        };
        // Unrecognized matches stay in the surrounding HTML.
        let Some(segment) = segment else { continue };
        if whole.start() > last {
            out.push(Segment::Html(html[last..whole.start()].to_string()));
        }
        out.push(segment);
        last = whole.end();
    }
    if last < html.len() {
        out.push(Segment::Html(html[last..].to_string()));
    }
    out
}

fn slot_id(parent: &str, index: usize) -> String {
    if parent.is_empty() {
        index.to_string()
    } else {
        format!("{parent}.{index}")
    }
}

/// One post fragment plus the state of every reference and image in it,
/// including those inside expanded references.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PostDocument {
    html: String,
    refs: HashMap<String, RefState>,
    images: HashMap<String, ImageState>,
}

impl PostDocument {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            ..Self::default()
        }
    }

    /// Interactive element behind a slot id, or `None` for a stale or
    /// unknown id.
    pub fn slot(&self, id: &str) -> Option<Segment> {
        let mut steps = id.split('.').peekable();
        let mut html = self.html.as_str();
        let mut path = String::new();
        loop {
            let index: usize = steps.next()?.parse().ok()?;
            let segment = segments(html)
                .into_iter()
                .filter(Segment::is_interactive)
                .nth(index)?;
            path = slot_id(&path, index);
            if steps.peek().is_none() {
                return Some(segment);
            }
            html = self.refs.get(&path)?.fragment()?;
        }
    }

    pub fn reference(&self, id: &str) -> RefState {
        self.refs.get(id).cloned().unwrap_or_default()
    }

    pub fn image(&self, id: &str) -> ImageState {
        self.images.get(id).cloned().unwrap_or_default()
    }

    /// Click on a reference link; returns the action and the quoted post.
    pub fn click_reference(&mut self, id: &str) -> Option<(RefAction, PostId)> {
        let Some(Segment::Reference { post, .. }) = self.slot(id) else {
            return None;
        };
        let action = self.refs.entry(id.to_string()).or_default().toggle();
        if action == RefAction::Collapse {
            let nested = format!("{id}.");
            self.refs.retain(|k, _| !k.starts_with(&nested));
            self.images.retain(|k, _| !k.starts_with(&nested));
        }
        Some((action, post))
    }

    pub fn settle_reference(&mut self, id: &str, result: Result<String, ForumError>) {
        if let Some(state) = self.refs.get_mut(id) {
            state.settle(result);
        }
    }

    /// Click on a thumbnail; returns the action and the full-size URL.
    pub fn click_image(&mut self, id: &str, mode: ImageViewMode) -> Option<(ImageAction, String)> {
        let Some(Segment::Image { url, .. }) = self.slot(id) else {
            return None;
        };
        let action = self.images.entry(id.to_string()).or_default().toggle(mode);
        Some((action, url))
    }

    pub fn image_progress(&mut self, id: &str, loaded: f64, total: f64) {
        if let Some(state) = self.images.get_mut(id) {
            state.progress(loaded, total);
        }
    }

    pub fn settle_image(&mut self, id: &str, result: Result<String, ForumError>) {
        if let Some(state) = self.images.get_mut(id) {
            state.settle(result);
        }
    }

    /// The whole fragment as a single HTML string.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.html.len());
        self.render_into(&self.html, "", &mut out);
        out
    }

    fn render_into(&self, html: &str, parent: &str, out: &mut String) {
        let mut index = 0;
        let mut next_id = || {
            index += 1;
            slot_id(parent, index - 1)
        };
        for segment in segments(html) {
            match segment {
                Segment::Html(text) => out.push_str(&text),
                Segment::Reference { label, .. } => {
                    let id = next_id();
                    let state = self.reference(&id);
                    let class = if state == RefState::Loading {
                        "post-ref loading"
                    } else {
                        "post-ref"
                    };
                    let marker = if state.is_errored() { ERROR_MARKER } else { "" };
                    out.push_str(&format!(
                        r#"<a href="javascript:void(0)" class="{class}" {SLOT_ATTR}="{id}">{}{marker}</a>"#,
                        escape(&label)
                    ));
                    if let Some(child) = state.fragment() {
                        out.push_str(r#"<div class="post-ref-fragment">"#);
                        self.render_into(child, &id, out);
                        out.push_str("</div>");
                    }
                }
                Segment::Image { thumbnail, .. } => {
                    let id = next_id();
                    let state = self.image(&id);
                    out.push_str(&format!(
                        r#"<span class="post-image"><img class="{}" src="{}" {SLOT_ATTR}="{id}">"#,
                        state.class(),
                        state.src(&thumbnail).replace('"', "&quot;")
                    ));
                    if !state.label.is_empty() {
                        out.push_str(&format!(
                            r#"<span class="image-progress">{}</span>"#,
                            escape(&state.label)
                        ));
                    }
                    out.push_str("</span>");
                }
            }
        }
    }
}
