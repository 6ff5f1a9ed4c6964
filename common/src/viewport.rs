//! Fitting an opened dropdown into the visible part of the page.

/// Measurements of the dropdown panel and window, in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropdownGeometry {
    pub height: f64,
    /// Top edge relative to the document.
    pub offset_top: f64,
    pub scroll_top: f64,
    pub viewport_height: f64,
}

/// New height for a panel that would run past the bottom of the viewport.
/// The panel scrolls internally once shrunk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropdownFit {
    pub height: f64,
}

impl DropdownGeometry {
    /// Pixels by which the panel overruns the visible bottom edge.
    pub fn overflow(&self) -> f64 {
        self.height + self.offset_top - self.scroll_top - self.viewport_height
    }

    pub fn fit(&self, margin: f64) -> Option<DropdownFit> {
        let overflow = self.overflow();
        (overflow > 0.0).then(|| DropdownFit {
            height: (self.height - overflow - margin).max(0.0),
        })
    }
}
