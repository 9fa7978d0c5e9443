//! The surface the session draws on.
//!
//! [`ViewSurface`] is the narrow interface between the session controller
//! and whatever shows images to the user. The desktop app implements it
//! on top of Dioxus signals and extra windows; [`HeadlessSurface`]
//! records every call so the session can be driven without a display.

use blurview_pipeline::GuiRaster;

use crate::raster;

/// Sink for the images produced by the session.
pub trait ViewSurface {
    /// Show `png` in the main window's original slot.
    fn set_primary_image(&mut self, png: &[u8]);

    /// Show `png` in the main window's processed slot.
    fn set_processed_image(&mut self, png: &[u8]);

    /// Empty the processed slot.
    fn clear_processed_image(&mut self);

    /// Open a new modeless window showing both images side by side.
    fn open_comparison_window(&mut self, original_png: &[u8], processed_png: &[u8]);

    /// The surface's own decoded copy of the primary image, if it keeps
    /// one.
    fn primary_raster(&self) -> Option<GuiRaster> {
        None
    }
}

/// A bounding box images are scaled down into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitSize {
    /// Box width in logical pixels.
    pub width: u32,
    /// Box height in logical pixels.
    pub height: u32,
}

impl FitSize {
    /// Box used for both image slots of the main window.
    pub const MAIN_SLOT: Self = Self {
        width: 300,
        height: 200,
    };
}

/// Display size of a `width × height` image.
///
/// With a fit box the image is scaled uniformly so it fits inside the box
/// while keeping its aspect ratio, enlarging small images as well as
/// shrinking large ones. Without one the image keeps its decoded size.
#[must_use]
pub fn fit_within(width: u32, height: u32, fit: Option<FitSize>) -> (f64, f64) {
    let (w, h) = (f64::from(width), f64::from(height));
    let Some(fit) = fit else {
        return (w, h);
    };
    if width == 0 || height == 0 {
        return (0.0, 0.0);
    }
    let scale = (f64::from(fit.width) / w).min(f64::from(fit.height) / h);
    (w * scale, h * scale)
}

/// One comparison window opened on a [`HeadlessSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonWindow {
    /// PNG shown on the left.
    pub original_png: Vec<u8>,
    /// PNG shown on the right.
    pub processed_png: Vec<u8>,
}

/// A [`ViewSurface`] that keeps everything in memory.
#[derive(Debug, Default, Clone)]
pub struct HeadlessSurface {
    /// PNG in the original slot.
    pub primary: Option<Vec<u8>>,
    /// PNG in the processed slot.
    pub processed: Option<Vec<u8>>,
    /// Comparison windows in the order they were opened.
    pub comparisons: Vec<ComparisonWindow>,
    /// Total number of surface calls, for asserting that nothing happened.
    pub calls: usize,
    decode_primary: bool,
}

impl HeadlessSurface {
    /// A surface that only records PNG bytes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface that also decodes the primary image into a packed ARGB
    /// raster, the way a GUI toolkit would.
    #[must_use]
    pub fn with_raster_readback() -> Self {
        Self {
            decode_primary: true,
            ..Self::default()
        }
    }
}

impl ViewSurface for HeadlessSurface {
    fn set_primary_image(&mut self, png: &[u8]) {
        self.calls += 1;
        self.primary = Some(png.to_vec());
    }

    fn set_processed_image(&mut self, png: &[u8]) {
        self.calls += 1;
        self.processed = Some(png.to_vec());
    }

    fn clear_processed_image(&mut self) {
        self.calls += 1;
        self.processed = None;
    }

    fn open_comparison_window(&mut self, original_png: &[u8], processed_png: &[u8]) {
        self.calls += 1;
        self.comparisons.push(ComparisonWindow {
            original_png: original_png.to_vec(),
            processed_png: processed_png.to_vec(),
        });
    }

    fn primary_raster(&self) -> Option<GuiRaster> {
        if !self.decode_primary {
            return None;
        }
        let png = self.primary.as_deref()?;
        match raster::decode_png_raster(png) {
            Ok(raster) => Some(raster),
            Err(e) => {
                tracing::warn!("primary image could not be read back: {e}");
                None
            }
        }
    }
}
