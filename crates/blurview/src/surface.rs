//! [`ViewSurface`] backed by Dioxus signals and extra desktop windows.

use std::rc::{Rc, Weak};

use blurview_io::components::{ComparisonView, ComparisonViewProps};
use blurview_io::raster::{self, DisplayImage};
use blurview_io::ViewSurface;
use blurview_pipeline::GuiRaster;
use dioxus::desktop::{Config, WeakDesktopContext, WindowBuilder};
use dioxus::prelude::*;

/// Title of every comparison window.
pub const COMPARISON_TITLE: &str = "Comparison";

/// Signals the main window renders from, plus the open comparison
/// windows.
///
/// All fields are signal handles, so the surface is `Copy` and can be
/// moved into every event handler of the root component.
#[derive(Clone, Copy)]
pub struct DesktopSurface {
    /// Image in the original slot.
    pub primary: Signal<Option<DisplayImage>>,
    /// Image in the processed slot.
    pub processed: Signal<Option<DisplayImage>>,
    /// Decoded copy of the primary image.
    raster: Signal<Option<GuiRaster>>,
    /// Comparison windows opened so far. Weak, so a window the user
    /// closes is destroyed rather than kept alive here.
    comparisons: Signal<Vec<WeakDesktopContext>>,
}

impl DesktopSurface {
    /// Create the surface's signals in the current component.
    pub fn use_surface() -> Self {
        Self {
            primary: use_signal(|| None),
            processed: use_signal(|| None),
            raster: use_signal(|| None),
            comparisons: use_signal(Vec::new),
        }
    }

    /// Close every comparison window this surface opened that is still
    /// open.
    pub fn close_comparisons(&self) {
        // The signal may already be gone during teardown.
        let Ok(windows) = self.comparisons.try_peek() else {
            return;
        };
        for window in windows.iter().filter_map(Weak::upgrade) {
            window.close();
        }
    }
}

/// Remember `window`, forgetting windows that have since been closed.
fn track_window<T>(windows: &mut Vec<Weak<T>>, window: &Rc<T>) {
    windows.retain(|w| w.strong_count() > 0);
    windows.push(Rc::downgrade(window));
}

/// Wrap PNG bytes for an `<img>`, logging if the bytes are unreadable.
fn display(png: &[u8]) -> Option<DisplayImage> {
    DisplayImage::from_png(png)
        .inspect_err(|e| tracing::error!("cannot display image: {e}"))
        .ok()
}

impl ViewSurface for DesktopSurface {
    fn set_primary_image(&mut self, png: &[u8]) {
        self.primary.set(display(png));
        let decoded = raster::decode_png_raster(png)
            .inspect_err(|e| tracing::warn!("cannot keep decoded copy of image: {e}"))
            .ok();
        self.raster.set(decoded);
    }

    fn set_processed_image(&mut self, png: &[u8]) {
        self.processed.set(display(png));
    }

    fn clear_processed_image(&mut self) {
        self.processed.set(None);
    }

    fn open_comparison_window(&mut self, original_png: &[u8], processed_png: &[u8]) {
        let (Some(original), Some(processed)) = (display(original_png), display(processed_png))
        else {
            return;
        };
        let dom = VirtualDom::new_with_props(
            ComparisonView,
            ComparisonViewProps {
                original,
                processed,
            },
        );
        let config = Config::new().with_window(WindowBuilder::new().with_title(COMPARISON_TITLE));
        let pending = dioxus::desktop::window().new_window(dom, config);

        let mut comparisons = self.comparisons;
        spawn(async move {
            let window = pending.resolve().await;
            track_window(&mut comparisons.write(), &window);
        });
    }

    fn primary_raster(&self) -> Option<GuiRaster> {
        self.raster.peek().clone()
    }
}
