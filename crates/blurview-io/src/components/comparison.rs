//! Side-by-side view of an original and its blur result.

use dioxus::prelude::*;

use super::ImageView;
use crate::raster::DisplayImage;
use crate::slot::ImageSlot;

/// Props for the [`ComparisonView`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ComparisonViewProps {
    /// The image that was blurred.
    pub original: DisplayImage,
    /// The blur result.
    pub processed: DisplayImage,
}

/// Root component of a comparison window.
///
/// Both images are shown at their decoded size with a 10 px gap; the
/// window scrolls when they do not fit.
#[component]
pub fn ComparisonView(props: ComparisonViewProps) -> Element {
    rsx! {
        div {
            style: "display: flex; flex-direction: row; gap: 10px; padding: 10px; overflow: auto;",
            ImageView { slot: ImageSlot::Original, image: Some(props.original.clone()) }
            ImageView { slot: ImageSlot::Processed, image: Some(props.processed.clone()) }
        }
    }
}
