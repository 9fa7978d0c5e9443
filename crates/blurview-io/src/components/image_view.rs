//! A single image, optionally fitted into a box.

use dioxus::prelude::*;

use crate::raster::DisplayImage;
use crate::slot::ImageSlot;
use crate::view::{FitSize, fit_within};

/// Props for the [`ImageView`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ImageViewProps {
    /// Which slot this view fills; used for the label and placeholder.
    slot: ImageSlot,
    /// Image to show, or `None` for the placeholder.
    image: Option<DisplayImage>,
    /// Box the image is scaled into. `None` shows it at decoded size.
    fit: Option<FitSize>,
}

/// Renders one image slot.
///
/// With a fit box the slot reserves the box's size even while empty, so
/// the window layout does not jump when the first image arrives.
#[component]
pub fn ImageView(props: ImageViewProps) -> Element {
    let label = props.slot.label();
    let frame_style = props.fit.map_or_else(String::new, |fit| {
        format!("width: {}px; height: {}px;", fit.width, fit.height)
    });

    let body = match props.image {
        Some(ref image) => {
            let (w, h) = fit_within(image.width, image.height, props.fit);
            let src = &image.data_url;
            rsx! {
                img {
                    src: "{src}",
                    alt: "{label}",
                    width: "{w}",
                    height: "{h}",
                }
            }
        }
        None => {
            let placeholder = props.slot.placeholder();
            rsx! {
                span { style: "color: #888; font-size: 0.9em;", "{placeholder}" }
            }
        }
    };

    rsx! {
        figure {
            style: "margin: 0; display: flex; flex-direction: column; align-items: center;",
            div {
                style: "display: flex; align-items: center; justify-content: center; background: #f4f4f4; {frame_style}",
                {body}
            }
            figcaption { style: "font-size: 0.85em; color: #555;", "{label}" }
        }
    }
}
