//! Dioxus UI components for blurview.
//!
//! Provides the main-window toolbar, image slots, and the root of the
//! comparison window.

mod comparison;
mod image_view;
mod toolbar;

pub use comparison::{ComparisonView, ComparisonViewProps};
pub use image_view::ImageView;
pub use toolbar::{Toolbar, accept_filter};
