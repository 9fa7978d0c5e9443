//! blurview-io: file access, session control, and the Dioxus component
//! library.
//!
//! Decodes image files from disk, drives the Open/Process session against
//! an abstract [`ViewSurface`], converts PNG bytes for the webview, and
//! provides reusable UI components for the blurview desktop app.

pub mod components;
pub mod file;
pub mod logging;
pub mod raster;
pub mod session;
pub mod slot;
pub mod view;

pub use components::{ComparisonView, ImageView, Toolbar};
pub use file::{OpenError, decode_file};
pub use raster::DisplayImage;
pub use session::{Phase, SessionController, SessionError, SessionEvent, SessionState};
pub use slot::ImageSlot;
pub use view::{FitSize, HeadlessSurface, ViewSurface, fit_within};
