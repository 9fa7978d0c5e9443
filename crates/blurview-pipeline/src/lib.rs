//! blurview-pipeline: pixel buffers, GUI raster bridging, and Gaussian
//! blur (sans-IO).
//!
//! Takes encoded image bytes or a GUI toolkit's decoded raster, normalizes
//! to an interleaved BGR [`PixelBuffer`], blurs it with a kernel sized
//! from the image width, and re-encodes the result as PNG for display.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and returns structured data. Filesystem access, the
//! session state machine, and the UI live in `blurview-io`.

pub mod blur;
pub mod codec;
pub mod diagnostics;
pub mod raster;
pub mod types;

pub use codec::CodecBackend;
pub use raster::{GuiRaster, RasterData};
pub use types::{
    BlurConfig, BlurParameters, ChannelLayout, Dimensions, PipelineError, PixelBuffer, RgbaImage,
};

/// Result of blurring one image, as produced by
/// [`diagnostics::process_with_diagnostics`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessResult {
    /// The BGR image that was blurred.
    pub original: PixelBuffer,
    /// The blurred image, same dimensions and layout as `original`.
    pub blurred: PixelBuffer,
    /// Kernel parameters used by the blur.
    pub parameters: BlurParameters,
    /// `blurred` encoded as PNG.
    pub png: Vec<u8>,
}
