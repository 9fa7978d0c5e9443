//! Shared types for the blurview pipeline.

use serde::{Deserialize, Serialize};

/// Re-export `RgbaImage`, the input type of
/// [`GuiRaster::packed_from_rgba`](crate::raster::GuiRaster::packed_from_rgba).
pub use image::RgbaImage;

/// Interleaved channel order of a [`PixelBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelLayout {
    /// Three bytes per pixel: blue, green, red.
    Bgr,
    /// Four bytes per pixel: blue, green, red, alpha.
    Bgra,
}

impl ChannelLayout {
    /// Number of bytes per pixel.
    #[must_use]
    pub const fn channels(self) -> u8 {
        match self {
            Self::Bgr => 3,
            Self::Bgra => 4,
        }
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// An in-memory image: dimensions, channel layout, and a contiguous
/// interleaved byte array in BGR or BGRA order.
///
/// Constructed only through [`PixelBuffer::new`] (or the codec and
/// raster bridge, which call it), so every instance satisfies
/// `pixels.len() == width * height * channels` with non-zero
/// dimensions. There are no mutable accessors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    layout: ChannelLayout,
    pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap `pixels` as a buffer of the given size and layout.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyImage`] if either dimension is zero,
    /// [`PipelineError::TooLarge`] if the byte count overflows `usize`,
    /// and [`PipelineError::BufferSize`] if `pixels` has the wrong length.
    pub fn new(
        width: u32,
        height: u32,
        layout: ChannelLayout,
        pixels: Vec<u8>,
    ) -> Result<Self, PipelineError> {
        let expected = byte_len(width, height, layout)?;
        if pixels.len() != expected {
            return Err(PipelineError::BufferSize {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            layout,
            pixels,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Width and height together.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// Channel order of the pixel bytes.
    #[must_use]
    pub const fn layout(&self) -> ChannelLayout {
        self.layout
    }

    /// Bytes per pixel (3 or 4).
    #[must_use]
    pub const fn channels(&self) -> u8 {
        self.layout.channels()
    }

    /// The interleaved pixel bytes, row-major.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Channel bytes of the pixel at column `x`, row `y`.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let channels = usize::from(self.channels());
        let start = (y as usize * self.width as usize + x as usize) * channels;
        self.pixels.get(start..start + channels)
    }

    /// Normalize to three-channel BGR.
    ///
    /// BGRA input has its alpha byte dropped from every pixel (the
    /// equivalent of a BGRA→BGR color conversion). BGR input is
    /// returned as-is.
    #[must_use]
    pub fn into_bgr(self) -> Self {
        match self.layout {
            ChannelLayout::Bgr => self,
            ChannelLayout::Bgra => {
                let mut bgr = Vec::with_capacity(self.pixels.len() / 4 * 3);
                for px in self.pixels.chunks_exact(4) {
                    bgr.extend_from_slice(&px[..3]);
                }
                Self {
                    width: self.width,
                    height: self.height,
                    layout: ChannelLayout::Bgr,
                    pixels: bgr,
                }
            }
        }
    }
}

/// Number of bytes a buffer of the given shape occupies.
fn byte_len(width: u32, height: u32, layout: ChannelLayout) -> Result<usize, PipelineError> {
    if width == 0 || height == 0 {
        return Err(PipelineError::EmptyImage { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(usize::from(layout.channels())))
        .ok_or(PipelineError::TooLarge { width, height })
}

/// Configuration for the blur operator.
///
/// The kernel edge length is derived from the input width as
/// `floor(width * blur_factor)`, raised to at least 3 and rounded up to
/// the next odd number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlurConfig {
    /// Fraction of the image width used as the Gaussian kernel size.
    pub blur_factor: f64,
}

impl BlurConfig {
    /// Default blur factor: the kernel spans 5% of the image width.
    pub const DEFAULT_BLUR_FACTOR: f64 = 0.05;

    /// Largest accepted blur factor (kernel as wide as the image).
    pub const MAX_BLUR_FACTOR: f64 = 1.0;

    /// Smallest kernel edge length the blur will use.
    pub const MIN_KERNEL_SIZE: u32 = 3;

    /// Build a config, rejecting invalid factors.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if `blur_factor` is not
    /// finite or lies outside `(0, MAX_BLUR_FACTOR]`.
    pub fn new(blur_factor: f64) -> Result<Self, PipelineError> {
        let config = Self { blur_factor };
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants [`new`](Self::new) enforces.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] describing the bad value.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.blur_factor.is_finite()
            || self.blur_factor <= 0.0
            || self.blur_factor > Self::MAX_BLUR_FACTOR
        {
            return Err(PipelineError::InvalidConfig(format!(
                "blur_factor must be in (0, {}], got {}",
                Self::MAX_BLUR_FACTOR,
                self.blur_factor,
            )));
        }
        Ok(())
    }
}

impl Default for BlurConfig {
    fn default() -> Self {
        Self {
            blur_factor: Self::DEFAULT_BLUR_FACTOR,
        }
    }
}

/// Parameters of a single blur run, derived from the input width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlurParameters {
    /// Odd kernel edge length, at least [`BlurConfig::MIN_KERNEL_SIZE`].
    pub kernel_size: u32,
    /// Horizontal standard deviation. `0.0` means "derive from
    /// `kernel_size`".
    pub sigma_x: f64,
    /// Vertical standard deviation. `0.0` means "derive from
    /// `kernel_size`".
    pub sigma_y: f64,
}

impl BlurParameters {
    /// Parameters for an image of the given width.
    #[must_use]
    pub fn for_width(width: u32, config: &BlurConfig) -> Self {
        Self {
            kernel_size: crate::blur::kernel_size(width, config.blur_factor),
            sigma_x: 0.0,
            sigma_y: 0.0,
        }
    }

    /// Effective horizontal sigma after resolving the `0.0` sentinel.
    #[must_use]
    pub fn effective_sigma_x(&self) -> f64 {
        resolve_sigma(self.sigma_x, self.kernel_size)
    }

    /// Effective vertical sigma after resolving the `0.0` sentinel.
    #[must_use]
    pub fn effective_sigma_y(&self) -> f64 {
        resolve_sigma(self.sigma_y, self.kernel_size)
    }
}

fn resolve_sigma(sigma: f64, kernel_size: u32) -> f64 {
    if sigma > 0.0 {
        sigma
    } else {
        crate::blur::sigma_for_kernel(kernel_size)
    }
}

/// Errors that can occur anywhere in the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// The image has a zero dimension.
    #[error("image is empty ({width}x{height})")]
    EmptyImage {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },

    /// The image is too large to address in memory.
    #[error("image dimensions {width}x{height} are too large")]
    TooLarge {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },

    /// Pixel storage length does not match the declared dimensions.
    #[error("pixel data has {actual} elements, expected {expected}")]
    BufferSize {
        /// Length implied by the dimensions.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// The image is in a format this build does not accept.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    PngEncode(String),

    /// The GUI raster uses a storage variant the bridge cannot read.
    #[error("unsupported raster storage: {0}")]
    UnsupportedRaster(String),

    /// Blur configuration is invalid.
    #[error("invalid blur configuration: {0}")]
    InvalidConfig(String),

    /// The codec backend failed its startup checks.
    #[error("image codec backend unavailable: {0}")]
    BackendUnavailable(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_zero_dimensions() {
        let result = PixelBuffer::new(0, 4, ChannelLayout::Bgr, Vec::new());
        assert!(matches!(
            result,
            Err(PipelineError::EmptyImage {
                width: 0,
                height: 4
            })
        ));
    }

    #[test]
    fn new_rejects_wrong_length() {
        let result = PixelBuffer::new(2, 2, ChannelLayout::Bgr, vec![0; 11]);
        assert!(matches!(
            result,
            Err(PipelineError::BufferSize {
                expected: 12,
                actual: 11
            })
        ));
    }

    #[test]
    fn pixel_indexes_row_major() {
        let pixels: Vec<u8> = (0..18).collect();
        let buf = PixelBuffer::new(3, 2, ChannelLayout::Bgr, pixels).unwrap();
        assert_eq!(buf.pixel(0, 0), Some(&[0, 1, 2][..]));
        assert_eq!(buf.pixel(2, 0), Some(&[6, 7, 8][..]));
        assert_eq!(buf.pixel(0, 1), Some(&[9, 10, 11][..]));
        assert_eq!(buf.pixel(3, 0), None);
        assert_eq!(buf.pixel(0, 2), None);
    }

    #[test]
    fn into_bgr_drops_alpha() {
        let buf = PixelBuffer::new(
            2,
            1,
            ChannelLayout::Bgra,
            vec![10, 20, 30, 255, 40, 50, 60, 0],
        )
        .unwrap();
        let bgr = buf.into_bgr();
        assert_eq!(bgr.layout(), ChannelLayout::Bgr);
        assert_eq!(bgr.channels(), 3);
        assert_eq!(bgr.pixels(), &[10, 20, 30, 40, 50, 60]);
        assert_eq!(bgr.dimensions(), Dimensions { width: 2, height: 1 });
    }

    #[test]
    fn into_bgr_keeps_bgr_unchanged() {
        let buf = PixelBuffer::new(1, 1, ChannelLayout::Bgr, vec![1, 2, 3]).unwrap();
        assert_eq!(buf.clone().into_bgr(), buf);
    }

    #[test]
    fn blur_config_default_factor() {
        assert!(
            (BlurConfig::default().blur_factor - BlurConfig::DEFAULT_BLUR_FACTOR).abs()
                < f64::EPSILON
        );
        assert!(BlurConfig::default().validate().is_ok());
    }

    #[test]
    fn blur_config_rejects_bad_factors() {
        for factor in [0.0, -0.1, f64::NAN, f64::INFINITY, 1.5] {
            assert!(
                matches!(BlurConfig::new(factor), Err(PipelineError::InvalidConfig(_))),
                "factor {factor} should be rejected",
            );
        }
    }

    #[test]
    fn blur_config_serde_fills_missing_fields() {
        let config: BlurConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, BlurConfig::default());

        let config: BlurConfig = serde_json::from_str(r#"{"blur_factor":0.1}"#).unwrap();
        assert!((config.blur_factor - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn blur_parameters_resolve_sigma_from_kernel() {
        let params = BlurParameters::for_width(100, &BlurConfig::default());
        assert_eq!(params.kernel_size, 5);
        // 0.3 * ((5 - 1) * 0.5 - 1) + 0.8 = 1.1
        assert!((params.effective_sigma_x() - 1.1).abs() < 1e-9);
        assert!((params.effective_sigma_y() - 1.1).abs() < 1e-9);
    }
}
