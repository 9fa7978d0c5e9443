//! Image decoding into BGR pixel buffers and PNG encoding for display.
//!
//! Decoding accepts PNG, JPEG, GIF, BMP, and WebP. The format is sniffed
//! from the leading bytes, not taken from a file extension, so a JPEG
//! renamed to `.png` still decodes and a text file named `.png` does not.
//!
//! PNG encoding exists so the GUI can decode the result back into its own
//! representation; it is a display path, not a save path.

use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat};

use crate::types::{ChannelLayout, PipelineError, PixelBuffer};

/// Formats the decoder accepts.
pub const SUPPORTED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Gif,
    ImageFormat::Bmp,
    ImageFormat::WebP,
];

/// File extensions offered by file choosers, lower-case, without dots.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp"];

/// Decode raw image bytes into a three-channel BGR buffer.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the format cannot be
/// detected or the data is corrupt or truncated.
/// Returns [`PipelineError::UnsupportedFormat`] if the format is
/// recognized but not in [`SUPPORTED_FORMATS`].
/// Returns [`PipelineError::EmptyImage`] if the decoded image has a zero
/// dimension.
pub fn decode(bytes: &[u8]) -> Result<PixelBuffer, PipelineError> {
    decode_with_formats(bytes, SUPPORTED_FORMATS)
}

/// Like [`decode`], accepting only the listed formats.
///
/// # Errors
///
/// See [`decode`].
pub fn decode_with_formats(
    bytes: &[u8],
    formats: &[ImageFormat],
) -> Result<PixelBuffer, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let format = image::guess_format(bytes)?;
    if !formats.contains(&format) {
        return Err(PipelineError::UnsupportedFormat(format!("{format:?}")));
    }

    let image = image::load_from_memory_with_format(bytes, format).map_err(|e| match e {
        image::ImageError::Unsupported(u) => PipelineError::UnsupportedFormat(u.to_string()),
        other => PipelineError::ImageDecode(other),
    })?;
    from_dynamic(&image)
}

/// Convert a decoded image to a BGR buffer.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyImage`] if the image has a zero
/// dimension.
pub fn from_dynamic(image: &DynamicImage) -> Result<PixelBuffer, PipelineError> {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    let mut pixels = rgb.into_raw();
    swap_red_blue(&mut pixels, 3);
    PixelBuffer::new(width, height, ChannelLayout::Bgr, pixels)
}

/// Encode a buffer as PNG bytes.
///
/// BGR buffers become RGB PNGs and BGRA buffers become RGBA PNGs; the
/// encoding is lossless.
///
/// # Errors
///
/// Returns [`PipelineError::PngEncode`] if the encoder fails.
pub fn encode_png(buffer: &PixelBuffer) -> Result<Vec<u8>, PipelineError> {
    let mut data = buffer.pixels().to_vec();
    swap_red_blue(&mut data, usize::from(buffer.channels()));
    let color = match buffer.layout() {
        ChannelLayout::Bgr => ExtendedColorType::Rgb8,
        ChannelLayout::Bgra => ExtendedColorType::Rgba8,
    };

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(&data, buffer.width(), buffer.height(), color)
        .map_err(|e| PipelineError::PngEncode(e.to_string()))?;
    Ok(png)
}

/// Swap the first and third byte of every pixel (RGB ⇄ BGR).
fn swap_red_blue(pixels: &mut [u8], channels: usize) {
    for px in pixels.chunks_exact_mut(channels) {
        px.swap(0, 2);
    }
}

/// Handle to the codec backend, checked once at startup.
///
/// [`initialize`](Self::initialize) verifies that every required input
/// format has a decoder compiled in, that PNG encoding is available,
/// and that a 1×1 PNG survives an encode/decode round trip. The app
/// refuses to start without it.
#[derive(Debug, Clone)]
pub struct CodecBackend {
    formats: Vec<ImageFormat>,
}

impl CodecBackend {
    /// Check the backend for [`SUPPORTED_FORMATS`].
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::BackendUnavailable`] if any check fails.
    pub fn initialize() -> Result<Self, PipelineError> {
        Self::with_formats(SUPPORTED_FORMATS)
    }

    /// Check the backend for an explicit list of input formats.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::BackendUnavailable`] if any check fails.
    pub fn with_formats(formats: &[ImageFormat]) -> Result<Self, PipelineError> {
        if let Some(missing) = formats.iter().find(|f| !f.reading_enabled()) {
            return Err(PipelineError::BackendUnavailable(format!(
                "no decoder for {missing:?}"
            )));
        }
        if !ImageFormat::Png.writing_enabled() {
            return Err(PipelineError::BackendUnavailable(
                "no PNG encoder".to_owned(),
            ));
        }
        self_check()?;
        Ok(Self {
            formats: formats.to_vec(),
        })
    }

    /// Input formats this backend accepts.
    #[must_use]
    pub fn formats(&self) -> &[ImageFormat] {
        &self.formats
    }

    /// Decode bytes using this backend's format list.
    ///
    /// # Errors
    ///
    /// See [`decode`].
    pub fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, PipelineError> {
        decode_with_formats(bytes, &self.formats)
    }

    /// Encode a buffer as PNG bytes.
    ///
    /// # Errors
    ///
    /// See [`encode_png`].
    pub fn encode_png(&self, buffer: &PixelBuffer) -> Result<Vec<u8>, PipelineError> {
        encode_png(buffer)
    }
}

/// Round-trip a single pixel through PNG.
fn self_check() -> Result<(), PipelineError> {
    let unavailable = |e: PipelineError| PipelineError::BackendUnavailable(e.to_string());
    let probe = PixelBuffer::new(1, 1, ChannelLayout::Bgr, vec![1, 2, 3]).map_err(unavailable)?;
    let png = encode_png(&probe).map_err(unavailable)?;
    let decoded = decode_with_formats(&png, &[ImageFormat::Png]).map_err(unavailable)?;
    if decoded != probe {
        return Err(PipelineError::BackendUnavailable(
            "PNG self-check returned different pixels".to_owned(),
        ));
    }
    Ok(())
}
