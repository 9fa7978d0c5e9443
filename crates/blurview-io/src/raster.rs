//! PNG bytes as the webview sees them.
//!
//! The session hands PNG bytes to the view surface. The desktop surface
//! shows them through `data:` URLs and, like any GUI toolkit, keeps its
//! own decoded copy as a packed ARGB raster so Process can read the
//! displayed image back through the raster bridge.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use blurview_pipeline::{Dimensions, GuiRaster};

/// Errors that can occur while reading PNG bytes for display.
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    /// PNG decoding failed.
    #[error("PNG decoding failed: {0}")]
    PngDecode(String),
}

impl From<image::ImageError> for RasterError {
    fn from(err: image::ImageError) -> Self {
        Self::PngDecode(err.to_string())
    }
}

/// Encode PNG bytes as a `data:image/png;base64,...` URL for an `<img src>`.
#[must_use]
pub fn png_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

/// Read the pixel dimensions from a PNG header without decoding pixels.
///
/// # Errors
///
/// Returns [`RasterError::PngDecode`] if the bytes are not a readable PNG.
pub fn png_dimensions(png: &[u8]) -> Result<Dimensions, RasterError> {
    let (width, height) = image::ImageReader::with_format(Cursor::new(png), image::ImageFormat::Png)
        .into_dimensions()?;
    Ok(Dimensions { width, height })
}

/// A PNG ready for an `<img>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayImage {
    /// `data:` URL carrying the PNG.
    pub data_url: String,
    /// Decoded width in pixels.
    pub width: u32,
    /// Decoded height in pixels.
    pub height: u32,
}

impl DisplayImage {
    /// Wrap PNG bytes for display.
    ///
    /// # Errors
    ///
    /// Returns [`RasterError::PngDecode`] if the PNG header is unreadable.
    pub fn from_png(png: &[u8]) -> Result<Self, RasterError> {
        let Dimensions { width, height } = png_dimensions(png)?;
        Ok(Self {
            data_url: png_data_url(png),
            width,
            height,
        })
    }
}

/// Decode PNG bytes into the packed ARGB raster a toolkit would hold.
///
/// # Errors
///
/// Returns [`RasterError::PngDecode`] if the bytes are not a readable PNG.
pub fn decode_png_raster(png: &[u8]) -> Result<GuiRaster, RasterError> {
    let image = image::load_from_memory_with_format(png, image::ImageFormat::Png)?;
    Ok(GuiRaster::packed_from_rgba(&image.to_rgba8()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use blurview_pipeline::{ChannelLayout, PixelBuffer, RasterData, codec};

    use super::*;

    fn sample_png() -> Vec<u8> {
        let buf = PixelBuffer::new(3, 2, ChannelLayout::Bgr, (0..18).collect()).unwrap();
        codec::encode_png(&buf).unwrap()
    }

    #[test]
    fn data_url_has_png_prefix() {
        let url = png_data_url(&[0x89, b'P', b'N', b'G']);
        assert_eq!(url, "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn dimensions_read_from_header() {
        let dims = png_dimensions(&sample_png()).unwrap();
        assert_eq!(
            dims,
            Dimensions {
                width: 3,
                height: 2
            }
        );
    }

    #[test]
    fn dimensions_of_garbage_fail() {
        assert!(matches!(
            png_dimensions(b"not a png"),
            Err(RasterError::PngDecode(_))
        ));
    }

    #[test]
    fn display_image_carries_size_and_url() {
        let image = DisplayImage::from_png(&sample_png()).unwrap();
        assert_eq!((image.width, image.height), (3, 2));
        assert!(image.data_url.starts_with("data:image/png;base64,iVBORw0KGgo"));
    }

    #[test]
    fn decoded_raster_is_opaque_packed_argb() {
        let raster = decode_png_raster(&sample_png()).unwrap();
        assert_eq!((raster.width, raster.height), (3, 2));
        let RasterData::PackedArgb(ref packed) = raster.data else {
            panic!("expected packed raster, got {:?}", raster.data.kind());
        };
        assert_eq!(packed.len(), 6);
        assert!(packed.iter().all(|p| p >> 24 == 0xFF));
    }

    #[test]
    fn decoded_raster_bridges_back_to_original_pixels() {
        let raster = decode_png_raster(&sample_png()).unwrap();
        let buf = raster.to_pixel_buffer().unwrap();
        assert_eq!(buf.pixels(), (0..18).collect::<Vec<u8>>().as_slice());
    }
}
