//! Bridge from a GUI toolkit's decoded raster to a [`PixelBuffer`].
//!
//! GUI toolkits keep decoded images in one of a few storage shapes. Two
//! are understood here:
//!
//! - [`RasterData::Bytes`]: interleaved bytes in the raster's declared
//!   order. Only 3-byte pixels are bridged, and they are copied as-is on
//!   the assumption that the declared order is already BGR.
//! - [`RasterData::PackedArgb`]: one `u32` per pixel,
//!   `A` in bits 24–31, `R` in 16–23, `G` in 8–15, `B` in 0–7.
//!   Unpacked to BGRA, then reduced to BGR by dropping alpha.
//!
//! Everything else is rejected with [`PipelineError::UnsupportedRaster`].

use crate::types::{ChannelLayout, PipelineError, PixelBuffer, RgbaImage};

/// Pixel storage of a GUI raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RasterData {
    /// Interleaved bytes, `bytes_per_pixel` per pixel, row-major.
    Bytes {
        /// Bytes per pixel in `data`.
        bytes_per_pixel: u8,
        /// Raw pixel bytes.
        data: Vec<u8>,
    },
    /// One packed `0xAARRGGBB` integer per pixel, row-major.
    PackedArgb(Vec<u32>),
    /// A storage kind the bridge does not understand, by name.
    Other(String),
}

impl RasterData {
    /// Short name of the storage variant, for diagnostics.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Bytes { .. } => "bytes",
            Self::PackedArgb(_) => "packed-argb",
            Self::Other(name) => name,
        }
    }
}

/// A decoded image as a GUI toolkit holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuiRaster {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel storage.
    pub data: RasterData,
}

impl GuiRaster {
    /// Create a raster from its parts.
    #[must_use]
    pub const fn new(width: u32, height: u32, data: RasterData) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// Pack an RGBA image into the integer-per-pixel layout toolkits use
    /// for images they decoded themselves.
    #[must_use]
    pub fn packed_from_rgba(image: &RgbaImage) -> Self {
        let packed = image
            .pixels()
            .map(|p| {
                let [r, g, b, a] = p.0;
                pack_argb(a, r, g, b)
            })
            .collect();
        Self::new(image.width(), image.height(), RasterData::PackedArgb(packed))
    }

    /// Convert to a normalized three-channel BGR buffer.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::UnsupportedRaster`] for storage other than
    /// 3-byte pixels or packed ARGB, [`PipelineError::EmptyImage`] for zero
    /// dimensions, and [`PipelineError::BufferSize`] if the storage length
    /// does not match the dimensions.
    pub fn to_pixel_buffer(&self) -> Result<PixelBuffer, PipelineError> {
        match &self.data {
            RasterData::Bytes {
                bytes_per_pixel: 3,
                data,
            } => PixelBuffer::new(self.width, self.height, ChannelLayout::Bgr, data.clone()),
            RasterData::Bytes {
                bytes_per_pixel, ..
            } => Err(PipelineError::UnsupportedRaster(format!(
                "{bytes_per_pixel}-byte pixels"
            ))),
            RasterData::PackedArgb(packed) => {
                Ok(unpack_argb(self.width, self.height, packed)?.into_bgr())
            }
            RasterData::Other(kind) => Err(PipelineError::UnsupportedRaster(kind.clone())),
        }
    }
}

/// Pack four channel bytes into `0xAARRGGBB`.
#[must_use]
pub const fn pack_argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    u32::from_le_bytes([b, g, r, a])
}

/// Unpack `0xAARRGGBB` integers into a BGRA buffer.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyImage`] for zero dimensions and
/// [`PipelineError::BufferSize`] if `packed` does not hold exactly
/// `width * height` pixels.
pub fn unpack_argb(width: u32, height: u32, packed: &[u32]) -> Result<PixelBuffer, PipelineError> {
    if width == 0 || height == 0 {
        return Err(PipelineError::EmptyImage { width, height });
    }
    let pixel_count = (width as usize)
        .checked_mul(height as usize)
        .ok_or(PipelineError::TooLarge { width, height })?;
    if packed.len() != pixel_count {
        return Err(PipelineError::BufferSize {
            expected: pixel_count,
            actual: packed.len(),
        });
    }

    let mut bytes = vec![0u8; pixel_count * 4];
    for (out, &pixel) in bytes.chunks_exact_mut(4).zip(packed) {
        // Little-endian bytes of 0xAARRGGBB are B, G, R, A.
        out.copy_from_slice(&pixel.to_le_bytes());
    }
    PixelBuffer::new(width, height, ChannelLayout::Bgra, bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn pack_argb_places_channels() {
        assert_eq!(pack_argb(0xAA, 0xBB, 0xCC, 0xDD), 0xAABB_CCDD);
    }

    #[test]
    fn unpack_argb_writes_bgra() {
        let buf = unpack_argb(2, 1, &[0x8011_2233, 0xFF00_00FF]).unwrap();
        assert_eq!(buf.layout(), ChannelLayout::Bgra);
        assert_eq!(buf.pixels(), &[0x33, 0x22, 0x11, 0x80, 0xFF, 0x00, 0x00, 0xFF]);
    }

    #[test]
    fn packed_raster_bridges_to_bgr() {
        let width = 3u32;
        let height = 2u32;
        let packed: Vec<u32> = (0..width * height)
            .map(|i| 0x7F00_0000 | (i * 0x0001_0203) & 0x00FF_FFFF)
            .collect();
        let raster = GuiRaster::new(width, height, RasterData::PackedArgb(packed.clone()));
        let buf = raster.to_pixel_buffer().unwrap();

        assert_eq!(buf.layout(), ChannelLayout::Bgr);
        assert_eq!(buf.pixels().len(), (width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let p = packed[(y * width + x) as usize];
                let expected = [
                    (p & 0xFF) as u8,
                    ((p >> 8) & 0xFF) as u8,
                    ((p >> 16) & 0xFF) as u8,
                ];
                assert_eq!(buf.pixel(x, y), Some(&expected[..]), "pixel ({x},{y})");
            }
        }
    }

    #[test]
    fn byte_raster_copies_directly() {
        let data: Vec<u8> = (0..12).collect();
        let raster = GuiRaster::new(
            2,
            2,
            RasterData::Bytes {
                bytes_per_pixel: 3,
                data: data.clone(),
            },
        );
        let buf = raster.to_pixel_buffer().unwrap();
        assert_eq!(buf.layout(), ChannelLayout::Bgr);
        assert_eq!(buf.pixels(), data.as_slice());
    }

    #[test]
    fn byte_raster_with_four_byte_pixels_is_unsupported() {
        let raster = GuiRaster::new(
            1,
            1,
            RasterData::Bytes {
                bytes_per_pixel: 4,
                data: vec![0; 4],
            },
        );
        assert!(matches!(
            raster.to_pixel_buffer(),
            Err(PipelineError::UnsupportedRaster(_))
        ));
    }

    #[test]
    fn other_storage_is_unsupported() {
        let raster = GuiRaster::new(1, 1, RasterData::Other("ushort-565".to_owned()));
        let err = raster.to_pixel_buffer().unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedRaster(ref k) if k == "ushort-565"));
        assert_eq!(raster.data.kind(), "ushort-565");
    }

    #[test]
    fn short_packed_storage_is_rejected() {
        let raster = GuiRaster::new(2, 2, RasterData::PackedArgb(vec![0; 3]));
        assert!(matches!(
            raster.to_pixel_buffer(),
            Err(PipelineError::BufferSize {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn zero_sized_raster_is_empty() {
        let raster = GuiRaster::new(0, 5, RasterData::PackedArgb(Vec::new()));
        assert!(matches!(
            raster.to_pixel_buffer(),
            Err(PipelineError::EmptyImage { .. })
        ));
    }

    #[test]
    fn packed_from_rgba_round_trips_through_bridge() {
        let img = RgbaImage::from_fn(4, 3, |x, y| {
            image::Rgba([(x * 60) as u8, (y * 80) as u8, 7, 200])
        });
        let raster = GuiRaster::packed_from_rgba(&img);
        assert_eq!(raster.data.kind(), "packed-argb");
        let buf = raster.to_pixel_buffer().unwrap();
        for (x, y, p) in img.enumerate_pixels() {
            let [r, g, b, _] = p.0;
            assert_eq!(buf.pixel(x, y), Some(&[b, g, r][..]));
        }
    }
}
