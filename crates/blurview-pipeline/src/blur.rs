//! Gaussian blur with a kernel sized from the image width.
//!
//! Wraps [`imageproc::filter::separable_filter`] with normalized 1-D
//! Gaussian kernels, applied horizontally then vertically. The kernel
//! edge length is `floor(width * blur_factor)`, at least 3, rounded up to
//! the next odd number. Sigma is derived from the kernel size with the
//! usual `0.3 * ((k - 1) * 0.5 - 1) + 0.8` rule.
//!
//! The filter treats every channel independently, so BGR and BGRA
//! buffers are wrapped in `Rgb`/`Rgba` image buffers without reordering;
//! channel names do not matter to a per-channel convolution. Border
//! pixels are clamped to the nearest edge (the `imageproc` default).
//!
//! Both passes run on `f32` samples and the result is rounded back to
//! `u8` once, so flat regions keep their exact value at any kernel size.

use image::{ImageBuffer, Rgb, Rgba};

use crate::types::{BlurConfig, BlurParameters, ChannelLayout, PipelineError, PixelBuffer};

/// Kernel edge length for an image `width` pixels wide.
///
/// Always odd and at least [`BlurConfig::MIN_KERNEL_SIZE`]. Non-finite
/// or non-positive factors fall back to the minimum.
#[must_use]
pub fn kernel_size(width: u32, blur_factor: f64) -> u32 {
    let scaled = (f64::from(width) * blur_factor).floor();
    let min = BlurConfig::MIN_KERNEL_SIZE;
    let base = if scaled >= f64::from(min) {
        // Leave headroom for the odd round-up below.
        #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let k = scaled.min(f64::from(u32::MAX - 1)) as u32;
        k
    } else {
        min
    };
    if base % 2 == 0 { base + 1 } else { base }
}

/// Standard deviation implied by a kernel size when none is given.
#[must_use]
pub fn sigma_for_kernel(kernel_size: u32) -> f64 {
    0.3f64.mul_add((f64::from(kernel_size) - 1.0).mul_add(0.5, -1.0), 0.8)
}

/// Normalized 1-D Gaussian weights of length `kernel_size`.
///
/// The weights sum to 1 so uniform regions keep their value.
#[must_use]
pub fn gaussian_kernel(kernel_size: u32, sigma: f64) -> Vec<f32> {
    let radius = f64::from(kernel_size / 2);
    let denom = 2.0 * sigma * sigma;
    let weights: Vec<f64> = (0..kernel_size)
        .map(|i| {
            let d = f64::from(i) - radius;
            (-(d * d) / denom).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    #[expect(clippy::cast_possible_truncation)]
    let normalized = weights.iter().map(|w| (w / sum) as f32).collect();
    normalized
}

/// Apply a Gaussian blur sized from the input width.
///
/// The output has the same dimensions and channel layout as `input`;
/// every channel value is clamped to `0..=255`.
///
/// # Errors
///
/// Returns [`PipelineError::BufferSize`] if the buffer cannot be viewed
/// as an image of its declared dimensions (not possible for buffers
/// built through [`PixelBuffer::new`]).
pub fn blur(input: &PixelBuffer, config: &BlurConfig) -> Result<PixelBuffer, PipelineError> {
    blur_with_parameters(input, config).map(|(blurred, _)| blurred)
}

/// Like [`blur`], also returning the parameters that were used.
///
/// # Errors
///
/// See [`blur`].
pub fn blur_with_parameters(
    input: &PixelBuffer,
    config: &BlurConfig,
) -> Result<(PixelBuffer, BlurParameters), PipelineError> {
    let params = BlurParameters::for_width(input.width(), config);
    let h_kernel = gaussian_kernel(params.kernel_size, params.effective_sigma_x());
    let v_kernel = gaussian_kernel(params.kernel_size, params.effective_sigma_y());

    let (w, h) = (input.width(), input.height());
    let samples: Vec<f32> = input.pixels().iter().copied().map(f32::from).collect();
    let mismatch = || PipelineError::BufferSize {
        expected: w as usize * h as usize * usize::from(input.channels()),
        actual: input.pixels().len(),
    };

    let filtered = match input.layout() {
        ChannelLayout::Bgr => {
            let image =
                ImageBuffer::<Rgb<f32>, Vec<f32>>::from_raw(w, h, samples).ok_or_else(mismatch)?;
            imageproc::filter::separable_filter(&image, &h_kernel, &v_kernel).into_raw()
        }
        ChannelLayout::Bgra => {
            let image =
                ImageBuffer::<Rgba<f32>, Vec<f32>>::from_raw(w, h, samples).ok_or_else(mismatch)?;
            imageproc::filter::separable_filter(&image, &h_kernel, &v_kernel).into_raw()
        }
    };

    let blurred = PixelBuffer::new(w, h, input.layout(), to_bytes(&filtered))?;
    Ok((blurred, params))
}

/// Round filtered samples to the nearest byte.
fn to_bytes(samples: &[f32]) -> Vec<u8> {
    samples
        .iter()
        .map(|&v| {
            #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let byte = v.round().clamp(0.0, 255.0) as u8;
            byte
        })
        .collect()
}
