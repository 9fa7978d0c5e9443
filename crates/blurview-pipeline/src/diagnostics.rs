//! Pipeline diagnostics: timing and sizes for each stage of a blur run.
//!
//! [`process_with_diagnostics`] runs the same steps the desktop app runs
//! for Open followed by Process (decode, GUI raster bridge, blur, PNG
//! encode) and records how long each took. The caller supplies the
//! [`Clock`], which keeps this crate free of any particular time source.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::raster::GuiRaster;
use crate::types::{BlurConfig, BlurParameters, PipelineError};
use crate::{ProcessResult, blur, codec};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Monotonic time source used to measure stages.
pub trait Clock {
    /// Opaque timestamp.
    type Instant;

    /// Current timestamp.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Diagnostics collected from a single run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessDiagnostics {
    /// Stage 0: decode the source bytes to BGR.
    pub decode: StageDiagnostics,
    /// Stage 1: pack into a GUI raster and bridge back to BGR.
    pub bridge: StageDiagnostics,
    /// Stage 2: Gaussian blur.
    pub blur: StageDiagnostics,
    /// Stage 3: PNG encode of the blurred result.
    pub encode: StageDiagnostics,
    /// Total wall-clock duration of the run (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
}

/// Diagnostics for a single stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Image decoding metrics.
    Decode {
        /// Size of the input image bytes.
        input_bytes: usize,
        /// Decoded width in pixels.
        width: u32,
        /// Decoded height in pixels.
        height: u32,
    },
    /// GUI raster bridge metrics.
    Bridge {
        /// Storage variant that was bridged.
        raster_kind: String,
        /// Number of pixels converted.
        pixel_count: u64,
    },
    /// Gaussian blur metrics.
    Blur {
        /// Kernel parameters used.
        parameters: BlurParameters,
        /// Effective sigma after resolving the `0.0` sentinel.
        sigma: f64,
    },
    /// PNG encode metrics.
    Encode {
        /// Size of the PNG stream in bytes.
        png_bytes: usize,
    },
}

impl ProcessDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Blur Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<12} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(60));

        let total_ms = duration_ms(self.total_duration);
        let stages = [
            ("Decode", &self.decode),
            ("Bridge", &self.bridge),
            ("Blur", &self.blur),
            ("Encode", &self.encode),
        ];
        for (name, diag) in stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<12} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.join("\n")
    }

    /// Kernel edge length used by the blur stage.
    #[must_use]
    pub fn kernel_size(&self) -> Option<u32> {
        match &self.blur.metrics {
            StageMetrics::Blur { parameters, .. } => Some(parameters.kernel_size),
            _ => None,
        }
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Decode {
            input_bytes,
            width,
            height,
        } => format!("{input_bytes} bytes -> {width}x{height}"),
        StageMetrics::Bridge {
            raster_kind,
            pixel_count,
        } => format!("{raster_kind}, {pixel_count} pixels"),
        StageMetrics::Blur { parameters, sigma } => {
            let k = parameters.kernel_size;
            format!("kernel={k}x{k} sigma={sigma:.2}")
        }
        StageMetrics::Encode { png_bytes } => format!("{png_bytes} bytes"),
    }
}

/// Decode, bridge, blur, and encode `image_bytes`, timing each stage.
///
/// # Errors
///
/// Returns the first [`PipelineError`] raised by any stage.
pub fn process_with_diagnostics<C: Clock>(
    image_bytes: &[u8],
    config: &BlurConfig,
    clock: &C,
) -> Result<(ProcessResult, ProcessDiagnostics), PipelineError> {
    let start = clock.now();

    let t = clock.now();
    let decoded = codec::decode(image_bytes)?;
    let decode = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Decode {
            input_bytes: image_bytes.len(),
            width: decoded.width(),
            height: decoded.height(),
        },
    };

    let t = clock.now();
    let rgba = image::RgbaImage::from_fn(decoded.width(), decoded.height(), |x, y| {
        let px = decoded.pixel(x, y).unwrap_or(&[0, 0, 0]);
        image::Rgba([px[2], px[1], px[0], u8::MAX])
    });
    let raster = GuiRaster::packed_from_rgba(&rgba);
    let original = raster.to_pixel_buffer()?;
    let bridge = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Bridge {
            raster_kind: raster.data.kind().to_owned(),
            pixel_count: u64::from(original.width()) * u64::from(original.height()),
        },
    };

    let t = clock.now();
    let (blurred, parameters) = blur::blur_with_parameters(&original, config)?;
    let blur = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Blur {
            parameters,
            sigma: parameters.effective_sigma_x(),
        },
    };

    let t = clock.now();
    let png = codec::encode_png(&blurred)?;
    let encode = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Encode {
            png_bytes: png.len(),
        },
    };

    let diagnostics = ProcessDiagnostics {
        decode,
        bridge,
        blur,
        encode,
        total_duration: clock.elapsed(&start),
    };
    let result = ProcessResult {
        original,
        blurred,
        parameters,
        png,
    };
    Ok((result, diagnostics))
}
