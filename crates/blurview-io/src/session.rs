//! Session controller: holds the opened image and drives Open and
//! Process.
//!
//! The controller owns the codec backend, the blur configuration, and the
//! session state. It is driven from UI event handlers through
//! [`SessionController::dispatch`], which logs failures and never lets
//! them escape into the event loop. [`open`](SessionController::open) and
//! [`process`](SessionController::process) are also public for callers
//! that want the typed error.
//!
//! Every operation either completes or leaves the state exactly as it
//! found it.

use std::path::{Path, PathBuf};

use blurview_pipeline::{
    BlurConfig, BlurParameters, CodecBackend, PipelineError, PixelBuffer, blur,
};

use crate::file::{self, OpenError};
use crate::view::ViewSurface;

/// Errors reported by the session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The codec backend failed its startup checks.
    #[error("image codec backend failed to initialize: {0}")]
    NativeLibraryInitFailed(#[source] PipelineError),

    /// The chosen file could not be decoded.
    #[error("failed to open image: {0}")]
    DecodeFailed(#[source] OpenError),

    /// The chosen file decoded to an image with zero width or height.
    #[error("{}: image is empty", .0.display())]
    EmptyImage(PathBuf),

    /// The displayed image uses pixel storage the bridge cannot convert.
    #[error("cannot read displayed image: {0}")]
    UnsupportedRaster(#[source] PipelineError),

    /// The blur itself failed.
    #[error("blur failed: {0}")]
    BlurFailed(#[source] PipelineError),

    /// An image could not be encoded as PNG for display.
    #[error("failed to encode image for display: {0}")]
    EncodeFailed(#[source] PipelineError),

    /// The blur configuration is invalid.
    #[error("invalid blur configuration: {0}")]
    InvalidConfig(#[source] PipelineError),
}

impl From<OpenError> for SessionError {
    fn from(err: OpenError) -> Self {
        match err {
            OpenError::Empty(path) => Self::EmptyImage(path),
            other => Self::DecodeFailed(other),
        }
    }
}

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No image has been opened.
    Empty,
    /// An image is open and has not been processed since.
    Loaded,
    /// The open image has been blurred at least once.
    Processed,
}

/// A request from the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The user picked a file, or cancelled the chooser (`None`).
    OpenRequested(Option<PathBuf>),
    /// The user pressed Process.
    ProcessRequested,
}

/// Images held by the session.
///
/// `last_processed` is only ever set while `original` is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    original: Option<PixelBuffer>,
    last_processed: Option<PixelBuffer>,
}

impl SessionState {
    /// Lifecycle phase implied by the held images.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        match (&self.original, &self.last_processed) {
            (None, _) => Phase::Empty,
            (Some(_), None) => Phase::Loaded,
            (Some(_), Some(_)) => Phase::Processed,
        }
    }
}

/// Drives Open and Process against a [`ViewSurface`].
#[derive(Debug)]
pub struct SessionController {
    backend: CodecBackend,
    config: BlurConfig,
    state: SessionState,
}

impl SessionController {
    /// Create a controller around an already-initialized backend.
    #[must_use]
    pub fn new(backend: CodecBackend, config: BlurConfig) -> Self {
        Self {
            backend,
            config,
            state: SessionState::default(),
        }
    }

    /// Initialize the codec backend and create a controller.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidConfig`] if `config` is invalid and
    /// [`SessionError::NativeLibraryInitFailed`] if the backend fails its
    /// startup checks.
    pub fn initialize(config: BlurConfig) -> Result<Self, SessionError> {
        config.validate().map_err(SessionError::InvalidConfig)?;
        let backend = CodecBackend::initialize().map_err(SessionError::NativeLibraryInitFailed)?;
        Ok(Self::new(backend, config))
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// The held original, if an image is open.
    #[must_use]
    pub const fn original(&self) -> Option<&PixelBuffer> {
        self.state.original.as_ref()
    }

    /// The most recent blur result for the open image.
    #[must_use]
    pub const fn last_processed(&self) -> Option<&PixelBuffer> {
        self.state.last_processed.as_ref()
    }

    /// Active blur configuration.
    #[must_use]
    pub const fn config(&self) -> &BlurConfig {
        &self.config
    }

    /// Change the blur factor used by subsequent Process requests.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidConfig`] and keeps the previous
    /// factor if `blur_factor` is out of range.
    pub fn set_blur_factor(&mut self, blur_factor: f64) -> Result<(), SessionError> {
        self.config = BlurConfig::new(blur_factor).map_err(SessionError::InvalidConfig)?;
        Ok(())
    }

    /// Open the image at `path` and show it in the primary slot.
    ///
    /// Replaces any previously opened image and drops its blur result.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::DecodeFailed`] or
    /// [`SessionError::EmptyImage`] if the file cannot be used, and
    /// [`SessionError::EncodeFailed`] if it cannot be prepared for
    /// display. The view and state are untouched on error.
    pub fn open(&mut self, path: &Path, view: &mut dyn ViewSurface) -> Result<(), SessionError> {
        let original = file::decode_file(path, &self.backend)?;
        let png = self
            .backend
            .encode_png(&original)
            .map_err(SessionError::EncodeFailed)?;

        view.set_primary_image(&png);
        view.clear_processed_image();
        tracing::info!(
            path = %path.display(),
            width = original.width(),
            height = original.height(),
            "image opened"
        );
        self.state = SessionState {
            original: Some(original),
            last_processed: None,
        };
        Ok(())
    }

    /// Blur the open image and show the result.
    ///
    /// The source is the surface's own decoded copy of the primary image
    /// when it keeps one, otherwise the held original. Returns `Ok(None)`
    /// without touching the view when no image is open.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnsupportedRaster`] if the surface's raster
    /// cannot be bridged, [`SessionError::BlurFailed`] if the blur fails,
    /// and [`SessionError::EncodeFailed`] if a result cannot be encoded.
    /// On error the view is untouched and any earlier result is dropped,
    /// leaving the session [`Phase::Loaded`].
    pub fn process(
        &mut self,
        view: &mut dyn ViewSurface,
    ) -> Result<Option<BlurParameters>, SessionError> {
        let Some(held) = &self.state.original else {
            tracing::debug!("process requested with no image open");
            return Ok(None);
        };

        match self.blur_and_show(held, view) {
            Ok((blurred, parameters)) => {
                self.state.last_processed = Some(blurred);
                Ok(Some(parameters))
            }
            Err(e) => {
                self.state.last_processed = None;
                Err(e)
            }
        }
    }

    /// Every fallible step of [`process`](Self::process). The view is
    /// only updated once nothing else can fail.
    fn blur_and_show(
        &self,
        held: &PixelBuffer,
        view: &mut dyn ViewSurface,
    ) -> Result<(PixelBuffer, BlurParameters), SessionError> {
        let source = match view.primary_raster() {
            Some(raster) => raster
                .to_pixel_buffer()
                .map_err(SessionError::UnsupportedRaster)?,
            None => held.clone(),
        }
        .into_bgr();

        let (blurred, parameters) = blur::blur_with_parameters(&source, &self.config)
            .map_err(|e| match e {
                PipelineError::InvalidConfig(_) => SessionError::InvalidConfig(e),
                other => SessionError::BlurFailed(other),
            })?;
        let original_png = self
            .backend
            .encode_png(&source)
            .map_err(SessionError::EncodeFailed)?;
        let processed_png = self
            .backend
            .encode_png(&blurred)
            .map_err(SessionError::EncodeFailed)?;

        view.set_processed_image(&processed_png);
        view.open_comparison_window(&original_png, &processed_png);
        tracing::info!(
            kernel_size = parameters.kernel_size,
            width = blurred.width(),
            height = blurred.height(),
            "image processed"
        );
        Ok((blurred, parameters))
    }

    /// Handle one UI event, logging any failure.
    ///
    /// Returns the phase after the event.
    pub fn dispatch(&mut self, event: SessionEvent, view: &mut dyn ViewSurface) -> Phase {
        let result = match event {
            SessionEvent::OpenRequested(None) => {
                tracing::debug!("file selection cancelled");
                Ok(())
            }
            SessionEvent::OpenRequested(Some(path)) => self.open(&path, view),
            SessionEvent::ProcessRequested => self.process(view).map(|_| ()),
        };
        if let Err(e) = result {
            tracing::error!("{e}");
        }
        self.phase()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use blurview_pipeline::{ChannelLayout, GuiRaster, RasterData, codec};

    use super::*;
    use crate::view::HeadlessSurface;

    fn controller() -> SessionController {
        SessionController::initialize(BlurConfig::default()).unwrap()
    }

    /// Controller with an image already open, bypassing the filesystem.
    fn loaded(width: u32, height: u32) -> SessionController {
        let mut c = controller();
        let pixels = (0..width * height * 3).map(|i| (i % 256) as u8).collect();
        c.state.original = Some(PixelBuffer::new(width, height, ChannelLayout::Bgr, pixels).unwrap());
        c
    }

    /// Surface whose primary raster is storage the bridge rejects.
    struct OddRasterSurface(HeadlessSurface);

    impl ViewSurface for OddRasterSurface {
        fn set_primary_image(&mut self, png: &[u8]) {
            self.0.set_primary_image(png);
        }
        fn set_processed_image(&mut self, png: &[u8]) {
            self.0.set_processed_image(png);
        }
        fn clear_processed_image(&mut self) {
            self.0.clear_processed_image();
        }
        fn open_comparison_window(&mut self, original_png: &[u8], processed_png: &[u8]) {
            self.0.open_comparison_window(original_png, processed_png);
        }
        fn primary_raster(&self) -> Option<GuiRaster> {
            Some(GuiRaster::new(1, 1, RasterData::Other("float-rgb".to_owned())))
        }
    }

    #[test]
    fn new_session_is_empty() {
        let c = controller();
        assert_eq!(c.phase(), Phase::Empty);
        assert!(c.original().is_none());
        assert!(c.last_processed().is_none());
    }

    #[test]
    fn initialize_rejects_invalid_config() {
        let result = SessionController::initialize(BlurConfig { blur_factor: -1.0 });
        assert!(matches!(result, Err(SessionError::InvalidConfig(_))));
    }

    #[test]
    fn process_without_image_is_a_no_op() {
        let mut c = controller();
        let mut view = HeadlessSurface::new();
        assert_eq!(c.process(&mut view).unwrap(), None);
        assert_eq!(view.calls, 0);
        assert_eq!(c.phase(), Phase::Empty);
    }

    #[test]
    fn process_shows_result_and_opens_comparison() {
        let mut c = loaded(100, 10);
        let mut view = HeadlessSurface::new();
        let params = c.process(&mut view).unwrap().unwrap();

        assert_eq!(params.kernel_size, 5);
        assert_eq!(c.phase(), Phase::Processed);
        assert_eq!(view.comparisons.len(), 1);
        let shown = codec::decode(view.processed.as_deref().unwrap()).unwrap();
        assert_eq!(Some(&shown), c.last_processed());
        let left = codec::decode(&view.comparisons[0].original_png).unwrap();
        assert_eq!(Some(&left), c.original());
    }

    #[test]
    fn each_process_opens_another_comparison() {
        let mut c = loaded(8, 8);
        let mut view = HeadlessSurface::new();
        c.process(&mut view).unwrap();
        c.process(&mut view).unwrap();
        assert_eq!(view.comparisons.len(), 2);
    }

    #[test]
    fn process_prefers_surface_raster() {
        let mut c = loaded(6, 4);
        let mut view = HeadlessSurface::with_raster_readback();
        let other = PixelBuffer::new(6, 4, ChannelLayout::Bgr, vec![200; 72]).unwrap();
        view.set_primary_image(&codec::encode_png(&other).unwrap());

        c.process(&mut view).unwrap();
        let left = codec::decode(&view.comparisons[0].original_png).unwrap();
        assert_eq!(left, other);
    }

    #[test]
    fn unsupported_raster_keeps_image_loaded() {
        let mut c = loaded(4, 4);
        let before = c.state.clone();
        let mut view = OddRasterSurface(HeadlessSurface::new());

        let err = c.process(&mut view).unwrap_err();
        assert!(matches!(err, SessionError::UnsupportedRaster(_)));
        assert_eq!(c.state, before);
        assert_eq!(c.phase(), Phase::Loaded);
        assert_eq!(view.0.calls, 0);
    }

    #[test]
    fn failed_process_after_success_returns_to_loaded() {
        let mut c = loaded(4, 4);
        let original = c.original().cloned();
        c.process(&mut HeadlessSurface::new()).unwrap();
        assert_eq!(c.phase(), Phase::Processed);

        let mut view = OddRasterSurface(HeadlessSurface::new());
        let err = c.process(&mut view).unwrap_err();
        assert!(matches!(err, SessionError::UnsupportedRaster(_)));
        assert_eq!(c.phase(), Phase::Loaded);
        assert!(c.last_processed().is_none());
        assert_eq!(c.original().cloned(), original);
        assert_eq!(view.0.calls, 0);
    }

    #[test]
    fn dispatch_failed_process_reports_loaded() {
        let mut c = loaded(4, 4);
        c.process(&mut HeadlessSurface::new()).unwrap();
        let mut view = OddRasterSurface(HeadlessSurface::new());
        let phase = c.dispatch(SessionEvent::ProcessRequested, &mut view);
        assert_eq!(phase, Phase::Loaded);
    }

    #[test]
    fn dispatch_cancelled_open_is_silent() {
        let mut c = loaded(4, 4);
        let mut view = HeadlessSurface::new();
        let phase = c.dispatch(SessionEvent::OpenRequested(None), &mut view);
        assert_eq!(phase, Phase::Loaded);
        assert_eq!(view.calls, 0);
    }

    #[test]
    fn dispatch_missing_file_keeps_state() {
        let mut c = controller();
        let mut view = HeadlessSurface::new();
        let phase = c.dispatch(
            SessionEvent::OpenRequested(Some(PathBuf::from("/nonexistent/blurview.png"))),
            &mut view,
        );
        assert_eq!(phase, Phase::Empty);
        assert_eq!(view.calls, 0);
    }

    #[test]
    fn missing_file_is_decode_failure() {
        let mut c = controller();
        let mut view = HeadlessSurface::new();
        let err = c
            .open(Path::new("/nonexistent/blurview.png"), &mut view)
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::DecodeFailed(OpenError::NotFound(_))
        ));
    }

    #[test]
    fn empty_open_error_maps_to_empty_image() {
        let err = SessionError::from(OpenError::Empty(PathBuf::from("x.png")));
        assert!(matches!(err, SessionError::EmptyImage(ref p) if p == Path::new("x.png")));
    }

    #[test]
    fn set_blur_factor_validates() {
        let mut c = controller();
        c.set_blur_factor(0.2).unwrap();
        assert!((c.config().blur_factor - 0.2).abs() < f64::EPSILON);
        assert!(c.set_blur_factor(f64::NAN).is_err());
        assert!((c.config().blur_factor - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn larger_factor_gives_larger_kernel() {
        let mut c = loaded(100, 4);
        c.set_blur_factor(0.2).unwrap();
        let mut view = HeadlessSurface::new();
        let params = c.process(&mut view).unwrap().unwrap();
        assert_eq!(params.kernel_size, 21);
    }
}
