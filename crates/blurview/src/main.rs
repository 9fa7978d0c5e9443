mod surface;

use std::path::PathBuf;
use std::process::ExitCode;

use blurview_io::{
    FitSize, ImageSlot, ImageView, SessionController, SessionError, SessionEvent, Toolbar, logging,
};
use blurview_pipeline::{BlurConfig, CodecBackend, PipelineError};
use dioxus::desktop::{Config, LogicalSize, WindowBuilder};
use dioxus::prelude::*;

use crate::surface::DesktopSurface;

/// Title of the main window.
const MAIN_TITLE: &str = "Image Processor";

fn main() -> ExitCode {
    logging::init();

    let backend = match backend_or_exit(CodecBackend::initialize()) {
        Ok(backend) => backend,
        Err(code) => return code,
    };
    tracing::debug!(formats = ?backend.formats(), "codec backend ready");

    let window = WindowBuilder::new()
        .with_title(MAIN_TITLE)
        .with_inner_size(LogicalSize::new(600.0, 400.0));
    dioxus::LaunchBuilder::desktop()
        .with_cfg(Config::new().with_window(window))
        .with_context(backend)
        .launch(app);
    ExitCode::SUCCESS
}

/// Log a failed backend initialization and pick the exit code for it.
fn backend_or_exit(
    initialized: Result<CodecBackend, PipelineError>,
) -> Result<CodecBackend, ExitCode> {
    initialized.map_err(|e| {
        tracing::error!("{}", SessionError::NativeLibraryInitFailed(e));
        ExitCode::FAILURE
    })
}

/// Root application component.
///
/// Owns the session controller and the desktop view surface, and routes
/// toolbar events into [`SessionController::dispatch`].
fn app() -> Element {
    let mut session = use_signal(|| {
        SessionController::new(consume_context::<CodecBackend>(), BlurConfig::default())
    });
    let surface = DesktopSurface::use_surface();

    // Comparison windows do not outlive the main window.
    use_drop(move || surface.close_comparisons());

    let on_open = move |path: Option<PathBuf>| {
        let mut view = surface;
        session
            .write()
            .dispatch(SessionEvent::OpenRequested(path), &mut view);
    };

    let on_process = move |()| {
        let mut view = surface;
        session
            .write()
            .dispatch(SessionEvent::ProcessRequested, &mut view);
    };

    let on_blur_factor = move |factor: f64| {
        if let Err(e) = session.write().set_blur_factor(factor) {
            tracing::error!("{e}");
        }
    };

    let blur_factor = session.read().config().blur_factor;

    rsx! {
        div {
            style: "font-family: sans-serif; display: flex; flex-direction: column;",
            Toolbar {
                on_open: on_open,
                on_process: on_process,
                on_blur_factor: on_blur_factor,
                blur_factor: blur_factor,
            }
            div {
                style: "display: flex; flex-direction: row; gap: 10px; padding: 0 10px 10px;",
                ImageView {
                    slot: ImageSlot::Original,
                    image: (surface.primary)(),
                    fit: Some(FitSize::MAIN_SLOT),
                }
                ImageView {
                    slot: ImageSlot::Processed,
                    image: (surface.processed)(),
                    fit: Some(FitSize::MAIN_SLOT),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use image::ImageFormat;

    use super::*;

    #[test]
    fn backend_failure_exits_with_failure() {
        let missing = CodecBackend::with_formats(&[ImageFormat::Png, ImageFormat::OpenExr]);
        assert!(missing.is_err());
        assert_eq!(backend_or_exit(missing).err(), Some(ExitCode::FAILURE));
    }

    #[test]
    fn ready_backend_is_kept() {
        assert!(backend_or_exit(CodecBackend::initialize()).is_ok());
    }
}
