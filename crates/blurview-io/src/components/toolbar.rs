//! Main-window controls: file chooser, Process button, blur factor.

use std::path::PathBuf;

use blurview_pipeline::BlurConfig;
use blurview_pipeline::codec::SUPPORTED_EXTENSIONS;
use dioxus::html::FileData;
use dioxus::prelude::*;

/// `accept` attribute for the file chooser, e.g. `.png,.jpg`.
#[must_use]
pub fn accept_filter() -> String {
    SUPPORTED_EXTENSIONS
        .iter()
        .map(|ext| format!(".{ext}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse the blur factor field. Blank and non-numeric input is `None`.
fn parse_factor(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Props for the [`Toolbar`] component.
#[derive(Props, Clone, PartialEq)]
pub struct ToolbarProps {
    /// Called with the chosen file, or `None` if the chooser closed
    /// without a selection.
    on_open: EventHandler<Option<PathBuf>>,
    /// Called when "Process Image" is pressed.
    on_process: EventHandler<()>,
    /// Called with a new blur factor typed by the user.
    on_blur_factor: EventHandler<f64>,
    /// Factor currently in effect, shown in the field.
    blur_factor: f64,
}

/// A row of controls with 10 px spacing.
///
/// "Process Image" is always enabled; pressing it with nothing open is
/// ignored by the session.
#[component]
pub fn Toolbar(props: ToolbarProps) -> Element {
    let accept = accept_filter();
    let max_factor = BlurConfig::MAX_BLUR_FACTOR;
    let factor = props.blur_factor;

    let handle_files = move |evt: FormEvent| {
        let files: Vec<FileData> = evt.files();
        props.on_open.call(files.first().map(FileData::path));
    };

    let handle_factor = move |evt: FormEvent| {
        if let Some(factor) = parse_factor(&evt.value()) {
            props.on_blur_factor.call(factor);
        }
    };

    rsx! {
        div {
            style: "display: flex; flex-direction: row; gap: 10px; align-items: center; padding: 10px;",
            label {
                style: "padding: 4px 12px; border: 1px solid #999; border-radius: 4px; cursor: pointer;",
                input {
                    r#type: "file",
                    accept: "{accept}",
                    style: "display: none;",
                    onchange: handle_files,
                }
                "Open Image"
            }
            button {
                style: "padding: 4px 12px;",
                onclick: move |_| props.on_process.call(()),
                "Process Image"
            }
            label {
                style: "display: flex; gap: 4px; align-items: center; font-size: 0.9em;",
                "Blur factor"
                input {
                    r#type: "number",
                    min: "0.01",
                    max: "{max_factor}",
                    step: "0.01",
                    value: "{factor}",
                    style: "width: 5em;",
                    onchange: handle_factor,
                }
            }
        }
    }
}
