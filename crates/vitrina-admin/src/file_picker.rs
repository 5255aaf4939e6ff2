//! Model file picker
//!
//! The browser build opens a hidden `<input type="file">` and reads the choice
//! with a `FileReader`; native builds use the system dialog. Either way the
//! bytes end up in [`PendingFileResults`], which the upload flow drains.

use bevy::prelude::*;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// File filter for the picker dialog
#[derive(Debug, Clone)]
pub struct FileFilter {
    /// Display name (e.g., "3D Models")
    pub name: String,
    /// File extensions without dots
    pub extensions: Vec<String>,
}

impl FileFilter {
    pub fn models() -> Self {
        Self {
            name: "3D Models".to_string(),
            extensions: vec!["glb".to_string(), "gltf".to_string()],
        }
    }

    /// Convert to accept string for HTML input element
    pub fn to_accept_string(&self) -> String {
        if self.extensions.is_empty() {
            "*".to_string()
        } else {
            self.extensions
                .iter()
                .map(|ext| format!(".{}", ext))
                .collect::<Vec<_>>()
                .join(",")
        }
    }
}

/// A file chosen by the user
#[derive(Debug, Clone, PartialEq)]
pub struct PickedFile {
    /// Filename (without path)
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Outcome of one pick, `Err` when the file could not be read
pub type PickResult = Result<PickedFile, String>;

/// Picks delivered by dialog callbacks
#[derive(Resource, Default, Clone)]
pub struct PendingFileResults(pub Arc<Mutex<VecDeque<PickResult>>>);

impl PendingFileResults {
    pub fn push(&self, result: PickResult) {
        if let Ok(mut results) = self.0.lock() {
            results.push_back(result);
        }
    }

    /// Drain every pick delivered so far
    pub fn drain(&self) -> Vec<PickResult> {
        match self.0.try_lock() {
            Ok(mut results) => results.drain(..).collect(),
            Err(_) => Vec::new(),
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod js_interop {
    use super::*;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use web_sys::HtmlInputElement;

    /// Open a file picker dialog using a hidden input element
    pub fn open_file_picker(accept: &str, pending: PendingFileResults) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            tracing::error!("open_file_picker: no document object");
            return;
        };

        let input: HtmlInputElement = match document
            .create_element("input")
            .map(|el| el.dyn_into::<HtmlInputElement>())
        {
            Ok(Ok(input)) => input,
            _ => {
                tracing::error!("open_file_picker: failed to create input element");
                return;
            }
        };

        input.set_type("file");
        input.set_accept(accept);
        input.style().set_property("display", "none").ok();

        let Some(body) = document.body() else {
            tracing::error!("open_file_picker: no document body");
            return;
        };
        if let Err(e) = body.append_child(&input) {
            tracing::error!("open_file_picker: failed to append input: {:?}", e);
            return;
        }

        let input_clone = input.clone();
        let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            if let Some(file) = input_clone.files().and_then(|files| files.get(0)) {
                read_file(file, pending.clone());
            } else {
                tracing::debug!("open_file_picker: no file selected");
            }

            if let Some(parent) = input_clone.parent_node() {
                parent.remove_child(&input_clone).ok();
            }
        }) as Box<dyn FnMut(_)>);

        input.set_onchange(Some(closure.as_ref().unchecked_ref()));
        closure.forget();

        input.click();
    }

    fn read_file(file: web_sys::File, pending: PendingFileResults) {
        let name = file.name();
        let reader = match web_sys::FileReader::new() {
            Ok(reader) => reader,
            Err(e) => {
                pending.push(Err(format!("Cannot read {}: {:?}", name, e)));
                return;
            }
        };

        let reader_clone = reader.clone();
        let onload = Closure::wrap(Box::new(move |_: web_sys::Event| {
            let bytes = reader_clone
                .result()
                .ok()
                .and_then(|result| result.dyn_into::<js_sys::ArrayBuffer>().ok())
                .map(|buffer| js_sys::Uint8Array::new(&buffer).to_vec());
            match bytes {
                Some(bytes) => {
                    tracing::info!(file = %name, size = bytes.len(), "File read");
                    pending.push(Ok(PickedFile {
                        name: name.clone(),
                        bytes,
                    }));
                }
                None => pending.push(Err(format!("Cannot read {}", name))),
            }
        }) as Box<dyn FnMut(_)>);

        reader.set_onload(Some(onload.as_ref().unchecked_ref()));
        onload.forget();

        reader.read_as_array_buffer(&file).ok();
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod js_interop {
    use super::*;

    /// Blocks on the system dialog, then reads the file from disk
    pub fn open_file_picker(_accept: &str, pending: PendingFileResults) {
        let filter = FileFilter::models();
        let extensions: Vec<&str> = filter.extensions.iter().map(String::as_str).collect();
        let Some(path) = rfd::FileDialog::new()
            .add_filter(filter.name.as_str(), &extensions)
            .pick_file()
        else {
            return;
        };
        pending.push(read_local_file(&path));
    }
}

pub use js_interop::open_file_picker;

/// Read a file from disk into a pick result
#[cfg(not(target_arch = "wasm32"))]
pub fn read_local_file(path: &std::path::Path) -> PickResult {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    std::fs::read(path)
        .map(|bytes| PickedFile { name, bytes })
        .map_err(|e| format!("Cannot read {}: {}", path.display(), e))
}

/// Helper to trigger file open from UI
pub fn trigger_file_open(pending: &PendingFileResults, filter: FileFilter) {
    let accept = filter.to_accept_string();
    tracing::debug!(accept = %accept, "Opening file picker");
    open_file_picker(&accept, pending.clone());
}
