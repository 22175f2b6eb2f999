//! Process-wide registration of static asset paths.
//!
//! A slot is written at most once. Callers initialize it explicitly before the
//! asset is first needed; later registrations are no-ops.

use crate::utils::error::Result;
use crate::utils::validation;
use std::sync::OnceLock;

pub const DEFAULT_RENDERER_WASM_PATH: &str = "/static/renderer.wasm";

/// Same-origin path of the renderer's WebAssembly binary.
pub static RENDERER_WASM: AssetSlot = AssetSlot::new("renderer_wasm");

#[derive(Debug)]
pub struct AssetSlot {
    name: &'static str,
    path: OnceLock<String>,
}

impl AssetSlot {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            path: OnceLock::new(),
        }
    }

    /// Stores `path` if the slot is empty.
    ///
    /// Returns `Ok(true)` when this call performed the registration and
    /// `Ok(false)` when the slot was already set; the first path wins.
    pub fn register(&self, path: &str) -> Result<bool> {
        validation::validate_same_origin_path(self.name, path)?;

        let mut registered = false;
        let current = self.path.get_or_init(|| {
            registered = true;
            path.to_string()
        });

        if registered {
            tracing::debug!("Registered asset '{}' at {}", self.name, current);
        } else if current != path {
            tracing::debug!(
                "Asset '{}' already registered at {}, ignoring {}",
                self.name,
                current,
                path
            );
        }

        Ok(registered)
    }

    pub fn get(&self) -> Option<&str> {
        self.path.get().map(String::as_str)
    }

    pub fn is_registered(&self) -> bool {
        self.path.get().is_some()
    }
}

/// Registers [`DEFAULT_RENDERER_WASM_PATH`] in [`RENDERER_WASM`].
pub fn init_renderer_wasm() -> Result<bool> {
    RENDERER_WASM.register(DEFAULT_RENDERER_WASM_PATH)
}
