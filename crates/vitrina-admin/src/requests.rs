//! Catalog calls issued from the panels
//!
//! Each kind of call has one result slot. The UI starts a call, a background
//! task fills the slot, and `poll_*` systems move finished results into
//! [`PanelState`](crate::ui::PanelState).

use bevy::prelude::*;
use std::future::Future;
use std::sync::{Arc, Mutex};
use vitrina_catalog::{CatalogError, MaterialSummary, ProjectSummary, TempUpload};
use vitrina_core::{MaterialResource, PbrSettings};
use vitrina_scene::TaskSpawner;

/// Result of a background call, `None` until it finishes
pub type Slot<T> = Arc<Mutex<Option<Result<T, String>>>>;

#[derive(Resource, Default)]
pub struct CatalogRequests {
    pub materials: Slot<Vec<MaterialSummary>>,
    pub material_info: Slot<MaterialResource>,
    /// SKU of the material whose edit was stored
    pub material_saved: Slot<String>,
    /// SKU and the preview settings the server stored
    pub pbr_saved: Slot<(String, PbrSettings)>,
    /// SKU of the removed material
    pub material_deleted: Slot<String>,
    pub upload: Slot<TempUpload>,
    /// Folder created for the experience
    pub experience: Slot<String>,
    pub projects: Slot<Vec<ProjectSummary>>,
    /// Id of the removed project
    pub project_deleted: Slot<String>,
}

/// Take a finished result out of `slot`
pub fn take<T>(slot: &Slot<T>) -> Option<Result<T, String>> {
    slot.try_lock().ok().and_then(|mut result| result.take())
}

async fn deliver<T, F>(slot: Slot<T>, future: F)
where
    F: Future<Output = Result<T, CatalogError>>,
{
    let result = future.await.map_err(|e| e.to_string());
    if let Ok(mut pending) = slot.lock() {
        *pending = Some(result);
    }
}

/// Run `future` in the background and store its outcome in `slot`
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_into<T, F>(spawner: &TaskSpawner, slot: &Slot<T>, future: F)
where
    T: Send + 'static,
    F: Future<Output = Result<T, CatalogError>> + Send + 'static,
{
    spawner.spawn(deliver(slot.clone(), future));
}

#[cfg(target_arch = "wasm32")]
pub fn spawn_into<T, F>(spawner: &TaskSpawner, slot: &Slot<T>, future: F)
where
    T: 'static,
    F: Future<Output = Result<T, CatalogError>> + 'static,
{
    spawner.spawn(deliver(slot.clone(), future));
}
