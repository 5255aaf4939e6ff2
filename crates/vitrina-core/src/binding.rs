//! Mesh-to-material bindings and saved presets

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::model::MeshId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindingError {
    #[error("No bindings to save")]
    EmptyBindingSet,
}

/// A single mesh-to-SKU binding.
///
/// Serialized as `{ "uuid": ..., "sku": ... }`, the layout the experience
/// backend stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    #[serde(rename = "uuid")]
    pub mesh: MeshId,
    pub sku: String,
}

impl Binding {
    pub fn new(mesh: MeshId, sku: impl Into<String>) -> Self {
        Self {
            mesh,
            sku: sku.into(),
        }
    }
}

/// Immutable snapshot of a binding set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Preset {
    bindings: Vec<Binding>,
}

impl Preset {
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Whether `add_or_replace` created a binding or changed an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingChange {
    Added,
    Updated,
}

/// Result of a delete request on a preset row
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// First request: the row now waits for confirmation
    Armed,
    /// Second request: the preset was removed
    Deleted(Preset),
    OutOfRange,
}

/// In-progress bindings plus the list of saved presets
#[derive(Debug, Clone, Default)]
pub struct BindingStore {
    bindings: Vec<Binding>,
    presets: Vec<Preset>,
    /// Confirmation state per preset row, parallel to `presets`
    armed: Vec<bool>,
}

impl BindingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn binding_for(&self, mesh: &MeshId) -> Option<&Binding> {
        self.bindings.iter().find(|b| &b.mesh == mesh)
    }

    /// Bind a mesh to a SKU, replacing in place if the mesh is already bound
    pub fn add_or_replace(&mut self, mesh: MeshId, sku: &str) -> BindingChange {
        if let Some(existing) = self.bindings.iter_mut().find(|b| b.mesh == mesh) {
            debug!(mesh = %mesh, from = %existing.sku, to = %sku, "Binding updated");
            existing.sku = sku.to_string();
            BindingChange::Updated
        } else {
            debug!(mesh = %mesh, sku = %sku, "Binding added");
            self.bindings.push(Binding::new(mesh, sku));
            BindingChange::Added
        }
    }

    /// Remove the binding for a mesh. Returns whether one existed.
    pub fn remove(&mut self, mesh: &MeshId) -> bool {
        let before = self.bindings.len();
        self.bindings.retain(|b| &b.mesh != mesh);
        self.bindings.len() != before
    }

    /// Empty the in-progress list. Saved presets are untouched.
    pub fn clear_all(&mut self) {
        self.bindings.clear();
    }

    /// Snapshot the in-progress list as a new preset and clear it
    pub fn save_preset(&mut self) -> Result<usize, BindingError> {
        if self.bindings.is_empty() {
            return Err(BindingError::EmptyBindingSet);
        }
        let snapshot = Preset {
            bindings: std::mem::take(&mut self.bindings),
        };
        self.presets.push(snapshot);
        self.armed.push(false);
        Ok(self.presets.len() - 1)
    }

    /// Copy a preset into the in-progress list, replacing it.
    ///
    /// Returns the bindings to replay, or `None` when the index is out of range.
    pub fn load_preset(&mut self, index: usize) -> Option<&[Binding]> {
        let preset = self.presets.get(index)?;
        self.bindings = preset.bindings.clone();
        Some(&self.bindings)
    }

    /// Two-step delete: the first call arms the row, the second removes it
    pub fn delete_preset(&mut self, index: usize) -> DeleteOutcome {
        let Some(armed) = self.armed.get_mut(index) else {
            return DeleteOutcome::OutOfRange;
        };
        if !*armed {
            *armed = true;
            return DeleteOutcome::Armed;
        }
        self.armed.remove(index);
        DeleteOutcome::Deleted(self.presets.remove(index))
    }

    pub fn is_armed(&self, index: usize) -> bool {
        self.armed.get(index).copied().unwrap_or(false)
    }
}
