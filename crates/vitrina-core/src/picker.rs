//! Hover picking of target meshes during selection mode

use tracing::trace;

use crate::model::{LoadedModel, MeshId};
use crate::raycast::Ray;

/// Tracks the mesh under the pointer and keeps it highlighted.
///
/// Inactive pickers ignore pointer movement entirely.
#[derive(Debug, Clone, Default)]
pub struct MeshPicker {
    active: bool,
    highlighted: Option<MeshId>,
}

impl MeshPicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Stop interpreting pointer movement and restore any highlighted mesh
    pub fn deactivate(&mut self, model: &mut LoadedModel) {
        self.clear_highlight(model);
        self.active = false;
    }

    /// Mesh currently under the pointer, if any
    pub fn current_highlighted(&self) -> Option<&MeshId> {
        self.highlighted.as_ref()
    }

    /// Handle a pointer move. `None` means the pointer left the viewport.
    pub fn pointer_moved(&mut self, ray: Option<&Ray>, model: &mut LoadedModel) {
        if !self.active {
            return;
        }

        let hit = ray.and_then(|ray| model.intersect(ray)).map(|hit| hit.mesh);
        if hit == self.highlighted {
            return;
        }

        self.clear_highlight(model);

        if let Some(id) = hit {
            if let Some(node) = model.get_mut(&id) {
                trace!(mesh = %id, "Highlighting mesh");
                node.highlight();
                self.highlighted = Some(id);
            }
        }
    }

    /// Forget the highlighted mesh without touching the model.
    ///
    /// Used when the model it belonged to has been replaced.
    pub fn invalidate(&mut self) {
        self.highlighted = None;
    }

    fn clear_highlight(&mut self, model: &mut LoadedModel) {
        if let Some(previous) = self.highlighted.take() {
            if let Some(node) = model.get_mut(&previous) {
                node.unhighlight();
            }
        }
    }
}
