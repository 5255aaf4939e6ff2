//! Vitrina Core - Mesh bindings, presets and material resolution
//!
//! This crate holds the renderer-independent part of the Vitrina admin panel:
//! - A flat model view with stable mesh identifiers and ray picking
//! - The binding store (mesh to material SKU) and saved presets
//! - Material resolution from SKU conventions and catalog PBR settings
//! - The orchestrator that ties selection, bindings and application together
//! - Experience publishing payloads and upload validation

pub mod applier;
pub mod binding;
pub mod experience;
pub mod material;
pub mod model;
pub mod notification;
pub mod orchestrator;
pub mod picker;
pub mod raycast;
pub mod tiling;
pub mod upload;

pub use applier::{ApplyError, ApplyOptions, ApplyRequest, ApplyStart, ApplyTicket, MaterialApplier, ResolvedTextures};
pub use binding::{Binding, BindingChange, BindingError, BindingStore, DeleteOutcome, Preset};
pub use experience::{ExperienceError, ExperiencePayload};
pub use material::{MaterialChannel, MaterialConventions, MaterialEdit, MaterialKind, MaterialResource, PbrSettings};
pub use model::{LoadedModel, MaterialParams, MaterialSlot, MeshId, MeshNode, PbrMaterial, Rgba};
pub use notification::{Notification, NotificationDurations, NotificationLevel};
pub use orchestrator::{ClickTarget, Intent, PresetOrchestrator, TargetSelection};
pub use picker::MeshPicker;
pub use raycast::{Aabb, Ray};
pub use tiling::TilingConfig;
pub use upload::ModelFileError;
