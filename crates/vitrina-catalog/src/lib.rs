//! Vitrina Catalog - HTTP client for the material catalog and project API
//!
//! Covers materials, PBR preview configuration, projects, experience
//! publishing and temporary model uploads.

pub mod client;
pub mod types;

pub use client::{CatalogClient, CatalogError};
pub use types::{ExperienceCreated, MaterialSummary, ProjectSummary, TempUpload};
