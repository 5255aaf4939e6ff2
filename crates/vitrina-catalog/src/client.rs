//! Async client for the catalog, project and upload endpoints
//!
//! Every method maps one REST call. Non-2xx responses are turned into
//! [`CatalogError::Status`] carrying the server's `{ "error": ... }` message when
//! there is one. Nothing is retried.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use vitrina_core::upload::model_mime_type;
use vitrina_core::{ExperiencePayload, MaterialEdit, MaterialResource, PbrSettings};

use crate::types::{
    ApiErrorBody, ExperienceCreated, MaterialList, MaterialSummary, PbrSettingsSaved, ProjectSummary, TempUpload,
};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Upload rejected: {0}")]
    UploadRejected(String),
    #[error("Experience not created: {0}")]
    ExperienceRejected(String),
    #[error("Settings not saved: {0}")]
    SettingsRejected(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Handle to the backend API. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    /// Create a client for an API rooted at `base_url` (e.g. `http://localhost:3000`)
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(std::time::Duration::from_secs(timeout_secs));
        #[cfg(target_arch = "wasm32")]
        let _ = timeout_secs;

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("error").to_string());
        Err(CatalogError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        let response = Self::check(self.client.get(&url).send().await?).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> Result<serde_json::Value> {
        let url = self.url(path);
        debug!(url = %url, method = %method, "Sending JSON");
        let response = self.client.request(method, &url).json(body).send().await?;
        let response = Self::check(response).await?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Texture materials available for binding
    pub async fn list_materials(&self) -> Result<Vec<MaterialSummary>> {
        let list: MaterialList = self.get_json("/api/available-materials").await?;
        info!(count = list.materials.len(), "Materials loaded");
        Ok(list.materials)
    }

    pub async fn get_material(&self, sku: &str) -> Result<MaterialResource> {
        let mut material: MaterialResource = self.get_json(&format!("/api/materials/{}", sku)).await?;
        if material.id.is_empty() {
            material.id = sku.to_string();
        }
        Ok(material)
    }

    /// PBR tuning for a SKU. Accepts both a bare settings object and `{ pbrSettings }`.
    pub async fn preview_config(&self, sku: &str) -> Result<PbrSettings> {
        let value: serde_json::Value = self
            .get_json(&format!("/api/materials/{}/preview-config", sku))
            .await?;
        let settings = match value.get("pbrSettings") {
            Some(inner) => serde_json::from_value(inner.clone())?,
            None => serde_json::from_value(value)?,
        };
        Ok(settings)
    }

    pub async fn update_material(&self, sku: &str, edit: &MaterialEdit) -> Result<()> {
        self.send_json(reqwest::Method::PUT, &format!("/api/materials/{}", sku), edit)
            .await?;
        info!(sku = %sku, "Material updated");
        Ok(())
    }

    /// Store preview tuning for a SKU. Returns the settings as merged by the server.
    pub async fn save_pbr_settings(&self, sku: &str, settings: &PbrSettings) -> Result<PbrSettings> {
        let value = self
            .send_json(
                reqwest::Method::POST,
                "/api/materials/pbr-settings",
                &pbr_settings_body(sku, settings),
            )
            .await?;
        let stored = stored_pbr_settings(value, settings)?;
        info!(sku = %sku, "PBR settings saved");
        Ok(stored)
    }

    /// Remove a material and its files from the catalog
    pub async fn delete_material(&self, sku: &str) -> Result<()> {
        let url = self.url(&format!("/api/materials/{}", sku));
        debug!(url = %url, "DELETE");
        Self::check(self.client.delete(&url).send().await?).await?;
        info!(sku = %sku, "Material deleted");
        Ok(())
    }

    /// Published experiences
    pub async fn list_projects(&self) -> Result<Vec<ProjectSummary>> {
        let projects: Vec<ProjectSummary> = self.get_json("/api/projects").await?;
        info!(count = projects.len(), "Projects loaded");
        Ok(projects)
    }

    pub async fn delete_project(&self, id: &str) -> Result<()> {
        let url = self.url(&format!("/api/projects/{}", id));
        debug!(url = %url, "DELETE");
        Self::check(self.client.delete(&url).send().await?).await?;
        info!(project = %id, "Project deleted");
        Ok(())
    }

    /// Publish presets as a viewer experience. Returns the project folder.
    pub async fn create_experience(&self, payload: &ExperiencePayload) -> Result<String> {
        let value = self
            .send_json(reqwest::Method::POST, "/api/projects/create-experience", payload)
            .await?;
        let created: ExperienceCreated = serde_json::from_value(value)?;
        if !created.success {
            return Err(CatalogError::ExperienceRejected(
                created.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        let folder = created
            .folder
            .unwrap_or_else(|| format!("/projects/{}", payload.experience_id));
        info!(experience = %payload.experience_id, folder = %folder, "Experience created");
        Ok(folder)
    }

    /// Upload a model for preview. Returns the server path to load it from.
    pub async fn upload_temp_model(&self, file_name: &str, bytes: Vec<u8>) -> Result<TempUpload> {
        let size = bytes.len();
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(model_mime_type(file_name))?;
        let form = Form::new().part("model", part);

        let url = self.url("/api/upload-temp-model");
        info!(url = %url, file = %file_name, size, "Uploading temporary model");
        let response = self.client.post(&url).multipart(form).send().await?;

        // Validation failures come back as 400 with { success: false, error }
        let status = response.status();
        let body = response.text().await?;
        let upload: TempUpload = match serde_json::from_str(&body) {
            Ok(upload) => upload,
            Err(e) if status.is_success() => return Err(e.into()),
            Err(_) => {
                return Err(CatalogError::Status {
                    status: status.as_u16(),
                    message: status.canonical_reason().unwrap_or("error").to_string(),
                })
            }
        };

        if !upload.success || upload.file_path.is_none() {
            let reason = upload.error.unwrap_or_else(|| "no file path returned".to_string());
            warn!(file = %file_name, reason = %reason, "Upload rejected");
            return Err(CatalogError::UploadRejected(reason));
        }
        Ok(upload)
    }
}

fn pbr_settings_body(sku: &str, settings: &PbrSettings) -> serde_json::Value {
    serde_json::json!({ "materialId": sku, "settings": settings })
}

/// Settings echoed by `POST /api/materials/pbr-settings`, or `sent` when the
/// server acknowledges without echoing
fn stored_pbr_settings(value: serde_json::Value, sent: &PbrSettings) -> Result<PbrSettings> {
    if value.is_null() {
        return Ok(sent.clone());
    }
    let saved: PbrSettingsSaved = serde_json::from_value(value)?;
    if !saved.success {
        let reason = saved
            .error
            .or(saved.message)
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(CatalogError::SettingsRejected(reason));
    }
    Ok(saved.settings.unwrap_or_else(|| sent.clone()))
}
