//! Publishing saved presets as a viewer experience

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::binding::Preset;

/// Identifier used when none can be derived from the uploaded model
pub const FALLBACK_EXPERIENCE_ID: &str = "experience";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExperienceError {
    #[error("Save at least one preset before finishing")]
    NoPresets,
    #[error("No model has been uploaded")]
    NoModel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceMetadata {
    pub created_by: String,
    /// ISO 8601 with millisecond precision
    pub created_at: String,
}

/// Body of `POST /api/projects/create-experience`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperiencePayload {
    pub experience_id: String,
    pub presets: Vec<Preset>,
    pub metadata: ExperienceMetadata,
    pub temp_model_path: String,
}

impl ExperiencePayload {
    pub fn build(
        presets: &[Preset],
        temp_model_path: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Self, ExperienceError> {
        if presets.is_empty() {
            return Err(ExperienceError::NoPresets);
        }
        let temp_model_path = temp_model_path.ok_or(ExperienceError::NoModel)?;
        Ok(Self {
            experience_id: experience_id_from_path(temp_model_path),
            presets: presets.to_vec(),
            metadata: ExperienceMetadata {
                created_by: "user".to_string(),
                created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            },
            temp_model_path: temp_model_path.to_string(),
        })
    }
}

/// Whether the finish step can run
pub fn can_finish(presets: &[Preset]) -> bool {
    !presets.is_empty()
}

/// Derive the experience id from an uploaded temp model path.
///
/// `.../temp_<digits>_<name>.glb` yields `<name>` (case-insensitive match);
/// anything else yields [`FALLBACK_EXPERIENCE_ID`].
pub fn experience_id_from_path(path: &str) -> String {
    let file = path.rsplit(['/', '\\']).next().unwrap_or(path);
    parse_temp_name(file)
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_EXPERIENCE_ID.to_string())
}

fn parse_temp_name(file: &str) -> Option<&str> {
    if file.len() < 5 || !file.is_char_boundary(5) || !file[..5].eq_ignore_ascii_case("temp_") {
        return None;
    }
    let rest = &file[5..];
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || rest.as_bytes().get(digits) != Some(&b'_') {
        return None;
    }
    let name = &rest[digits + 1..];
    let stem_len = name.len().checked_sub(4)?;
    if !name.is_char_boundary(stem_len) || !name[stem_len..].eq_ignore_ascii_case(".glb") || stem_len == 0 {
        return None;
    }
    Some(&name[..stem_len])
}

/// Public viewer link for a published experience
pub fn viewer_link(base: &str, experience_id: &str) -> String {
    format!("{}?project={}", base.trim_end_matches('/'), experience_id)
}
