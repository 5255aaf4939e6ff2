//! Client-side checks for temporary model uploads

use thiserror::Error;

const MB: u64 = 1024 * 1024;

/// Smallest accepted model, 0.1 MB
pub const MIN_MODEL_BYTES: u64 = MB / 10;
/// Largest accepted model, 400 MB
pub const MAX_MODEL_BYTES: u64 = 400 * MB;

pub const MODEL_EXTENSIONS: [&str; 2] = ["glb", "gltf"];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelFileError {
    #[error("Unsupported model format: {0} (expected .glb or .gltf)")]
    UnsupportedExtension(String),
    #[error("Model file too small: {size} bytes (minimum {min})")]
    TooSmall { size: u64, min: u64 },
    #[error("Model file too large: {size} bytes (maximum {max})")]
    TooLarge { size: u64, max: u64 },
}

/// Validate a model file by name and size before uploading it
pub fn validate_model_file(name: &str, size: u64) -> Result<(), ModelFileError> {
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if !MODEL_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ModelFileError::UnsupportedExtension(name.to_string()));
    }
    if size < MIN_MODEL_BYTES {
        return Err(ModelFileError::TooSmall {
            size,
            min: MIN_MODEL_BYTES,
        });
    }
    if size > MAX_MODEL_BYTES {
        return Err(ModelFileError::TooLarge {
            size,
            max: MAX_MODEL_BYTES,
        });
    }
    Ok(())
}

/// MIME type sent with the multipart part
pub fn model_mime_type(name: &str) -> &'static str {
    if name.to_ascii_lowercase().ends_with(".gltf") {
        "model/gltf+json"
    } else {
        "model/gltf-binary"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_glb_and_gltf() {
        assert!(validate_model_file("room.glb", 5 * MB).is_ok());
        assert!(validate_model_file("Room.GLTF", 5 * MB).is_ok());
    }

    #[test]
    fn test_rejects_other_extensions() {
        assert!(matches!(
            validate_model_file("room.obj", 5 * MB),
            Err(ModelFileError::UnsupportedExtension(_))
        ));
        assert!(matches!(
            validate_model_file("glb", 5 * MB),
            Err(ModelFileError::UnsupportedExtension(_))
        ));
    }

    #[test]
    fn test_size_bounds() {
        assert!(matches!(
            validate_model_file("room.glb", 1024),
            Err(ModelFileError::TooSmall { .. })
        ));
        assert!(validate_model_file("room.glb", MIN_MODEL_BYTES).is_ok());
        assert!(validate_model_file("room.glb", MAX_MODEL_BYTES).is_ok());
        assert!(matches!(
            validate_model_file("room.glb", MAX_MODEL_BYTES + 1),
            Err(ModelFileError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_mime_type() {
        assert_eq!(model_mime_type("a.glb"), "model/gltf-binary");
        assert_eq!(model_mime_type("a.gltf"), "model/gltf+json");
    }
}
