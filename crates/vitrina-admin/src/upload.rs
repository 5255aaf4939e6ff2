//! Temporary model upload
//!
//! A picked file is checked locally, posted to the backend and, once the server
//! returns its path, loaded into the viewer. The path is also what an
//! experience is published from.

use bevy::prelude::*;
use tracing::{info, warn};
use vitrina_core::upload::validate_model_file;
use vitrina_core::Notification;
use vitrina_scene::{Catalog, LoadModel, SceneNotifications, TaskSpawner};

use crate::file_picker::{PendingFileResults, PickResult};
use crate::requests::{self, CatalogRequests};

pub struct UploadPlugin;

impl Plugin for UploadPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingFileResults>()
            .init_resource::<UploadState>()
            .add_systems(Update, (start_uploads, finish_uploads).chain());
    }
}

#[derive(Resource, Default, Debug)]
pub struct UploadState {
    /// Name of the file being uploaded
    pub in_progress: Option<String>,
    /// Server path of the model on screen
    pub temp_model_path: Option<String>,
}

/// What to do with one pick
#[derive(Debug, PartialEq)]
enum PickOutcome {
    Upload { name: String, bytes: Vec<u8> },
    Rejected(Notification),
}

fn check_pick(result: PickResult) -> PickOutcome {
    match result {
        Ok(file) => match validate_model_file(&file.name, file.bytes.len() as u64) {
            Ok(()) => PickOutcome::Upload {
                name: file.name,
                bytes: file.bytes,
            },
            Err(e) => {
                warn!(file = %file.name, error = %e, "Model file rejected");
                PickOutcome::Rejected(Notification::error(e.to_string()))
            }
        },
        Err(e) => PickOutcome::Rejected(Notification::error(e)),
    }
}

fn start_uploads(
    pending: Res<PendingFileResults>,
    mut state: ResMut<UploadState>,
    slots: Res<CatalogRequests>,
    catalog: Option<Res<Catalog>>,
    spawner: Option<Res<TaskSpawner>>,
    mut notifications: ResMut<SceneNotifications>,
) {
    for result in pending.drain() {
        let (name, bytes) = match check_pick(result) {
            PickOutcome::Upload { name, bytes } => (name, bytes),
            PickOutcome::Rejected(notification) => {
                notifications.0.push(notification);
                continue;
            }
        };
        if state.in_progress.is_some() {
            notifications
                .0
                .push(Notification::warning("An upload is already in progress"));
            continue;
        }
        let (Some(catalog), Some(spawner)) = (catalog.as_deref(), spawner.as_deref()) else {
            notifications.0.push(Notification::error("No backend configured for uploads"));
            continue;
        };

        info!(file = %name, size = bytes.len(), "Uploading model");
        notifications
            .0
            .push(Notification::info(format!("Uploading {}...", name)));
        let client = catalog.0.clone();
        let file_name = name.clone();
        requests::spawn_into(spawner, &slots.upload, async move {
            client.upload_temp_model(&file_name, bytes).await
        });
        state.in_progress = Some(name);
    }
}

fn finish_uploads(
    mut state: ResMut<UploadState>,
    slots: Res<CatalogRequests>,
    mut loads: MessageWriter<LoadModel>,
    mut notifications: ResMut<SceneNotifications>,
) {
    let Some(result) = requests::take(&slots.upload) else {
        return;
    };
    let name = state.in_progress.take().unwrap_or_default();

    match result.map(|upload| upload.file_path) {
        Ok(Some(path)) => {
            info!(file = %name, path = %path, "Model uploaded");
            state.temp_model_path = Some(path.clone());
            loads.write(LoadModel { path });
        }
        Ok(None) => {
            notifications
                .0
                .push(Notification::error("Upload finished without a file path"));
        }
        Err(e) => {
            warn!(file = %name, error = %e, "Upload failed");
            notifications
                .0
                .push(Notification::error(format!("Upload failed: {}", e)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_picker::PickedFile;
    use bevy::ecs::message::Messages;
    use vitrina_core::NotificationLevel;

    fn picked(name: &str, size: usize) -> PickResult {
        Ok(PickedFile {
            name: name.to_string(),
            bytes: vec![0; size],
        })
    }

    #[test]
    fn test_valid_model_is_uploaded() {
        match check_pick(picked("Living_Room.glb", 200 * 1024)) {
            PickOutcome::Upload { name, bytes } => {
                assert_eq!(name, "Living_Room.glb");
                assert_eq!(bytes.len(), 200 * 1024);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_wrong_extension_is_rejected() {
        match check_pick(picked("room.obj", 200 * 1024)) {
            PickOutcome::Rejected(notification) => {
                assert_eq!(notification.level, NotificationLevel::Error)
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_tiny_file_is_rejected() {
        assert!(matches!(check_pick(picked("room.glb", 10)), PickOutcome::Rejected(_)));
    }

    #[test]
    fn test_read_error_becomes_notification() {
        match check_pick(Err("Cannot read room.glb".to_string())) {
            PickOutcome::Rejected(notification) => {
                assert_eq!(notification.message, "Cannot read room.glb")
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_upload_result_loads_model() {
        let mut app = App::new();
        app.add_message::<LoadModel>()
            .init_resource::<UploadState>()
            .init_resource::<CatalogRequests>()
            .init_resource::<SceneNotifications>()
            .add_systems(Update, finish_uploads);

        app.world_mut().resource_mut::<UploadState>().in_progress = Some("room.glb".to_string());
        {
            let requests = app.world().resource::<CatalogRequests>();
            *requests.upload.lock().unwrap() = Some(Ok(vitrina_catalog::TempUpload {
                success: true,
                file_path: Some("/uploadsTemp/temp_1712345678901_room.glb".to_string()),
                original_name: Some("room.glb".to_string()),
                size: Some(204800),
                temp_file_name: None,
                error: None,
            }));
        }
        app.update();

        let state = app.world().resource::<UploadState>();
        assert!(state.in_progress.is_none());
        assert_eq!(
            state.temp_model_path.as_deref(),
            Some("/uploadsTemp/temp_1712345678901_room.glb")
        );
        let messages = app.world().resource::<Messages<LoadModel>>();
        let mut cursor = messages.get_cursor();
        let loaded: Vec<_> = cursor.read(messages).map(|m| m.path.clone()).collect();
        assert_eq!(loaded, vec!["/uploadsTemp/temp_1712345678901_room.glb".to_string()]);
    }
}
