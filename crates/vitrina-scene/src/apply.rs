//! Fulfilment of apply requests
//!
//! Each request needs the SKU's preview config from the catalog and its texture
//! maps from the asset server. A job holds both in flight and completes the
//! request through the orchestrator once every part has settled, loaded or not.

use bevy::asset::LoadState;
use bevy::image::{ImageAddressMode, ImageLoaderSettings, ImageSampler, ImageSamplerDescriptor};
use bevy::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};
use vitrina_core::{ApplyRequest, MaterialChannel, PbrSettings, ResolvedTextures};

use crate::tasks::TaskSpawner;
use crate::types::{Catalog, Presets, SceneConfig, ViewerModel, ViewerSet};

pub struct ApplyPlugin;

impl Plugin for ApplyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ApplyJobs>()
            .init_resource::<TextureCache>()
            .add_systems(
                Update,
                (start_apply_jobs, poll_apply_jobs).chain().in_set(ViewerSet::Apply),
            );
    }
}

/// `None` while the fetch is running, then the config if it succeeded
pub type PendingSettings = Arc<Mutex<Option<Option<PbrSettings>>>>;

/// One apply request in flight
pub struct ApplyJob {
    pub request: ApplyRequest,
    settings: PendingSettings,
    color: Handle<Image>,
    maps: BTreeMap<MaterialChannel, Handle<Image>>,
}

#[derive(Resource, Default)]
pub struct ApplyJobs {
    queued: Vec<ApplyRequest>,
    running: Vec<ApplyJob>,
}

impl ApplyJobs {
    pub fn queue(&mut self, requests: impl IntoIterator<Item = ApplyRequest>) {
        self.queued.extend(requests);
    }

    pub fn in_flight(&self) -> usize {
        self.queued.len() + self.running.len()
    }
}

/// Texture handles by server path. Keeps loaded maps alive while materials use them.
#[derive(Resource, Default)]
pub struct TextureCache {
    pub textures: HashMap<String, Handle<Image>>,
    /// Packed metallic/roughness images by source pair
    pub packed: HashMap<(Option<String>, Option<String>), Handle<Image>>,
}

impl TextureCache {
    pub fn get(&self, path: &str) -> Option<Handle<Image>> {
        self.textures.get(path).cloned()
    }
}

/// Repeat addressing so world-space UVs tile
pub fn repeat_sampler() -> ImageSamplerDescriptor {
    ImageSamplerDescriptor {
        address_mode_u: ImageAddressMode::Repeat,
        address_mode_v: ImageAddressMode::Repeat,
        ..ImageSamplerDescriptor::linear()
    }
}

fn load_texture(
    asset_server: &AssetServer,
    config: &SceneConfig,
    cache: &mut TextureCache,
    path: &str,
    channel: MaterialChannel,
) -> Handle<Image> {
    if let Some(handle) = cache.get(path) {
        return handle;
    }
    let is_srgb = channel.is_srgb();
    let handle = asset_server.load_with_settings::<Image, ImageLoaderSettings>(
        config.asset_url(path),
        move |settings: &mut ImageLoaderSettings| {
            settings.is_srgb = is_srgb;
            settings.sampler = ImageSampler::Descriptor(repeat_sampler());
        },
    );
    cache.textures.insert(path.to_string(), handle.clone());
    handle
}

fn fetch_settings(catalog: Option<&Catalog>, spawner: Option<&TaskSpawner>, sku: &str) -> PendingSettings {
    let slot: PendingSettings = Arc::default();
    let (Some(catalog), Some(spawner)) = (catalog, spawner) else {
        if let Ok(mut guard) = slot.lock() {
            *guard = Some(None);
        }
        return slot;
    };

    let client = catalog.0.clone();
    let sku = sku.to_string();
    let writer = slot.clone();
    spawner.spawn(async move {
        let settings = match client.preview_config(&sku).await {
            Ok(settings) => Some(settings),
            Err(e) => {
                warn!(sku = %sku, error = %e, "Preview config unavailable, using defaults");
                None
            }
        };
        if let Ok(mut guard) = writer.lock() {
            *guard = Some(settings);
        }
    });
    slot
}

fn start_apply_jobs(
    mut jobs: ResMut<ApplyJobs>,
    mut cache: ResMut<TextureCache>,
    asset_server: Res<AssetServer>,
    config: Res<SceneConfig>,
    catalog: Option<Res<Catalog>>,
    spawner: Option<Res<TaskSpawner>>,
) {
    if jobs.queued.is_empty() {
        return;
    }
    let queued = std::mem::take(&mut jobs.queued);
    for request in queued {
        debug!(mesh = %request.ticket.mesh, sku = %request.sku, "Starting apply");
        let settings = fetch_settings(catalog.as_deref(), spawner.as_deref(), &request.sku);
        let color = load_texture(&asset_server, &config, &mut cache, &request.paths.color, MaterialChannel::Color);
        let maps = request
            .paths
            .optional
            .iter()
            .map(|(channel, path)| {
                (
                    *channel,
                    load_texture(&asset_server, &config, &mut cache, path, *channel),
                )
            })
            .collect();
        jobs.running.push(ApplyJob {
            request,
            settings,
            color,
            maps,
        });
    }
}

/// Load outcome of one texture, `None` while still loading
fn settled(asset_server: &AssetServer, handle: &Handle<Image>) -> Option<bool> {
    match asset_server.get_load_state(handle.id()) {
        Some(LoadState::Loaded) => Some(true),
        Some(LoadState::Failed(_)) => Some(false),
        // Unknown ids belong to assets that were dropped or never existed
        None => Some(false),
        _ => None,
    }
}

fn poll_apply_jobs(
    mut jobs: ResMut<ApplyJobs>,
    mut cache: ResMut<TextureCache>,
    mut presets: ResMut<Presets>,
    mut viewer: ResMut<ViewerModel>,
    asset_server: Res<AssetServer>,
) {
    if jobs.running.is_empty() {
        return;
    }

    let mut still_running = Vec::new();
    for job in std::mem::take(&mut jobs.running) {
        let settings = match job.settings.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => Some(None),
        };
        let Some(settings) = settings else {
            still_running.push(job);
            continue;
        };
        let Some(color_loaded) = settled(&asset_server, &job.color) else {
            still_running.push(job);
            continue;
        };
        let map_states: Option<Vec<(MaterialChannel, bool)>> = job
            .maps
            .iter()
            .map(|(channel, handle)| settled(&asset_server, handle).map(|ok| (*channel, ok)))
            .collect();
        let Some(map_states) = map_states else {
            still_running.push(job);
            continue;
        };

        // Failed loads are evicted so a later request retries them
        if !color_loaded {
            cache.textures.remove(&job.request.paths.color);
        }
        let mut loaded = HashSet::new();
        for (channel, ok) in map_states {
            if ok {
                loaded.insert(channel);
            } else if let Some(path) = job.request.paths.get(channel) {
                debug!(sku = %job.request.sku, channel = %channel, "Optional map missing");
                cache.textures.remove(path);
            }
        }

        let resolved = ResolvedTextures {
            settings,
            color_loaded,
            loaded,
        };
        presets.complete_apply(&mut viewer.model, &job.request, &resolved);
    }
    jobs.running = still_running;
}
