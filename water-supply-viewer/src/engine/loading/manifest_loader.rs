use bevy::asset::LoadState;
use bevy::prelude::*;
use constants::path::model_manifest_path;

use crate::constants::render_settings::MANIFEST_TIMEOUT_SECONDS;
use crate::engine::assets::scene_manifest::SceneManifest;
use crate::engine::infrastructure::placeholders::PlaceholderPalette;
use crate::engine::infrastructure::spawn::spawn_infrastructure;
use crate::engine::loading::progress::LoadingProgress;

#[derive(Resource, Default)]
pub struct ManifestLoader {
    handle: Option<Handle<SceneManifest>>,
    waited: f32,
}

/// What became of an awaited asset this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Pending,
    Loaded,
    Failed,
    TimedOut,
}

/// Classify a load state, giving up after the timeout.
pub fn load_outcome(state: &LoadState, waited: f32, timeout: f32) -> LoadOutcome {
    match state {
        LoadState::Loaded => LoadOutcome::Loaded,
        LoadState::Failed(_) => LoadOutcome::Failed,
        _ if waited >= timeout => LoadOutcome::TimedOut,
        _ => LoadOutcome::Pending,
    }
}

// Start the loading process
pub fn start_loading(mut manifest_loader: ResMut<ManifestLoader>, asset_server: Res<AssetServer>) {
    let manifest_path = model_manifest_path();
    info!("Requesting model manifest: {}", manifest_path);
    manifest_loader.handle = Some(asset_server.load(manifest_path));
}

/// Wait for the manifest, then spawn every stage with its model or placeholder.
pub fn load_manifest_system(
    mut commands: Commands,
    mut manifest_loader: ResMut<ManifestLoader>,
    mut loading_progress: ResMut<LoadingProgress>,
    asset_server: Res<AssetServer>,
    manifests: Res<Assets<SceneManifest>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    time: Res<Time>,
) {
    if loading_progress.manifest_resolved {
        return;
    }

    manifest_loader.waited += time.delta_secs();
    let state = match &manifest_loader.handle {
        Some(handle) => asset_server.load_state(handle.id()),
        None => LoadState::NotLoaded,
    };

    let manifest = match load_outcome(&state, manifest_loader.waited, MANIFEST_TIMEOUT_SECONDS)
    {
        LoadOutcome::Pending => return,
        LoadOutcome::Loaded => {
            let manifest = manifest_loader
                .handle
                .as_ref()
                .and_then(|handle| manifests.get(handle))
                .cloned();
            match manifest {
                Some(ref manifest) if manifest.has_models() => {
                    info!("✓ Model manifest loaded ({} entries)", manifest.models.len());
                }
                _ => info!("Model manifest lists no usable models, using placeholders"),
            }
            manifest
        }
        LoadOutcome::Failed => {
            info!("No model manifest available, using placeholders");
            None
        }
        LoadOutcome::TimedOut => {
            warn!(
                "Model manifest not ready after {:.1}s, using placeholders",
                MANIFEST_TIMEOUT_SECONDS
            );
            None
        }
    };
    loading_progress.manifest_resolved = true;

    let palette = PlaceholderPalette::new(&mut materials);
    loading_progress.models_requested = spawn_infrastructure(
        &mut commands,
        &asset_server,
        manifest.as_ref(),
        &palette,
        &mut meshes,
    );
    loading_progress.infrastructure_spawned = true;
    commands.insert_resource(palette);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loaded_resolves_immediately() {
        assert_eq!(
            load_outcome(&LoadState::Loaded, 0.0, 4.0),
            LoadOutcome::Loaded
        );
    }

    #[test]
    fn loading_times_out() {
        assert_eq!(
            load_outcome(&LoadState::Loading, 1.0, 4.0),
            LoadOutcome::Pending
        );
        assert_eq!(
            load_outcome(&LoadState::Loading, 4.0, 4.0),
            LoadOutcome::TimedOut
        );
        assert_eq!(
            load_outcome(&LoadState::NotLoaded, 9.0, 4.0),
            LoadOutcome::TimedOut
        );
    }
}
