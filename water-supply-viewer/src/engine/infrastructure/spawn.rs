use bevy::asset::LoadState;
use bevy::gltf::Gltf;
use bevy::prelude::*;
use constants::path::model_file_path;
use constants::stage::StageKey;

use super::placeholders::{PlaceholderPalette, spawn_placeholder};
use super::sites::{site, world_anchor};
use crate::constants::render_settings::MODEL_TIMEOUT_SECONDS;
use crate::engine::assets::scene_manifest::SceneManifest;
use crate::engine::loading::manifest_loader::{LoadOutcome, load_outcome};
use crate::engine::loading::progress::LoadingProgress;

/// Root entity of one stage's visual, placed at the stage anchor.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfrastructureStage(pub StageKey);

/// Downloaded model still loading for a stage root.
#[derive(Component)]
pub struct PendingModel {
    pub handle: Handle<Gltf>,
    pub scale: f32,
    /// Seconds spent waiting so far.
    pub waited: f32,
}

/// What a resolved stage root is showing.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageVisual {
    Model,
    Placeholder,
}

fn attach_placeholder(
    commands: &mut Commands,
    root: Entity,
    stage: StageKey,
    palette: &PlaceholderPalette,
    meshes: &mut Assets<Mesh>,
) {
    spawn_placeholder(commands, root, stage, palette, meshes);
    commands.entity(root).insert(StageVisual::Placeholder);
}

/// Spawn one root per stage. Stages listed in the manifest request their model,
/// every other stage gets its placeholder straight away. Returns the number of
/// models requested.
pub fn spawn_infrastructure(
    commands: &mut Commands,
    asset_server: &AssetServer,
    manifest: Option<&SceneManifest>,
    palette: &PlaceholderPalette,
    meshes: &mut Assets<Mesh>,
) -> usize {
    let mut requested = 0;

    for stage in StageKey::ALL {
        let root = commands
            .spawn((
                Transform::from_translation(world_anchor(stage)),
                Visibility::default(),
                InfrastructureStage(stage),
                Name::new(site(stage).title),
            ))
            .id();

        match manifest.and_then(|manifest| manifest.model_for(stage)) {
            Some(entry) => {
                let path = model_file_path(&entry.file);
                info!("Requesting model for {}: {}", stage, path);
                commands.entity(root).insert(PendingModel {
                    handle: asset_server.load(path),
                    scale: entry.scale,
                    waited: 0.0,
                });
                requested += 1;
            }
            None => attach_placeholder(commands, root, stage, palette, meshes),
        }
    }

    requested
}

/// Swap pending models for their glTF scene once loaded. Falls back to the
/// placeholder when loading failed, the file holds no scene, or the model is
/// still not ready after `MODEL_TIMEOUT_SECONDS`.
pub fn resolve_pending_models(
    mut commands: Commands,
    time: Res<Time>,
    mut pending: Query<(Entity, &InfrastructureStage, &mut PendingModel)>,
    asset_server: Res<AssetServer>,
    gltfs: Res<Assets<Gltf>>,
    palette: Option<Res<PlaceholderPalette>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut loading_progress: ResMut<LoadingProgress>,
) {
    let Some(palette) = palette else {
        return;
    };

    for (root, &InfrastructureStage(stage), mut model) in &mut pending {
        model.waited += time.delta_secs();
        let state = asset_server.load_state(model.handle.id());

        match load_outcome(&state, model.waited, MODEL_TIMEOUT_SECONDS) {
            LoadOutcome::Pending => continue,
            LoadOutcome::Loaded => {
                let scene = gltfs.get(&model.handle).and_then(|gltf| {
                    gltf.default_scene
                        .clone()
                        .or_else(|| gltf.scenes.first().cloned())
                });
                match scene {
                    Some(scene) => {
                        info!("✓ Model loaded for {}", stage);
                        commands.entity(root).insert(StageVisual::Model).with_children(|parent| {
                            parent.spawn((
                                SceneRoot(scene),
                                Transform::from_scale(Vec3::splat(model.scale)),
                            ));
                        });
                    }
                    None => {
                        warn!("Model for {} contains no scene, using placeholder", stage);
                        attach_placeholder(&mut commands, root, stage, &palette, &mut meshes);
                    }
                }
            }
            LoadOutcome::Failed => {
                if let LoadState::Failed(error) = &state {
                    warn!("Model for {} failed to load ({}), using placeholder", stage, error);
                }
                attach_placeholder(&mut commands, root, stage, &palette, &mut meshes);
            }
            LoadOutcome::TimedOut => {
                warn!(
                    "Model for {} not ready after {:.0}s, using placeholder",
                    stage, MODEL_TIMEOUT_SECONDS
                );
                attach_placeholder(&mut commands, root, stage, &palette, &mut meshes);
            }
        }

        commands.entity(root).remove::<PendingModel>();
        loading_progress.models_resolved += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::engine::assets::scene_manifest::ModelEntry;
    use crate::engine::infrastructure::placeholders::placeholder_parts;

    fn asset_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Mesh>()
            .init_asset::<StandardMaterial>()
            .init_asset::<Gltf>()
            .init_resource::<LoadingProgress>()
            .add_systems(Update, resolve_pending_models);
        app
    }

    fn spawn_on_startup(app: &mut App, manifest: Option<SceneManifest>) {
        app.add_systems(
            Startup,
            move |mut commands: Commands,
                  asset_server: Res<AssetServer>,
                  mut meshes: ResMut<Assets<Mesh>>,
                  mut materials: ResMut<Assets<StandardMaterial>>,
                  mut progress: ResMut<LoadingProgress>| {
                let palette = PlaceholderPalette::new(&mut materials);
                progress.models_requested = spawn_infrastructure(
                    &mut commands,
                    &asset_server,
                    manifest.as_ref(),
                    &palette,
                    &mut meshes,
                );
                commands.insert_resource(palette);
            },
        );
    }

    fn entry(stage: StageKey, file: &str) -> ModelEntry {
        ModelEntry {
            stage,
            file: file.to_string(),
            scale: 1.0,
            source_uid: None,
            title: None,
            author: None,
        }
    }

    /// Every stage has one root showing exactly one resolved visual.
    fn assert_one_visual_per_stage(app: &mut App, expected: StageVisual) {
        let mut roots = app.world_mut().query::<(
            &InfrastructureStage,
            Option<&StageVisual>,
            Option<&Children>,
            Has<PendingModel>,
        )>();
        let mut seen = Vec::new();
        for (&InfrastructureStage(stage), visual, children, pending) in roots.iter(app.world()) {
            assert!(!pending, "{stage} still pending");
            assert_eq!(visual, Some(&expected), "{stage}");
            let child_count = children.map_or(0, |c| c.len());
            assert_eq!(child_count, placeholder_parts(stage).len(), "{stage}");
            seen.push(stage);
        }
        seen.sort();
        assert_eq!(seen, StageKey::ALL.to_vec());
    }

    #[test]
    fn without_manifest_every_stage_gets_its_placeholder() {
        let mut app = asset_app();
        spawn_on_startup(&mut app, None);
        app.update();

        let progress = app.world().resource::<LoadingProgress>();
        assert_eq!(progress.models_requested, 0);
        assert_eq!(progress.models_pending(), 0);
        assert_one_visual_per_stage(&mut app, StageVisual::Placeholder);
    }

    #[test]
    fn missing_model_files_fall_back_per_stage() {
        let mut app = asset_app();
        let manifest = SceneManifest {
            models: vec![
                entry(StageKey::Dam, "does_not_exist_dam.glb"),
                entry(StageKey::PumpStation, "does_not_exist_pump.glb"),
            ],
        };
        spawn_on_startup(&mut app, Some(manifest));

        for _ in 0..500 {
            app.update();
            if app.world().resource::<LoadingProgress>().models_pending() == 0 {
                break;
            }
            std::thread::sleep(Duration::from_millis(2));
        }

        let progress = app.world().resource::<LoadingProgress>();
        assert_eq!(progress.models_requested, 2);
        assert_eq!(progress.models_resolved, 2);
        assert_one_visual_per_stage(&mut app, StageVisual::Placeholder);
    }

    #[test]
    fn stalled_model_times_out_to_placeholder() {
        let mut app = asset_app();
        let palette = {
            let mut materials = app.world_mut().resource_mut::<Assets<StandardMaterial>>();
            PlaceholderPalette::new(&mut materials)
        };
        app.insert_resource(palette);

        // A handle that is never loaded stays pending until the timeout.
        let root = app
            .world_mut()
            .spawn((
                Transform::default(),
                InfrastructureStage(StageKey::Canal),
                PendingModel {
                    handle: Handle::default(),
                    scale: 1.0,
                    waited: 0.0,
                },
            ))
            .id();
        app.update();
        assert!(app.world().get::<PendingModel>(root).is_some());

        if let Some(mut model) = app.world_mut().get_mut::<PendingModel>(root) {
            model.waited = MODEL_TIMEOUT_SECONDS;
        }
        app.update();

        assert!(app.world().get::<PendingModel>(root).is_none());
        assert_eq!(
            app.world().get::<StageVisual>(root),
            Some(&StageVisual::Placeholder)
        );
        assert_eq!(app.world().resource::<LoadingProgress>().models_resolved, 1);
    }
}
