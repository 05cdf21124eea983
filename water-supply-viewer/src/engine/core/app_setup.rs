use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;

use crate::constants::render_settings::PROFILE_SAMPLES;
use crate::engine::assets::scene_manifest::SceneManifest;
use crate::engine::camera::flight::{FlightFinished, run_camera_flight};
use crate::engine::camera::viewport_camera::{
    ResetView, ViewportCamera, camera_controller, handle_reset_view,
};
use crate::engine::core::app_state::{AppState, transition_to_running, update_loading_frontend};
use crate::engine::core::window_config::create_window_config;
use crate::engine::flow::flow_path::FlowPath;
use crate::engine::flow::particles::{
    FlowCommand, FlowSettings, animate_flow_particles, flow_keyboard_shortcut,
    handle_flow_commands, spawn_flow_particles,
};
use crate::engine::infrastructure::highlight::{
    SelectedStage, spawn_selection_ring, update_selection_ring,
};
use crate::engine::infrastructure::spawn::resolve_pending_models;
use crate::engine::loading::manifest_loader::{ManifestLoader, load_manifest_system, start_loading};
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::profile::chart::{
    ToggleProfile, profile_keyboard_shortcut, spawn_profile_panel, toggle_profile_panel,
    update_profile_chart,
};
use crate::engine::profile::elevation::ElevationProfile;
use crate::engine::scene::lighting::{
    LightingCommand, LightingState, apply_lighting, handle_lighting_commands,
    lighting_keyboard_shortcut, scene_fog, spawn_lighting,
};
use crate::engine::scene::terrain_mesh::spawn_terrain;
use crate::engine::systems::fps_tracking::fps_notification_system;
use crate::engine::tour::guided_tour::{GuidedTour, TourCommand, TourEvent};
use crate::engine::tour::systems::{
    FocusStage, advance_guided_tour, focus_stage, handle_tour_commands, react_to_tour_events,
    tour_keyboard_shortcuts,
};
use crate::engine::ui::control_bar::{
    control_bar_interactions, spawn_control_bar, update_control_labels,
};
use crate::engine::ui::info_card::{
    InfoCardState, close_info_card_on_escape, info_card_close_button, spawn_info_card,
    sync_info_card,
};
use crate::engine::ui::picking::pick_stage_on_click;
use crate::rpc::web_rpc::WebRpcPlugin;

#[cfg(not(target_arch = "wasm32"))]
use crate::engine::systems::fps_tracking::{fps_text_update_system, spawn_fps_overlay};

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        // Registers SceneManifest as a loadable asset type from JSON files.
        .add_plugins(JsonAssetPlugin::<SceneManifest>::new(&["json"]))
        .add_plugins(WebRpcPlugin);

    // Initialise resources early
    app.init_resource::<LoadingProgress>()
        .init_resource::<ManifestLoader>()
        .init_resource::<ViewportCamera>()
        .init_resource::<GuidedTour>()
        .init_resource::<SelectedStage>()
        .init_resource::<InfoCardState>()
        .init_resource::<LightingState>()
        .init_resource::<FlowSettings>()
        .add_event::<TourCommand>()
        .add_event::<TourEvent>()
        .add_event::<FocusStage>()
        .add_event::<FlightFinished>()
        .add_event::<ResetView>()
        .add_event::<LightingCommand>()
        .add_event::<FlowCommand>()
        .add_event::<ToggleProfile>();

    // State-based system scheduling
    app.add_systems(Startup, (setup, start_loading).chain())
        .add_systems(
            Update,
            (load_manifest_system, transition_to_running)
                .chain()
                .run_if(in_state(AppState::Loading)),
        )
        .add_systems(Update, update_loading_frontend);

    // Camera, tour and selection run as one chain so flights, arrivals and
    // focus requests settle within a frame.
    let navigation_systems = (
        control_bar_interactions,
        pick_stage_on_click,
        tour_keyboard_shortcuts,
        camera_controller,
        handle_reset_view,
        run_camera_flight,
        advance_guided_tour,
        handle_tour_commands,
        react_to_tour_events,
        focus_stage,
    )
        .chain();

    let scene_systems = (
        (
            lighting_keyboard_shortcut,
            handle_lighting_commands,
            apply_lighting,
        )
            .chain(),
        (
            flow_keyboard_shortcut,
            handle_flow_commands,
            animate_flow_particles,
        )
            .chain(),
        (
            profile_keyboard_shortcut,
            toggle_profile_panel,
            update_profile_chart,
        )
            .chain(),
        update_selection_ring,
        resolve_pending_models,
    );

    let ui_systems = (
        update_control_labels,
        info_card_close_button,
        close_info_card_on_escape,
        sync_info_card,
        fps_notification_system,
    );

    app.add_systems(
        Update,
        (navigation_systems, scene_systems, ui_systems).run_if(in_state(AppState::Running)),
    );

    // Add fps_text_update_system only for native builds.
    #[cfg(not(target_arch = "wasm32"))]
    {
        app.add_systems(Update, fps_text_update_system);
    }

    app
}

fn spawn_camera(commands: &mut Commands, viewport_camera: &ViewportCamera) {
    commands.spawn((
        Camera3d::default(),
        viewport_camera.transform(),
        scene_fog(),
        Name::new("Viewport Camera"),
    ));
}

/// Build everything that does not depend on the model manifest.
fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
    viewport_camera: Res<ViewportCamera>,
) {
    spawn_lighting(&mut commands);
    spawn_terrain(&mut commands, &mut meshes, &mut materials);
    spawn_camera(&mut commands, &viewport_camera);
    spawn_selection_ring(&mut commands, &mut meshes, &mut materials);

    match FlowPath::supply_chain() {
        Some(path) => {
            spawn_flow_particles(&mut commands, &mut meshes, &mut materials, &path);
            let profile = ElevationProfile::along(&path, PROFILE_SAMPLES);
            spawn_profile_panel(&mut commands, &mut images, &profile);
            commands.insert_resource(profile);
            commands.insert_resource(path);
        }
        None => warn!("Flow path could not be built; particles and profile disabled"),
    }

    spawn_control_bar(&mut commands);
    spawn_info_card(&mut commands);

    #[cfg(not(target_arch = "wasm32"))]
    {
        spawn_fps_overlay(&mut commands);
    }

    info!("✓ Scene setup complete");
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
