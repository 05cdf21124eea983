use bevy::prelude::*;

use crate::engine::loading::progress::LoadingProgress;
use crate::rpc::web_rpc::WebRpcInterface;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States, Resource)]
pub enum AppState {
    #[default]
    Loading,
    Running,
}

#[derive(Component)]
pub struct FpsText;

/// Enter `Running` once every stage root exists, with models or placeholders.
pub fn transition_to_running(
    loading_progress: Res<LoadingProgress>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if loading_progress.infrastructure_spawned {
        info!("→ Infrastructure spawned, transitioning to Running state");
        next_state.set(AppState::Running);
    }
}

/// Tell the host page whenever the loading phase moves on.
pub fn update_loading_frontend(
    loading_progress: Res<LoadingProgress>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut last_phase: Local<&'static str>,
) {
    if !loading_progress.is_changed() {
        return;
    }
    let phase = loading_progress.phase();
    if *last_phase == phase {
        return;
    }
    *last_phase = phase;

    info!("Loading phase: {}", phase);
    rpc_interface.send_notification(
        "loading_progress",
        serde_json::json!({
            "phase": phase,
            "models_requested": loading_progress.models_requested,
            "models_resolved": loading_progress.models_resolved,
        }),
    );
}
