use bevy::diagnostic::DiagnosticsStore;
use bevy::prelude::*;
use constants::stage::StageKey;
use serde::{Deserialize, Serialize};

use crate::engine::flow::particles::FlowCommand;
use crate::engine::infrastructure::sites::{site, world_anchor};
use crate::engine::profile::elevation::ElevationProfile;
use crate::engine::scene::lighting::{LightingCommand, LightingMode};
use crate::engine::systems::fps_tracking::current_fps;
use crate::engine::tour::guided_tour::TourCommand;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC 2.0 error object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Resource managing bidirectional RPC communication with the host page.
/// Handles both request-response patterns and notification broadcasting.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to the host page without expecting a response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    /// Queue response for transmission to the host page.
    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Scene change requested by an RPC call, applied through the matching event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RpcAction {
    Tour(TourCommand),
    Lighting(LightingCommand),
    Flow(FlowCommand),
}

/// Read-only scene state the query methods answer from.
pub struct RpcContext<'a> {
    pub fps: f32,
    pub profile: Option<&'a ElevationProfile>,
}

/// Plugin establishing WebRPC communication layer for iframe-based deployment.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (
                    process_incoming_messages,
                    handle_rpc_messages,
                    send_outgoing_messages,
                )
                    .chain(),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    // Thread-safe message queue for cross-thread communication.
    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        // Filter messages to ensure they contain string data.
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();
            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    let Some(window) = window() else {
        error!("Window object not available, RPC listener not installed");
        return;
    };
    if let Err(e) =
        window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
    {
        error!("Failed to register message listener: {:?}", e);
        return;
    }

    // Prevent closure from being dropped by transferring ownership to JS.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping thread-safe message queue for WASM event handling.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Event representing an incoming RPC message from the host page.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    diagnostics: Res<DiagnosticsStore>,
    profile: Option<Res<ElevationProfile>>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut tour_commands: EventWriter<TourCommand>,
    mut lighting_commands: EventWriter<LightingCommand>,
    mut flow_commands: EventWriter<FlowCommand>,
) {
    let context = RpcContext {
        fps: current_fps(&diagnostics).unwrap_or(0.0),
        profile: profile.as_deref(),
    };

    for event in events.read() {
        let request = match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => request,
            Err(parse_error) => {
                warn!("Ignoring malformed RPC message: {}", parse_error);
                continue;
            }
        };

        let (response, action) = handle_rpc_request(&request, &context);
        match action {
            Some(RpcAction::Tour(command)) => {
                tour_commands.write(command);
            }
            Some(RpcAction::Lighting(command)) => {
                lighting_commands.write(command);
            }
            Some(RpcAction::Flow(command)) => {
                flow_commands.write(command);
            }
            None => {}
        }
        if let Some(response) = response {
            rpc_interface.queue_response(response);
        }
    }
}

/// Handle one request. Requests without an ID are still acted on but get no response.
pub fn handle_rpc_request(
    request: &RpcRequest,
    context: &RpcContext,
) -> (Option<RpcResponse>, Option<RpcAction>) {
    let outcome = dispatch(&request.method, &request.params, context);
    if let Err(error) = &outcome {
        warn!("RPC {} failed: {}", request.method, error.message);
    }

    let (response, action) = match outcome {
        Ok((result, action)) => (
            RpcResponse {
                jsonrpc: "2.0".to_string(),
                result: Some(result),
                error: None,
                id: None,
            },
            action,
        ),
        Err(error) => (
            RpcResponse {
                jsonrpc: "2.0".to_string(),
                result: None,
                error: Some(error),
                id: None,
            },
            None,
        ),
    };

    let response = request.id.clone().map(|id| RpcResponse {
        id: Some(id),
        ..response
    });
    (response, action)
}

/// Route a method to its handler.
fn dispatch(
    method: &str,
    params: &serde_json::Value,
    context: &RpcContext,
) -> Result<(serde_json::Value, Option<RpcAction>), RpcError> {
    if let Some(command) = TourCommand::from_string(method) {
        return Ok((
            serde_json::json!({ "success": true }),
            Some(RpcAction::Tour(command)),
        ));
    }

    match method {
        "fly_to_stage" => {
            let stage = parse_stage(params)?;
            Ok((
                serde_json::json!({ "success": true, "stage": stage }),
                Some(RpcAction::Tour(TourCommand::FlyToStage(stage))),
            ))
        }
        "set_lighting" => {
            let mode = parse_lighting_mode(params)?;
            Ok((
                serde_json::json!({ "success": true, "mode": mode }),
                Some(RpcAction::Lighting(LightingCommand::Set(mode))),
            ))
        }
        "toggle_lighting" => Ok((
            serde_json::json!({ "success": true }),
            Some(RpcAction::Lighting(LightingCommand::Toggle)),
        )),
        "set_flow_visible" => {
            let visible = parse_flow_visible(params)?;
            Ok((
                serde_json::json!({ "success": true, "visible": visible }),
                Some(RpcAction::Flow(FlowCommand::SetVisible(visible))),
            ))
        }
        "get_stages" => Ok((stages_json(), None)),
        "get_elevation_profile" => {
            let profile = context
                .profile
                .ok_or_else(|| RpcError::internal_error("Elevation profile not available"))?;
            let value = serde_json::to_value(profile)
                .map_err(|e| RpcError::internal_error(&e.to_string()))?;
            Ok((value, None))
        }
        "get_fps" => Ok((serde_json::json!({ "fps": context.fps }), None)),
        _ => Err(RpcError::method_not_found(method)),
    }
}

fn parse_stage(params: &serde_json::Value) -> Result<StageKey, RpcError> {
    #[derive(Deserialize)]
    struct StageParams {
        stage: String,
    }

    let parsed = serde_json::from_value::<StageParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'stage' parameter"))?;
    StageKey::from_string(&parsed.stage)
        .ok_or_else(|| RpcError::invalid_params(&format!("Unknown stage: {}", parsed.stage)))
}

fn parse_lighting_mode(params: &serde_json::Value) -> Result<LightingMode, RpcError> {
    #[derive(Deserialize)]
    struct LightingParams {
        mode: String,
    }

    let parsed = serde_json::from_value::<LightingParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'mode' parameter"))?;
    LightingMode::from_string(&parsed.mode)
        .ok_or_else(|| RpcError::invalid_params(&format!("Unknown lighting mode: {}", parsed.mode)))
}

fn parse_flow_visible(params: &serde_json::Value) -> Result<bool, RpcError> {
    #[derive(Deserialize)]
    struct FlowParams {
        visible: bool,
    }

    serde_json::from_value::<FlowParams>(params.clone())
        .map(|parsed| parsed.visible)
        .map_err(|_| RpcError::invalid_params("Expected boolean 'visible' parameter"))
}

/// Every stage in flow order with its card title and world anchor.
fn stages_json() -> serde_json::Value {
    let stages: Vec<serde_json::Value> = StageKey::ALL
        .iter()
        .map(|&stage| {
            let stage_site = site(stage);
            let anchor = world_anchor(stage);
            serde_json::json!({
                "key": stage,
                "index": stage.index(),
                "name": stage.display_name(),
                "title": stage_site.title,
                "summary": stage_site.summary,
                "anchor": [anchor.x, anchor.y, anchor.z],
            })
        })
        .collect();
    serde_json::json!({ "stages": stages })
}

/// Send queued notifications and responses to the host page.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    // Send notifications first.
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    // Send responses second to maintain order.
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialized message to the parent window.
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        // No-op for non-WASM targets.
        let _ = message;
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: "Method not found".to_string(),
            data: Some(serde_json::json!({ "method": method })),
        }
    }

    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn internal_error(message: &str) -> Self {
        Self {
            code: -32603,
            message: message.to_string(),
            data: None,
        }
    }
}
