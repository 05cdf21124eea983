//! JSON-RPC 2.0 communication layer for the host page.
//!
//! Implements bidirectional messaging between the Bevy scene and the page
//! embedding it via iframe postMessage, supporting both request-response and
//! notification patterns. On native builds the layer is inert.
//!
//! ## Architecture
//!
//! The RPC system uses standard JSON-RPC 2.0 protocol with:
//! - **Requests**: Expect responses with matching IDs
//! - **Notifications**: One-way messages without responses
//! - **Responses**: Reply to requests with results or errors
//!
//! ## Message Flow
//!
//! ```text
//! Host page (Parent Window)  <──postMessage──>  Bevy (iframe)
//!        │                                        │
//!        ├─ Request (with ID) ──────────────────> │
//!        │                                        ├─ Process request
//!        │ <───────────────── Response (with ID) ─┤
//!        │                                        │
//!        │ <────────── Notification (no ID) ─────┤
//! ```
//!
//! ## Adding New RPC Methods
//!
//! Add a case to `dispatch()`. Handlers return the result value plus an
//! optional `RpcAction`, which `handle_rpc_messages` turns into the matching
//! scene event:
//!
//! ```rust,ignore
//! match method {
//!     "your_method_name" => {
//!         let value = parse_your_params(params)?;
//!         Ok((json!({ "success": true }), Some(RpcAction::Flow(FlowCommand::SetVisible(value)))))
//!     }
//!     // ... existing methods
//!     _ => Err(RpcError::method_not_found(method)),
//! }
//! ```
//!
//! Calling from the host page:
//!
//! ```typescript
//! iframe.contentWindow.postMessage(JSON.stringify({
//!   jsonrpc: "2.0",
//!   method: "fly_to_stage",
//!   params: { stage: "dam" },
//!   id: 1
//! }), "*");
//! ```
//!
//! ## Sending Notifications from Bevy
//!
//! ```rust,ignore
//! fn your_system(mut rpc: ResMut<WebRpcInterface>) {
//!     rpc.send_notification("event_name", json!({ "data": "value" }));
//! }
//! ```
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error
//!
//! ## Existing Methods
//!
//! ### Guided Tour
//! - `start_tour`, `stop_tour`, `next_stop`, `previous_stop`
//! - `fly_to_stage`: Single flight to `{ "stage": "<key>" }`
//!
//! ### Scene Control
//! - `set_lighting`: `{ "mode": "day" | "night" }`
//! - `toggle_lighting`: Switch between day and night
//! - `set_flow_visible`: `{ "visible": bool }`
//!
//! ### Queries
//! - `get_stages`: Stage keys, titles and world anchors in flow order
//! - `get_elevation_profile`: Profile samples and stage markers
//! - `get_fps`: Retrieve current frame rate
//!
//! ## Notifications
//!
//! `tour_stop_changed`, `tour_finished`, `lighting_changed`, `flow_toggled`,
//! `stage_selected`, `loading_progress`, `fps_update`.

/// JSON-RPC 2.0 bidirectional communication system for the host page.
///
/// Handles request-response patterns, notifications, and WASM message listeners.
pub mod web_rpc;
