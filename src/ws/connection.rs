//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered events.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::{SubscriptionManager, Targets};
use crate::api::dto::{ItemResponse, PodDetailResponse};
use crate::domain::{ItemId, PodEvent, PodId};
use crate::error::TrackerError;
use crate::service::PodService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards matching events from the [`broadcast::Receiver`] to the client.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<PodEvent>,
    pod_service: Arc<PodService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_text_message(&text, &mut subs, &pod_service).await;
                        if let Some(json) = reply.to_json()
                            && ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(pod_event) => {
                        let pod_id = pod_event.pod_id();
                        if !subs.matches(pod_id) {
                            continue;
                        }
                        if matches!(pod_event, PodEvent::PodRemoved { .. }) {
                            subs.forget(pod_id);
                        }
                        if let Some(json) = WsMessage::event(&pod_event).to_json()
                            && ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Handles a text message from the client and builds the reply.
async fn handle_text_message(
    text: &str,
    subs: &mut SubscriptionManager,
    pod_service: &PodService,
) -> WsMessage {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return WsMessage::error(String::new(), 400, "malformed JSON");
    };
    if msg.msg_type != WsMessageType::Command {
        return WsMessage::error(msg.id, 400, "expected a command message");
    }
    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return WsMessage::error(msg.id, 404, "unknown command");
    };

    match command {
        WsCommand::Subscribe { pod_ids } => {
            let targets = Targets::parse(&pod_ids);
            subs.subscribe(&targets);
            tracing::debug!(count = subs.count(), wildcard = subs.is_subscribed_all(), "ws subscribe");
            WsMessage::response(
                msg.id,
                serde_json::json!({
                    "subscribed": targets.ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "rejected": targets.rejected,
                    "count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::Unsubscribe { pod_ids } => {
            let targets = Targets::parse(&pod_ids);
            subs.unsubscribe(&targets);
            WsMessage::response(
                msg.id,
                serde_json::json!({
                    "unsubscribed": targets.ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "remaining_count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::ListSubscriptions => WsMessage::response(
            msg.id,
            serde_json::json!({
                "pod_ids": subs.pod_ids(),
                "wildcard": subs.is_subscribed_all(),
            }),
        ),
        WsCommand::GetPod { pod_id } => {
            let result = match parse_pod_id(&pod_id) {
                Ok(id) => pod_service.get_pod(id).await.map(PodDetailResponse::from),
                Err(e) => Err(e),
            };
            reply(msg.id, result)
        }
        WsCommand::GetItem { pod_id, item_id } => {
            let result = match parse_pod_id(&pod_id) {
                Ok(id) => pod_service
                    .item_view(id, ItemId::new(item_id))
                    .await
                    .map(ItemResponse::from),
                Err(e) => Err(e),
            };
            reply(msg.id, result)
        }
    }
}

fn parse_pod_id(raw: &str) -> Result<PodId, TrackerError> {
    raw.parse::<uuid::Uuid>()
        .map(PodId::from_uuid)
        .map_err(|_| TrackerError::InvalidRequest(format!("not a pod id: {raw}")))
}

fn reply<T: serde::Serialize>(id: String, result: Result<T, TrackerError>) -> WsMessage {
    match result {
        Ok(body) => WsMessage::response(id, serde_json::to_value(body).unwrap_or_default()),
        Err(e) => WsMessage::error(id, e.status_code().as_u16(), e.to_string()),
    }
}
