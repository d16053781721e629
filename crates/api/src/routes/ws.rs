//! WebSocket gateway.
//!
//! GET /ws
//!
//! Protocol:
//! - Client → server: `{"event": "createOrder" | "updateOrderStatus" | "getOrderSummary" |
//!   "joinOrderRoom" | "leaveOrderRoom", "data": ...}`
//! - Server → client: `{"event": <name>, "audience": <scope>, "data": <payload>}`,
//!   carrying the direct acknowledgement of each command plus every hub message
//!   routed to the connection. `audience` tells a room copy from its broadcast twin.
//!
//! A failed command is answered with `orderError` on the issuing connection only.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use common::OrderId;
use domain::{CreateOrderRequest, OrderStatus};
use futures_util::{SinkExt, StreamExt};
use hub::{Audience, ConnectionId, HubMessage, Scope, Subscription, event_names, order_room};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::AppState;
use crate::error::ApiError;

/// Commands accepted from socket clients.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientCommand {
    CreateOrder(CreateOrderRequest),
    UpdateOrderStatus(StatusUpdate),
    GetOrderSummary(OrderId),
    JoinOrderRoom(OrderId),
    LeaveOrderRoom(OrderId),
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub id: OrderId,
    pub status: String,
}

#[derive(Serialize)]
struct Frame<'a> {
    event: &'a str,
    audience: &'a Audience,
    data: &'a Value,
}

/// Encodes a hub message as an outbound text frame.
fn encode_frame(message: &HubMessage) -> serde_json::Result<String> {
    serde_json::to_string(&Frame {
        event: &message.event,
        audience: &message.audience,
        data: &message.data,
    })
}

/// GET /ws
pub async fn upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| session(socket, state))
}

async fn session(socket: WebSocket, state: AppState) {
    let Subscription { id, mut receiver } = state.hub.connect().await;
    let (mut sink, mut stream) = socket.split();
    tracing::info!(connection_id = %id, "client connected");

    state
        .hub
        .publish(
            Scope::Direct(id),
            event_names::CONNECTED,
            json!({ "message": "Connected to order service", "client_id": id }),
        )
        .await;

    loop {
        tokio::select! {
            outbound = receiver.recv() => {
                let Some(message) = outbound else { break };
                if send_frame(&mut sink, &message).await.is_err() {
                    break;
                }
            }

            inbound = stream.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => handle_text(&state, id, text.as_str()).await,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        tracing::debug!(connection_id = %id, error = %err, "socket read failed");
                        break;
                    }
                }
            }
        }
    }

    state.hub.disconnect(id).await;
    tracing::info!(connection_id = %id, "client disconnected");
}

async fn send_frame(
    sink: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    message: &HubMessage,
) -> Result<(), axum::Error> {
    match encode_frame(message) {
        Ok(text) => sink.send(Message::Text(text.into())).await,
        Err(err) => {
            tracing::error!(event = %message.event, error = %err, "failed to encode frame");
            Ok(())
        }
    }
}

/// Handles one text frame from `connection`, replying on its direct scope.
pub async fn handle_text(state: &AppState, connection: ConnectionId, text: &str) {
    let reply = match serde_json::from_str::<ClientCommand>(text) {
        Ok(command) => dispatch(state, connection, command).await,
        Err(err) => Err(ApiError::BadRequest(format!("Invalid message: {err}"))),
    };

    let (event, data) = match reply {
        Ok(ack) => {
            metrics::counter!("gateway_commands_total", "outcome" => "ok").increment(1);
            ack
        }
        Err(err) => {
            metrics::counter!("gateway_commands_total", "outcome" => "error").increment(1);
            tracing::warn!(connection_id = %connection, error = %err, "socket command failed");
            (
                event_names::ORDER_ERROR,
                json!({ "success": false, "message": err.to_string() }),
            )
        }
    };
    state.hub.publish(Scope::Direct(connection), event, data).await;
}

/// Runs a client command and builds its acknowledgement.
#[tracing::instrument(skip(state, command), fields(connection_id = %connection))]
pub async fn dispatch(
    state: &AppState,
    connection: ConnectionId,
    command: ClientCommand,
) -> Result<(&'static str, Value), ApiError> {
    match command {
        ClientCommand::CreateOrder(request) => {
            let order = state.order_service.create_order(request).await?;
            Ok((
                event_names::ORDER_CREATED,
                json!({
                    "success": true,
                    "order": order,
                    "message": "Order created successfully",
                }),
            ))
        }
        ClientCommand::UpdateOrderStatus(update) => {
            let status: OrderStatus = update.status.parse()?;
            let order = state.order_service.update_status(update.id, status).await?;
            Ok((
                event_names::ORDER_STATUS_UPDATED,
                json!({
                    "success": true,
                    "order": order,
                    "message": "Order status updated successfully",
                }),
            ))
        }
        ClientCommand::GetOrderSummary(order_id) => {
            let summary = state.order_service.get_summary(order_id).await?;
            Ok((
                event_names::ORDER_SUMMARY,
                json!({ "success": true, "summary": summary }),
            ))
        }
        ClientCommand::JoinOrderRoom(order_id) => {
            state
                .hub
                .join(connection, &order_room(order_id))
                .await
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            Ok((
                event_names::JOINED_ORDER_ROOM,
                json!({
                    "order_id": order_id,
                    "message": format!("Joined room for order {order_id}"),
                }),
            ))
        }
        ClientCommand::LeaveOrderRoom(order_id) => {
            state
                .hub
                .leave(connection, &order_room(order_id))
                .await
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            Ok((
                event_names::LEFT_ORDER_ROOM,
                json!({
                    "order_id": order_id,
                    "message": format!("Left room for order {order_id}"),
                }),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_carries_audience() {
        let order_id = OrderId::new();
        let room = HubMessage {
            event: event_names::ORDER_STATUS_CHANGED.to_string(),
            audience: Scope::order(order_id).audience(),
            data: json!({ "order_id": order_id, "new_status": "confirmed" }),
        };

        let frame: Value = serde_json::from_str(&encode_frame(&room).unwrap()).unwrap();

        assert_eq!(frame["event"], "orderStatusChanged");
        assert_eq!(frame["audience"]["kind"], "room");
        assert_eq!(frame["audience"]["topic"], order_room(order_id));
        assert_eq!(frame["data"]["new_status"], "confirmed");

        let broadcast = HubMessage {
            audience: Scope::Broadcast.audience(),
            ..room
        };
        let frame: Value = serde_json::from_str(&encode_frame(&broadcast).unwrap()).unwrap();
        assert_eq!(frame["audience"]["kind"], "broadcast");
        assert!(frame["audience"].get("topic").is_none());
    }
}
