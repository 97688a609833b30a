//! Realtime client for the Plaza client runtime.
//!
//! Owns the single authenticated WebSocket channel to the gateway and
//! republishes inbound events onto the event bus, decoupling the
//! transport from UI code. All room operations are thin pass-throughs:
//! nothing is queued or retried when the channel is down.

use std::sync::{Arc, Mutex};

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::web::ws::{ClientEvent, ServerEvent};

use super::bus::{topics, BusEvent, EventBus};
use super::state::StateStore;

/// An open channel to the gateway.
struct Channel {
    /// Outbound events, drained by the channel task.
    tx: UnboundedSender<ClientEvent>,
    /// The task driving the socket.
    task: JoinHandle<()>,
}

/// Client for the realtime gateway.
///
/// One instance per session. The credential is read from the state store
/// at connect time; the bound identity lives only for the channel's
/// lifetime.
pub struct RealtimeClient {
    gateway_url: String,
    bus: Arc<EventBus>,
    store: Arc<StateStore>,
    channel: Arc<Mutex<Option<Channel>>>,
}

impl RealtimeClient {
    /// Create a client for the gateway at `gateway_url`.
    ///
    /// The URL may use an `http(s)` or `ws(s)` scheme; HTTP schemes are
    /// rewritten for the WebSocket handshake.
    pub fn new(gateway_url: impl Into<String>, bus: Arc<EventBus>, store: Arc<StateStore>) -> Self {
        Self {
            gateway_url: gateway_url.into(),
            bus,
            store,
            channel: Arc::new(Mutex::new(None)),
        }
    }

    /// Whether the channel is currently open.
    pub fn is_connected(&self) -> bool {
        self.channel
            .lock()
            .expect("channel lock poisoned")
            .as_ref()
            .is_some_and(|ch| !ch.tx.is_closed())
    }

    /// Open the authenticated channel.
    ///
    /// No-op if already connected. Never errors to the caller: a missing
    /// credential is logged and ignored, and a refused handshake is
    /// surfaced as [`BusEvent::AuthFailed`] on the connection topic.
    pub async fn connect(&self) {
        if self.is_connected() {
            tracing::debug!("Realtime channel already connected");
            return;
        }

        let Some(token) = self.store.session().token else {
            tracing::warn!("No credential present; realtime channel not opened");
            return;
        };

        let url = ws_url(&self.gateway_url, &token);
        let ws_stream = match connect_async(&url).await {
            Ok((stream, _)) => stream,
            Err(e) => {
                tracing::warn!("Realtime handshake refused: {}", e);
                self.bus.publish(topics::CONNECTION, &BusEvent::AuthFailed);
                return;
            }
        };

        let (mut ws_tx, mut ws_rx) = ws_stream.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<ClientEvent>();

        let bus = self.bus.clone();
        let slot = self.channel.clone();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    outbound = rx.recv() => {
                        let Some(event) = outbound else { break };
                        let Ok(json) = serde_json::to_string(&event) else { continue };
                        if ws_tx.send(Message::Text(json)).await.is_err() {
                            break;
                        }
                    }

                    inbound = ws_rx.next() => {
                        match inbound {
                            Some(Ok(Message::Text(text))) => dispatch(&bus, &text),
                            Some(Ok(Message::Close(_))) | None => break,
                            Some(Ok(_)) => {}
                            Some(Err(e)) => {
                                tracing::debug!("Realtime channel error: {}", e);
                                break;
                            }
                        }
                    }
                }
            }

            // The slot is cleared before the event goes out so handlers
            // observe a disconnected client.
            *slot.lock().expect("channel lock poisoned") = None;
            bus.publish(topics::CONNECTION, &BusEvent::Disconnected);
        });

        *self.channel.lock().expect("channel lock poisoned") = Some(Channel { tx, task });
        tracing::info!("Realtime channel connected");
        self.bus.publish(topics::CONNECTION, &BusEvent::Connected);
    }

    /// Tear down the channel and forget the bound identity.
    ///
    /// Idempotent; disconnecting an unconnected client does nothing.
    pub fn disconnect(&self) {
        let taken = self.channel.lock().expect("channel lock poisoned").take();
        if let Some(channel) = taken {
            channel.task.abort();
            drop(channel.tx);
            tracing::info!("Realtime channel disconnected");
            self.bus.publish(topics::CONNECTION, &BusEvent::Disconnected);
        }
    }

    /// Join a room's broadcast group. No-op when not connected.
    pub fn join_room(&self, room_id: i64) {
        self.send_event(ClientEvent::JoinRoom { room_id });
    }

    /// Leave a room's broadcast group. No-op when not connected.
    pub fn leave_room(&self, room_id: i64) {
        self.send_event(ClientEvent::LeaveRoom { room_id });
    }

    /// Send a chat message to a room. No-op when not connected; the
    /// echo of the gateway's broadcast is the acknowledgment.
    pub fn send_message(&self, room_id: i64, content: impl Into<String>) {
        self.send_event(ClientEvent::SendMessage {
            room_id,
            content: content.into(),
        });
    }

    /// Hand an event to the channel task, dropping it if the channel is
    /// not connected. Nothing is queued or retried.
    fn send_event(&self, event: ClientEvent) {
        let channel = self.channel.lock().expect("channel lock poisoned");
        let delivered = channel
            .as_ref()
            .is_some_and(|ch| ch.tx.send(event).is_ok());
        if !delivered {
            tracing::debug!("Realtime channel not connected; event dropped");
        }
    }
}

/// Parse an inbound frame and republish it on the bus.
///
/// Gateway events never mutate the state store directly; interested
/// parties subscribe to the topics.
fn dispatch(bus: &EventBus, text: &str) {
    match serde_json::from_str::<ServerEvent>(text) {
        Ok(ServerEvent::NewMessage { message }) => {
            bus.publish(topics::CHAT_MESSAGE, &BusEvent::MessageBroadcast(message));
        }
        Ok(ServerEvent::ChatError { message }) => {
            tracing::warn!("Chat error from gateway: {}", message);
            bus.publish(topics::CHAT_ERROR, &BusEvent::ChatError { message });
        }
        Err(e) => {
            tracing::debug!("Unrecognized gateway frame: {}", e);
        }
    }
}

/// Rewrite an HTTP base URL for the gateway handshake.
fn ws_url(base: &str, token: &str) -> String {
    let base = base
        .replace("http://", "ws://")
        .replace("https://", "wss://");
    format!("{}/api/chat/ws?token={}", base.trim_end_matches('/'), token)
}
