//! Realtime gateway for Plaza.

mod gateway;
mod messages;

pub use gateway::{chat_ws_handler, GatewayState, WsQuery};
pub use messages::{ClientEvent, ServerEvent};
