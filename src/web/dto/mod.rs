//! Request and response DTOs for the Plaza web API.

mod request;
mod response;

pub use request::{LoginRequest, SendMessageBody};
pub use response::{
    ApiResponse, ChatMessageResponse, LocationResponse, LoginResponse, MeResponse,
    MessageResponse, RoomResponse, UnreadCountResponse,
};
