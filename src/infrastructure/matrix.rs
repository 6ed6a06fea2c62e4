//! # Matrix Service Adapter
//!
//! Implements the `ChatProvider` trait for the Matrix protocol using the
//! `matrix_sdk`. Bridges the generic interface used by the router and
//! handlers to the SDK's room API.

use async_trait::async_trait;
use matrix_sdk::room::Room;
use matrix_sdk::ruma::events::room::message::RoomMessageEventContent;

use crate::domain::traits::ChatProvider;

#[derive(Clone)]
pub struct MatrixService {
    room: Room,
}

impl MatrixService {
    pub fn new(room: Room) -> Self {
        Self { room }
    }
}

#[async_trait]
impl ChatProvider for MatrixService {
    async fn send_message(&self, content: &str) -> Result<(), String> {
        tracing::debug!("Sending message to {}", self.room_id());
        self.room
            .send(RoomMessageEventContent::text_markdown(content))
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    async fn typing(&self, active: bool) -> Result<(), String> {
        self.room
            .typing_notice(active)
            .await
            .map_err(|e| e.to_string())
    }

    fn room_id(&self) -> String {
        self.room.room_id().as_str().to_string()
    }
}
