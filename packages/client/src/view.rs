//! The chat room view.
//!
//! `room_id` plays the part of a prop and `server_url` the part of editable
//! state. Every `render` hands a fresh notification callback to the binding,
//! which reconnects only when `(server_url, room_id)` changed.

use std::sync::Arc;

use chatroom_connection::{
    ChatRoomBinding, ChatRoomProps, ConnectionConfig, ConnectionFactory, RoomId, ServerUrl,
};
use chatroom_shared::time::Clock;
use tokio::sync::mpsc;

use crate::{
    error::ClientError,
    formatter::{NotificationFormatter, OutputFormat},
};

pub struct ChatRoomView {
    room_id: RoomId,
    server_url: ServerUrl,
    prefix: String,
    format: OutputFormat,
    clock: Arc<dyn Clock>,
    output: mpsc::UnboundedSender<String>,
    binding: ChatRoomBinding,
}

impl ChatRoomView {
    /// Create an unrendered view. Nothing connects until [`render`](Self::render).
    pub fn new(
        config: ConnectionConfig,
        prefix: String,
        format: OutputFormat,
        factory: Arc<dyn ConnectionFactory>,
        clock: Arc<dyn Clock>,
        output: mpsc::UnboundedSender<String>,
    ) -> Self {
        let ConnectionConfig {
            server_url,
            room_id,
        } = config;
        Self {
            room_id,
            server_url,
            prefix,
            format,
            clock,
            output,
            binding: ChatRoomBinding::new(factory),
        }
    }

    /// Re-evaluate the view and return its title line.
    ///
    /// Must be called within a Tokio runtime when the factory builds
    /// simulated connections.
    pub fn render(&mut self) -> Result<String, ClientError> {
        let config = ConnectionConfig::new(self.server_url.clone(), self.room_id.clone());

        let room_id = self.room_id.to_string();
        let prefix = self.prefix.clone();
        let format = self.format;
        let clock = Arc::clone(&self.clock);
        let output = self.output.clone();
        let on_receive_message = move |message: &str| {
            let received_at = clock.now_millis();
            let notification =
                NotificationFormatter::format(format, &room_id, &prefix, message, received_at);
            if output.send(notification).is_err() {
                tracing::debug!("Output closed, notification dropped");
            }
        };

        self.binding.bind(ChatRoomProps::new(config, on_receive_message))?;

        Ok(NotificationFormatter::format_title(self.room_id.as_str()))
    }

    pub fn set_server_url(&mut self, server_url: &str) -> Result<(), ClientError> {
        self.server_url = ServerUrl::new(server_url.to_string())?;
        Ok(())
    }

    pub fn set_room_id(&mut self, room_id: &str) -> Result<(), ClientError> {
        self.room_id = RoomId::new(room_id.to_string())?;
        Ok(())
    }

    pub fn set_prefix(&mut self, prefix: &str) {
        self.prefix = prefix.to_string();
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn server_url(&self) -> &ServerUrl {
        &self.server_url
    }

    /// Config of the live connection, if rendered
    pub fn connected_to(&self) -> Option<&ConnectionConfig> {
        self.binding.bound_config()
    }

    /// Leave the room.
    pub fn close(&mut self) {
        self.binding.unbind();
    }
}
