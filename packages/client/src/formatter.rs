//! Notification formatting for received messages.

use chatroom_shared::time::timestamp_to_jst_rfc3339;
use clap::ValueEnum;
use serde::Serialize;

/// Default notification prefix
pub const DEFAULT_PREFIX: &str = "New message:";

/// How notifications are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// `New message: hey (received at 2023-01-01T00:00:00+09:00)`
    #[default]
    Text,
    /// One JSON object per notification
    Json,
}

/// JSON shape of a notification
#[derive(Debug, Serialize)]
pub struct NotificationDto<'a> {
    pub room_id: &'a str,
    pub message: &'a str,
    /// Unix timestamp (milliseconds)
    pub received_at: i64,
}

/// Notification formatter for client display
pub struct NotificationFormatter;

impl NotificationFormatter {
    /// Format a notification in the requested output format
    pub fn format(
        format: OutputFormat,
        room_id: &str,
        prefix: &str,
        message: &str,
        received_at: i64,
    ) -> String {
        match format {
            OutputFormat::Text => Self::format_text(prefix, message, received_at),
            OutputFormat::Json => Self::format_json(room_id, message, received_at),
        }
    }

    /// Format a notification as text
    ///
    /// # Arguments
    ///
    /// * `prefix` - Text shown before the message (e.g., "New message:")
    /// * `message` - The received message
    /// * `received_at` - Unix timestamp when the message arrived (milliseconds)
    pub fn format_text(prefix: &str, message: &str, received_at: i64) -> String {
        match timestamp_to_jst_rfc3339(received_at) {
            Some(timestamp) => format!("{} {} (received at {})", prefix, message, timestamp),
            None => format!("{} {}", prefix, message),
        }
    }

    /// Format a notification as a single-line JSON object
    pub fn format_json(room_id: &str, message: &str, received_at: i64) -> String {
        let dto = NotificationDto {
            room_id,
            message,
            received_at,
        };
        serde_json::to_string(&dto).unwrap_or_else(|e| {
            tracing::error!("Failed to serialize notification: {}", e);
            message.to_string()
        })
    }

    /// Format the room title
    pub fn format_title(room_id: &str) -> String {
        format!("Welcome to the {} room!", room_id)
    }
}
