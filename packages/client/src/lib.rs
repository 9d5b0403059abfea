//! Interactive chat room view backed by a simulated connection.
//!
//! The view shows a welcome line for the current room, lets the user edit the
//! server URL and switch rooms, and prints a notification for every message
//! the connection delivers.

pub mod command;
pub mod error;
pub mod formatter;
pub mod runner;
mod ui;
pub mod view;

pub use runner::{ChatRoomSettings, run_chat_room};
