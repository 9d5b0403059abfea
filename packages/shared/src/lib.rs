//! Shared utilities for the chatroom workspace.

pub mod logger;
pub mod time;
