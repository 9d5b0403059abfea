//! Simulated chat room connection.
//!
//! A [`SimulatedConnection`] emulates server push by invoking its single
//! registered handler with a canned message on a fixed interval. A
//! [`ChatRoomBinding`] ties such a connection to the lifetime of a view's
//! `(server_url, room_id)` pair, rebuilding it only when that pair changes.

pub mod binding;
pub mod connection;
pub mod domain;
pub mod error;
pub mod message_source;

pub use binding::{ChatRoomBinding, ChatRoomProps, MessageCallback};
pub use connection::{
    ChatConnection, ConnectionFactory, DEFAULT_TICK_INTERVAL, MESSAGE_EVENT, MessageHandler,
    SimulatedConnection, SimulatedConnectionFactory, create_connection,
};
pub use domain::{ConnectionConfig, ConnectionId, RoomId, ServerUrl};
pub use error::{ConnectionError, ValidationError};
pub use message_source::{CannedMessages, MessageSource};
