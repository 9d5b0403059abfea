//! Interactive chat room driven by a simulated connection.
//!
//! Joins a room, prints a notification for every simulated incoming message,
//! and lets the user change the server URL, room, or notification prefix.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin chatroom-client
//! cargo run --bin chatroom-client -- --room-id travel --server-url https://localhost:5678
//! cargo run --bin chatroom-client -- -r music --interval-ms 1000 --format json
//! ```

use std::time::Duration;

use clap::Parser;

use chatroom_client::{ChatRoomSettings, formatter::OutputFormat, run_chat_room};
use chatroom_connection::ConnectionConfig;
use chatroom_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "chatroom-client")]
#[command(about = "Chat room view with a simulated server connection", long_about = None)]
struct Args {
    /// Room to join
    #[arg(short = 'r', long, default_value = "general")]
    room_id: String,

    /// Server URL (not contacted, shown in connection logs only)
    #[arg(short = 'u', long, default_value = "https://localhost:1234")]
    server_url: String,

    /// Interval between simulated incoming messages, in milliseconds
    #[arg(long, default_value_t = 3000, value_parser = clap::value_parser!(u64).range(1..))]
    interval_ms: u64,

    /// Notification output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Text shown before each notification
    #[arg(long, default_value = chatroom_client::formatter::DEFAULT_PREFIX)]
    prefix: String,

    /// Default log level, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = match ConnectionConfig::parse(&args.server_url, &args.room_id) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid arguments: {}", e);
            std::process::exit(1);
        }
    };

    let settings = ChatRoomSettings {
        config,
        tick_interval: Duration::from_millis(args.interval_ms),
        format: args.format,
        prefix: args.prefix,
    };

    if let Err(e) = run_chat_room(settings).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
