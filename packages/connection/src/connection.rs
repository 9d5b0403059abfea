//! The simulated connection and the factory that builds it.
//!
//! ## Lifecycle
//!
//! ```text
//! create ──> connect ──> on("message", h) ──> [tick: h(msg)]* ──> disconnect
//!              ^                                                     │
//!              └──────────────── (may reconnect) ────────────────────┘
//! ```
//!
//! The timer task is present if and only if the connection is connected.
//! At most one handler is registered at a time; `disconnect` clears it.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

use crate::{
    domain::{ConnectionConfig, ConnectionId},
    error::ConnectionError,
    message_source::{CannedMessages, MessageSource},
};

/// The only event a connection emits.
pub const MESSAGE_EVENT: &str = "message";

/// Interval between simulated incoming messages.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(3);

const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

/// Callback invoked with each incoming message.
pub type MessageHandler = Arc<dyn Fn(&str) + Send + Sync>;

type HandlerSlot = Arc<Mutex<Option<MessageHandler>>>;

/// A live channel to a single chat room.
#[cfg_attr(test, mockall::automock)]
pub trait ChatConnection: Send {
    /// Start (or restart) delivering messages. Never fails.
    fn connect(&mut self);

    /// Stop delivering messages and forget the registered handler.
    /// Safe to call when not connected.
    fn disconnect(&mut self);

    /// Register the handler for `event`.
    ///
    /// # Errors
    ///
    /// * [`ConnectionError::DuplicateHandler`] if a handler is already registered
    /// * [`ConnectionError::UnsupportedEvent`] if `event` is not [`MESSAGE_EVENT`]
    fn on(&mut self, event: &str, handler: MessageHandler) -> Result<(), ConnectionError>;
}

/// Builds connections for a given config.
#[cfg_attr(test, mockall::automock)]
pub trait ConnectionFactory: Send + Sync {
    fn create(&self, config: &ConnectionConfig) -> Box<dyn ChatConnection>;
}

/// Lock a mutex, recovering the data if a handler panicked while holding it.
pub(crate) fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock connection emulating server push with a periodic timer.
pub struct SimulatedConnection {
    id: ConnectionId,
    config: ConnectionConfig,
    tick_interval: Duration,
    source: Arc<dyn MessageSource>,
    handler: HandlerSlot,
    timer: Option<JoinHandle<()>>,
}

impl SimulatedConnection {
    /// Create a disconnected connection. A zero interval is raised to 1ms.
    pub fn new(
        config: ConnectionConfig,
        tick_interval: Duration,
        source: Arc<dyn MessageSource>,
    ) -> Self {
        Self {
            id: ConnectionId::generate(),
            config,
            tick_interval: tick_interval.max(MIN_TICK_INTERVAL),
            source,
            handler: Arc::new(Mutex::new(None)),
            timer: None,
        }
    }

    /// Timer present and its task still running.
    pub fn is_connected(&self) -> bool {
        self.timer.as_ref().is_some_and(|timer| !timer.is_finished())
    }

    pub fn has_handler(&self) -> bool {
        lock_unpoisoned(&self.handler).is_some()
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
            tracing::debug!("Connection {} timer cancelled", self.id);
        }
    }
}

impl ChatConnection for SimulatedConnection {
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    fn connect(&mut self) {
        tracing::info!(
            "Connecting to \"{}\" room at {}...",
            self.config.room_id,
            self.config.server_url
        );

        self.cancel_timer();

        let first_tick = Instant::now() + self.tick_interval;
        self.timer = Some(tokio::spawn(run_ticks(
            self.id,
            first_tick,
            self.tick_interval,
            Arc::clone(&self.source),
            Arc::clone(&self.handler),
        )));
    }

    fn disconnect(&mut self) {
        self.cancel_timer();
        lock_unpoisoned(&self.handler).take();

        tracing::info!(
            "Disconnected from \"{}\" room at {}",
            self.config.room_id,
            self.config.server_url
        );
    }

    fn on(&mut self, event: &str, handler: MessageHandler) -> Result<(), ConnectionError> {
        let mut slot = lock_unpoisoned(&self.handler);
        if slot.is_some() {
            return Err(ConnectionError::DuplicateHandler);
        }
        if event != MESSAGE_EVENT {
            return Err(ConnectionError::UnsupportedEvent(event.to_string()));
        }

        *slot = Some(handler);
        tracing::debug!("Connection {} handler registered", self.id);
        Ok(())
    }
}

impl Drop for SimulatedConnection {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

/// Timer loop: one message per tick while a handler is registered.
async fn run_ticks(
    id: ConnectionId,
    first_tick: Instant,
    period: Duration,
    source: Arc<dyn MessageSource>,
    handler: HandlerSlot,
) {
    let mut ticker = time::interval_at(first_tick, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        // Clone out of the slot so the handler runs without the lock held.
        let current = lock_unpoisoned(&handler).clone();
        match current {
            Some(handler) => {
                let message = source.next_message();
                tracing::debug!("Connection {} delivering '{}'", id, message);
                handler(&message);
            }
            None => {
                tracing::debug!("Connection {} has no handler, dropping tick", id);
            }
        }
    }
}

/// Factory for [`SimulatedConnection`]s sharing one tick interval and message source.
#[derive(Clone)]
pub struct SimulatedConnectionFactory {
    tick_interval: Duration,
    source: Arc<dyn MessageSource>,
}

impl SimulatedConnectionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    pub fn with_message_source(mut self, source: Arc<dyn MessageSource>) -> Self {
        self.source = source;
        self
    }

    /// Build a concrete connection without boxing it.
    pub fn build(&self, config: ConnectionConfig) -> SimulatedConnection {
        SimulatedConnection::new(config, self.tick_interval, Arc::clone(&self.source))
    }
}

impl Default for SimulatedConnectionFactory {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            source: Arc::new(CannedMessages::default()),
        }
    }
}

impl ConnectionFactory for SimulatedConnectionFactory {
    fn create(&self, config: &ConnectionConfig) -> Box<dyn ChatConnection> {
        Box::new(self.build(config.clone()))
    }
}

/// Create a connection with the default interval and the "hey"/"lol" message set.
pub fn create_connection(config: ConnectionConfig) -> SimulatedConnection {
    SimulatedConnectionFactory::default().build(config)
}
