//! 購読ライフサイクル: ビューのパラメータに Connection の寿命を結びつける
//!
//! ## 責務
//!
//! - `(server_url, room_id)` が変わったときだけ Connection を作り直す
//! - 作り直す前に、必ず古い Connection を disconnect する（同時に 2 つ存在させない）
//! - メッセージは常に「最新の」コールバックへ転送する（コールバックが変わっても再接続しない）
//!
//! ## 設計ノート
//!
//! Connection に登録するハンドラは、`latest_callback` を読むだけの固定のディスパッチャです。
//! `bind` のたびに `latest_callback` の中身だけを差し替えます。
//!
//! ```text
//! timer tick ──> dispatcher ──> latest_callback (bind ごとに更新) ──> on_receive_message
//! ```
//!
//! 再接続やリトライは行いません。`on` が失敗した場合はその Connection を disconnect して
//! エラーを呼び出し元に返します。

use std::sync::{Arc, Mutex};

use crate::{
    connection::{
        ChatConnection, ConnectionFactory, MESSAGE_EVENT, MessageHandler, lock_unpoisoned,
    },
    domain::ConnectionConfig,
    error::ConnectionError,
};

/// ビュー側が受け取るメッセージのコールバック
pub type MessageCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// 1 回の評価（レンダリング）で渡されるパラメータ
#[derive(Clone)]
pub struct ChatRoomProps {
    pub config: ConnectionConfig,
    pub on_receive_message: MessageCallback,
}

impl ChatRoomProps {
    pub fn new<F>(config: ConnectionConfig, on_receive_message: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        Self {
            config,
            on_receive_message: Arc::new(on_receive_message),
        }
    }
}

/// 現在バインドされている Connection
struct BoundConnection {
    config: ConnectionConfig,
    connection: Box<dyn ChatConnection>,
}

/// Connection の生成・破棄をビューのライフサイクルに合わせて管理する
///
/// ## 使用例
///
/// ```ignore
/// let mut binding = ChatRoomBinding::new(Arc::new(SimulatedConnectionFactory::default()));
///
/// // 初回: 接続される
/// binding.bind(ChatRoomProps::new(config.clone(), |msg| println!("{msg}")))?;
/// // 同じ config: 再接続せず、コールバックだけ差し替わる
/// binding.bind(ChatRoomProps::new(config, |msg| println!("New message: {msg}")))?;
///
/// binding.unbind();
/// ```
pub struct ChatRoomBinding {
    factory: Arc<dyn ConnectionFactory>,
    latest_callback: Arc<Mutex<MessageCallback>>,
    bound: Option<BoundConnection>,
}

impl ChatRoomBinding {
    pub fn new(factory: Arc<dyn ConnectionFactory>) -> Self {
        let noop: MessageCallback = Arc::new(|_: &str| {});
        Self {
            factory,
            latest_callback: Arc::new(Mutex::new(noop)),
            bound: None,
        }
    }

    /// パラメータを評価する（アクティブ化 / 再評価）
    ///
    /// # Returns
    ///
    /// * `Ok(())` - バインド成功（config が同じ場合はコールバックの差し替えのみ）
    /// * `Err(ConnectionError)` - 新しい Connection へのハンドラ登録に失敗
    pub fn bind(&mut self, props: ChatRoomProps) -> Result<(), ConnectionError> {
        let ChatRoomProps {
            config,
            on_receive_message,
        } = props;

        // 1. コールバックは毎回最新に差し替える
        *lock_unpoisoned(&self.latest_callback) = on_receive_message;

        // 2. 同じ (server_url, room_id) なら何もしない
        if self.bound_config() == Some(&config) {
            return Ok(());
        }

        // 3. 古い Connection を先に破棄する
        self.unbind();

        // 4. 新しい Connection を作って接続する
        let mut connection = self.factory.create(&config);
        connection.connect();
        if let Err(e) = connection.on(MESSAGE_EVENT, self.dispatcher()) {
            tracing::warn!("Failed to subscribe to \"{}\" room: {}", config.room_id, e);
            connection.disconnect();
            return Err(e);
        }

        self.bound = Some(BoundConnection { config, connection });
        Ok(())
    }

    /// 非アクティブ化: バインド中の Connection を disconnect する（何度呼んでもよい）
    pub fn unbind(&mut self) {
        if let Some(mut bound) = self.bound.take() {
            bound.connection.disconnect();
        }
    }

    pub fn bound_config(&self) -> Option<&ConnectionConfig> {
        self.bound.as_ref().map(|bound| &bound.config)
    }

    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    /// `latest_callback` に転送するだけの固定ハンドラ
    fn dispatcher(&self) -> MessageHandler {
        let latest_callback = Arc::clone(&self.latest_callback);
        Arc::new(move |message: &str| {
            let callback = lock_unpoisoned(&latest_callback).clone();
            callback(message);
        })
    }
}

impl Drop for ChatRoomBinding {
    fn drop(&mut self) {
        self.unbind();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{MockChatConnection, MockConnectionFactory};

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - bind / unbind による Connection の生成・破棄の順序
    // - コールバック差し替え時に再接続しないこと
    //
    // 【なぜこのテストが必要か】
    // - 古い Connection を破棄してから新しい Connection を作ることを保証する
    // - ディスパッチャが常に最新のコールバックを呼ぶことを保証する
    //
    // Mock の呼び出しを共有ログに記録し、順序を検証する
    // ========================================

    type EventLog = Arc<Mutex<Vec<String>>>;
    type CapturedHandler = Arc<Mutex<Option<MessageHandler>>>;

    fn config(room_id: &str) -> ConnectionConfig {
        ConnectionConfig::parse("https://localhost:1234", room_id).unwrap()
    }

    fn recording_connection(
        room_id: &str,
        log: &EventLog,
        captured: &CapturedHandler,
    ) -> MockChatConnection {
        let mut connection = MockChatConnection::new();

        let (room, events) = (room_id.to_string(), Arc::clone(log));
        connection.expect_connect().returning(move || {
            events.lock().unwrap().push(format!("connect {}", room));
        });

        let (room, events) = (room_id.to_string(), Arc::clone(log));
        connection.expect_disconnect().returning(move || {
            events.lock().unwrap().push(format!("disconnect {}", room));
        });

        let (room, events, slot) = (room_id.to_string(), Arc::clone(log), Arc::clone(captured));
        connection.expect_on().returning(move |event, handler| {
            events.lock().unwrap().push(format!("on {} {}", room, event));
            *slot.lock().unwrap() = Some(handler);
            Ok(())
        });

        connection
    }

    /// Factory that hands out the given connections in order and logs each create.
    fn recording_factory(
        connections: Vec<MockChatConnection>,
        log: &EventLog,
    ) -> MockConnectionFactory {
        let mut factory = MockConnectionFactory::new();
        let remaining = Mutex::new(connections.into_iter().rev().collect::<Vec<_>>());
        let events = Arc::clone(log);
        factory.expect_create().returning(move |config| {
            events
                .lock()
                .unwrap()
                .push(format!("create {}", config.room_id));
            let connection = remaining
                .lock()
                .unwrap()
                .pop()
                .expect("unexpected extra create");
            Box::new(connection) as Box<dyn ChatConnection>
        });
        factory
    }

    fn recorder() -> (MessageCallback, Arc<Mutex<Vec<String>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        let callback: MessageCallback = Arc::new(move |message: &str| {
            sink.lock().unwrap().push(message.to_string());
        });
        (callback, received)
    }

    fn props(room_id: &str, callback: &MessageCallback) -> ChatRoomProps {
        ChatRoomProps {
            config: config(room_id),
            on_receive_message: Arc::clone(callback),
        }
    }

    #[test]
    fn test_first_bind_creates_connects_and_subscribes() {
        // テスト項目: 初回の bind で create → connect → on("message") の順に呼ばれる
        // given (前提条件):
        let log = EventLog::default();
        let captured = CapturedHandler::default();
        let connection = recording_connection("general", &log, &captured);
        let factory = recording_factory(vec![connection], &log);
        let mut binding = ChatRoomBinding::new(Arc::new(factory));
        let (callback, _received) = recorder();

        // when (操作):
        let result = binding.bind(props("general", &callback));

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(binding.bound_config(), Some(&config("general")));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["create general", "connect general", "on general message"]
        );
    }

    #[test]
    fn test_rebind_with_same_config_keeps_connection_and_uses_new_callback() {
        // テスト項目: 同じ config で別のコールバックを渡しても再接続せず、新しいコールバックに配信される
        // given (前提条件):
        let log = EventLog::default();
        let captured = CapturedHandler::default();
        let connection = recording_connection("general", &log, &captured);
        let factory = recording_factory(vec![connection], &log);
        let mut binding = ChatRoomBinding::new(Arc::new(factory));
        let (first, first_received) = recorder();
        let (second, second_received) = recorder();
        binding.bind(props("general", &first)).unwrap();

        // when (操作):
        binding.bind(props("general", &second)).unwrap();
        let dispatcher = captured.lock().unwrap().clone().unwrap();
        dispatcher("hey");

        // then (期待する結果):
        assert_eq!(log.lock().unwrap().len(), 3);
        assert!(first_received.lock().unwrap().is_empty());
        assert_eq!(*second_received.lock().unwrap(), vec!["hey"]);
    }

    #[test]
    fn test_room_change_disconnects_old_before_creating_new() {
        // テスト項目: room_id が変わると古い Connection を disconnect してから新しい Connection を作る
        // given (前提条件):
        let log = EventLog::default();
        let captured = CapturedHandler::default();
        let general = recording_connection("general", &log, &captured);
        let travel = recording_connection("travel", &log, &captured);
        let factory = recording_factory(vec![general, travel], &log);
        let mut binding = ChatRoomBinding::new(Arc::new(factory));
        let (callback, _received) = recorder();
        binding.bind(props("general", &callback)).unwrap();

        // when (操作):
        binding.bind(props("travel", &callback)).unwrap();

        // then (期待する結果):
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "create general",
                "connect general",
                "on general message",
                "disconnect general",
                "create travel",
                "connect travel",
                "on travel message",
            ]
        );
        assert_eq!(binding.bound_config(), Some(&config("travel")));
    }

    #[test]
    fn test_server_url_change_rebuilds_connection() {
        // テスト項目: server_url だけが変わった場合も Connection を作り直す
        // given (前提条件):
        let log = EventLog::default();
        let captured = CapturedHandler::default();
        let first = recording_connection("general", &log, &captured);
        let second = recording_connection("general", &log, &captured);
        let factory = recording_factory(vec![first, second], &log);
        let mut binding = ChatRoomBinding::new(Arc::new(factory));
        let (callback, _received) = recorder();
        binding.bind(props("general", &callback)).unwrap();

        // when (操作):
        let moved = ChatRoomProps {
            config: ConnectionConfig::parse("https://localhost:5678", "general").unwrap(),
            on_receive_message: Arc::clone(&callback),
        };
        binding.bind(moved).unwrap();

        // then (期待する結果):
        let log = log.lock().unwrap();
        assert_eq!(log.len(), 7);
        assert_eq!(log[3], "disconnect general");
        assert_eq!(log[4], "create general");
    }

    #[test]
    fn test_unbind_disconnects_once() {
        // テスト項目: unbind は Connection を 1 回だけ disconnect し、何度呼んでもよい
        // given (前提条件):
        let log = EventLog::default();
        let captured = CapturedHandler::default();
        let connection = recording_connection("general", &log, &captured);
        let factory = recording_factory(vec![connection], &log);
        let mut binding = ChatRoomBinding::new(Arc::new(factory));
        let (callback, _received) = recorder();
        binding.bind(props("general", &callback)).unwrap();

        // when (操作):
        binding.unbind();
        binding.unbind();

        // then (期待する結果):
        assert!(!binding.is_bound());
        let disconnects = log
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.starts_with("disconnect"))
            .count();
        assert_eq!(disconnects, 1);
    }

    #[test]
    fn test_drop_unbinds() {
        // テスト項目: ChatRoomBinding を drop すると Connection が disconnect される
        // given (前提条件):
        let log = EventLog::default();
        let captured = CapturedHandler::default();
        let connection = recording_connection("general", &log, &captured);
        let factory = recording_factory(vec![connection], &log);
        let mut binding = ChatRoomBinding::new(Arc::new(factory));
        let (callback, _received) = recorder();
        binding.bind(props("general", &callback)).unwrap();

        // when (操作):
        drop(binding);

        // then (期待する結果):
        assert_eq!(log.lock().unwrap().last().unwrap(), "disconnect general");
    }

    #[test]
    fn test_subscribe_failure_disconnects_and_propagates() {
        // テスト項目: on が失敗した場合、その Connection を disconnect してエラーを返す
        // given (前提条件):
        let mut connection = MockChatConnection::new();
        connection.expect_connect().times(1).return_const(());
        connection
            .expect_on()
            .times(1)
            .returning(|_, _| Err(ConnectionError::DuplicateHandler));
        connection.expect_disconnect().times(1).return_const(());
        let mut factory = MockConnectionFactory::new();
        factory
            .expect_create()
            .times(1)
            .return_once(move |_| Box::new(connection) as Box<dyn ChatConnection>);
        let mut binding = ChatRoomBinding::new(Arc::new(factory));
        let (callback, _received) = recorder();

        // when (操作):
        let result = binding.bind(props("general", &callback));

        // then (期待する結果):
        assert_eq!(result, Err(ConnectionError::DuplicateHandler));
        assert!(!binding.is_bound());
    }
}
