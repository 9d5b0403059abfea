//! Domain Model: 接続設定の値オブジェクト
//!
//! ## 概要
//!
//! 接続先を表す `ServerUrl` と `RoomId`、その組である `ConnectionConfig` を定義します。
//! バリデーションは「空文字列でないこと」のみで、URL の形式はチェックしません。
//!
//! `ConnectionConfig` の等価性（`server_url`, `room_id` の組）は、
//! `ChatRoomBinding` が再接続の要否を判定するための同一性として使われます。

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// 接続先サーバーの URL
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServerUrl(String);

impl ServerUrl {
    /// 新しい ServerUrl を作成（空文字列はエラー）
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::EmptyServerUrl);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ServerUrl {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ServerUrl> for String {
    fn from(value: ServerUrl) -> Self {
        value.0
    }
}

impl fmt::Display for ServerUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// チャットルームの識別子（不透明な文字列）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    /// 新しい RoomId を作成（空文字列はエラー）
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::EmptyRoomId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoomId> for String {
    fn from(value: RoomId) -> Self {
        value.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 接続設定
///
/// 一度作成したら変更しない。変更したい場合は新しい値を作る。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub server_url: ServerUrl,
    pub room_id: RoomId,
}

impl ConnectionConfig {
    pub fn new(server_url: ServerUrl, room_id: RoomId) -> Self {
        Self { server_url, room_id }
    }

    /// 文字列から ConnectionConfig を作成
    ///
    /// # Examples
    ///
    /// ```
    /// use chatroom_connection::ConnectionConfig;
    ///
    /// let config = ConnectionConfig::parse("https://localhost:1234", "general").unwrap();
    /// assert_eq!(config.room_id.as_str(), "general");
    /// assert!(ConnectionConfig::parse("https://localhost:1234", "").is_err());
    /// ```
    pub fn parse(server_url: &str, room_id: &str) -> Result<Self, ValidationError> {
        Ok(Self::new(
            ServerUrl::new(server_url.to_string())?,
            RoomId::new(room_id.to_string())?,
        ))
    }
}

/// Connection インスタンスの識別子（ログ用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
