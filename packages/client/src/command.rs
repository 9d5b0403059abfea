//! Parsing of the lines typed at the prompt.

use thiserror::Error;

/// A user command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/url <server_url>`: edit the server URL (reconnects)
    SetServerUrl(String),
    /// `/room <room_id>`: switch to another room (reconnects)
    SetRoom(String),
    /// `/prefix <text>`: change the notification prefix (no reconnect)
    SetPrefix(String),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("'{0}' requires an argument")]
    MissingArgument(&'static str),

    #[error("Unknown command '{0}', type /help for the list of commands")]
    Unknown(String),
}

pub const HELP: &str = "\
Commands:
  /url <server_url>   change the server URL
  /room <room_id>     switch to another room
  /prefix <text>      change the notification prefix
  /help               show this help
  /quit               leave the room";

impl Command {
    /// Parse one input line.
    ///
    /// # Examples
    ///
    /// ```
    /// use chatroom_client::command::Command;
    ///
    /// assert_eq!(
    ///     Command::parse("/room travel"),
    ///     Ok(Command::SetRoom("travel".to_string()))
    /// );
    /// assert!(Command::parse("/room").is_err());
    /// ```
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let (name, argument) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        let require = |name: &'static str| {
            if argument.is_empty() {
                Err(CommandError::MissingArgument(name))
            } else {
                Ok(argument.to_string())
            }
        };

        match name {
            "/url" => require("/url").map(Command::SetServerUrl),
            "/room" => require("/room").map(Command::SetRoom),
            "/prefix" => require("/prefix").map(Command::SetPrefix),
            "/help" => Ok(Command::Help),
            "/quit" | "/exit" => Ok(Command::Quit),
            _ => Err(CommandError::Unknown(line.to_string())),
        }
    }
}
