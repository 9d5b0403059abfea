//! Chat room execution: readline input, notification output, command handling.

use std::{sync::Arc, time::Duration};

use chatroom_connection::{ConnectionConfig, SimulatedConnectionFactory};
use chatroom_shared::time::SystemClock;
use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

use crate::{
    command::{Command, HELP},
    error::ClientError,
    formatter::OutputFormat,
    ui::{PROMPT, print_above_prompt},
    view::ChatRoomView,
};

/// Settings the chat room is started with
#[derive(Debug, Clone)]
pub struct ChatRoomSettings {
    pub config: ConnectionConfig,
    pub tick_interval: Duration,
    pub format: OutputFormat,
    pub prefix: String,
}

/// What the runner does after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Print(String),
    Quit,
}

/// Apply one command to the view, re-rendering when settings changed
pub fn apply_command(view: &mut ChatRoomView, command: Command) -> Result<Outcome, ClientError> {
    match command {
        Command::SetServerUrl(server_url) => {
            view.set_server_url(&server_url)?;
            Ok(Outcome::Print(view.render()?))
        }
        Command::SetRoom(room_id) => {
            view.set_room_id(&room_id)?;
            Ok(Outcome::Print(view.render()?))
        }
        Command::SetPrefix(prefix) => {
            view.set_prefix(&prefix);
            view.render()?;
            Ok(Outcome::Print(format!("Notification prefix set to '{}'", prefix)))
        }
        Command::Help => Ok(Outcome::Print(HELP.to_string())),
        Command::Quit => Ok(Outcome::Quit),
    }
}

/// Spawn a blocking thread for rustyline (synchronous readline)
fn spawn_readline(input_tx: mpsc::UnboundedSender<String>) {
    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                tracing::error!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line).ok();
                    if input_tx.send(line.to_string()).is_err() {
                        // Channel closed, exit thread
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });
}

/// Run the chat room until `/quit`, Ctrl+C or EOF
pub async fn run_chat_room(settings: ChatRoomSettings) -> Result<(), ClientError> {
    let factory =
        Arc::new(SimulatedConnectionFactory::new().with_tick_interval(settings.tick_interval));
    let (output_tx, mut output_rx) = mpsc::unbounded_channel::<String>();
    let mut view = ChatRoomView::new(
        settings.config,
        settings.prefix,
        settings.format,
        factory,
        Arc::new(SystemClock),
        output_tx,
    );

    let title = view.render()?;
    println!("\n{}\nType /help for commands.\n", title);

    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();
    spawn_readline(input_tx);

    loop {
        tokio::select! {
            Some(notification) = output_rx.recv() => {
                print_above_prompt(&notification);
            }
            line = input_rx.recv() => {
                // None: the readline thread ended (Ctrl+C / Ctrl+D)
                let Some(line) = line else { break };

                match Command::parse(&line)
                    .map_err(ClientError::from)
                    .and_then(|command| apply_command(&mut view, command))
                {
                    Ok(Outcome::Print(text)) => print_above_prompt(&text),
                    Ok(Outcome::Quit) => break,
                    Err(e) => {
                        tracing::warn!("{}", e);
                        print_above_prompt(&e.to_string());
                    }
                }
            }
        }
    }

    view.close();
    tracing::info!("Left the \"{}\" room", view.room_id());
    Ok(())
}
