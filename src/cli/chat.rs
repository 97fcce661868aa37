use std::io::Stdout;

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;

use super::commands::{Command, HELP, parse_command};
use super::render::Renderer;
use crate::chat::{ChatController, ChatUpdate, HttpTransport, SessionList, TurnOutcome};
use crate::core::AppConfig;

struct ChatRepl {
    chat: ChatController,
    updates: mpsc::UnboundedReceiver<ChatUpdate>,
    renderer: Renderer<Stdout>,
    sessions: SessionList,
}

impl ChatRepl {
    fn drain_updates(&mut self) {
        while let Ok(update) = self.updates.try_recv() {
            self.renderer.render(update);
        }
    }

    /// Send a message and render the reply while it streams in. Ctrl-C
    /// stops the generation instead of exiting.
    async fn send(&mut self, text: &str) -> TurnOutcome {
        let chat = self.chat.clone();
        let turn = chat.send_message(text);
        tokio::pin!(turn);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        let mut stopped = false;

        let outcome = loop {
            tokio::select! {
                outcome = &mut turn => break outcome,
                Some(update) = self.updates.recv() => self.renderer.render(update),
                _ = &mut ctrl_c, if !stopped => {
                    stopped = true;
                    self.chat.stop_generation();
                }
            }
        };

        self.drain_updates();
        self.renderer.finish();
        outcome
    }

    fn list_sessions(&self) {
        let active = self.sessions.active_id();
        for (i, session) in self.sessions.sessions().iter().enumerate() {
            let marker = if session.id == active { "*" } else { " " };
            println!(
                "{} {:>2}. {} ({} messages, {})",
                marker,
                i + 1,
                session.title,
                session.messages.len(),
                session.created_at.format("%H:%M")
            );
        }
    }

    /// Returns `false` when the user asked to quit.
    fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::New => {
                self.sessions.create();
                self.chat.clear_chat();
            }
            Command::Sessions => self.list_sessions(),
            Command::Switch(index) => match self.sessions.nth(index).map(|s| s.id) {
                Some(id) => {
                    if let Some(history) = self.sessions.select(id) {
                        self.chat.load_session(history);
                    }
                }
                None => println!("No chat number {}", index + 1),
            },
            Command::Rename(index, title) => match self.sessions.nth(index).map(|s| s.id) {
                Some(id) => {
                    self.sessions.rename(id, &title);
                }
                None => println!("No chat number {}", index + 1),
            },
            Command::Delete(index) => match self.sessions.nth(index).map(|s| s.id) {
                Some(id) => {
                    if let Some(history) = self.sessions.delete(id) {
                        self.chat.load_session(history);
                    }
                }
                None => println!("No chat number {}", index + 1),
            },
            Command::Clear => self.chat.clear_chat(),
            Command::Help => println!("{}", HELP),
            Command::Quit => return false,
        }
        self.drain_updates();
        self.renderer.finish();
        true
    }
}

pub async fn run(config: AppConfig) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    let (tx, rx) = mpsc::unbounded_channel();
    let transport = HttpTransport::new(&config.api_url, config.request_timeout);
    println!("Chatting with {} (/help for commands)", transport.url());
    let chat = ChatController::builder(transport)
        .notices(config.notices.clone())
        .updates(tx)
        .build();

    let mut repl = ChatRepl {
        chat,
        updates: rx,
        renderer: Renderer::new(std::io::stdout()),
        sessions: SessionList::new(),
    };

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                match parse_command(&line) {
                    Some(Ok(command)) => {
                        if !repl.handle_command(command) {
                            break;
                        }
                    }
                    Some(Err(e)) => println!("{}", e),
                    None => {
                        let outcome = repl.send(&line).await;
                        tracing::debug!("Turn ended: {:?}", outcome);
                    }
                }
                // Keep the session list in step with the transcript
                let messages = repl.chat.messages();
                repl.sessions.sync_active(&messages);
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
