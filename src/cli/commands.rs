//! Slash commands understood by the interactive chat.
use anyhow::{Result, anyhow, bail};

pub const HELP: &str = "\
Commands:
  /new                 start a new chat
  /sessions            list chats
  /switch N            switch to chat N
  /rename N TITLE      rename chat N
  /delete N            delete chat N
  /clear               clear the current chat
  /quit                exit";

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    New,
    Sessions,
    /// Zero based position in the session list
    Switch(usize),
    Rename(usize, String),
    Delete(usize),
    Clear,
    Help,
    Quit,
}

fn parse_index(arg: Option<&str>, usage: &str) -> Result<usize> {
    let arg = arg.ok_or_else(|| anyhow!("Usage: {}", usage))?;
    let n: usize = arg
        .parse()
        .map_err(|_| anyhow!("Not a chat number: {}", arg))?;
    if n == 0 {
        bail!("Chats are numbered from 1");
    }
    Ok(n - 1)
}

/// Returns `None` for anything that should be sent as a message.
pub fn parse_command(line: &str) -> Option<Result<Command>> {
    let line = line.trim();
    let rest = line.strip_prefix('/')?;
    let mut parts = rest.splitn(3, char::is_whitespace);
    let name = parts.next().unwrap_or_default();

    let command = match name {
        "new" => Ok(Command::New),
        "sessions" | "ls" => Ok(Command::Sessions),
        "switch" => parse_index(parts.next(), "/switch N").map(Command::Switch),
        "delete" => parse_index(parts.next(), "/delete N").map(Command::Delete),
        "rename" => parse_index(parts.next(), "/rename N TITLE").and_then(|n| {
            match parts.next().map(str::trim).filter(|t| !t.is_empty()) {
                Some(title) => Ok(Command::Rename(n, title.to_string())),
                None => Err(anyhow!("Usage: /rename N TITLE")),
            }
        }),
        "clear" => Ok(Command::Clear),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(anyhow!("Unknown command /{}, try /help", other)),
    };
    Some(command)
}
