//! Terminal rendering of chat updates.
use std::io::Write;

use crate::chat::{ChatUpdate, Message, Role};

/// Prints a streamed reply as it grows. Only the part of the assistant
/// message that hasn't been printed yet is written on each update.
pub struct Renderer<W: Write> {
    out: W,
    printed: String,
    mid_line: bool,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            printed: String::new(),
            mid_line: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, text: &str) {
        // Broken pipes etc. aren't worth crashing the chat over
        let _ = write!(self.out, "{}", text);
        let _ = self.out.flush();
        if !text.is_empty() {
            self.mid_line = !text.ends_with('\n');
        }
    }

    fn end_line(&mut self) {
        if self.mid_line {
            self.write("\n");
        }
    }

    fn print_message(&mut self, msg: &Message) {
        self.end_line();
        match msg.role {
            Role::User => self.write(&format!(">>> {}\n", msg.content)),
            Role::Assistant => self.write(&format!("{}\n", msg.content)),
            Role::System => self.write(&format!("[{}]\n", msg.content)),
        }
    }

    pub fn render(&mut self, update: ChatUpdate) {
        match update {
            // Already on screen, the user typed it
            ChatUpdate::MessageAppended(Message {
                role: Role::User, ..
            }) => {}
            ChatUpdate::MessageAppended(Message {
                role: Role::Assistant,
                content,
            }) => {
                self.end_line();
                self.write(&content);
                self.printed = content;
            }
            ChatUpdate::MessageAppended(msg) => {
                self.print_message(&msg);
                self.printed.clear();
            }
            ChatUpdate::LastMessageUpdated(content) => {
                match content.strip_prefix(self.printed.as_str()) {
                    Some(rest) => {
                        let rest = rest.to_string();
                        self.write(&rest);
                    }
                    None => {
                        self.end_line();
                        self.write(&content);
                    }
                }
                self.printed = content;
            }
            ChatUpdate::TranscriptReplaced(messages) => {
                self.end_line();
                self.printed.clear();
                for msg in messages.iter() {
                    self.print_message(msg);
                }
            }
            ChatUpdate::Status(status) => {
                if !status.is_empty() && !self.mid_line {
                    self.write(&format!("... {}\n", status));
                }
            }
            ChatUpdate::Loading(_) => {}
        }
    }

    /// Close off the current reply once a turn is over.
    pub fn finish(&mut self) {
        self.end_line();
        self.printed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_all(updates: Vec<ChatUpdate>) -> String {
        let mut renderer = Renderer::new(Vec::new());
        for update in updates {
            renderer.render(update);
        }
        renderer.finish();
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn test_streams_reply_incrementally() {
        let out = render_all(vec![
            ChatUpdate::MessageAppended(Message::new(Role::User, "Hi")),
            ChatUpdate::Loading(true),
            ChatUpdate::Status("Initializing...".to_string()),
            ChatUpdate::MessageAppended(Message::new(Role::Assistant, "He")),
            ChatUpdate::Status(String::new()),
            ChatUpdate::LastMessageUpdated("Hello".to_string()),
            ChatUpdate::LastMessageUpdated("Hello!".to_string()),
            ChatUpdate::Loading(false),
        ]);
        assert_eq!(out, "... Initializing...\nHello!\n");
    }

    #[test]
    fn test_status_is_not_printed_mid_reply() {
        let out = render_all(vec![
            ChatUpdate::MessageAppended(Message::new(Role::Assistant, "Hel")),
            ChatUpdate::Status("Writing...".to_string()),
            ChatUpdate::LastMessageUpdated("Hello".to_string()),
        ]);
        assert_eq!(out, "Hello\n");
    }

    #[test]
    fn test_stop_notice_goes_on_its_own_line() {
        let out = render_all(vec![
            ChatUpdate::MessageAppended(Message::new(Role::Assistant, "Hel")),
            ChatUpdate::MessageAppended(Message::new(Role::System, "Generation stopped")),
        ]);
        assert_eq!(out, "Hel\n[Generation stopped]\n");
    }

    #[test]
    fn test_loaded_session_is_printed() {
        let out = render_all(vec![ChatUpdate::TranscriptReplaced(vec![
            Message::new(Role::User, "Hi"),
            Message::new(Role::Assistant, "Hello"),
        ])]);
        assert_eq!(out, ">>> Hi\nHello\n");
    }
}
