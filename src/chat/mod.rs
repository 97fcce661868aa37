//! Streaming chat client: the transcript, the decoder for the event
//! stream and the controller that ties them to a backend.
pub mod controller;
pub mod decoder;
pub mod events;
pub mod models;
pub mod sessions;
pub mod state;
pub mod transport;
pub mod turn;

pub use controller::{ChatController, ChatControllerBuilder, TurnOutcome};
pub use events::StreamEvent;
pub use models::{Message, Role, Transcript};
pub use sessions::{Session, SessionId, SessionList};
pub use state::ChatUpdate;
pub use transport::{ByteStream, HttpTransport, Transport};
