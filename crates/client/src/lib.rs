//! Client side of collaborative plain-text editing.
//!
//! [`SyncClient`] is the protocol state machine: it keeps at most one local
//! operation in flight, buffers later edits and transforms remote operations
//! past pending local work. [`EditorClient`] wires it to a text widget
//! ([`EditorAdapter`]), a transport ([`ServerAdapter`]), the undo history and
//! the roster of remote participants. [`ClientActor`] runs an
//! [`EditorClient`] on its own task, and [`connect`] joins a document hosted
//! by a TCP server.

#![warn(missing_docs)]

/// Task owning an [`EditorClient`] and serializing its events.
pub mod actor;
/// Widget and transport capabilities.
pub mod adapter;
/// Display colours for remote participants.
pub mod color;
/// TOML configuration.
pub mod config;
/// The orchestrator tying widget, history and protocol together.
pub mod editor_client;
/// Error types.
pub mod error;
/// In-memory widget.
pub mod headless;
/// TCP connection to a server.
pub mod net;
/// Remote participants.
pub mod roster;
/// Protocol state machine.
pub mod sync;
/// Channel-backed transport.
pub mod transport;

pub use actor::{ClientActor, ClientCmd, ClientHandle, ClientSnapshot};
pub use adapter::{EditorAdapter, ServerAdapter};
pub use color::ParticipantColor;
pub use config::{ClientConfig, ColorConfig};
pub use editor_client::EditorClient;
pub use error::{ClientError, ConfigError, Result};
pub use headless::HeadlessEditor;
pub use net::{Connection, connect};
pub use roster::{RemoteParticipant, Roster};
pub use sync::{Outgoing, SyncClient, SyncState};
pub use transport::ChannelTransport;
