//! # hub-session
//!
//! One logical client, any number of attached transports.
//!
//! A [`ClientSession`] keeps the authoritative state for a client, broadcasts
//! every change to its attached connections, buffers outbound messages while
//! nothing is attached and tracks which connection is the main one.
//! [`SessionRegistry`] owns the sessions and routes transport connects and
//! disconnects to them.

pub mod connection;
pub mod merge;
pub mod message;
pub mod registry;
pub mod session;

pub use connection::{Connection, ConnectionId};
pub use merge::deep_merge;
pub use message::{ClientMessage, MessageType, SessionState};
pub use registry::{RegistryError, SessionConfig, SessionRegistry, SharedSession};
pub use session::{ClientSession, DEFAULT_MAX_CONNECTIONS};
