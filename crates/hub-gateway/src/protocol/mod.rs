//! Gateway protocol definitions
//!
//! The message envelope lives in `hub-session`; this module adds the
//! gateway-specific close codes.

mod close_codes;

pub use close_codes::CloseCode;
pub use hub_session::{ClientMessage, MessageType};
