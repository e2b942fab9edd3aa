//! Raw line-protocol listener.
//!
//! Clients connect over TCP, write keyword directives (CHANNEL, LEVEL, FIELD, TEXT,
//! PRETEXT) one per line and half-close. The lines are assembled into one webhook
//! message, posted to the chat gateway, and the gateway's answer (or a `Failed:` line)
//! is written back before the connection is closed.

mod assemble;
mod listener;
mod parser;

pub use assemble::{assemble, EMPTY_TEXT};
pub use listener::{correlation_id, run_listener, run_session, serve};
pub use parser::{parse_lines, CaptureTarget, Draft, LineParser};
