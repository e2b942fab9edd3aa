//! Chat gateway: the HTTP endpoint assembled messages are delivered to.
//!
//! One best-effort POST per message; no retries. Success is HTTP 200 and the
//! response body is handed back verbatim.

mod client;

pub use client::{Deliver, GatewayClient, GatewayError};
