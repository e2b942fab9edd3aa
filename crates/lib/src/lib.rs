//! Slack relay core library — raw line-protocol listener, HTTP relay and monit
//! notifier, sharing the webhook payload types and the gateway client.

pub mod config;
pub mod gateway;
pub mod monit;
pub mod raw;
pub mod relay;
pub mod slack;
