//! Autorelease Bot - A GitHub bot that keeps release pull requests and
//! releases in step with repository events.
//!
//! This library provides the webhook parsing, configuration resolution and
//! release orchestration for the bot; the binary wires them to an HTTP server.

pub mod config;
pub mod effects;
pub mod github;
pub mod release;
pub mod server;
pub mod types;
pub mod webhooks;

#[cfg(test)]
pub mod test_utils;
