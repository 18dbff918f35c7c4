//! Webhook handling.
//!
//! This module provides:
//! - Signature verification for webhook payloads (HMAC-SHA256)
//! - Parsing of raw payloads into typed [`ReleaseEvent`]s
//! - The event handlers that drive release orchestration

pub mod events;
pub mod handlers;
pub mod parser;
pub mod signature;

pub use events::{EventKind, ReleaseEvent};
pub use handlers::{HandlerError, HandlerOutcome, handle_event};
pub use parser::{ParseError, parse_webhook};
pub use signature::{SignatureError, WebhookSecret, parse_signature_header};
