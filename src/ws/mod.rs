//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` streams pod events to clients that
//! subscribed to them, and answers a few read-only commands
//! (`get_pod`, `get_item`, `list_subscriptions`).

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
