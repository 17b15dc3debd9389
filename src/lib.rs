//! # pod-tracker
//!
//! REST API and WebSocket server for pods: collections of items that share
//! a schema of typed columns defined at runtime.
//!
//! Each item holds two tiers of values per column: a default and an
//! optional user override. The effective value is the override if present,
//! else the default, else `Null`. Activities are recorded as immutable
//! snapshots of the observed columns in a per-pod log kept sorted most
//! recent first, from which per item-column trends are projected.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── PodService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── PodRegistry ── PodState (schema, items, activity log)
//!     │
//!     └── PodStore (persistence/): MemoryStore | PostgreSQL
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;
