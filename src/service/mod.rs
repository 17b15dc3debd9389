//! Service layer: business logic orchestration.
//!
//! [`PodService`] coordinates pod operations, drives the
//! [`crate::persistence::PodStore`] collaborator and emits events through
//! the [`super::domain::EventBus`].

pub mod pod_service;

pub use pod_service::{LogLimits, LogQuery, NewActivity, PodService, TrendReport};
