//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::PodService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Pod service for all business logic.
    pub pod_service: Arc<PodService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// Wraps a service, sharing its event bus with the WebSocket layer.
    #[must_use]
    pub fn new(pod_service: Arc<PodService>) -> Self {
        let event_bus = pod_service.event_bus().clone();
        Self {
            pod_service,
            event_bus,
        }
    }
}
