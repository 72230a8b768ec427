use std::sync::Arc;

use milkline_core::reconciliation::ApprovalServiceTrait;

use crate::events::EventBus;

#[derive(Clone)]
pub struct AppState {
    pub approval_service: Arc<dyn ApprovalServiceTrait>,
    pub event_bus: EventBus,
}
