//! services/api/src/web/state.rs
//!
//! Defines the application state shared by every request handler.

use crate::config::Config;
use std::sync::Arc;
use vivamate_core::ports::{DatabaseService, InsightService, OtpDeliveryService};

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub insight_adapter: Arc<dyn InsightService>,
    pub otp_delivery: Arc<dyn OtpDeliveryService>,
}
