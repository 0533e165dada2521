//! services/api/src/adapters/otp_delivery.rs
//!
//! OTP delivery that only writes to the log. Swap in a mail adapter for production.

use async_trait::async_trait;
use tracing::{debug, info};
use vivamate_core::ports::{OtpDeliveryService, PortResult};

/// Logs that a passcode was issued. The code itself is only visible at debug level.
#[derive(Clone, Default)]
pub struct TracingOtpDelivery;

#[async_trait]
impl OtpDeliveryService for TracingOtpDelivery {
    async fn deliver_otp(&self, email: &str, code: &str) -> PortResult<()> {
        info!(email = %email, "One-time passcode issued");
        debug!(email = %email, code = %code, "One-time passcode value");
        Ok(())
    }
}
