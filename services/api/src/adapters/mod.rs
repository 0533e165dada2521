pub mod db;
pub mod insight_llm;
pub mod otp_delivery;

pub use db::DbAdapter;
pub use insight_llm::OpenAiInsightAdapter;
pub use otp_delivery::TracingOtpDelivery;
