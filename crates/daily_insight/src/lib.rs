//! Client-side logic of the daily-insight card.
//!
//! Rendering is left to the embedding UI; this crate decides which insight to
//! ask for, performs the request and exposes the resulting view state.

pub mod fetch;
pub mod widget;

pub use fetch::{HttpInsightFetcher, InsightClientError, InsightFetcher};
pub use widget::{
    day_of_year, style_for, DailyInsightWidget, InsightStyle, InsightView, LOAD_ERROR_MESSAGE,
};
