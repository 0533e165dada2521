//! crates/daily_insight/src/widget.rs
//!
//! The daily-insight card: picks today's insight type, fetches it once and
//! publishes the resulting view state to any number of subscribers.

use chrono::{Datelike, Local, NaiveDate};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use vivamate_core::{Insight, InsightKind};

use crate::fetch::InsightFetcher;

/// Shown for every kind of failure; callers cannot tell them apart.
pub const LOAD_ERROR_MESSAGE: &str = "Failed to load today's insight.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightView {
    Loading,
    Failed(String),
    Ready(Insight),
}

/// Icon and accent color a renderer should use for an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsightStyle {
    pub icon: &'static str,
    pub accent: &'static str,
}

pub fn style_for(kind: InsightKind) -> InsightStyle {
    match kind {
        InsightKind::Tip => InsightStyle {
            icon: "lightbulb",
            accent: "amber",
        },
        InsightKind::Fact => InsightStyle {
            icon: "sparkles",
            accent: "indigo",
        },
    }
}

/// Days elapsed since the start of the year, so January 1st is day 1.
pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal()
}

pub struct DailyInsightWidget<F> {
    fetcher: F,
    view: watch::Sender<InsightView>,
}

impl<F: InsightFetcher> DailyInsightWidget<F> {
    pub fn new(fetcher: F) -> Self {
        let (view, _) = watch::channel(InsightView::Loading);
        Self { fetcher, view }
    }

    pub fn subscribe(&self) -> watch::Receiver<InsightView> {
        self.view.subscribe()
    }

    pub fn view(&self) -> InsightView {
        self.view.borrow().clone()
    }

    /// Mounts the widget using the local calendar date.
    pub async fn mount_today(&self, unmounted: &CancellationToken) -> InsightKind {
        self.mount(Local::now().date_naive(), unmounted).await
    }

    /// Loads the insight for `today` and returns the kind that was requested.
    ///
    /// Exactly one fetch is issued. If `unmounted` fires first the result is
    /// dropped and the view is left as it was.
    pub async fn mount(&self, today: NaiveDate, unmounted: &CancellationToken) -> InsightKind {
        let kind = InsightKind::for_day_of_year(day_of_year(today));
        self.view.send_replace(InsightView::Loading);
        debug!(kind = kind.as_query(), %today, "Fetching daily insight");

        let result = tokio::select! {
            biased;
            _ = unmounted.cancelled() => {
                debug!("Insight widget unmounted before the fetch resolved");
                return kind;
            }
            result = self.fetcher.fetch(kind) => result,
        };

        let next = match result {
            Ok(envelope) if envelope.success => match envelope.insight {
                Some(insight) => {
                    info!(kind = kind.as_query(), title = %insight.title, "Daily insight loaded");
                    InsightView::Ready(insight)
                }
                None => {
                    warn!("Insight response reported success without an insight");
                    InsightView::Failed(LOAD_ERROR_MESSAGE.to_string())
                }
            },
            Ok(envelope) => {
                warn!(message = ?envelope.message, "Insight endpoint reported failure");
                InsightView::Failed(LOAD_ERROR_MESSAGE.to_string())
            }
            Err(e) => {
                warn!("Failed to fetch daily insight: {}", e);
                InsightView::Failed(LOAD_ERROR_MESSAGE.to_string())
            }
        };
        self.view.send_replace(next);
        kind
    }
}
