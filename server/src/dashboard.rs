//! Dashboard statistics and the mode-selected event section.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::EventListing;
use crate::query::{DateWindow, EventFilter};
use crate::store::{EventStore, StoreResult};

pub const DEFAULT_MODE: &str = "today";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardMode {
    Today,
    All,
    Upcoming,
    Past,
}

impl DashboardMode {
    /// Unknown values fall back to [`DashboardMode::Today`].
    pub fn parse(raw: &str) -> Self {
        match raw {
            "all" => DashboardMode::All,
            "upcoming" => DashboardMode::Upcoming,
            "past" => DashboardMode::Past,
            _ => DashboardMode::Today,
        }
    }

    pub fn section_title(self) -> &'static str {
        match self {
            DashboardMode::Today => "Today's Events",
            DashboardMode::All => "All Events",
            DashboardMode::Upcoming => "Upcoming Events",
            DashboardMode::Past => "Past Events",
        }
    }

    pub fn window(self, today: NaiveDate) -> Option<DateWindow> {
        match self {
            DashboardMode::Today => Some(DateWindow::On(today)),
            DashboardMode::All => None,
            DashboardMode::Upcoming => Some(DateWindow::OnOrAfter(today)),
            DashboardMode::Past => Some(DateWindow::Before(today)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardParams {
    pub mode: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_events: i64,
    pub total_participants_unique: i64,
    pub total_participant_registrations: i64,
    pub upcoming_count: i64,
    pub past_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    #[serde(flatten)]
    pub stats: DashboardStats,
    pub section_title: &'static str,
    /// The mode string as requested, even when it fell back to today.
    pub mode: String,
    pub events_section: Vec<EventListing>,
}

impl DashboardStats {
    pub async fn collect(store: &dyn EventStore, today: NaiveDate) -> StoreResult<Self> {
        Ok(Self {
            total_events: store.count_events(None).await?,
            total_participants_unique: store.count_participants().await?,
            total_participant_registrations: store.count_registrations().await?,
            upcoming_count: store
                .count_events(Some(DateWindow::OnOrAfter(today)))
                .await?,
            past_count: store.count_events(Some(DateWindow::Before(today))).await?,
        })
    }
}

/// Computes the dashboard as of `today`. Nothing is cached; every call
/// reads the store afresh.
pub async fn build_dashboard(
    store: &dyn EventStore,
    mode: Option<&str>,
    today: NaiveDate,
) -> StoreResult<Dashboard> {
    let raw_mode = mode.unwrap_or(DEFAULT_MODE);
    let selected = DashboardMode::parse(raw_mode);

    let stats = DashboardStats::collect(store, today).await?;
    let filter = selected
        .window(today)
        .map_or_else(EventFilter::all, EventFilter::within);
    let events_section = store.list_events(&filter).await?;

    Ok(Dashboard {
        stats,
        section_title: selected.section_title(),
        mode: raw_mode.to_string(),
        events_section,
    })
}
