use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{Category, Participant};

/// A stored event row. Participants live in the `event_participants`
/// join table and are only carried on [`EventListing`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: Option<String>,
    pub category_id: Option<Uuid>,
}

/// An event with its category and participants resolved, as returned by
/// listings, the dashboard and the detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventListing {
    #[serde(flatten)]
    pub event: Event,
    pub category: Option<Category>,
    pub participants: Vec<Participant>,
    pub participant_count: i64,
}

impl EventListing {
    /// Builds a listing, deriving `participant_count` from the resolved set.
    pub fn new(event: Event, category: Option<Category>, participants: Vec<Participant>) -> Self {
        let participant_count = i64::try_from(participants.len()).unwrap_or(i64::MAX);
        Self {
            event,
            category,
            participants,
            participant_count,
        }
    }

    pub fn id(&self) -> Uuid {
        self.event.id
    }
}
