use std::collections::HashSet;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    lenient_list, lenient_text, optional_text, required_text, FieldErrors, INVALID_CHOICE,
    INVALID_DATE, INVALID_TIME,
};
use crate::models::{Category, EventListing, Participant};
use crate::store::{EventStore, StoreResult};

pub const NAME_MIN_CHARS: usize = 3;
pub const NAME_TOO_SHORT: &str = "Event name must be at least 3 characters.";

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventForm {
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(deserialize_with = "lenient_text")]
    pub date: String,
    #[serde(deserialize_with = "lenient_text")]
    pub time: String,
    #[serde(deserialize_with = "lenient_text")]
    pub location: String,
    #[serde(deserialize_with = "lenient_text")]
    pub category: String,
    #[serde(deserialize_with = "lenient_list")]
    pub participants: Vec<String>,
}

/// A validated event ready to be written. `participant_ids` holds no
/// duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub name: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: Option<String>,
    pub category_id: Option<Uuid>,
    pub participant_ids: Vec<Uuid>,
}

/// The categories and participants an event may reference.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventChoices {
    pub categories: Vec<Category>,
    pub participants: Vec<Participant>,
}

impl EventChoices {
    pub async fn load(store: &dyn EventStore) -> StoreResult<Self> {
        Ok(Self {
            categories: store.list_categories().await?,
            participants: store.list_participants().await?,
        })
    }

    pub fn has_category(&self, id: Uuid) -> bool {
        self.categories.iter().any(|c| c.id == id)
    }

    fn participant_ids(&self) -> HashSet<Uuid> {
        self.participants.iter().map(|p| p.id).collect()
    }
}

impl EventForm {
    /// Validates every field, checking category and participant references
    /// against `choices`. All problems are reported together.
    pub fn clean(&self, choices: &EventChoices) -> Result<EventDraft, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = required_text(&mut errors, "name", &self.name).filter(|name| {
            let long_enough = name.chars().count() >= NAME_MIN_CHARS;
            if !long_enough {
                errors.add("name", NAME_TOO_SHORT);
            }
            long_enough
        });
        let description = optional_text(&self.description);
        let date = required_text(&mut errors, "date", &self.date).and_then(|raw| {
            let parsed = parse_date(&raw);
            if parsed.is_none() {
                errors.add("date", INVALID_DATE);
            }
            parsed
        });
        let time = required_text(&mut errors, "time", &self.time).and_then(|raw| {
            let parsed = parse_time(&raw);
            if parsed.is_none() {
                errors.add("time", INVALID_TIME);
            }
            parsed
        });
        let location = optional_text(&self.location);
        let category_id = self.clean_category(choices, &mut errors);
        let participant_ids = self.clean_participants(choices, &mut errors);

        match (name, date, time) {
            (Some(name), Some(date), Some(time)) if errors.is_empty() => Ok(EventDraft {
                name,
                description,
                date,
                time,
                location,
                category_id,
                participant_ids,
            }),
            _ => Err(errors),
        }
    }

    fn clean_category(&self, choices: &EventChoices, errors: &mut FieldErrors) -> Option<Uuid> {
        let raw = self.category.trim();
        if raw.is_empty() {
            return None;
        }
        match Uuid::parse_str(raw) {
            Ok(id) if choices.has_category(id) => Some(id),
            _ => {
                errors.add("category", INVALID_CHOICE);
                None
            }
        }
    }

    fn clean_participants(&self, choices: &EventChoices, errors: &mut FieldErrors) -> Vec<Uuid> {
        let known = choices.participant_ids();
        let mut seen = HashSet::new();
        let mut ids = Vec::with_capacity(self.participants.len());

        for raw in &self.participants {
            let raw = raw.trim();
            match Uuid::parse_str(raw) {
                Ok(id) if known.contains(&id) => {
                    if seen.insert(id) {
                        ids.push(id);
                    }
                }
                _ => {
                    errors.add("participants", invalid_participant(raw));
                }
            }
        }

        ids
    }
}

impl From<&EventListing> for EventForm {
    fn from(listing: &EventListing) -> Self {
        let event = &listing.event;
        Self {
            name: event.name.clone(),
            description: event.description.clone().unwrap_or_default(),
            date: event.date.format(DATE_FORMAT).to_string(),
            time: event.time.format("%H:%M").to_string(),
            location: event.location.clone().unwrap_or_default(),
            category: event.category_id.map(|id| id.to_string()).unwrap_or_default(),
            participants: listing
                .participants
                .iter()
                .map(|p| p.id.to_string())
                .collect(),
        }
    }
}

fn invalid_participant(raw: &str) -> String {
    format!("Select a valid choice. {raw} is not one of the available choices.")
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(raw, format).ok())
}
