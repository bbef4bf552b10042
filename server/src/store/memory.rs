use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{EventStore, StoreError, StoreResult};
use crate::forms::{CategoryDraft, EventDraft, ParticipantDraft};
use crate::models::{Category, Event, EventListing, Participant};
use crate::query::{DateWindow, EventFilter};

/// Process-local store. Each operation holds the table lock for its whole
/// duration, so an event and its relation rows change together.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    tables: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    categories: HashMap<Uuid, Category>,
    participants: HashMap<Uuid, Participant>,
    events: HashMap<Uuid, Event>,
    /// `(event_id, participant_id)`
    memberships: BTreeSet<(Uuid, Uuid)>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tables {
    fn check_references(&self, draft: &EventDraft) -> StoreResult<()> {
        if let Some(id) = draft.category_id {
            if !self.categories.contains_key(&id) {
                return Err(StoreError::Integrity(format!("category {id} does not exist")));
            }
        }
        if let Some(id) = draft
            .participant_ids
            .iter()
            .find(|id| !self.participants.contains_key(*id))
        {
            return Err(StoreError::Integrity(format!(
                "participant {id} does not exist"
            )));
        }
        Ok(())
    }

    fn replace_memberships(&mut self, event_id: Uuid, participant_ids: &[Uuid]) {
        self.memberships.retain(|(event, _)| *event != event_id);
        self.memberships
            .extend(participant_ids.iter().map(|participant| (event_id, *participant)));
    }

    fn annotate(&self, event: &Event) -> EventListing {
        let category = event
            .category_id
            .and_then(|id| self.categories.get(&id))
            .cloned();
        let mut participants: Vec<Participant> = self
            .memberships
            .iter()
            .filter(|(event_id, _)| *event_id == event.id)
            .filter_map(|(_, participant_id)| self.participants.get(participant_id))
            .cloned()
            .collect();
        participants.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        EventListing::new(event.clone(), category, participants)
    }
}

fn count(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

fn event_from_draft(id: Uuid, draft: &EventDraft) -> Event {
    Event {
        id,
        name: draft.name.clone(),
        description: draft.description.clone(),
        date: draft.date,
        time: draft.time,
        location: draft.location.clone(),
        category_id: draft.category_id,
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let tables = self.tables.read().await;
        let mut categories: Vec<Category> = tables.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(categories)
    }

    async fn find_category(&self, id: Uuid) -> StoreResult<Option<Category>> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn insert_category(&self, draft: &CategoryDraft) -> StoreResult<Category> {
        let category = Category {
            id: Uuid::new_v4(),
            name: draft.name.clone(),
            description: draft.description.clone(),
        };
        self.tables
            .write()
            .await
            .categories
            .insert(category.id, category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        id: Uuid,
        draft: &CategoryDraft,
    ) -> StoreResult<Option<Category>> {
        let mut tables = self.tables.write().await;
        Ok(tables.categories.get_mut(&id).map(|category| {
            category.name = draft.name.clone();
            category.description = draft.description.clone();
            category.clone()
        }))
    }

    async fn delete_category(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.categories.remove(&id).is_none() {
            return Ok(false);
        }
        for event in tables.events.values_mut() {
            if event.category_id == Some(id) {
                event.category_id = None;
            }
        }
        Ok(true)
    }

    async fn list_participants(&self) -> StoreResult<Vec<Participant>> {
        let tables = self.tables.read().await;
        let mut participants: Vec<Participant> = tables.participants.values().cloned().collect();
        participants.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(participants)
    }

    async fn find_participant(&self, id: Uuid) -> StoreResult<Option<Participant>> {
        Ok(self.tables.read().await.participants.get(&id).cloned())
    }

    async fn insert_participant(&self, draft: &ParticipantDraft) -> StoreResult<Participant> {
        let participant = Participant {
            id: Uuid::new_v4(),
            name: draft.name.clone(),
            email: draft.email.clone(),
        };
        self.tables
            .write()
            .await
            .participants
            .insert(participant.id, participant.clone());
        Ok(participant)
    }

    async fn update_participant(
        &self,
        id: Uuid,
        draft: &ParticipantDraft,
    ) -> StoreResult<Option<Participant>> {
        let mut tables = self.tables.write().await;
        Ok(tables.participants.get_mut(&id).map(|participant| {
            participant.name = draft.name.clone();
            participant.email = draft.email.clone();
            participant.clone()
        }))
    }

    async fn delete_participant(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.participants.remove(&id).is_none() {
            return Ok(false);
        }
        tables
            .memberships
            .retain(|(_, participant_id)| *participant_id != id);
        Ok(true)
    }

    async fn list_events(&self, filter: &EventFilter) -> StoreResult<Vec<EventListing>> {
        let tables = self.tables.read().await;
        let mut listings: Vec<EventListing> = tables
            .events
            .values()
            .filter(|event| filter.matches(event))
            .map(|event| tables.annotate(event))
            .collect();
        listings.sort_by(|a, b| {
            (a.event.date, a.event.time, &a.event.name, a.event.id).cmp(&(
                b.event.date,
                b.event.time,
                &b.event.name,
                b.event.id,
            ))
        });
        Ok(listings)
    }

    async fn find_event(&self, id: Uuid) -> StoreResult<Option<EventListing>> {
        let tables = self.tables.read().await;
        Ok(tables.events.get(&id).map(|event| tables.annotate(event)))
    }

    async fn insert_event(&self, draft: &EventDraft) -> StoreResult<Event> {
        let mut tables = self.tables.write().await;
        tables.check_references(draft)?;

        let event = event_from_draft(Uuid::new_v4(), draft);
        tables.events.insert(event.id, event.clone());
        tables.replace_memberships(event.id, &draft.participant_ids);
        Ok(event)
    }

    async fn update_event(&self, id: Uuid, draft: &EventDraft) -> StoreResult<Option<Event>> {
        let mut tables = self.tables.write().await;
        if !tables.events.contains_key(&id) {
            return Ok(None);
        }
        tables.check_references(draft)?;

        let event = event_from_draft(id, draft);
        tables.events.insert(id, event.clone());
        tables.replace_memberships(id, &draft.participant_ids);
        Ok(Some(event))
    }

    async fn delete_event(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.events.remove(&id).is_none() {
            return Ok(false);
        }
        tables.memberships.retain(|(event_id, _)| *event_id != id);
        Ok(true)
    }

    async fn count_events(&self, window: Option<DateWindow>) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        let matching = tables
            .events
            .values()
            .filter(|event| window.map_or(true, |w| w.contains(event.date)))
            .count();
        Ok(count(matching))
    }

    async fn count_participants(&self) -> StoreResult<i64> {
        Ok(count(self.tables.read().await.participants.len()))
    }

    async fn count_registrations(&self) -> StoreResult<i64> {
        Ok(count(self.tables.read().await.memberships.len()))
    }
}
