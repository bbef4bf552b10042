//! Persistence port for categories, participants and events.
//!
//! Handlers only see [`EventStore`]; [`PgEventStore`] backs it with
//! Postgres and [`MemoryEventStore`] keeps everything in process.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::forms::{CategoryDraft, EventDraft, ParticipantDraft};
use crate::models::{Category, Event, EventListing, Participant};
use crate::query::{DateWindow, EventFilter};

mod memory;
mod postgres;

pub use memory::MemoryEventStore;
pub use postgres::PgEventStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error")]
    Database(#[from] sqlx::Error),

    /// A referenced row disappeared between validation and the write.
    #[error("Integrity violation: {0}")]
    Integrity(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait EventStore: Send + Sync {
    /// All categories ordered by name.
    async fn list_categories(&self) -> StoreResult<Vec<Category>>;
    async fn find_category(&self, id: Uuid) -> StoreResult<Option<Category>>;
    async fn insert_category(&self, draft: &CategoryDraft) -> StoreResult<Category>;
    async fn update_category(
        &self,
        id: Uuid,
        draft: &CategoryDraft,
    ) -> StoreResult<Option<Category>>;
    /// Deletes the category and clears it from every event that used it.
    async fn delete_category(&self, id: Uuid) -> StoreResult<bool>;

    /// All participants ordered by name.
    async fn list_participants(&self) -> StoreResult<Vec<Participant>>;
    async fn find_participant(&self, id: Uuid) -> StoreResult<Option<Participant>>;
    async fn insert_participant(&self, draft: &ParticipantDraft) -> StoreResult<Participant>;
    async fn update_participant(
        &self,
        id: Uuid,
        draft: &ParticipantDraft,
    ) -> StoreResult<Option<Participant>>;
    /// Deletes the participant and its relation rows; events are kept.
    async fn delete_participant(&self, id: Uuid) -> StoreResult<bool>;

    /// Matching events ordered by date then time, annotated with category
    /// and participants.
    async fn list_events(&self, filter: &EventFilter) -> StoreResult<Vec<EventListing>>;
    async fn find_event(&self, id: Uuid) -> StoreResult<Option<EventListing>>;
    /// Writes the event and its relation rows atomically.
    async fn insert_event(&self, draft: &EventDraft) -> StoreResult<Event>;
    /// Rewrites the event and replaces its relation rows atomically.
    async fn update_event(&self, id: Uuid, draft: &EventDraft) -> StoreResult<Option<Event>>;
    /// Deletes the event and its relation rows only.
    async fn delete_event(&self, id: Uuid) -> StoreResult<bool>;

    async fn count_events(&self, window: Option<DateWindow>) -> StoreResult<i64>;
    async fn count_participants(&self) -> StoreResult<i64>;
    /// Rows in the event/participant relation.
    async fn count_registrations(&self) -> StoreResult<i64>;
}
