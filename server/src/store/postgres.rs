use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use super::{EventStore, StoreResult};
use crate::forms::{CategoryDraft, EventDraft, ParticipantDraft};
use crate::models::{Category, Event, EventListing, Participant};
use crate::query::{DateWindow, EventFilter};

const EVENT_COLUMNS: &str = "id, name, description, date, time, location, category_id";

/// Events joined to their category. Callers append conditions after
/// `WHERE TRUE` and then [`LISTING_TAIL`].
const LISTING_SELECT: &str = "\
    SELECT e.id, e.name, e.description, e.date, e.time, e.location, e.category_id, \
           c.name AS category_name, c.description AS category_description \
    FROM events e \
    LEFT JOIN categories c ON c.id = e.category_id \
    WHERE TRUE";

const LISTING_TAIL: &str = " ORDER BY e.date, e.time, e.name, e.id";

#[derive(Debug, FromRow)]
struct ListingRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    date: NaiveDate,
    time: NaiveTime,
    location: Option<String>,
    category_id: Option<Uuid>,
    category_name: Option<String>,
    category_description: Option<String>,
}

#[derive(Debug, FromRow)]
struct MembershipRow {
    event_id: Uuid,
    id: Uuid,
    name: String,
    email: String,
}

#[derive(Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_listings(
        &self,
        mut builder: QueryBuilder<'_, Postgres>,
    ) -> StoreResult<Vec<EventListing>> {
        builder.push(LISTING_TAIL);
        let rows: Vec<ListingRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let memberships = sqlx::query_as::<_, MembershipRow>(
            "SELECT ep.event_id, p.id, p.name, p.email \
             FROM event_participants ep \
             JOIN participants p ON p.id = ep.participant_id \
             WHERE ep.event_id = ANY($1) \
             ORDER BY p.name, p.id",
        )
        .bind(&ids[..])
        .fetch_all(&self.pool)
        .await?;

        let mut by_event: HashMap<Uuid, Vec<Participant>> = HashMap::new();
        for row in memberships {
            by_event.entry(row.event_id).or_default().push(Participant {
                id: row.id,
                name: row.name,
                email: row.email,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let participants = by_event.remove(&row.id).unwrap_or_default();
                row.into_listing(participants)
            })
            .collect())
    }
}

impl ListingRow {
    fn into_listing(self, participants: Vec<Participant>) -> EventListing {
        let category = match (self.category_id, self.category_name) {
            (Some(id), Some(name)) => Some(Category {
                id,
                name,
                description: self.category_description,
            }),
            _ => None,
        };
        let event = Event {
            id: self.id,
            name: self.name,
            description: self.description,
            date: self.date,
            time: self.time,
            location: self.location,
            category_id: self.category_id,
        };
        EventListing::new(event, category, participants)
    }
}

/// Rewrites the relation rows of `event_id` inside `tx`.
async fn replace_participants(
    tx: &mut Transaction<'_, Postgres>,
    event_id: Uuid,
    participant_ids: &[Uuid],
) -> StoreResult<()> {
    sqlx::query("DELETE FROM event_participants WHERE event_id = $1")
        .bind(event_id)
        .execute(&mut **tx)
        .await?;

    if !participant_ids.is_empty() {
        sqlx::query(
            "INSERT INTO event_participants (event_id, participant_id) \
             SELECT $1, UNNEST($2::uuid[]) \
             ON CONFLICT DO NOTHING",
        )
        .bind(event_id)
        .bind(participant_ids)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM categories ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn find_category(&self, id: Uuid) -> StoreResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    async fn insert_category(&self, draft: &CategoryDraft) -> StoreResult<Category> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (id, name, description) VALUES ($1, $2, $3) \
             RETURNING id, name, description",
        )
        .bind(Uuid::new_v4())
        .bind(&draft.name)
        .bind(&draft.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(category)
    }

    async fn update_category(
        &self,
        id: Uuid,
        draft: &CategoryDraft,
    ) -> StoreResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $2, description = $3 WHERE id = $1 \
             RETURNING id, name, description",
        )
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.description)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    async fn delete_category(&self, id: Uuid) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE events SET category_id = NULL WHERE category_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;
        tx.commit().await?;
        Ok(deleted)
    }

    async fn list_participants(&self) -> StoreResult<Vec<Participant>> {
        let participants = sqlx::query_as::<_, Participant>(
            "SELECT id, name, email FROM participants ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(participants)
    }

    async fn find_participant(&self, id: Uuid) -> StoreResult<Option<Participant>> {
        let participant = sqlx::query_as::<_, Participant>(
            "SELECT id, name, email FROM participants WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(participant)
    }

    async fn insert_participant(&self, draft: &ParticipantDraft) -> StoreResult<Participant> {
        let participant = sqlx::query_as::<_, Participant>(
            "INSERT INTO participants (id, name, email) VALUES ($1, $2, $3) \
             RETURNING id, name, email",
        )
        .bind(Uuid::new_v4())
        .bind(&draft.name)
        .bind(&draft.email)
        .fetch_one(&self.pool)
        .await?;
        Ok(participant)
    }

    async fn update_participant(
        &self,
        id: Uuid,
        draft: &ParticipantDraft,
    ) -> StoreResult<Option<Participant>> {
        let participant = sqlx::query_as::<_, Participant>(
            "UPDATE participants SET name = $2, email = $3 WHERE id = $1 \
             RETURNING id, name, email",
        )
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(participant)
    }

    async fn delete_participant(&self, id: Uuid) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM event_participants WHERE participant_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM participants WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;
        tx.commit().await?;
        Ok(deleted)
    }

    async fn list_events(&self, filter: &EventFilter) -> StoreResult<Vec<EventListing>> {
        let mut builder = QueryBuilder::<Postgres>::new(LISTING_SELECT);
        filter.push_conditions(&mut builder);
        self.fetch_listings(builder).await
    }

    async fn find_event(&self, id: Uuid) -> StoreResult<Option<EventListing>> {
        let mut builder = QueryBuilder::<Postgres>::new(LISTING_SELECT);
        builder.push(" AND e.id = ").push_bind(id);
        Ok(self.fetch_listings(builder).await?.into_iter().next())
    }

    async fn insert_event(&self, draft: &EventDraft) -> StoreResult<Event> {
        let mut tx = self.pool.begin().await?;
        let query = format!(
            "INSERT INTO events ({EVENT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {EVENT_COLUMNS}"
        );
        let event = sqlx::query_as::<_, Event>(&query)
            .bind(Uuid::new_v4())
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(draft.date)
            .bind(draft.time)
            .bind(&draft.location)
            .bind(draft.category_id)
            .fetch_one(&mut *tx)
            .await?;
        replace_participants(&mut tx, event.id, &draft.participant_ids).await?;
        tx.commit().await?;
        Ok(event)
    }

    async fn update_event(&self, id: Uuid, draft: &EventDraft) -> StoreResult<Option<Event>> {
        let mut tx = self.pool.begin().await?;
        let query = format!(
            "UPDATE events SET name = $2, description = $3, date = $4, time = $5, \
             location = $6, category_id = $7 WHERE id = $1 RETURNING {EVENT_COLUMNS}"
        );
        let Some(event) = sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(draft.date)
            .bind(draft.time)
            .bind(&draft.location)
            .bind(draft.category_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };
        replace_participants(&mut tx, id, &draft.participant_ids).await?;
        tx.commit().await?;
        Ok(Some(event))
    }

    async fn delete_event(&self, id: Uuid) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM event_participants WHERE event_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;
        tx.commit().await?;
        Ok(deleted)
    }

    async fn count_events(&self, window: Option<DateWindow>) -> StoreResult<i64> {
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM events e WHERE TRUE");
        if let Some(window) = window {
            window.push_condition(&mut builder, "e.date");
        }
        let total = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn count_participants(&self) -> StoreResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM participants")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn count_registrations(&self) -> StoreResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM event_participants")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}
