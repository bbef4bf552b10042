//! Integration tests for the Postgres store.
//!
//! Each test gets a fresh database with the migrations applied. They need
//! a reachable server: `DATABASE_URL=postgres://... cargo test -- --ignored`.

use chrono::{NaiveDate, NaiveTime};
use sqlx::PgPool;
use uuid::Uuid;

use eventdesk_server::forms::{CategoryDraft, EventDraft, ParticipantDraft};
use eventdesk_server::models::{Category, EventListing, Participant};
use eventdesk_server::query::{DateWindow, EventFilter};
use eventdesk_server::store::{EventStore, PgEventStore};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

fn new_event(name: &str, date: NaiveDate, hour: u32) -> EventDraft {
    EventDraft {
        name: name.into(),
        description: None,
        date,
        time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
        location: None,
        category_id: None,
        participant_ids: Vec::new(),
    }
}

async fn category(store: &PgEventStore, name: &str) -> Category {
    store
        .insert_category(&CategoryDraft {
            name: name.into(),
            description: None,
        })
        .await
        .unwrap()
}

async fn participant(store: &PgEventStore, name: &str) -> Participant {
    store
        .insert_participant(&ParticipantDraft {
            name: name.into(),
            email: format!("{}@x.com", name.to_lowercase()),
        })
        .await
        .unwrap()
}

async fn listing(store: &PgEventStore, id: Uuid) -> EventListing {
    store.find_event(id).await.unwrap().expect("event exists")
}

fn names(listings: &[EventListing]) -> Vec<&str> {
    listings.iter().map(|l| l.event.name.as_str()).collect()
}

// ---------------------------------------------------------------------------
// Filters and ordering
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL pointing at a Postgres server"]
async fn search_matches_name_or_location(pool: PgPool) {
    let store = PgEventStore::new(pool);

    store
        .insert_event(&new_event("Jazz Night", day(10), 20))
        .await
        .unwrap();
    let mut brunch = new_event("Brunch", day(11), 11);
    brunch.location = Some("The JAZZ Cafe".into());
    store.insert_event(&brunch).await.unwrap();
    let mut football = new_event("Football", day(12), 15);
    football.location = Some("Stadium".into());
    store.insert_event(&football).await.unwrap();

    let filter = EventFilter {
        search: Some("jazz".into()),
        ..EventFilter::all()
    };
    let found = store.list_events(&filter).await.unwrap();
    assert_eq!(names(&found), ["Jazz Night", "Brunch"]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL pointing at a Postgres server"]
async fn search_treats_wildcards_literally(pool: PgPool) {
    let store = PgEventStore::new(pool);
    store
        .insert_event(&new_event("50% Off Night", day(10), 20))
        .await
        .unwrap();
    store
        .insert_event(&new_event("500 Days Meetup", day(11), 20))
        .await
        .unwrap();
    store
        .insert_event(&new_event("snake_case talk", day(12), 20))
        .await
        .unwrap();
    store
        .insert_event(&new_event("snakeXcase talk", day(13), 20))
        .await
        .unwrap();

    let search = |text: &str| EventFilter {
        search: Some(text.into()),
        ..EventFilter::all()
    };
    let found = store.list_events(&search("50%")).await.unwrap();
    assert_eq!(names(&found), ["50% Off Night"]);
    let found = store.list_events(&search("e_c")).await.unwrap();
    assert_eq!(names(&found), ["snake_case talk"]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL pointing at a Postgres server"]
async fn filters_by_category_and_date_range(pool: PgPool) {
    let store = PgEventStore::new(pool);
    let music = category(&store, "Music").await;

    let mut early = new_event("Early Gig", day(5), 20);
    early.category_id = Some(music.id);
    store.insert_event(&early).await.unwrap();
    let mut late = new_event("Late Gig", day(25), 20);
    late.category_id = Some(music.id);
    store.insert_event(&late).await.unwrap();
    store
        .insert_event(&new_event("Board Games", day(6), 18))
        .await
        .unwrap();

    let by_category = EventFilter {
        category_id: Some(music.id),
        ..EventFilter::all()
    };
    let found = store.list_events(&by_category).await.unwrap();
    assert_eq!(names(&found), ["Early Gig", "Late Gig"]);
    assert_eq!(found[0].category.as_ref().unwrap().name, "Music");

    let in_range = EventFilter::within(DateWindow::Between(day(1), day(10)));
    let found = store.list_events(&in_range).await.unwrap();
    assert_eq!(names(&found), ["Early Gig", "Board Games"]);

    let combined = EventFilter {
        category_id: Some(music.id),
        window: Some(DateWindow::Between(day(1), day(10))),
        ..EventFilter::all()
    };
    let found = store.list_events(&combined).await.unwrap();
    assert_eq!(names(&found), ["Early Gig"]);

    // Range ends are inclusive.
    let edges = EventFilter::within(DateWindow::Between(day(6), day(25)));
    let found = store.list_events(&edges).await.unwrap();
    assert_eq!(names(&found), ["Board Games", "Late Gig"]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL pointing at a Postgres server"]
async fn listings_are_ordered_and_counted(pool: PgPool) {
    let store = PgEventStore::new(pool);
    let ana = participant(&store, "Ana").await;
    let bruno = participant(&store, "Bruno").await;

    store
        .insert_event(&new_event("Evening Talk", day(10), 19))
        .await
        .unwrap();
    let mut morning = new_event("Morning Run", day(10), 7);
    morning.participant_ids = vec![bruno.id, ana.id];
    store.insert_event(&morning).await.unwrap();
    store
        .insert_event(&new_event("Kickoff", day(2), 9))
        .await
        .unwrap();

    let all = store.list_events(&EventFilter::all()).await.unwrap();
    assert_eq!(names(&all), ["Kickoff", "Morning Run", "Evening Talk"]);

    let run = &all[1];
    assert_eq!(run.participant_count, 2);
    let members: Vec<&str> = run.participants.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(members, ["Ana", "Bruno"]);
    assert_eq!(all[0].participant_count, 0);
    assert!(all[0].participants.is_empty());

    assert_eq!(store.count_events(None).await.unwrap(), 3);
    assert_eq!(
        store
            .count_events(Some(DateWindow::On(day(10))))
            .await
            .unwrap(),
        2
    );
    assert_eq!(
        store
            .count_events(Some(DateWindow::Before(day(10))))
            .await
            .unwrap(),
        1
    );
    assert_eq!(store.count_participants().await.unwrap(), 2);
    assert_eq!(store.count_registrations().await.unwrap(), 2);
}

// ---------------------------------------------------------------------------
// Writes and delete effects
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL pointing at a Postgres server"]
async fn update_replaces_participants(pool: PgPool) {
    let store = PgEventStore::new(pool);
    let ana = participant(&store, "Ana").await;
    let bruno = participant(&store, "Bruno").await;

    let mut draft = new_event("Jazz Night", day(10), 20);
    draft.participant_ids = vec![ana.id];
    let event = store.insert_event(&draft).await.unwrap();

    draft.participant_ids = vec![bruno.id];
    draft.name = "Jazz Night II".into();
    let updated = store.update_event(event.id, &draft).await.unwrap();
    assert_eq!(updated.unwrap().name, "Jazz Night II");

    let after = listing(&store, event.id).await;
    assert_eq!(after.participant_count, 1);
    assert_eq!(after.participants[0].id, bruno.id);
    assert_eq!(store.count_registrations().await.unwrap(), 1);

    draft.participant_ids.clear();
    store.update_event(event.id, &draft).await.unwrap();
    assert!(listing(&store, event.id).await.participants.is_empty());

    let missing = store.update_event(Uuid::new_v4(), &draft).await.unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL pointing at a Postgres server"]
async fn deleting_participant_keeps_the_event(pool: PgPool) {
    let store = PgEventStore::new(pool);
    let ana = participant(&store, "Ana").await;
    let bruno = participant(&store, "Bruno").await;

    let mut draft = new_event("Jazz Night", day(10), 20);
    draft.participant_ids = vec![ana.id, bruno.id];
    let event = store.insert_event(&draft).await.unwrap();

    assert!(store.delete_participant(ana.id).await.unwrap());
    assert!(!store.delete_participant(ana.id).await.unwrap());

    let after = listing(&store, event.id).await;
    assert_eq!(after.participant_count, 1);
    assert_eq!(after.participants[0].id, bruno.id);
    assert_eq!(store.count_events(None).await.unwrap(), 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL pointing at a Postgres server"]
async fn deleting_category_clears_event_reference(pool: PgPool) {
    let store = PgEventStore::new(pool);
    let music = category(&store, "Music").await;

    let mut draft = new_event("Jazz Night", day(10), 20);
    draft.category_id = Some(music.id);
    let event = store.insert_event(&draft).await.unwrap();

    assert!(store.delete_category(music.id).await.unwrap());

    let after = listing(&store, event.id).await;
    assert_eq!(after.event.category_id, None);
    assert!(after.category.is_none());
    assert!(store.find_category(music.id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL pointing at a Postgres server"]
async fn deleting_event_keeps_participants(pool: PgPool) {
    let store = PgEventStore::new(pool);
    let ana = participant(&store, "Ana").await;

    let mut draft = new_event("Jazz Night", day(10), 20);
    draft.participant_ids = vec![ana.id];
    let event = store.insert_event(&draft).await.unwrap();

    assert!(store.delete_event(event.id).await.unwrap());
    assert!(store.find_event(event.id).await.unwrap().is_none());
    assert_eq!(store.count_registrations().await.unwrap(), 0);
    assert!(store.find_participant(ana.id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL pointing at a Postgres server"]
async fn dangling_participant_rolls_back_the_insert(pool: PgPool) {
    let store = PgEventStore::new(pool);
    let ana = participant(&store, "Ana").await;
    store
        .insert_event(&new_event("Existing", day(1), 9))
        .await
        .unwrap();

    let mut draft = new_event("Jazz Night", day(10), 20);
    draft.participant_ids = vec![ana.id, Uuid::new_v4()];
    let result = store.insert_event(&draft).await;

    assert!(result.is_err(), "unknown participant should fail the write");
    assert_eq!(store.count_events(None).await.unwrap(), 1);
    assert_eq!(store.count_registrations().await.unwrap(), 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL pointing at a Postgres server"]
async fn duplicate_participant_ids_collapse(pool: PgPool) {
    let store = PgEventStore::new(pool);
    let ana = participant(&store, "Ana").await;

    let mut draft = new_event("Jazz Night", day(10), 20);
    draft.participant_ids = vec![ana.id, ana.id];
    let event = store.insert_event(&draft).await.unwrap();

    assert_eq!(listing(&store, event.id).await.participant_count, 1);
    assert_eq!(store.count_registrations().await.unwrap(), 1);
}
