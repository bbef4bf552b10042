//! Event query composition.
//!
//! An [`EventFilter`] is a conjunction of optional criteria. The same
//! filter is evaluated two ways: as an in-process predicate over stored
//! events ([`EventFilter::matches`]) and as SQL appended to a
//! `WHERE TRUE` clause ([`EventFilter::push_conditions`]). Both must
//! agree.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::forms::event::parse_date;
use crate::forms::{FieldErrors, INVALID_CHOICE, INVALID_DATE};
use crate::models::Event;

/// Inclusive/exclusive date bounds applied to `events.date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateWindow {
    /// `date == day`
    On(NaiveDate),
    /// `date >= day`
    OnOrAfter(NaiveDate),
    /// `date < day`
    Before(NaiveDate),
    /// `start <= date <= end`
    Between(NaiveDate, NaiveDate),
}

impl DateWindow {
    pub fn contains(self, date: NaiveDate) -> bool {
        match self {
            DateWindow::On(day) => date == day,
            DateWindow::OnOrAfter(day) => date >= day,
            DateWindow::Before(day) => date < day,
            DateWindow::Between(start, end) => start <= date && date <= end,
        }
    }

    /// Appends ` AND <condition>` on `column`.
    pub fn push_condition(self, builder: &mut QueryBuilder<'_, Postgres>, column: &str) {
        builder.push(" AND ").push(column);
        match self {
            DateWindow::On(day) => {
                builder.push(" = ").push_bind(day);
            }
            DateWindow::OnOrAfter(day) => {
                builder.push(" >= ").push_bind(day);
            }
            DateWindow::Before(day) => {
                builder.push(" < ").push_bind(day);
            }
            DateWindow::Between(start, end) => {
                builder
                    .push(" BETWEEN ")
                    .push_bind(start)
                    .push(" AND ")
                    .push_bind(end);
            }
        }
    }
}

/// Raw `?search=&category=&start=&end=` parameters of the event list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventListParams {
    pub search: Option<String>,
    pub category: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl EventListParams {
    fn value(field: &Option<String>) -> Option<&str> {
        field.as_deref().filter(|v| !v.is_empty())
    }

    pub fn search(&self) -> &str {
        Self::value(&self.search).unwrap_or_default()
    }

    pub fn category(&self) -> &str {
        Self::value(&self.category).unwrap_or_default()
    }

    pub fn start(&self) -> &str {
        Self::value(&self.start).unwrap_or_default()
    }

    pub fn end(&self) -> &str {
        Self::value(&self.end).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    pub window: Option<DateWindow>,
}

impl EventFilter {
    /// No criteria: every event.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn within(window: DateWindow) -> Self {
        Self {
            window: Some(window),
            ..Self::default()
        }
    }

    /// Builds a filter from list parameters. Empty values count as absent,
    /// and the date range only applies when both `start` and `end` are given.
    pub fn from_params(params: &EventListParams) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let search = EventListParams::value(&params.search).map(str::to_string);

        let category_id = EventListParams::value(&params.category).and_then(|raw| {
            let parsed = Uuid::parse_str(raw.trim()).ok();
            if parsed.is_none() {
                errors.add("category", INVALID_CHOICE);
            }
            parsed
        });

        let mut bound = |field: &'static str, raw: &Option<String>| {
            EventListParams::value(raw).and_then(|raw| {
                let parsed = parse_date(raw);
                if parsed.is_none() {
                    errors.add(field, INVALID_DATE);
                }
                parsed
            })
        };
        let window = match (bound("start", &params.start), bound("end", &params.end)) {
            (Some(start), Some(end)) => Some(DateWindow::Between(start, end)),
            _ => None,
        };

        if errors.is_empty() {
            Ok(Self {
                search,
                category_id,
                window,
            })
        } else {
            Err(errors)
        }
    }

    pub fn matches(&self, event: &Event) -> bool {
        self.matches_search(event)
            && self
                .category_id
                .map_or(true, |id| event.category_id == Some(id))
            && self.window.map_or(true, |w| w.contains(event.date))
    }

    fn matches_search(&self, event: &Event) -> bool {
        let Some(term) = &self.search else {
            return true;
        };
        let needle = term.to_lowercase();
        event.name.to_lowercase().contains(&needle)
            || event
                .location
                .as_deref()
                .is_some_and(|location| location.to_lowercase().contains(&needle))
    }

    /// Appends this filter's conditions to a query over `events` aliased
    /// as `e`. The builder must already end in a `WHERE` clause.
    pub fn push_conditions(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        if let Some(term) = &self.search {
            let pattern = format!("%{}%", escape_like(term));
            builder
                .push(" AND (e.name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR e.location ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(id) = self.category_id {
            builder.push(" AND e.category_id = ").push_bind(id);
        }
        if let Some(window) = self.window {
            window.push_condition(builder, "e.date");
        }
    }
}

/// Escapes `LIKE` wildcards so the term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
