//! Staff-facing event management service: categories, participants and
//! events over HTTP, plus a dashboard of aggregate statistics.

pub mod config;
pub mod dashboard;
pub mod forms;
pub mod handlers;
pub mod models;
pub mod query;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;
