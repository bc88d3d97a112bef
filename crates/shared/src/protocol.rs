use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Event, Repo, Username};

/// Body of `GET /user/{username}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummaryResponse {
    pub username: Username,
    pub event_count: u64,
    #[serde(default)]
    pub repos: Vec<Repo>,
}

/// Body of `GET /user/{username}/events/{page}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventPageResponse {
    #[serde(default)]
    pub events: Vec<Event>,
}

/// Body of `GET /stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub event_count: u64,
    pub latest_event: DateTime<Utc>,
    pub latest_event_age: i64,
}
