use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde_json::json;
use shared::{
    domain::{Event, EventPage, PageNumber, UserProfile, Username, EVENT_PAGE_SIZE},
    error::ApiError,
};
use tokio::sync::{oneshot, Mutex};

use crate::{error::GatewayError, gateway::ActivityGateway};

pub(crate) fn page(n: u32) -> PageNumber {
    PageNumber::new(n).expect("non-zero page")
}

pub(crate) fn profile(username: &str, event_count: u64) -> UserProfile {
    UserProfile {
        username: Username::new(username),
        profile_url: format!("https://github.com/{username}"),
        event_count,
        repos: vec![shared::domain::Repo(json!(format!("{username}/hello-world")))],
    }
}

pub(crate) fn sample_event(kind: &str, seq: u64) -> Event {
    serde_json::from_value(json!({
        "type": kind,
        "created_at": "2015-01-01T15:00:00Z",
        "seq": seq
    }))
    .expect("event")
}

pub(crate) fn event_page(username: &str, number: u32, event_count: u64) -> EventPage {
    let first = u64::from(number - 1) * EVENT_PAGE_SIZE;
    let last = (first + EVENT_PAGE_SIZE).min(event_count);
    EventPage {
        page_number: page(number),
        events: (first..last)
            .map(|seq| {
                let mut event = sample_event("PushEvent", seq);
                event.payload.insert("actor".into(), json!({ "login": username }));
                event
            })
            .collect(),
    }
}

pub(crate) fn not_found() -> GatewayError {
    GatewayError::Server(ApiError::new(404, "{\"error\":\"not found\"}"))
}

/// In-memory gateway with call recording, scripted failures and gates that
/// hold a response back until the test releases it.
#[derive(Default)]
pub(crate) struct ScriptedGateway {
    users: HashMap<String, u64>,
    failing_summaries: Mutex<u32>,
    failing_pages: Mutex<HashSet<u32>>,
    summary_gates: Mutex<HashMap<String, oneshot::Receiver<()>>>,
    page_gates: Mutex<HashMap<(String, u32), oneshot::Receiver<()>>>,
    summary_calls: Mutex<Vec<String>>,
    page_calls: Mutex<Vec<(String, u32)>>,
}

impl ScriptedGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_user(mut self, username: &str, event_count: u64) -> Self {
        self.users.insert(username.to_string(), event_count);
        self
    }

    pub(crate) async fn fail_next_summaries(&self, count: u32) {
        *self.failing_summaries.lock().await = count;
    }

    pub(crate) async fn fail_page(&self, number: u32) {
        self.failing_pages.lock().await.insert(number);
    }

    pub(crate) async fn heal_page(&self, number: u32) {
        self.failing_pages.lock().await.remove(&number);
    }

    pub(crate) async fn hold_summary(&self, username: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.summary_gates
            .lock()
            .await
            .insert(username.to_string(), rx);
        tx
    }

    pub(crate) async fn hold_page(&self, username: &str, number: u32) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.page_gates
            .lock()
            .await
            .insert((username.to_string(), number), rx);
        tx
    }

    pub(crate) async fn summary_calls(&self) -> Vec<String> {
        self.summary_calls.lock().await.clone()
    }

    pub(crate) async fn page_calls(&self) -> Vec<(String, u32)> {
        self.page_calls.lock().await.clone()
    }
}

#[async_trait]
impl ActivityGateway for ScriptedGateway {
    async fn fetch_user_summary(&self, username: &Username) -> Result<UserProfile, GatewayError> {
        self.summary_calls
            .lock()
            .await
            .push(username.as_str().to_string());

        let gate = self.summary_gates.lock().await.remove(username.as_str());
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        {
            let mut failing = self.failing_summaries.lock().await;
            if *failing > 0 {
                *failing -= 1;
                return Err(GatewayError::Transport {
                    url: format!("http://backend/user/{username}"),
                    message: "connection refused".to_string(),
                });
            }
        }

        match self.users.get(username.as_str()) {
            Some(count) => Ok(profile(username.as_str(), *count)),
            None => Err(not_found()),
        }
    }

    async fn fetch_event_page(
        &self,
        username: &Username,
        page: PageNumber,
    ) -> Result<EventPage, GatewayError> {
        self.page_calls
            .lock()
            .await
            .push((username.as_str().to_string(), page.get()));

        let gate = self
            .page_gates
            .lock()
            .await
            .remove(&(username.as_str().to_string(), page.get()));
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        if self.failing_pages.lock().await.contains(&page.get()) {
            return Err(GatewayError::Server(ApiError::new(500, "boom")));
        }
        let Some(count) = self.users.get(username.as_str()) else {
            return Err(not_found());
        };
        if u64::from(page.get() - 1) * EVENT_PAGE_SIZE >= *count {
            return Err(not_found());
        }
        Ok(event_page(username.as_str(), page.get(), *count))
    }
}
