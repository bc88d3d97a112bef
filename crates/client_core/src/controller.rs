//! Runs the session reducer and executes the effects it asks for.

use std::{collections::VecDeque, sync::Arc};

use shared::domain::PageNumber;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use crate::{
    error::SessionError,
    gateway::ActivityGateway,
    state::{reduce, Action, Effect, LogLevel, Session, Tab},
};

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub enum ClientEvent {
    StateChanged(Arc<Session>),
    Error(SessionError),
}

pub struct UserController {
    gateway: Arc<dyn ActivityGateway>,
    session: Mutex<Session>,
    events: broadcast::Sender<ClientEvent>,
}

impl UserController {
    pub fn new(gateway: Arc<dyn ActivityGateway>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            gateway,
            session: Mutex::new(Session::new()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> Session {
        self.session.lock().await.clone()
    }

    pub async fn submit_user(&self, raw_username: &str) {
        self.dispatch(Action::SubmitUser {
            raw_username: raw_username.to_string(),
        })
        .await;
    }

    pub async fn select_tab(&self, tab: Tab) {
        self.dispatch(Action::SelectTab(tab)).await;
    }

    pub async fn go_to_event_page(&self, page: PageNumber) {
        self.dispatch(Action::GoToEventPage(page)).await;
    }

    pub async fn load_current_event_page(&self) {
        self.dispatch(Action::LoadCurrentEventPage).await;
    }

    pub async fn reset_all(&self) {
        self.dispatch(Action::ResetAll).await;
    }

    /// Applies `action` and every follow-up it causes. The session lock is
    /// never held while a gateway call is outstanding.
    pub async fn dispatch(&self, action: Action) {
        let mut queue = VecDeque::from([action]);
        while let Some(action) = queue.pop_front() {
            let effects = self.apply(action).await;
            for effect in effects {
                if let Some(follow_up) = self.run_effect(effect).await {
                    queue.push_back(follow_up);
                }
            }
        }
    }

    async fn apply(&self, action: Action) -> Vec<Effect> {
        let (snapshot, effects) = {
            let mut guard = self.session.lock().await;
            let current = std::mem::take(&mut *guard);
            let transition = reduce(current, action);
            *guard = transition.session;
            (Arc::new(guard.clone()), transition.effects)
        };
        let _ = self.events.send(ClientEvent::StateChanged(snapshot));
        effects
    }

    async fn run_effect(&self, effect: Effect) -> Option<Action> {
        match effect {
            Effect::FetchUserSummary {
                generation,
                username,
            } => {
                info!(%username, generation = generation.0, "fetching user summary");
                let result = self.gateway.fetch_user_summary(&username).await;
                Some(Action::SummaryLoaded { generation, result })
            }
            Effect::FetchEventPage {
                generation,
                username,
                page,
            } => {
                info!(%username, %page, generation = generation.0, "fetching event page");
                let result = self.gateway.fetch_event_page(&username, page).await;
                Some(Action::PageLoaded {
                    generation,
                    username,
                    page,
                    result,
                })
            }
            Effect::ReportError(err) => {
                error!(error = %err, "session request failed");
                let _ = self.events.send(ClientEvent::Error(err));
                None
            }
            Effect::Log { level, message } => {
                match level {
                    LogLevel::Debug => debug!("{message}"),
                    LogLevel::Warn => warn!("{message}"),
                }
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
