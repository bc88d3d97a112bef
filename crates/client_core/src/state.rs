//! Session state and the pure transition function that advances it.
//!
//! `reduce` never performs I/O. Network work is returned as [`Effect`]s and
//! its outcome comes back later as an [`Action`] tagged with the
//! [`Generation`] that was current when the request was issued.

use std::{collections::BTreeSet, sync::Arc};

use shared::domain::{Event, EventPage, PageNumber, UserProfile, Username};

use crate::{
    cache::PaginationCache,
    error::{GatewayError, SessionError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    /// No panel selected.
    Hidden,
    #[default]
    RepoList,
    EventList,
}

/// Identity of the submitted target. Bumped on every submit and reset so
/// responses for an earlier target can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub current_tab: Tab,
    pub processed: bool,
    pub processing: bool,
    pub has_results: bool,
    pub multiple_event_pages: bool,
    pub current_event_page: PageNumber,
    pub event_page_count: u32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            current_tab: Tab::default(),
            processed: false,
            processing: false,
            has_results: false,
            multiple_event_pages: false,
            current_event_page: PageNumber::FIRST,
            event_page_count: 0,
        }
    }
}

impl ViewState {
    pub fn is_current_tab(&self, tab: Tab) -> bool {
        self.current_tab == tab
    }

    /// Page numbers for a pagination control, `1..=event_page_count`.
    pub fn page_numbers(&self) -> impl Iterator<Item = PageNumber> {
        (1..=self.event_page_count).filter_map(PageNumber::new)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub view: ViewState,
    pub requested: Option<Username>,
    pub profile: Option<UserProfile>,
    pub cache: PaginationCache,
    pub visible_page: Option<Arc<EventPage>>,
    pub pending_pages: BTreeSet<PageNumber>,
    pub generation: Generation,
    pub last_error: Option<SessionError>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonical username of the loaded profile.
    pub fn processed_username(&self) -> Option<&Username> {
        self.profile.as_ref().map(|profile| &profile.username)
    }

    /// Events of the page currently on screen.
    pub fn events(&self) -> &[Event] {
        self.visible_page
            .as_deref()
            .map(|page| page.events.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_page_loading(&self) -> bool {
        self.pending_pages.contains(&self.view.current_event_page)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SubmitUser {
        raw_username: String,
    },
    SelectTab(Tab),
    GoToEventPage(PageNumber),
    LoadCurrentEventPage,
    ResetAll,
    SummaryLoaded {
        generation: Generation,
        result: Result<UserProfile, GatewayError>,
    },
    PageLoaded {
        generation: Generation,
        username: Username,
        page: PageNumber,
        result: Result<EventPage, GatewayError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Warn,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchUserSummary {
        generation: Generation,
        username: Username,
    },
    FetchEventPage {
        generation: Generation,
        username: Username,
        page: PageNumber,
    },
    ReportError(SessionError),
    Log {
        level: LogLevel,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub session: Session,
    pub effects: Vec<Effect>,
}

impl Transition {
    pub fn new(session: Session, effects: Vec<Effect>) -> Self {
        Self { session, effects }
    }

    pub fn no_change(session: Session) -> Self {
        Self {
            session,
            effects: vec![],
        }
    }

    fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

pub fn reduce(session: Session, action: Action) -> Transition {
    match action {
        Action::SubmitUser { raw_username } => submit_user(session, Username::new(raw_username)),
        Action::SelectTab(tab) => select_tab(session, tab),
        Action::GoToEventPage(page) => {
            let mut session = session;
            session.view.current_event_page = page;
            ensure_current_page(session)
        }
        Action::LoadCurrentEventPage => ensure_current_page(session),
        Action::ResetAll => reset_all(session),
        Action::SummaryLoaded { generation, result } => summary_loaded(session, generation, result),
        Action::PageLoaded {
            generation,
            username,
            page,
            result,
        } => page_loaded(session, generation, username, page, result),
    }
}

fn submit_user(session: Session, username: Username) -> Transition {
    let generation = session.generation.next();
    let next = Session {
        view: ViewState {
            current_tab: session.view.current_tab,
            processing: true,
            ..ViewState::default()
        },
        requested: Some(username.clone()),
        generation,
        ..Session::default()
    };
    Transition::new(
        next,
        vec![Effect::FetchUserSummary {
            generation,
            username,
        }],
    )
}

fn select_tab(mut session: Session, tab: Tab) -> Transition {
    session.view.current_tab = tab;
    match tab {
        Tab::EventList => ensure_current_page(session),
        Tab::RepoList | Tab::Hidden => Transition::no_change(session),
    }
}

fn reset_all(session: Session) -> Transition {
    let had_pending = session.view.processing || !session.pending_pages.is_empty();
    let next = Session {
        generation: session.generation.next(),
        ..Session::default()
    };
    let transition = Transition::no_change(next);
    if had_pending {
        transition.with_effect(Effect::Log {
            level: LogLevel::Debug,
            message: "session reset with requests still in flight".to_string(),
        })
    } else {
        transition
    }
}

/// Makes the current page visible, fetching it only when it is neither
/// cached nor already requested.
fn ensure_current_page(mut session: Session) -> Transition {
    if !session.view.processed {
        return Transition::no_change(session);
    }
    let Some(username) = session.processed_username().cloned() else {
        return Transition::no_change(session);
    };
    if !session.view.has_results {
        session.visible_page = None;
        return Transition::no_change(session);
    }

    let page = session.view.current_event_page;
    if let Some(hit) = session.cache.lookup(&username, page) {
        session.visible_page = Some(hit);
        return Transition::no_change(session);
    }

    session.visible_page = None;
    if !session.pending_pages.insert(page) {
        return Transition::no_change(session);
    }
    let generation = session.generation;
    Transition::new(
        session,
        vec![Effect::FetchEventPage {
            generation,
            username,
            page,
        }],
    )
}

fn summary_loaded(
    mut session: Session,
    generation: Generation,
    result: Result<UserProfile, GatewayError>,
) -> Transition {
    if generation != session.generation || !session.view.processing {
        let current = session.generation.0;
        return Transition::no_change(session).with_effect(Effect::Log {
            level: LogLevel::Warn,
            message: format!(
                "discarding summary for generation {} (current {current})",
                generation.0
            ),
        });
    }

    session.view.processing = false;
    match result {
        Ok(profile) => {
            session.view.processed = true;
            session.view.has_results = profile.event_count > 0;
            session.view.multiple_event_pages = profile.has_multiple_event_pages();
            session.view.event_page_count = profile.event_page_count();
            session.cache.clear();
            session.profile = Some(profile);
            session.last_error = None;
            if session.view.is_current_tab(Tab::EventList) {
                ensure_current_page(session)
            } else {
                Transition::no_change(session)
            }
        }
        Err(source) => {
            session.view.processed = false;
            session.profile = None;
            let error = SessionError::Summary {
                username: session.requested.clone().unwrap_or_else(|| Username::new("")),
                source,
            };
            session.last_error = Some(error.clone());
            Transition::new(session, vec![Effect::ReportError(error)])
        }
    }
}

fn page_loaded(
    mut session: Session,
    generation: Generation,
    username: Username,
    page: PageNumber,
    result: Result<EventPage, GatewayError>,
) -> Transition {
    if generation != session.generation || session.processed_username() != Some(&username) {
        let current = session.generation.0;
        return Transition::no_change(session).with_effect(Effect::Log {
            level: LogLevel::Warn,
            message: format!(
                "discarding page {page} for {username} from generation {} (current {current})",
                generation.0
            ),
        });
    }

    session.pending_pages.remove(&page);
    match result {
        Ok(mut fetched) => {
            fetched.page_number = page;
            let stored = session.cache.insert(&username, fetched);
            if session.view.current_event_page == page {
                session.visible_page = Some(stored);
                session.last_error = None;
            }
            Transition::no_change(session)
        }
        Err(source) => {
            let error = SessionError::Page {
                username,
                page,
                source,
            };
            session.last_error = Some(error.clone());
            Transition::new(session, vec![Effect::ReportError(error)])
        }
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
