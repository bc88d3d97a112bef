//! Plain-text rendering of the session state.

use chrono::{DateTime, Utc};
use client_core::{
    resolve,
    resolver::describe_age,
    state::{Session, Tab},
};
use shared::{domain::Event, protocol::StatsResponse};

pub fn session(session: &Session, now: DateTime<Utc>) -> String {
    let Some(profile) = &session.profile else {
        return if session.view.processing {
            "loading...".to_string()
        } else {
            "no user loaded".to_string()
        };
    };

    let mut lines = vec![
        format!("{} ({})", profile.username, profile.profile_url),
        format!(
            "{} events, {} repositories",
            profile.event_count,
            profile.repos.len()
        ),
    ];

    match session.view.current_tab {
        Tab::Hidden => {}
        Tab::RepoList => {
            lines.push(String::new());
            for repo in &profile.repos {
                lines.push(format!("  {}", repo.name().unwrap_or("<unnamed>")));
            }
        }
        Tab::EventList => {
            lines.push(String::new());
            if !session.view.has_results {
                lines.push("  no events".to_string());
            } else {
                if session.view.multiple_event_pages {
                    lines.push(format!(
                        "page {} of {}",
                        session.view.current_event_page, session.view.event_page_count
                    ));
                }
                if session.is_page_loading() {
                    lines.push(format!(
                        "  loading page {}...",
                        session.view.current_event_page
                    ));
                }
                lines.extend(session.events().iter().map(|event| event_line(event, now)));
            }
        }
    }

    lines.join("\n")
}

fn event_line(event: &Event, now: DateTime<Utc>) -> String {
    let display = resolve(&event.kind);
    let age = event
        .created_at()
        .map(|ts| describe_age(ts, now))
        .unwrap_or_default();
    format!(
        "  [{}] {:<24} {:<32} {}",
        display.icon,
        display.label,
        event.repo_name().unwrap_or("-"),
        age
    )
    .trim_end()
    .to_string()
}

pub fn stats(stats: &StatsResponse) -> String {
    format!(
        "{} events recorded, latest at {} ({}s ago)",
        stats.event_count,
        stats.latest_event.to_rfc3339(),
        stats.latest_event_age
    )
}
