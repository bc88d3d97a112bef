//! Display metadata for event type tags.

use chrono::{DateTime, Utc};

/// Octicon shown for tags outside the known table.
pub const UNKNOWN_EVENT_ICON: &str = "question";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    Gollum,
    Issues,
    Push,
    CommitComment,
    Release,
    Public,
    Member,
    IssueComment,
    /// Tag missing from the table, kept verbatim.
    Unknown(String),
}

impl EventKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "GollumEvent" => Self::Gollum,
            "IssuesEvent" => Self::Issues,
            "PushEvent" => Self::Push,
            "CommitCommentEvent" => Self::CommitComment,
            "ReleaseEvent" => Self::Release,
            "PublicEvent" => Self::Public,
            "MemberEvent" => Self::Member,
            "IssueCommentEvent" => Self::IssueComment,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Gollum => "book",
            Self::Issues => "issue-opened",
            Self::Push => "repo-push",
            Self::CommitComment => "comment",
            Self::Release => "tag",
            Self::Public => "megaphone",
            Self::Member => "person",
            Self::IssueComment => "comment-discussion",
            Self::Unknown(_) => UNKNOWN_EVENT_ICON,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Gollum => "Wiki".to_string(),
            Self::Issues => "Issue".to_string(),
            Self::Push => "Push".to_string(),
            Self::CommitComment => "Commit Comment".to_string(),
            Self::Release => "Release".to_string(),
            Self::Public => "Repository made public".to_string(),
            Self::Member => "Membership change".to_string(),
            Self::IssueComment => "Issue comment".to_string(),
            Self::Unknown(tag) => format!("Unknown event ({tag})"),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDisplay {
    pub kind: EventKind,
    pub icon: &'static str,
    pub label: String,
}

/// Icon and label for a raw tag. Unknown tags resolve to
/// [`UNKNOWN_EVENT_ICON`] with a label naming the tag.
pub fn resolve(tag: &str) -> EventDisplay {
    let kind = EventKind::from_tag(tag);
    EventDisplay {
        icon: kind.icon(),
        label: kind.label(),
        kind,
    }
}

/// Coarse "time ago" text for an event timestamp.
pub fn describe_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(created_at);
    if elapsed.num_seconds() < 45 {
        return "a few seconds ago".to_string();
    }
    let (amount, unit) = if elapsed.num_minutes() < 60 {
        (elapsed.num_minutes().max(1), "minute")
    } else if elapsed.num_hours() < 24 {
        (elapsed.num_hours(), "hour")
    } else if elapsed.num_days() < 30 {
        (elapsed.num_days(), "day")
    } else if elapsed.num_days() < 365 {
        (elapsed.num_days() / 30, "month")
    } else {
        (elapsed.num_days() / 365, "year")
    };
    if amount == 1 {
        let article = if unit == "hour" { "an" } else { "a" };
        format!("{article} {unit} ago")
    } else {
        format!("{amount} {unit}s ago")
    }
}

#[cfg(test)]
#[path = "tests/resolver_tests.rs"]
mod tests;
