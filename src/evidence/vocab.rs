//! Controlled vocabularies used by event payloads.
//!
//! GH Archive adds new action names from time to time. The action and
//! conclusion vocabularies therefore keep unknown values verbatim in an
//! `Other` case, so such records still load and serialize back unchanged.

use serde::{Deserialize, Serialize};

/// GH Archive event names, as used for the `event_type` tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Push,
    PullRequest,
    Issues,
    IssueComment,
    Create,
    Delete,
    Fork,
    WorkflowRun,
    Release,
    Watch,
    Member,
    Public,
}

impl EventType {
    pub const ALL: [EventType; 12] = [
        EventType::Push,
        EventType::PullRequest,
        EventType::Issues,
        EventType::IssueComment,
        EventType::Create,
        EventType::Delete,
        EventType::Fork,
        EventType::WorkflowRun,
        EventType::Release,
        EventType::Watch,
        EventType::Member,
        EventType::Public,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Push => "push",
            EventType::PullRequest => "pull_request",
            EventType::Issues => "issues",
            EventType::IssueComment => "issue_comment",
            EventType::Create => "create",
            EventType::Delete => "delete",
            EventType::Fork => "fork",
            EventType::WorkflowRun => "workflow_run",
            EventType::Release => "release",
            EventType::Watch => "watch",
            EventType::Member => "member",
            EventType::Public => "public",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Declares a string-backed vocabulary with an `Other(String)` catch-all.
///
/// The enum serializes as its plain string, and deserializes from any string.
macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal,)+ }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            /// A value outside the known vocabulary, kept as received
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $text,)+
                    $name::Other(value) => value.as_str(),
                }
            }

            /// Whether the value is one of the named variants
            pub fn is_known(&self) -> bool {
                !matches!(self, $name::Other(_))
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                match value {
                    $($text => $name::$variant,)+
                    other => $name::Other(other.to_string()),
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::from(value.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

vocabulary! {
    /// `action` of a `pull_request` event
    PRAction {
        Opened => "opened",
        Closed => "closed",
        Reopened => "reopened",
        Edited => "edited",
        Synchronize => "synchronize",
        Assigned => "assigned",
        Unassigned => "unassigned",
        Labeled => "labeled",
        Unlabeled => "unlabeled",
        ReviewRequested => "review_requested",
        ReviewRequestRemoved => "review_request_removed",
        ReadyForReview => "ready_for_review",
        ConvertedToDraft => "converted_to_draft",
    }
}

vocabulary! {
    /// `action` of an `issues` event
    IssueAction {
        Opened => "opened",
        Closed => "closed",
        Reopened => "reopened",
        Edited => "edited",
        Deleted => "deleted",
        Transferred => "transferred",
        Assigned => "assigned",
        Unassigned => "unassigned",
        Labeled => "labeled",
        Unlabeled => "unlabeled",
        Pinned => "pinned",
        Unpinned => "unpinned",
        Locked => "locked",
        Unlocked => "unlocked",
    }
}

vocabulary! {
    /// Final status of a completed workflow run
    WorkflowConclusion {
        Success => "success",
        Failure => "failure",
        Cancelled => "cancelled",
        Skipped => "skipped",
        TimedOut => "timed_out",
        ActionRequired => "action_required",
        Neutral => "neutral",
        Stale => "stale",
        StartupFailure => "startup_failure",
    }
}
