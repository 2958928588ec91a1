//! Event evidence: records mirroring GH Archive activity-stream entries.
//!
//! Every variant flattens an [`EventCommon`] and adds its payload. The
//! `event_type` tag values are GH Archive's own event names and must not
//! change.

use serde::{Deserialize, Serialize};

use super::coerce::u64_lenient;
use super::common::EventCommon;
use super::datetime::{format_timestamp, parse_lenient, RawTimestamp};
use super::id::generate_id;
use super::identity::{GitHubActor, GitHubRepository};
use super::vocab::{EventType, IssueAction, PRAction, WorkflowConclusion};

/// Build the common block once the ID parts are known.
///
/// `when` is parsed first so it can take part in the ID.
fn common<'a>(
    prefix: &str,
    when: impl Into<RawTimestamp<'a>>,
    who: GitHubActor,
    repository: GitHubRepository,
    parts: &[&str],
) -> EventCommon {
    let when = parse_lenient(when);
    let stamp = format_timestamp(&when);
    let id = generate_id(
        prefix,
        std::iter::once(repository.full_name.as_str())
            .chain(parts.iter().copied())
            .chain(std::iter::once(stamp.as_str())),
    );
    EventCommon::new(id, when, who, repository)
}

/// A commit as listed in a push payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInPush {
    pub sha: String,
    pub message: String,
    pub author_name: String,
    pub author_email: String,
}

/// Kind of git ref created or deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefType {
    Branch,
    Tag,
    Repository,
}

impl std::fmt::Display for RefType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RefType::Branch => write!(f, "branch"),
            RefType::Tag => write!(f, "tag"),
            RefType::Repository => write!(f, "repository"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEvent {
    #[serde(flatten)]
    pub common: EventCommon,
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub before_sha: String,
    pub after_sha: String,
    /// Number of commits GH Archive reports (may exceed `commits.len()`)
    #[serde(deserialize_with = "u64_lenient")]
    pub size: u64,
    #[serde(default)]
    pub commits: Vec<CommitInPush>,
    #[serde(default)]
    pub is_force_push: bool,
}

impl PushEvent {
    pub const ID_PREFIX: &'static str = "push";

    pub fn new<'a>(
        when: impl Into<RawTimestamp<'a>>,
        who: GitHubActor,
        repository: GitHubRepository,
        ref_name: impl Into<String>,
        before_sha: impl Into<String>,
        after_sha: impl Into<String>,
        commits: Vec<CommitInPush>,
    ) -> Self {
        let ref_name = ref_name.into();
        let before_sha = before_sha.into();
        let after_sha = after_sha.into();
        Self {
            common: common(
                Self::ID_PREFIX,
                when,
                who,
                repository,
                &[&ref_name, &before_sha, &after_sha],
            ),
            ref_name,
            before_sha,
            after_sha,
            size: commits.len() as u64,
            commits,
            is_force_push: false,
        }
    }

    /// Mark the push as history-rewriting
    pub fn with_force_push(mut self, forced: bool) -> Self {
        self.is_force_push = forced;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestEvent {
    #[serde(flatten)]
    pub common: EventCommon,
    pub action: PRAction,
    #[serde(deserialize_with = "u64_lenient")]
    pub pr_number: u64,
    pub pr_title: String,
    #[serde(default)]
    pub pr_body: Option<String>,
    #[serde(default)]
    pub head_sha: Option<String>,
    #[serde(default)]
    pub merged: bool,
}

impl PullRequestEvent {
    pub const ID_PREFIX: &'static str = "pr";

    pub fn new<'a>(
        when: impl Into<RawTimestamp<'a>>,
        who: GitHubActor,
        repository: GitHubRepository,
        action: impl Into<PRAction>,
        pr_number: u64,
        pr_title: impl Into<String>,
    ) -> Self {
        let action = action.into();
        let number = pr_number.to_string();
        Self {
            common: common(Self::ID_PREFIX, when, who, repository, &[&number, action.as_str()]),
            action,
            pr_number,
            pr_title: pr_title.into(),
            pr_body: None,
            head_sha: None,
            merged: false,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.pr_body = Some(body.into());
        self
    }

    pub fn with_head(mut self, head_sha: impl Into<String>, merged: bool) -> Self {
        self.head_sha = Some(head_sha.into());
        self.merged = merged;
        self
    }
}

/// Tagged `issues` to match GH Archive's `IssuesEvent`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueEvent {
    #[serde(flatten)]
    pub common: EventCommon,
    pub action: IssueAction,
    #[serde(deserialize_with = "u64_lenient")]
    pub issue_number: u64,
    pub issue_title: String,
    #[serde(default)]
    pub issue_body: Option<String>,
}

impl IssueEvent {
    pub const ID_PREFIX: &'static str = "issue-event";

    pub fn new<'a>(
        when: impl Into<RawTimestamp<'a>>,
        who: GitHubActor,
        repository: GitHubRepository,
        action: impl Into<IssueAction>,
        issue_number: u64,
        issue_title: impl Into<String>,
        issue_body: Option<String>,
    ) -> Self {
        let action = action.into();
        let number = issue_number.to_string();
        Self {
            common: common(Self::ID_PREFIX, when, who, repository, &[&number, action.as_str()]),
            action,
            issue_number,
            issue_title: issue_title.into(),
            issue_body,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCommentEvent {
    #[serde(flatten)]
    pub common: EventCommon,
    pub action: String,
    #[serde(deserialize_with = "u64_lenient")]
    pub issue_number: u64,
    #[serde(deserialize_with = "u64_lenient")]
    pub comment_id: u64,
    pub comment_body: String,
}

impl IssueCommentEvent {
    pub const ID_PREFIX: &'static str = "comment";

    pub fn new<'a>(
        when: impl Into<RawTimestamp<'a>>,
        who: GitHubActor,
        repository: GitHubRepository,
        action: impl Into<String>,
        issue_number: u64,
        comment_id: u64,
        comment_body: impl Into<String>,
    ) -> Self {
        let action = action.into();
        let number = issue_number.to_string();
        let comment = comment_id.to_string();
        Self {
            common: common(
                Self::ID_PREFIX,
                when,
                who,
                repository,
                &[&number, &comment, &action],
            ),
            action,
            issue_number,
            comment_id,
            comment_body: comment_body.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEvent {
    #[serde(flatten)]
    pub common: EventCommon,
    pub ref_type: RefType,
    /// Absent when the repository itself was created
    #[serde(default)]
    pub ref_name: Option<String>,
}

impl CreateEvent {
    pub const ID_PREFIX: &'static str = "create";

    pub fn new<'a>(
        when: impl Into<RawTimestamp<'a>>,
        who: GitHubActor,
        repository: GitHubRepository,
        ref_type: RefType,
        ref_name: Option<String>,
    ) -> Self {
        let kind = ref_type.to_string();
        let name = ref_name.clone().unwrap_or_default();
        Self {
            common: common(Self::ID_PREFIX, when, who, repository, &[&kind, &name]),
            ref_type,
            ref_name,
        }
    }
}

/// Deleted refs are a common trace of history tampering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteEvent {
    #[serde(flatten)]
    pub common: EventCommon,
    pub ref_type: RefType,
    pub ref_name: String,
}

impl DeleteEvent {
    pub const ID_PREFIX: &'static str = "delete";

    pub fn new<'a>(
        when: impl Into<RawTimestamp<'a>>,
        who: GitHubActor,
        repository: GitHubRepository,
        ref_type: RefType,
        ref_name: impl Into<String>,
    ) -> Self {
        let ref_name = ref_name.into();
        let kind = ref_type.to_string();
        Self {
            common: common(Self::ID_PREFIX, when, who, repository, &[&kind, &ref_name]),
            ref_type,
            ref_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkEvent {
    #[serde(flatten)]
    pub common: EventCommon,
    /// The newly created fork, `owner/name`
    pub fork_full_name: String,
}

impl ForkEvent {
    pub const ID_PREFIX: &'static str = "fork-event";

    pub fn new<'a>(
        when: impl Into<RawTimestamp<'a>>,
        who: GitHubActor,
        repository: GitHubRepository,
        fork_full_name: impl Into<String>,
    ) -> Self {
        let fork_full_name = fork_full_name.into();
        Self {
            common: common(Self::ID_PREFIX, when, who, repository, &[&fork_full_name]),
            fork_full_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRunEvent {
    #[serde(flatten)]
    pub common: EventCommon,
    pub action: String,
    pub workflow_name: String,
    pub head_sha: String,
    /// Absent until the run completes
    #[serde(default)]
    pub conclusion: Option<WorkflowConclusion>,
}

impl WorkflowRunEvent {
    pub const ID_PREFIX: &'static str = "workflow";

    pub fn new<'a>(
        when: impl Into<RawTimestamp<'a>>,
        who: GitHubActor,
        repository: GitHubRepository,
        action: impl Into<String>,
        workflow_name: impl Into<String>,
        head_sha: impl Into<String>,
        conclusion: Option<WorkflowConclusion>,
    ) -> Self {
        let action = action.into();
        let workflow_name = workflow_name.into();
        let head_sha = head_sha.into();
        Self {
            common: common(
                Self::ID_PREFIX,
                when,
                who,
                repository,
                &[&workflow_name, &head_sha, &action],
            ),
            action,
            workflow_name,
            head_sha,
            conclusion,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseEvent {
    #[serde(flatten)]
    pub common: EventCommon,
    pub action: String,
    pub tag_name: String,
    #[serde(default)]
    pub release_name: Option<String>,
    #[serde(default)]
    pub release_body: Option<String>,
}

impl ReleaseEvent {
    pub const ID_PREFIX: &'static str = "release-event";

    pub fn new<'a>(
        when: impl Into<RawTimestamp<'a>>,
        who: GitHubActor,
        repository: GitHubRepository,
        action: impl Into<String>,
        tag_name: impl Into<String>,
    ) -> Self {
        let action = action.into();
        let tag_name = tag_name.into();
        Self {
            common: common(Self::ID_PREFIX, when, who, repository, &[&tag_name, &action]),
            action,
            tag_name,
            release_name: None,
            release_body: None,
        }
    }

    pub fn with_release_text(mut self, name: Option<String>, body: Option<String>) -> Self {
        self.release_name = name;
        self.release_body = body;
        self
    }
}

/// A star. GH Archive calls it `WatchEvent` with action `started`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchEvent {
    #[serde(flatten)]
    pub common: EventCommon,
    #[serde(default = "default_watch_action")]
    pub action: String,
}

fn default_watch_action() -> String {
    "started".to_string()
}

impl WatchEvent {
    pub const ID_PREFIX: &'static str = "watch";

    pub fn new<'a>(
        when: impl Into<RawTimestamp<'a>>,
        who: GitHubActor,
        repository: GitHubRepository,
    ) -> Self {
        let login = who.login.clone();
        Self {
            common: common(Self::ID_PREFIX, when, who, repository, &[&login]),
            action: default_watch_action(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberEvent {
    #[serde(flatten)]
    pub common: EventCommon,
    pub action: String,
    /// The collaborator added or removed
    pub member: GitHubActor,
}

impl MemberEvent {
    pub const ID_PREFIX: &'static str = "member";

    pub fn new<'a>(
        when: impl Into<RawTimestamp<'a>>,
        who: GitHubActor,
        repository: GitHubRepository,
        action: impl Into<String>,
        member: GitHubActor,
    ) -> Self {
        let action = action.into();
        let login = member.login.clone();
        Self {
            common: common(Self::ID_PREFIX, when, who, repository, &[&login, &action]),
            action,
            member,
        }
    }
}

/// A private repository was made public
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicEvent {
    #[serde(flatten)]
    pub common: EventCommon,
}

impl PublicEvent {
    pub const ID_PREFIX: &'static str = "public";

    pub fn new<'a>(
        when: impl Into<RawTimestamp<'a>>,
        who: GitHubActor,
        repository: GitHubRepository,
    ) -> Self {
        Self {
            common: common(Self::ID_PREFIX, when, who, repository, &[]),
        }
    }
}

/// Any event variant, tagged by `event_type`
///
/// Only serialization is derived. Records are read back through
/// [`Registry`](super::loader::Registry), which dispatches on the tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event_type")]
pub enum Event {
    #[serde(rename = "push")]
    Push(PushEvent),
    #[serde(rename = "pull_request")]
    PullRequest(PullRequestEvent),
    #[serde(rename = "issues")]
    Issue(IssueEvent),
    #[serde(rename = "issue_comment")]
    IssueComment(IssueCommentEvent),
    #[serde(rename = "create")]
    Create(CreateEvent),
    #[serde(rename = "delete")]
    Delete(DeleteEvent),
    #[serde(rename = "fork")]
    Fork(ForkEvent),
    #[serde(rename = "workflow_run")]
    WorkflowRun(WorkflowRunEvent),
    #[serde(rename = "release")]
    Release(ReleaseEvent),
    #[serde(rename = "watch")]
    Watch(WatchEvent),
    #[serde(rename = "member")]
    Member(MemberEvent),
    #[serde(rename = "public")]
    Public(PublicEvent),
}

impl Event {
    pub fn kind(&self) -> EventType {
        match self {
            Event::Push(_) => EventType::Push,
            Event::PullRequest(_) => EventType::PullRequest,
            Event::Issue(_) => EventType::Issues,
            Event::IssueComment(_) => EventType::IssueComment,
            Event::Create(_) => EventType::Create,
            Event::Delete(_) => EventType::Delete,
            Event::Fork(_) => EventType::Fork,
            Event::WorkflowRun(_) => EventType::WorkflowRun,
            Event::Release(_) => EventType::Release,
            Event::Watch(_) => EventType::Watch,
            Event::Member(_) => EventType::Member,
            Event::Public(_) => EventType::Public,
        }
    }

    /// The `event_type` tag this variant serializes with
    pub fn event_type(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Prefix of this variant's evidence IDs
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Event::Push(_) => PushEvent::ID_PREFIX,
            Event::PullRequest(_) => PullRequestEvent::ID_PREFIX,
            Event::Issue(_) => IssueEvent::ID_PREFIX,
            Event::IssueComment(_) => IssueCommentEvent::ID_PREFIX,
            Event::Create(_) => CreateEvent::ID_PREFIX,
            Event::Delete(_) => DeleteEvent::ID_PREFIX,
            Event::Fork(_) => ForkEvent::ID_PREFIX,
            Event::WorkflowRun(_) => WorkflowRunEvent::ID_PREFIX,
            Event::Release(_) => ReleaseEvent::ID_PREFIX,
            Event::Watch(_) => WatchEvent::ID_PREFIX,
            Event::Member(_) => MemberEvent::ID_PREFIX,
            Event::Public(_) => PublicEvent::ID_PREFIX,
        }
    }

    pub fn common(&self) -> &EventCommon {
        match self {
            Event::Push(e) => &e.common,
            Event::PullRequest(e) => &e.common,
            Event::Issue(e) => &e.common,
            Event::IssueComment(e) => &e.common,
            Event::Create(e) => &e.common,
            Event::Delete(e) => &e.common,
            Event::Fork(e) => &e.common,
            Event::WorkflowRun(e) => &e.common,
            Event::Release(e) => &e.common,
            Event::Watch(e) => &e.common,
            Event::Member(e) => &e.common,
            Event::Public(e) => &e.common,
        }
    }

    pub fn evidence_id(&self) -> &str {
        &self.common().evidence_id
    }

    /// Every repository record carried by this event
    pub fn repositories(&self) -> Vec<&GitHubRepository> {
        vec![&self.common().repository]
    }
}
