//! Evidence type system for GitHub forensics
//!
//! Evidence comes in two families:
//!
//! - **Events** mirror GH Archive activity-stream entries (pushes, pull
//!   requests, stars, ...), tagged by `event_type`.
//! - **Observations** are facts checked directly against an authoritative
//!   source (API, local clone, web archive), tagged by `observation_type`.
//!
//! # Design Principles
//!
//! - **Deterministic IDs**: the same evidence collected twice gets the same
//!   ID (`{prefix}-{sha256[0:12]}`).
//! - **Trust-aware timestamps**: GH Archive data is parsed leniently, API and
//!   git data strictly.
//! - **One way in**: persisted records are read back through
//!   [`loader::Registry`], never by deserializing a variant directly.
//!
//! # Example
//!
//! ```ignore
//! use gh_evidence::evidence::{load_evidence, Evidence, Event};
//!
//! let evidence = load_evidence(record)?;
//! if let Evidence::Event(Event::Push(push)) = &evidence {
//!     println!("{} pushed {} commits", push.common.who.login, push.size);
//! }
//! ```

pub mod coerce;
pub mod common;
pub mod datetime;
pub mod events;
pub mod id;
pub mod identity;
pub mod loader;
pub mod observations;
pub mod types;
pub mod verify;
pub mod vocab;

pub use common::{
    EventCommon, EvidenceSource, ObservationCommon, VerificationInfo, VerificationResult,
};
pub use datetime::{
    format_timestamp, parse_lenient, parse_lenient_with, parse_strict, Clock, FixedClock,
    RawTimestamp, SystemClock,
};
pub use events::{
    CommitInPush, CreateEvent, DeleteEvent, Event, ForkEvent, IssueCommentEvent, IssueEvent,
    MemberEvent, PublicEvent, PullRequestEvent, PushEvent, RefType, ReleaseEvent, WatchEvent,
    WorkflowRunEvent,
};
pub use id::{compute_hash, generate_id};
pub use identity::{
    make_actor, make_repo, make_repo_from_full_name, GitHubActor, GitHubRepository,
};
pub use loader::{builtin_registry, load_evidence, LoaderOptions, Registry};
pub use observations::{
    ArticleObservation, BranchObservation, CommitAuthor, CommitObservation, FileChange,
    FileObservation, ForkObservation, IOCObservation, IOCType, IssueObservation, IssueState,
    Observation, ReleaseObservation, SnapshotObservation, TagObservation, WaybackSnapshot,
};
pub use types::{Evidence, Family, EVENT_TYPE_KEY, OBSERVATION_TYPE_KEY};
pub use vocab::{EventType, IssueAction, PRAction, WorkflowConclusion};
