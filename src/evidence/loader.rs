//! Loading typed evidence from untyped JSON records.
//!
//! A [`Registry`] maps each discriminator value to the parser of its variant.
//! It is built once (usually with [`Registry::builtin`]) and handed to
//! whatever needs to load records; there is no global table.
//!
//! Dispatch order: `event_type` if present, else `observation_type`, else the
//! record is rejected.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde_json::Value;
use tracing::debug;

use super::events::Event;
use super::observations::Observation;
use super::types::{Evidence, Family, EVENT_TYPE_KEY, OBSERVATION_TYPE_KEY};
use super::vocab::EventType;
use crate::error::SchemaError;

/// Parses a record already known to carry a given `event_type`
pub type EventParser = fn(Value) -> Result<Event, serde_json::Error>;

/// Parses a record already known to carry a given `observation_type`
pub type ObservationParser = fn(Value) -> Result<Observation, serde_json::Error>;

/// Knobs for record validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Reject repositories whose `full_name` disagrees with `owner`/`name`
    pub verify_repository_names: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            verify_repository_names: true,
        }
    }
}

/// Discriminator → variant parser tables
#[derive(Debug, Clone)]
pub struct Registry {
    events: BTreeMap<&'static str, EventParser>,
    observations: BTreeMap<&'static str, ObservationParser>,
    options: LoaderOptions,
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Registry {
    /// A registry with no variants registered
    pub fn empty(options: LoaderOptions) -> Self {
        Self {
            events: BTreeMap::new(),
            observations: BTreeMap::new(),
            options,
        }
    }

    /// All built-in variants with default options
    pub fn builtin() -> Self {
        Self::with_options(LoaderOptions::default())
    }

    /// All built-in variants
    pub fn with_options(options: LoaderOptions) -> Self {
        use serde_json::from_value;

        let mut registry = Self::empty(options);
        registry
            .register_event(EventType::Push.as_str(), |v| from_value(v).map(Event::Push))
            .register_event(EventType::PullRequest.as_str(), |v| {
                from_value(v).map(Event::PullRequest)
            })
            .register_event(EventType::Issues.as_str(), |v| from_value(v).map(Event::Issue))
            .register_event(EventType::IssueComment.as_str(), |v| {
                from_value(v).map(Event::IssueComment)
            })
            .register_event(EventType::Create.as_str(), |v| from_value(v).map(Event::Create))
            .register_event(EventType::Delete.as_str(), |v| from_value(v).map(Event::Delete))
            .register_event(EventType::Fork.as_str(), |v| from_value(v).map(Event::Fork))
            .register_event(EventType::WorkflowRun.as_str(), |v| {
                from_value(v).map(Event::WorkflowRun)
            })
            .register_event(EventType::Release.as_str(), |v| from_value(v).map(Event::Release))
            .register_event(EventType::Watch.as_str(), |v| from_value(v).map(Event::Watch))
            .register_event(EventType::Member.as_str(), |v| from_value(v).map(Event::Member))
            .register_event(EventType::Public.as_str(), |v| from_value(v).map(Event::Public));

        registry
            .register_observation("commit", |v| from_value(v).map(Observation::Commit))
            .register_observation("issue", |v| from_value(v).map(Observation::Issue))
            .register_observation("file", |v| from_value(v).map(Observation::File))
            .register_observation("fork", |v| from_value(v).map(Observation::Fork))
            .register_observation("branch", |v| from_value(v).map(Observation::Branch))
            .register_observation("tag", |v| from_value(v).map(Observation::Tag))
            .register_observation("release", |v| from_value(v).map(Observation::Release))
            .register_observation("snapshot", |v| from_value(v).map(Observation::Snapshot))
            .register_observation("ioc", |v| from_value(v).map(Observation::IOC))
            .register_observation("article", |v| from_value(v).map(Observation::Article));

        registry
    }

    /// Add or replace the parser for an `event_type` value
    pub fn register_event(&mut self, tag: &'static str, parser: EventParser) -> &mut Self {
        self.events.insert(tag, parser);
        self
    }

    /// Add or replace the parser for an `observation_type` value
    pub fn register_observation(
        &mut self,
        tag: &'static str,
        parser: ObservationParser,
    ) -> &mut Self {
        self.observations.insert(tag, parser);
        self
    }

    pub fn options(&self) -> LoaderOptions {
        self.options
    }

    /// Registered `event_type` values, sorted
    pub fn event_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.events.keys().copied()
    }

    /// Registered `observation_type` values, sorted
    pub fn observation_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.observations.keys().copied()
    }

    /// Validate one record and return the concrete variant it describes.
    ///
    /// All-or-nothing: any failure returns a [`SchemaError`] and no partial
    /// value.
    pub fn load(&self, record: Value) -> Result<Evidence, SchemaError> {
        let (family, tag) = discriminator(&record)?;
        let key = family.discriminator_key();
        debug!(%family, tag = %tag, "Loading evidence record");

        let parsed = match family {
            Family::Event => {
                let parser = self.events.get(tag.as_str()).ok_or_else(|| unknown(key, &tag))?;
                parser(record).map(Evidence::Event)
            }
            Family::Observation => {
                let parser = self
                    .observations
                    .get(tag.as_str())
                    .ok_or_else(|| unknown(key, &tag))?;
                parser(record).map(Evidence::Observation)
            }
        };

        let evidence = parsed.map_err(|source| SchemaError::Invalid {
            key,
            value: tag.clone(),
            source,
        })?;

        if self.options.verify_repository_names {
            if let Some(repo) = evidence.repositories().into_iter().find(|r| !r.is_consistent()) {
                return Err(SchemaError::InconsistentRepository {
                    key,
                    value: tag,
                    owner: repo.owner.clone(),
                    name: repo.name.clone(),
                    full_name: repo.full_name.clone(),
                });
            }
        }

        Ok(evidence)
    }

    /// Parse a JSON document holding one record, then [`load`](Self::load) it
    pub fn load_json(&self, text: &str) -> Result<Evidence, SchemaError> {
        let record: Value = serde_json::from_str(text)?;
        self.load(record)
    }

    /// Load every non-blank line of a JSONL document.
    ///
    /// Yields `(line_number, result)` with 1-based line numbers so one bad
    /// line does not hide the others.
    pub fn load_jsonl<'a>(
        &'a self,
        text: &'a str,
    ) -> impl Iterator<Item = (usize, Result<Evidence, SchemaError>)> + 'a {
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(move |(idx, line)| (idx + 1, self.load_json(line)))
    }
}

/// Built-in registry behind [`load_evidence`], built on first use and never
/// modified afterwards
static BUILTIN: OnceLock<Registry> = OnceLock::new();

/// The built-in registry with default options, shared across calls
pub fn builtin_registry() -> &'static Registry {
    BUILTIN.get_or_init(Registry::builtin)
}

/// Load one record with the built-in registry.
///
/// Callers that need non-default [`LoaderOptions`] or extra variants build
/// their own [`Registry`] and call [`Registry::load`].
pub fn load_evidence(record: Value) -> Result<Evidence, SchemaError> {
    builtin_registry().load(record)
}

/// Find the family and discriminator value of a record
fn discriminator(record: &Value) -> Result<(Family, String), SchemaError> {
    let object = record.as_object().ok_or(SchemaError::NotAnObject)?;

    let (family, raw) = if let Some(raw) = object.get(EVENT_TYPE_KEY) {
        (Family::Event, raw)
    } else if let Some(raw) = object.get(OBSERVATION_TYPE_KEY) {
        (Family::Observation, raw)
    } else {
        return Err(SchemaError::MissingDiscriminator);
    };

    match raw.as_str() {
        Some(tag) => Ok((family, tag.to_string())),
        None => Err(SchemaError::InvalidDiscriminator {
            key: family.discriminator_key(),
            found: raw.to_string(),
        }),
    }
}

fn unknown(key: &'static str, tag: &str) -> SchemaError {
    SchemaError::UnknownType {
        key,
        value: tag.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::vocab::PRAction;
    use serde_json::json;

    #[test]
    fn test_builtin_registry_is_shared() {
        let first = builtin_registry();
        let second = builtin_registry();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.event_types().count(), 12);
        assert_eq!(first.observation_types().count(), 10);
        assert!(first.options().verify_repository_names);
    }

    fn push_record() -> Value {
        json!({
            "event_type": "push",
            "evidence_id": "push-0123456789ab",
            "when": "2024-01-15T10:30:00Z",
            "who": {"login": "octocat", "id": 1},
            "repository": {"owner": "octocat", "name": "Hello-World", "full_name": "octocat/Hello-World"},
            "verification": {"source": "gharchive"},
            "ref": "refs/heads/main",
            "before_sha": "0000000000000000000000000000000000000000",
            "after_sha": "1111111111111111111111111111111111111111",
            "size": 0
        })
    }

    fn commit_record() -> Value {
        json!({
            "observation_type": "commit",
            "evidence_id": "commit-0123456789ab",
            "observed_when": "2024-02-01T00:00:00Z",
            "observed_by": "github",
            "repository": {"owner": "octocat", "name": "Hello-World", "full_name": "octocat/Hello-World"},
            "verification": {"source": "github", "url": "https://github.com/octocat/Hello-World/commit/abc"},
            "sha": "abc",
            "message": "Initial commit",
            "author": {"name": "Octo Cat", "email": "octocat@github.com", "date": "2024-01-15T10:30:00Z"},
            "committer": {"name": "Octo Cat", "email": "octocat@github.com", "date": "2024-01-15T10:30:00Z"}
        })
    }

    #[test]
    fn test_event_dispatch() {
        let evidence = load_evidence(push_record()).unwrap();
        match evidence {
            Evidence::Event(Event::Push(push)) => {
                assert_eq!(push.ref_name, "refs/heads/main");
                assert!(push.commits.is_empty());
                assert!(!push.is_force_push);
            }
            other => panic!("expected push event, got {:?}", other),
        }
    }

    #[test]
    fn test_observation_dispatch() {
        let evidence = load_evidence(commit_record()).unwrap();
        match evidence {
            Evidence::Observation(Observation::Commit(commit)) => {
                assert_eq!(commit.sha, "abc");
                assert_eq!(commit.common.original_when, None);
                assert!(commit.parents.is_empty());
            }
            other => panic!("expected commit observation, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_discriminator() {
        let err = load_evidence(json!({"sha": "abc"})).unwrap_err();
        assert!(matches!(err, SchemaError::MissingDiscriminator));
    }

    #[test]
    fn test_not_an_object() {
        let err = load_evidence(json!(["push"])).unwrap_err();
        assert!(matches!(err, SchemaError::NotAnObject));
    }

    #[test]
    fn test_non_string_discriminator() {
        let err = load_evidence(json!({"event_type": 7})).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidDiscriminator { key: "event_type", .. }
        ));
    }

    #[test]
    fn test_unknown_discriminator() {
        let err = load_evidence(json!({"event_type": "not_a_real_type"})).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownType { key: "event_type", .. }));
        assert_eq!(err.discriminator(), Some("not_a_real_type"));
        assert!(err.to_string().contains("not_a_real_type"));
    }

    #[test]
    fn test_event_type_takes_precedence() {
        let mut record = push_record();
        record["observation_type"] = json!("commit");
        let evidence = load_evidence(record).unwrap();
        assert_eq!(evidence.type_tag(), "push");
    }

    #[test]
    fn test_missing_field_names_discriminator() {
        let mut record = push_record();
        record.as_object_mut().unwrap().remove("after_sha");
        let err = load_evidence(record).unwrap_err();
        assert!(matches!(err, SchemaError::Invalid { .. }));
        assert_eq!(err.discriminator(), Some("push"));
        assert!(err.to_string().contains("after_sha"));
    }

    #[test]
    fn test_type_mismatch_rejected() {
        let mut record = push_record();
        record["size"] = json!("lots");
        assert!(load_evidence(record).is_err());

        let mut record = push_record();
        record["commits"] = json!("abc");
        assert!(load_evidence(record).is_err());
    }

    #[test]
    fn test_numeric_strings_coerced() {
        let mut record = push_record();
        record["size"] = json!("3");
        record["who"]["id"] = json!("583231");
        let evidence = load_evidence(record).unwrap();
        let Evidence::Event(Event::Push(push)) = evidence else {
            panic!("expected push event");
        };
        assert_eq!(push.size, 3);
        assert_eq!(push.common.who.id, Some(583231));
    }

    #[test]
    fn test_inconsistent_repository_rejected_by_default() {
        let mut record = push_record();
        record["repository"]["full_name"] = json!("someone/else");
        let err = load_evidence(record.clone()).unwrap_err();
        assert!(matches!(err, SchemaError::InconsistentRepository { .. }));
        assert_eq!(err.discriminator(), Some("push"));

        let permissive = Registry::with_options(LoaderOptions {
            verify_repository_names: false,
        });
        assert!(permissive.load(record).is_ok());
    }

    #[test]
    fn test_event_tags_follow_event_type() {
        let registered: Vec<_> = Registry::builtin().event_types().collect();
        let mut expected: Vec<_> = EventType::ALL.iter().map(|kind| kind.as_str()).collect();
        expected.sort_unstable();
        assert_eq!(registered, expected);
    }

    #[test]
    fn test_unknown_action_still_loads() {
        let record = json!({
            "event_type": "pull_request",
            "evidence_id": "pr-0123456789ab",
            "when": "2024-01-15T10:30:00Z",
            "who": {"login": "octocat"},
            "repository": {"owner": "octocat", "name": "Hello-World", "full_name": "octocat/Hello-World"},
            "verification": {"source": "gharchive"},
            "action": "auto_merge_enabled",
            "pr_number": "12",
            "pr_title": "Bump deps"
        });
        let Evidence::Event(Event::PullRequest(pr)) = load_evidence(record).unwrap() else {
            panic!("expected pull request event");
        };
        assert_eq!(pr.action, PRAction::Other("auto_merge_enabled".to_string()));
        assert_eq!(pr.pr_number, 12);
        assert_eq!(
            Evidence::from(Event::PullRequest(pr)).to_record().unwrap()["action"],
            "auto_merge_enabled"
        );
    }

    #[test]
    fn test_ownerless_repository_accepted() {
        let mut record = push_record();
        record["repository"] =
            json!({"owner": "unknown", "name": "Hello-World", "full_name": "Hello-World"});
        assert!(load_evidence(record).is_ok());
    }

    #[test]
    fn test_registered_types() {
        let registry = Registry::builtin();
        let events: Vec<_> = registry.event_types().collect();
        assert_eq!(events.len(), 12);
        assert!(events.contains(&"issues"));
        assert!(events.contains(&"workflow_run"));
        let observations: Vec<_> = registry.observation_types().collect();
        assert_eq!(observations.len(), 10);
        assert!(observations.contains(&"ioc"));
    }

    #[test]
    fn test_empty_registry_rejects_everything() {
        let registry = Registry::empty(LoaderOptions::default());
        let err = registry.load(push_record()).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownType { .. }));
    }

    #[test]
    fn test_load_jsonl_reports_line_numbers() {
        let text = format!(
            "{}\n\n{{\"event_type\": \"nope\"}}\nnot json\n{}\n",
            push_record(),
            commit_record()
        );
        let results: Vec<_> = Registry::builtin().load_jsonl(&text).collect();
        let lines: Vec<_> = results.iter().map(|(line, _)| *line).collect();
        assert_eq!(lines, vec![1, 3, 4, 5]);
        assert!(results[0].1.is_ok());
        assert!(matches!(results[1].1, Err(SchemaError::UnknownType { .. })));
        assert!(matches!(results[2].1, Err(SchemaError::Json(_))));
        assert!(results[3].1.is_ok());
    }
}
