//! Offline integrity checks for loaded evidence.
//!
//! These checks only use the record itself: ID shape, repository naming and
//! values derived from content the record carries. Re-fetching from the
//! original source belongs to the collectors.

use super::common::VerificationResult;
use super::events::Event;
use super::id::{compute_hash, ID_HASH_LEN};
use super::observations::Observation;
use super::types::Evidence;

/// Run every applicable check against `evidence`
pub fn verify(evidence: &Evidence) -> VerificationResult {
    let mut errors = Vec::new();

    let prefix = match evidence {
        Evidence::Event(event) => event.id_prefix(),
        Evidence::Observation(observation) => observation.id_prefix(),
    };
    check_id(evidence.evidence_id(), prefix, &mut errors);

    for repo in evidence.repositories() {
        if !repo.is_consistent() {
            errors.push(format!(
                "repository full_name {:?} does not match owner {:?} / name {:?}",
                repo.full_name, repo.owner, repo.name
            ));
        }
    }

    match evidence {
        Evidence::Event(event) => check_event(event, &mut errors),
        Evidence::Observation(observation) => check_observation(observation, &mut errors),
    }

    VerificationResult::from_errors(evidence.evidence_id(), errors)
}

fn check_id(id: &str, prefix: &str, errors: &mut Vec<String>) {
    let hash = id
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'));
    let well_formed = hash.is_some_and(|hash| {
        hash.len() == ID_HASH_LEN && hash.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
    });
    if !well_formed {
        errors.push(format!(
            "evidence_id {:?} is not of the form {}-<{} hex chars>",
            id, prefix, ID_HASH_LEN
        ));
    }
}

fn check_event(event: &Event, errors: &mut Vec<String>) {
    if let Event::Push(push) = event {
        if (push.commits.len() as u64) > push.size {
            errors.push(format!(
                "push lists {} commits but reports size {}",
                push.commits.len(),
                push.size
            ));
        }
    }
}

fn check_observation(observation: &Observation, errors: &mut Vec<String>) {
    match observation {
        Observation::File(file) => {
            if let Some(content) = &file.content {
                let expected = compute_hash(content.as_bytes());
                if file.content_hash.as_deref() != Some(expected.as_str()) {
                    errors.push(format!(
                        "content_hash {:?} does not match content ({})",
                        file.content_hash, expected
                    ));
                }
                if file.size != Some(content.len() as u64) {
                    errors.push(format!(
                        "size {:?} does not match content length {}",
                        file.size,
                        content.len()
                    ));
                }
            }
        }
        Observation::Snapshot(snapshot) => {
            for capture in &snapshot.snapshots {
                if capture.original_url != snapshot.original_url {
                    errors.push(format!(
                        "listed capture of {:?} does not belong to {:?}",
                        capture.original_url, snapshot.original_url
                    ));
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::common::EvidenceSource;
    use crate::evidence::events::{CommitInPush, PushEvent, WatchEvent};
    use crate::evidence::identity::{make_actor, make_repo};
    use crate::evidence::observations::{FileObservation, SnapshotObservation, WaybackSnapshot};

    fn watch() -> Evidence {
        Event::Watch(WatchEvent::new(
            "2024-01-15T10:30:00Z",
            make_actor("octocat", None),
            make_repo("octocat", "Hello-World"),
        ))
        .into()
    }

    fn file() -> FileObservation {
        FileObservation::new(
            EvidenceSource::Git,
            make_repo("octocat", "Hello-World"),
            "README.md",
            None,
            Some("hello".to_string()),
        )
    }

    #[test]
    fn test_constructed_evidence_verifies() {
        let result = verify(&watch());
        assert!(result.is_valid, "{:?}", result.errors);
        assert_eq!(result.evidence_id, watch().evidence_id());

        let result = verify(&Observation::File(file()).into());
        assert!(result.is_valid, "{:?}", result.errors);
    }

    #[test]
    fn test_wrong_id_prefix() {
        let Evidence::Event(Event::Watch(mut event)) = watch() else {
            panic!("expected watch event");
        };
        event.common.evidence_id = "push-0123456789ab".to_string();
        let result = verify(&Event::Watch(event).into());
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("watch-"));
    }

    #[test]
    fn test_short_or_uppercase_hash() {
        let mut errors = Vec::new();
        check_id("commit-ABC", "commit", &mut errors);
        check_id("commit-0123456789AB", "commit", &mut errors);
        check_id("commit", "commit", &mut errors);
        assert_eq!(errors.len(), 3);

        let mut errors = Vec::new();
        check_id("issue-event-0123456789ab", "issue-event", &mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_tampered_file_content() {
        let mut tampered = file();
        tampered.content = Some("hello, world".to_string());
        let result = verify(&Observation::File(tampered).into());
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_push_size_smaller_than_commit_list() {
        let mut push = PushEvent::new(
            "2024-01-15T10:30:00Z",
            make_actor("octocat", None),
            make_repo("octocat", "Hello-World"),
            "refs/heads/main",
            "a".repeat(40),
            "b".repeat(40),
            vec![CommitInPush {
                sha: "b".repeat(40),
                message: "Update".to_string(),
                author_name: "Octo Cat".to_string(),
                author_email: "octocat@github.com".to_string(),
            }],
        );
        assert!(verify(&Event::Push(push.clone()).into()).is_valid);

        push.size = 0;
        assert!(!verify(&Event::Push(push).into()).is_valid);
    }

    #[test]
    fn test_snapshot_listing_must_match_url() {
        let capture = WaybackSnapshot::from_cdx("20240115103000", "https://example.com/a");
        let stranger = WaybackSnapshot::from_cdx("20240115103000", "https://example.com/b");
        let (capture, stranger) = (capture.unwrap(), stranger.unwrap());
        let observation = SnapshotObservation::from_snapshot(&capture);

        let ok = observation.clone().with_snapshots(vec![capture]);
        assert!(verify(&Observation::Snapshot(ok).into()).is_valid);

        let bad = observation.with_snapshots(vec![stranger]);
        assert!(!verify(&Observation::Snapshot(bad).into()).is_valid);
    }

    #[test]
    fn test_inconsistent_repository_reported() {
        let Evidence::Event(Event::Watch(mut event)) = watch() else {
            panic!("expected watch event");
        };
        event.common.repository.full_name = "mallory/Hello-World".to_string();
        let result = verify(&Event::Watch(event).into());
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.contains("mallory/Hello-World")));
    }
}
