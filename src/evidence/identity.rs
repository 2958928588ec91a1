//! GitHub identity records: actors and repositories.

use serde::{Deserialize, Serialize};

use super::coerce::option_u64_lenient;

/// Owner used when a repository name arrives without an owner prefix
pub const UNKNOWN_OWNER: &str = "unknown";

/// A GitHub user or bot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GitHubActor {
    pub login: String,
    #[serde(default, deserialize_with = "option_u64_lenient")]
    pub id: Option<u64>,
}

/// A GitHub repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GitHubRepository {
    pub owner: String,
    pub name: String,
    pub full_name: String,
}

impl GitHubRepository {
    /// Whether this record has one of the shapes the factories produce.
    ///
    /// Either `full_name == "{owner}/{name}"`, or the owner-less form
    /// (`owner == "unknown"`, `name == full_name`).
    pub fn is_consistent(&self) -> bool {
        if self.full_name == format!("{}/{}", self.owner, self.name) {
            return true;
        }
        self.owner == UNKNOWN_OWNER && self.name == self.full_name
    }
}

impl std::fmt::Display for GitHubRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.full_name)
    }
}

pub fn make_actor(login: impl Into<String>, id: Option<u64>) -> GitHubActor {
    GitHubActor {
        login: login.into(),
        id,
    }
}

pub fn make_repo(owner: impl Into<String>, name: impl Into<String>) -> GitHubRepository {
    let owner = owner.into();
    let name = name.into();
    GitHubRepository {
        full_name: format!("{}/{}", owner, name),
        owner,
        name,
    }
}

/// Build a repository from `owner/name`.
///
/// Splits on the first `/`, so any further slashes stay in the name. Input
/// without a `/` degrades to owner `"unknown"` with the whole input as the
/// name; repository names are sometimes logged without an owner.
pub fn make_repo_from_full_name(full_name: impl Into<String>) -> GitHubRepository {
    let full_name = full_name.into();
    match full_name.split_once('/') {
        Some((owner, name)) => GitHubRepository {
            owner: owner.to_string(),
            name: name.to_string(),
            full_name,
        },
        _ => GitHubRepository {
            owner: UNKNOWN_OWNER.to_string(),
            name: full_name.clone(),
            full_name,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_actor() {
        let actor = make_actor("octocat", Some(583231));
        assert_eq!(actor.login, "octocat");
        assert_eq!(actor.id, Some(583231));
        assert_eq!(make_actor("ghost", None).id, None);
    }

    #[test]
    fn test_make_repo() {
        let repo = make_repo("octocat", "Hello-World");
        assert_eq!(repo.full_name, "octocat/Hello-World");
        assert!(repo.is_consistent());
    }

    #[test]
    fn test_repo_from_full_name_splits() {
        let repo = make_repo_from_full_name("octocat/Hello-World");
        assert_eq!(repo.owner, "octocat");
        assert_eq!(repo.name, "Hello-World");
        assert_eq!(repo, make_repo("octocat", "Hello-World"));
    }

    #[test]
    fn test_repo_from_full_name_without_owner() {
        let repo = make_repo_from_full_name("no-slash-here");
        assert_eq!(repo.owner, "unknown");
        assert_eq!(repo.name, "no-slash-here");
        assert_eq!(repo.full_name, "no-slash-here");
        assert!(repo.is_consistent());
    }

    #[test]
    fn test_repo_from_full_name_with_extra_slashes() {
        let repo = make_repo_from_full_name("a/b/c");
        assert_eq!(repo.owner, "a");
        assert_eq!(repo.name, "b/c");
        assert_eq!(repo.full_name, "a/b/c");
        assert!(repo.is_consistent());
    }

    #[test]
    fn test_inconsistent_repo() {
        let repo = GitHubRepository {
            owner: "octocat".to_string(),
            name: "Hello-World".to_string(),
            full_name: "someone/else".to_string(),
        };
        assert!(!repo.is_consistent());
    }

    #[test]
    fn test_actor_id_accepts_string() {
        let actor: GitHubActor =
            serde_json::from_value(serde_json::json!({"login": "octocat", "id": "583231"}))
                .unwrap();
        assert_eq!(actor.id, Some(583231));
    }
}
