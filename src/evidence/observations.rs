//! Observation evidence: facts verified directly against an authoritative
//! source (GitHub API, a local clone, the Wayback Machine, vendor reports).
//!
//! Observations are higher-trust than events, so their timestamps go through
//! the strict parser and a malformed value is an error.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::coerce::{option_u64_lenient, u64_lenient};
use super::common::{EvidenceSource, ObservationCommon, VerificationInfo};
use super::datetime::{parse_strict, serde_timestamp, RawTimestamp};
use super::id::{compute_hash, generate_id};
use super::identity::{GitHubActor, GitHubRepository};
use crate::error::ParseError;

/// Author or committer signature of a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
    #[serde(with = "serde_timestamp")]
    pub date: DateTime<Utc>,
}

/// One file touched by a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub filename: String,
    /// `added`, `modified`, `removed`, `renamed`, ...
    pub status: String,
    #[serde(default, deserialize_with = "u64_lenient")]
    pub additions: u64,
    #[serde(default, deserialize_with = "u64_lenient")]
    pub deletions: u64,
    #[serde(default)]
    pub patch: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueState {
    Open,
    Closed,
}

/// Kind of indicator of compromise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IOCType {
    CommitSha,
    FilePath,
    FileHash,
    Email,
    Username,
    Repository,
    TagName,
    BranchName,
    WorkflowName,
    IpAddress,
    Domain,
    Url,
    ApiKey,
    Secret,
    Other,
}

impl IOCType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IOCType::CommitSha => "commit_sha",
            IOCType::FilePath => "file_path",
            IOCType::FileHash => "file_hash",
            IOCType::Email => "email",
            IOCType::Username => "username",
            IOCType::Repository => "repository",
            IOCType::TagName => "tag_name",
            IOCType::BranchName => "branch_name",
            IOCType::WorkflowName => "workflow_name",
            IOCType::IpAddress => "ip_address",
            IOCType::Domain => "domain",
            IOCType::Url => "url",
            IOCType::ApiKey => "api_key",
            IOCType::Secret => "secret",
            IOCType::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitObservation {
    #[serde(flatten)]
    pub common: ObservationCommon,
    pub sha: String,
    pub message: String,
    pub author: CommitAuthor,
    pub committer: CommitAuthor,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub files: Vec<FileChange>,
    /// Reachable by SHA but from no branch or tag
    #[serde(default)]
    pub is_dangling: bool,
}

impl CommitObservation {
    pub const ID_PREFIX: &'static str = "commit";

    /// `original_when` is the committer date.
    pub fn new(
        source: EvidenceSource,
        repository: GitHubRepository,
        sha: impl Into<String>,
        message: impl Into<String>,
        author: CommitAuthor,
        committer: CommitAuthor,
        parents: Vec<String>,
    ) -> Self {
        let sha = sha.into();
        let id = generate_id(Self::ID_PREFIX, [repository.full_name.as_str(), sha.as_str()]);
        let mut common = ObservationCommon::new(id, source).with_repository(repository);
        common.original_when = Some(committer.date);
        Self {
            common,
            sha,
            message: message.into(),
            author,
            committer,
            parents,
            files: Vec::new(),
            is_dangling: false,
        }
    }

    pub fn with_files(mut self, files: Vec<FileChange>) -> Self {
        self.files = files;
        self
    }

    pub fn with_dangling(mut self, dangling: bool) -> Self {
        self.is_dangling = dangling;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueObservation {
    #[serde(flatten)]
    pub common: ObservationCommon,
    #[serde(deserialize_with = "u64_lenient")]
    pub issue_number: u64,
    #[serde(default)]
    pub is_pull_request: bool,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub state: Option<IssueState>,
    #[serde(default)]
    pub author: Option<GitHubActor>,
    /// The API returns 404/410 for it now
    #[serde(default)]
    pub is_deleted: bool,
}

impl IssueObservation {
    pub const ID_PREFIX: &'static str = "issue";

    pub fn new(
        source: EvidenceSource,
        repository: GitHubRepository,
        issue_number: u64,
        is_pull_request: bool,
    ) -> Self {
        let number = issue_number.to_string();
        let kind = if is_pull_request { "pull" } else { "issue" };
        let id = generate_id(
            Self::ID_PREFIX,
            [repository.full_name.as_str(), kind, number.as_str()],
        );
        Self {
            common: ObservationCommon::new(id, source).with_repository(repository),
            issue_number,
            is_pull_request,
            title: None,
            body: None,
            state: None,
            author: None,
            is_deleted: false,
        }
    }

    pub fn with_content(
        mut self,
        title: Option<String>,
        body: Option<String>,
        state: Option<IssueState>,
        author: Option<GitHubActor>,
    ) -> Self {
        self.title = title;
        self.body = body;
        self.state = state;
        self.author = author;
        self
    }

    pub fn with_deleted(mut self, deleted: bool) -> Self {
        self.is_deleted = deleted;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileObservation {
    #[serde(flatten)]
    pub common: ObservationCommon,
    pub path: String,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub content_hash: Option<String>,
    #[serde(default, deserialize_with = "option_u64_lenient")]
    pub size: Option<u64>,
}

impl FileObservation {
    pub const ID_PREFIX: &'static str = "file";

    /// Hash and size are derived from `content` when it is known.
    pub fn new(
        source: EvidenceSource,
        repository: GitHubRepository,
        path: impl Into<String>,
        branch: Option<String>,
        content: Option<String>,
    ) -> Self {
        let path = path.into();
        let content_hash = content.as_deref().map(|c| compute_hash(c.as_bytes()));
        let size = content.as_ref().map(|c| c.len() as u64);
        let id = generate_id(
            Self::ID_PREFIX,
            [
                repository.full_name.as_str(),
                branch.as_deref().unwrap_or_default(),
                path.as_str(),
                content_hash.as_deref().unwrap_or_default(),
            ],
        );
        Self {
            common: ObservationCommon::new(id, source).with_repository(repository),
            path,
            branch,
            content,
            content_hash,
            size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkObservation {
    #[serde(flatten)]
    pub common: ObservationCommon,
    pub fork_repository: GitHubRepository,
    pub parent_repository: GitHubRepository,
    #[serde(default, with = "serde_timestamp::option")]
    pub forked_at: Option<DateTime<Utc>>,
}

impl ForkObservation {
    pub const ID_PREFIX: &'static str = "fork";

    pub fn new(
        source: EvidenceSource,
        fork_repository: GitHubRepository,
        parent_repository: GitHubRepository,
    ) -> Self {
        let id = generate_id(
            Self::ID_PREFIX,
            [
                parent_repository.full_name.as_str(),
                fork_repository.full_name.as_str(),
            ],
        );
        Self {
            common: ObservationCommon::new(id, source).with_repository(parent_repository.clone()),
            fork_repository,
            parent_repository,
            forked_at: None,
        }
    }

    pub fn with_forked_at<'a>(
        mut self,
        value: impl Into<RawTimestamp<'a>>,
    ) -> Result<Self, ParseError> {
        self.forked_at = parse_strict(value)?;
        self.common.original_when = self.forked_at;
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchObservation {
    #[serde(flatten)]
    pub common: ObservationCommon,
    pub branch_name: String,
    pub head_sha: String,
    #[serde(default)]
    pub protected: bool,
}

impl BranchObservation {
    pub const ID_PREFIX: &'static str = "branch";

    pub fn new(
        source: EvidenceSource,
        repository: GitHubRepository,
        branch_name: impl Into<String>,
        head_sha: impl Into<String>,
        protected: bool,
    ) -> Self {
        let branch_name = branch_name.into();
        let head_sha = head_sha.into();
        let id = generate_id(
            Self::ID_PREFIX,
            [
                repository.full_name.as_str(),
                branch_name.as_str(),
                head_sha.as_str(),
            ],
        );
        Self {
            common: ObservationCommon::new(id, source).with_repository(repository),
            branch_name,
            head_sha,
            protected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagObservation {
    #[serde(flatten)]
    pub common: ObservationCommon,
    pub tag_name: String,
    pub target_sha: String,
    #[serde(default)]
    pub tagger: Option<GitHubActor>,
    /// Annotated tag message
    #[serde(default)]
    pub message: Option<String>,
}

impl TagObservation {
    pub const ID_PREFIX: &'static str = "tag";

    pub fn new(
        source: EvidenceSource,
        repository: GitHubRepository,
        tag_name: impl Into<String>,
        target_sha: impl Into<String>,
    ) -> Self {
        let tag_name = tag_name.into();
        let target_sha = target_sha.into();
        let id = generate_id(
            Self::ID_PREFIX,
            [
                repository.full_name.as_str(),
                tag_name.as_str(),
                target_sha.as_str(),
            ],
        );
        Self {
            common: ObservationCommon::new(id, source).with_repository(repository),
            tag_name,
            target_sha,
            tagger: None,
            message: None,
        }
    }

    pub fn with_annotation(mut self, tagger: GitHubActor, message: impl Into<String>) -> Self {
        self.tagger = Some(tagger);
        self.message = Some(message.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseObservation {
    #[serde(flatten)]
    pub common: ObservationCommon,
    pub tag_name: String,
    #[serde(default)]
    pub release_name: Option<String>,
    #[serde(default)]
    pub release_body: Option<String>,
    #[serde(default, with = "serde_timestamp::option")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_prerelease: bool,
    #[serde(default)]
    pub is_deleted: bool,
}

impl ReleaseObservation {
    pub const ID_PREFIX: &'static str = "release";

    pub fn new(
        source: EvidenceSource,
        repository: GitHubRepository,
        tag_name: impl Into<String>,
    ) -> Self {
        let tag_name = tag_name.into();
        let id = generate_id(Self::ID_PREFIX, [repository.full_name.as_str(), tag_name.as_str()]);
        Self {
            common: ObservationCommon::new(id, source).with_repository(repository),
            tag_name,
            release_name: None,
            release_body: None,
            published_at: None,
            is_prerelease: false,
            is_deleted: false,
        }
    }

    pub fn with_release_text(mut self, name: Option<String>, body: Option<String>) -> Self {
        self.release_name = name;
        self.release_body = body;
        self
    }

    pub fn with_published_at<'a>(
        mut self,
        value: impl Into<RawTimestamp<'a>>,
    ) -> Result<Self, ParseError> {
        self.published_at = parse_strict(value)?;
        self.common.original_when = self.published_at;
        Ok(self)
    }

    pub fn with_flags(mut self, prerelease: bool, deleted: bool) -> Self {
        self.is_prerelease = prerelease;
        self.is_deleted = deleted;
        self
    }
}

/// Base of Wayback Machine replay URLs
pub const WAYBACK_BASE_URL: &str = "https://web.archive.org/web";

/// One capture listed by the Wayback Machine CDX index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaybackSnapshot {
    #[serde(with = "serde_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub original_url: String,
    pub archive_url: String,
    #[serde(default, deserialize_with = "option_u64_lenient")]
    pub status_code: Option<u64>,
    /// CDX content digest (base32 SHA-1)
    #[serde(default)]
    pub digest: Option<String>,
    #[serde(default)]
    pub mimetype: Option<String>,
}

impl WaybackSnapshot {
    /// Layout of CDX timestamps, e.g. `20240115103000`
    pub const CDX_TIMESTAMP_FORMAT: &'static str = "%Y%m%d%H%M%S";

    /// Build from a CDX row's timestamp and original URL.
    ///
    /// The CDX index is authoritative, so a malformed timestamp is an error.
    pub fn from_cdx(timestamp: &str, original_url: impl Into<String>) -> Result<Self, ParseError> {
        let naive = NaiveDateTime::parse_from_str(timestamp, Self::CDX_TIMESTAMP_FORMAT)
            .map_err(|_| ParseError::new(timestamp))?;
        let original_url = original_url.into();
        Ok(Self {
            timestamp: Utc.from_utc_datetime(&naive),
            archive_url: format!("{}/{}/{}", WAYBACK_BASE_URL, timestamp, original_url),
            original_url,
            status_code: None,
            digest: None,
            mimetype: None,
        })
    }

    pub fn with_status(mut self, status_code: u64) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn with_digest(mut self, digest: impl Into<String>, mimetype: Option<String>) -> Self {
        self.digest = Some(digest.into());
        self.mimetype = mimetype;
        self
    }

    /// The capture time in CDX layout
    pub fn cdx_timestamp(&self) -> String {
        self.timestamp.format(Self::CDX_TIMESTAMP_FORMAT).to_string()
    }
}

/// A Wayback Machine capture of a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotObservation {
    #[serde(flatten)]
    pub common: ObservationCommon,
    pub original_url: String,
    pub archive_url: String,
    #[serde(with = "serde_timestamp")]
    pub captured_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "option_u64_lenient")]
    pub status_code: Option<u64>,
    #[serde(default)]
    pub content_hash: Option<String>,
    /// Other captures of `original_url` known when this one was fetched
    #[serde(default)]
    pub snapshots: Vec<WaybackSnapshot>,
}

impl SnapshotObservation {
    pub const ID_PREFIX: &'static str = "snapshot";

    pub fn new(
        original_url: impl Into<String>,
        archive_url: impl Into<String>,
        captured_at: DateTime<Utc>,
    ) -> Self {
        let original_url = original_url.into();
        let archive_url = archive_url.into();
        let id = generate_id(Self::ID_PREFIX, [original_url.as_str(), archive_url.as_str()]);
        let verification = VerificationInfo::new(EvidenceSource::Wayback).with_url(&archive_url);
        let mut common =
            ObservationCommon::new(id, EvidenceSource::Wayback).with_verification(verification);
        common.original_when = Some(captured_at);
        Self {
            common,
            original_url,
            archive_url,
            captured_at,
            status_code: None,
            content_hash: None,
            snapshots: Vec::new(),
        }
    }

    /// Observation of one CDX capture, carrying its status code
    pub fn from_snapshot(snapshot: &WaybackSnapshot) -> Self {
        let mut observation = Self::new(
            snapshot.original_url.as_str(),
            snapshot.archive_url.as_str(),
            snapshot.timestamp,
        );
        observation.status_code = snapshot.status_code;
        observation
    }

    pub fn with_snapshots(mut self, snapshots: Vec<WaybackSnapshot>) -> Self {
        self.snapshots = snapshots;
        self
    }

    pub fn with_response(mut self, status_code: u64, body: Option<&[u8]>) -> Self {
        self.status_code = Some(status_code);
        self.content_hash = body.map(compute_hash);
        self
    }
}

/// Indicator of compromise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IOCObservation {
    #[serde(flatten)]
    pub common: ObservationCommon,
    pub ioc_type: IOCType,
    pub value: String,
    #[serde(default, with = "serde_timestamp::option")]
    pub first_seen: Option<DateTime<Utc>>,
    #[serde(default, with = "serde_timestamp::option")]
    pub last_seen: Option<DateTime<Utc>>,
    /// Evidence ID or URL the indicator was pulled from
    #[serde(default)]
    pub extracted_from: Option<String>,
}

impl IOCObservation {
    pub const ID_PREFIX: &'static str = "ioc";

    pub fn new(source: EvidenceSource, ioc_type: IOCType, value: impl Into<String>) -> Self {
        let value = value.into();
        let id = generate_id(Self::ID_PREFIX, [ioc_type.as_str(), value.as_str()]);
        Self {
            common: ObservationCommon::new(id, source),
            ioc_type,
            value,
            first_seen: None,
            last_seen: None,
            extracted_from: None,
        }
    }

    pub fn with_sightings<'a, 'b>(
        mut self,
        first_seen: impl Into<RawTimestamp<'a>>,
        last_seen: impl Into<RawTimestamp<'b>>,
    ) -> Result<Self, ParseError> {
        self.first_seen = parse_strict(first_seen)?;
        self.last_seen = parse_strict(last_seen)?;
        self.common.original_when = self.first_seen;
        Ok(self)
    }

    pub fn with_extracted_from(mut self, origin: impl Into<String>) -> Self {
        self.extracted_from = Some(origin.into());
        self
    }
}

/// A published write-up about an incident
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleObservation {
    #[serde(flatten)]
    pub common: ObservationCommon,
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, with = "serde_timestamp::option")]
    pub published_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl ArticleObservation {
    pub const ID_PREFIX: &'static str = "article";

    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        let url = url.into();
        let id = generate_id(Self::ID_PREFIX, [url.as_str()]);
        let verification = VerificationInfo::new(EvidenceSource::SecurityVendor).with_url(&url);
        Self {
            common: ObservationCommon::new(id, EvidenceSource::SecurityVendor)
                .with_verification(verification),
            url,
            title: title.into(),
            author: None,
            published_date: None,
            source_name: None,
            summary: None,
        }
    }

    pub fn with_byline(mut self, author: Option<String>, source_name: Option<String>) -> Self {
        self.author = author;
        self.source_name = source_name;
        self
    }

    pub fn with_published_date<'a>(
        mut self,
        value: impl Into<RawTimestamp<'a>>,
    ) -> Result<Self, ParseError> {
        self.published_date = parse_strict(value)?;
        self.common.original_when = self.published_date;
        Ok(self)
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

/// Any observation variant, tagged by `observation_type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "observation_type", rename_all = "snake_case")]
pub enum Observation {
    Commit(CommitObservation),
    Issue(IssueObservation),
    File(FileObservation),
    Fork(ForkObservation),
    Branch(BranchObservation),
    Tag(TagObservation),
    Release(ReleaseObservation),
    Snapshot(SnapshotObservation),
    #[serde(rename = "ioc")]
    IOC(IOCObservation),
    Article(ArticleObservation),
}

impl Observation {
    /// The `observation_type` tag this variant serializes with
    pub fn observation_type(&self) -> &'static str {
        match self {
            Observation::Commit(_) => "commit",
            Observation::Issue(_) => "issue",
            Observation::File(_) => "file",
            Observation::Fork(_) => "fork",
            Observation::Branch(_) => "branch",
            Observation::Tag(_) => "tag",
            Observation::Release(_) => "release",
            Observation::Snapshot(_) => "snapshot",
            Observation::IOC(_) => "ioc",
            Observation::Article(_) => "article",
        }
    }

    /// Prefix of this variant's evidence IDs
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Observation::Commit(_) => CommitObservation::ID_PREFIX,
            Observation::Issue(_) => IssueObservation::ID_PREFIX,
            Observation::File(_) => FileObservation::ID_PREFIX,
            Observation::Fork(_) => ForkObservation::ID_PREFIX,
            Observation::Branch(_) => BranchObservation::ID_PREFIX,
            Observation::Tag(_) => TagObservation::ID_PREFIX,
            Observation::Release(_) => ReleaseObservation::ID_PREFIX,
            Observation::Snapshot(_) => SnapshotObservation::ID_PREFIX,
            Observation::IOC(_) => IOCObservation::ID_PREFIX,
            Observation::Article(_) => ArticleObservation::ID_PREFIX,
        }
    }

    pub fn common(&self) -> &ObservationCommon {
        match self {
            Observation::Commit(o) => &o.common,
            Observation::Issue(o) => &o.common,
            Observation::File(o) => &o.common,
            Observation::Fork(o) => &o.common,
            Observation::Branch(o) => &o.common,
            Observation::Tag(o) => &o.common,
            Observation::Release(o) => &o.common,
            Observation::Snapshot(o) => &o.common,
            Observation::IOC(o) => &o.common,
            Observation::Article(o) => &o.common,
        }
    }

    pub fn evidence_id(&self) -> &str {
        &self.common().evidence_id
    }

    /// Every repository record carried by this observation
    pub fn repositories(&self) -> Vec<&GitHubRepository> {
        let mut repos: Vec<&GitHubRepository> = self.common().repository.iter().collect();
        if let Observation::Fork(fork) = self {
            repos.push(&fork.fork_repository);
            repos.push(&fork.parent_repository);
        }
        repos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::identity::make_repo;
    use chrono::TimeZone;

    fn signature() -> CommitAuthor {
        CommitAuthor {
            name: "Octo Cat".to_string(),
            email: "octocat@github.com".to_string(),
            date: Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_commit_id_is_content_addressed() {
        let build = || {
            CommitObservation::new(
                EvidenceSource::Github,
                make_repo("octocat", "Hello-World"),
                "abc123",
                "Initial commit",
                signature(),
                signature(),
                vec![],
            )
        };
        assert_eq!(build().common.evidence_id, build().common.evidence_id);
        assert!(build().common.evidence_id.starts_with("commit-"));
        assert_eq!(build().common.original_when, Some(signature().date));
    }

    #[test]
    fn test_observation_tags() {
        let value = serde_json::to_value(Observation::IOC(IOCObservation::new(
            EvidenceSource::SecurityVendor,
            IOCType::Email,
            "attacker@example.com",
        )))
        .unwrap();
        assert_eq!(value["observation_type"], "ioc");
        assert_eq!(value["ioc_type"], "email");
        assert_eq!(value["observed_by"], "security_vendor");
    }

    #[test]
    fn test_file_hash_derived_from_content() {
        let file = FileObservation::new(
            EvidenceSource::Git,
            make_repo("octocat", "Hello-World"),
            "README.md",
            Some("main".to_string()),
            Some("hello".to_string()),
        );
        assert_eq!(file.content_hash, Some(compute_hash(b"hello")));
        assert_eq!(file.size, Some(5));
    }

    #[test]
    fn test_release_published_at_is_strict() {
        let release = ReleaseObservation::new(
            EvidenceSource::Github,
            make_repo("octocat", "Hello-World"),
            "v1.0.0",
        );
        assert!(release.clone().with_published_at("last tuesday").is_err());
        let release = release.with_published_at("2024-01-15T10:30:00Z").unwrap();
        assert_eq!(release.published_at, release.common.original_when);
    }

    #[test]
    fn test_fork_repositories() {
        let fork = Observation::Fork(ForkObservation::new(
            EvidenceSource::Github,
            make_repo("mallory", "Hello-World"),
            make_repo("octocat", "Hello-World"),
        ));
        let names: Vec<_> = fork.repositories().iter().map(|r| r.full_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["octocat/Hello-World", "mallory/Hello-World", "octocat/Hello-World"]
        );
    }

    #[test]
    fn test_wayback_snapshot_from_cdx() {
        let snapshot =
            WaybackSnapshot::from_cdx("20240115103000", "https://github.com/octocat/Hello-World")
                .unwrap()
                .with_status(200);
        assert_eq!(
            snapshot.timestamp,
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
        );
        assert_eq!(
            snapshot.archive_url,
            "https://web.archive.org/web/20240115103000/https://github.com/octocat/Hello-World"
        );
        assert_eq!(snapshot.cdx_timestamp(), "20240115103000");

        let err = WaybackSnapshot::from_cdx("2024-01-15", "https://example.com").unwrap_err();
        assert_eq!(err.value, "2024-01-15");
    }

    #[test]
    fn test_snapshot_observation_from_capture() {
        let capture =
            WaybackSnapshot::from_cdx("20240115103000", "https://github.com/octocat/Hello-World")
                .unwrap()
                .with_status(404);
        let earlier =
            WaybackSnapshot::from_cdx("20231201000000", "https://github.com/octocat/Hello-World")
                .unwrap()
                .with_digest("3I42H3S6NNFQ2MSVX7XZKYAYSCX5QBYJ", Some("text/html".to_string()));

        let observation =
            SnapshotObservation::from_snapshot(&capture).with_snapshots(vec![earlier.clone()]);
        assert_eq!(observation.status_code, Some(404));
        assert_eq!(observation.archive_url, capture.archive_url);
        assert_eq!(observation.common.original_when, Some(capture.timestamp));
        assert_eq!(
            observation.common.verification.url.as_deref(),
            Some(capture.archive_url.as_str())
        );

        let value = serde_json::to_value(Observation::Snapshot(observation)).unwrap();
        assert_eq!(value["snapshots"][0]["timestamp"], "2023-12-01T00:00:00Z");
        assert_eq!(value["snapshots"][0]["mimetype"], "text/html");
        let back: WaybackSnapshot = serde_json::from_value(value["snapshots"][0].clone()).unwrap();
        assert_eq!(back, earlier);
    }

    #[test]
    fn test_observation_type_matches_serialized_tag() {
        let observations = vec![
            Observation::Article(ArticleObservation::new("https://example.com/post", "Post")),
            Observation::Snapshot(SnapshotObservation::new(
                "https://github.com/octocat/Hello-World",
                "https://web.archive.org/web/20240115103000/https://github.com/octocat/Hello-World",
                Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
            )),
            Observation::Branch(BranchObservation::new(
                EvidenceSource::Git,
                make_repo("octocat", "Hello-World"),
                "main",
                "abc123",
                true,
            )),
        ];
        for observation in observations {
            let value = serde_json::to_value(&observation).unwrap();
            assert_eq!(value["observation_type"], observation.observation_type());
            assert!(observation.evidence_id().starts_with(observation.id_prefix()));
        }
    }
}
