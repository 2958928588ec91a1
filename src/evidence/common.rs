//! Fields shared by every event and every observation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::datetime::{parse_lenient, parse_strict, serde_timestamp, RawTimestamp};
use super::identity::{GitHubActor, GitHubRepository};
use crate::error::ParseError;

/// Where a piece of evidence was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceSource {
    /// GH Archive activity stream (BigQuery or hourly dumps)
    Gharchive,
    /// GitHub REST API
    Github,
    /// Local git clone
    Git,
    /// Wayback Machine captures
    Wayback,
    /// Third-party security write-ups
    SecurityVendor,
}

impl std::fmt::Display for EvidenceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvidenceSource::Gharchive => write!(f, "gharchive"),
            EvidenceSource::Github => write!(f, "github"),
            EvidenceSource::Git => write!(f, "git"),
            EvidenceSource::Wayback => write!(f, "wayback"),
            EvidenceSource::SecurityVendor => write!(f, "security_vendor"),
        }
    }
}

/// How a reader can independently re-check a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationInfo {
    pub source: EvidenceSource,
    /// Permalink to the authoritative copy
    #[serde(default)]
    pub url: Option<String>,
    /// BigQuery table holding the GH Archive row
    #[serde(default)]
    pub bigquery_table: Option<String>,
    /// Query that reproduces the row
    #[serde(default)]
    pub query: Option<String>,
}

impl VerificationInfo {
    pub fn new(source: EvidenceSource) -> Self {
        Self {
            source,
            url: None,
            bigquery_table: None,
            query: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_bigquery(mut self, table: impl Into<String>, query: impl Into<String>) -> Self {
        self.bigquery_table = Some(table.into());
        self.query = Some(query.into());
        self
    }
}

/// Outcome of checking one record's integrity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub evidence_id: String,
    pub is_valid: bool,
    /// One message per failed check, empty when valid
    #[serde(default)]
    pub errors: Vec<String>,
}

impl VerificationResult {
    pub fn from_errors(evidence_id: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            evidence_id: evidence_id.into(),
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Common part of every event record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCommon {
    pub evidence_id: String,
    /// When GH Archive says the activity happened
    #[serde(with = "serde_timestamp")]
    pub when: DateTime<Utc>,
    pub who: GitHubActor,
    pub repository: GitHubRepository,
    pub verification: VerificationInfo,
}

impl EventCommon {
    /// Events come from GH Archive, so `when` is parsed leniently.
    pub fn new<'a>(
        evidence_id: String,
        when: impl Into<RawTimestamp<'a>>,
        who: GitHubActor,
        repository: GitHubRepository,
    ) -> Self {
        Self {
            evidence_id,
            when: parse_lenient(when),
            who,
            repository,
            verification: VerificationInfo::new(EvidenceSource::Gharchive),
        }
    }

    pub fn with_verification(mut self, verification: VerificationInfo) -> Self {
        self.verification = verification;
        self
    }
}

/// Common part of every observation record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationCommon {
    pub evidence_id: String,
    /// When the observed fact itself happened, if known
    #[serde(default, with = "serde_timestamp::option")]
    pub original_when: Option<DateTime<Utc>>,
    /// When the observation was made
    #[serde(with = "serde_timestamp")]
    pub observed_when: DateTime<Utc>,
    pub observed_by: EvidenceSource,
    #[serde(default)]
    pub repository: Option<GitHubRepository>,
    pub verification: VerificationInfo,
}

impl ObservationCommon {
    pub fn new(evidence_id: String, observed_by: EvidenceSource) -> Self {
        Self {
            evidence_id,
            original_when: None,
            observed_when: Utc::now(),
            observed_by,
            repository: None,
            verification: VerificationInfo::new(observed_by),
        }
    }

    /// Observations come from trusted sources, so a malformed timestamp is
    /// an error rather than a silent substitution.
    pub fn with_original_when<'a>(
        mut self,
        value: impl Into<RawTimestamp<'a>>,
    ) -> Result<Self, ParseError> {
        self.original_when = parse_strict(value)?;
        Ok(self)
    }

    pub fn with_observed_when(mut self, observed_when: DateTime<Utc>) -> Self {
        self.observed_when = observed_when;
        self
    }

    pub fn with_repository(mut self, repository: GitHubRepository) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn with_verification(mut self, verification: VerificationInfo) -> Self {
        self.verification = verification;
        self
    }
}
