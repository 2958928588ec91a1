//! The evidence union over events and observations.

use serde::Serialize;

use super::common::VerificationResult;
use super::events::Event;
use super::identity::GitHubRepository;
use super::observations::Observation;
use super::verify;

/// Discriminator key of the event family
pub const EVENT_TYPE_KEY: &str = "event_type";

/// Discriminator key of the observation family
pub const OBSERVATION_TYPE_KEY: &str = "observation_type";

/// Family of an evidence record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Event,
    Observation,
}

impl Family {
    /// The key that carries this family's discriminator
    pub fn discriminator_key(&self) -> &'static str {
        match self {
            Family::Event => EVENT_TYPE_KEY,
            Family::Observation => OBSERVATION_TYPE_KEY,
        }
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Family::Event => write!(f, "event"),
            Family::Observation => write!(f, "observation"),
        }
    }
}

/// Any piece of evidence.
///
/// Serializes to the flat record shape of the inner variant, with exactly
/// one of `event_type` / `observation_type` present. Use
/// [`Registry::load`](super::loader::Registry::load) to read one back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Evidence {
    Event(Event),
    Observation(Observation),
}

impl Evidence {
    pub fn family(&self) -> Family {
        match self {
            Evidence::Event(_) => Family::Event,
            Evidence::Observation(_) => Family::Observation,
        }
    }

    /// Discriminator value, e.g. `push` or `commit`
    pub fn type_tag(&self) -> &'static str {
        match self {
            Evidence::Event(event) => event.event_type(),
            Evidence::Observation(observation) => observation.observation_type(),
        }
    }

    pub fn evidence_id(&self) -> &str {
        match self {
            Evidence::Event(event) => event.evidence_id(),
            Evidence::Observation(observation) => observation.evidence_id(),
        }
    }

    pub fn repositories(&self) -> Vec<&GitHubRepository> {
        match self {
            Evidence::Event(event) => event.repositories(),
            Evidence::Observation(observation) => observation.repositories(),
        }
    }

    pub fn as_event(&self) -> Option<&Event> {
        match self {
            Evidence::Event(event) => Some(event),
            Evidence::Observation(_) => None,
        }
    }

    pub fn as_observation(&self) -> Option<&Observation> {
        match self {
            Evidence::Observation(observation) => Some(observation),
            Evidence::Event(_) => None,
        }
    }

    /// Check the record's internal integrity (see [`verify::verify`])
    pub fn verify(&self) -> VerificationResult {
        verify::verify(self)
    }

    /// Serialize back to the record shape accepted by the loader
    pub fn to_record(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

impl From<Event> for Evidence {
    fn from(event: Event) -> Self {
        Evidence::Event(event)
    }
}

impl From<Observation> for Evidence {
    fn from(observation: Observation) -> Self {
        Evidence::Observation(observation)
    }
}
