//! Core domain types for ccteam
//!
//! This module contains the fundamental types used throughout the ccteam crates:
//! calendar days, actors and their identity keys, usage records as returned by
//! the Admin usage report API, and the page envelope that wraps them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity key used when an API actor carries no key name
pub const UNKNOWN_IDENTITY: &str = "unknown";

/// Daily date for aggregation
///
/// Represents a UTC calendar date without time information. Usage records are
/// bucketed per day by the API, so this is the only time granularity ccteam
/// ever deals with.
///
/// # Examples
/// ```
/// use ccteam_core::types::DailyDate;
/// use chrono::NaiveDate;
///
/// let daily = DailyDate::new(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
/// assert_eq!(daily.to_string(), "2024-01-15");
/// assert_eq!(DailyDate::parse("2024-01-15T00:00:00Z").unwrap(), daily);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DailyDate(NaiveDate);

impl DailyDate {
    /// Create a new DailyDate
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Get the inner NaiveDate
    pub fn inner(&self) -> &NaiveDate {
        &self.0
    }

    /// Parse the day part of an ISO date or RFC 3339 timestamp
    pub fn parse(value: &str) -> Option<Self> {
        let day = value.get(..10)?;
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok().map(Self)
    }

    /// Format with a chrono format string
    pub fn format(&self, fmt: &str) -> String {
        self.0.format(fmt).to_string()
    }
}

impl fmt::Display for DailyDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl From<NaiveDate> for DailyDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

/// Strongly-typed identity key
///
/// Usage is attributed either to a human (keyed by email address) or to an
/// API key (keyed by the key's name). The key doubles as the primary key of a
/// member across snapshot rebuilds.
///
/// # Examples
/// ```
/// use ccteam_core::types::IdentityKey;
///
/// let key = IdentityKey::new("jane.doe@example.com");
/// assert_eq!(key.as_str(), "jane.doe@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Create a new IdentityKey from any string-like type
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for IdentityKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Who a usage record is attributed to
///
/// On the wire this is an object tagged by `type`. Types other than
/// `user_actor` and `api_actor` are kept as [`Actor::Other`] together with any
/// key name they carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireActor", into = "WireActor")]
pub enum Actor {
    /// A human user of Claude Code
    UserActor {
        /// The user's email address
        email_address: String,
    },
    /// An API key
    ApiActor {
        /// Display name of the key, if the API reports one
        api_key_name: Option<String>,
    },
    /// Any actor type this version does not know about
    Other {
        /// The `type` tag as sent by the API
        kind: String,
        /// Key name, if the actor carries one
        api_key_name: Option<String>,
    },
}

const USER_ACTOR: &str = "user_actor";
const API_ACTOR: &str = "api_actor";

#[derive(Serialize, Deserialize)]
struct WireActor {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_key_name: Option<String>,
}

impl TryFrom<WireActor> for Actor {
    type Error = String;

    fn try_from(wire: WireActor) -> Result<Self, Self::Error> {
        match wire.kind.as_str() {
            USER_ACTOR => wire
                .email_address
                .map(|email_address| Actor::UserActor { email_address })
                .ok_or_else(|| "user_actor without email_address".to_string()),
            API_ACTOR => Ok(Actor::ApiActor {
                api_key_name: wire.api_key_name,
            }),
            _ => Ok(Actor::Other {
                kind: wire.kind,
                api_key_name: wire.api_key_name,
            }),
        }
    }
}

impl From<Actor> for WireActor {
    fn from(actor: Actor) -> Self {
        match actor {
            Actor::UserActor { email_address } => WireActor {
                kind: USER_ACTOR.to_string(),
                email_address: Some(email_address),
                api_key_name: None,
            },
            Actor::ApiActor { api_key_name } => WireActor {
                kind: API_ACTOR.to_string(),
                email_address: None,
                api_key_name,
            },
            Actor::Other { kind, api_key_name } => WireActor {
                kind,
                email_address: None,
                api_key_name,
            },
        }
    }
}

impl Actor {
    /// Convenience constructor for a user actor
    pub fn user(email: impl Into<String>) -> Self {
        Actor::UserActor {
            email_address: email.into(),
        }
    }

    /// Convenience constructor for an API key actor
    pub fn api_key(name: Option<&str>) -> Self {
        Actor::ApiActor {
            api_key_name: name.map(str::to_string),
        }
    }

    /// Resolve the identity key this actor aggregates under
    ///
    /// # Examples
    /// ```
    /// use ccteam_core::types::Actor;
    ///
    /// assert_eq!(Actor::user("a@x.com").identity().as_str(), "a@x.com");
    /// assert_eq!(Actor::api_key(Some("ci-bot")).identity().as_str(), "ci-bot");
    /// assert_eq!(Actor::api_key(None).identity().as_str(), "unknown");
    /// ```
    pub fn identity(&self) -> IdentityKey {
        match self {
            Actor::UserActor { email_address } => IdentityKey::new(email_address.as_str()),
            Actor::ApiActor {
                api_key_name: Some(name),
            }
            | Actor::Other {
                api_key_name: Some(name),
                ..
            } if !name.is_empty() => IdentityKey::new(name.as_str()),
            Actor::ApiActor { .. } | Actor::Other { .. } => IdentityKey::new(UNKNOWN_IDENTITY),
        }
    }
}

/// One row of the usage report: one actor on one day
///
/// On the wire the counters sit under `core_metrics`; this type flattens them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireUsageRecord", into = "WireUsageRecord")]
pub struct UsageRecord {
    /// Day the usage was recorded on (UTC)
    pub date: DailyDate,
    /// Who the usage is attributed to
    pub actor: Actor,
    /// Lines of code added
    pub lines_added: u64,
    /// Lines of code removed
    pub lines_removed: u64,
    /// Number of Claude Code sessions
    pub session_count: u64,
}

impl UsageRecord {
    /// Identity key this record aggregates under
    pub fn identity(&self) -> IdentityKey {
        self.actor.identity()
    }
}

#[derive(Serialize, Deserialize)]
struct WireUsageRecord {
    date: String,
    actor: Actor,
    #[serde(default)]
    core_metrics: WireCoreMetrics,
}

#[derive(Default, Serialize, Deserialize)]
struct WireCoreMetrics {
    #[serde(default)]
    num_sessions: u64,
    #[serde(default)]
    lines_of_code: WireLinesOfCode,
}

#[derive(Default, Serialize, Deserialize)]
struct WireLinesOfCode {
    #[serde(default)]
    added: u64,
    #[serde(default)]
    removed: u64,
}

impl TryFrom<WireUsageRecord> for UsageRecord {
    type Error = String;

    fn try_from(wire: WireUsageRecord) -> Result<Self, Self::Error> {
        let date = DailyDate::parse(&wire.date)
            .ok_or_else(|| format!("invalid usage record date: {:?}", wire.date))?;
        Ok(Self {
            date,
            actor: wire.actor,
            lines_added: wire.core_metrics.lines_of_code.added,
            lines_removed: wire.core_metrics.lines_of_code.removed,
            session_count: wire.core_metrics.num_sessions,
        })
    }
}

impl From<UsageRecord> for WireUsageRecord {
    fn from(record: UsageRecord) -> Self {
        Self {
            date: record.date.format("%Y-%m-%dT00:00:00Z"),
            actor: record.actor,
            core_metrics: WireCoreMetrics {
                num_sessions: record.session_count,
                lines_of_code: WireLinesOfCode {
                    added: record.lines_added,
                    removed: record.lines_removed,
                },
            },
        }
    }
}

/// One page of the usage report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsagePage {
    /// Records on this page
    pub data: Vec<UsageRecord>,
    /// Whether another page follows
    #[serde(default)]
    pub has_more: bool,
    /// Cursor for the next page, present when `has_more` is true
    #[serde(default)]
    pub next_page: Option<String>,
}

impl UsagePage {
    /// Cursor to request next, if the API says there is more
    pub fn next_cursor(&self) -> Option<&str> {
        if self.has_more {
            self.next_page.as_deref()
        } else {
            None
        }
    }
}
