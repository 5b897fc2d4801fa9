//! Aggregation data types for ccteam
//!
//! Pure data structures for per-identity totals and the member view model
//! that is pushed to dashboard clients.

use crate::types::{IdentityKey, UsageRecord};
use serde::{Deserialize, Serialize};

/// Running totals for one identity within one window
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregate {
    /// Lines of code added
    pub added: u64,
    /// Lines of code removed
    pub removed: u64,
    /// Number of sessions
    pub sessions: u64,
}

impl Aggregate {
    /// Fold one record into the totals
    pub fn add(&mut self, record: &UsageRecord) {
        self.added = self.added.saturating_add(record.lines_added);
        self.removed = self.removed.saturating_add(record.lines_removed);
        self.sessions = self.sessions.saturating_add(record.session_count);
    }
}

/// Display-ready view of one identity
///
/// Field names are camelCase on the wire; dashboard clients key on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Sequential id within one snapshot; not stable across rebuilds
    pub id: u32,
    /// Identity key (email address or API key name)
    pub email: IdentityKey,
    /// Display name derived from the identity key
    pub name: String,
    /// Initials derived from the display name
    pub avatar: String,
    /// Whether the identity had at least one session today
    pub active: bool,
    /// Lines added today
    pub lines_today: u64,
    /// Lines added since Monday
    pub lines_this_week: u64,
    /// Lines added over the all-time window
    pub lines_all_time: u64,
}

/// Complete set of members at one point in time
///
/// Serializes as a bare JSON array of members.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    members: Vec<Member>,
}

impl Snapshot {
    /// Wrap an ordered member list
    pub fn new(members: Vec<Member>) -> Self {
        Self { members }
    }

    /// Members in id order
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Look a member up by identity key
    pub fn get(&self, identity: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.email.as_str() == identity)
    }

    /// Summarize the snapshot
    pub fn totals(&self) -> TeamTotals {
        TeamTotals::from_members(&self.members)
    }
}

/// Team-wide summary of a snapshot
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamTotals {
    pub members: usize,
    pub active: usize,
    pub lines_today: u64,
    pub lines_this_week: u64,
    pub lines_all_time: u64,
}

impl TeamTotals {
    pub fn from_members(members: &[Member]) -> Self {
        members.iter().fold(
            Self {
                members: members.len(),
                ..Self::default()
            },
            |mut acc, m| {
                acc.active += usize::from(m.active);
                acc.lines_today = acc.lines_today.saturating_add(m.lines_today);
                acc.lines_this_week = acc.lines_this_week.saturating_add(m.lines_this_week);
                acc.lines_all_time = acc.lines_all_time.saturating_add(m.lines_all_time);
                acc
            },
        )
    }
}
