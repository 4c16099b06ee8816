//! Bounded log of resolved control actions.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use robo_core::{ControlAction, ControlStatus, TabletId};
use serde::{Deserialize, Serialize};

/// Entries kept when no limit is configured.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// One resolved control action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlHistoryEntry {
    pub at: DateTime<Utc>,
    pub tablet_id: TabletId,
    pub table_number: String,
    pub action: ControlAction,
    /// `Succeeded` or `Failed`.
    pub outcome: ControlStatus,
    /// Uid of the operator who issued the action, when signed in.
    pub actor: Option<String>,
}

/// Most recent control actions, oldest evicted first.
#[derive(Debug, Clone)]
pub struct ControlHistory {
    entries: VecDeque<ControlHistoryEntry>,
    limit: usize,
}

impl ControlHistory {
    /// A limit of 0 is treated as 1.
    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            entries: VecDeque::with_capacity(limit),
            limit,
        }
    }

    pub fn record(&mut self, entry: ControlHistoryEntry) {
        if self.entries.len() == self.limit {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Up to `count` entries, newest first.
    pub fn recent(&self, count: usize) -> Vec<ControlHistoryEntry> {
        self.entries.iter().rev().take(count).cloned().collect()
    }

    /// Entries for one tablet, newest first.
    pub fn for_tablet(&self, tablet_id: &str) -> Vec<ControlHistoryEntry> {
        self.entries
            .iter()
            .rev()
            .filter(|e| e.tablet_id == tablet_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ControlHistory {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(tablet: &str, n: u32) -> ControlHistoryEntry {
        ControlHistoryEntry {
            at: Utc::now(),
            tablet_id: tablet.to_string(),
            table_number: format!("Table {n:02}"),
            action: ControlAction::Restart,
            outcome: ControlStatus::Succeeded,
            actor: None,
        }
    }

    #[test]
    fn test_recent_returns_newest_first() {
        let mut history = ControlHistory::default();
        history.record(entry("a", 1));
        history.record(entry("b", 2));

        let recent = history.recent(10);

        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].tablet_id, "b");
        assert_eq!(recent[1].tablet_id, "a");
    }

    #[test]
    fn test_oldest_entry_is_evicted_at_limit() {
        // Arrange
        let mut history = ControlHistory::with_limit(3);

        // Act
        for n in 0..5 {
            history.record(entry(&format!("t{n}"), n));
        }

        // Assert
        assert_eq!(history.len(), 3);
        let ids: Vec<_> = history.recent(3).into_iter().map(|e| e.tablet_id).collect();
        assert_eq!(ids, ["t4", "t3", "t2"]);
    }

    #[test]
    fn test_default_limit_is_fifty() {
        let mut history = ControlHistory::default();
        for n in 0..60 {
            history.record(entry("t", n));
        }
        assert_eq!(history.len(), DEFAULT_HISTORY_LIMIT);
    }

    #[test]
    fn test_for_tablet_filters() {
        let mut history = ControlHistory::default();
        history.record(entry("a", 1));
        history.record(entry("b", 2));
        history.record(entry("a", 3));

        let a = history.for_tablet("a");
        assert_eq!(a.len(), 2);
        assert_eq!(a[0].table_number, "Table 03");
    }

    #[test]
    fn test_zero_limit_keeps_one_entry() {
        let mut history = ControlHistory::with_limit(0);
        history.record(entry("a", 1));
        history.record(entry("b", 2));
        assert_eq!(history.len(), 1);
        assert!(!history.is_empty());
    }
}
