//! Bounded rolling error history
//!
//! Frequency conditions evaluate against this window; it is appended to on
//! every processed error and trimmed from the front at its bound.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tqc_domain::{ErrorCode, Severity, UserImpact};

/// One processed error, as remembered by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Stable code
    pub code: ErrorCode,
    /// Severity at processing time
    pub severity: Severity,
    /// Rendered message
    pub message: String,
    /// User impact from the context
    pub user_impact: UserImpact,
    /// Processing instant
    pub timestamp: DateTime<Utc>,
}

/// Rolling history with a hard entry bound
#[derive(Debug)]
pub struct RollingHistory {
    records: VecDeque<ErrorRecord>,
    limit: usize,
}

impl RollingHistory {
    /// Create history bounded to `limit` records
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(limit.min(1024)),
            limit: limit.max(1),
        }
    }

    /// Append a record, dropping the oldest when at the bound
    pub fn push(&mut self, record: ErrorRecord) {
        if self.records.len() == self.limit {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// The retained records, oldest first
    #[inline]
    #[must_use]
    pub fn records(&self) -> &VecDeque<ErrorRecord> {
        &self.records
    }

    /// Number of retained records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the history is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(i: usize) -> ErrorRecord {
        ErrorRecord {
            code: ErrorCode::Timeout,
            severity: Severity::Medium,
            message: format!("timeout {i}"),
            user_impact: UserImpact::Low,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn history_is_bounded() {
        let mut history = RollingHistory::new(3);
        for i in 0..5 {
            history.push(record(i));
        }
        assert_eq!(history.len(), 3);
        // Oldest entries were dropped
        assert_eq!(history.records().front().unwrap().message, "timeout 2");
        assert_eq!(history.records().back().unwrap().message, "timeout 4");
    }

    #[test]
    fn zero_limit_is_clamped() {
        let mut history = RollingHistory::new(0);
        history.push(record(0));
        assert_eq!(history.len(), 1);
    }
}
