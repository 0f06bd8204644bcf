// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Domain types shared by window selection, aggregation and rendering (sprints, issues, worklog entries, windows)
// role: model/types
// outputs: Serializable structs with stable field names for the JSON report
// invariants: Instants are UTC; TimeWindow is half-open [start, end)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Group key used when no epic can be resolved for an issue.
pub const NO_EPIC: &str = "no-epic";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SprintState {
  Active,
  Closed,
  Future,
}

impl SprintState {
  /// Value of the `state` query parameter on the sprint listing endpoint.
  pub fn query_value(&self) -> &'static str {
    match self {
      SprintState::Active => "active",
      SprintState::Closed => "closed",
      SprintState::Future => "future",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprint {
  pub id: i64,
  pub name: String,
  pub board_id: i64,
  pub state: SprintState,
  // Future sprints are usually listed without dates.
  pub start: Option<DateTime<Utc>>,
  pub end: Option<DateTime<Utc>>,
}

/// Parent link as reported on the issue itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentRef {
  pub key: String,
  pub is_epic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
  pub key: String,
  pub summary: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub epic_link: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub parent: Option<ParentRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorklogEntry {
  pub issue_key: String,
  pub summary: String,
  pub author_id: String,
  pub started: DateTime<Utc>,
  /// Raw duration text as logged, e.g. "1h 30m".
  pub time_spent: String,
  pub minutes: u64,
  pub comment: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub epic_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
  pub start: DateTime<Utc>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub end: Option<DateTime<Utc>>,
}

impl TimeWindow {
  pub fn since(start: DateTime<Utc>) -> Self {
    Self { start, end: None }
  }

  pub fn bounded(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
    Self { start, end: Some(end) }
  }

  /// `start <= t` and, when bounded, `t < end`.
  pub fn contains(&self, t: DateTime<Utc>) -> bool {
    t >= self.start && self.end.map_or(true, |end| t < end)
  }
}

/// Minutes accumulated per group key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
  pub groups: HashMap<String, u64>,
}

impl AggregationResult {
  pub fn add(&mut self, key: &str, minutes: u64) {
    *self.groups.entry(key.to_string()).or_insert(0) += minutes;
  }

  pub fn total(&self) -> u64 {
    self.groups.values().sum()
  }

  /// Groups by minutes descending; ties broken by key so output is stable.
  pub fn sorted_desc(&self) -> Vec<(String, u64)> {
    let mut rows: Vec<(String, u64)> = self.groups.iter().map(|(k, v)| (k.clone(), *v)).collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    rows
  }
}
