// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Deduplicate issues, filter worklogs by author and window, resolve epic keys, group and sort for output
// role: aggregate/core
// inputs: Issues, raw WorklogRecord lists per issue, the configured user, a TimeWindow
// outputs: Counted WorklogEntry list plus AggregationResult per group key
// invariants:
// - Counted entries satisfy author == user and window.contains(started)
// - Sum of group totals equals the sum of counted entry minutes
// - Epic resolution is at most two hops: epic link, epic parent, then one parent lookup
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::{BTreeMap, HashMap};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::duration::parse_duration;
use crate::error::Result;
use crate::ext::serde_json::JsonFetch;
use crate::jira::model::{WorklogRecord, parse_instant};
use crate::model::{AggregationResult, Issue, NO_EPIC, TimeWindow, WorklogEntry};

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum GroupBy {
  Issue,
  Epic,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum SortOrder {
  /// Issue key, then start time
  Issue,
  /// Start time only
  Date,
}

/// A per-issue fetch that failed; the run continues without that issue.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IssueWarning {
  pub key: String,
  pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Aggregation {
  pub entries: Vec<WorklogEntry>,
  pub groups: AggregationResult,
  pub total_minutes: u64,
}

/// Last occurrence of a key wins; output is ordered by key.
pub fn dedupe_issues(issues: impl IntoIterator<Item = Issue>) -> Vec<Issue> {
  let by_key: BTreeMap<String, Issue> = issues.into_iter().map(|i| (i.key.clone(), i)).collect();
  by_key.into_values().collect()
}

/// Plain text of a worklog comment.
///
/// Rich-text documents contribute the `text` of every `type == "text"` chunk across all
/// blocks, space-joined; plain strings pass through; anything else is empty.
pub fn flatten_comment(comment: Option<&Value>) -> String {
  let Some(comment) = comment else {
    return String::new();
  };

  if let Some(s) = comment.as_str() {
    return s.to_string();
  }

  comment
    .fetch("content")
    .array()
    .iter()
    .flat_map(|block| block.fetch("content").array().iter())
    .filter(|chunk| chunk.fetch("type").str() == Some("text"))
    .filter_map(|chunk| chunk.fetch("text").str())
    .collect::<Vec<_>>()
    .join(" ")
}

/// Worklogs of one issue that were authored by `user` and started inside `window`.
pub fn collect_entries(
  issue: &Issue,
  records: &[WorklogRecord],
  user: &str,
  window: &TimeWindow,
  epic_key: Option<&str>,
) -> Vec<WorklogEntry> {
  records
    .iter()
    .filter(|r| r.author_id() == user)
    .filter_map(|r| {
      let Some(started) = parse_instant(&r.started) else {
        tracing::warn!(issue = %issue.key, started = %r.started, "skipping worklog with unparseable start");
        return None;
      };
      window.contains(started).then(|| WorklogEntry {
        issue_key: issue.key.clone(),
        summary: issue.summary.clone(),
        author_id: r.author_id().to_string(),
        started,
        time_spent: r.time_spent.clone(),
        minutes: parse_duration(&r.time_spent),
        comment: flatten_comment(r.comment.as_ref()),
        epic_key: epic_key.map(str::to_string),
      })
    })
    .collect()
}

/// Resolves the epic an issue rolls up to, memoising the one-hop parent lookups.
///
/// A failed lookup groups the issue under `NO_EPIC` and records an `IssueWarning`
/// for it (and for every later issue sharing that parent).
pub struct EpicResolver<F> {
  lookup_parent_epic: F,
  memo: HashMap<String, std::result::Result<Option<String>, String>>,
  warnings: Vec<IssueWarning>,
}

impl<F> EpicResolver<F>
where
  F: FnMut(&str) -> Result<Option<String>>,
{
  /// `lookup_parent_epic` reads the epic link field of the given parent issue.
  pub fn new(lookup_parent_epic: F) -> Self {
    Self {
      lookup_parent_epic,
      memo: HashMap::new(),
      warnings: Vec::new(),
    }
  }

  pub fn resolve(&mut self, issue: &Issue) -> String {
    if let Some(epic) = &issue.epic_link {
      return epic.clone();
    }

    let Some(parent) = &issue.parent else {
      return NO_EPIC.to_string();
    };

    if parent.is_epic {
      return parent.key.clone();
    }

    let lookup = &mut self.lookup_parent_epic;
    let outcome = self.memo.entry(parent.key.clone()).or_insert_with(|| {
      lookup(&parent.key).map_err(|e| {
        tracing::warn!(issue = %issue.key, parent = %parent.key, error = %e, "parent epic lookup failed");
        e.to_string()
      })
    });

    match outcome {
      Ok(found) => found.clone().unwrap_or_else(|| NO_EPIC.to_string()),
      Err(reason) => {
        self.warnings.push(IssueWarning {
          key: issue.key.clone(),
          reason: format!("epic lookup for parent {} failed: {reason}", parent.key),
        });
        NO_EPIC.to_string()
      }
    }
  }

  pub fn lookups(&self) -> usize {
    self.memo.len()
  }

  /// Warnings for issues whose epic could not be determined, in resolution order.
  pub fn into_warnings(self) -> Vec<IssueWarning> {
    self.warnings
  }
}

pub fn group_key<'a>(entry: &'a WorklogEntry, group_by: GroupBy) -> &'a str {
  match group_by {
    GroupBy::Issue => &entry.issue_key,
    GroupBy::Epic => entry.epic_key.as_deref().unwrap_or(NO_EPIC),
  }
}

pub fn group_minutes(entries: &[WorklogEntry], group_by: GroupBy) -> AggregationResult {
  let mut result = AggregationResult::default();
  for entry in entries {
    result.add(group_key(entry, group_by), entry.minutes);
  }
  result
}

pub fn sort_entries(entries: &mut [WorklogEntry], order: SortOrder) {
  match order {
    SortOrder::Issue => entries.sort_by(|a, b| a.issue_key.cmp(&b.issue_key).then(a.started.cmp(&b.started))),
    SortOrder::Date => entries.sort_by(|a, b| a.started.cmp(&b.started).then(a.issue_key.cmp(&b.issue_key))),
  }
}

pub fn aggregate(mut entries: Vec<WorklogEntry>, group_by: GroupBy, order: SortOrder) -> Aggregation {
  sort_entries(&mut entries, order);
  let groups = group_minutes(&entries, group_by);
  let total_minutes = entries.iter().map(|e| e.minutes).sum();

  Aggregation {
    entries,
    groups,
    total_minutes,
  }
}
