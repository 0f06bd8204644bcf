// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Wire shapes of the Jira agile/search/worklog endpoints and their conversion into domain types
// role: jira/model
// inputs: JSON bodies from /rest/agile/1.0/board, /board/{id}/sprint, /rest/api/3/search, /issue/{key}/worklog
// outputs: Board, SprintRecord, WorklogRecord, offset pages; Issue/Sprint domain values
// invariants: Unparseable instants become None (logged), never panics; issues without a key are dropped
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::ext::serde_json::JsonFetch;
use crate::model::{Issue, ParentRef, Sprint, SprintState};
use crate::pagination::Page;

#[derive(Debug, Clone, Deserialize)]
pub struct Board {
  pub id: i64,
  #[serde(default)]
  pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SprintRecord {
  pub id: i64,
  #[serde(default)]
  pub name: String,
  pub start_date: Option<String>,
  pub end_date: Option<String>,
}

impl SprintRecord {
  /// Attach the board it was listed on and the state it was listed under.
  pub fn into_sprint(self, board_id: i64, state: SprintState) -> Sprint {
    Sprint {
      start: self.start_date.as_deref().and_then(|s| parse_instant_logged(s, "sprint startDate")),
      end: self.end_date.as_deref().and_then(|s| parse_instant_logged(s, "sprint endDate")),
      id: self.id,
      name: self.name,
      board_id,
      state,
    }
  }
}

/// `{issues, startAt, total}` from the issue search endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
  #[serde(default)]
  pub issues: Vec<Value>,
  #[serde(default)]
  pub start_at: usize,
  pub total: Option<usize>,
}

impl SearchResponse {
  pub fn into_page(self) -> Page<Value> {
    let is_last = offset_page_is_last(self.start_at, self.issues.len(), self.total);
    Page::new(self.issues, is_last)
  }
}

/// `{worklogs, startAt, total}` from the per-issue worklog endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorklogResponse {
  #[serde(default)]
  pub worklogs: Vec<WorklogRecord>,
  #[serde(default)]
  pub start_at: usize,
  pub total: Option<usize>,
}

impl WorklogResponse {
  pub fn into_page(self) -> Page<WorklogRecord> {
    let is_last = offset_page_is_last(self.start_at, self.worklogs.len(), self.total);
    Page::new(self.worklogs, is_last)
  }
}

fn offset_page_is_last(start_at: usize, count: usize, total: Option<usize>) -> bool {
  total.map_or(true, |t| start_at + count >= t)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
  pub email_address: Option<String>,
  pub account_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorklogRecord {
  #[serde(default)]
  pub author: Author,
  pub started: String,
  #[serde(default)]
  pub time_spent: String,
  /// Rich-text document (v3) or plain string (v2); absent when no comment.
  #[serde(default)]
  pub comment: Option<Value>,
}

impl WorklogRecord {
  /// The identity we compare against the configured user: e-mail, else account id.
  pub fn author_id(&self) -> &str {
    self
      .author
      .email_address
      .as_deref()
      .or(self.author.account_id.as_deref())
      .unwrap_or("")
  }
}

/// Parse Jira instants: RFC3339 (`...Z`, `+00:00`) or Jira's `+0000` offset form.
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z"))
    .ok()
    .map(|dt| dt.with_timezone(&Utc))
}

fn parse_instant_logged(s: &str, what: &str) -> Option<DateTime<Utc>> {
  let parsed = parse_instant(s);
  if parsed.is_none() {
    tracing::warn!(value = s, "ignoring unparseable {what}");
  }
  parsed
}

/// Build a domain issue from a search/detail JSON object.
pub fn issue_from_json(v: &Value, epic_link_field: &str) -> Option<Issue> {
  let key = v.fetch("key").str()?.to_string();
  let summary = v.fetch("fields.summary").str().unwrap_or("").to_string();
  let epic_link = epic_link_from_json(v, epic_link_field);

  let parent = v.fetch("fields.parent.key").str().map(|pk| ParentRef {
    key: pk.to_string(),
    is_epic: v
      .fetch("fields.parent.fields.issuetype.name")
      .str()
      .is_some_and(|name| name.eq_ignore_ascii_case("epic")),
  });

  Some(Issue {
    key,
    summary,
    epic_link,
    parent,
  })
}

/// Read the epic link custom field; tolerates both a bare key and an object with a `key`.
pub fn epic_link_from_json(v: &Value, epic_link_field: &str) -> Option<String> {
  let path = format!("fields.{epic_link_field}");
  let field = v.fetch(&path);

  field
    .str()
    .map(str::to_string)
    .or_else(|| v.fetch(&format!("{path}.key")).str().map(str::to_string))
}
