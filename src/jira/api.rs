// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Trait seam for the Jira REST endpoints plus the blocking HTTP implementation and paged helpers
// role: jira/api
// inputs: JiraConfig (server, credentials, timeout); board ids, sprint states, JQL, issue keys
// outputs: Pages of boards/sprints/issues/worklogs; fully drained lists via fetch_all_pages
// side_effects: Network calls to the configured Jira server
// invariants:
// - Every request carries Basic auth built from username:api_token
// - Any transport failure, non-2xx status, or undecodable body becomes ReportError::RemoteRequestFailed
// - Implementations are Send + Sync so per-issue fetches can fan out
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::JiraConfig;
use crate::error::{ReportError, Result};
use crate::jira::model::{Board, SearchResponse, SprintRecord, WorklogResponse, WorklogRecord};
use crate::jira::query::SEARCH_PAGE_SIZE;
use crate::model::{Sprint, SprintState};
use crate::pagination::{Page, fetch_all_pages};

// --- Trait seam for the Jira API ---
pub trait JiraApi: Send + Sync {
  fn boards_page(&self, start_at: usize) -> Result<Page<Board>>;
  fn sprints_page(&self, board_id: i64, state: SprintState, start_at: usize) -> Result<Page<SprintRecord>>;
  fn search_page(&self, jql: &str, fields: &str, start_at: usize) -> Result<Page<Value>>;
  fn worklogs_page(&self, issue_key: &str, start_at: usize) -> Result<Page<WorklogRecord>>;
  fn issue_json(&self, issue_key: &str, fields: &str) -> Result<Value>;
}

pub struct JiraHttpApi {
  agent: ureq::Agent,
  base: String,
  authorization: String,
}

impl JiraHttpApi {
  pub fn new(config: &JiraConfig) -> Self {
    let agent: ureq::Agent = ureq::Agent::config_builder()
      .timeout_global(Some(config.timeout))
      .build()
      .into();
    let credentials = STANDARD.encode(format!("{}:{}", config.username, config.api_token));

    Self {
      agent,
      base: config.server.trim_end_matches('/').to_string(),
      authorization: format!("Basic {credentials}"),
    }
  }

  fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
    let url = format!("{}{}", self.base, path);
    tracing::debug!(%url, ?query, "GET");

    let mut req = self
      .agent
      .get(&url)
      .header("Accept", "application/json")
      .header("Authorization", self.authorization.as_str());

    for (k, v) in query {
      req = req.query(*k, v.as_str());
    }

    let mut resp = req.call().map_err(|e| ReportError::remote(&url, e))?;
    resp
      .body_mut()
      .read_json::<T>()
      .map_err(|e| ReportError::remote(&url, e))
  }
}

impl JiraApi for JiraHttpApi {
  fn boards_page(&self, start_at: usize) -> Result<Page<Board>> {
    self.get_json("/rest/agile/1.0/board", &[("startAt", start_at.to_string())])
  }

  fn sprints_page(&self, board_id: i64, state: SprintState, start_at: usize) -> Result<Page<SprintRecord>> {
    self.get_json(
      &format!("/rest/agile/1.0/board/{board_id}/sprint"),
      &[
        ("state", state.query_value().to_string()),
        ("startAt", start_at.to_string()),
      ],
    )
  }

  fn search_page(&self, jql: &str, fields: &str, start_at: usize) -> Result<Page<Value>> {
    let resp: SearchResponse = self.get_json(
      "/rest/api/3/search",
      &[
        ("jql", jql.to_string()),
        ("fields", fields.to_string()),
        ("maxResults", SEARCH_PAGE_SIZE.to_string()),
        ("startAt", start_at.to_string()),
      ],
    )?;
    Ok(resp.into_page())
  }

  fn worklogs_page(&self, issue_key: &str, start_at: usize) -> Result<Page<WorklogRecord>> {
    let resp: WorklogResponse = self.get_json(
      &format!("/rest/api/3/issue/{issue_key}/worklog"),
      &[("startAt", start_at.to_string())],
    )?;
    Ok(resp.into_page())
  }

  fn issue_json(&self, issue_key: &str, fields: &str) -> Result<Value> {
    self.get_json(
      &format!("/rest/api/3/issue/{issue_key}"),
      &[("fields", fields.to_string())],
    )
  }
}

// --- Paged helpers over any JiraApi ---

pub fn list_boards(api: &dyn JiraApi) -> Result<Vec<Board>> {
  let boards = fetch_all_pages(&[("boards", ())], |_, start_at| api.boards_page(start_at))?;
  Ok(boards.into_iter().map(|l| l.record).collect())
}

/// Sprints of one board for each requested state, each tagged with that state.
pub fn list_sprints(api: &dyn JiraApi, board_id: i64, states: &[SprintState]) -> Result<Vec<Sprint>> {
  let categories: Vec<(SprintState, SprintState)> = states.iter().map(|s| (*s, *s)).collect();
  let labeled = fetch_all_pages(&categories, |state, start_at| api.sprints_page(board_id, *state, start_at))?;

  Ok(
    labeled
      .into_iter()
      .map(|l| l.record.into_sprint(board_id, l.label))
      .collect(),
  )
}

pub fn search_issues(api: &dyn JiraApi, jql: &str, fields: &str) -> Result<Vec<Value>> {
  let issues = fetch_all_pages(&[("search", ())], |_, start_at| api.search_page(jql, fields, start_at))?;
  Ok(issues.into_iter().map(|l| l.record).collect())
}

pub fn issue_worklogs(api: &dyn JiraApi, issue_key: &str) -> Result<Vec<WorklogRecord>> {
  let logs = fetch_all_pages(&[(issue_key, ())], |_, start_at| api.worklogs_page(issue_key, start_at))?;
  Ok(logs.into_iter().map(|l| l.record).collect())
}
