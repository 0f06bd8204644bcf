// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Orchestrate one run: select the window, discover issues, fetch worklogs, aggregate, render
// role: processing/orchestrator
// inputs: JiraApi implementation, JiraConfig, EffectiveConfig, effective now
// outputs: Report and its rendered text/JSON form
// side_effects: Remote calls through JiraApi; JQL echoed to stderr under --debug
// invariants:
// - Board/sprint/search failures are fatal; the epicsOf search and per-issue worklog fetches are not
// - Per-issue worklog fetches may run in parallel; entries are re-sorted before rendering
// - When sprint searches find nothing the recent-worklog query is used and the window is kept
// errors: Propagates ReportError with anyhow context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde_json::Value;

use crate::aggregate::{EpicResolver, GroupBy, IssueWarning, aggregate, collect_entries, dedupe_issues};
use crate::cli::{EffectiveConfig, OutputFormat};
use crate::config::JiraConfig;
use crate::jira::api::{JiraApi, issue_worklogs, list_boards, list_sprints, search_issues};
use crate::jira::model::{epic_link_from_json, issue_from_json};
use crate::jira::query;
use crate::model::{Issue, TimeWindow, WorklogEntry};
use crate::render::{Report, render_json, render_text};
use crate::window::{self, BoardSprints, IssueSource, WindowPolicy, WindowSelection};

pub fn select_window(api: &dyn JiraApi, cfg: &EffectiveConfig, now: DateTime<Utc>) -> Result<WindowSelection> {
  if cfg.policy == WindowPolicy::Range {
    return Ok(window::select_explicit(cfg.start.as_deref(), cfg.end.as_deref(), now)?);
  }

  let boards = list_boards(api).context("listing boards")?;
  if boards.is_empty() {
    tracing::info!("no boards found");
  }

  let mut listed: Vec<BoardSprints> = Vec::with_capacity(boards.len());
  for board in boards {
    tracing::info!(board = %board.name, board_id = board.id, "checking board");
    let sprints = list_sprints(api, board.id, cfg.policy.sprint_states())
      .with_context(|| format!("listing sprints for board {}", board.id))?;
    listed.push(BoardSprints {
      board_id: board.id,
      board_name: board.name,
      sprints,
    });
  }

  Ok(match cfg.policy {
    WindowPolicy::Active => window::select_active(&listed, now),
    _ => window::select_recent_closed(&listed, now),
  })
}

struct Searcher<'a> {
  api: &'a dyn JiraApi,
  fields: String,
  debug: bool,
}

impl Searcher<'_> {
  fn search(&self, jql: &str) -> crate::error::Result<Vec<Value>> {
    if self.debug {
      eprintln!("JQL: {jql}");
    }
    search_issues(self.api, jql, &self.fields)
  }
}

/// Candidate issues for the selection, deduplicated by key.
pub fn discover_issues(
  api: &dyn JiraApi,
  jira: &JiraConfig,
  cfg: &EffectiveConfig,
  selection: &WindowSelection,
) -> Result<Vec<Issue>> {
  let searcher = Searcher {
    api,
    fields: query::search_fields(&jira.epic_link_field),
    debug: cfg.debug,
  };
  let mut raw: Vec<Value> = Vec::new();

  match &selection.source {
    IssueSource::Sprints { sprints } => {
      for sprint in sprints {
        let direct = searcher
          .search(&query::sprint_issues(sprint.id))
          .with_context(|| format!("searching issues in sprint {}", sprint.id))?;

        // epicsOf needs a server plug-in; missing support is not fatal.
        let via_epics = match searcher.search(&query::sprint_epic_issues(sprint.id)) {
          Ok(found) => found,
          Err(e) => {
            tracing::warn!(sprint = sprint.id, error = %e, "epic-children search failed; continuing without it");
            Vec::new()
          }
        };

        tracing::info!(
          sprint = %sprint.name,
          sprint_id = sprint.id,
          direct = direct.len(),
          from_epics = via_epics.len(),
          "found issues with worklogs"
        );
        raw.extend(direct);
        raw.extend(via_epics);
      }

      if raw.is_empty() {
        tracing::info!("no issues found in the selected sprints; falling back to the last 14 days");
        raw = searcher.search(&query::recent_fallback()).context("searching recent worklogs")?;
      }
    }
    IssueSource::DateRange { start, end } => {
      raw = searcher
        .search(&query::date_range(*start, *end))
        .context("searching worklogs in date range")?;
    }
    IssueSource::RecentFallback => {
      raw = searcher.search(&query::recent_fallback()).context("searching recent worklogs")?;
    }
  }

  let issues = dedupe_issues(raw.iter().filter_map(|v| issue_from_json(v, &jira.epic_link_field)));
  tracing::info!(count = issues.len(), "unique issues with worklogs");
  Ok(issues)
}

/// Counted entries across all issues, plus a warning for every issue whose worklogs
/// could not be fetched or whose epic could not be determined.
///
/// Epics are resolved only for issues that contributed at least one counted entry.
pub fn collect_worklogs(
  api: &dyn JiraApi,
  jira: &JiraConfig,
  issues: &[Issue],
  window: &TimeWindow,
  group_by: GroupBy,
) -> (Vec<WorklogEntry>, Vec<IssueWarning>) {
  let fetched: Vec<_> = issues
    .par_iter()
    .map(|issue| issue_worklogs(api, &issue.key))
    .collect();

  let mut resolver = (group_by == GroupBy::Epic).then(|| {
    EpicResolver::new(|parent: &str| {
      let v = api.issue_json(parent, &jira.epic_link_field)?;
      Ok(epic_link_from_json(&v, &jira.epic_link_field))
    })
  });

  let mut entries: Vec<WorklogEntry> = Vec::new();
  let mut warnings: Vec<IssueWarning> = Vec::new();

  for (issue, result) in issues.iter().zip(fetched) {
    let records = match result {
      Ok(records) => records,
      Err(e) => {
        tracing::warn!(issue = %issue.key, error = %e, "skipping issue: worklog fetch failed");
        warnings.push(IssueWarning {
          key: issue.key.clone(),
          reason: e.to_string(),
        });
        continue;
      }
    };

    let mut counted = collect_entries(issue, &records, &jira.username, window, None);
    if let Some(resolver) = resolver.as_mut() {
      if !counted.is_empty() {
        let epic = resolver.resolve(issue);
        for entry in &mut counted {
          entry.epic_key = Some(epic.clone());
        }
      }
    }
    entries.extend(counted);
  }

  if let Some(resolver) = resolver {
    tracing::debug!(lookups = resolver.lookups(), "resolved epics");
    warnings.extend(resolver.into_warnings());
  }

  (entries, warnings)
}

pub fn generate_report(
  api: &dyn JiraApi,
  jira: &JiraConfig,
  cfg: &EffectiveConfig,
  now: DateTime<Utc>,
) -> Result<Report> {
  let selection = select_window(api, cfg, now)?;
  tracing::info!(description = %selection.description, fallback = selection.fallback, "window selected");

  let issues = discover_issues(api, jira, cfg, &selection)?;
  let (entries, warnings) = collect_worklogs(api, jira, &issues, &selection.window, cfg.group_by);
  let aggregation = aggregate(entries, cfg.group_by, cfg.sort);

  Ok(Report::new(&selection, aggregation, cfg.group_by, warnings))
}

/// Run end to end and return the rendered output.
pub fn process(api: &dyn JiraApi, jira: &JiraConfig, cfg: &EffectiveConfig, now: DateTime<Utc>) -> Result<String> {
  let report = generate_report(api, jira, cfg, now)?;
  match cfg.format {
    OutputFormat::Text => Ok(render_text(&report)),
    OutputFormat::Json => render_json(&report),
  }
}
