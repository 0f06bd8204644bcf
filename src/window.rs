// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Decide the single reporting window (and the sprints whose issues to search) for each policy
// role: window/selection
// inputs: Sprints listed per board (sprint policies) or raw --start/--end strings (range policy); effective now
// outputs: WindowSelection { window, sprint, source, description, fallback }
// invariants:
// - Fallback window is [now - 14 days, unbounded)
// - Active: earliest-starting active sprint wins; ties keep the first listed
// - Recent: per board, closed sprints ending within 7 whole days of that board's latest end; the sprint with the latest end overall is authoritative
// - Range: [start 00:00 UTC, end + 1 day) and malformed dates are fatal
// errors: MalformedDateInput, InvertedDateRange (range policy only)
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::model::{Sprint, SprintState, TimeWindow};

pub const FALLBACK_DAYS: i64 = 14;
pub const CLUSTER_DAYS: i64 = 7;

const FALLBACK_DESCRIPTION: &str = "from the past 14 days (fallback)";

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum WindowPolicy {
  /// Current active sprint (earliest start across boards)
  Active,
  /// Cluster of most recently closed sprints
  Recent,
  /// Explicit --start/--end dates
  Range,
}

impl WindowPolicy {
  /// Sprint states that must be listed per board for this policy.
  pub fn sprint_states(&self) -> &'static [SprintState] {
    match self {
      WindowPolicy::Active => &[SprintState::Active],
      // Active sprints are listed only for the per-board diagnostics.
      WindowPolicy::Recent => &[SprintState::Active, SprintState::Closed],
      WindowPolicy::Range => &[],
    }
  }
}

/// How the candidate issues are discovered for a selection.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueSource {
  Sprints { sprints: Vec<Sprint> },
  DateRange { start: NaiveDate, end: Option<NaiveDate> },
  RecentFallback,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WindowSelection {
  pub window: TimeWindow,
  /// The sprint whose start anchors the window, when one was chosen.
  pub sprint: Option<Sprint>,
  pub source: IssueSource,
  pub description: String,
  pub fallback: bool,
}

impl WindowSelection {
  pub fn fallback(now: DateTime<Utc>) -> Self {
    Self {
      window: fallback_window(now),
      sprint: None,
      source: IssueSource::RecentFallback,
      description: FALLBACK_DESCRIPTION.to_string(),
      fallback: true,
    }
  }
}

/// Sprints listed for one board.
#[derive(Clone, Debug)]
pub struct BoardSprints {
  pub board_id: i64,
  pub board_name: String,
  pub sprints: Vec<Sprint>,
}

pub fn fallback_window(now: DateTime<Utc>) -> TimeWindow {
  TimeWindow::since(now - Duration::days(FALLBACK_DAYS))
}

/// Earliest-starting active sprint across all boards; every active sprint is searched.
pub fn select_active(boards: &[BoardSprints], now: DateTime<Utc>) -> WindowSelection {
  let active: Vec<(DateTime<Utc>, &Sprint)> = boards
    .iter()
    .flat_map(|b| b.sprints.iter())
    .filter(|s| s.state == SprintState::Active)
    .filter_map(|s| s.start.map(|start| (start, s)))
    .collect();

  for board in boards {
    let count = board
      .sprints
      .iter()
      .filter(|s| s.state == SprintState::Active)
      .count();
    tracing::info!(board = %board.board_name, board_id = board.board_id, count, "active sprints on board");
  }

  let chosen = active
    .iter()
    .fold(None::<(DateTime<Utc>, &Sprint)>, |best, &(start, sprint)| match best {
      Some((best_start, _)) if best_start <= start => best,
      _ => Some((start, sprint)),
    });

  let Some((start, sprint)) = chosen else {
    tracing::info!("no active sprints found on any board; falling back to the last {FALLBACK_DAYS} days");
    return WindowSelection::fallback(now);
  };

  WindowSelection {
    window: TimeWindow::since(start),
    description: format!("from the current active sprint ({})", sprint.name),
    sprint: Some(sprint.clone()),
    source: IssueSource::Sprints {
      sprints: dedupe_sprints(active.iter().map(|(_, s)| (*s).clone())),
    },
    fallback: false,
  }
}

/// Closed sprints of one board that ended within `CLUSTER_DAYS` of its most recent end, newest first.
///
/// Sprints lacking a start or end date are not eligible.
pub fn recent_closed_cluster(sprints: &[Sprint]) -> Vec<Sprint> {
  let mut closed: Vec<(DateTime<Utc>, &Sprint)> = sprints
    .iter()
    .filter(|s| s.state == SprintState::Closed && s.start.is_some())
    .filter_map(|s| s.end.map(|end| (end, s)))
    .collect();

  closed.sort_by(|a, b| b.0.cmp(&a.0));

  let Some(&(most_recent_end, _)) = closed.first() else {
    return Vec::new();
  };

  closed
    .into_iter()
    .filter(|(end, _)| (most_recent_end - *end).num_days() <= CLUSTER_DAYS)
    .map(|(_, s)| s.clone())
    .collect()
}

pub fn select_recent_closed(boards: &[BoardSprints], now: DateTime<Utc>) -> WindowSelection {
  let mut queried: Vec<Sprint> = Vec::new();
  let mut authoritative: Option<(DateTime<Utc>, DateTime<Utc>, Sprint)> = None;

  for board in boards {
    let cluster = recent_closed_cluster(&board.sprints);

    if cluster.is_empty() {
      tracing::info!(board = %board.board_name, board_id = board.board_id, "no closed sprints found for this board");
      continue;
    }

    let active = board
      .sprints
      .iter()
      .find(|s| s.state == SprintState::Active)
      .map(|s| format!("{} (ID: {})", s.name, s.id))
      .unwrap_or_else(|| "None found".to_string());
    tracing::info!(
      board = %board.board_name,
      board_id = board.board_id,
      count = cluster.len(),
      current_active = %active,
      "recently closed sprints"
    );

    for sprint in cluster {
      if let (Some(start), Some(end)) = (sprint.start, sprint.end) {
        if authoritative.as_ref().map_or(true, |(_, best_end, _)| end > *best_end) {
          authoritative = Some((start, end, sprint.clone()));
        }
      }
      queried.push(sprint);
    }
  }

  let Some((start, _, sprint)) = authoritative else {
    tracing::info!("no closed sprints found on any board; falling back to the last {FALLBACK_DAYS} days");
    return WindowSelection::fallback(now);
  };

  WindowSelection {
    window: TimeWindow::since(start),
    description: format!("from the most recent sprint ({})", sprint.name),
    sprint: Some(sprint),
    source: IssueSource::Sprints {
      sprints: dedupe_sprints(queried),
    },
    fallback: false,
  }
}

/// Explicit calendar range. Without `--start` the default window applies and `--end` is ignored.
pub fn select_explicit(start: Option<&str>, end: Option<&str>, now: DateTime<Utc>) -> Result<WindowSelection> {
  let Some(start_raw) = start else {
    if let Some(end_raw) = end {
      tracing::warn!(end = end_raw, "--end is ignored without --start; using the default window");
    }
    let since = now - Duration::days(FALLBACK_DAYS);
    let day = since.date_naive();
    tracing::info!(since = %day, "using default date range: past {FALLBACK_DAYS} days");

    return Ok(WindowSelection {
      window: TimeWindow::since(since),
      sprint: None,
      source: IssueSource::DateRange { start: day, end: None },
      description: format!("since {}", day.format("%Y-%m-%d")),
      fallback: true,
    });
  };

  let start_day = parse_date("--start", start_raw)?;
  let end_day = end.map(|raw| parse_date("--end", raw)).transpose()?;

  if let Some(end_day) = end_day {
    if end_day < start_day {
      return Err(ReportError::InvertedDateRange {
        start: start_day.to_string(),
        end: end_day.to_string(),
      });
    }
  }

  let (window, description) = match end_day {
    Some(end_day) => (
      TimeWindow::bounded(start_of_day(start_day), start_of_day(end_day + Duration::days(1))),
      format!("from {} to {}", start_day.format("%Y-%m-%d"), end_day.format("%Y-%m-%d")),
    ),
    None => (
      TimeWindow::since(start_of_day(start_day)),
      format!("since {}", start_day.format("%Y-%m-%d")),
    ),
  };
  tracing::info!(%description, "using user-provided date range");

  Ok(WindowSelection {
    window,
    sprint: None,
    source: IssueSource::DateRange {
      start: start_day,
      end: end_day,
    },
    description,
    fallback: false,
  })
}

/// Strict `YYYY-MM-DD`.
pub fn parse_date(flag: &'static str, value: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ReportError::MalformedDateInput {
    flag,
    value: value.to_string(),
  })
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
  day.and_time(NaiveTime::MIN).and_utc()
}

// Keep first occurrence; a sprint can be listed on several boards.
fn dedupe_sprints(sprints: impl IntoIterator<Item = Sprint>) -> Vec<Sprint> {
  let mut seen = std::collections::HashSet::new();
  sprints.into_iter().filter(|s| seen.insert(s.id)).collect()
}
