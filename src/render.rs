// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Assemble the final report and render it as aligned plaintext or JSON
// role: render/report
// inputs: WindowSelection, Aggregation, grouping mode, per-issue warnings
// outputs: Report (serializable), text table, pretty JSON
// invariants:
// - Text output ends with the totals line and entry count (then warnings, if any)
// - Group summary is ordered by minutes descending
// - Lines carry no trailing whitespace
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use serde::Serialize;

use crate::aggregate::{Aggregation, GroupBy, IssueWarning};
use crate::duration::format_duration;
use crate::model::{Sprint, TimeWindow, WorklogEntry};
use crate::util::truncate_chars;
use crate::window::WindowSelection;

const RULE_WIDTH: usize = 40;
const SUMMARY_CHARS: usize = 38;
const DATE_WIDTH: usize = 12;
const KEY_WIDTH: usize = 15;
const SUMMARY_WIDTH: usize = 40;
const TIME_WIDTH: usize = 10;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupTotal {
  pub key: String,
  pub minutes: u64,
  pub formatted: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
  pub description: String,
  pub window: TimeWindow,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub sprint: Option<Sprint>,
  pub fallback: bool,
  pub group_by: GroupBy,
  pub entries: Vec<WorklogEntry>,
  pub groups: Vec<GroupTotal>,
  pub total_minutes: u64,
  pub total_formatted: String,
  pub entry_count: usize,
  pub warnings: Vec<IssueWarning>,
}

impl Report {
  pub fn new(selection: &WindowSelection, aggregation: Aggregation, group_by: GroupBy, warnings: Vec<IssueWarning>) -> Self {
    let groups = aggregation
      .groups
      .sorted_desc()
      .into_iter()
      .map(|(key, minutes)| GroupTotal {
        key,
        minutes,
        formatted: format_duration(minutes),
      })
      .collect();

    Self {
      description: selection.description.clone(),
      window: selection.window,
      sprint: selection.sprint.clone(),
      fallback: selection.fallback,
      group_by,
      entry_count: aggregation.entries.len(),
      total_formatted: format_duration(aggregation.total_minutes),
      total_minutes: aggregation.total_minutes,
      entries: aggregation.entries,
      groups,
      warnings,
    }
  }
}

/// Left-aligned column of `width` chars whose last char is always a space, so an
/// over-long value still stays separated from the next column.
fn cell(text: &str, width: usize) -> String {
  format!("{:<w$} ", text, w = width - 1)
}

pub fn render_text(report: &Report) -> String {
  let with_epic = report.group_by == GroupBy::Epic;
  let rule = "=".repeat(RULE_WIDTH);
  let mut lines: Vec<String> = Vec::new();

  lines.push(format!("🧾 Worklogs {}:", report.description));
  lines.push(rule.clone());

  let epic_header = if with_epic { cell("Epic", KEY_WIDTH) } else { String::new() };
  lines.push(format!(
    "{}{}{}{}{}Comment",
    cell("Date", DATE_WIDTH),
    cell("Issue", KEY_WIDTH),
    epic_header,
    cell("Summary", SUMMARY_WIDTH),
    cell("Time", TIME_WIDTH)
  ));
  let epic_width = if with_epic { KEY_WIDTH } else { 0 };
  let dash_width = DATE_WIDTH + KEY_WIDTH + epic_width + SUMMARY_WIDTH + TIME_WIDTH + 30;
  lines.push("-".repeat(dash_width));

  if report.entries.is_empty() {
    lines.push("(no worklogs in this window)".to_string());
  }

  for entry in &report.entries {
    let epic_col = if with_epic {
      cell(entry.epic_key.as_deref().unwrap_or(crate::model::NO_EPIC), KEY_WIDTH)
    } else {
      String::new()
    };
    let row = format!(
      "{}{}{}{}{}{}",
      cell(&entry.started.format("%Y-%m-%d").to_string(), DATE_WIDTH),
      cell(&entry.issue_key, KEY_WIDTH),
      epic_col,
      cell(&truncate_chars(&entry.summary, SUMMARY_CHARS), SUMMARY_WIDTH),
      cell(&entry.time_spent, TIME_WIDTH),
      entry.comment
    );
    lines.push(row.trim_end().to_string());
  }

  if !report.groups.is_empty() {
    lines.push(String::new());
    lines.push(match report.group_by {
      GroupBy::Epic => "Time by epic:".to_string(),
      GroupBy::Issue => "Time by issue:".to_string(),
    });
    for group in &report.groups {
      lines.push(format!(
        "  {}{}({} minutes)",
        cell(&group.key, KEY_WIDTH),
        cell(&group.formatted, TIME_WIDTH),
        group.minutes
      ));
    }
  }

  lines.push(String::new());
  lines.push(rule);
  lines.push(format!(
    "Total time logged: {} ({} minutes)",
    report.total_formatted, report.total_minutes
  ));
  lines.push(format!("Number of work log entries: {}", report.entry_count));

  if !report.warnings.is_empty() {
    lines.push(String::new());
    lines.push(format!("Warnings ({} issue(s)):", report.warnings.len()));
    for w in &report.warnings {
      lines.push(format!("  {}: {}", w.key, w.reason));
    }
  }

  let mut out = lines.join("\n");
  out.push('\n');
  out
}

pub fn render_json(report: &Report) -> anyhow::Result<String> {
  let mut out = serde_json::to_string_pretty(report)?;
  out.push('\n');
  Ok(out)
}
