use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::aggregate::{GroupBy, SortOrder};
use crate::util;
use crate::window::WindowPolicy;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
  Text,
  Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "jira-worklog-report",
    version,
    about = "Report your Jira worklogs for the active sprint, the last closed sprints, or a date range",
    long_about = None
)]
pub struct Cli {
  /// Which window to report on
  #[arg(long, value_enum, default_value_t = WindowPolicy::Range)]
  pub policy: WindowPolicy,

  /// Start date (YYYY-MM-DD); defaults to 14 days ago. Range policy only
  #[arg(short = 's', long)]
  pub start: Option<String>,

  /// End date (YYYY-MM-DD, inclusive); only meaningful with --start. Range policy only
  #[arg(short = 'e', long)]
  pub end: Option<String>,

  /// Group totals by issue or by epic (adds an epic column)
  #[arg(long = "group-by", value_enum, default_value_t = GroupBy::Issue)]
  pub group_by: GroupBy,

  /// Listing order; defaults to date for --policy range and issue for sprint policies
  #[arg(long, value_enum)]
  pub sort: Option<SortOrder>,

  /// Output format
  #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
  pub format: OutputFormat,

  /// Print each JQL query to stderr and enable debug logging
  #[arg(long)]
  pub debug: bool,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  /// Override the "now" instant, RFC3339 (hidden; tests only)
  #[arg(long = "now-override", hide = true)]
  pub now_override: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
  pub policy: WindowPolicy,
  pub start: Option<String>,
  pub end: Option<String>,
  pub group_by: GroupBy,
  pub sort: SortOrder,
  pub format: OutputFormat,
  pub debug: bool,
  pub now: Option<DateTime<Utc>>,
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  if cli.policy != WindowPolicy::Range && (cli.start.is_some() || cli.end.is_some()) {
    bail!("Ambiguous time selection: --start/--end only apply to --policy range");
  }

  let now = match cli.now_override.as_deref() {
    Some(raw) => match util::parse_now_override(raw) {
      Some(dt) => Some(dt),
      None => bail!("invalid --now-override '{raw}': expected RFC3339"),
    },
    None => None,
  };

  let sort = cli.sort.unwrap_or(match cli.policy {
    WindowPolicy::Range => SortOrder::Date,
    WindowPolicy::Active | WindowPolicy::Recent => SortOrder::Issue,
  });

  Ok(EffectiveConfig {
    policy: cli.policy,
    start: cli.start,
    end: cli.end,
    group_by: cli.group_by,
    sort,
    format: cli.format,
    debug: cli.debug,
    now,
  })
}
