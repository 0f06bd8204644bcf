// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Small helpers: effective "now", char-safe truncation, and man page rendering
// role: utilities/helpers
// inputs: Optional now override; strings; clap CommandFactory
// outputs: DateTime<Utc>, truncated strings, man page text
// invariants:
// - truncate_chars never splits a UTF-8 character
// - effective_now only consults the clock when no override is given
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use chrono::{DateTime, Utc};
use clap::CommandFactory;

/// Returns the override when present, otherwise the current time.
pub fn effective_now(override_now: Option<DateTime<Utc>>) -> DateTime<Utc> {
  override_now.unwrap_or_else(Utc::now)
}

/// Parse a `--now-override` value (RFC3339, e.g. `2025-08-15T12:00:00Z`).
pub fn parse_now_override(raw: &str) -> Option<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(raw.trim())
    .ok()
    .map(|dt| dt.with_timezone(&Utc))
}

/// First `max` characters of `s`.
pub fn truncate_chars(s: &str, max: usize) -> String {
  s.chars().take(max).collect()
}

/// Render a section-1 man page for a clap `CommandFactory` implementor.
/// Returns the troff content as a UTF-8 string.
pub fn render_man_page<T: CommandFactory>() -> anyhow::Result<String> {
  let cmd = T::command();
  let man = clap_mangen::Man::new(cmd);
  let mut buf: Vec<u8> = Vec::new();

  man.render(&mut buf)?;

  Ok(String::from_utf8_lossy(&buf).to_string())
}
