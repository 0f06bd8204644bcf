// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Parse compact Jira durations ("1d 2h 15m") into minutes and format minutes back as "Hh Mm"
// role: codec/duration
// outputs: parse_duration -> minutes; format_duration -> string
// invariants:
// - 1d = 8h = 480 minutes (work day)
// - Lenient: malformed, repeated or out-of-order components contribute 0; never errors
// - format_duration never emits days; always emits hours
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use once_cell::sync::Lazy;
use regex::Regex;

pub const MINUTES_PER_HOUR: u64 = 60;
pub const HOURS_PER_DAY: u64 = 8;
pub const MINUTES_PER_DAY: u64 = HOURS_PER_DAY * MINUTES_PER_HOUR;

// A component is whatever non-blank text precedes a unit marker.
static RE_COMPONENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?P<mag>[^\sdhm]*)(?P<unit>[dhm])").unwrap());

fn unit_rank(unit: &str) -> (u8, u64) {
  match unit {
    "d" => (0, MINUTES_PER_DAY),
    "h" => (1, MINUTES_PER_HOUR),
    _ => (2, 1),
  }
}

/// Parse a duration like `"2h 30m"` or `"1d"` into minutes.
///
/// Units must appear in the order d, h, m and at most once each. A component
/// whose magnitude is not a plain integer, or that breaks the ordering, counts
/// as zero and parsing carries on with the rest of the string.
pub fn parse_duration(s: &str) -> u64 {
  let mut total: u64 = 0;
  let mut next_rank: u8 = 0;

  for caps in RE_COMPONENT.captures_iter(s) {
    let (rank, factor) = unit_rank(&caps["unit"]);

    if rank < next_rank {
      continue;
    }
    next_rank = rank + 1;

    let mag = &caps["mag"];
    if !mag.is_empty() && mag.bytes().all(|b| b.is_ascii_digit()) {
      if let Ok(n) = mag.parse::<u64>() {
        total = total.saturating_add(n.saturating_mul(factor));
      }
    }
  }

  total
}

/// Format minutes as hours plus an optional minute remainder: `0h`, `1h 30m`, `25h`.
pub fn format_duration(minutes: u64) -> String {
  let hours = minutes / MINUTES_PER_HOUR;
  let rest = minutes % MINUTES_PER_HOUR;

  if rest > 0 {
    format!("{hours}h {rest}m")
  } else {
    format!("{hours}h")
  }
}
