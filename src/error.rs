// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Typed error taxonomy for configuration, remote calls, and user date input
// role: errors/taxonomy
// outputs: ReportError (thiserror) converted into anyhow at the binary boundary
// invariants: Every fatal condition has a variant; duration parsing never produces an error
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
  #[error("missing required configuration: {}", .0.join(", "))]
  ConfigurationMissing(Vec<String>),

  #[error("invalid {key} '{value}': expected {expected}")]
  ConfigurationInvalid {
    key: &'static str,
    value: String,
    expected: &'static str,
  },

  #[error("request to {url} failed: {reason}")]
  RemoteRequestFailed { url: String, reason: String },

  #[error("invalid {flag} date '{value}': expected YYYY-MM-DD")]
  MalformedDateInput { flag: &'static str, value: String },

  #[error("--end {end} is before --start {start}")]
  InvertedDateRange { start: String, end: String },
}

impl ReportError {
  pub fn remote(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
    ReportError::RemoteRequestFailed {
      url: url.into(),
      reason: reason.to_string(),
    }
  }
}

pub type Result<T> = std::result::Result<T, ReportError>;
