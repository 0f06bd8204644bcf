use std::time::Duration;

use crate::error::{ReportError, Result};

pub const ENV_USERNAME: &str = "JIRA_USERNAME";
pub const ENV_API_TOKEN: &str = "JIRA_API_TOKEN";
pub const ENV_SERVER: &str = "JIRA_SERVER";
pub const ENV_EPIC_LINK_FIELD: &str = "JIRA_EPIC_LINK_FIELD";
pub const ENV_TIMEOUT_SECS: &str = "JIRA_TIMEOUT_SECS";

pub const DEFAULT_EPIC_LINK_FIELD: &str = "customfield_10014";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings read once at startup and shared by reference.
#[derive(Clone, Debug)]
pub struct JiraConfig {
  /// Account e-mail; also the worklog author we report on.
  pub username: String,
  pub api_token: String,
  pub server: String,
  pub epic_link_field: String,
  pub timeout: Duration,
}

impl JiraConfig {
  /// Load from `.env` (when present) and the process environment.
  pub fn from_env() -> Result<Self> {
    let _ = dotenvy::dotenv();
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Build from any key lookup; blank values count as missing.
  pub fn from_lookup<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let username = get(ENV_USERNAME);
    let api_token = get(ENV_API_TOKEN);
    let server = get(ENV_SERVER);

    let missing: Vec<String> = [
      (ENV_USERNAME, username.is_none()),
      (ENV_API_TOKEN, api_token.is_none()),
      (ENV_SERVER, server.is_none()),
    ]
    .iter()
    .filter(|(_, absent)| *absent)
    .map(|(key, _)| key.to_string())
    .collect();

    let (Some(username), Some(api_token), Some(server)) = (username, api_token, server) else {
      return Err(ReportError::ConfigurationMissing(missing));
    };

    let epic_link_field = get(ENV_EPIC_LINK_FIELD).unwrap_or_else(|| DEFAULT_EPIC_LINK_FIELD.to_string());
    let timeout_secs = match get(ENV_TIMEOUT_SECS) {
      Some(raw) => raw.parse::<u64>().map_err(|_| ReportError::ConfigurationInvalid {
        key: ENV_TIMEOUT_SECS,
        value: raw.clone(),
        expected: "a whole number of seconds",
      })?,
      None => DEFAULT_TIMEOUT_SECS,
    };

    Ok(Self {
      username,
      api_token,
      server: server.trim_end_matches('/').to_string(),
      epic_link_field,
      timeout: Duration::from_secs(timeout_secs),
    })
  }
}
