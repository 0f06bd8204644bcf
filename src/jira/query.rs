use chrono::NaiveDate;

/// Every search is scoped to issues the current user logged work on.
const AUTHOR_CLAUSE: &str = "worklogAuthor = currentUser()";

/// Page size requested from the issue search endpoint.
pub const SEARCH_PAGE_SIZE: u32 = 100;

pub fn sprint_issues(sprint_id: i64) -> String {
  format!("{AUTHOR_CLAUSE} AND sprint = {sprint_id}")
}

/// Issues under epics that belong to the sprint (needs the ScriptRunner `epicsOf` function).
pub fn sprint_epic_issues(sprint_id: i64) -> String {
  format!("{AUTHOR_CLAUSE} AND issueFunction in epicsOf('sprint = {sprint_id}')")
}

pub fn recent_fallback() -> String {
  format!("{AUTHOR_CLAUSE} AND worklogDate >= -14d")
}

pub fn date_range(start: NaiveDate, end: Option<NaiveDate>) -> String {
  let mut jql = format!("{AUTHOR_CLAUSE} AND worklogDate >= '{}'", start.format("%Y-%m-%d"));
  if let Some(end) = end {
    jql.push_str(&format!(" AND worklogDate <= '{}'", end.format("%Y-%m-%d")));
  }
  jql
}

/// Field selector for searches; includes what epic resolution needs.
pub fn search_fields(epic_link_field: &str) -> String {
  format!("summary,issuetype,parent,{epic_link_field}")
}
