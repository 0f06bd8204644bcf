use predicates::prelude::*;
use serde_json::json;
use test_support::{MockJira, Route, USER, jira_cmd, worklog_json};

fn worklogs(started: &str, spent: &str) -> String {
  json!({ "startAt": 0, "total": 1, "worklogs": [ worklog_json(USER, started, spent, None) ] }).to_string()
}

fn summary_line(key: &str, formatted: &str, minutes: u64) -> String {
  format!("  {:<15}{:<10}({} minutes)", key, formatted, minutes)
}

#[test]
fn groups_by_epic_link_parent_epic_and_parent_lookup() {
  let issues = json!({
    "startAt": 0,
    "total": 3,
    "issues": [
      { "key": "APP-1", "fields": { "summary": "Linked", "customfield_10014": "EPIC-1" } },
      { "key": "APP-2", "fields": { "summary": "Subtask of story",
        "parent": { "key": "STORY-9", "fields": { "issuetype": { "name": "Story" } } } } },
      { "key": "APP-3", "fields": { "summary": "Child of epic",
        "parent": { "key": "EPIC-7", "fields": { "issuetype": { "name": "Epic" } } } } }
    ]
  });

  let server = MockJira::start(vec![
    Route::get("/rest/api/3/search")
      .query("fields=summary,issuetype,parent,customfield_10014")
      .json(issues.to_string()),
    Route::get("/rest/api/3/issue/STORY-9")
      .query("fields=customfield_10014")
      .json(json!({ "key": "STORY-9", "fields": { "customfield_10014": "EPIC-1" } }).to_string()),
    Route::get("/rest/api/3/issue/APP-1/worklog").json(worklogs("2025-08-04T09:00:00.000+0000", "1h")),
    Route::get("/rest/api/3/issue/APP-2/worklog").json(worklogs("2025-08-05T09:00:00.000+0000", "30m")),
    Route::get("/rest/api/3/issue/APP-3/worklog").json(worklogs("2025-08-06T09:00:00.000+0000", "2h")),
  ]);

  let out = jira_cmd(&server.url())
    .args(["--start", "2025-08-01", "--group-by", "epic"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Time by epic:"))
    .stdout(predicate::str::contains("Total time logged: 3h 30m (210 minutes)"))
    .get_output()
    .stdout
    .clone();
  let text = String::from_utf8(out).unwrap();

  let expected = format!(
    "Time by epic:\n{}\n{}\n",
    summary_line("EPIC-7", "2h", 120),
    summary_line("EPIC-1", "1h 30m", 90)
  );
  assert!(text.contains(&expected), "{text}");
  assert!(text.contains(&format!("{:<12}{:<15}{:<15}", "2025-08-05", "APP-2", "EPIC-1")));

  // One detail lookup for the non-epic parent, none for the epic parent.
  assert_eq!(server.requests_to("/rest/api/3/issue/STORY-9").len(), 1);
  assert!(server.requests_to("/rest/api/3/issue/EPIC-7").is_empty());
}

#[test]
fn failed_parent_lookup_lands_in_no_epic_and_is_warned() {
  let issues = json!({
    "startAt": 0,
    "total": 1,
    "issues": [
      { "key": "APP-4", "fields": { "summary": "Orphan",
        "parent": { "key": "STORY-1", "fields": { "issuetype": { "name": "Story" } } } } }
    ]
  });

  let server = MockJira::start(vec![
    Route::get("/rest/api/3/search").json(issues.to_string()),
    Route::get("/rest/api/3/issue/STORY-1").status(500).json("{}"),
    Route::get("/rest/api/3/issue/APP-4/worklog").json(worklogs("2025-08-04T09:00:00.000+0000", "45m")),
  ]);

  jira_cmd(&server.url())
    .args(["--start", "2025-08-01", "--group-by", "epic"])
    .assert()
    .success()
    .stdout(predicate::str::contains(summary_line("no-epic", "0h 45m", 45)))
    .stdout(predicate::str::contains("Warnings (1 issue(s)):"))
    .stdout(predicate::str::contains("  APP-4: epic lookup for parent STORY-1 failed: request to"));
}
