use predicates::prelude::*;
use serde_json::json;
use test_support::{MockJira, Route, USER, jira_cmd, worklog_json};

const SEARCH: &str = "/rest/api/3/search";

fn search_body(keys: &[(&str, &str)]) -> String {
  let issues: Vec<_> = keys
    .iter()
    .map(|(key, summary)| json!({ "key": key, "fields": { "summary": summary } }))
    .collect();
  json!({ "startAt": 0, "total": issues.len(), "issues": issues }).to_string()
}

fn worklogs_body(logs: Vec<serde_json::Value>) -> String {
  json!({ "startAt": 0, "total": logs.len(), "worklogs": logs }).to_string()
}

#[test]
fn explicit_range_counts_only_my_logs_inside_window() {
  let server = MockJira::start(vec![
    Route::get(SEARCH)
      .query("worklogDate >= '2025-08-01' AND worklogDate <= '2025-08-10'")
      .json(search_body(&[("APP-1", "Fix login")])),
    Route::get("/rest/api/3/issue/APP-1/worklog").json(worklogs_body(vec![
      worklog_json(USER, "2025-07-31T17:00:00.000+0000", "4h", None),
      worklog_json(USER, "2025-08-05T09:00:00.000+0000", "1h 30m", Some("paired on it")),
      worklog_json(USER, "2025-08-11T00:00:00.000+0000", "2h", None),
      worklog_json("someone@example.com", "2025-08-06T09:00:00.000+0000", "3h", None),
    ])),
  ]);

  jira_cmd(&server.url())
    .args(["--start", "2025-08-01", "--end", "2025-08-10", "--debug"])
    .assert()
    .success()
    .stdout(predicate::str::contains("🧾 Worklogs from 2025-08-01 to 2025-08-10:"))
    .stdout(predicate::str::contains("2025-08-05  APP-1"))
    .stdout(predicate::str::contains("paired on it"))
    .stdout(predicate::str::contains("Total time logged: 1h 30m (90 minutes)"))
    .stdout(predicate::str::contains("Number of work log entries: 1"))
    .stderr(predicate::str::contains(
      "JQL: worklogAuthor = currentUser() AND worklogDate >= '2025-08-01' AND worklogDate <= '2025-08-10'",
    ));

  let searches = server.requests_to(SEARCH);
  assert_eq!(searches.len(), 1);
  assert_eq!(
    searches[0].authorization.as_deref(),
    Some("Basic bWVAZXhhbXBsZS5jb206dGVzdC10b2tlbg==")
  );
}

#[test]
fn search_results_are_paginated() {
  let page_one = json!({
    "startAt": 0, "total": 3,
    "issues": [ { "key": "APP-1", "fields": { "summary": "one" } }, { "key": "APP-2", "fields": { "summary": "two" } } ]
  });
  let page_two = json!({
    "startAt": 2, "total": 3,
    "issues": [ { "key": "APP-3", "fields": { "summary": "three" } } ]
  });

  let mut routes = vec![
    Route::get(SEARCH).query("startAt=0").json(page_one.to_string()),
    Route::get(SEARCH).query("startAt=2").json(page_two.to_string()),
  ];
  for key in ["APP-1", "APP-2", "APP-3"] {
    routes.push(
      Route::get(&format!("/rest/api/3/issue/{key}/worklog"))
        .json(worklogs_body(vec![worklog_json(USER, "2025-08-12T09:00:00.000+0000", "15m", None)])),
    );
  }
  let server = MockJira::start(routes);

  jira_cmd(&server.url())
    .args(["--start", "2025-08-01", "--now-override", "2025-08-15T12:00:00Z"])
    .assert()
    .success()
    .stdout(predicate::str::contains("🧾 Worklogs since 2025-08-01:"))
    .stdout(predicate::str::contains("Total time logged: 0h 45m (45 minutes)"))
    .stdout(predicate::str::contains("Number of work log entries: 3"));

  assert_eq!(server.requests_to(SEARCH).len(), 2);
}

#[test]
fn default_window_is_last_14_days() {
  let server = MockJira::start(vec![
    Route::get(SEARCH)
      .query("worklogDate >= '2025-08-01'")
      .json(search_body(&[("APP-1", "Fix login")])),
    Route::get("/rest/api/3/issue/APP-1/worklog").json(worklogs_body(vec![
      worklog_json(USER, "2025-08-01T11:00:00.000+0000", "1h", None),
      worklog_json(USER, "2025-08-01T13:00:00.000+0000", "2h", None),
    ])),
  ]);

  // now - 14 days = 2025-08-01T12:00Z, so only the 13:00 entry counts.
  jira_cmd(&server.url())
    .args(["--now-override", "2025-08-15T12:00:00Z"])
    .assert()
    .success()
    .stdout(predicate::str::contains("🧾 Worklogs since 2025-08-01:"))
    .stdout(predicate::str::contains("Total time logged: 2h (120 minutes)"));
}

#[test]
fn failing_issue_is_reported_as_warning() {
  let server = MockJira::start(vec![
    Route::get(SEARCH).json(search_body(&[("APP-1", "Fix login"), ("APP-2", "Broken")])),
    Route::get("/rest/api/3/issue/APP-1/worklog").json(worklogs_body(vec![worklog_json(
      USER,
      "2025-08-05T09:00:00.000+0000",
      "1h",
      None,
    )])),
    Route::get("/rest/api/3/issue/APP-2/worklog").status(500).json("{}"),
  ]);

  jira_cmd(&server.url())
    .args(["--start", "2025-08-01"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Total time logged: 1h (60 minutes)"))
    .stdout(predicate::str::contains("Warnings (1 issue(s)):"))
    .stdout(predicate::str::contains("APP-2: request to"));
}

#[test]
fn failing_search_is_fatal() {
  let server = MockJira::start(vec![Route::get(SEARCH).status(401).json("{}")]);

  jira_cmd(&server.url())
    .args(["--start", "2025-08-01"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("401"));
}
