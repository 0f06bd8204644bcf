use predicates::prelude::*;
use serde_json::json;
use test_support::{MockJira, Route, USER, jira_cmd, worklog_json};

const BOARDS: &str = "/rest/agile/1.0/board";
const SEARCH: &str = "/rest/api/3/search";
const NOW: &str = "2025-08-15T12:00:00Z";

fn boards_body() -> String {
  json!({ "isLast": true, "values": [ { "id": 1, "name": "Alpha" }, { "id": 2, "name": "Beta" } ] }).to_string()
}

fn sprint(id: i64, start: &str, end: &str) -> serde_json::Value {
  json!({ "id": id, "name": format!("Sprint {id}"), "startDate": start, "endDate": end })
}

fn sprints_body(values: Vec<serde_json::Value>, is_last: bool) -> String {
  json!({ "isLast": is_last, "values": values }).to_string()
}

fn issues_body(keys: &[&str]) -> String {
  let issues: Vec<_> = keys
    .iter()
    .map(|k| json!({ "key": k, "fields": { "summary": format!("{k} work") } }))
    .collect();
  json!({ "startAt": 0, "total": issues.len(), "issues": issues }).to_string()
}

fn worklogs_body(logs: Vec<serde_json::Value>) -> String {
  json!({ "startAt": 0, "total": logs.len(), "worklogs": logs }).to_string()
}

#[test]
fn active_policy_uses_earliest_active_sprint_and_tolerates_epics_of_failure() {
  let server = MockJira::start(vec![
    Route::get(BOARDS).json(boards_body()),
    Route::get("/rest/agile/1.0/board/1/sprint")
      .query("state=active")
      .json(sprints_body(
        vec![sprint(42, "2025-08-04T08:00:00.000Z", "2025-08-18T08:00:00.000Z")],
        true,
      )),
    Route::get("/rest/agile/1.0/board/2/sprint")
      .query("state=active")
      .json(sprints_body(
        vec![sprint(43, "2025-08-06T08:00:00.000Z", "2025-08-20T08:00:00.000Z")],
        true,
      )),
    Route::get(SEARCH).query("epicsOf").status(400).json(r#"{"errorMessages":["Unknown function"]}"#),
    Route::get(SEARCH).query("AND sprint = 42").json(issues_body(&["APP-1"])),
    Route::get(SEARCH).query("AND sprint = 43").json(issues_body(&[])),
    Route::get("/rest/api/3/issue/APP-1/worklog").json(worklogs_body(vec![
      worklog_json(USER, "2025-08-03T09:00:00.000+0000", "2h", None),
      worklog_json(USER, "2025-08-05T09:00:00.000+0000", "1h", Some("standup fix")),
    ])),
  ]);

  jira_cmd(&server.url())
    .args(["--policy", "active", "--now-override", NOW])
    .assert()
    .success()
    .stdout(predicate::str::contains("🧾 Worklogs from the current active sprint (Sprint 42):"))
    .stdout(predicate::str::contains("Total time logged: 1h (60 minutes)"))
    .stdout(predicate::str::contains("Number of work log entries: 1"));

  let searches: Vec<String> = server.requests_to(SEARCH).into_iter().map(|r| r.query).collect();
  assert!(searches.iter().any(|q| q.contains("AND sprint = 42")));
  assert!(searches.iter().any(|q| q.contains("AND sprint = 43")));
  assert_eq!(server.requests_to("/rest/api/3/issue/APP-1/worklog").len(), 1);
}

#[test]
fn recent_policy_clusters_closed_sprints_across_pages() {
  let server = MockJira::start(vec![
    Route::get(BOARDS).json(
      json!({ "isLast": true, "values": [ { "id": 1, "name": "Alpha" } ] }).to_string(),
    ),
    Route::get("/rest/agile/1.0/board/1/sprint")
      .query("state=active")
      .json(sprints_body(Vec::new(), true)),
    Route::get("/rest/agile/1.0/board/1/sprint")
      .query("state=closed")
      .query("startAt=0")
      .json(sprints_body(
        vec![
          sprint(10, "2025-07-04T08:00:00.000Z", "2025-07-18T08:00:00.000Z"),
          sprint(11, "2025-07-18T08:00:00.000Z", "2025-08-01T08:00:00.000Z"),
        ],
        false,
      )),
    Route::get("/rest/agile/1.0/board/1/sprint")
      .query("state=closed")
      .query("startAt=2")
      .json(sprints_body(
        vec![sprint(12, "2025-07-14T08:00:00.000Z", "2025-07-28T08:00:00.000Z")],
        true,
      )),
    Route::get(SEARCH).query("sprint = 11").json(issues_body(&["APP-5"])),
    Route::get(SEARCH).query("sprint = 12").json(issues_body(&["APP-5"])),
    Route::get("/rest/api/3/issue/APP-5/worklog").json(worklogs_body(vec![
      worklog_json(USER, "2025-07-17T09:00:00.000+0000", "3h", None),
      worklog_json(USER, "2025-07-20T09:00:00.000+0000", "1h 15m", None),
      worklog_json(USER, "2025-07-30T09:00:00.000+0000", "1h", None),
    ])),
  ]);

  jira_cmd(&server.url())
    .args(["--policy", "recent", "--now-override", NOW])
    .assert()
    .success()
    .stdout(predicate::str::contains("🧾 Worklogs from the most recent sprint (Sprint 11):"))
    .stdout(predicate::str::contains("Total time logged: 2h 15m (135 minutes)"))
    .stdout(predicate::str::contains("Number of work log entries: 2"));

  let searches: Vec<String> = server.requests_to(SEARCH).into_iter().map(|r| r.query).collect();
  assert!(searches.iter().all(|q| !q.contains("sprint = 10")), "{searches:?}");
  assert_eq!(server.requests_to("/rest/api/3/issue/APP-5/worklog").len(), 1);

  let closed_pages = server
    .requests_to("/rest/agile/1.0/board/1/sprint")
    .into_iter()
    .filter(|r| r.query.contains("state=closed"))
    .count();
  assert_eq!(closed_pages, 2);
}

#[test]
fn no_boards_falls_back_to_recent_worklogs() {
  let server = MockJira::start(vec![
    Route::get(BOARDS).json(json!({ "isLast": true, "values": [] }).to_string()),
    Route::get(SEARCH).query("worklogDate >= -14d").json(issues_body(&["APP-2"])),
    Route::get("/rest/api/3/issue/APP-2/worklog").json(worklogs_body(vec![worklog_json(
      USER,
      "2025-08-10T09:00:00.000+0000",
      "45m",
      None,
    )])),
  ]);

  jira_cmd(&server.url())
    .args(["--policy", "active", "--now-override", NOW])
    .assert()
    .success()
    .stdout(predicate::str::contains("🧾 Worklogs from the past 14 days (fallback):"))
    .stdout(predicate::str::contains("Total time logged: 0h 45m (45 minutes)"));
}

#[test]
fn board_listing_failure_is_fatal() {
  let server = MockJira::start(vec![Route::get(BOARDS).status(500).json("{}")]);

  jira_cmd(&server.url())
    .args(["--policy", "recent"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("listing boards"));
}
