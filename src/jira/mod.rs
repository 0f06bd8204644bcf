// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Everything that speaks Jira: wire records, JQL construction, and the REST client seam
// role: module/aggregation
// outputs: jira::api (JiraApi, JiraHttpApi, paged helpers), jira::model, jira::query
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

pub mod api;
pub mod model;
pub mod query;
